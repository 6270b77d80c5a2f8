use clap::Parser;
use kiosk_voice::domain::model::format_won;
use kiosk_voice::domain::ports::{Feedback, TranscriptInterpreter};
use kiosk_voice::utils::error::ErrorSeverity;
use kiosk_voice::utils::{logger, validation::Validate};
use kiosk_voice::{
    CliConfig, ConsoleFeedback, ConsoleRecognizer, HttpTranscriptInterpreter, Kiosk,
    KeywordInterpreter, KioskConfig, KioskError,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  menu                 show the menu
  add <id> [qty]       add an item (qty 1-99)
  order                show the current order
  clear                empty the order
  checkout             complete the order
  voice                start a voice session
  stop                 stop the voice session
  say <text>           speak into the microphone
  fail [code]          simulate a recognition error
  quit";

fn exit_code(e: &KioskError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report(e: &KioskError) {
    tracing::warn!("{} (category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

fn print_menu(kiosk: &Kiosk) {
    for item in kiosk.menu() {
        println!("  [{}] {} {}", item.id, item.name, format_won(item.price));
    }
}

fn print_order(kiosk: &Kiosk) {
    let snapshot = kiosk.snapshot();
    if snapshot.is_empty() {
        println!("  (empty order)");
    }
    for line in &snapshot.lines {
        println!(
            "  {} x{}  {}",
            line.item.name,
            line.quantity,
            format_won(line.subtotal())
        );
    }
    println!("  total: {}", format_won(snapshot.total));
}

/// Returns false when the user asked to quit.
fn handle_command(kiosk: &mut Kiosk, microphone: &ConsoleRecognizer, line: &str) -> bool {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "help" => println!("{}", HELP),
        "menu" => print_menu(kiosk),
        "order" => print_order(kiosk),
        "add" => {
            let mut args = rest.split_whitespace();
            let id = args.next().and_then(|id| id.parse::<u32>().ok());
            let quantity = args.next().map_or(Some(1), |q| q.parse::<u32>().ok());
            match (id, quantity) {
                (Some(id), Some(quantity)) => match kiosk.add_item(id, quantity) {
                    Ok(()) => print_order(kiosk),
                    Err(e) => report(&e),
                },
                _ => println!("usage: add <id> [qty]"),
            }
        }
        "clear" => {
            kiosk.clear_order();
            print_order(kiosk);
        }
        "checkout" => match kiosk.checkout() {
            Ok(receipt) => {
                println!("✅ 주문이 완료되었습니다!");
                println!("  {}", receipt.summary);
                println!("  총 금액: {}", format_won(receipt.total));
            }
            Err(e) => report(&e),
        },
        "voice" => {
            if let Err(e) = kiosk.start_voice() {
                report(&e);
            }
        }
        "stop" => kiosk.stop_voice(),
        "say" => {
            if !microphone.hear(rest) {
                println!("(not listening; type 'voice' first)");
            }
        }
        "fail" => {
            let code = if rest.is_empty() { "no-speech" } else { rest };
            if !microphone.fail(code) {
                println!("(not listening)");
            }
        }
        "quit" | "exit" => return false,
        other => println!("unknown command '{}', try 'help'", other),
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let mut config = match KioskConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    logger::init_logger(cli.verbose, config.logging.format);
    tracing::info!("Starting kiosk '{}'", config.kiosk.name);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    let interpreter: Arc<dyn TranscriptInterpreter> = if config.is_offline() {
        tracing::info!("Interpreting transcripts offline");
        Arc::new(KeywordInterpreter::new(config.keywords())?)
    } else {
        tracing::info!("Interpretation service: {}", config.interpreter.endpoint);
        Arc::new(HttpTranscriptInterpreter::new(
            config.interpreter.endpoint.clone(),
            config.interpreter_timeout(),
        )?)
    };
    let feedback: Arc<dyn Feedback> = Arc::new(ConsoleFeedback);
    let microphone = ConsoleRecognizer::new();

    let mut builder = Kiosk::builder(interpreter, feedback)
        .catalog(config.catalog())
        .prompts(config.prompts.clone())
        .session_timeout(config.session_timeout());
    if cli.no_voice {
        tracing::warn!("Speech recognition disabled; voice ordering unavailable");
    } else {
        builder = builder.recognizer(Box::new(microphone.clone()));
    }
    let (mut kiosk, mut events) = builder.build();

    println!("{} ({})", config.kiosk.name, config.kiosk.locale);
    print_menu(&kiosk);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                let before = kiosk.total();
                kiosk.dispatch(event);
                if kiosk.total() != before {
                    print_order(&kiosk);
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_command(&mut kiosk, &microphone, line.trim()) {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    kiosk.stop_voice();
    tracing::info!("Kiosk shut down");
    Ok(())
}
