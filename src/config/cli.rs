use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "kiosk")]
#[command(about = "Self-service kiosk with voice ordering")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "kiosk.toml")]
    pub config: String,

    /// Override the interpretation service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Interpret transcripts locally instead of calling the service
    #[arg(long)]
    pub offline: bool,

    /// Run as if the device had no speech recognition
    #[arg(long)]
    pub no_voice: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn apply_overrides(&self, config: &mut super::KioskConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.interpreter.endpoint = endpoint.clone();
        }
        if self.offline {
            config.interpreter.offline = Some(true);
        }
        if self.json_logs {
            config.logging.format = super::LogFormat::Json;
        }
    }
}
