use anyhow::Result;
use httpmock::prelude::*;
use kiosk_voice::domain::model::SessionState;
use kiosk_voice::domain::ports::EventReceiver;
use kiosk_voice::{
    ConsoleRecognizer, HttpTranscriptInterpreter, Kiosk, KioskConfig, KioskError,
    KeywordInterpreter, MemoryFeedback,
};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

fn http_kiosk(
    server: &MockServer,
) -> Result<(Kiosk, EventReceiver, ConsoleRecognizer, MemoryFeedback)> {
    let interpreter = HttpTranscriptInterpreter::new(server.url("/process-voice"), Duration::from_secs(5))?;
    let microphone = ConsoleRecognizer::new();
    let feedback = MemoryFeedback::new();
    let (kiosk, events) = Kiosk::builder(Arc::new(interpreter), Arc::new(feedback.clone()))
        .recognizer(Box::new(microphone.clone()))
        .build();
    Ok((kiosk, events, microphone, feedback))
}

async fn pump(kiosk: &mut Kiosk, events: &mut EventReceiver) {
    let event = tokio::time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("no session event within 10s")
        .expect("event channel closed");
    kiosk.dispatch(event);
}

#[tokio::test]
async fn test_voice_order_against_interpretation_service() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/process-voice")
            .json_body(json!({"text": "순대 둘이요"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "status": "success",
                "original_text": "순대 둘이요",
                "corrected_text": "순대국밥 2개",
                "order_items": {"순대국밥": 2}
            }));
    });

    let (mut kiosk, mut events, microphone, feedback) = http_kiosk(&server)?;

    kiosk.start_voice()?;
    assert!(microphone.hear("순대 둘이요"));
    pump(&mut kiosk, &mut events).await;
    pump(&mut kiosk, &mut events).await;

    api_mock.assert();
    let snapshot = kiosk.snapshot();
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines[0].item.id, 2);
    assert_eq!(snapshot.lines[0].quantity, 2);
    assert_eq!(snapshot.total, 20000);
    assert_eq!(
        feedback.last().as_deref(),
        Some("주문이 추가되었습니다. 순대 둘이요")
    );
    assert_eq!(kiosk.voice_state(), SessionState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_malformed_service_reply_leaves_order_unchanged() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/process-voice");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("<html>502 Bad Gateway</html>");
    });

    let (mut kiosk, mut events, microphone, feedback) = http_kiosk(&server)?;
    kiosk.add_item(1, 2)?;

    kiosk.start_voice()?;
    microphone.hear("돼지국밥 하나");
    pump(&mut kiosk, &mut events).await;
    pump(&mut kiosk, &mut events).await;

    api_mock.assert();
    assert_eq!(kiosk.snapshot().total, 18000);
    assert_eq!(
        feedback.last().as_deref(),
        Some("죄송합니다. 다시 말씀해주세요.")
    );
    assert_eq!(kiosk.voice_state(), SessionState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_service_error_status_leaves_order_unchanged() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/process-voice");
        then.status(200).json_body(json!({
            "status": "error",
            "message": "음성 처리 중 오류 발생"
        }));
    });

    let (mut kiosk, mut events, microphone, feedback) = http_kiosk(&server)?;

    kiosk.start_voice()?;
    microphone.hear("수육");
    pump(&mut kiosk, &mut events).await;
    pump(&mut kiosk, &mut events).await;

    assert!(kiosk.snapshot().is_empty());
    assert_eq!(
        feedback.last().as_deref(),
        Some("죄송합니다. 다시 말씀해주세요.")
    );
    Ok(())
}

#[tokio::test]
async fn test_checkout_clears_order() -> Result<()> {
    let server = MockServer::start();
    let (mut kiosk, _events, _microphone, feedback) = http_kiosk(&server)?;

    assert!(matches!(kiosk.checkout(), Err(KioskError::EmptyOrder)));

    kiosk.add_item(1, 2)?;
    kiosk.add_item(6, 1)?;
    assert_eq!(
        feedback.last().as_deref(),
        Some("수육 한접시 1개를 주문에 추가했습니다.")
    );
    assert!(matches!(
        kiosk.add_item(1, 100),
        Err(KioskError::InvalidQuantity { .. })
    ));
    assert!(matches!(kiosk.add_item(99, 1), Err(KioskError::NotFound { id: 99 })));

    let receipt = kiosk.checkout()?;
    assert_eq!(receipt.summary, "돼지국밥 2개, 수육 한접시 1개");
    assert_eq!(receipt.total, 43000);
    assert!(kiosk.snapshot().is_empty());
    assert_eq!(kiosk.total(), 0);
    Ok(())
}

#[tokio::test]
async fn test_offline_kiosk_from_config_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        r#"
[kiosk]
name = "offline-test"
locale = "ko-KR"

[interpreter]
endpoint = ""
offline = true

[session]
timeout_ms = 3000
"#
        .as_bytes(),
    )?;

    let config = KioskConfig::from_file(file.path())?;
    kiosk_voice::utils::validation::Validate::validate(&config)?;

    let microphone = ConsoleRecognizer::new();
    let (mut kiosk, mut events) = Kiosk::builder(
        Arc::new(KeywordInterpreter::new(config.keywords())?),
        Arc::new(MemoryFeedback::new()),
    )
    .catalog(config.catalog())
    .prompts(config.prompts.clone())
    .session_timeout(config.session_timeout())
    .recognizer(Box::new(microphone.clone()))
    .build();

    kiosk.start_voice()?;
    microphone.hear("섞어 다섯 그릇이랑 수육 반 접시 하나");
    pump(&mut kiosk, &mut events).await;
    pump(&mut kiosk, &mut events).await;

    let snapshot = kiosk.snapshot();
    assert_eq!(snapshot.summary(), "섞어국밥 5개, 수육 반접시 1개");
    assert_eq!(snapshot.total, 5 * 9500 + 13000);
    Ok(())
}
