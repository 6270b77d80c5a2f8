use crate::domain::model::{InterpretationResult, SessionToken};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Inbound asynchronous events, each tagged with the token it was armed under.
#[derive(Debug)]
pub enum SessionEvent {
    RecognitionResult {
        token: SessionToken,
        transcript: String,
    },
    RecognitionError {
        token: SessionToken,
        code: String,
    },
    RecognitionEnded {
        token: SessionToken,
    },
    Timeout {
        token: SessionToken,
    },
    Interpreted {
        token: SessionToken,
        transcript: String,
        outcome: Result<InterpretationResult>,
    },
}

impl SessionEvent {
    pub fn token(&self) -> SessionToken {
        match self {
            SessionEvent::RecognitionResult { token, .. }
            | SessionEvent::RecognitionError { token, .. }
            | SessionEvent::RecognitionEnded { token }
            | SessionEvent::Timeout { token }
            | SessionEvent::Interpreted { token, .. } => *token,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RecognitionResult { .. } => "recognition_result",
            SessionEvent::RecognitionError { .. } => "recognition_error",
            SessionEvent::RecognitionEnded { .. } => "recognition_ended",
            SessionEvent::Timeout { .. } => "timeout",
            SessionEvent::Interpreted { .. } => "interpreted",
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Turns a raw transcript into name/quantity pairs.
#[async_trait]
pub trait TranscriptInterpreter: Send + Sync {
    async fn interpret(&self, transcript: &str) -> Result<InterpretationResult>;
}

/// Host speech-recognition capability: single utterance, final results only.
///
/// Results, errors and end-of-input are reported through `events`, tagged
/// with the token passed to `start`.
pub trait SpeechRecognizer: Send {
    fn start(&mut self, token: SessionToken, events: EventSender) -> Result<()>;
    fn stop(&mut self);
}

/// Best-effort spoken status prompts. Must not block and must not fail.
pub trait Feedback: Send + Sync {
    fn announce(&self, text: &str);
}
