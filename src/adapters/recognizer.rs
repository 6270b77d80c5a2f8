use crate::domain::model::SessionToken;
use crate::domain::ports::{EventSender, SessionEvent, SpeechRecognizer};
use crate::utils::error::Result;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Armed {
    token: SessionToken,
    events: EventSender,
}

/// Recognizer fed by typed text instead of a microphone.
///
/// Clones share state: the session controller owns one clone, the input
/// loop keeps another and calls [`ConsoleRecognizer::hear`] with each line.
#[derive(Debug, Clone, Default)]
pub struct ConsoleRecognizer {
    armed: Arc<Mutex<Option<Armed>>>,
    starts: Arc<Mutex<u32>>,
}

impl ConsoleRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_listening(&self) -> bool {
        self.armed.lock().map(|a| a.is_some()).unwrap_or(false)
    }

    /// Token of the session currently listening, if any.
    pub fn armed_token(&self) -> Option<SessionToken> {
        self.armed
            .lock()
            .ok()
            .and_then(|a| a.as_ref().map(|armed| armed.token))
    }

    pub fn start_count(&self) -> u32 {
        self.starts.lock().map(|s| *s).unwrap_or(0)
    }

    /// Delivers a final transcript. Returns false when nothing is listening.
    pub fn hear(&self, transcript: &str) -> bool {
        self.emit(|token| SessionEvent::RecognitionResult {
            token,
            transcript: transcript.to_string(),
        })
    }

    pub fn fail(&self, code: &str) -> bool {
        self.emit(|token| SessionEvent::RecognitionError {
            token,
            code: code.to_string(),
        })
    }

    /// End of input without a result.
    pub fn end(&self) -> bool {
        self.emit(|token| SessionEvent::RecognitionEnded { token })
    }

    fn emit(&self, event: impl FnOnce(SessionToken) -> SessionEvent) -> bool {
        let Ok(armed) = self.armed.lock() else {
            return false;
        };
        match armed.as_ref() {
            Some(armed) => armed.events.send(event(armed.token)).is_ok(),
            None => false,
        }
    }
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn start(&mut self, token: SessionToken, events: EventSender) -> Result<()> {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = Some(Armed { token, events });
        }
        if let Ok(mut starts) = self.starts.lock() {
            *starts += 1;
        }
        tracing::debug!("Console recognizer listening for session {}", token);
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut armed) = self.armed.lock() {
            if let Some(previous) = armed.take() {
                tracing::debug!("Console recognizer released session {}", previous.token);
            }
        }
    }
}
