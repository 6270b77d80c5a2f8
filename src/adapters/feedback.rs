use crate::domain::ports::Feedback;
use std::sync::{Arc, Mutex};

/// Writes prompts to the log; used when no speaker is attached.
#[derive(Debug, Clone)]
pub struct TracingFeedback {
    locale: String,
}

impl TracingFeedback {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}

impl Feedback for TracingFeedback {
    fn announce(&self, text: &str) {
        tracing::info!(locale = %self.locale, "🔊 {}", text);
    }
}

/// Prints prompts for the interactive console kiosk.
#[derive(Debug, Clone, Default)]
pub struct ConsoleFeedback;

impl Feedback for ConsoleFeedback {
    fn announce(&self, text: &str) {
        println!("🔊 {}", text);
        tracing::debug!("Announced: {}", text);
    }
}

/// Keeps every announcement in memory, e.g. for an on-screen caption strip.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedback {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl MemoryFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .map(|spoken| spoken.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.spoken().pop()
    }
}

impl Feedback for MemoryFeedback {
    fn announce(&self, text: &str) {
        // A poisoned lock only loses the caption.
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
    }
}
