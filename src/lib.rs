pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    feedback::{ConsoleFeedback, MemoryFeedback, TracingFeedback},
    http_interpreter::HttpTranscriptInterpreter,
    keyword_interpreter::KeywordInterpreter,
    recognizer::ConsoleRecognizer,
};
pub use config::KioskConfig;
pub use crate::core::{
    catalog::MenuCatalog,
    kiosk::{Kiosk, KioskBuilder},
    matcher::MenuMatcher,
    order::OrderAggregator,
    session::{Prompts, VoiceSessionController},
};
pub use domain::model::{MenuItem, OrderSnapshot, Receipt, SessionState, SessionToken};
pub use utils::error::{KioskError, Result};
