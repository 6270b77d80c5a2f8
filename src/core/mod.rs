pub mod catalog;
pub mod kiosk;
pub mod matcher;
pub mod order;
pub mod session;

pub use crate::domain::model::{InterpretationResult, MenuItem, OrderLine, OrderSnapshot};
pub use crate::domain::ports::{Feedback, SessionEvent, SpeechRecognizer, TranscriptInterpreter};
pub use crate::utils::error::Result;
