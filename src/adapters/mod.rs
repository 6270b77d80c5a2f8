// Adapters layer: concrete implementations for external systems (interpretation service, speech I/O).

pub mod feedback;
pub mod http_interpreter;
pub mod keyword_interpreter;
pub mod recognizer;
