//! Meeting summarization: the model fallback chain, prompt strategies,
//! and the engine the HTTP layer calls into.

pub mod engine;
pub mod loader;
pub mod prompt;

pub use engine::{EngineStatus, SummaryEngine, SummaryOutput};
pub use loader::load_first_available;
pub use prompt::SummaryType;
