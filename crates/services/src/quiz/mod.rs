mod registry;
mod workflow;

pub use crate::error::QuizServiceError;
pub use registry::SessionRegistry;
pub use workflow::QuizLoopService;
