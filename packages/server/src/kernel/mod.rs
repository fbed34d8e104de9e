//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod test_dependencies;
pub mod traits;

pub use ai::OpenAIVision;
pub use test_dependencies::MockAI;
pub use traits::*;
