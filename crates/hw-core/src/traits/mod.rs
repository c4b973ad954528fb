//! Core trait definitions

mod session;
mod tool;

pub use session::{ExecutionSession, SessionProvider};
pub use tool::{is_safe_operand, ToolInputs, ToolRunner};
