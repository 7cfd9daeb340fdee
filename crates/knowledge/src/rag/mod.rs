//! Tool-orchestrated answering over course materials.
//!
//! The [`GenerationLoop`] drives a bounded conversation with the completion
//! provider, the [`SessionManager`] keeps short per-session history and the
//! [`Conductor`] ties both to the tool registry for one query at a time.

pub mod conductor;
pub mod generator;
pub mod session;
pub mod types;

pub use conductor::Conductor;
pub use generator::{GenerationLoop, LoopState, MAX_TOOL_ROUNDS, SYSTEM_PROMPT};
pub use session::{SessionManager, SessionStore};
pub use types::RagResponse;
