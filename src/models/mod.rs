//! Wire and conversation types for the Lilly API.

mod message;
mod request;

pub use message::{ChatMessage, MessageRole};
pub use request::{ChatAnswer, ChatRequest, ClearResponse, CveRequest};
