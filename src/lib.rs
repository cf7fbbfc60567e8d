//! Lilly - streaming chat client for the Lilly security assistant
//!
//! The core is [`stream`], which rebuilds readable text from a chunked chat
//! response body. [`client`] and [`conversation`] wire it to the backend.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod stream;
pub mod traits;

pub use client::LillyClient;
pub use config::LillyConfig;
pub use conversation::Conversation;
pub use error::{LillyError, LillyResult};
pub use stream::{reconstruct, StreamSession};
