//! Two demo web services around hosted generative AI APIs.
//!
//! The chat service relays messages to a hosted chat-completion API (plain
//! HTTP or streamed over a WebSocket) and prompts to a hosted image API. The
//! marketing service generates an image from a prompt, composites a logo and
//! phone number onto it, and serves the result from a local output directory.

pub mod ai;
pub mod api;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
