//! # Types Module
//!
//! Request-side types shared by the completion and embedding wrappers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//! | [`InvocationParameters`] | Typed generation/embedding options with override merge |
//! | [`ResponseFormat`] | Structured-output hint for chat completions |
//!
//! ## Example
//!
//! ```rust
//! use cachegpt::types::{InvocationParameters, Message};
//!
//! let system = Message::system("You are a helpful assistant");
//! let user = Message::user("What's the weather?");
//!
//! let effective = InvocationParameters::chat_defaults()
//!     .merge(&InvocationParameters::new().temperature(0.7));
//! assert_eq!(effective.temperature, Some(0.7));
//! ```

pub mod message;
pub mod params;

pub use message::{Message, MessageRole};
pub use params::{
    InvocationParameters, JsonSchemaFormat, ResponseFormat, DEFAULT_CHAT_MODEL,
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
};
