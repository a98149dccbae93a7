//! Remote API seams.
//!
//! The memoizing wrappers only see these traits; [`OpenAiClient`] is the HTTP
//! implementation, and tests substitute scripted fakes.

mod openai;

pub use openai::OpenAiClient;

use crate::types::{InvocationParameters, Message};
use crate::Result;

/// Single-turn chat completion.
pub trait ChatCompletionApi {
    /// Submit `messages` with `params` and return every candidate's text, in
    /// the order the API returned them.
    fn create_chat_completion(
        &self,
        messages: &[Message],
        params: &InvocationParameters,
    ) -> Result<Vec<String>>;
}

/// Embedding of one text per call.
pub trait EmbeddingApi {
    fn create_embedding(&self, text: &str, params: &InvocationParameters) -> Result<Vec<f32>>;
}

impl<T: ChatCompletionApi + ?Sized> ChatCompletionApi for &T {
    fn create_chat_completion(
        &self,
        messages: &[Message],
        params: &InvocationParameters,
    ) -> Result<Vec<String>> {
        (**self).create_chat_completion(messages, params)
    }
}

impl<T: EmbeddingApi + ?Sized> EmbeddingApi for &T {
    fn create_embedding(&self, text: &str, params: &InvocationParameters) -> Result<Vec<f32>> {
        (**self).create_embedding(text, params)
    }
}
