//! Scripted remotes that record every call they receive.

#![allow(dead_code)]

use cachegpt::types::{InvocationParameters, Message};
use cachegpt::{ChatCompletionApi, EmbeddingApi, Error, Result};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedChat {
    calls: Mutex<Vec<(Vec<Message>, InvocationParameters)>>,
    failures_left: Mutex<usize>,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` calls with a 503 before answering normally.
    pub fn failing_first(n: usize) -> Self {
        Self {
            failures_left: Mutex::new(n),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_params(&self) -> Option<InvocationParameters> {
        self.calls.lock().unwrap().last().map(|(_, p)| p.clone())
    }

    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.calls.lock().unwrap().last().map(|(m, _)| m.clone())
    }
}

impl ChatCompletionApi for ScriptedChat {
    fn create_chat_completion(
        &self,
        messages: &[Message],
        params: &InvocationParameters,
    ) -> Result<Vec<String>> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((messages.to_vec(), params.clone()));
        let mut failures = self.failures_left.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(Error::remote(Some(503), "service unavailable"));
        }
        let user = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        // The call number makes recomputed answers distinguishable from cached ones.
        Ok(vec![
            format!("reply #{} to {}", calls.len(), user),
            "second candidate".to_string(),
        ])
    }
}

/// Produces `params.dimensions` values per text (4 when unset).
#[derive(Default)]
pub struct ScriptedEmbedding {
    texts: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl ScriptedEmbedding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    pub fn vector_for(text: &str, dims: usize) -> Vec<f32> {
        (0..dims)
            .map(|i| (text.len() * (i + 1)) as f32 + text.bytes().next().unwrap_or(0) as f32)
            .collect()
    }
}

impl EmbeddingApi for ScriptedEmbedding {
    fn create_embedding(&self, text: &str, params: &InvocationParameters) -> Result<Vec<f32>> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail_on.as_deref() == Some(text) {
            return Err(Error::remote(Some(429), "rate limited"));
        }
        let dims = params.dimensions.unwrap_or(4) as usize;
        Ok(Self::vector_for(text, dims))
    }
}
