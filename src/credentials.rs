//! API credential acquisition.
//!
//! The mode is chosen when a wrapper is built and resolved exactly once; the
//! resulting [`ApiKey`] is then held for the wrapper's lifetime.

use crate::{Error, Result};
use std::str::FromStr;

pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_KEY";
const PROMPT_TEXT: &str = "Enter your OpenAI API key: ";

/// How to obtain the API key.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Read a named environment variable, after loading `.env` if present.
    Environment { var: String },
    /// Ask the operator on the terminal with echo disabled.
    Prompt,
    /// Use the supplied value. `None` is an error at resolution time.
    Explicit(Option<String>),
}

impl AuthMode {
    pub fn env(var: impl Into<String>) -> Self {
        AuthMode::Environment { var: var.into() }
    }

    pub fn explicit(key: impl Into<String>) -> Self {
        AuthMode::Explicit(Some(key.into()))
    }

    pub fn resolve(&self) -> Result<ApiKey> {
        self.resolve_with(|prompt| rpassword::prompt_password(prompt))
    }

    /// Resolve using `prompt` for [`AuthMode::Prompt`] instead of the terminal.
    pub fn resolve_with<P>(&self, prompt: P) -> Result<ApiKey>
    where
        P: FnOnce(&str) -> std::io::Result<String>,
    {
        let key = match self {
            AuthMode::Environment { var } => {
                // A missing .env file is not an error; the variable may be set directly.
                let _ = dotenvy::dotenv();
                match std::env::var(var) {
                    Ok(value) if !value.trim().is_empty() => value,
                    _ => {
                        return Err(Error::MissingCredential(format!(
                            "Environment variable `{}` is not set",
                            var
                        )))
                    }
                }
            }
            AuthMode::Prompt => {
                let value = prompt(PROMPT_TEXT)?;
                if value.trim().is_empty() {
                    return Err(Error::MissingCredential(
                        "no API key entered at prompt".to_string(),
                    ));
                }
                value
            }
            AuthMode::Explicit(Some(value)) if !value.trim().is_empty() => value.clone(),
            AuthMode::Explicit(_) => {
                return Err(Error::MissingCredential(
                    "`api_key` must be provided when auth mode is `arg`".to_string(),
                ))
            }
        };
        Ok(ApiKey(key.trim().to_string()))
    }
}

impl Default for AuthMode {
    fn default() -> Self {
        AuthMode::env(DEFAULT_API_KEY_VAR)
    }
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Environment { var } => f.debug_struct("Environment").field("var", var).finish(),
            AuthMode::Prompt => f.write_str("Prompt"),
            AuthMode::Explicit(value) => f
                .debug_tuple("Explicit")
                .field(&value.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

/// Parses the mode names `dotenv` (alias `env`), `prompt` and `arg`.
///
/// `dotenv` reads [`DEFAULT_API_KEY_VAR`]; `arg` parses to an explicit mode
/// with no value, to be filled with [`AuthMode::explicit`].
impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dotenv" | "env" => Ok(AuthMode::default()),
            "prompt" => Ok(AuthMode::Prompt),
            "arg" => Ok(AuthMode::Explicit(None)),
            other => Err(Error::UnsupportedAuthMode(other.to_string())),
        }
    }
}

/// A resolved API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
