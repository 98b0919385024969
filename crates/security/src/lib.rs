//! Credential handling for ChatDeck.
//!
//! Provides:
//! - **Secret sources**: environment variables and a secrets directory
//! - **Secret parsing**: plain values or JSON mappings with a named key field
//! - **Redaction**: a display wrapper that keeps keys out of logs

pub mod secrets;

pub use secrets::{DirSecretSource, EnvSecretSource, Redacted, SecretValue, resolve_api_key};
