//! Secret source trait — where credentials come from.

use async_trait::async_trait;

use crate::error::SecretError;

/// Returns the raw value stored under a secret name. Interpreting that value
/// (plain string vs. structured mapping) is left to the caller.
#[async_trait]
pub trait SecretSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, secret_name: &str) -> Result<String, SecretError>;
}
