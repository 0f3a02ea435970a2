//! Query/price oracle implementations.
//!
//! [`OpenAiOracle`] talks to a chat-completions API; [`FallbackOracle`]
//! is the deterministic local implementation used when the external
//! oracle is disabled, times out, or returns malformed output.

pub mod fallback;
pub mod openai;

use std::time::Duration;

use tracing::warn;

use crate::error::OracleResult;
use crate::traits::oracle::SearchOracle;

pub use fallback::FallbackOracle;
pub use openai::OpenAiOracle;

/// Default time budget for one oracle call.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run an oracle call with a bounded timeout, degrading to a fallback
/// value on timeout or error.
///
/// The fallback is synchronous and cheap, so a failing oracle never
/// blocks the pipeline beyond the timeout.
pub async fn with_fallback<T, F>(
    operation: &str,
    timeout: Duration,
    call: F,
    fallback: impl FnOnce() -> T,
) -> T
where
    F: std::future::Future<Output = OracleResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!(operation, error = %e, "oracle call failed, using fallback");
            fallback()
        }
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis() as u64, "oracle call timed out");
            fallback()
        }
    }
}

/// Select the oracle from the environment: OpenAI-backed when
/// `AI_ENABLED=true` and `OPENAI_API_KEY` is set, fallback otherwise.
pub fn from_env() -> Box<dyn SearchOracle> {
    let enabled = std::env::var("AI_ENABLED").is_ok_and(|v| v == "true");
    if enabled {
        if let Ok(oracle) = OpenAiOracle::from_env() {
            return Box::new(oracle);
        }
        warn!("AI_ENABLED set but OPENAI_API_KEY missing, using fallback oracle");
    }
    Box::new(FallbackOracle::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;

    #[tokio::test]
    async fn test_with_fallback_on_error() {
        let value = with_fallback(
            "test",
            Duration::from_secs(1),
            async { Err::<i32, _>(OracleError::Unavailable("off".into())) },
            || 42,
        )
        .await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_with_fallback_on_timeout() {
        let value = with_fallback(
            "test",
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            },
            || 42,
        )
        .await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_with_fallback_passes_success_through() {
        let value = with_fallback("test", Duration::from_secs(1), async { Ok(7) }, || 42).await;
        assert_eq!(value, 7);
    }
}
