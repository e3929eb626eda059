//! Contract with the text-generation collaborator.
//!
//! The network call itself lives outside this crate. What lives here is the
//! part the merge pipeline depends on: telling transient failures from
//! terminal ones, and retrying the former a bounded number of times.

use crate::error::GenerationError;
use log::warn;
use serde::Deserialize;
use std::time::Duration;

/// Retry bounds for transient generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first.
    pub max_attempts: u32,
    /// Fixed pause between calls.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// Creates the default policy: 3 attempts, 3 seconds apart.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Sets the number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the pause between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the attempt count, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Decides what to do after `attempt` (1-based) failed with `error`.
    ///
    /// Returns `Ok(delay)` to retry after `delay`, or the error to surface.
    pub fn next_step(&self, attempt: u32, error: GenerationError) -> Result<Duration, GenerationError> {
        if !error.is_transient() {
            return Err(error);
        }
        if attempt >= self.attempts() {
            return Err(GenerationError::RetriesExhausted {
                attempts: self.attempts(),
                delay: self.delay,
                last: error.to_string(),
            });
        }
        warn!(
            "Generation attempt {}/{} failed ({}); retrying in {:?}",
            attempt,
            self.attempts(),
            error,
            self.delay
        );
        Ok(self.delay)
    }
}

/// Error body returned by the provider.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Classifies a provider error message.
///
/// A message carrying a JSON error body (`{"error":{"message":…}}`) is
/// unwrapped first; its code and status take part in classification.
pub fn classify(message: &str) -> GenerationError {
    let message = unwrap_json(message).unwrap_or_else(|| message.trim().to_string());

    if message.is_empty() {
        GenerationError::EmptyResponse
    } else if message.contains("503")
        || message.to_lowercase().contains("overloaded")
        || message.contains("UNAVAILABLE")
    {
        GenerationError::Overloaded(message)
    } else if message.contains("429") || message.contains("RESOURCE_EXHAUSTED") {
        GenerationError::QuotaExhausted(message)
    } else if message.contains("403") || message.contains("API key not valid") {
        GenerationError::InvalidCredentials(message)
    } else if message.contains("400") {
        GenerationError::MalformedRequest(message)
    } else {
        GenerationError::Other(message)
    }
}

/// Checks that a successful call actually produced text.
pub fn require_text(text: String) -> Result<String, GenerationError> {
    if text.trim().is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}

/// Calls `generate` until it succeeds, retrying transient failures.
///
/// `generate` receives the 1-based attempt number. Terminal failures are
/// returned immediately; running out of attempts yields
/// [`GenerationError::RetriesExhausted`].
pub fn with_retry<T, F>(policy: &RetryPolicy, mut generate: F) -> Result<T, GenerationError>
where
    F: FnMut(u32) -> Result<T, GenerationError>,
{
    let mut attempt = 1;
    loop {
        match generate(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => {
                let delay = policy.next_step(attempt, error)?;
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}

fn unwrap_json(message: &str) -> Option<String> {
    let start = message.find('{')?;
    let parsed: ProviderError = serde_json::from_str(message[start..].trim_end()).ok()?;
    let body = parsed.error;

    let mut out = String::new();
    if let Some(code) = body.code {
        out.push_str(&format!("{} ", code));
    }
    if let Some(status) = body.status {
        out.push_str(&format!("{}: ", status));
    }
    out.push_str(body.message.trim());
    Some(out.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick() -> RetryPolicy {
        RetryPolicy::default().with_delay(Duration::ZERO)
    }

    #[test]
    fn test_classify_transient() {
        assert!(classify("503 Service Unavailable").is_transient());
        assert!(classify("The model is OVERLOADED. Please try again later.").is_transient());
        assert!(classify("status: UNAVAILABLE").is_transient());
    }

    #[test]
    fn test_classify_terminal() {
        assert!(matches!(classify("429 Too Many Requests"), GenerationError::QuotaExhausted(_)));
        assert!(matches!(classify("RESOURCE_EXHAUSTED"), GenerationError::QuotaExhausted(_)));
        assert!(matches!(
            classify("API key not valid. Please pass a valid API key."),
            GenerationError::InvalidCredentials(_)
        ));
        assert!(matches!(classify("403 Forbidden"), GenerationError::InvalidCredentials(_)));
        assert!(matches!(classify("400 Bad Request"), GenerationError::MalformedRequest(_)));
        assert!(matches!(classify("connection reset"), GenerationError::Other(_)));
        assert_eq!(classify("   "), GenerationError::EmptyResponse);
    }

    #[test]
    fn test_classify_json_body() {
        let message = r#"got status: {"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        assert_eq!(
            classify(message),
            GenerationError::Overloaded("503 UNAVAILABLE: The model is overloaded.".into())
        );

        let message = r#"{"error":{"message":"API key not valid"}}"#;
        assert_eq!(
            classify(message),
            GenerationError::InvalidCredentials("API key not valid".into())
        );
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("x".into()), Ok("x".into()));
        assert_eq!(require_text("\n".into()), Err(GenerationError::EmptyResponse));
    }

    #[test]
    fn test_retry_until_success() {
        let calls = Cell::new(0);
        let result = with_retry(&quick(), |attempt| {
            calls.set(attempt);
            if attempt < 3 {
                Err(classify("503"))
            } else {
                Ok("giáo án")
            }
        });
        assert_eq!(result, Ok("giáo án"));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retries_exhausted() {
        let calls = Cell::new(0);
        let result: Result<(), _> = with_retry(&quick(), |_| {
            calls.set(calls.get() + 1);
            Err(classify("model overloaded"))
        });
        assert_eq!(calls.get(), 3);
        assert!(matches!(result, Err(GenerationError::RetriesExhausted { attempts: 3, .. })));
    }

    #[test]
    fn test_terminal_error_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = with_retry(&quick(), |_| {
            calls.set(calls.get() + 1);
            Err(classify("429"))
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(GenerationError::QuotaExhausted(_))));
    }

    #[test]
    fn test_zero_attempts_still_calls_once() {
        let policy = quick().with_max_attempts(0);
        let calls = Cell::new(0);
        let _: Result<(), _> = with_retry(&policy, |_| {
            calls.set(calls.get() + 1);
            Err(classify("503"))
        });
        assert_eq!(calls.get(), 1);
    }
}
