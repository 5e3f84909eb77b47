//! Round-robin pool of Ollama inference endpoints.
//!
//! Built once at startup from `OLLAMA_ENDPOINTS` and shared through
//! `AppState`; the cursor is an atomic so concurrent requests each advance
//! it exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::Environment;

/// Single-instance default used when no endpoints are configured in development.
pub const DEV_DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, thiserror::Error)]
pub enum EndpointPoolError {
    #[error("OLLAMA_ENDPOINTS is not configured and production has no default endpoint")]
    NoEndpoints,
}

pub struct EndpointPool {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl EndpointPool {
    /// Parse the comma-separated endpoint list. An empty list falls back to
    /// the localhost instance in development and is a hard error in
    /// production.
    pub fn from_config(raw: &str, environment: Environment) -> Result<Self, EndpointPoolError> {
        let mut endpoints: Vec<String> = raw
            .split(',')
            .map(|e| e.trim().trim_end_matches('/').to_string())
            .filter(|e| !e.is_empty())
            .collect();

        if endpoints.is_empty() {
            match environment {
                Environment::Development => {
                    tracing::info!(
                        "no OLLAMA_ENDPOINTS configured, using development default {}",
                        DEV_DEFAULT_ENDPOINT
                    );
                    endpoints.push(DEV_DEFAULT_ENDPOINT.to_string());
                }
                Environment::Production => return Err(EndpointPoolError::NoEndpoints),
            }
        }

        tracing::info!(count = endpoints.len(), "inference endpoint pool ready");

        Ok(Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Next endpoint in strict rotation. The cursor stays in `[0, len)` and
    /// advances once per call as a single atomic read-modify-write.
    pub fn next(&self) -> &str {
        let len = self.endpoints.len();
        let idx = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or(0); // the closure is total, fetch_update cannot fail

        &self.endpoints[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_visits_every_endpoint_once_then_wraps() {
        let pool =
            EndpointPool::from_config("http://a:11434,http://b:11434,http://c:11434", Environment::Production)
                .unwrap();

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.next(), "http://a:11434");
        assert_eq!(pool.next(), "http://b:11434");
        assert_eq!(pool.next(), "http://c:11434");
        // Fourth call wraps back to the first endpoint.
        assert_eq!(pool.next(), "http://a:11434");
    }

    #[test]
    fn list_parsing_trims_whitespace_and_drops_empty_segments() {
        let pool = EndpointPool::from_config(
            " http://a:11434 , ,http://b:11434/,",
            Environment::Production,
        )
        .unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.next(), "http://a:11434");
        assert_eq!(pool.next(), "http://b:11434");
    }

    #[test]
    fn empty_list_in_development_falls_back_to_localhost() {
        let pool = EndpointPool::from_config("", Environment::Development).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.next(), DEV_DEFAULT_ENDPOINT);
        assert_eq!(pool.next(), DEV_DEFAULT_ENDPOINT);
    }

    #[test]
    fn empty_list_in_production_is_a_configuration_error() {
        let err = EndpointPool::from_config("  , ", Environment::Production);
        assert!(matches!(err, Err(EndpointPoolError::NoEndpoints)));
    }
}
