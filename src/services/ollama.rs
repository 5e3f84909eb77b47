//! Outbound calls to the Ollama inference service, plus the per-environment
//! model catalog surfaced by `GET /api/models`.

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::Environment;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The endpoint could not be reached (or failed before response headers).
    #[error("failed to reach inference endpoint {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

pub fn generate_url(endpoint: &str) -> String {
    format!("{}/api/generate", endpoint.trim_end_matches('/'))
}

/// Build the `/api/generate` body: model, composed prompt, streaming on,
/// plus any extra generation options the caller passed through. Extras are
/// applied last, matching the original request-spread behavior.
pub fn build_payload(model: &str, prompt: &str, extra: &Map<String, Value>) -> Value {
    let mut body = json!({
        "model": model,
        "prompt": prompt,
        "stream": true,
    });
    if let Some(obj) = body.as_object_mut() {
        for (key, value) in extra {
            obj.insert(key.clone(), value.clone());
        }
    }
    body
}

/// Issue the streaming generate request. Transport failures before any
/// response arrive map to `UpstreamError::Connect`; the status of a reachable
/// upstream is left for the route to mirror.
pub async fn start_generate(
    client: &Client,
    endpoint: &str,
    payload: &Value,
) -> Result<reqwest::Response, UpstreamError> {
    client
        .post(generate_url(endpoint))
        .json(payload)
        .send()
        .await
        .map_err(|source| UpstreamError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Model catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelOption {
    pub id: &'static str,
    pub label: &'static str,
}

const DEVELOPMENT_MODELS: &[ModelOption] = &[ModelOption {
    id: "gemma3:1b",
    label: "Gemma 3 1B",
}];

const PRODUCTION_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gpt-oss:20b",
        label: "Fast",
    },
    ModelOption {
        id: "gpt-oss:120b",
        label: "Quality",
    },
];

pub fn model_options(environment: Environment) -> &'static [ModelOption] {
    match environment {
        Environment::Development => DEVELOPMENT_MODELS,
        Environment::Production => PRODUCTION_MODELS,
    }
}

pub fn default_model(environment: Environment) -> &'static str {
    model_options(environment)[0].id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_tolerates_trailing_slash() {
        assert_eq!(
            generate_url("http://localhost:11434/"),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            generate_url("http://localhost:11434"),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn payload_carries_extras_and_forces_streaming() {
        let mut extra = Map::new();
        extra.insert("temperature".into(), json!(0.2));
        extra.insert("num_ctx".into(), json!(4096));

        let payload = build_payload("gpt-oss:20b", "final prompt", &extra);

        assert_eq!(payload["model"], "gpt-oss:20b");
        assert_eq!(payload["prompt"], "final prompt");
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["num_ctx"], 4096);
    }

    #[test]
    fn default_model_is_the_first_catalog_entry() {
        assert_eq!(default_model(Environment::Development), "gemma3:1b");
        assert_eq!(default_model(Environment::Production), "gpt-oss:20b");
    }
}
