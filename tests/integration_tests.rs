/// Integration tests for the gptchat server.
///
/// These tests require a running PostgreSQL instance and at least one live
/// Ollama endpoint, so they are all marked with `#[ignore]`. Run them
/// explicitly with:
///
///   cargo test --test integration_tests -- --ignored

// ============================================================================
// Auth flow
// ============================================================================
#[cfg(test)]
mod auth_flow_tests {
    #[test]
    #[ignore]
    fn register_then_login_yields_a_usable_token() {
        // POST /api/auth/register with a fresh email, expect 201.
        // POST /api/auth/login with the same credentials, expect 200 and a
        // token that passes the AuthUser extractor on /api/generate.
        todo!()
    }

    #[test]
    #[ignore]
    fn duplicate_registration_returns_409() {
        // Register the same email twice; the second call must return 409
        // with {"error": "Email already exists"}.
        todo!()
    }

    #[test]
    #[ignore]
    fn generate_without_bearer_token_returns_401() {
        // POST /api/generate with no Authorization header.
        // Expect 401 before any endpoint is contacted (no new messages rows).
        todo!()
    }
}

// ============================================================================
// Streaming generate flow
// ============================================================================
#[cfg(test)]
mod generate_flow_tests {
    #[test]
    #[ignore]
    fn generate_streams_ndjson_and_persists_two_rows() {
        // POST /api/generate with a small question against a live Ollama.
        // Read the response body incrementally; every line must be a JSON
        // object. After the stream ends, the messages table must contain one
        // 'user' row (the raw question) and one 'assistant' row whose text
        // equals the concatenation of all `response` fields.
        todo!()
    }

    #[test]
    #[ignore]
    fn unreachable_endpoint_returns_502_and_persists_nothing() {
        // Point OLLAMA_ENDPOINTS at a closed port. The request must fail
        // with 502 and the messages table must stay unchanged.
        todo!()
    }

    #[test]
    #[ignore]
    fn client_disconnect_stores_partial_answer_tagged_aborted() {
        // Start a generate request, read a few lines, then drop the
        // connection. The assistant row must hold the partial text with
        // aborted = true.
        todo!()
    }

    #[test]
    #[ignore]
    fn requests_rotate_across_the_endpoint_pool() {
        // With two endpoints configured, two sequential requests must hit
        // different instances (observable via per-instance access logs).
        todo!()
    }

    #[test]
    #[ignore]
    fn reload_prompts_flag_picks_up_config_edits() {
        // Edit config/prompts.json, call /api/generate?reload_prompts=true,
        // and verify the upstream request body carries the new system prompt.
        todo!()
    }
}
