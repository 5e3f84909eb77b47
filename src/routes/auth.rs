use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::jwt;
use crate::auth::password::{hash_password, verify_password};
use crate::db;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

#[derive(Deserialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> (StatusCode, Json<Value>) {
    if body.email.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email is required"})),
        );
    }
    if body.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Password must be at least 8 characters"})),
        );
    }

    let hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("register: password hashing failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Registration failed"})),
            );
        }
    };

    match db::users::create_user(&state.db, body.email.trim(), &hash).await {
        Ok(_) => (StatusCode::CREATED, Json(json!({"ok": true}))),
        Err(e) if e
            .as_database_error()
            .is_some_and(|d| d.is_unique_violation()) =>
        {
            (
                StatusCode::CONFLICT,
                Json(json!({"error": "Email already exists"})),
            )
        }
        Err(e) => {
            tracing::error!("register: insert failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Registration failed"})),
            )
        }
    }
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> (StatusCode, Json<Value>) {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
    };

    let user = match db::users::find_by_email(&state.db, body.email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid(),
        Err(e) => {
            tracing::error!("login: lookup failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Login failed"})),
            );
        }
    };

    if !verify_password(&body.password, &user.password_hash) {
        return invalid();
    }

    match jwt::issue(&state.config.jwt_secret, &user.id.to_string(), &user.email) {
        Ok(token) => (StatusCode::OK, Json(json!({"token": token}))),
        Err(e) => {
            tracing::error!("login: token issue failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Login failed"})),
            )
        }
    }
}
