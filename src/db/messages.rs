//! Conversation history writes. Two rows per generate request: the user's
//! question and the assistant's accumulated answer.

use chrono::Utc;
use sqlx::PgPool;

use crate::auth::middleware::AuthUser;
use crate::services::prompts::QUESTION_LABEL;
use crate::utils::ip::IpInfo;

pub struct ConversationRecord<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub room_id: Option<&'a str>,
    pub model: &'a str,
    /// "user" or "assistant".
    pub role: &'a str,
    pub text: &'a str,
    pub client_ip: &'a str,
    pub ip_local: bool,
    pub ip_private: bool,
    /// True for an assistant answer cut short by a caller disconnect.
    pub aborted: bool,
}

pub async fn insert_record(pool: &PgPool, record: &ConversationRecord<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO messages
               (user_id, email, room_id, model, role, text,
                client_ip, ip_local, ip_private, aborted, created_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
    )
    .bind(record.user_id)
    .bind(record.email)
    .bind(record.room_id)
    .bind(record.model)
    .bind(record.role)
    .bind(record.text)
    .bind(record.client_ip)
    .bind(record.ip_local)
    .bind(record.ip_private)
    .bind(record.aborted)
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await?;
    Ok(())
}

/// Strip a leading question label if a client echoed the composed prompt
/// back; only the raw question is stored.
pub fn clean_question(question: &str) -> &str {
    question
        .strip_prefix(QUESTION_LABEL)
        .map(str::trim_start)
        .unwrap_or(question)
}

/// Persist both turns of a finished (or aborted) exchange. The streamed
/// response is already fully delivered by now, so failures are logged and
/// swallowed; there is nobody left to surface them to. No retries.
#[allow(clippy::too_many_arguments)]
pub async fn record_exchange(
    pool: &PgPool,
    user: &AuthUser,
    room_id: Option<&str>,
    model: &str,
    question: &str,
    answer: &str,
    ip: &IpInfo,
    aborted: bool,
) {
    let turns = [
        ("user", clean_question(question), false),
        ("assistant", answer, aborted),
    ];

    for (role, text, aborted) in turns {
        let record = ConversationRecord {
            user_id: &user.id,
            email: &user.email,
            room_id,
            model,
            role,
            text,
            client_ip: &ip.ip,
            ip_local: ip.is_local,
            ip_private: ip.is_private,
            aborted,
        };
        if let Err(e) = insert_record(pool, &record).await {
            tracing::error!("storing {} turn failed: {}", role, e);
        }
    }
}
