//! The streaming relay: consume the upstream newline-delimited JSON body,
//! forward every complete line to the caller the moment it is available,
//! and concurrently accumulate the assistant's full answer for persistence.
//!
//! Lines are re-emitted verbatim and in upstream order, one channel send per
//! line, with no batching and no full-response buffering. A line that fails JSON
//! parsing is still forwarded; it just contributes nothing to the answer.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

/// How a relay ended, carrying the answer accumulated up to that point.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream reached end-of-stream and every line was delivered.
    Completed(String),
    /// The caller hung up mid-stream; holds the partial answer.
    Aborted(String),
    /// The upstream read failed before end-of-stream.
    Failed { partial: String, error: String },
}

/// Relay `upstream` into `tx` line by line.
///
/// `tx` feeds the caller-facing response body; a failed send means the
/// receiver (and therefore the caller's connection) is gone, which is
/// treated as a graceful abort, not an error.
pub async fn relay<S, E>(upstream: S, tx: mpsc::Sender<Bytes>) -> RelayOutcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut upstream = std::pin::pin!(upstream);
    let mut leftover = String::new();
    let mut answer = String::new();

    while let Some(chunk) = upstream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("upstream stream read failed: {}", e);
                return RelayOutcome::Failed {
                    partial: answer,
                    error: e.to_string(),
                };
            }
        };

        leftover.push_str(&String::from_utf8_lossy(&bytes));

        // Every complete line is handled now; the trailing fragment stays
        // in `leftover` until the next read.
        while let Some(pos) = leftover.find('\n') {
            let rest = leftover.split_off(pos + 1);
            let mut line = std::mem::replace(&mut leftover, rest);
            line.pop(); // the '\n'
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                continue;
            }

            if tx.send(Bytes::from(format!("{line}\n"))).await.is_err() {
                return RelayOutcome::Aborted(answer);
            }
            accumulate(line, &mut answer);
        }
    }

    // Flush whatever is left in the buffer once upstream closes.
    if !leftover.is_empty() {
        if tx.send(Bytes::from(leftover.clone())).await.is_err() {
            return RelayOutcome::Aborted(answer);
        }
        accumulate(leftover.trim_end_matches('\r'), &mut answer);
    }

    RelayOutcome::Completed(answer)
}

/// Best-effort parse of one chunk line; append its `response` field to the
/// running answer. Undecodable lines are logged and skipped (they were
/// already forwarded to the caller).
fn accumulate(line: &str, answer: &mut String) {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(chunk) => {
            if let Some(text) = chunk.get("response").and_then(|v| v.as_str()) {
                answer.push_str(text);
            }
        }
        Err(e) => {
            tracing::warn!("skipping undecodable stream line ({}): {}", e, line);
        }
    }
}
