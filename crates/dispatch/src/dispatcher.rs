//! Asynchronous signal dispatch with fixed backoff and a dead-letter sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use common::RetrySchedule;

use crate::dead_letter::{DeadLetter, DeadLetterSink};
use crate::signer::{SignalSigner, SignedHeaders, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Errors terminating one dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 4xx-class response; never retried.
    #[error("permanently rejected with status {status}")]
    Rejected { status: u16 },

    /// Retry ceiling reached; the signal was dead-lettered.
    #[error("gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// A transport failure worth retrying (5xx or connection-level).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Injected transport. Production uses [`HttpTransport`]; tests script
/// responses without a server.
#[async_trait]
pub trait SignalTransport: Send + Sync {
    /// Post a signed body, returning the response status code.
    async fn post(
        &self,
        url: &str,
        headers: &SignedHeaders,
        body: &str,
    ) -> Result<u16, TransportFailure>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl SignalTransport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &SignedHeaders,
        body: &str,
    ) -> Result<u16, TransportFailure> {
        let response = self
            .client
            .post(url)
            .header(TIMESTAMP_HEADER, &headers.timestamp)
            .header(SIGNATURE_HEADER, &headers.signature)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| TransportFailure(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

/// Dispatch counters, readable for metrics export.
#[derive(Default)]
pub struct DispatchStats {
    pub delivered: AtomicU64,
    pub retries: AtomicU64,
    pub rejected: AtomicU64,
    pub dead_lettered: AtomicU64,
}

/// Delivers order signals to a downstream consumer.
///
/// Each dispatch signs the canonical JSON body and walks the fixed retry
/// schedule until success, a permanent 4xx rejection, or the attempt
/// ceiling. Undelivered signals are persisted to the dead-letter sink.
pub struct SignalDispatcher<T> {
    transport: Arc<T>,
    signer: SignalSigner,
    schedule: RetrySchedule,
    max_attempts: u32,
    sink: Arc<dyn DeadLetterSink>,
    stats: Arc<DispatchStats>,
}

impl<T: SignalTransport> SignalDispatcher<T> {
    pub fn new(
        transport: Arc<T>,
        signer: SignalSigner,
        schedule: RetrySchedule,
        max_attempts: u32,
        sink: Arc<dyn DeadLetterSink>,
    ) -> Self {
        Self {
            transport,
            signer,
            schedule,
            max_attempts: max_attempts.max(1),
            sink,
            stats: Arc::new(DispatchStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        self.stats.clone()
    }

    /// Dispatch one payload. The body is serialized once and re-signed per
    /// attempt so each retry carries a fresh timestamp.
    pub async fn dispatch<P: Serialize + Sync>(
        &self,
        url: &str,
        payload: &P,
    ) -> Result<(), DispatchError> {
        let body = serde_json::to_string(payload)?;
        let mut schedule = self.schedule.clone();
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            let delay = schedule.next_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let headers = self.signer.headers_for(&body);
            match self.transport.post(url, &headers, &body).await {
                Ok(status) if (200..300).contains(&status) => {
                    info!(url, attempt, "signal delivered");
                    self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Ok(status) if (400..500).contains(&status) => {
                    warn!(url, status, attempt, "signal permanently rejected");
                    self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                    self.dead_letter(url, &body, attempt, format!("status {status}"));
                    return Err(DispatchError::Rejected { status });
                }
                Ok(status) => {
                    last_error = format!("status {status}");
                }
                Err(err) => {
                    last_error = err.to_string();
                }
            }

            if attempt < self.max_attempts {
                warn!(url, attempt, error = %last_error, "dispatch attempt failed, will retry");
                self.stats.retries.fetch_add(1, Ordering::Relaxed);
            }
        }

        warn!(url, attempts = self.max_attempts, error = %last_error, "dispatch exhausted");
        self.dead_letter(url, &body, self.max_attempts, last_error.clone());
        Err(DispatchError::Exhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }

    fn dead_letter(&self, url: &str, body: &str, attempts: u32, last_error: String) {
        self.stats.dead_lettered.fetch_add(1, Ordering::Relaxed);
        self.sink.store(DeadLetter {
            url: url.to_string(),
            body: body.to_string(),
            attempts,
            last_error,
            failed_at: Utc::now(),
        });
    }
}
