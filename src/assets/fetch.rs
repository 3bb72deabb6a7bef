use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::foundation::error::{ScenereelError, ScenereelResult};
use crate::pipeline::config::PipelineConfig;

/// Retrieves raw asset bytes with bounded retry.
///
/// Transport errors and non-success HTTP statuses are retryable up to the
/// configured attempt bound with a fixed backoff between attempts; exhaustion
/// propagates a terminal [`ScenereelError::Fetch`] carrying the last cause.
pub struct AssetFetcher {
    client: reqwest::Client,
    attempts: u32,
    backoff: std::time::Duration,
}

impl AssetFetcher {
    /// Build a fetcher from the run configuration.
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            attempts: cfg.fetch_attempts,
            backoff: cfg.fetch_backoff,
        }
    }

    /// Fetch one location, retrying transient failures.
    pub async fn fetch_bytes(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> ScenereelResult<Bytes> {
        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 1..=self.attempts {
            if cancel.is_cancelled() {
                return Err(ScenereelError::Cancelled);
            }
            if attempt > 1 {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ScenereelError::Cancelled),
                    _ = tokio::time::sleep(self.backoff) => {}
                }
            }

            match self.try_fetch(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::debug!(url, attempt, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(ScenereelError::Fetch {
            url: url.to_owned(),
            attempts: self.attempts,
            source: last_err.unwrap_or_else(|| anyhow::anyhow!("no attempts were made")),
        })
    }

    async fn try_fetch(&self, url: &str) -> anyhow::Result<Bytes> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("server responded with status {status}");
        }
        Ok(resp.bytes().await?)
    }

    /// Fetch every image and the audio track concurrently.
    ///
    /// All-or-nothing barrier: the call resolves only when every location has
    /// been retrieved, and fails as soon as any location exhausts its
    /// retries. No partial results are returned.
    pub async fn fetch_all(
        &self,
        image_urls: &[String],
        audio_url: &str,
        cancel: &CancellationToken,
    ) -> ScenereelResult<(Vec<Bytes>, Bytes)> {
        let images = futures::future::try_join_all(
            image_urls.iter().map(|url| self.fetch_bytes(url, cancel)),
        );
        let audio = self.fetch_bytes(audio_url, cancel);
        tokio::try_join!(images, audio)
    }
}
