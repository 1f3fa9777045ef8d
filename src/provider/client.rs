use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    Collection, CurrentUser, Event, EventTiming, RawInvitee, Resource, SchedulingProvider,
};
use crate::config::ProviderConfig;
use crate::error::ScheduleError;

/// How often and how patiently transient failures are retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_retries: 0, base_backoff: Duration::ZERO }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1 << (attempt - 1).min(16))
    }
}

/// A failed request, tagged with whether repeating it could help
struct FetchFailure {
    transient: bool,
    cause: String,
}

impl FetchFailure {
    fn transient(cause: impl Into<String>) -> Self {
        Self { transient: true, cause: cause.into() }
    }

    fn permanent(cause: impl Into<String>) -> Self {
        Self { transient: false, cause: cause.into() }
    }
}

/// HTTP client for the scheduling provider's REST API
pub struct ProviderClient {
    http: Client,
    base_url: Url,
    token: SecretString,
    retry: RetryPolicy,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig, token: SecretString) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid provider base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Provider base URL cannot carry paths: {}", base_url));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            token,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build an endpoint URL from path segments below the base URL.
    /// An empty final segment produces a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ScheduleError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(body) => return Ok(body),
                Err(failure) if failure.transient && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "GET {} failed ({}), retry {}/{} in {:?}",
                        url.path(),
                        failure.cause,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => {
                    return Err(ScheduleError::ProviderUnavailable {
                        endpoint: url.path().to_string(),
                        cause: failure.cause,
                        transient: failure.transient,
                    })
                }
            }
        }
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchFailure> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    FetchFailure::transient(e.to_string())
                } else {
                    FetchFailure::permanent(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let cause = format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            );
            return Err(if is_transient_status(status) {
                FetchFailure::transient(cause)
            } else {
                FetchFailure::permanent(cause)
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::transient(format!("Failed to read body: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| FetchFailure::permanent(format!("Failed to decode body: {}", e)))
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl SchedulingProvider for ProviderClient {
    async fn current_user(&self) -> Result<CurrentUser, ScheduleError> {
        let user: Resource<CurrentUser> = self.get(self.endpoint(&["users", "me"])).await?;
        Ok(user.resource)
    }

    async fn list_events(&self, organization: &str) -> Result<Vec<Event>, ScheduleError> {
        let mut url = self.endpoint(&["scheduled_events", ""]);
        url.query_pairs_mut().append_pair("organization", organization);
        let events: Collection<Event> = self.get(url).await?;
        Ok(events.collection)
    }

    async fn list_invitees(&self, event_id: &str) -> Result<Vec<RawInvitee>, ScheduleError> {
        let url = self.endpoint(&["scheduled_events", event_id, "invitees"]);
        let invitees: Collection<RawInvitee> = self.get(url).await?;
        Ok(invitees.collection)
    }

    async fn get_event(&self, event_id: &str) -> Result<EventTiming, ScheduleError> {
        let event: Resource<EventTiming> =
            self.get(self.endpoint(&["scheduled_events", event_id])).await?;
        Ok(event.resource)
    }
}
