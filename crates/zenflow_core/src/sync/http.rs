use super::transport::{
    PushRequest, RemoteEnvelope, SyncTransport, TransportError, TransportResult,
};
use crate::model::snapshot::Snapshot;
use async_trait::async_trait;
use log::{error, info};
use reqwest::{Client, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client for the spreadsheet web-app endpoint.
#[derive(Debug, Clone)]
pub struct HttpSyncTransport {
    client: Client,
    endpoint: Url,
}

impl HttpSyncTransport {
    pub fn new(endpoint: &str) -> TransportResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> TransportResult<Self> {
        let raw = endpoint.trim();
        let endpoint = Url::parse(raw).map_err(|err| TransportError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme `{}`", endpoint.scheme()),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn send_save(&self, body: &PushRequest<'_>) -> TransportResult<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(strip_url)?;
        let text = success_body(response).await?;
        // Some deployments answer a save with plain text; only an explicit
        // error envelope counts as a rejection.
        if let Ok(RemoteEnvelope::Error { message }) = serde_json::from_str::<RemoteEnvelope>(&text) {
            return Err(TransportError::Remote(message));
        }
        Ok(())
    }

    async fn send_load(&self, secret: &SecretString) -> TransportResult<Snapshot> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("action", "load"), ("secret", secret.expose_secret().as_str())])
            .send()
            .await
            .map_err(strip_url)?;
        let text = success_body(response).await?;
        let envelope: RemoteEnvelope = serde_json::from_str(&text)
            .map_err(|err| TransportError::MalformedBody(err.to_string()))?;
        match envelope {
            RemoteEnvelope::Success {
                data: Some(mut snapshot),
            } => {
                snapshot.normalize_schedule();
                Ok(snapshot)
            }
            RemoteEnvelope::Success { data: None } => Err(TransportError::MalformedBody(
                "success envelope without data".to_string(),
            )),
            RemoteEnvelope::Error { message } => Err(TransportError::Remote(message)),
        }
    }
}

#[async_trait]
impl SyncTransport for HttpSyncTransport {
    async fn push(&self, secret: &SecretString, snapshot: &Snapshot) -> TransportResult<()> {
        let started = Instant::now();
        let body = PushRequest {
            action: "save",
            secret: secret.expose_secret(),
            data: snapshot,
        };

        let result = self.send_save(&body).await;

        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(()) => info!(
                "event=remote_push module=sync status=ok members={} classes={} records={} templates={} duration_ms={duration_ms}",
                snapshot.members.len(),
                snapshot.classes.len(),
                snapshot.records.len(),
                snapshot.templates.len(),
            ),
            Err(err) => error!(
                "event=remote_push module=sync status=error duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }

    async fn pull(&self, secret: &SecretString) -> TransportResult<Snapshot> {
        let started = Instant::now();

        let result = self.send_load(secret).await;

        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(snapshot) => info!(
                "event=remote_pull module=sync status=ok members={} classes={} records={} templates={} duration_ms={duration_ms}",
                snapshot.members.len(),
                snapshot.classes.len(),
                snapshot.records.len(),
                snapshot.templates.len(),
            ),
            Err(err) => error!(
                "event=remote_pull module=sync status=error duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }
}

/// The pull URL carries the secret in its query string.
fn strip_url(err: reqwest::Error) -> TransportError {
    TransportError::Http(err.without_url())
}

async fn success_body(response: Response) -> TransportResult<String> {
    let status = response.status();
    let text = response.text().await.map_err(strip_url)?;
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: truncate(&text),
        });
    }
    Ok(text)
}

fn truncate(body: &str) -> String {
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() <= MAX_ERROR_BODY_CHARS {
        return compact;
    }
    let mut clipped: String = compact.chars().take(MAX_ERROR_BODY_CHARS).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::{truncate, HttpSyncTransport, MAX_ERROR_BODY_CHARS};
    use crate::sync::TransportError;

    #[test]
    fn rejects_non_http_endpoints() {
        let err = HttpSyncTransport::new("ftp://example.com/exec").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));

        let err = HttpSyncTransport::new("not a url").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn trims_endpoint_before_parsing() {
        let transport = HttpSyncTransport::new("  https://script.example.com/exec  ").unwrap();
        assert_eq!(transport.endpoint(), "https://script.example.com/exec");
    }

    #[test]
    fn long_error_bodies_are_clipped() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 50);
        let clipped = truncate(&body);
        assert!(clipped.ends_with("..."));
        assert_eq!(clipped.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert_eq!(truncate("bad\n  gateway"), "bad gateway");
    }
}
