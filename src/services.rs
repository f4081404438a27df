use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

use crate::config::Config;
use crate::errors::EnrichmentError;
use crate::models::{CarInfoPayload, EnrichedInfo};

/// Lookup of vehicle and owner details by registration number.
///
/// Implemented by [`CarInfoService`] in production; tests substitute fakes.
#[async_trait]
pub trait CarInfoApi: Send + Sync {
    async fn lookup(&self, reg_num: &str) -> Result<EnrichedInfo, EnrichmentError>;
}

/// Client for the external car info API.
///
/// Issues `GET <base_url>?regNum=<number>` and decodes the strict
/// [`CarInfoPayload`] schema.
#[derive(Clone)]
pub struct CarInfoService {
    client: Client,
    base_url: Url,
}

impl CarInfoService {
    /// Creates a client whose requests are cancelled after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EnrichmentError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            EnrichmentError::Transport(format!("invalid enrichment base URL: {}", e))
        })?;
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            EnrichmentError::Transport(format!("failed to create enrichment client: {}", e))
        })?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, EnrichmentError> {
        Self::new(&config.enrichment_api_url, config.enrichment_timeout())
    }

    fn lookup_url(&self, reg_num: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("regNum", reg_num);
        url
    }
}

#[async_trait]
impl CarInfoApi for CarInfoService {
    async fn lookup(&self, reg_num: &str) -> Result<EnrichedInfo, EnrichmentError> {
        let url = self.lookup_url(reg_num);
        tracing::debug!("Fetching car info for {}: {}", reg_num, url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // Best effort: a failed read still reports the status.
            let body = read_capped(response, ERROR_BODY_LIMIT)
                .await
                .map(|(body, _)| body)
                .unwrap_or_default();
            return Err(map_status_error(status, &body));
        }

        let (body, truncated) = read_capped(response, PAYLOAD_LIMIT)
            .await
            .map_err(map_transport_error)?;
        if truncated {
            return Err(EnrichmentError::Decode(format!(
                "payload exceeds {} bytes",
                PAYLOAD_LIMIT
            )));
        }

        let payload: CarInfoPayload = serde_json::from_slice(&body)
            .map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        if payload.reg_num != reg_num {
            tracing::warn!(
                "Car info API answered {} for requested {}",
                payload.reg_num,
                reg_num
            );
        }

        Ok(payload.into())
    }
}

/// Largest successful payload accepted from the car info API.
const PAYLOAD_LIMIT: usize = 64 * 1024;
/// How much of an error body is read for the preview.
const ERROR_BODY_LIMIT: usize = 4 * 1024;

/// Reads at most `limit` bytes of the body. The flag is set when more was available.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}

fn map_transport_error(error: reqwest::Error) -> EnrichmentError {
    if error.is_timeout() {
        EnrichmentError::Timeout(error.to_string())
    } else {
        EnrichmentError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EnrichmentError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let preview = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect::<String>();

    EnrichmentError::RemoteStatus {
        status: status.as_u16(),
        body: preview,
    }
}
