//! Remote HTTP-backed identity source.
//!
//! Every source-specific detail lives in this file: endpoint shapes, the
//! pre-shared deployment key header, status-code mapping, and the wire
//! payload with its vendor field names. No other component ever sees a
//! vendor field name; records leave this module in canonical
//! [`IdentityRecord`] shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use its_model::{IdentityRecord, ItsId};

use crate::config::SourceConfig;
use crate::error::{SourceError, SourceResult};
use crate::retry::{with_retry, RetryPolicy};
use crate::source::IdentitySource;

/// Header carrying the pre-shared deployment key.
const API_KEY_HEADER: &str = "X-ITS-Api-Key";

/// HTTP client for the external registry.
///
/// Transient failures (transport errors, 5xx) are retried with
/// exponential backoff; 4xx responses are treated as missing records and
/// never retried.
pub struct RemoteIdentitySource {
    client: reqwest::Client,
    fetch_base_url: String,
    credential_base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl RemoteIdentitySource {
    /// Creates a remote source from configuration.
    ///
    /// ## Errors
    ///
    /// Returns [`SourceError::Configuration`] when either base URL or
    /// the deployment key is missing, or the HTTP client cannot be
    /// built.
    pub fn new(config: &SourceConfig) -> SourceResult<Self> {
        let fetch_base_url = required(&config.fetch_base_url, "fetch base URL")?;
        let credential_base_url = required(&config.credential_base_url, "credential base URL")?;
        let api_key = required(&config.api_key, "deployment key")?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SourceError::config(format!("http client: {e}")))?;

        Ok(Self {
            client,
            fetch_base_url: trim_trailing_slash(fetch_base_url),
            credential_base_url: trim_trailing_slash(credential_base_url),
            api_key,
            retry: RetryPolicy::with_attempts(config.retry_attempts),
        })
    }

    async fn fetch_once(&self, id: &ItsId) -> SourceResult<IdentityRecord> {
        let url = format!("{}/api/v1/members/{}", self.fetch_base_url, id);
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            let wire: WirePerson = response.json().await.map_err(map_transport)?;
            map_person(wire)
        } else if status.is_client_error() {
            Err(SourceError::NotFound(id.clone()))
        } else {
            Err(SourceError::timeout(format!("registry returned {status}")))
        }
    }

    async fn search_once(&self, query: &str) -> SourceResult<Vec<IdentityRecord>> {
        let url = format!("{}/api/v1/members", self.fetch_base_url);
        let response = self
            .client
            .get(url)
            .query(&[("query", query)])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_client_error() {
            return Err(SourceError::validation(format!(
                "registry rejected search: {status}"
            )));
        }
        if !status.is_success() {
            return Err(SourceError::timeout(format!("registry returned {status}")));
        }

        let wire: WireSearchResponse = response.json().await.map_err(map_transport)?;
        let mut records = Vec::with_capacity(wire.results.len());
        for person in wire.results {
            match map_person(person) {
                Ok(record) => records.push(record),
                Err(err) => {
                    // One malformed entry must not lose the whole page.
                    tracing::warn!(error = %err, "skipping unmappable search result");
                }
            }
        }
        Ok(records)
    }

    async fn validate_once(&self, id: &ItsId, secret: &str) -> SourceResult<bool> {
        let url = format!("{}/api/v1/credentials/check", self.credential_base_url);
        let body = WireCredentialCheck {
            its_id: id.as_str(),
            password: secret,
        };
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            let wire: WireCredentialResult = response.json().await.map_err(map_transport)?;
            Ok(wire.valid)
        } else if status.is_client_error() {
            // Unknown id and wrong secret are indistinguishable here.
            Ok(false)
        } else {
            Err(SourceError::timeout(format!("registry returned {status}")))
        }
    }
}

#[async_trait]
impl IdentitySource for RemoteIdentitySource {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn fetch(&self, id: &ItsId) -> SourceResult<IdentityRecord> {
        with_retry(&self.retry, "fetch", || self.fetch_once(id)).await
    }

    async fn search(&self, query: &str) -> SourceResult<Vec<IdentityRecord>> {
        with_retry(&self.retry, "search", || self.search_once(query)).await
    }

    async fn validate_credentials(&self, id: &ItsId, secret: &str) -> SourceResult<bool> {
        with_retry(&self.retry, "validate_credentials", || {
            self.validate_once(id, secret)
        })
        .await
    }

    async fn probe(&self) -> SourceResult<()> {
        let url = format!("{}/api/v1/health", self.fetch_base_url);
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SourceError::timeout(format!(
                "registry health check returned {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Wire payloads
// ============================================================================

/// Person payload as the registry returns it. Vendor field names stay in
/// this file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct WirePerson {
    its_id: String,
    first_name: String,
    #[serde(default)]
    middle_name: Option<String>,
    last_name: String,
    #[serde(default)]
    email_address: Option<String>,
    #[serde(default)]
    mobile_no: Option<String>,
    #[serde(default)]
    occupation: Option<String>,
    #[serde(default)]
    member_category: Option<String>,
    #[serde(default)]
    street_address: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    photo_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct WireSearchResponse {
    #[serde(default)]
    results: Vec<WirePerson>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct WireCredentialCheck<'a> {
    its_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct WireCredentialResult {
    valid: bool,
}

/// Maps a wire person into the canonical record shape.
fn map_person(wire: WirePerson) -> SourceResult<IdentityRecord> {
    let id: ItsId = wire
        .its_id
        .parse()
        .map_err(|e| SourceError::validation(format!("registry returned bad id: {e}")))?;

    Ok(IdentityRecord {
        id,
        first_name: wire.first_name,
        middle_name: wire.middle_name.filter(|m| !m.is_empty()),
        last_name: wire.last_name,
        email: wire.email_address.unwrap_or_default(),
        phone: wire.mobile_no.unwrap_or_default(),
        occupation: wire.occupation.unwrap_or_default(),
        category: wire.member_category.unwrap_or_default(),
        address: wire.street_address.unwrap_or_default(),
        nationality: wire.nationality.unwrap_or_default(),
        photo_ref: wire.photo_path.unwrap_or_default(),
    })
}

fn map_transport(err: reqwest::Error) -> SourceError {
    if err.is_decode() {
        SourceError::validation(format!("malformed registry response: {err}"))
    } else {
        // Connect failures, timeouts and mid-body drops are all worth a
        // later retry.
        SourceError::timeout(err.to_string())
    }
}

fn required(value: &Option<String>, what: &str) -> SourceResult<String> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| SourceError::config(format!("remote source requires a {what}")))
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
