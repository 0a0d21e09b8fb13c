use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, error, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::{Result, SumoError};
use crate::models::sumo::{
    SearchJob, SearchJobStatus, SearchRequest, SearchResult, SearchResultsRequest,
};

/// Documented request budget across all Search Job endpoints.
pub const RATE_LIMIT_PER_MINUTE: u32 = 240;

/// Tightest spacing between requests that stays inside [`RATE_LIMIT_PER_MINUTE`].
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

/// A cookie handed out when a job is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// Cookies that pin follow-up requests to the node running the job.
///
/// Only the name and value of each `Set-Cookie` header are kept. A header that
/// does not parse as a cookie is dropped and logged at debug level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionCookies(Vec<SessionCookie>);

impl SessionCookies {
    pub fn new(cookies: Vec<SessionCookie>) -> Self {
        Self(cookies)
    }

    fn from_response(response: &Response) -> Self {
        let cookies: Vec<SessionCookie> = response
            .cookies()
            .map(|c| SessionCookie {
                name: c.name().to_string(),
                value: c.value().to_string(),
            })
            .collect();

        let headers = response.headers().get_all(SET_COOKIE);
        if headers.iter().count() != cookies.len() {
            for header in headers {
                let parsed = header
                    .to_str()
                    .ok()
                    .and_then(|h| h.split(';').next())
                    .and_then(|pair| pair.split_once('='))
                    .is_some_and(|(name, _)| !name.trim().is_empty());
                if !parsed {
                    debug!("Skipping unparseable Set-Cookie header: {:?}", header);
                }
            }
        }

        Self(cookies)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionCookie> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Value for a `Cookie` request header, or `None` when there is nothing to send.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[derive(Clone)]
pub struct SumoClient {
    endpoint: Url,
    token: String,
    client: Client,
}

impl SumoClient {
    /// `token` is sent as-is after `Basic `; it must already be base64 encoded.
    pub fn new(token: impl Into<String>, endpoint: &str) -> Result<Self> {
        let mut endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(SumoError::InvalidEndpoint(format!(
                "{} cannot be used as a base URL",
                endpoint
            )));
        }

        // Relative paths must resolve beneath the configured path, not beside it
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            endpoint,
            token: token.into(),
            client: Client::new(),
        })
    }

    /// Encodes an access id/key pair into the Basic token.
    pub fn from_credentials(access_id: &str, access_key: &str, endpoint: &str) -> Result<Self> {
        Self::new(encode_token(access_id, access_key), endpoint)
    }

    /// Swaps in a caller-configured transport (timeouts, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `POST search/jobs`
    pub async fn start_search(
        &self,
        request: &SearchRequest,
    ) -> Result<(SearchJob, SessionCookies)> {
        let url = self.endpoint.join("search/jobs")?;
        debug!("Starting search job at {}", url);

        let response = self
            .authorized(self.client.post(url.as_str()), None)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let cookies = SessionCookies::from_response(&response);
        let text = response.text().await?;

        match status {
            StatusCode::ACCEPTED => {
                let job: SearchJob = serde_json::from_str(&text)?;
                info!("Search job created: {}", job.id.as_deref().unwrap_or("<no id>"));
                Ok((job, cookies))
            }
            StatusCode::UNAUTHORIZED => {
                error!("Search job rejected: authentication failed");
                Err(SumoError::Authentication)
            }
            StatusCode::BAD_REQUEST => {
                let job: SearchJob = serde_json::from_str(&text)?;
                error!("Search job bad request {}: {}", job.code, job.message);
                Err(SumoError::BadRequest {
                    code: job.code,
                    message: job.message,
                })
            }
            other => {
                error!("Unexpected status {} starting search job: {}", other, text);
                Err(SumoError::UnexpectedStatus(other.as_u16()))
            }
        }
    }

    /// `GET search/jobs/{id}`
    pub async fn get_search_job_status(
        &self,
        job_id: &str,
        cookies: &SessionCookies,
    ) -> Result<SearchJobStatus> {
        let url = self.job_url(job_id, "")?;
        debug!("Getting status for job {} at {}", job_id, url);

        let response = self
            .authorized(self.client.get(url.as_str()), Some(cookies))
            .send()
            .await?;

        expect_ok(response, job_id).await
    }

    /// `GET search/jobs/{id}/messages?offset=&limit=`
    ///
    /// Does not check the job state; a job that is still gathering returns
    /// whatever is available so far.
    pub async fn get_search_results(
        &self,
        request: &SearchResultsRequest,
        cookies: &SessionCookies,
    ) -> Result<SearchResult> {
        let url = self.job_url(&request.job_id, "/messages")?;
        debug!(
            "Fetching messages for job {} (offset {}, limit {})",
            request.job_id, request.offset, request.limit
        );

        let response = self
            .authorized(self.client.get(url.as_str()), Some(cookies))
            .query(&[("offset", request.offset), ("limit", request.limit)])
            .send()
            .await?;

        expect_ok(response, &request.job_id).await
    }

    fn job_url(&self, job_id: &str, suffix: &str) -> Result<Url> {
        let relative = format!("search/jobs/{}{}", urlencoding::encode(job_id), suffix);
        Ok(self.endpoint.join(&relative)?)
    }

    fn authorized(
        &self,
        builder: RequestBuilder,
        cookies: Option<&SessionCookies>,
    ) -> RequestBuilder {
        let builder = builder
            .header(AUTHORIZATION, format!("Basic {}", self.token))
            .header(ACCEPT, "application/json");

        match cookies.and_then(SessionCookies::header_value) {
            Some(value) => builder.header(COOKIE, value),
            None => builder,
        }
    }
}

async fn expect_ok<T: DeserializeOwned>(response: Response, job_id: &str) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if status != StatusCode::OK {
        error!("Unexpected status {} for job {}: {}", status, job_id, text);
        return Err(SumoError::UnexpectedStatus(status.as_u16()));
    }

    Ok(serde_json::from_str(&text)?)
}

/// Basic token for an access id/key pair.
pub fn encode_token(access_id: &str, access_key: &str) -> String {
    STANDARD.encode(format!("{}:{}", access_id, access_key))
}
