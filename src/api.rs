//! Client for the backend's JSON API.
//!
//! The [`Backend`] trait is the seam between rendering code and the network:
//! [`HttpBackend`] talks to a live server with `ureq`, tests substitute an
//! in-memory fake. Every call is attempted exactly once, without retries or
//! timeouts.
//!
//! Payloads are validated here, at the boundary. A body that doesn't match
//! the expected shape is an [`ApiError::Invalid`], and semantic problems
//! (duplicate series tags) are an [`ApiError::Validation`], so the view code
//! only ever sees well-formed [`crate::types`] values.

use crate::types::{LoginData, TrimmedSeries, duplicate_tags};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Characters `encodeURIComponent` leaves alone, removed from the escape set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("unexpected {what} payload: {source}")]
    Invalid {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid API data: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body of a series `PATCH`: only the fields that changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SeriesPatch {
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.title.is_none()
    }
}

/// Outcome of a mutating request that reached the server.
///
/// A non-2xx status is not an error here: its body is the message the user
/// sees inline.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResponse {
    pub ok: bool,
    pub body: String,
}

/// The endpoints this crate consumes.
pub trait Backend {
    /// `GET /api/auth/me`
    fn login_info(&self) -> Result<LoginData, ApiError>;
    /// `GET /api/series`
    fn list_series(&self) -> Result<Vec<TrimmedSeries>, ApiError>;
    /// `GET /api/snippet/{id}`, raw markdown.
    fn snippet_content(&self, message_id: u64) -> Result<String, ApiError>;
    /// `PATCH /api/series/{tag}`
    fn update_series(&self, tag: &str, patch: &SeriesPatch)
    -> Result<MutationResponse, ApiError>;
    /// `DELETE /api/series/{tag}`
    fn delete_series(&self, tag: &str) -> Result<MutationResponse, ApiError>;
}

/// Percent-encode a path segment the way `encodeURIComponent` does.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Path of a series resource, with the tag encoded.
pub fn series_path(tag: &str) -> String {
    format!("/api/series/{}", encode_component(tag))
}

/// Parse and validate a series listing.
pub fn parse_series_list(body: &str) -> Result<Vec<TrimmedSeries>, ApiError> {
    let list: Vec<TrimmedSeries> = serde_json::from_str(body).map_err(|source| ApiError::Invalid {
        what: "series list",
        source,
    })?;
    let dupes = duplicate_tags(&list);
    if !dupes.is_empty() {
        return Err(ApiError::Validation(format!(
            "duplicate series tags: {}",
            dupes.join(", ")
        )));
    }
    Ok(list)
}

pub fn parse_login(body: &str) -> Result<LoginData, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Invalid {
        what: "login",
        source,
    })
}

/// [`Backend`] over HTTP.
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    session_cookie: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, session_cookie: Option<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie: session_cookie.filter(|c| !c.is_empty()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        debug!(method, url, "api request");
        let request = self.agent.request(method, url);
        match &self.session_cookie {
            Some(cookie) => request.set("Cookie", &format!("session={cookie}")),
            None => request,
        }
    }

    /// GET `path` and return the body; any non-2xx status is an error.
    fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        match self.request("GET", &url).call() {
            Ok(response) => Ok(response.into_string()?),
            Err(ureq::Error::Status(status, response)) => Err(ApiError::Status {
                body: response.into_string()?,
                url,
                status,
            }),
            Err(err) => Err(ApiError::Transport {
                url,
                source: Box::new(err),
            }),
        }
    }

    fn mutation(
        &self,
        url: String,
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<MutationResponse, ApiError> {
        match result {
            Ok(response) => Ok(MutationResponse {
                ok: true,
                body: response.into_string()?,
            }),
            Err(ureq::Error::Status(status, response)) => {
                debug!(url = %url, status, "mutation rejected");
                Ok(MutationResponse {
                    ok: false,
                    body: response.into_string()?,
                })
            }
            Err(err) => Err(ApiError::Transport {
                url,
                source: Box::new(err),
            }),
        }
    }
}

impl Backend for HttpBackend {
    fn login_info(&self) -> Result<LoginData, ApiError> {
        parse_login(&self.get_text("/api/auth/me")?)
    }

    fn list_series(&self) -> Result<Vec<TrimmedSeries>, ApiError> {
        parse_series_list(&self.get_text("/api/series")?)
    }

    fn snippet_content(&self, message_id: u64) -> Result<String, ApiError> {
        self.get_text(&format!("/api/snippet/{message_id}"))
    }

    fn update_series(
        &self,
        tag: &str,
        patch: &SeriesPatch,
    ) -> Result<MutationResponse, ApiError> {
        let url = self.url(&series_path(tag));
        let result = self
            .request("PATCH", &url)
            .set("Content-Type", "application/json")
            .send_json(patch);
        self.mutation(url, result)
    }

    fn delete_series(&self, tag: &str) -> Result<MutationResponse, ApiError> {
        let url = self.url(&series_path(tag));
        let result = self.request("DELETE", &url).call();
        self.mutation(url, result)
    }
}
