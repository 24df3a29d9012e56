//! Shared test utilities for the basil-web test suite.
//!
//! Provides data builders for the API types and an in-memory [`FakeBackend`]
//! that records every call it receives.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut s = trimmed_series("wolves", "Of Wolves");
//! s.can_edit = true;
//!
//! let backend = FakeBackend::rejecting("Tag already in use");
//! // ... drive EditControls against `backend` ...
//! assert_eq!(backend.calls(), vec![Call::Delete("wolves".into())]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use crate::api::{ApiError, Backend, MutationResponse, SeriesPatch};
use crate::types::{Author, LoginData, Series, Snippet, TrimmedSeries, TrimmedSnippet};

// =========================================================================
// Data builders
// =========================================================================

pub fn author(id: u64, names: &[&str], username: &str, discriminator: &str) -> Author {
    Author {
        id,
        display_names: names.iter().map(|n| n.to_string()).collect(),
        username: username.to_string(),
        discriminator: discriminator.to_string(),
    }
}

pub fn trimmed_snippet(message_id: u64) -> TrimmedSnippet {
    TrimmedSnippet {
        author_id: 1,
        message_id,
        channel_id: 100,
    }
}

pub fn snippet(message_id: u64, content: &str) -> Snippet {
    Snippet {
        meta: trimmed_snippet(message_id),
        content: content.to_string(),
        attachment_urls: Vec::new(),
    }
}

fn series<S>(tag: &str, title: &str) -> Series<S> {
    Series {
        tag: tag.to_string(),
        title: title.to_string(),
        authors: Vec::new(),
        subscribers: Vec::new(),
        updated: None,
        url: format!("/series/{tag}"),
        warnings: Vec::new(),
        wordcount: 0,
        can_edit: false,
        snippets: Vec::new(),
    }
}

/// A read-only listing entry with no authors and no snippets.
pub fn trimmed_series(tag: &str, title: &str) -> TrimmedSeries {
    series(tag, title)
}

/// A full series with no authors and no snippets.
pub fn full_series(tag: &str, title: &str) -> Series {
    series(tag, title)
}

pub fn logged_in(username: &str) -> LoginData {
    LoginData {
        session_id: "session".to_string(),
        dev_mode: false,
        user_data: Some(author(7, &[username], username, "0007")),
    }
}

// =========================================================================
// Fake backend
// =========================================================================

/// A request received by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login,
    List,
    Snippet(u64),
    Update(String, SeriesPatch),
    Delete(String),
}

#[derive(Debug, Clone, Default)]
enum Mode {
    #[default]
    Accept,
    Reject(String),
    Fail,
}

/// In-memory [`Backend`]. Mutations are accepted unless built with
/// [`FakeBackend::rejecting`] or [`FakeBackend::failing`].
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub login: Option<LoginData>,
    pub series: Vec<TrimmedSeries>,
    pub snippets: HashMap<u64, String>,
    mode: Mode,
    calls: RefCell<Vec<Call>>,
}

impl FakeBackend {
    /// Mutations reach the server and are refused with `message`.
    pub fn rejecting(message: &str) -> Self {
        Self {
            mode: Mode::Reject(message.to_string()),
            ..Self::default()
        }
    }

    /// Every request fails before reaching the server.
    pub fn failing() -> Self {
        Self {
            mode: Mode::Fail,
            ..Self::default()
        }
    }

    pub fn with_series(series: Vec<TrimmedSeries>) -> Self {
        Self {
            series,
            ..Self::default()
        }
    }

    pub fn with_login(login: LoginData) -> Self {
        Self {
            login: Some(login),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        match self.mode {
            Mode::Fail => Err(ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            _ => Ok(()),
        }
    }

    fn respond(&self) -> MutationResponse {
        match &self.mode {
            Mode::Reject(message) => MutationResponse {
                ok: false,
                body: message.clone(),
            },
            _ => MutationResponse {
                ok: true,
                body: String::new(),
            },
        }
    }
}

impl Backend for FakeBackend {
    fn login_info(&self) -> Result<LoginData, ApiError> {
        self.record(Call::Login)?;
        Ok(self.login.clone().unwrap_or(LoginData {
            session_id: "anonymous".to_string(),
            dev_mode: false,
            user_data: None,
        }))
    }

    fn list_series(&self) -> Result<Vec<TrimmedSeries>, ApiError> {
        self.record(Call::List)?;
        Ok(self.series.clone())
    }

    fn snippet_content(&self, message_id: u64) -> Result<String, ApiError> {
        self.record(Call::Snippet(message_id))?;
        self.snippets
            .get(&message_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                url: format!("/api/snippet/{message_id}"),
                status: 404,
                body: "Not Found".to_string(),
            })
    }

    fn update_series(
        &self,
        tag: &str,
        patch: &SeriesPatch,
    ) -> Result<MutationResponse, ApiError> {
        self.record(Call::Update(tag.to_string(), patch.clone()))?;
        Ok(self.respond())
    }

    fn delete_series(&self, tag: &str) -> Result<MutationResponse, ApiError> {
        self.record(Call::Delete(tag.to_string()))?;
        Ok(self.respond())
    }
}
