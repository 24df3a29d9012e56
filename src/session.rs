//! Login probe and header toggling.
//!
//! [`LoginCache`] fetches `/api/auth/me` at most once per successful probe and
//! keeps the result for the rest of the run. Two callers that both miss the
//! cache before either finishes will each fetch; the first value stored wins
//! and the other is dropped. Nothing else depends on which one that is.

use crate::api::{ApiError, Backend};
use crate::dom::Element;
use crate::types::LoginData;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct LoginCache {
    cell: OnceLock<LoginData>,
}

impl LoginCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached login, if a probe has already succeeded.
    pub fn get(&self) -> Option<&LoginData> {
        self.cell.get()
    }

    /// Return the cached login, fetching it on first use. Errors are not
    /// cached: the next call tries again.
    pub fn get_or_fetch(&self, backend: &dyn Backend) -> Result<&LoginData, ApiError> {
        if let Some(data) = self.cell.get() {
            return Ok(data);
        }
        let data = backend.login_info()?;
        debug!(logged_in = data.is_logged_in(), "login probed");
        Ok(self.cell.get_or_init(|| data))
    }
}

/// Toggle the header elements of `shell` to reflect `login`.
pub fn apply_login(shell: &mut Element, login: &LoginData) {
    let user = login.user_data.as_ref();

    if let Some(el) = shell.find_id_mut("login-btn") {
        el.set_hidden(user.is_some());
    }
    if let Some(el) = shell.find_id_mut("cur-user-name") {
        el.set_text(user.map(|u| u.tag()).unwrap_or_default());
    }
    if let Some(el) = shell.find_id_mut("cur-user-label") {
        el.set_hidden(user.is_none());
    }
    if let Some(el) = shell.find_id_mut("logout-btn") {
        el.set_hidden(user.is_none());
    }
}
