//! Inline edit/delete controls for an editable series entry.
//!
//! ```text
//!              ┌── start_edit_tag ──▶ EditingTag ───────┐
//!              │                                        │ save / cancel
//!   Viewing ───┼── start_edit_title ▶ EditingTitle ─────┤
//!      ▲       │                                        │
//!      │       └── start_delete ───▶ ConfirmingDelete ──┘ confirm_delete / cancel
//!      └────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is ever mutated locally: a successful save or delete yields
//! [`EditOutcome::Reload`] and the caller regenerates the page from fresh
//! data. A rejected request puts the server's response text in the inline
//! error slot and returns to `Viewing`.

use crate::api::{ApiError, Backend, MutationResponse, SeriesPatch};
use crate::types::Series;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    EditingTag,
    EditingTitle,
    ConfirmingDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Nothing changed; no request was made.
    Unchanged,
    /// The server accepted the change; reload the page.
    Reload,
    /// The server rejected the change with this message.
    Failed(String),
}

/// Which parts of an entry are visible in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub main_buttons: bool,
    pub confirm_edit: bool,
    pub confirm_delete: bool,
    pub title_input: bool,
    pub series_link: bool,
    pub tag_bar: bool,
}

#[derive(Debug, Clone)]
pub struct EditControls {
    tag: String,
    title: String,
    tag_input: String,
    title_input: String,
    state: EditState,
    error: Option<String>,
}

impl EditControls {
    pub fn new<S>(series: &Series<S>) -> Self {
        Self {
            tag: series.tag.clone(),
            title: series.title.clone(),
            tag_input: series.tag.clone(),
            title_input: series.title.clone(),
            state: EditState::Viewing,
            error: None,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn title_input(&self) -> &str {
        &self.title_input
    }

    pub fn set_tag_input(&mut self, value: impl Into<String>) {
        self.tag_input = value.into();
    }

    pub fn set_title_input(&mut self, value: impl Into<String>) {
        self.title_input = value.into();
    }

    pub fn start_edit_tag(&mut self) {
        self.enter(EditState::EditingTag);
    }

    pub fn start_edit_title(&mut self) {
        self.enter(EditState::EditingTitle);
    }

    pub fn start_delete(&mut self) {
        self.enter(EditState::ConfirmingDelete);
    }

    /// Leave any editing state, dropping unsaved input and the error text.
    pub fn cancel(&mut self) {
        self.reset_inputs();
        self.error = None;
        self.state = EditState::Viewing;
    }

    fn enter(&mut self, state: EditState) {
        if self.state != EditState::Viewing {
            return;
        }
        self.reset_inputs();
        self.error = None;
        self.state = state;
    }

    fn reset_inputs(&mut self) {
        self.tag_input.clone_from(&self.tag);
        self.title_input.clone_from(&self.title);
    }

    /// The fields whose input differs from the saved value.
    pub fn changes(&self) -> SeriesPatch {
        SeriesPatch {
            tag: (self.tag_input != self.tag).then(|| self.tag_input.clone()),
            title: (self.title_input != self.title).then(|| self.title_input.clone()),
        }
    }

    /// Confirm an edit. Unchanged inputs cancel without touching the network.
    pub fn save<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<EditOutcome, ApiError> {
        if !matches!(self.state, EditState::EditingTag | EditState::EditingTitle) {
            return Ok(EditOutcome::Unchanged);
        }

        let patch = self.changes();
        if patch.is_empty() {
            debug!(tag = %self.tag, "no changes to save");
            self.cancel();
            return Ok(EditOutcome::Unchanged);
        }

        let response = backend.update_series(&self.tag, &patch);
        self.finish(response)
    }

    /// Confirm a pending delete.
    pub fn confirm_delete<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<EditOutcome, ApiError> {
        if self.state != EditState::ConfirmingDelete {
            return Ok(EditOutcome::Unchanged);
        }
        let response = backend.delete_series(&self.tag);
        self.finish(response)
    }

    fn finish(
        &mut self,
        response: Result<MutationResponse, ApiError>,
    ) -> Result<EditOutcome, ApiError> {
        self.state = EditState::Viewing;
        let response = response?;
        if response.ok {
            info!(tag = %self.tag, "series updated");
            Ok(EditOutcome::Reload)
        } else {
            self.reset_inputs();
            self.error = Some(response.body.clone());
            Ok(EditOutcome::Failed(response.body))
        }
    }

    pub fn visibility(&self) -> Visibility {
        let state = self.state;
        Visibility {
            main_buttons: state == EditState::Viewing,
            confirm_edit: matches!(state, EditState::EditingTag | EditState::EditingTitle),
            confirm_delete: state == EditState::ConfirmingDelete,
            title_input: state == EditState::EditingTitle,
            series_link: state != EditState::EditingTitle,
            tag_bar: state == EditState::EditingTag,
        }
    }
}
