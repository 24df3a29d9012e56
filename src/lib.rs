//! # Basil Web
//!
//! Static page generator for archived Discord snippet series. Series of
//! snippets live behind a backend JSON API; this crate fetches them and
//! renders browsable HTML: an index of every series, one page per series,
//! and one page per snippet.
//!
//! # Architecture: Build, Mount, Render
//!
//! ```text
//! 1. Fetch    /api/...        →  typed values   (api, types)
//! 2. Build    typed values    →  Element trees  (index, series, snippet, author)
//! 3. Mount    Element trees   →  page shell     (generate, session)
//! 4. Render   page shell      →  HTML document  (generate, maud)
//! ```
//!
//! View components are pure functions from data to [`dom::Element`] trees,
//! so the grouping, ordering and edit-state logic is testable without a
//! browser. Interactive behavior (tab switching, spoiler reveal, inline
//! edits) is modeled in Rust as patch operations on those trees, and
//! mirrored in the embedded `static/basil.js` for the generated pages.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | API payload types: `Author`, `Series`, `Snippet`, `LoginData` |
//! | [`api`] | `Backend` trait and its `ureq` implementation |
//! | [`dom`] | Minimal element tree with patch operations, rendered through maud |
//! | [`relative_time`] | "3 hours ago" formatting and plurals |
//! | [`author`] | Author name/username/discriminator views |
//! | [`snippet`] | Discord-flavored markdown, attachments and spoilers |
//! | [`series`] | Full series view |
//! | [`index`] | Series index: grouping by title or author, entry views |
//! | [`edit`] | Inline edit/delete state machine for editable series |
//! | [`session`] | Cached login probe and header toggling |
//! | [`generate`] | Page shells, mounting and document rendering |
//! | [`config`] | `basil.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Reload Instead of Local Mutation
//!
//! A successful edit or delete never patches the in-memory model. The edit
//! controls report [`edit::EditOutcome::Reload`] and the caller regenerates
//! the index from fresh API data, so every rendered page is a read-only
//! snapshot of the server.
//!
//! The embedded script can't regenerate anything, and reloading a static
//! page only brings back the same snapshot. After an accepted change it
//! freezes the entry and asks for the index to be regenerated.
//!
//! ## Validation at the Boundary
//!
//! API payloads are deserialized into explicit serde types in [`api`]. A
//! malformed payload or a listing with duplicate tags is an error there,
//! before any view code runs.

pub mod api;
pub mod author;
pub mod config;
pub mod dom;
pub mod edit;
pub mod generate;
pub mod index;
pub mod output;
pub mod relative_time;
pub mod series;
pub mod session;
pub mod snippet;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
