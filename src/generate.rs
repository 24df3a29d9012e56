//! HTML page generation.
//!
//! Turns API data into static pages. Each page starts from a fixed shell
//! whose containers have well-known ids; view components are built as
//! [`Element`] trees and then mounted into those containers. Header state
//! (login button, current user) is patched onto the shell afterwards.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): both series indices, as tabs
//! - **Series pages** (`/series/{tag}.html`): one full series
//! - **Snippet pages** (`/snippet/{id}.html`): one snippet's markdown
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── series/
//! │   └── of%20wolves.html
//! └── snippet/
//!     └── 1234567890.html
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/basil.js`: Tabs, spoilers and the inline edit controls

use crate::api::{ApiError, Backend, encode_component};
use crate::config::{self, SiteConfig, SiteMeta};
use crate::dom::Element;
use crate::index::{ControlStates, IndexTabs};
use crate::series::series_view;
use crate::relative_time::now_millis;
use crate::session::{LoginCache, apply_login};
use crate::snippet::{loaded_snippet, loading_placeholder};
use crate::types::{LoginData, Series, TrimmedSeries};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("page shell has no #{0} container")]
    MissingMount(String),
    #[error("series {tag} repeats snippet ids {ids:?}")]
    DuplicateSnippets { tag: String, ids: Vec<u64> },
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/basil.js");

/// Container ids of the index page.
pub const INDEX_TAB: &str = "index-tab";
pub const INDEX_TAB_CONTENT: &str = "index-tab-content";
/// Container id of series pages.
pub const VIEW_CONTAINER: &str = "view-container";
/// Container id of snippet pages.
pub const SNIPPET_CONTENT: &str = "snippet-content";

// ============================================================================
// Shell and mounting
// ============================================================================

fn site_header(site: &SiteMeta) -> Element {
    Element::new("header")
        .class("site-header")
        .child(
            Element::new("a")
                .class("site-title")
                .attr("href", "/")
                .text(&site.title),
        )
        .child(
            Element::new("nav")
                .class("site-user")
                .child(
                    Element::new("a")
                        .id("login-btn")
                        .class("btn btn-primary btn-sm")
                        .attr("href", &site.login_url)
                        .text("Log in"),
                )
                .child(
                    Element::new("span")
                        .id("cur-user-label")
                        .text("Logged in as ")
                        .child(Element::new("span").id("cur-user-name"))
                        .hidden(true),
                )
                .child(
                    Element::new("a")
                        .id("logout-btn")
                        .class("btn btn-secondary btn-sm")
                        .attr("href", &site.logout_url)
                        .text("Log out")
                        .hidden(true),
                ),
        )
}

/// The page body: header plus the given empty containers.
pub fn page_shell(site: &SiteMeta, containers: Vec<Element>) -> Element {
    Element::new("div")
        .class("page")
        .child(site_header(site))
        .child(Element::new("main").class("site-main").children(containers))
}

/// Append `nodes` to the container with id `id`.
pub fn mount(
    shell: &mut Element,
    id: &str,
    nodes: impl IntoIterator<Item = Element>,
) -> Result<(), GenerateError> {
    let target = shell
        .find_id_mut(id)
        .ok_or_else(|| GenerateError::MissingMount(id.to_string()))?;
    for node in nodes {
        target.add_subelement(node);
    }
    Ok(())
}

/// Swap the element with id `id` for `replacement`.
pub fn replace(shell: &mut Element, id: &str, replacement: Element) -> Result<(), GenerateError> {
    let target = shell
        .find_id_mut(id)
        .ok_or_else(|| GenerateError::MissingMount(id.to_string()))?;
    *target = replacement;
    Ok(())
}

// ============================================================================
// Pages
// ============================================================================

pub fn index_page(
    site: &SiteMeta,
    series: &[TrimmedSeries],
    login: &LoginData,
    states: &ControlStates,
    now_ms: i64,
) -> Result<Element, GenerateError> {
    let mut shell = page_shell(
        site,
        vec![
            Element::new("ul").id(INDEX_TAB).class("nav nav-tabs"),
            Element::new("div").id(INDEX_TAB_CONTENT).class("tab-content"),
        ],
    );
    apply_login(&mut shell, login);

    let tabs = IndexTabs::build(series, states, now_ms);
    mount(&mut shell, INDEX_TAB, tabs.tab_items())?;
    mount(&mut shell, INDEX_TAB_CONTENT, tabs.contents())?;
    Ok(shell)
}

pub fn series_page(
    site: &SiteMeta,
    series: &Series,
    login: &LoginData,
) -> Result<Element, GenerateError> {
    let ids = series.duplicate_message_ids();
    if !ids.is_empty() {
        return Err(GenerateError::DuplicateSnippets {
            tag: series.tag.clone(),
            ids,
        });
    }

    let mut shell = page_shell(site, vec![Element::new("div").id(VIEW_CONTAINER)]);
    apply_login(&mut shell, login);
    mount(&mut shell, VIEW_CONTAINER, [series_view(series)])?;
    Ok(shell)
}

/// A snippet page. `markdown` is `None` while the content hasn't arrived.
pub fn snippet_page(
    site: &SiteMeta,
    message_id: u64,
    markdown: Option<&str>,
    login: &LoginData,
) -> Result<Element, GenerateError> {
    let mut shell = page_shell(site, vec![Element::new("div").id(SNIPPET_CONTENT)]);
    apply_login(&mut shell, login);
    mount(&mut shell, SNIPPET_CONTENT, [loading_placeholder(message_id)])?;

    if let Some(markdown) = markdown {
        let id = format!("snippet-{message_id}");
        replace(&mut shell, &id, loaded_snippet(message_id, markdown))?;
    }
    Ok(shell)
}

// ============================================================================
// Documents
// ============================================================================

fn stylesheet(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    )
}

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: &str, content: &Element) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=(body_class) {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

pub fn render_index(config: &SiteConfig, shell: &Element) -> Markup {
    base_document(&config.site.title, &stylesheet(config), "index-view", shell)
}

pub fn render_series(config: &SiteConfig, series: &Series, shell: &Element) -> Markup {
    let title = format!("{} - {}", series.title, config.site.title);
    base_document(&title, &stylesheet(config), "series-view", shell)
}

pub fn render_snippet(config: &SiteConfig, message_id: u64, shell: &Element) -> Markup {
    let title = format!("Snippet {message_id} - {}", config.site.title);
    base_document(&title, &stylesheet(config), "snippet-view", shell)
}

// ============================================================================
// Output paths
// ============================================================================

pub fn index_path(output_dir: &Path) -> PathBuf {
    output_dir.join("index.html")
}

pub fn series_path(output_dir: &Path, tag: &str) -> PathBuf {
    output_dir
        .join("series")
        .join(format!("{}.html", encode_component(tag)))
}

pub fn snippet_path(output_dir: &Path, message_id: u64) -> PathBuf {
    output_dir.join("snippet").join(format!("{message_id}.html"))
}

/// Write a rendered document, creating parent directories.
pub fn write_page(path: &Path, markup: Markup) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, markup.into_string())?;
    info!(path = %path.display(), "page written");
    Ok(())
}

/// Read a full series document from disk.
pub fn load_series(path: &Path) -> Result<Series, GenerateError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

// ============================================================================
// Generation entry points
// ============================================================================

/// Fetch the login and the series listing, then write `index.html`.
///
/// Returns the written path and the listing it was built from.
pub fn generate_index(
    config: &SiteConfig,
    backend: &dyn Backend,
    login: &LoginCache,
    states: &ControlStates,
    output_dir: &Path,
) -> Result<(PathBuf, Vec<TrimmedSeries>), GenerateError> {
    let login = login.get_or_fetch(backend)?;
    let series = backend.list_series()?;
    let shell = index_page(&config.site, &series, login, states, now_millis())?;

    let path = index_path(output_dir);
    write_page(&path, render_index(config, &shell))?;
    Ok((path, series))
}

/// Write the page for a full series document.
pub fn generate_series(
    config: &SiteConfig,
    series: &Series,
    backend: &dyn Backend,
    login: &LoginCache,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    let login = login.get_or_fetch(backend)?;
    let shell = series_page(&config.site, series, login)?;

    let path = series_path(output_dir, &series.tag);
    write_page(&path, render_series(config, series, &shell))?;
    Ok(path)
}

/// Fetch one snippet's markdown and write its page.
pub fn generate_snippet(
    config: &SiteConfig,
    message_id: u64,
    backend: &dyn Backend,
    login: &LoginCache,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    let login = login.get_or_fetch(backend)?;
    let markdown = backend.snippet_content(message_id)?;
    let shell = snippet_page(&config.site, message_id, Some(&markdown), login)?;

    let path = snippet_path(output_dir, message_id);
    write_page(&path, render_snippet(config, message_id, &shell))?;
    Ok(path)
}
