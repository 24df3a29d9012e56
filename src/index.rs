//! Series index: grouping, ordering and rendering of the series listing.
//!
//! The listing is shown twice, as two tabs over the same data:
//!
//! - **By Title**: one group per uppercased first letter of the title.
//! - **By Author**: one group per author; a series with several authors
//!   appears under each of them.
//!
//! Series are sorted once, globally, before grouping, and entries inherit
//! that order inside their group. Groups themselves are ordered by their
//! lowercased key, independently of the series order.
//!
//! ```text
//! div.series-index-wrapper
//! ├── ul.nav                      one nav link per group
//! └── div.series-index
//!     └── div.series-list-container
//!         ├── h2.series-list-header#title-index-A
//!         └── ul.series-list
//!             └── li.series-entry ...
//! ```

use crate::author::multi_author_view;
use crate::dom::Element;
use crate::edit::{EditControls, Visibility};
use crate::relative_time::{format_time_since, plural};
use crate::types::{Author, Series, TrimmedSeries, TrimmedSnippet};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Edit state per series tag. Series without an entry render in their
/// default (viewing) state.
pub type ControlStates = HashMap<String, EditControls>;

/// Group key used when a title is empty.
const EMPTY_TITLE_KEY: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    ByTitle,
    ByAuthor,
}

impl IndexMode {
    /// Prefix of group anchor ids.
    pub fn key_type(self) -> &'static str {
        match self {
            IndexMode::ByTitle => "title",
            IndexMode::ByAuthor => "author",
        }
    }

    pub fn tab_label(self) -> &'static str {
        match self {
            IndexMode::ByTitle => "By Title",
            IndexMode::ByAuthor => "By Author",
        }
    }
}

// ============================================================================
// Ordering and grouping
// ============================================================================

pub fn compare_by_title<S>(a: &Series<S>, b: &Series<S>) -> Ordering {
    a.title.cmp(&b.title)
}

fn author_sort_key(author: &Author) -> (String, &str, &str) {
    (
        author.display_names.concat(),
        &author.username,
        &author.discriminator,
    )
}

/// Element-wise comparison of author lists; a strict prefix sorts first.
pub fn compare_by_authors<S>(a: &Series<S>, b: &Series<S>) -> Ordering {
    a.authors
        .iter()
        .map(author_sort_key)
        .cmp(b.authors.iter().map(author_sort_key))
}

/// `"Kit / Kat (kit#0001)"`
pub fn author_group_key(author: &Author) -> String {
    format!(
        "{} ({}#{})",
        author.display_name(),
        author.username,
        author.discriminator
    )
}

pub fn title_group_key(title: &str) -> String {
    match title.chars().next() {
        Some(first) => first.to_uppercase().collect(),
        None => EMPTY_TITLE_KEY.to_string(),
    }
}

fn group_keys<S>(series: &Series<S>, mode: IndexMode) -> Vec<String> {
    match mode {
        IndexMode::ByTitle => vec![title_group_key(&series.title)],
        IndexMode::ByAuthor => series.authors.iter().map(author_group_key).collect(),
    }
}

/// One named group of the index.
#[derive(Debug)]
pub struct Group<'a, S> {
    pub key: String,
    sort_key: String,
    pub series: Vec<&'a Series<S>>,
}

impl<S> Group<'_, S> {
    pub fn anchor_id(&self, mode: IndexMode) -> String {
        format!("{}-index-{}", mode.key_type(), self.key)
    }
}

/// Sort `series` for `mode`, then bucket it into ordered groups.
pub fn build_groups<S>(series: &[Series<S>], mode: IndexMode) -> Vec<Group<'_, S>> {
    let mut sorted: Vec<&Series<S>> = series.iter().collect();
    match mode {
        IndexMode::ByTitle => sorted.sort_by(|a, b| compare_by_title(a, b)),
        IndexMode::ByAuthor => sorted.sort_by(|a, b| compare_by_authors(a, b)),
    }

    let mut groups: Vec<Group<'_, S>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for s in sorted {
        for key in group_keys(s, mode) {
            let idx = *positions.entry(key.clone()).or_insert_with(|| {
                groups.push(Group {
                    sort_key: key.to_lowercase(),
                    key,
                    series: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].series.push(s);
        }
    }

    groups.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    groups
}

// ============================================================================
// Entry views
// ============================================================================

fn titlebar(series: &TrimmedSeries, title_value: &str, vis: Visibility) -> Element {
    Element::new("div")
        .class("series-titlebar")
        .child(
            Element::new("input")
                .class("series-title-input form-control")
                .attr("type", "text")
                .attr("placeholder", "Series Title")
                .attr("value", title_value)
                .hidden(!vis.title_input),
        )
        .child(
            Element::new("a")
                .class("series-link")
                .attr("href", &series.url)
                .text(&series.title)
                .hidden(!vis.series_link),
        )
        .text("by")
        .child(multi_author_view(&series.authors))
}

fn tag_input_bar(tag: &str, tag_value: &str, vis: Visibility) -> Element {
    let input_id = format!("tag-edit-{tag}");
    Element::new("div")
        .class("series-tag-edit-bar")
        .child(
            Element::new("label")
                .class("series-tag-input-label")
                .attr("for", &input_id)
                .text("Change Series Tag: "),
        )
        .child(
            Element::new("input")
                .id(input_id)
                .class("series-tag-input form-control")
                .attr("type", "text")
                .attr("placeholder", "Series Tag")
                .attr("value", tag_value),
        )
        .hidden(!vis.tag_bar)
}

/// `"CW: gore"`, `"CWs: gore, spiders"`
fn content_warning_bar(warnings: &[String]) -> Element {
    let label = if warnings.len() > 1 { "CWs" } else { "CW" };
    Element::new("div")
        .class("series-content-warnings")
        .text(format!("{label}: {}", warnings.join(", ")))
}

fn info_view(series: &TrimmedSeries, error: Option<&str>, now_ms: i64) -> Element {
    let mut root = Element::new("div")
        .class("series-info-container")
        .child(
            Element::new("span")
                .class("series-part-count")
                .text(plural(series.snippets.len() as u64, "part")),
        )
        .child(
            Element::new("span")
                .class("series-word-count")
                .text(plural(series.wordcount, "word")),
        );

    if let Some(updated) = series.updated.filter(|t| *t != 0.0) {
        root.add_subelement(
            Element::new("span")
                .class("series-update-time")
                .text(format!("Last updated {}", format_time_since(updated, now_ms))),
        );
    }

    root.child(
        Element::new("span")
            .class("series-edit-error")
            .text(error.unwrap_or_default())
            .hidden(error.is_none()),
    )
}

fn button(classes: &str, text: &str, action: &str) -> Element {
    Element::new("button")
        .class(classes)
        .attr("data-action", action)
        .text(text)
}

fn confirm_buttons(
    role: &str,
    confirm: (&str, &str, &str),
    label: Option<&str>,
    visible: bool,
) -> Element {
    let (text, classes, action) = confirm;
    let mut root = Element::new("div")
        .class("series-btn-container")
        .attr("data-role", role)
        .hidden(!visible);
    if let Some(label) = label {
        root.add_subelement(
            Element::new("span")
                .class("series-confirm-label me-3")
                .text(label),
        );
    }
    root.child(button(&format!("btn btn-sm me-3 {classes}"), text, action))
        .child(button("btn btn-sm btn-primary", "Cancel", "cancel"))
}

fn edit_button_rows(vis: Visibility) -> [Element; 3] {
    let main = Element::new("div")
        .class("series-btn-container")
        .attr("data-role", "main")
        .child(button("btn btn-success btn-sm me-3", "Change Tag", "edit-tag"))
        .child(button("btn btn-success btn-sm me-3", "Edit Title", "edit-title"))
        .child(button("btn btn-danger btn-sm", "Delete", "delete"))
        .hidden(!vis.main_buttons);

    [
        main,
        confirm_buttons(
            "confirm-edit",
            ("Save", "btn-success", "save"),
            None,
            vis.confirm_edit,
        ),
        confirm_buttons(
            "confirm-delete",
            ("Delete", "btn-danger", "confirm-delete"),
            Some("Are you sure?"),
            vis.confirm_delete,
        ),
    ]
}

/// One `li.series-entry`. Edit controls are attached only for editable
/// series; `controls` supplies their current state.
pub fn series_index_entry(
    series: &TrimmedSeries,
    controls: Option<&EditControls>,
    now_ms: i64,
) -> Element {
    let default_controls;
    let controls = match (series.can_edit, controls) {
        (false, _) => None,
        (true, Some(c)) => Some(c),
        (true, None) => {
            default_controls = EditControls::new(series);
            Some(&default_controls)
        }
    };
    let vis = controls.map(EditControls::visibility).unwrap_or(Visibility {
        main_buttons: false,
        confirm_edit: false,
        confirm_delete: false,
        title_input: false,
        series_link: true,
        tag_bar: false,
    });

    let title_value = controls.map_or(series.title.as_str(), EditControls::title_input);
    let mut root = Element::new("li")
        .class("series-entry")
        .child(titlebar(series, title_value, vis));

    let error = controls.and_then(EditControls::error);
    let mut infobar = Element::new("div")
        .class("series-infobar")
        .child(info_view(series, error, now_ms));

    if let Some(controls) = controls {
        root.set_attr("data-tag", &series.tag);
        root.set_attr("data-title", &series.title);
        root.add_subelement(tag_input_bar(&series.tag, controls.tag_input(), vis));
        infobar = infobar.children(edit_button_rows(vis));
    }

    if !series.warnings.is_empty() {
        root.add_subelement(content_warning_bar(&series.warnings));
    }
    root.child(infobar)
}

// ============================================================================
// Index views
// ============================================================================

/// Header, list and nav link for one group.
fn series_list(
    group: &Group<'_, TrimmedSnippet>,
    mode: IndexMode,
    states: &ControlStates,
    now_ms: i64,
) -> (Element, Element) {
    let id = group.anchor_id(mode);

    let entries = group
        .series
        .iter()
        .map(|s| series_index_entry(s, states.get(&s.tag), now_ms));

    let root = Element::new("div")
        .class("series-list-container")
        .child(
            Element::new("h2")
                .id(id.clone())
                .class("series-list-header")
                .text(&group.key),
        )
        .child(Element::new("ul").class("series-list").children(entries));

    let nav_item = Element::new("li").class("nav-item index-nav-item").child(
        Element::new("a")
            .class("nav-link")
            .attr("href", format!("#{id}"))
            .text(&group.key),
    );

    (root, nav_item)
}

/// One tab of the index: its tab button and its content wrapper.
#[derive(Debug, Clone)]
pub struct SeriesIndex {
    pub mode: IndexMode,
    pub tab: Element,
    pub root: Element,
    pub group_count: usize,
}

impl SeriesIndex {
    pub fn build(
        series: &[TrimmedSeries],
        mode: IndexMode,
        states: &ControlStates,
        now_ms: i64,
    ) -> Self {
        let groups = build_groups(series, mode);

        let mut nav = Element::new("ul").class("nav");
        let mut content = Element::new("div").class("series-index");
        for group in &groups {
            let (list, nav_item) = series_list(group, mode, states, now_ms);
            content.add_subelement(list);
            nav.add_subelement(nav_item);
        }

        let tab = Element::new("li")
            .class("nav-item")
            .attr("data-index", mode.key_type())
            .child(
                Element::new("button")
                    .class("nav-link")
                    .text(mode.tab_label()),
            );
        let root = Element::new("div")
            .class("series-index-wrapper")
            .attr("data-index", mode.key_type())
            .child(nav)
            .child(content);

        Self {
            mode,
            tab,
            root,
            group_count: groups.len(),
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.tab.add_class("active");
        } else {
            self.tab.remove_class("active");
        }
        self.root.set_hidden(!visible);
    }

    pub fn is_visible(&self) -> bool {
        !self.root.hidden
    }
}

/// Both indices, with exactly one visible at a time.
#[derive(Debug, Clone)]
pub struct IndexTabs {
    pub by_title: SeriesIndex,
    pub by_author: SeriesIndex,
}

impl IndexTabs {
    /// Build both tabs; the title index starts active.
    pub fn build(series: &[TrimmedSeries], states: &ControlStates, now_ms: i64) -> Self {
        let mut tabs = Self {
            by_title: SeriesIndex::build(series, IndexMode::ByTitle, states, now_ms),
            by_author: SeriesIndex::build(series, IndexMode::ByAuthor, states, now_ms),
        };
        tabs.select(IndexMode::ByTitle);
        tabs
    }

    pub fn select(&mut self, mode: IndexMode) {
        self.by_title.set_visible(mode == IndexMode::ByTitle);
        self.by_author.set_visible(mode == IndexMode::ByAuthor);
    }

    pub fn active(&self) -> IndexMode {
        if self.by_author.is_visible() {
            IndexMode::ByAuthor
        } else {
            IndexMode::ByTitle
        }
    }

    /// Tab buttons, in display order.
    pub fn tab_items(&self) -> [Element; 2] {
        [self.by_title.tab.clone(), self.by_author.tab.clone()]
    }

    /// Index bodies, in display order.
    pub fn contents(&self) -> [Element; 2] {
        [self.by_title.root.clone(), self.by_author.root.clone()]
    }
}
