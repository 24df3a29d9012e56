//! Snippet rendering: Discord-flavored markdown plus attachments.
//!
//! Markdown goes through `pulldown-cmark`, with the input and the event
//! stream adjusted toward Discord's dialect before it reaches the HTML writer:
//!
//! - line-leading heading, list and rule markers stay literal text
//! - single newlines are hard breaks
//! - raw HTML is escaped, never passed through
//! - `||text||` becomes a clickable text spoiler (`span.d-spoiler`), also
//!   around formatting and across line breaks within one block
//! - bare `http(s)://` URLs become links, or inline images when the URL path
//!   has an image extension
//!
//! An image whose file name starts with `SPOILER_` is rendered blurred
//! (`d-img-spoiler`) under a cover that reveals it when clicked. Attachments
//! get the same treatment and are appended after the markdown body.

use crate::dom::Element;
use crate::types::Snippet;
use maud::{Escaper, Render};
use percent_encoding::percent_decode_str;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use std::fmt::Write;
use thiserror::Error;
use tracing::warn;
use url::Url;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const SPOILER_PREFIX: &str = "SPOILER_";

#[derive(Error, Debug, PartialEq)]
pub enum SnippetError {
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),
}

/// Image classification of a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageStatus {
    pub is_image: bool,
    pub is_spoiler: bool,
}

/// Reject URLs that would execute script or embed data.
///
/// The check runs on the percent-decoded URL with everything but
/// `[A-Za-z0-9/:]` stripped, so `java%0Ascript:` and friends are caught too.
/// Returns `None` for rejected or undecodable URLs.
pub fn sanitize_url(url: &str) -> Option<&str> {
    let decoded = percent_decode_str(url).decode_utf8().ok()?;
    let protocol: String = decoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/' || *c == ':')
        .collect::<String>()
        .to_lowercase();

    let unsafe_prefix = ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|p| protocol.starts_with(p));
    (!unsafe_prefix).then_some(url)
}

/// Path component of an absolute URL, as a browser's `URL.pathname`.
pub fn url_path(url: &str) -> Result<String, SnippetError> {
    Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .map_err(|_| SnippetError::InvalidUrl(url.to_string()))
}

/// Classify a URL by its path: image extension, and `SPOILER_` file name.
///
/// Only the last path segment is considered for the spoiler prefix, so
/// `/SPOILER_dir/a.png` and `/foo.SPOILER_bar.png` are not spoilers.
pub fn check_image(url: &str) -> Result<ImageStatus, SnippetError> {
    let path = url_path(url)?;
    let mut status = ImageStatus::default();

    if let Some(dot) = path.rfind('.') {
        let extension = path[dot + 1..].to_lowercase();
        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            let filename = path.rsplit('/').next().unwrap_or(path.as_str());
            status.is_image = true;
            status.is_spoiler = filename.starts_with(SPOILER_PREFIX);
        }
    }
    Ok(status)
}

fn link(href: &str) -> Element {
    Element::new("a")
        .class("d-link")
        .attr("href", href)
        .attr("target", "_blank")
}

fn spoiler_cover() -> Element {
    Element::new("div").class("d-spoiler-cover").child(
        Element::new("span")
            .class("d-spoiler-img-label")
            .text("Spoiler"),
    )
}

fn image(src: &str, spoiler: bool) -> Element {
    let img = Element::new("img").class("d-img").attr("src", src);
    if spoiler { img.class("d-img-spoiler") } else { img }
}

/// Render a bare URL found in markdown text.
///
/// Image URLs become an inline image wrapped in a link, with a spoiler cover
/// when the file name calls for one; anything else is a plain link showing
/// `text`.
pub fn url_node(target: &str, text: &str) -> Result<Element, SnippetError> {
    let url = sanitize_url(target).unwrap_or_default();
    let status = check_image(url)?;

    if !status.is_image {
        return Ok(link(url).text(text));
    }

    let mut wrapper = Element::new("div")
        .class("d-img-wrapper")
        .child(link(url).child(image(url, status.is_spoiler)));
    if status.is_spoiler {
        wrapper.add_subelement(spoiler_cover());
    }
    Ok(wrapper)
}

/// Render an attachment URL.
///
/// An attachment whose URL can't be parsed is shown as a plain link.
pub fn attachment_view(url: &str) -> Element {
    let status = check_image(url).unwrap_or_else(|err| {
        warn!(url, error = %err, "attachment URL not classifiable");
        ImageStatus::default()
    });

    let mut wrapper = Element::new("div").class("d-attachment-wrapper");
    if !status.is_image {
        return wrapper.child(link(url).text(url));
    }

    wrapper.add_class("d-img-wrapper");
    wrapper.add_subelement(link(url).child(image(url, status.is_spoiler)));
    if status.is_spoiler {
        wrapper.add_subelement(spoiler_cover());
    }
    wrapper
}

/// Reveal the spoiler images inside one `d-img-wrapper` and hide its cover.
///
/// Other wrappers are left untouched.
pub fn reveal_image_spoiler(wrapper: &mut Element) {
    wrapper.for_each_class_mut("d-img-spoiler", &mut |img| img.remove_class("d-img-spoiler"));
    wrapper.for_each_class_mut("d-spoiler-cover", &mut |cover| cover.set_hidden(true));
}

// ============================================================================
// Markdown
// ============================================================================

/// Convert snippet markdown to HTML.
///
/// Fails when a bare URL in the text can't be parsed; the caller decides what
/// to show instead.
pub fn render_markdown(content: &str) -> Result<String, SnippetError> {
    let source = escape_block_markers(content);
    let mut pieces = parse_pieces(&source);
    pair_spoilers(&mut pieces);

    let mut events: Vec<Event> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Event(event) => events.push(event),
            Piece::Prose(text) => linkify(&text, &mut events)?,
            Piece::Marker(Spoiler::Open) => {
                events.push(Event::InlineHtml(CowStr::Borrowed(r#"<span class="d-spoiler">"#)));
            }
            Piece::Marker(Spoiler::Close) => events.push(Event::InlineHtml(CowStr::Borrowed("</span>"))),
            Piece::Marker(Spoiler::Unpaired) => events.push(Event::Text(CowStr::Borrowed("||"))),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    Ok(out)
}

/// Backslash-escape line-leading markers that would turn chat text into
/// headings, lists, rules or setext underlines. Fenced code is left as is.
fn escape_block_markers(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 8);
    let mut fence: Option<(char, usize)> = None;

    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            out.push_str(line);
            continue;
        }
        let body = &line[indent..];

        if let Some((ch, len)) = code_fence(body) {
            fence = match fence {
                None => Some((ch, len)),
                Some((open, open_len)) if open == ch && len >= open_len => None,
                still_open => still_open,
            };
        } else if fence.is_none() {
            if let Some(at) = block_marker(body) {
                out.push_str(&line[..indent + at]);
                out.push('\\');
                out.push_str(&line[indent + at..]);
                continue;
            }
        }
        out.push_str(line);
    }
    out
}

/// Fence character and run length when `line` opens or closes a code fence.
fn code_fence(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next().filter(|&c| matches!(c, '`' | '~'))?;
    let run = line.len() - line.trim_start_matches(ch).len();
    (run >= 3).then_some((ch, run))
}

/// Byte offset of the character to escape when `line` starts a block
/// construct.
fn block_marker(line: &str) -> Option<usize> {
    let text = line.trim_end_matches(['\n', '\r']);
    let ends_marker = |rest: &str| rest.is_empty() || rest.starts_with([' ', '\t']);
    let first = text.chars().next()?;

    match first {
        '#' => {
            let hashes = text.len() - text.trim_start_matches('#').len();
            (hashes <= 6 && ends_marker(&text[hashes..])).then_some(0)
        }
        '-' | '+' | '*' if ends_marker(&text[1..]) => Some(0),
        '-' | '*' | '_' | '=' => text
            .chars()
            .all(|c| c == first || c == ' ' || c == '\t')
            .then_some(0),
        '0'..='9' => {
            let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let rest = &text[digits..];
            (digits <= 9 && rest.starts_with(['.', ')']) && ends_marker(&rest[1..]))
                .then_some(digits)
        }
        _ => None,
    }
}

/// The adjusted event stream before text spoilers are paired.
enum Piece<'a> {
    Event(Event<'a>),
    /// Text outside code and links, still to be scanned for bare URLs.
    Prose(String),
    /// A `||` found in prose.
    Marker(Spoiler),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Spoiler {
    Unpaired,
    Open,
    Close,
}

fn parse_pieces(source: &str) -> Vec<Piece<'_>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut pieces = Vec::new();
    let mut in_code = false;
    let mut link_depth = 0usize;

    for event in TextMergeStream::new(Parser::new_ext(source, options)) {
        let event = match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code = true;
                Event::Start(Tag::CodeBlock(kind))
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                Event::End(TagEnd::CodeBlock)
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                link_depth += 1;
                let href = sanitize_url(&dest_url).unwrap_or_default();
                Event::InlineHtml(open_link_tag(href).into())
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                Event::InlineHtml("</a>".into())
            }
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::SoftBreak => Event::HardBreak,
            Event::Text(text) if !in_code && link_depth == 0 => {
                split_prose(&text, &mut pieces);
                continue;
            }
            other => other,
        };
        pieces.push(Piece::Event(event));
    }
    pieces
}

fn split_prose(text: &str, pieces: &mut Vec<Piece<'_>>) {
    for (i, part) in text.split("||").enumerate() {
        if i > 0 {
            pieces.push(Piece::Marker(Spoiler::Unpaired));
        }
        if !part.is_empty() {
            pieces.push(Piece::Prose(part.to_string()));
        }
    }
}

/// Pair `||` markers into spoilers.
///
/// Markers pair in order within one block and at the same emphasis depth, so
/// the spoiler span always nests cleanly. Empty spoilers (`||||`) and
/// leftover markers stay literal.
fn pair_spoilers(pieces: &mut [Piece<'_>]) {
    // index and emphasis depth of the unmatched opening marker
    let mut open: Option<(usize, usize)> = None;
    let mut depth = 0usize;

    for i in 0..pieces.len() {
        match &pieces[i] {
            Piece::Marker(_) => {}
            Piece::Event(event) => {
                if is_block_boundary(event) {
                    open = None;
                    depth = 0;
                } else if matches!(
                    event,
                    Event::Start(Tag::Emphasis | Tag::Strong | Tag::Strikethrough)
                ) {
                    depth += 1;
                } else if matches!(
                    event,
                    Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough)
                ) {
                    depth = depth.saturating_sub(1);
                    if open.is_some_and(|(_, d)| d > depth) {
                        open = None;
                    }
                }
                continue;
            }
            Piece::Prose(_) => continue,
        }

        match open {
            Some((start, d)) if d == depth => {
                if start + 1 < i {
                    pieces[start] = Piece::Marker(Spoiler::Open);
                    pieces[i] = Piece::Marker(Spoiler::Close);
                }
                open = None;
            }
            Some(_) => {}
            None => open = Some((i, depth)),
        }
    }
}

fn is_block_boundary(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::Start(
            Tag::Paragraph
                | Tag::Heading { .. }
                | Tag::BlockQuote(_)
                | Tag::CodeBlock(_)
                | Tag::HtmlBlock
                | Tag::List(_)
                | Tag::Item
        ) | Event::End(
            TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::BlockQuote(_)
                | TagEnd::CodeBlock
                | TagEnd::HtmlBlock
                | TagEnd::List(_)
                | TagEnd::Item
        ) | Event::Rule
    )
}

fn open_link_tag(href: &str) -> String {
    let mut tag = String::from("<a href=\"");
    let _ = Escaper::new(&mut tag).write_str(href);
    tag.push_str("\" class=\"d-link\" target=\"_blank\">");
    tag
}

fn linkify<'a>(text: &str, events: &mut Vec<Event<'a>>) -> Result<(), SnippetError> {
    let mut rest = text;
    while let Some((start, end)) = next_url(rest) {
        if start > 0 {
            events.push(Event::Text(rest[..start].to_string().into()));
        }
        let url = &rest[start..end];
        let node = url_node(url, url)?;
        events.push(Event::InlineHtml(node.render().into_string().into()));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        events.push(Event::Text(rest.to_string().into()));
    }
    Ok(())
}

/// Byte range of the next bare `http(s)://` URL in `text`.
///
/// A URL runs until whitespace or `<`, minus trailing punctuation that more
/// likely belongs to the sentence.
fn next_url(text: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find("http") {
        let start = offset + found;
        let candidate = &text[start..];
        let scheme_len = if candidate.starts_with("https://") {
            8
        } else if candidate.starts_with("http://") {
            7
        } else {
            offset = start + 4;
            continue;
        };

        let run = candidate
            .find(|c: char| c.is_whitespace() || c == '<')
            .unwrap_or(candidate.len());
        let trimmed = candidate[..run]
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ':' | ';' | '"' | '\'' | ')' | ']'));

        if trimmed.len() > scheme_len + 1 {
            return Some((start, start + trimmed.len()));
        }
        offset = start + scheme_len;
    }
    None
}

// ============================================================================
// Views
// ============================================================================

/// A snippet's container: markdown body followed by its attachments.
///
/// If the markdown can't be rendered the body is left empty and the
/// attachments are still shown.
pub fn snippet_view(snippet: &Snippet) -> Element {
    let message_id = snippet.meta.message_id;
    let mut body = Element::new("div").class("snippet");

    match render_markdown(&snippet.content) {
        Ok(html) => body = body.raw(html),
        Err(err) => warn!(message_id, error = %err, "snippet markdown not rendered"),
    }
    for url in &snippet.attachment_urls {
        body.add_subelement(attachment_view(url));
    }

    Element::new("div")
        .id(format!("snippet-{message_id}"))
        .class("snippet-container")
        .child(body)
}

/// Placeholder shown in `#snippet-{id}` until content arrives.
pub fn loading_placeholder(message_id: u64) -> Element {
    Element::new("div")
        .id(format!("snippet-{message_id}"))
        .child(Element::new("i").text("Loading..."))
}

/// Fill a snippet container with fetched markdown.
///
/// On a render failure the container keeps its loading placeholder.
pub fn loaded_snippet(message_id: u64, markdown: &str) -> Element {
    match render_markdown(markdown) {
        Ok(html) => Element::new("div")
            .id(format!("snippet-{message_id}"))
            .raw(html),
        Err(err) => {
            warn!(message_id, error = %err, "fetched snippet not rendered");
            loading_placeholder(message_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::snippet;

    fn status(url: &str) -> ImageStatus {
        check_image(url).unwrap()
    }

    // =========================================================================
    // URL classification
    // =========================================================================

    #[test]
    fn image_extensions_any_case() {
        for url in [
            "https://cdn.example/a.PNG",
            "https://cdn.example/a.jpg",
            "https://cdn.example/a.JpEg",
            "https://cdn.example/a.gif",
            "https://cdn.example/a.webp",
        ] {
            assert!(status(url).is_image, "{url} should be an image");
        }
    }

    #[test]
    fn non_image_extensions() {
        assert!(!status("https://cdn.example/a.txt").is_image);
        assert!(!status("https://cdn.example/a").is_image);
        assert!(!status("https://cdn.example/").is_image);
        assert!(!status("https://cdn.example").is_image);
    }

    #[test]
    fn query_and_fragment_are_not_part_of_path() {
        assert!(status("https://cdn.example/a.png?width=200").is_image);
        assert!(!status("https://cdn.example/a?f=b.png").is_image);
        assert!(status("https://cdn.example/a.gif#frame").is_image);
    }

    #[test]
    fn spoiler_prefix_on_filename() {
        let s = status("https://cdn.example/att/SPOILER_foo.png");
        assert!(s.is_image);
        assert!(s.is_spoiler);
    }

    #[test]
    fn spoiler_prefix_elsewhere_is_not_spoiler() {
        assert!(!status("https://cdn.example/foo.SPOILER_bar.png").is_spoiler);
        assert!(!status("https://cdn.example/SPOILER_dir/bar.png").is_spoiler);
        assert!(!status("https://cdn.example/spoiler_foo.png").is_spoiler);
    }

    #[test]
    fn spoiler_requires_image() {
        let s = status("https://cdn.example/SPOILER_notes.txt");
        assert!(!s.is_image);
        assert!(!s.is_spoiler);
    }

    #[test]
    fn url_path_variants() {
        assert_eq!(url_path("https://a.b/c/d.png").unwrap(), "/c/d.png");
        assert_eq!(url_path("https://a.b").unwrap(), "/");
        assert_eq!(url_path("mailto:me@x.png").unwrap(), "me@x.png");
    }

    #[test]
    fn backslashes_are_path_separators() {
        assert_eq!(url_path("https://cdn.example\\att\\SPOILER_x.png").unwrap(), "/att/SPOILER_x.png");
        let s = status("https://cdn.example\\att\\SPOILER_x.png");
        assert!(s.is_image);
        assert!(s.is_spoiler);
    }

    #[test]
    fn dot_segments_are_resolved() {
        assert_eq!(url_path("https://a.b/x/../SPOILER_y.gif").unwrap(), "/SPOILER_y.gif");
        assert!(status("https://a.b/x/../SPOILER_y.gif").is_spoiler);
    }

    #[test]
    fn relative_and_empty_urls_are_invalid() {
        assert!(url_path("").is_err());
        assert!(url_path("/relative/a.png").is_err());
        assert!(url_path("https://").is_err());
        assert!(url_path("1http://x").is_err());
    }

    #[test]
    fn sanitize_rejects_script_protocols() {
        assert_eq!(sanitize_url("javascript:alert(1)"), None);
        assert_eq!(sanitize_url("JaVaScRiPt:alert(1)"), None);
        assert_eq!(sanitize_url("java%0Ascript:alert(1)"), None);
        assert_eq!(sanitize_url("vbscript:x"), None);
        assert_eq!(sanitize_url("data:text/html,hi"), None);
        assert_eq!(sanitize_url("https://ok.example"), Some("https://ok.example"));
    }

    // =========================================================================
    // URL nodes and attachments
    // =========================================================================

    #[test]
    fn url_node_image_structure() {
        let node = url_node("https://cdn.example/a.png", "https://cdn.example/a.png").unwrap();
        assert!(node.has_class("d-img-wrapper"));
        let a = node.find_class("d-link").unwrap();
        assert_eq!(a.get_attr("target"), Some("_blank"));
        let img = node.find_class("d-img").unwrap();
        assert_eq!(img.get_attr("src"), Some("https://cdn.example/a.png"));
        assert!(!img.has_class("d-img-spoiler"));
        assert!(node.find_class("d-spoiler-cover").is_none());
    }

    #[test]
    fn url_node_spoiler_has_cover() {
        let node = url_node("https://cdn.example/SPOILER_a.png", "x").unwrap();
        assert!(node.find_class("d-img").unwrap().has_class("d-img-spoiler"));
        let cover = node.find_class("d-spoiler-cover").unwrap();
        assert_eq!(cover.text_content(), "Spoiler");
    }

    #[test]
    fn url_node_plain_link_keeps_text() {
        let node = url_node("https://example.com/page", "https://example.com/page").unwrap();
        assert_eq!(node.tag, "a");
        assert_eq!(node.text_content(), "https://example.com/page");
    }

    #[test]
    fn attachment_non_image_is_plain_link() {
        let view = attachment_view("https://cdn.example/file.zip");
        assert!(view.has_class("d-attachment-wrapper"));
        assert!(!view.has_class("d-img-wrapper"));
        assert_eq!(view.text_content(), "https://cdn.example/file.zip");
    }

    #[test]
    fn attachment_image_structure() {
        let view = attachment_view("https://cdn.example/SPOILER_x.webp");
        assert!(view.has_class("d-attachment-wrapper"));
        assert!(view.has_class("d-img-wrapper"));
        assert!(view.find_class("d-img-spoiler").is_some());
        assert!(view.find_class("d-spoiler-cover").is_some());
    }

    #[test]
    fn attachment_invalid_url_falls_back_to_link() {
        let view = attachment_view("not a url.png");
        assert!(!view.has_class("d-img-wrapper"));
        assert!(view.find_class("d-link").is_some());
    }

    #[test]
    fn reveal_only_affects_one_wrapper() {
        let mut first = attachment_view("https://cdn.example/SPOILER_1.png");
        let second = attachment_view("https://cdn.example/SPOILER_2.png");

        reveal_image_spoiler(&mut first);

        assert!(first.find_class("d-img-spoiler").is_none());
        assert!(first.find_class("d-spoiler-cover").unwrap().hidden);
        assert!(second.find_class("d-img-spoiler").is_some());
        assert!(!second.find_class("d-spoiler-cover").unwrap().hidden);
    }

    // =========================================================================
    // Markdown
    // =========================================================================

    #[test]
    fn markdown_basic_formatting() {
        let html = render_markdown("**bold** and *it* and ~~gone~~").unwrap();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>it</em>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn markdown_single_newline_is_break() {
        let html = render_markdown("line one\nline two").unwrap();
        assert!(html.contains("<br"));
    }

    #[test]
    fn markdown_escapes_raw_html() {
        let html = render_markdown("hi <script>alert(1)</script>").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn markdown_bare_image_url_becomes_image() {
        let html = render_markdown("look https://cdn.example/cat.PNG wow").unwrap();
        assert!(html.contains(r#"<div class="d-img-wrapper">"#));
        assert!(html.contains(r#"<img class="d-img" src="https://cdn.example/cat.PNG">"#));
        assert!(html.contains("look "));
        assert!(html.contains(" wow"));
    }

    #[test]
    fn markdown_bare_url_becomes_link() {
        let html = render_markdown("see https://example.com/page.").unwrap();
        assert!(html.contains(
            r#"<a class="d-link" href="https://example.com/page" target="_blank">https://example.com/page</a>."#
        ));
    }

    #[test]
    fn markdown_spoiler_image_has_cover() {
        let html = render_markdown("https://cdn.example/SPOILER_x.jpg").unwrap();
        assert!(html.contains("d-img-spoiler"));
        assert!(html.contains(r#"<span class="d-spoiler-img-label">Spoiler</span>"#));
    }

    #[test]
    fn markdown_urls_in_code_are_left_alone() {
        let html = render_markdown("`https://example.com/a.png`\n\n```\nhttps://example.com\n```").unwrap();
        assert!(!html.contains("d-link"));
        assert!(html.contains("https://example.com/a.png"));
    }

    #[test]
    fn markdown_text_spoiler() {
        let html = render_markdown("the end: ||they live||!").unwrap();
        assert!(html.contains(r#"<span class="d-spoiler">they live</span>!"#));
    }

    #[test]
    fn markdown_empty_spoiler_is_literal() {
        let html = render_markdown("a |||| b").unwrap();
        assert!(!html.contains("d-spoiler"));
        assert!(html.contains("||||"));
    }

    #[test]
    fn markdown_spoiler_wraps_formatting() {
        let html = render_markdown("||*twist*||").unwrap();
        assert_eq!(html, "<p><span class=\"d-spoiler\"><em>twist</em></span></p>\n");
    }

    #[test]
    fn markdown_spoiler_spans_line_break() {
        let html = render_markdown("||line one\nline two||").unwrap();
        assert!(html.contains(r#"<span class="d-spoiler">line one<br />"#));
        assert!(html.contains("line two</span>"));
        assert!(!html.contains("||"));
    }

    #[test]
    fn markdown_spoiler_does_not_cross_paragraphs() {
        let html = render_markdown("||one\n\ntwo||").unwrap();
        assert!(!html.contains("d-spoiler"));
        assert_eq!(html.matches("||").count(), 2);
    }

    #[test]
    fn markdown_spoiler_markers_must_nest_with_emphasis() {
        let html = render_markdown("*a ||b* c||").unwrap();
        assert!(!html.contains("d-spoiler"));
        assert!(html.contains("<em>a ||b</em> c||"));
    }

    #[test]
    fn markdown_heading_markers_stay_text() {
        let setext = render_markdown("He said no\n---").unwrap();
        assert!(!setext.contains("<h2>"));
        assert!(setext.contains("He said no<br />"));
        assert!(setext.contains("---</p>"));

        let atx = render_markdown("# not a title").unwrap();
        assert_eq!(atx, "<p># not a title</p>\n");
    }

    #[test]
    fn markdown_list_markers_stay_text() {
        assert_eq!(
            render_markdown("- no way, she said").unwrap(),
            "<p>- no way, she said</p>\n"
        );
        assert_eq!(render_markdown("1. first").unwrap(), "<p>1. first</p>\n");

        let mixed = render_markdown("first line\n* second line").unwrap();
        assert!(!mixed.contains("<ul>"));
        assert!(mixed.contains("* second line"));
    }

    #[test]
    fn markdown_rule_stays_text() {
        let html = render_markdown("***").unwrap();
        assert!(!html.contains("<hr"));
        assert!(html.contains("***"));
    }

    #[test]
    fn markdown_block_markers_in_fences_are_untouched() {
        let html = render_markdown("```\n# comment\n- item\n```").unwrap();
        assert!(html.contains("<code># comment\n- item\n</code>"));
        assert!(!html.contains('\\'));
    }

    #[test]
    fn escape_block_markers_examples() {
        assert_eq!(escape_block_markers("## x\nplain"), "\\## x\nplain");
        assert_eq!(escape_block_markers("  12) x"), "  12\\) x");
        assert_eq!(escape_block_markers("-5 degrees"), "-5 degrees");
        assert_eq!(escape_block_markers("#hashtag"), "#hashtag");
        assert_eq!(escape_block_markers("**bold**"), "**bold**");
    }

    #[test]
    fn markdown_unsafe_link_target_is_blanked() {
        let html = render_markdown("[click](javascript:alert(1))").unwrap();
        assert!(html.contains(r#"<a href="" class="d-link" target="_blank">click</a>"#));
    }

    #[test]
    fn markdown_autolink_is_plain_link() {
        let html = render_markdown("<https://example.com/a.png>").unwrap();
        assert!(html.contains(r#"<a href="https://example.com/a.png" class="d-link""#));
        assert!(!html.contains("d-img"));
    }

    #[test]
    fn next_url_requires_body() {
        assert_eq!(next_url("http:// nothing"), None);
        assert_eq!(next_url("httpfoo"), None);
        assert_eq!(next_url("x https://a.b y"), Some((2, 13)));
    }

    // =========================================================================
    // Snippet views
    // =========================================================================

    #[test]
    fn snippet_view_structure() {
        let mut s = snippet(42, "hello **there**");
        s.attachment_urls = vec![
            "https://cdn.example/a.png".into(),
            "https://cdn.example/b.pdf".into(),
        ];
        let view = snippet_view(&s);

        assert_eq!(view.id.as_deref(), Some("snippet-42"));
        assert!(view.has_class("snippet-container"));
        let body = view.find_class("snippet").unwrap();
        assert_eq!(body.find_all_class("d-attachment-wrapper").len(), 2);

        let html = view.render().into_string();
        let md = html.find("<strong>there</strong>").unwrap();
        let att = html.find("d-attachment-wrapper").unwrap();
        assert!(md < att, "attachments come after the markdown body");
    }

    #[test]
    fn loading_placeholder_text() {
        let view = loading_placeholder(9);
        assert_eq!(view.id.as_deref(), Some("snippet-9"));
        assert_eq!(view.render().into_string(), r#"<div id="snippet-9"><i>Loading...</i></div>"#);
    }

    #[test]
    fn loaded_snippet_renders_markdown() {
        let view = loaded_snippet(9, "*hi*");
        assert!(view.render().into_string().contains("<em>hi</em>"));
    }
}
