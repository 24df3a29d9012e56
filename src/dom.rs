//! Immutable-by-default view-model tree.
//!
//! Components build [`Element`] trees instead of mutating a live document.
//! A finished tree renders to HTML through [`maud::Render`], so it can be
//! interpolated straight into `html!` templates. A separate, explicit patch
//! step (the `*_mut` lookups plus [`Element::toggle_class`],
//! [`Element::set_hidden`] and friends) models what the browser does on
//! user interaction, which keeps that logic testable without a browser.
//!
//! Hidden elements render with `style="display: none"`, which is exactly what
//! the embedded page script toggles at runtime.

use maud::{Escaper, Render};
use std::fmt::Write;

/// Elements that have no closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Pre-rendered HTML, e.g. markdown output. Opaque to the patch step.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
    pub hidden: bool,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add one or more space-separated classes.
    pub fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn raw(mut self, html: impl Into<String>) -> Self {
        self.children.push(Node::Raw(html.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Append `child` and return a handle to it for further building.
    pub fn add_subelement(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(el)) => el,
            _ => unreachable!("last child was just pushed as an element"),
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    // ------------------------------------------------------------------
    // Patch operations
    // ------------------------------------------------------------------

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Concatenated text content of this subtree (raw HTML excluded).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Element(el) => out.push_str(&el.text_content()),
                Node::Text(t) => out.push_str(t),
                Node::Raw(_) => {}
            }
        }
        out
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Depth-first search, including `self`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|el| el.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if let Some(found) = el.find_mut(pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_id(&self, id: &str) -> Option<&Element> {
        self.find(&|el| el.id.as_deref() == Some(id))
    }

    pub fn find_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.find_mut(&|el| el.id.as_deref() == Some(id))
    }

    pub fn find_class(&self, class: &str) -> Option<&Element> {
        self.find(&|el| el.has_class(class))
    }

    /// All elements in the subtree (including `self`) carrying `class`.
    pub fn find_all_class(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_class(class, &mut out);
        out
    }

    fn collect_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            out.push(self);
        }
        for el in self.child_elements() {
            el.collect_class(class, out);
        }
    }

    /// Apply `f` to every element in the subtree carrying `class`.
    pub fn for_each_class_mut(&mut self, class: &str, f: &mut dyn FnMut(&mut Element)) {
        if self.has_class(class) {
            f(self);
        }
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.for_each_class_mut(class, f);
            }
        }
    }
}

impl Render for Element {
    fn render_to(&self, buffer: &mut String) {
        buffer.push('<');
        buffer.push_str(self.tag);
        if let Some(id) = &self.id {
            push_attr(buffer, "id", id);
        }
        if !self.classes.is_empty() {
            push_attr(buffer, "class", &self.classes.join(" "));
        }
        for (name, value) in &self.attrs {
            push_attr(buffer, name, value);
        }
        if self.hidden {
            push_attr(buffer, "style", "display: none");
        }
        buffer.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            child.render_to(buffer);
        }
        buffer.push_str("</");
        buffer.push_str(self.tag);
        buffer.push('>');
    }
}

impl Render for Node {
    fn render_to(&self, buffer: &mut String) {
        match self {
            Node::Element(el) => el.render_to(buffer),
            Node::Text(text) => {
                // Writing into a String cannot fail.
                let _ = Escaper::new(buffer).write_str(text);
            }
            Node::Raw(html) => buffer.push_str(html),
        }
    }
}

fn push_attr(buffer: &mut String, name: &str, value: &str) {
    buffer.push(' ');
    buffer.push_str(name);
    buffer.push_str("=\"");
    let _ = Escaper::new(buffer).write_str(value);
    buffer.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(el: &Element) -> String {
        el.render().into_string()
    }

    #[test]
    fn renders_attributes_in_order() {
        let el = Element::new("a")
            .id("x")
            .class("d-link extra")
            .attr("href", "https://example.com")
            .text("hi");
        assert_eq!(
            render(&el),
            r#"<a id="x" class="d-link extra" href="https://example.com">hi</a>"#
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let el = Element::new("img").attr("src", "a.png");
        assert_eq!(render(&el), r#"<img src="a.png">"#);
    }

    #[test]
    fn hidden_elements_render_display_none() {
        let el = Element::new("span").hidden(true);
        assert_eq!(render(&el), r#"<span style="display: none"></span>"#);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let el = Element::new("span")
            .attr("title", r#"say "hi""#)
            .text("<script>alert('x')</script>");
        let html = render(&el);
        assert!(html.contains("&quot;hi&quot;"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn raw_nodes_pass_through() {
        let el = Element::new("div").raw("<b>bold</b>");
        assert_eq!(render(&el), "<div><b>bold</b></div>");
    }

    #[test]
    fn add_subelement_returns_child_handle() {
        let mut root = Element::new("div");
        let child = root.add_subelement(Element::new("ul").class("list"));
        child.add_subelement(Element::new("li").text("one"));
        assert_eq!(render(&root), r#"<div><ul class="list"><li>one</li></ul></div>"#);
    }

    #[test]
    fn class_builder_dedupes() {
        let el = Element::new("div").class("a b").class("a");
        assert_eq!(el.classes, vec!["a", "b"]);
    }

    #[test]
    fn toggle_class_flips() {
        let mut el = Element::new("span").class("d-spoiler");
        el.toggle_class("d-spoiler-show");
        assert!(el.has_class("d-spoiler-show"));
        el.toggle_class("d-spoiler-show");
        assert!(!el.has_class("d-spoiler-show"));
    }

    #[test]
    fn find_by_id_and_class() {
        let mut root = Element::new("div")
            .child(Element::new("span").id("name").class("label"))
            .child(Element::new("div").child(Element::new("b").class("deep")));
        assert!(root.find_id("name").is_some());
        assert!(root.find_class("deep").is_some());
        assert!(root.find_id("missing").is_none());

        root.find_id_mut("name").unwrap().set_text("kit#0001");
        assert_eq!(root.find_id("name").unwrap().text_content(), "kit#0001");
    }

    #[test]
    fn for_each_class_mut_visits_all_matches() {
        let mut root = Element::new("div")
            .child(Element::new("img").class("d-img d-img-spoiler"))
            .child(Element::new("div").child(Element::new("img").class("d-img d-img-spoiler")));
        root.for_each_class_mut("d-img-spoiler", &mut |el| el.add_class("seen"));
        assert_eq!(root.find_all_class("seen").len(), 2);
    }

    #[test]
    fn set_attr_replaces_existing() {
        let mut el = Element::new("input").attr("value", "old");
        el.set_attr("value", "new");
        assert_eq!(el.get_attr("value"), Some("new"));
        assert_eq!(el.attrs.len(), 1);
    }

    #[test]
    fn element_interpolates_into_maud() {
        let el = Element::new("p").text("inside");
        let page = maud::html! { main { (el) } };
        assert_eq!(page.into_string(), "<main><p>inside</p></main>");
    }
}
