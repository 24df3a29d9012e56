//! Full series page: header plus every snippet in order.

use crate::author::multi_author_view;
use crate::dom::Element;
use crate::snippet::snippet_view;
use crate::types::{Series, Snippet};

fn series_header(series: &Series) -> Element {
    Element::new("div")
        .class("series-header")
        .child(Element::new("h1").class("series-title").text(&series.title))
        .child(multi_author_view(&series.authors))
}

/// Each snippet followed by a separator rule.
fn snippet_sequence(snippets: &[Snippet]) -> Element {
    let mut root = Element::new("div").class("series-snippets");
    for snippet in snippets {
        root.add_subelement(snippet_view(snippet));
        root.add_subelement(Element::new("hr").class("snippet-separator"));
    }
    root
}

pub fn series_view(series: &Series) -> Element {
    Element::new("div")
        .class("series-container")
        .child(series_header(series))
        .child(snippet_sequence(&series.snippets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use maud::Render;

    #[test]
    fn header_has_title_and_authors() {
        let mut s = full_series("wolves", "Of Wolves");
        s.authors = vec![author(1, &["Ash"], "ash", "0001")];
        let view = series_view(&s);

        let header = view.find_class("series-header").unwrap();
        assert_eq!(header.find_class("series-title").unwrap().tag, "h1");
        assert_eq!(header.find_class("series-title").unwrap().text_content(), "Of Wolves");
        assert!(header.find_class("series-authors").is_some());
    }

    #[test]
    fn snippets_in_order_with_separators() {
        let mut s = full_series("t", "T");
        s.snippets = vec![snippet(3, "third"), snippet(1, "first"), snippet(2, "second")];
        let view = series_view(&s);

        let seq = view.find_class("series-snippets").unwrap();
        let kinds: Vec<&str> = seq.child_elements().map(|e| e.tag).collect();
        assert_eq!(kinds, vec!["div", "hr", "div", "hr", "div", "hr"]);

        let ids: Vec<&str> = seq
            .find_all_class("snippet-container")
            .iter()
            .filter_map(|e| e.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["snippet-3", "snippet-1", "snippet-2"]);
    }

    #[test]
    fn title_is_escaped() {
        let s = full_series("x", "<b>bold</b>");
        let html = series_view(&s).render().into_string();
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }
}
