//! Author name rendering.

use crate::dom::Element;
use crate::types::Author;

/// One author: display names, then `username` and `discriminator`.
pub fn author_view(author: &Author) -> Element {
    Element::new("span")
        .class("author-container")
        .child(
            Element::new("span")
                .class("author-display-name")
                .text(author.display_name()),
        )
        .child(
            Element::new("span")
                .class("author-username-container")
                .child(
                    Element::new("span")
                        .class("author-username")
                        .text(&author.username),
                )
                .child(
                    Element::new("span")
                        .class("author-discriminator")
                        .text(&author.discriminator),
                ),
        )
}

/// A list of authors joined as "A", "A and B", "A, B, and C".
pub fn multi_author_view(authors: &[Author]) -> Element {
    let mut root = Element::new("div").class("series-authors");
    let count = authors.len();

    for (idx, author) in authors.iter().enumerate() {
        if count > 1 && idx > 0 {
            let mut sep = String::from(if count > 2 { ", " } else { " " });
            if idx == count - 1 {
                sep.push_str("and ");
            }
            root.push_text(sep);
        }
        root.add_subelement(author_view(author));
    }
    root
}
