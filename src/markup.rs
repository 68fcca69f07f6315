// src/markup.rs
//! Boundary between page extraction and whatever parses the HTML.
//!
//! `specs` only talks to these traits. The crate ships one implementation,
//! [`crate::core::html::Document`]; another parser can be plugged in by
//! implementing both traits for its own document and element handles.
//!
//! Selectors are CSS-like: whitespace-separated compounds (descendant
//! combinator only), each a tag, `.class`, `#id` or a mix such as `td.c1`.

pub trait MarkupElement {
    /// Attribute of this element.
    fn attr(&self, name: &str) -> Option<String>;

    /// Attribute of the first descendant matching `selector` that carries it.
    fn sub_attr(&self, selector: &str, name: &str) -> Option<String>;

    /// Visible text of every descendant matching `selector`, joined by one
    /// space. Empty when nothing matches.
    fn text(&self, selector: &str) -> String;

    /// Attribute of an `<input>` nested under the descendant matching
    /// `selector` (the `max` hint of a quantity box, for instance).
    fn input_attr(&self, selector: &str, name: &str) -> Option<String> {
        self.sub_attr(&format!("{selector} input"), name)
    }
}

pub trait MarkupDocument {
    type Element<'a>: MarkupElement
    where
        Self: 'a;

    /// Elements matching `selector`, in document order.
    fn select<'a>(&'a self, selector: &str) -> Vec<Self::Element<'a>>;
}
