// src/specs/mod.rs
//! # Page specs
//!
//! Page-specific extraction: *where the ground truth lives in the HTML* and
//! *how to pull it out*. Each spec reads one page shape through the
//! [`crate::markup`] traits and returns a `TableModel`.
//!
//! ## What does **not** live here
//! - Reading files or talking to workbooks (`pipeline`).
//! - Merging and ordering (`table`).
//!
//! ## Conventions
//! - Stable column shapes per page, documented in the spec module.
//! - Selectors come from `config::options::ScrapeOptions` so a changed page
//!   layout is a config edit, not a rebuild.
//! - Specs are tested offline against inline or fixture HTML.
pub mod basket;
