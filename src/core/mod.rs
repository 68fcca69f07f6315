// src/core/mod.rs

pub mod charset;
pub mod html;
pub mod sanitize;

pub use html::Document;
