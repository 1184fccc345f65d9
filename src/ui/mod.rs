//! HTML rendering for the checker page.
//!
//! Markup is built with `format!` and swapped in by htmx. Every string that
//! originates from the user or the analysis service goes through
//! [`markup::escape`].
//!
//! # Structure
//!
//! - [`markup`]: escaping and small styled building blocks (tags, badges, buttons)
//! - [`panels`]: the checker container and its panels
//! - [`page`]: full-page shell

pub mod markup;
pub mod page;
pub mod panels;
