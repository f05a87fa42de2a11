//! Bundled game titles.

pub mod simple;
