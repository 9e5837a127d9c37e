//! Core algorithms – page layout, snapping, easing, scroll effects, and the
//! file catalog.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Every type is `Send + Sync` so it can be shared across async tasks.

pub mod artwork;
pub mod catalog;
pub mod document;
pub mod easing;
pub mod effects;
pub mod page;
pub mod snap;
