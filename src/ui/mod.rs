//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No I/O happens here.

pub mod halfblock;
pub mod layout;
pub mod lightbox;
pub mod page_widget;
pub mod spinner;
pub mod theme;
