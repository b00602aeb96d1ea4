//! Reusable widgets shared by the screens.

pub mod filter_bar;
pub mod popup;
pub mod text_input;
