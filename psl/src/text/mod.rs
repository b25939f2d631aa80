//! Text preparation and layout.

pub(crate) mod paragraph;
pub(crate) mod prepare;
pub(crate) mod tokenizer;

pub use prepare::TextMode;
