//! Caption generation and word-limit enforcement.

pub mod generator;
pub mod words;

pub use generator::{AltText, AltTextGenerator};
pub use words::{truncate_words, word_count};
