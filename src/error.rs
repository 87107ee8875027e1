//! # Error Types
//!
//! This module defines all error types for the songbook converter.
//!
//! Almost nothing in a song text is an error: unknown directives are content,
//! unknown notes pass through untouched and unmatched setlist entries become
//! placeholders. What remains are failures of the outside world.
//!
//! ## Error Types
//! - `InputUnavailable` - The input-supply service could not provide a text
//! - `ConfigError` - Invalid YAML options or instrument definitions
//!
//! ## Usage
//! ```rust
//! use chordbook::{BookError, MemorySource, SongBook};
//!
//! let source = MemorySource::new();
//! match SongBook::from_outline("book.txt", &source, Default::default()) {
//!     Ok(book) => println!("{} songs", book.songs.len()),
//!     Err(BookError::InputUnavailable { path, reason }) => {
//!         eprintln!("Cannot read {}: {}", path, reason);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookError {
    /// A required input could not be supplied.
    ///
    /// Raised by a [`SongSource`](crate::SongSource) when a file it claimed to
    /// know about cannot be read, or when a book outline itself is missing.
    ///
    /// # Example
    /// ```
    /// # use chordbook::BookError;
    /// let err = BookError::InputUnavailable {
    ///     path: "songs/amazing-grace.cho".to_string(),
    ///     reason: "permission denied".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Input unavailable: songs/amazing-grace.cho (permission denied)"
    /// );
    /// ```
    #[error("Input unavailable: {path} ({reason})")]
    InputUnavailable { path: String, reason: String },

    /// Invalid configuration.
    ///
    /// Occurs when book options or instrument definitions cannot be parsed.
    ///
    /// # Example
    /// ```
    /// # use chordbook::BookError;
    /// let err = BookError::ConfigError("unknown blank accounting `sometimes`".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: unknown blank accounting `sometimes`");
    /// ```
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl BookError {
    pub(crate) fn unavailable(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        BookError::InputUnavailable {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
