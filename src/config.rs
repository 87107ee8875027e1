//! # Book Options
//!
//! Settings for a book conversion, read from YAML the same way song metadata
//! front-matter is read elsewhere: a serde struct with kebab-case keys where
//! every field has a default.
//!
//! ## Example
//! ```yaml
//! keep-order: true
//! blank-accounting: uncounted
//! contents-from: 2
//! instrument: Ukulele
//! instruments:
//!   - name: Ukulele
//!     tuning: GCEA
//!     chords:
//!       - C 0 0 0 3
//!       - G7 0 2 1 2
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BookError;
use crate::paginate::{BlankAccounting, PaginationPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstrumentConfig {
    pub name: String,
    #[serde(default)]
    pub tuning: Option<String>,
    /// Define lines, `NAME definition...`.
    #[serde(default)]
    pub chords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BookOptions {
    /// Pad with blank pages instead of moving spreads later in the book.
    pub keep_order: bool,
    pub blank_accounting: BlankAccounting,
    /// Printed page of the first contents page. Songs follow the contents
    /// and set pages.
    pub contents_from: usize,
    pub title: Option<String>,
    pub instrument: Option<String>,
    pub instruments: Vec<InstrumentConfig>,
}

impl Default for BookOptions {
    fn default() -> Self {
        Self {
            keep_order: false,
            blank_accounting: BlankAccounting::Counted,
            contents_from: 2,
            title: None,
            instrument: None,
            instruments: Vec::new(),
        }
    }
}

impl BookOptions {
    pub fn from_yaml(content: &str) -> Result<Self, BookError> {
        serde_yaml::from_str(content).map_err(|e| BookError::ConfigError(e.to_string()))
    }

    pub fn pagination_policy(&self) -> PaginationPolicy {
        PaginationPolicy {
            keep_order: self.keep_order,
            blank_accounting: self.blank_accounting,
        }
    }
}
