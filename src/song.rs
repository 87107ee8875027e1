//! # Song Model
//!
//! Types produced by the parser and refined by the formatter.
//!
//! ## Type Hierarchy
//! ```text
//! Song
//!   ├── title, original_key, key, transpose, standard_transpositions
//!   ├── body: Vec<Segment>       (parser output, chords as written)
//!   ├── content: Vec<Segment>    (formatter output, chords transposed)
//!   ├── chords_used: Vec<String> (first-appearance order)
//!   ├── grids: Vec<ChordGrid>    (chords with a displayable diagram)
//!   ├── local_instruments        (song-scoped chord charts)
//!   └── pages, blank, path, notes
//!
//! Segment (enum)
//!   ├── Line(Line)             lyric or tab line
//!   │     └── Vec<Inline>      Text | Chord
//!   ├── Blank                  stanza separator
//!   ├── Comment / Heading      emphasised text
//!   ├── Meta { field, value }  subtitle, artist, composer, ...
//!   ├── RegionStart / RegionEnd (Chorus | Bridge | Tab | Custom)
//!   ├── PageBreak, Image
//!   └── KeyChange (parsed) -> Modulation (formatted)
//! ```
//!
//! ## Ownership
//! A `Song` owns all of its data. `Clone` is a deep copy: a setlist that uses the
//! same song twice gets two values that can be transposed and annotated
//! independently of each other and of the book's collection.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::instruments::{ChordGrid, InstrumentRegistry};
use crate::transpose::transpose_chord;

/// Piece of a content line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Chord(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub inlines: Vec<Inline>,
    /// Class name from `.class text` micro-markup.
    pub style: Option<String>,
    /// Inside a tab block: monospace, chords not highlighted.
    pub preformatted: bool,
    /// Forced line break before the next line (mid-stanza).
    pub line_break: bool,
}

impl Line {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Text(text.into())],
            ..Self::default()
        }
    }

    pub fn chords(&self) -> impl Iterator<Item = &str> {
        self.inlines.iter().filter_map(|i| match i {
            Inline::Chord(name) => Some(name.as_str()),
            Inline::Text(_) => None,
        })
    }

    /// The line as written, chords in brackets.
    pub fn to_markup(&self) -> String {
        self.inlines
            .iter()
            .map(|i| match i {
                Inline::Text(text) => text.clone(),
                Inline::Chord(name) => format!("[{}]", name),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaField {
    Subtitle,
    Artist,
    Composer,
    Lyricist,
    Time,
    Tempo,
}

impl MetaField {
    pub fn label(self) -> &'static str {
        match self {
            MetaField::Subtitle => "Subtitle",
            MetaField::Artist => "Artist",
            MetaField::Composer => "Composer",
            MetaField::Lyricist => "Lyricist",
            MetaField::Time => "Time",
            MetaField::Tempo => "Tempo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Chorus,
    Bridge,
    Tab,
    /// `{comment: .class ...}` block, named by its class.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Line(Line),
    Blank,
    Comment(String),
    Heading(String),
    Meta { field: MetaField, value: String },
    RegionStart(Region),
    RegionEnd(Region),
    PageBreak,
    Image(PathBuf),
    /// A `{key}` directive after the first one, as written.
    KeyChange(String),
    /// Formatted key change: display key and signed interval from the original key.
    Modulation {
        key: String,
        semitones: i32,
        minor: bool,
    },
}

/// Where chord diagrams go when the song is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridPlacement {
    #[default]
    Margin,
    /// Too many to fit beside the text: drawn on an extra trailing page.
    ExtraPage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    pub title: String,
    pub formatted_title: String,
    pub original_key: Option<String>,
    pub key: Option<String>,
    pub transpose: i32,
    /// Always starts with 0, followed by the offsets of `{transpose}` directives.
    pub standard_transpositions: Vec<i32>,
    pub body: Vec<Segment>,
    pub content: Vec<Segment>,
    pub chords_used: Vec<String>,
    pub grids: Vec<ChordGrid>,
    pub grid_placement: GridPlacement,
    pub pages: usize,
    pub blank: bool,
    pub path: Option<PathBuf>,
    pub instrument_name: Option<String>,
    pub local_instruments: InstrumentRegistry,
    /// Performance notes attached by a setlist.
    pub notes: Vec<String>,
}

impl Song {
    /// An empty one-page song with the given title.
    pub fn titled(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            formatted_title: title.clone(),
            title,
            original_key: None,
            key: None,
            transpose: 0,
            standard_transpositions: vec![0],
            body: Vec::new(),
            content: Vec::new(),
            chords_used: Vec::new(),
            grids: Vec::new(),
            grid_placement: GridPlacement::Margin,
            pages: 1,
            blank: false,
            path: None,
            instrument_name: None,
            local_instruments: InstrumentRegistry::new(),
            notes: Vec::new(),
        }
    }

    /// A blank page used to pad pagination.
    pub fn blank() -> Self {
        Self {
            blank: true,
            ..Self::titled("")
        }
    }

    /// Change the transposition and recompute the display key.
    pub fn set_transpose(&mut self, offset: i32) {
        self.transpose = offset;
        self.key = self
            .original_key
            .as_deref()
            .map(|k| transpose_chord(k, offset));
    }

    /// `(KEY)` when a key is known, otherwise empty.
    pub fn key_string(&self) -> String {
        match &self.key {
            Some(key) => format!("({})", key),
            None => String::new(),
        }
    }

    /// Directory that relative references in the song resolve against.
    pub fn dir(&self) -> &Path {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."))
    }
}
