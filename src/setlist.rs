//! # Setlists
//!
//! A setlist reorders a book for a performance. It is written as a Markdown
//! outline:
//!
//! ```text
//! {title: Friday at the Crown}
//! {book: session.txt}
//! # Set 1
//! ## amazing grace +2
//! Slow, capo 2.
//! ## jolene {transpose: -2}
//! # Set 2
//! ## wild mountain
//! ```
//!
//! `# NAME` starts a set, `## REFERENCE` picks a song, anything else is a
//! performance note for the song above it. A note between a set heading and
//! its first song belongs to the set page only. A reference matches the first song
//! whose title contains its words in order, ignoring case; spaces match any
//! run of characters.
//!
//! Every occurrence is a deep copy of the book's song, so the same song can be
//! played twice in different keys with different notes.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::mem;
use std::path::PathBuf;

use crate::book::SongBook;
use crate::directive::{Directive, DirectiveKind};
use crate::error::BookError;
use crate::song::{Line, Segment, Song};
use crate::source::SongSource;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static BOOK_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\{book:\s*(.*?)\s*\}$").unwrap());

static TRANSPOSE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{(?:tr|transpose):\s*(.*?)\s*\}").unwrap());

static TRAILING_OFFSETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([+-]\d+(?:\s+[+-]?\d+)*)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongReference {
    pub name: String,
    /// Offsets written with the reference. Only the first is applied: it is
    /// the key to play in, and an explicit `+0` resets a transposed song.
    /// Later offsets are kept as written and have no effect on ordering.
    pub offsets: Vec<i32>,
}

impl SongReference {
    /// Parse the text after `## `.
    ///
    /// ```
    /// use chordbook::SongReference;
    ///
    /// let r = SongReference::parse("Route 66 +2");
    /// assert_eq!(r.name, "Route 66");
    /// assert_eq!(r.offsets, vec![2]);
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut name = text.trim().to_string();
        let mut offsets = Vec::new();

        if let Some(caps) = TRANSPOSE_DIRECTIVE.captures(&name) {
            offsets = parse_offsets(&caps[1]);
            name = TRANSPOSE_DIRECTIVE.replace(&name, "").trim().to_string();
        } else if let Some(caps) = TRAILING_OFFSETS.captures(&name) {
            offsets = parse_offsets(&caps[1]);
            name = TRAILING_OFFSETS.replace(&name, "").trim().to_string();
        }

        Self { name, offsets }
    }

    /// Case-insensitive pattern with each space standing for any characters.
    pub fn pattern(&self) -> Option<Regex> {
        let source = self
            .name
            .split(' ')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*?");
        RegexBuilder::new(&source).case_insensitive(true).build().ok()
    }

    /// Index of the first non-blank song whose title matches.
    pub fn find_in(&self, songs: &[Song]) -> Option<usize> {
        let pattern = self.pattern()?;
        songs
            .iter()
            .position(|song| !song.blank && pattern.is_match(&song.title))
    }
}

fn parse_offsets(text: &str) -> Vec<i32> {
    text.split_whitespace()
        .filter_map(|token| match token.parse::<i32>() {
            Ok(offset) => Some(offset),
            Err(_) => {
                log::warn!("Ignoring setlist transpose value `{}`", token);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetlistLine {
    Title(String),
    Version(String),
    Book(PathBuf),
    Set(String),
    Song(SongReference),
    Note(String),
}

/// Classify the non-empty lines of a setlist.
pub fn parse_setlist(text: &str) -> Vec<SetlistLine> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let line = WHITESPACE.replace_all(raw.trim(), " ").into_owned();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = BOOK_DIRECTIVE.captures(&line) {
            lines.push(SetlistLine::Book(PathBuf::from(&caps[1])));
            continue;
        }
        if let Some(directive) = Directive::classify(&line) {
            match directive.kind {
                DirectiveKind::Title => {
                    lines.push(SetlistLine::Title(directive.value_or_empty().to_string()))
                }
                DirectiveKind::Version => {
                    lines.push(SetlistLine::Version(directive.value_or_empty().to_string()))
                }
                _ => log::debug!("Ignoring setlist directive {}", line),
            }
            continue;
        }

        let parsed = if let Some(name) = line.strip_prefix("## ") {
            SetlistLine::Song(SongReference::parse(name))
        } else if let Some(name) = line.strip_prefix("# ") {
            SetlistLine::Set(name.trim().to_string())
        } else {
            SetlistLine::Note(line)
        };
        lines.push(parsed);
    }
    lines
}

impl SongBook {
    /// Replace the book's songs with the songs a setlist names, in its order.
    ///
    /// If the book has no songs yet, the setlist's `{book: path}` is loaded
    /// first, relative to [`SongBook::dir`]. References that match nothing
    /// become placeholder songs titled `NAME (not found)`.
    pub fn order_by_setlist(
        &mut self,
        setlist: &str,
        source: &dyn SongSource,
    ) -> Result<(), BookError> {
        let lines = parse_setlist(setlist);

        if self.songs.is_empty() {
            let book_path = lines.iter().find_map(|line| match line {
                SetlistLine::Book(path) => Some(path.clone()),
                _ => None,
            });
            if let Some(path) = book_path {
                let path = self.dir.join(path);
                self.load_outline(&path, source)?;
            }
        }

        let library = mem::take(&mut self.songs);
        let mut ordered: Vec<Song> = Vec::new();
        self.sets.clear();
        self.version = None;

        let mut current_set: Option<usize> = None;
        let mut current_song: Option<usize> = None;
        let mut last_in_set: Option<usize> = None;

        for line in lines {
            match line {
                SetlistLine::Title(title) => self.title = Some(title),
                SetlistLine::Version(version) => self.version = Some(version),
                SetlistLine::Book(_) => {}
                SetlistLine::Set(name) => {
                    if let (Some(song), Some(set)) = (last_in_set, current_set) {
                        mark_end(&mut ordered[song], &self.sets[set].title);
                    }
                    self.sets.push(Song::titled(name));
                    current_set = Some(self.sets.len() - 1);
                    current_song = None;
                    last_in_set = None;
                }
                SetlistLine::Song(reference) => {
                    let (mut song, heading) = pick(&reference, &library);
                    if let Some(set) = current_set {
                        if last_in_set.is_none() {
                            song.title = format!("{} {{Start of {}}}", song.title, self.sets[set].title);
                        }
                        self.sets[set].body.push(Segment::Heading(heading));
                    }
                    ordered.push(song);
                    current_song = Some(ordered.len() - 1);
                    last_in_set = current_song;
                }
                SetlistLine::Note(note) => {
                    if let Some(set) = current_set {
                        self.sets[set].body.push(Segment::Line(Line::plain(note.clone())));
                    }
                    match current_song {
                        Some(song) => ordered[song].notes.push(note),
                        None if current_set.is_none() => {
                            log::debug!("Dropping setlist note before any set or song: {}", note)
                        }
                        None => {}
                    }
                }
            }
        }

        if let (Some(song), Some(set)) = (last_in_set, current_set) {
            mark_end(&mut ordered[song], &self.sets[set].title);
        }

        log::info!(
            "Setlist picked {} songs in {} sets from {}",
            ordered.len(),
            self.sets.len(),
            library.len()
        );
        self.songs = ordered;
        Ok(())
    }
}

/// Copy of the referenced song in the key the setlist asks for, and the
/// heading for the set page. Without an offset on the reference, the song's
/// first declared transposition is used.
fn pick(reference: &SongReference, library: &[Song]) -> (Song, String) {
    let Some(index) = reference.find_in(library) else {
        log::warn!("No song matches setlist entry \"{}\"", reference.name);
        let placeholder = Song::titled(format!("{} (not found)", reference.name));
        return (placeholder, format!("{} (NO CHART)", reference.name));
    };

    let mut song = library[index].clone();
    match reference.offsets.first() {
        Some(&offset) => song.set_transpose(offset),
        None => {
            if let Some(&offset) = song.standard_transpositions.get(1) {
                if offset != 0 {
                    song.set_transpose(offset);
                }
            }
        }
    }

    let heading = match &song.key {
        Some(key) => format!("{} (in {})", reference.name, key),
        None => reference.name.clone(),
    };
    (song, heading)
}

fn mark_end(song: &mut Song, set_title: &str) {
    song.title = format!("{} {{End of {}}}", song.title, set_title);
}
