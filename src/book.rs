//! # Song Books
//!
//! A [`SongBook`] holds the songs of a book or setlist, the set pages that go
//! in front of them and the global instrument registry.
//!
//! ## Book outlines
//! An outline is a plain text file listing songs, one path per line, relative
//! to the outline's own directory:
//!
//! ```text
//! {title: Tuesday Session}
//! {transpose: all}
//! {instrument: Ukulele}
//! {define: C 0 0 0 3}
//! # remarks and blank lines are skipped
//! songs/grace.cho
//! songs/jolene.cho {transpose: -2}
//! {dirs: more}
//! {files: *.cho}
//! ```
//!
//! ## Conversion
//! [`SongBook::format`] formats every song and set, plans the front matter
//! (contents pages, set pages, parity blank), paginates the songs from the
//! first page after it and builds the table of contents with the same numbers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::mem;
use std::path::{Path, PathBuf};

use crate::config::BookOptions;
use crate::directive::{Directive, DirectiveKind};
use crate::error::BookError;
use crate::formatter::{format_song, FormatOptions};
use crate::instruments::InstrumentRegistry;
use crate::paginate::paginate;
use crate::parser::{parse_song, ParseOptions};
use crate::song::Song;
use crate::source::SongSource;
use crate::toc::{ContentsPlan, Toc};

pub const DEFAULT_TITLE: &str = "Songbook";

static SORT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(the|a|\(.*?\)) ").unwrap());

/// Which transposed copies of each song a book gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoTranspose {
    /// One copy per standard transposition, including the original key.
    TransposeAll,
    #[default]
    DoNotTranspose,
    /// Only the first declared transposition, when there is one.
    TransposeFirst,
}

impl AutoTranspose {
    /// Value of an outline's `{transpose}` directive: `all`, `0` or `1`.
    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Some(AutoTranspose::TransposeAll),
            "0" => Some(AutoTranspose::DoNotTranspose),
            "1" => Some(AutoTranspose::TransposeFirst),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SongBook {
    pub title: Option<String>,
    pub version: Option<String>,
    pub songs: Vec<Song>,
    /// One pseudo-song per performance set, printed before the songs.
    pub sets: Vec<Song>,
    pub auto_transpose: AutoTranspose,
    /// Instruments named by the outline's `{instrument}` directives.
    pub default_instrument_names: Vec<String>,
    pub instruments: InstrumentRegistry,
    #[serde(skip)]
    pub options: BookOptions,
    /// Directory that outline and setlist paths are relative to.
    #[serde(skip)]
    pub dir: PathBuf,
    pub contents: Option<Toc>,
}

impl SongBook {
    pub fn new(options: BookOptions) -> Self {
        Self {
            title: options.title.clone(),
            instruments: InstrumentRegistry::from_config(&options.instruments),
            options,
            ..Self::default()
        }
    }

    /// Load a book from an outline file.
    pub fn from_outline(
        path: impl AsRef<Path>,
        source: &dyn SongSource,
        options: BookOptions,
    ) -> Result<Self, BookError> {
        let mut book = Self::new(options);
        book.load_outline(path.as_ref(), source)?;
        Ok(book)
    }

    /// Title for display, `Songbook` until one is set.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn load_outline(&mut self, path: &Path, source: &dyn SongSource) -> Result<(), BookError> {
        let text = source.read(path)?;
        self.dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.load_from_text(&text, source)
    }

    /// Read outline text: song paths and book-level directives.
    pub fn load_from_text(&mut self, text: &str, source: &dyn SongSource) -> Result<(), BookError> {
        let mut dirs: Vec<String> = Vec::new();
        let mut current_instrument: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            let directive = match Directive::classify(line) {
                Some(directive) => directive,
                None => {
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let (name, transpose) = split_song_line(line);
                    let path = self.dir.join(name);
                    if source.exists(&path) {
                        self.add_song_from_source(&path, transpose, source)?;
                    } else {
                        log::warn!("Can't find song {}", path.display());
                    }
                    continue;
                }
            };

            let value = directive.value_or_empty();
            match directive.kind {
                DirectiveKind::Title => {
                    if self.title.is_none() {
                        self.title = Some(value.to_string());
                    }
                }
                DirectiveKind::Instrument => {
                    self.default_instrument_names.push(value.to_string());
                    current_instrument = Some(value.to_string());
                }
                DirectiveKind::Define => match &current_instrument {
                    Some(name) => {
                        self.instruments.get_or_insert(name).chart.add_grid(value);
                    }
                    None => log::warn!("Chord definition `{}` before any instrument", value),
                },
                DirectiveKind::Dirs => dirs.push(value.to_string()),
                DirectiveKind::Files => self.add_files(&dirs, value, source)?,
                DirectiveKind::Version => self.version = Some(value.to_string()),
                DirectiveKind::Transpose => match AutoTranspose::from_value(value) {
                    Some(policy) => self.auto_transpose = policy,
                    None => log::warn!("Unknown book transpose setting `{}`", value),
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn add_files(
        &mut self,
        dirs: &[String],
        pattern: &str,
        source: &dyn SongSource,
    ) -> Result<(), BookError> {
        let search: Vec<&str> = if dirs.is_empty() {
            vec!["."]
        } else {
            dirs.iter().map(|d| d.trim()).collect()
        };
        for dir in search {
            for path in source.find(&self.dir.join(dir), pattern)? {
                self.add_song_from_source(&path, 0, source)?;
            }
        }
        Ok(())
    }

    pub fn add_song_from_source(
        &mut self,
        path: &Path,
        transpose: i32,
        source: &dyn SongSource,
    ) -> Result<(), BookError> {
        let text = source.read(path)?;
        self.add_song_from_text(&text, path, transpose);
        Ok(())
    }

    /// Parse a song and add it, or its transposed copies, to the book.
    pub fn add_song_from_text(&mut self, text: &str, path: &Path, transpose: i32) {
        let options = ParseOptions {
            path: Some(path.to_path_buf()),
            transpose,
            instrument_name: self.instrument_name(),
            ..ParseOptions::default()
        };
        let song = parse_song(text, &options, &self.instruments);

        let copies: Vec<i32> = match self.auto_transpose {
            AutoTranspose::TransposeAll => song.standard_transpositions.clone(),
            AutoTranspose::TransposeFirst => {
                song.standard_transpositions.get(1).copied().into_iter().collect()
            }
            AutoTranspose::DoNotTranspose => Vec::new(),
        };

        if copies.is_empty() {
            self.songs.push(song);
            return;
        }
        for offset in copies {
            let mut copy = song.clone();
            copy.set_transpose(offset);
            self.songs.push(copy);
        }
    }

    fn instrument_name(&self) -> Option<String> {
        self.options
            .instrument
            .clone()
            .or_else(|| self.default_instrument_names.first().cloned())
    }

    /// Sort songs by title, ignoring a leading `the`, `a` or `(...)`.
    pub fn sort_alpha(&mut self) {
        self.songs.sort_by_cached_key(|song| sort_key(&song.title));
    }

    /// Format, paginate and index the book.
    pub fn format(&mut self, instrument: Option<&str>) {
        if self.title.is_none() {
            self.title = Some(DEFAULT_TITLE.to_string());
        }

        let options = FormatOptions {
            transpose: None,
            instrument: instrument.map(str::to_string).or_else(|| self.instrument_name()),
            stand_alone: false,
        };
        for song in self.sets.iter_mut().chain(self.songs.iter_mut()) {
            format_song(song, &options, &self.instruments);
        }

        let songs: Vec<Song> = mem::take(&mut self.songs)
            .into_iter()
            .filter(|song| !song.blank)
            .collect();
        let plan = ContentsPlan::new(&self.sets, &songs, self.options.contents_from);
        self.songs = paginate(songs, plan.first_song_page, self.options.pagination_policy());
        self.contents = Some(Toc::build(&self.sets, &mut self.songs, self.options.contents_from));
        log::info!(
            "Formatted \"{}\": {} songs, {} sets",
            self.title(),
            self.songs.iter().filter(|s| !s.blank).count(),
            self.sets.len()
        );
    }
}

/// Split `path {transpose: N}` into the path and its first offset.
fn split_song_line(line: &str) -> (&str, i32) {
    let Some((name, rest)) = line.split_once('{') else {
        return (line, 0);
    };
    let transpose = match Directive::classify(&format!("{{{}", rest)) {
        Some(d) if d.kind == DirectiveKind::Transpose => {
            let first = d.value_or_empty().split_whitespace().next().unwrap_or("0");
            first.parse::<i32>().unwrap_or_else(|_| {
                log::warn!("Ignoring transpose value `{}` for {}", first, name.trim());
                0
            })
        }
        _ => 0,
    };
    (name.trim(), transpose)
}

fn sort_key(title: &str) -> String {
    SORT_PREFIX.replace(&title.to_lowercase(), "").into_owned()
}
