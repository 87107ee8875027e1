//! # Song Parser
//!
//! Turns raw song text into a [`Song`] in a single pass over its lines.
//!
//! ## State
//! - `in_tab` - inside `{start_of_tab}`: lines are preformatted, chords not highlighted
//! - `open_quote` - an open chorus or bridge region
//! - `open_block` - an open custom block started by `{comment: .class ...}`
//! - `current_instrument` - target of `{define}` and `{tuning}` lines
//!
//! ## Content lines
//! Lines that are not directives are content. Lines starting with `#` are
//! remarks and are dropped. Chord markers glued to a word are pulled apart
//! from it (`word[C]` -> `word [C]`, `[C]word` -> `[C] word`) but a chord
//! inside a word stays where it is. Outside tab blocks `][` is split into two
//! markers and the line is trimmed; a line starting with `.` becomes a styled
//! line named by its first word.
//!
//! ## Example
//! ```rust
//! use chordbook::{parse_song, InstrumentRegistry, ParseOptions, Segment};
//!
//! let text = "{title: Amazing Grace}\n{key: G}\n[G]Amazing [C]grace\nhow [G]sweet the sound";
//! let song = parse_song(text, &ParseOptions::default(), &InstrumentRegistry::new());
//!
//! assert_eq!(song.title, "Amazing Grace");
//! assert_eq!(song.original_key.as_deref(), Some("G"));
//! assert_eq!(song.body.len(), 2);
//! assert!(matches!(&song.body[0], Segment::Line(line) if line.line_break));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

use crate::directive::{Directive, DirectiveKind};
use crate::instruments::InstrumentRegistry;
use crate::song::{Inline, Line, MetaField, Region, Segment, Song};
use crate::transpose::transpose_chord;

static CHORD_AFTER_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)(\[[^\]]*?\])( |$)").unwrap());

static CHORD_BEFORE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^| )(\[[^\]]*?\])(\w)").unwrap());

static CHORD_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]").unwrap());

/// Caller-supplied context for parsing one song.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Used when the text has no `{title}` directive.
    pub fallback_title: String,
    pub path: Option<PathBuf>,
    pub transpose: i32,
    pub instrument_name: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fallback_title: "Song".to_string(),
            path: None,
            transpose: 0,
            instrument_name: None,
        }
    }
}

/// Parse a song. Never fails: anything unrecognised is content.
pub fn parse_song(text: &str, options: &ParseOptions, registry: &InstrumentRegistry) -> Song {
    let mut song = Song::titled("");
    song.path = options.path.clone();
    song.transpose = options.transpose;
    song.instrument_name = options.instrument_name.clone();

    let mut parser = SongParser::new(song, registry);
    for line in text.lines() {
        parser.parse_line(line);
    }
    let mut song = parser.finish();

    if song.title.is_empty() {
        song.title = options.fallback_title.clone();
    }
    song.formatted_title = song.title.clone();
    song
}

/// Space chord markers away from the word they are glued to.
pub fn normalize_chord_markup(line: &str) -> String {
    let line = CHORD_AFTER_WORD.replace_all(line, "${1} ${2}${3}");
    CHORD_BEFORE_WORD
        .replace_all(&line, "${1}${2} ${3}")
        .into_owned()
}

/// Split a line into text and chord pieces.
pub fn split_inlines(line: &str) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut last = 0;
    for caps in CHORD_MARKER.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            inlines.push(Inline::Text(line[last..whole.start()].to_string()));
        }
        inlines.push(Inline::Chord(caps[1].to_string()));
        last = whole.end();
    }
    if last < line.len() {
        inlines.push(Inline::Text(line[last..].to_string()));
    }
    inlines
}

struct SongParser<'r> {
    registry: &'r InstrumentRegistry,
    song: Song,
    in_tab: bool,
    open_quote: Option<Region>,
    open_block: Option<String>,
    current_instrument: Option<String>,
}

impl<'r> SongParser<'r> {
    fn new(song: Song, registry: &'r InstrumentRegistry) -> Self {
        Self {
            registry,
            song,
            in_tab: false,
            open_quote: None,
            open_block: None,
            current_instrument: None,
        }
    }

    fn push(&mut self, segment: Segment) {
        self.song.body.push(segment);
    }

    fn parse_line(&mut self, line: &str) {
        match Directive::classify(line) {
            Some(directive) => self.apply_directive(directive),
            None => self.push_content(line),
        }
    }

    fn push_content(&mut self, raw: &str) {
        if raw.trim_start().starts_with('#') {
            return;
        }
        let line = normalize_chord_markup(raw);

        if line.trim().is_empty() {
            self.push(Segment::Blank);
            return;
        }

        if self.in_tab {
            self.push(Segment::Line(Line {
                inlines: split_inlines(&line),
                preformatted: true,
                ..Line::default()
            }));
            return;
        }

        let line = line.replace("][", "] [");
        let line = line.trim();
        let style = line
            .strip_prefix('.')
            .and_then(|rest| rest.split_once(' '))
            .map(|(class, _)| class)
            .filter(|class| !class.is_empty())
            .map(str::to_string);
        let text = match style {
            Some(_) => &line[1..],
            None => line,
        };

        self.push(Segment::Line(Line {
            inlines: split_inlines(text),
            style,
            ..Line::default()
        }));
    }

    fn apply_directive(&mut self, directive: Directive) {
        let value = directive.value_or_empty().to_string();
        match directive.kind {
            DirectiveKind::Title => self.song.title.push_str(&value),
            DirectiveKind::Subtitle => self.push_meta(MetaField::Subtitle, value),
            DirectiveKind::Artist => self.push_meta(MetaField::Artist, value),
            DirectiveKind::Composer => self.push_meta(MetaField::Composer, value),
            DirectiveKind::Lyricist => self.push_meta(MetaField::Lyricist, value),
            DirectiveKind::Time => self.push_meta(MetaField::Time, value),
            DirectiveKind::Tempo => self.push_meta(MetaField::Tempo, value),
            DirectiveKind::Key => {
                if self.song.original_key.is_some() {
                    self.push(Segment::KeyChange(value));
                } else {
                    self.song.key = Some(transpose_chord(&value, self.song.transpose));
                    self.song.original_key = Some(value);
                }
            }
            DirectiveKind::Transpose => {
                for token in value.split_whitespace() {
                    match token.parse::<i32>() {
                        Ok(offset) => self.song.standard_transpositions.push(offset),
                        Err(_) => log::warn!("Ignoring transpose value `{}` in {}", token, self.describe()),
                    }
                }
            }
            DirectiveKind::StartOfChorus => self.open_quote(Region::Chorus),
            DirectiveKind::StartOfBridge => self.open_quote(Region::Bridge),
            DirectiveKind::EndOfChorus | DirectiveKind::EndOfBridge => self.close_quote(),
            DirectiveKind::StartOfTab => {
                if !self.in_tab {
                    self.in_tab = true;
                    self.push(Segment::RegionStart(Region::Tab));
                }
            }
            DirectiveKind::EndOfTab => self.close_tab(),
            DirectiveKind::NewPage => {
                self.close_block();
                self.push(Segment::PageBreak);
                self.song.pages += 1;
            }
            DirectiveKind::PageImage => {
                self.close_block();
                let image = self.song.dir().join(&value);
                self.push(Segment::Image(image));
            }
            DirectiveKind::Instrument => {
                if !self.song.local_instruments.contains(&value) {
                    let seeded = self.registry.get(&value).cloned();
                    match seeded {
                        Some(instrument) => self.song.local_instruments.add(instrument),
                        None => {
                            self.song.local_instruments.get_or_insert(&value);
                        }
                    }
                }
                self.current_instrument = Some(value);
            }
            DirectiveKind::Define => {
                if let Some(name) = &self.current_instrument {
                    if let Some(instrument) = self.song.local_instruments.get_mut(name) {
                        instrument.chart.add_grid(&value);
                    }
                }
            }
            DirectiveKind::Tuning => {
                if let Some(name) = &self.current_instrument {
                    if let Some(instrument) = self.song.local_instruments.get_mut(name) {
                        instrument.tuning = Some(value);
                    }
                }
            }
            DirectiveKind::Comment => {
                self.close_block();
                let text = match value.strip_prefix('.') {
                    Some(rest) => {
                        let class = rest.split(' ').next().unwrap_or("");
                        if !class.is_empty() {
                            self.open_block = Some(class.to_string());
                            self.push(Segment::RegionStart(Region::Custom(class.to_string())));
                        }
                        rest.to_string()
                    }
                    None => value,
                };
                self.push(Segment::Comment(text));
            }
            DirectiveKind::Grids | DirectiveKind::Dirs | DirectiveKind::Files | DirectiveKind::Version => {}
        }
    }

    fn push_meta(&mut self, field: MetaField, value: String) {
        self.push(Segment::Meta { field, value });
    }

    fn open_quote(&mut self, region: Region) {
        self.close_quote();
        self.open_quote = Some(region.clone());
        self.push(Segment::RegionStart(region));
    }

    fn close_quote(&mut self) {
        if let Some(region) = self.open_quote.take() {
            self.push(Segment::RegionEnd(region));
        }
    }

    fn close_tab(&mut self) {
        if self.in_tab {
            self.in_tab = false;
            self.push(Segment::RegionEnd(Region::Tab));
        }
    }

    fn close_block(&mut self) {
        if let Some(class) = self.open_block.take() {
            self.push(Segment::RegionEnd(Region::Custom(class)));
        }
    }

    fn describe(&self) -> String {
        match &self.song.path {
            Some(path) => path.display().to_string(),
            None if !self.song.title.is_empty() => self.song.title.clone(),
            None => "untitled song".to_string(),
        }
    }

    fn finish(mut self) -> Song {
        self.close_block();
        self.close_tab();
        self.close_quote();
        mark_line_breaks(&mut self.song.body);
        self.song
    }
}

/// Join every two adjacent content lines with a forced break.
///
/// Only `Line` segments carry the flag. Comments, headings and metadata are
/// blocks of their own and already end their line.
fn mark_line_breaks(body: &mut [Segment]) {
    for i in 1..body.len() {
        if !matches!(body[i], Segment::Line(_)) {
            continue;
        }
        if let Segment::Line(previous) = &mut body[i - 1] {
            previous.line_break = true;
        }
    }
}
