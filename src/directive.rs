//! # Directive Classifier
//!
//! Recognises `{name}` and `{name: value}` lines and maps `name` (case-insensitively)
//! onto a closed vocabulary.
//!
//! ## Vocabulary
//! ```text
//! title, t            subtitle, st         artist        composer
//! lyricist            time                 tempo         key
//! start_of_chorus, soc   end_of_chorus, eoc
//! start_of_tab, sot      end_of_tab, eot
//! start_of_bridge, sob   end_of_bridge, eob
//! transpose, tr       new_page, np         define        grids
//! comment, c          instrument           tuning        dirs
//! files               version              page_image, pi
//! ```
//!
//! Anything else in braces (unknown name, missing closing brace) is not a
//! directive. The caller treats it as ordinary content.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    Title,
    Subtitle,
    Artist,
    Composer,
    Lyricist,
    Time,
    Tempo,
    Key,
    StartOfChorus,
    EndOfChorus,
    StartOfTab,
    EndOfTab,
    StartOfBridge,
    EndOfBridge,
    Transpose,
    NewPage,
    Define,
    Grids,
    Comment,
    Instrument,
    Tuning,
    Dirs,
    Files,
    Version,
    PageImage,
}

impl DirectiveKind {
    /// Resolve a directive name or alias. `name` must already be lowercase.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "t" | "title" => DirectiveKind::Title,
            "st" | "subtitle" => DirectiveKind::Subtitle,
            "artist" => DirectiveKind::Artist,
            "composer" => DirectiveKind::Composer,
            "lyricist" => DirectiveKind::Lyricist,
            "time" => DirectiveKind::Time,
            "tempo" => DirectiveKind::Tempo,
            "key" => DirectiveKind::Key,
            "soc" | "start_of_chorus" => DirectiveKind::StartOfChorus,
            "eoc" | "end_of_chorus" => DirectiveKind::EndOfChorus,
            "sot" | "start_of_tab" => DirectiveKind::StartOfTab,
            "eot" | "end_of_tab" => DirectiveKind::EndOfTab,
            "sob" | "start_of_bridge" => DirectiveKind::StartOfBridge,
            "eob" | "end_of_bridge" => DirectiveKind::EndOfBridge,
            "tr" | "transpose" => DirectiveKind::Transpose,
            "np" | "new_page" => DirectiveKind::NewPage,
            "define" => DirectiveKind::Define,
            "grids" => DirectiveKind::Grids,
            "c" | "comment" => DirectiveKind::Comment,
            "instrument" => DirectiveKind::Instrument,
            "tuning" => DirectiveKind::Tuning,
            "dirs" => DirectiveKind::Dirs,
            "files" => DirectiveKind::Files,
            "version" => DirectiveKind::Version,
            "pi" | "page_image" => DirectiveKind::PageImage,
            _ => return None,
        };
        Some(kind)
    }
}

/// A classified directive line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Trimmed text after the first `:`, or `None` for the bare `{name}` form.
    pub value: Option<String>,
}

impl Directive {
    /// Classify one line of text.
    ///
    /// # Example
    /// ```
    /// use chordbook::{Directive, DirectiveKind};
    ///
    /// let d = Directive::classify("{Title: Amazing Grace}").unwrap();
    /// assert_eq!(d.kind, DirectiveKind::Title);
    /// assert_eq!(d.value_or_empty(), "Amazing Grace");
    ///
    /// assert!(Directive::classify("{chorus_please}").is_none());
    /// assert!(Directive::classify("[G]Amazing grace").is_none());
    /// ```
    pub fn classify(line: &str) -> Option<Self> {
        let inner = line.trim().strip_prefix('{')?.strip_suffix('}')?;
        let (name, value) = match inner.split_once(':') {
            Some((name, value)) => (name, Some(value.trim().to_string())),
            None => (inner, None),
        };
        let kind = DirectiveKind::from_name(&name.to_lowercase())?;
        Some(Directive { kind, value })
    }

    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}
