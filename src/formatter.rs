//! # Song Formatter
//!
//! Second pass over a parsed song: resolves the final transposition, rewrites
//! chord markers, collects the chords used and turns inline key changes into
//! modulation headings.
//!
//! ## Pipeline
//! 1. Resolve the offset: explicit override, else the song's own `transpose`
//! 2. Recompute the display key from the original key
//! 3. Walk `body` into `content`:
//!    - every chord is transposed (unless the offset is zero, which passes
//!      chords through as written), normalised and recorded in `chords_used`
//!    - every `KeyChange` becomes a `Modulation` with the interval from the
//!      original key
//! 4. Recount pages from the page breaks
//! 5. Look up displayable chord diagrams for the active instrument
//! 6. Build the display title, e.g. `Amazing Grace (A)`
//!
//! Formatting is repeatable: it always starts again from `body`, so a song can
//! be formatted once per instrument or transposition.

use crate::instruments::{displayable_grids, InstrumentRegistry};
use crate::song::{GridPlacement, Inline, Line, Segment, Song};
use crate::transpose::{key_interval, normalize_chord_name, Key, Transposer};

/// Maximum chord diagrams per page before they move to their own page.
pub const GRIDS_PER_PAGE: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Overrides the song's own transposition.
    pub transpose: Option<i32>,
    /// Instrument whose charts supply chord diagrams; falls back to the song's.
    pub instrument: Option<String>,
    /// Formatting a song on its own rather than as part of a book.
    pub stand_alone: bool,
}

pub fn format_song(song: &mut Song, options: &FormatOptions, registry: &InstrumentRegistry) {
    let offset = options.transpose.unwrap_or(song.transpose);
    song.set_transpose(offset);
    let transposer = Transposer::new(offset);

    let mut chords_used: Vec<String> = Vec::new();
    let mut content = Vec::with_capacity(song.body.len());

    for segment in &song.body {
        let formatted = match segment {
            Segment::Line(line) => Segment::Line(format_line(line, &transposer, &mut chords_used)),
            Segment::KeyChange(key) => match &song.original_key {
                Some(original) => modulation(original, key, &transposer),
                None => continue,
            },
            other => other.clone(),
        };
        content.push(formatted);
    }

    song.pages = 1 + content
        .iter()
        .filter(|s| matches!(s, Segment::PageBreak))
        .count();

    let instrument = options
        .instrument
        .clone()
        .or_else(|| song.instrument_name.clone());

    song.grids = match &instrument {
        Some(name) => displayable_grids(&chords_used, name, &song.local_instruments, registry),
        None => Vec::new(),
    };
    song.grid_placement = if song.grids.len() > GRIDS_PER_PAGE * song.pages {
        content.push(Segment::PageBreak);
        song.pages += 1;
        GridPlacement::ExtraPage
    } else {
        GridPlacement::Margin
    };

    let mut title = match song.key_string().as_str() {
        "" => song.title.clone(),
        key => format!("{} {}", song.title, key),
    };
    if options.stand_alone {
        if let Some(name) = &instrument {
            title = format!("{} ({})", title, name);
        }
    }

    song.formatted_title = title;
    song.chords_used = chords_used;
    song.content = content;
}

fn format_line(line: &Line, transposer: &Transposer, chords_used: &mut Vec<String>) -> Line {
    let inlines = line
        .inlines
        .iter()
        .map(|inline| match inline {
            Inline::Chord(chord) => {
                let chord = if transposer.is_identity() {
                    chord.clone()
                } else {
                    transposer.transpose_chord(chord)
                };
                let normal = normalize_chord_name(&chord);
                if !chords_used.contains(&normal) {
                    chords_used.push(normal);
                }
                Inline::Chord(chord)
            }
            Inline::Text(text) => Inline::Text(text.clone()),
        })
        .collect();

    Line {
        inlines,
        ..line.clone()
    }
}

/// The song's transposer still applies after a key change: chords written in
/// the new key move by the same offset, so only the display key is shifted here.
fn modulation(original: &str, key: &str, transposer: &Transposer) -> Segment {
    let display = if transposer.is_identity() {
        key.to_string()
    } else {
        transposer.transpose_chord(key)
    };
    Segment::Modulation {
        key: display,
        semitones: key_interval(original, key).unwrap_or(0),
        minor: Key::parse(key).map(|k| k.minor).unwrap_or(false),
    }
}
