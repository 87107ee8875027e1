//! # Transposition
//!
//! Pitch-class arithmetic over the 12-tone circle, applied to chord names.
//!
//! ## Canonical spelling
//! Every pitch class has exactly one display spelling:
//!
//! ```text
//! 0=C  1=C#  2=D  3=Eb  4=E  5=F  6=F#  7=G  8=G#  9=A  10=Bb  11=B
//! ```
//!
//! Input spelling is never echoed back. `Db` transposed by 0 comes out as
//! `C#`, which keeps repeated transposition idempotent.
//!
//! ## Chord transposition
//! Only root tokens (a letter `A`-`G` with an optional `#` or `b`) are rewritten,
//! wherever they occur in the chord, including a bass note after a slash:
//!
//! ```text
//! Dmaj7/F#  +2  ->  Emaj7/G#
//! Bbm7      -1  ->  Am7
//! riff       5  ->  riff   (no root tokens)
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

static ROOT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-G][#b]?").unwrap());

static CHORD_PARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-G][#b]?)([^/]*)(?:/([A-G][#b]?))?$").unwrap());

/// Display spelling for each pitch class.
const CANONICAL_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// A pitch class on the 12-tone circle (C = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Look up a note name (`C`, `F#`, `Bb`, ...). Returns `None` for anything
    /// outside the note grammar.
    pub fn from_name(name: &str) -> Option<Self> {
        let index = match name {
            "C" | "B#" => 0,
            "C#" | "Db" => 1,
            "D" => 2,
            "D#" | "Eb" => 3,
            "E" | "Fb" => 4,
            "F" | "E#" => 5,
            "F#" | "Gb" => 6,
            "G" => 7,
            "G#" | "Ab" => 8,
            "A" => 9,
            "A#" | "Bb" => 10,
            "B" | "Cb" => 11,
            _ => return None,
        };
        Some(PitchClass(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Canonical display spelling.
    pub fn name(self) -> &'static str {
        CANONICAL_NAMES[self.0 as usize]
    }

    /// Move by `offset` semitones, wrapping mod 12.
    pub fn shift(self, offset: i32) -> Self {
        PitchClass((self.0 as i32 + offset).rem_euclid(12) as u8)
    }

    /// Semitones to move up from `self` to reach `other`, in `0..12`.
    pub fn interval_to(self, other: PitchClass) -> i32 {
        (other.0 as i32 - self.0 as i32).rem_euclid(12)
    }
}

/// A musical key: tonic plus major/minor quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Key {
    pub tonic: PitchClass,
    pub minor: bool,
}

impl Key {
    /// Parse a key string such as `G`, `F#m`, `Bbmin` or `Ebmaj`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let root = ROOT_TOKEN.find(s).filter(|m| m.start() == 0)?;
        let tonic = PitchClass::from_name(root.as_str())?;
        let quality = &s[root.end()..];
        let minor = quality.starts_with("min")
            || (quality.starts_with('m') && !quality.starts_with("maj"));
        Some(Key { tonic, minor })
    }
}

/// Signed semitone interval from one key to another, reported in `-5..=6`.
///
/// Returns `None` when either key cannot be parsed.
pub fn key_interval(from: &str, to: &str) -> Option<i32> {
    let from = Key::parse(from)?;
    let to = Key::parse(to)?;
    let up = from.tonic.interval_to(to.tonic);
    Some(if up > 6 { up - 12 } else { up })
}

/// Transposes chord names by a fixed number of semitones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transposer {
    offset: i32,
}

impl Transposer {
    pub fn new(offset: i32) -> Self {
        Self {
            offset: offset.rem_euclid(12),
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn is_identity(&self) -> bool {
        self.offset == 0
    }

    pub fn transpose_note(&self, note: &str) -> String {
        transpose_note(note, self.offset)
    }

    pub fn transpose_chord(&self, chord: &str) -> String {
        transpose_chord(chord, self.offset)
    }
}

/// Transpose a single note name. Unknown input is returned unchanged.
///
/// # Example
/// ```
/// use chordbook::transpose_note;
///
/// assert_eq!(transpose_note("A", 3), "C");
/// assert_eq!(transpose_note("Db", 0), "C#");
/// assert_eq!(transpose_note("H", 2), "H");
/// ```
pub fn transpose_note(note: &str, offset: i32) -> String {
    match PitchClass::from_name(note) {
        Some(pc) => pc.shift(offset).name().to_string(),
        None => note.to_string(),
    }
}

/// Transpose every root token in a chord string, leaving quality suffixes alone.
///
/// # Example
/// ```
/// use chordbook::transpose_chord;
///
/// assert_eq!(transpose_chord("Dmaj7/F#", 2), "Emaj7/G#");
/// assert_eq!(transpose_chord("Asus4", -2), "Gsus4");
/// ```
pub fn transpose_chord(chord: &str, offset: i32) -> String {
    ROOT_TOKEN
        .replace_all(chord, |caps: &Captures| transpose_note(&caps[0], offset))
        .into_owned()
}

/// Normalise a chord name for chart lookup and the "chords used" list.
///
/// Roots are canonically spelled, whitespace is removed and common quality
/// aliases are folded (`min` -> `m`, `M7` -> `maj7`, `°` -> `dim`, ...).
/// Anything that does not look like a chord is returned trimmed.
pub fn normalize_chord_name(chord: &str) -> String {
    let compact: String = chord.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(caps) = CHORD_PARTS.captures(&compact) else {
        return compact;
    };

    let root = transpose_note(&caps[1], 0);
    let quality = match &caps[2] {
        "maj" | "M" => "",
        "min" | "-" => "m",
        "M7" | "Δ" | "Δ7" => "maj7",
        "min7" | "-7" => "m7",
        "min9" => "m9",
        "M9" => "maj9",
        "°" | "o" => "dim",
        "+" => "aug",
        other => other,
    };

    match caps.get(3) {
        Some(bass) => format!("{}{}/{}", root, quality, transpose_note(bass.as_str(), 0)),
        None => format!("{}{}", root, quality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_note_wraps() {
        assert_eq!(transpose_note("B", 1), "C");
        assert_eq!(transpose_note("C", -1), "B");
        assert_eq!(transpose_note("G", 5), "C");
        assert_eq!(transpose_note("E", 24), "E");
    }

    #[test]
    fn test_transpose_note_uses_canonical_spelling() {
        assert_eq!(transpose_note("Gb", 0), "F#");
        assert_eq!(transpose_note("A#", 0), "Bb");
        assert_eq!(transpose_note("D#", 0), "Eb");
        assert_eq!(transpose_note("Ab", 0), "G#");
        assert_eq!(transpose_note("Cb", 0), "B");
    }

    #[test]
    fn test_transpose_note_unknown_passes_through() {
        assert_eq!(transpose_note("X", 3), "X");
        assert_eq!(transpose_note("", 3), "");
        assert_eq!(transpose_note("c", 3), "c");
    }

    #[test]
    fn test_transpose_chord_keeps_suffixes() {
        assert_eq!(transpose_chord("Dmaj7/F#", 2), "Emaj7/G#");
        assert_eq!(transpose_chord("Csus4", 7), "Gsus4");
        assert_eq!(transpose_chord("F#m7b5", 1), "Gm7b5");
        assert_eq!(transpose_chord("Bbm", 2), "Cm");
        assert_eq!(transpose_chord("Cadd9", 2), "Dadd9");
        assert_eq!(transpose_chord("riff", 4), "riff");
    }

    #[test]
    fn test_transpose_chord_by_zero_normalises() {
        assert_eq!(transpose_chord("Db/Gb", 0), "C#/F#");
        assert_eq!(transpose_chord("G", 0), "G");
    }

    #[test]
    fn test_transposer_offset_is_reduced() {
        assert_eq!(Transposer::new(14).offset(), 2);
        assert_eq!(Transposer::new(-1).offset(), 11);
        assert!(Transposer::new(12).is_identity());
        assert_eq!(Transposer::new(-2).transpose_chord("A7"), "G7");
    }

    #[test]
    fn test_key_parse() {
        let g = Key::parse("G").unwrap();
        assert_eq!(g.tonic.name(), "G");
        assert!(!g.minor);

        let fsm = Key::parse("F#m").unwrap();
        assert_eq!(fsm.tonic.name(), "F#");
        assert!(fsm.minor);

        assert!(!Key::parse("Ebmaj").unwrap().minor);
        assert!(Key::parse("Amin").unwrap().minor);
        assert!(Key::parse("minor").is_none());
    }

    #[test]
    fn test_key_interval_is_signed() {
        assert_eq!(key_interval("C", "D"), Some(2));
        assert_eq!(key_interval("C", "Bb"), Some(-2));
        assert_eq!(key_interval("G", "C#"), Some(6));
        assert_eq!(key_interval("Am", "Bm"), Some(2));
        assert_eq!(key_interval("C", "?"), None);
    }

    #[test]
    fn test_normalize_chord_name() {
        assert_eq!(normalize_chord_name("Amin"), "Am");
        assert_eq!(normalize_chord_name("CM7"), "Cmaj7");
        assert_eq!(normalize_chord_name(" Db "), "C#");
        assert_eq!(normalize_chord_name("Gb/Bb"), "F#/Bb");
        assert_eq!(normalize_chord_name("Bdim"), "Bdim");
        assert_eq!(normalize_chord_name("B°"), "Bdim");
        assert_eq!(normalize_chord_name("(G)"), "(G)");
    }
}
