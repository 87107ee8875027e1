//! # Instrument Registry
//!
//! Chord-grid charts keyed by instrument name.
//!
//! A registry is an explicit value passed by reference into the parser, the
//! formatter and the book loader. There is no global chart state: the book owns
//! a registry seeded from configuration and `{instrument}`/`{define}` lines in the
//! book outline, and each song owns a second, song-scoped registry filled from
//! its own `{instrument}`/`{define}` lines.
//!
//! ## Define lines
//! ```text
//! {define: G 0 2 3 2}
//! {define: Bb base-fret 1 frets 3 2 1 1}
//! ```
//! The first word is the chord name (normalised for lookup); the rest is kept
//! verbatim as the grid definition for the renderer.
//!
//! ## Diagram lookup
//! [`displayable_grids`] decides which of a song's chords can be drawn: the
//! song-scoped chart wins, then the global chart. Chords with no grid anywhere
//! are silently left out.

use serde::Serialize;

use crate::config::InstrumentConfig;
use crate::directive::{Directive, DirectiveKind};
use crate::transpose::normalize_chord_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordGrid {
    pub name: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChordChart {
    grids: Vec<ChordGrid>,
}

impl ChordChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid from a `{define: ...}` line or its bare value.
    /// Returns `false` when the line names no chord.
    pub fn add_grid(&mut self, line: &str) -> bool {
        let value = match Directive::classify(line) {
            Some(d) if d.kind == DirectiveKind::Define => d.value.unwrap_or_default(),
            _ => line.trim().to_string(),
        };
        let mut parts = value.splitn(2, char::is_whitespace);
        let name = match parts.next() {
            Some(name) if !name.is_empty() => normalize_chord_name(name),
            _ => return false,
        };
        let definition = parts.next().unwrap_or("").trim().to_string();
        self.insert(ChordGrid { name, definition });
        true
    }

    /// Insert a grid, replacing any earlier grid of the same name.
    pub fn insert(&mut self, grid: ChordGrid) {
        match self.grids.iter_mut().find(|g| g.name == grid.name) {
            Some(existing) => *existing = grid,
            None => self.grids.push(grid),
        }
    }

    pub fn grid(&self, chord: &str) -> Option<&ChordGrid> {
        let name = normalize_chord_name(chord);
        self.grids.iter().find(|g| g.name == name)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub name: String,
    pub tuning: Option<String>,
    pub chart: ChordChart,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tuning: None,
            chart: ChordChart::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentRegistry {
    instruments: Vec<Instrument>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured instruments.
    pub fn from_config(configs: &[InstrumentConfig]) -> Self {
        let mut registry = Self::new();
        for config in configs {
            let instrument = registry.get_or_insert(&config.name);
            instrument.tuning = config.tuning.clone();
            for line in &config.chords {
                if !instrument.chart.add_grid(line) {
                    log::warn!("Ignoring empty chord definition for {}", config.name);
                }
            }
        }
        registry
    }

    /// Add an instrument, replacing one with the same name.
    pub fn add(&mut self, instrument: Instrument) {
        match self.position(&instrument.name) {
            Some(i) => self.instruments[i] = instrument,
            None => self.instruments.push(instrument),
        }
    }

    /// Names compare case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Instrument> {
        self.position(name).map(|i| &self.instruments[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Instrument> {
        let index = self.position(name)?;
        Some(&mut self.instruments[index])
    }

    pub fn get_or_insert(&mut self, name: &str) -> &mut Instrument {
        let index = match self.position(name) {
            Some(i) => i,
            None => {
                self.instruments.push(Instrument::new(name));
                self.instruments.len() - 1
            }
        };
        &mut self.instruments[index]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(|i| i.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.instruments
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name))
    }
}

/// Grids that can be displayed for `chords`, in the same order.
pub fn displayable_grids(
    chords: &[String],
    instrument: &str,
    local: &InstrumentRegistry,
    global: &InstrumentRegistry,
) -> Vec<ChordGrid> {
    let local_chart = local.get(instrument).map(|i| &i.chart);
    let global_chart = global.get(instrument).map(|i| &i.chart);

    chords
        .iter()
        .filter_map(|chord| {
            local_chart
                .and_then(|c| c.grid(chord))
                .or_else(|| global_chart.and_then(|c| c.grid(chord)))
                .cloned()
        })
        .collect()
}
