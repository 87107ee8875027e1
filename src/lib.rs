pub mod book;
pub mod config;
pub mod directive;
pub mod error;
pub mod formatter;
pub mod instruments;
pub mod paginate;
pub mod parser;
pub mod setlist;
pub mod song;
pub mod source;
pub mod toc;
pub mod transpose;

pub use book::{AutoTranspose, SongBook};
pub use config::{BookOptions, InstrumentConfig};
pub use directive::{Directive, DirectiveKind};
pub use error::*;
pub use formatter::{format_song, FormatOptions};
pub use instruments::{ChordChart, ChordGrid, Instrument, InstrumentRegistry};
pub use paginate::{paginate, BlankAccounting, PaginationPolicy};
pub use parser::{parse_song, ParseOptions};
pub use setlist::{parse_setlist, SetlistLine, SongReference};
pub use song::*;
pub use source::{FsSource, MemorySource, SongSource};
pub use toc::{Toc, TocEntry};
pub use transpose::{transpose_chord, transpose_note, Transposer};

use std::path::Path;

/// Convert a book outline, optionally reordered by a setlist.
/// This is the main entry point for the library.
pub fn convert_book(
    outline: &Path,
    setlist: Option<&Path>,
    source: &dyn SongSource,
    options: BookOptions,
) -> Result<SongBook, BookError> {
    let mut book = SongBook::from_outline(outline, source, options)?;
    if let Some(path) = setlist {
        let text = source.read(path)?;
        book.order_by_setlist(&text, source)?;
    }
    book.format(None);
    Ok(book)
}

/// Convert a setlist on its own; its `{book: path}` supplies the songs.
pub fn convert_setlist(
    setlist: &Path,
    source: &dyn SongSource,
    options: BookOptions,
) -> Result<SongBook, BookError> {
    let mut book = SongBook::new(options);
    book.dir = setlist.parent().map(Path::to_path_buf).unwrap_or_default();
    let text = source.read(setlist)?;
    book.order_by_setlist(&text, source)?;
    book.format(None);
    Ok(book)
}

/// Convert a single song for display on its own.
pub fn convert_song(
    path: &Path,
    source: &dyn SongSource,
    options: &BookOptions,
) -> Result<Song, BookError> {
    let registry = InstrumentRegistry::from_config(&options.instruments);
    let text = source.read(path)?;
    let parse_options = ParseOptions {
        path: Some(path.to_path_buf()),
        instrument_name: options.instrument.clone(),
        ..ParseOptions::default()
    };
    let mut song = parse_song(&text, &parse_options, &registry);
    let format_options = FormatOptions {
        instrument: options.instrument.clone(),
        stand_alone: true,
        ..FormatOptions::default()
    };
    format_song(&mut song, &format_options, &registry);
    Ok(song)
}
