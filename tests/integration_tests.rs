//! Integration tests for the songbook converter
//!
//! Tests full pipelines from song, outline and setlist texts to a formatted,
//! paginated book, using the in-memory source.

use std::path::Path;

use chordbook::toc::EntryKind;
use chordbook::{
    convert_book, convert_setlist, convert_song, paginate, parse_song, transpose_chord,
    BookError, BookOptions, InstrumentRegistry, MemorySource, PaginationPolicy, ParseOptions,
    Segment, Song, SongBook, Toc,
};

fn session() -> MemorySource {
    MemorySource::new()
        .with_file(
            "book/outline.txt",
            "{title: Tuesday}\nsongs/grace.cho\nsongs/jolene.cho\nsongs/long.cho\n",
        )
        .with_file(
            "book/songs/grace.cho",
            "{title: Amazing Grace (Traditional)}\n{key: G}\n[G]Amazing [C]grace",
        )
        .with_file("book/songs/jolene.cho", "{title: Jolene}\n{key: C#m}\n[C#m]Jolene")
        .with_file("book/songs/long.cho", "{title: Long Song}\nverse\n{np}\nverse")
        .with_file("book/gig.md", "# Set 1\n## amazing grace +2\n## long\n# Set 2\n## jolene\n")
        .with_file("book/friday.md", "{book: outline.txt}\n{title: Friday}\n# Only\n## jolene")
}

#[test]
fn test_title_directive_is_not_content() {
    let song = parse_song(
        "{title: Amazing Grace}",
        &ParseOptions::default(),
        &InstrumentRegistry::new(),
    );
    assert_eq!(song.title, "Amazing Grace");
    assert!(song.body.is_empty());
}

#[test]
fn test_transpose_chord_keeps_quality() {
    assert_eq!(transpose_chord("Dmaj7/F#", 2), "Emaj7/G#");
    assert_eq!(transpose_chord("Asus4", -2), "Gsus4");
}

#[test]
fn test_pagination_fixture() {
    let songs: Vec<Song> = [1, 2, 1, 2]
        .iter()
        .enumerate()
        .map(|(i, &pages)| {
            let mut song = Song::titled(format!("song{}", i + 1));
            song.pages = pages;
            song
        })
        .collect();

    let ordered = paginate(songs, 1, PaginationPolicy::default());
    let mut page = 1;
    let mut placed = Vec::new();
    for song in &ordered {
        placed.push((if song.blank { "-" } else { song.title.as_str() }, page));
        page += song.pages;
    }
    assert_eq!(
        placed,
        vec![("song1", 1), ("song2", 2), ("song3", 4), ("-", 5), ("song4", 6)]
    );
}

#[test]
fn test_toc_entry_count_matches_books_of_any_size() {
    for count in [0, 1, 50, 51, 99, 120] {
        let sets = vec![Song::titled("Set A"), Song::titled("Set B")];
        let mut songs: Vec<Song> = (0..count).map(|i| Song::titled(format!("S{}", i))).collect();
        songs.push(Song::blank());
        let toc = Toc::build(&sets, &mut songs, 2);
        assert_eq!(toc.len(), count + 2, "for {} songs", count);
    }
}

#[test]
fn test_convert_book_with_setlist() {
    let source = session();
    let book = convert_book(
        Path::new("book/outline.txt"),
        Some(Path::new("book/gig.md")),
        &source,
        BookOptions::default(),
    )
    .unwrap();

    assert_eq!(book.title(), "Tuesday");
    let titles: Vec<&str> = book.songs.iter().map(|s| s.formatted_title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Amazing Grace (Traditional) {Start of Set 1} (A)",
            "Long Song {End of Set 1}",
            "Jolene {Start of Set 2} {End of Set 2} (C#m)",
        ]
    );
    assert_eq!(book.songs[0].chords_used, vec!["A", "D"]);

    let toc = book.contents.as_ref().unwrap();
    let entries: Vec<(EntryKind, usize)> = toc.entries().map(|e| (e.kind, e.page)).collect();
    assert_eq!(
        entries,
        vec![
            (EntryKind::Set, 3),
            (EntryKind::Set, 4),
            (EntryKind::Song, 5),
            (EntryKind::Song, 6),
            (EntryKind::Song, 8),
        ]
    );
    assert_eq!(
        book.sets[0].content,
        vec![
            Segment::Heading("amazing grace (in A)".to_string()),
            Segment::Heading("long".to_string()),
        ]
    );
}

#[test]
fn test_setlist_clones_are_independent() {
    let source = session();
    let mut book =
        SongBook::from_outline(Path::new("book/outline.txt"), &source, BookOptions::default())
            .unwrap();
    book.order_by_setlist("# A\n## amazing grace\nOpen.\n# B\n## amazing grace +5\n", &source)
        .unwrap();

    assert_eq!(book.songs.len(), 2);
    assert_eq!(book.songs[0].key.as_deref(), Some("G"));
    assert_eq!(book.songs[1].key.as_deref(), Some("C"));

    book.songs[1].notes.push("Louder.".to_string());
    assert_eq!(book.songs[0].notes, vec!["Open."]);
    assert_eq!(book.songs[1].notes, vec!["Louder."]);
}

#[test]
fn test_convert_setlist_loads_its_book() {
    let book =
        convert_setlist(Path::new("book/friday.md"), &session(), BookOptions::default()).unwrap();
    assert_eq!(book.title(), "Friday");
    assert_eq!(book.sets.len(), 1);
    let real: Vec<&Song> = book.songs.iter().filter(|s| !s.blank).collect();
    assert_eq!(real.len(), 1);
    assert_eq!(real[0].title, "Jolene {Start of Only} {End of Only}");
}

#[test]
fn test_keep_order_option_from_yaml() {
    let source = MemorySource::new()
        .with_file("outline.txt", "long.cho\nshort.cho")
        .with_file("long.cho", "{title: Long}\na\n{np}\nb")
        .with_file("short.cho", "{title: Short}");

    let book = convert_book(Path::new("outline.txt"), None, &source, BookOptions::default()).unwrap();
    let titles: Vec<&str> = book.songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Short", "Long"]);

    let options = BookOptions::from_yaml("keep-order: true").unwrap();
    let book = convert_book(Path::new("outline.txt"), None, &source, options).unwrap();
    let titles: Vec<&str> = book.songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["", "Long", "Short"]);
    assert!(book.songs[0].blank);
}

#[test]
fn test_convert_song_with_configured_instrument() {
    let options = BookOptions::from_yaml(
        "instrument: Ukulele\ninstruments:\n  - name: Ukulele\n    tuning: GCEA\n    chords:\n      - C 0 0 0 3\n",
    )
    .unwrap();
    let source = MemorySource::new().with_file("hey.cho", "{title: Hey}\n[C]hey [F]ho");

    let song = convert_song(Path::new("hey.cho"), &source, &options).unwrap();
    assert_eq!(song.formatted_title, "Hey (Ukulele)");
    assert_eq!(song.chords_used, vec!["C", "F"]);
    let grids: Vec<&str> = song.grids.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(grids, vec!["C"]);
}

#[test]
fn test_missing_input_is_unavailable() {
    let result = convert_book(
        Path::new("nowhere/outline.txt"),
        None,
        &MemorySource::new(),
        BookOptions::default(),
    );
    match result {
        Err(BookError::InputUnavailable { path, .. }) => assert_eq!(path, "nowhere/outline.txt"),
        other => panic!("expected InputUnavailable, got {:?}", other.map(|b| b.songs.len())),
    }
}

#[test]
fn test_empty_book_is_well_formed() {
    let source = MemorySource::new().with_file("outline.txt", "# nothing yet\n");
    let book = convert_book(Path::new("outline.txt"), None, &source, BookOptions::default()).unwrap();
    assert!(book.songs.is_empty());
    let toc = book.contents.as_ref().unwrap();
    assert!(toc.is_empty());
    assert_eq!(toc.pages.len(), 1);
}

fn mixed_book(count: usize, sets: usize, keep_order: bool) -> SongBook {
    let mut book = SongBook::new(BookOptions {
        keep_order,
        ..BookOptions::default()
    });
    for i in 0..count {
        let text = match i % 5 {
            1 => format!("{{title: Song {}}}\na\n{{np}}\nb", i),
            3 => format!("{{title: Song {}}}\na\n{{np}}\nb\n{{np}}\nc\n{{np}}\nd", i),
            _ => format!("{{title: Song {}}}\na", i),
        };
        book.add_song_from_text(&text, Path::new("song.cho"), 0);
    }
    for i in 0..sets {
        book.sets.push(Song::titled(format!("Set {}", i + 1)));
    }
    book
}

#[test]
fn test_listed_spreads_start_on_even_pages() {
    for count in [0, 1, 2, 10, 49, 50, 51, 79, 80, 81, 130] {
        for sets in [0, 1, 2, 3] {
            for keep_order in [false, true] {
                let mut book = mixed_book(count, sets, keep_order);
                book.format(None);

                let toc = book.contents.as_ref().unwrap();
                assert_eq!(toc.len(), count + sets);
                for entry in toc.entries().filter(|e| e.kind == EntryKind::Song) {
                    let song = book.songs.iter().find(|s| s.title == entry.title).unwrap();
                    if song.pages % 2 == 0 {
                        assert_eq!(
                            entry.page % 2,
                            0,
                            "{} ({} pages) listed at page {} with {} songs, {} sets, keep_order={}",
                            entry.title,
                            song.pages,
                            entry.page,
                            count,
                            sets,
                            keep_order
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_setlist_note_before_first_song_belongs_to_set() {
    let source = session();
    let mut book =
        SongBook::from_outline(Path::new("book/outline.txt"), &source, BookOptions::default())
            .unwrap();
    book.order_by_setlist("# One\n## grace\n# Two\nStart at 9pm\n## jolene", &source)
        .unwrap();

    assert!(book.songs.iter().all(|s| s.notes.is_empty()));
    assert_eq!(
        book.sets[1].body,
        vec![
            Segment::Line(chordbook::Line::plain("Start at 9pm")),
            Segment::Heading("jolene (in C#m)".to_string()),
        ]
    );
}

#[test]
fn test_setlist_reference_with_two_offsets_plays_in_first() {
    let source = session();
    let mut book =
        SongBook::from_outline(Path::new("book/outline.txt"), &source, BookOptions::default())
            .unwrap();
    book.order_by_setlist("# Gig\n## amazing grace +2 +5\n## jolene {transpose: 0 3}", &source)
        .unwrap();

    assert_eq!(book.songs[0].transpose, 2);
    assert_eq!(book.songs[0].key.as_deref(), Some("A"));
    assert_eq!(book.songs[1].transpose, 0);
    assert_eq!(book.songs[1].key.as_deref(), Some("C#m"));
    assert_eq!(
        book.sets[0].body,
        vec![
            Segment::Heading("amazing grace (in A)".to_string()),
            Segment::Heading("jolene (in C#m)".to_string()),
        ]
    );
}
