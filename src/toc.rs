//! # Table of Contents
//!
//! Numbers every set and song and splits the entries over as many contents
//! pages as they need.
//!
//! ## Page planning
//! - Up to [`MAX_ENTRIES_PER_PAGE`] entries fit on one page
//! - Beyond that, aim for [`IDEAL_ENTRIES_PER_PAGE`] per page:
//!   `pages_needed = ceil(entries / 40)`
//! - Numbering starts right after the contents pages; sets come first, then songs
//!
//! ## Removable sets
//! Set pages are meant to be torn out of the printed book. When the contents
//! pages plus the set pages add up to an even number, a blank song is placed
//! at the front of the book so no song is printed on the back of the last set.

use serde::Serialize;

use crate::song::Song;

pub const IDEAL_ENTRIES_PER_PAGE: usize = 40;
pub const MAX_ENTRIES_PER_PAGE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Set,
    Song,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub kind: EntryKind,
    pub title: String,
    /// `(KEY)` for songs with a known key, otherwise empty.
    pub key: String,
    pub page: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toc {
    pub pages: Vec<Vec<TocEntry>>,
}

/// Number of contents pages needed for `entries` entries.
pub fn pages_needed(entries: usize) -> usize {
    if entries > MAX_ENTRIES_PER_PAGE {
        entries.div_ceil(IDEAL_ENTRIES_PER_PAGE)
    } else {
        1
    }
}

/// Where the front matter ends: contents pages, set pages and the optional
/// blank that keeps songs off the back of the last set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentsPlan {
    /// Number of contents pages.
    pub pages: usize,
    pub leading_blank: bool,
    /// Printed page of the first song after the front matter.
    pub first_song_page: usize,
}

impl ContentsPlan {
    /// Plan the front matter for `sets` and `songs` with contents starting at
    /// `start_page`. Blank songs are ignored.
    pub fn new(sets: &[Song], songs: &[Song], start_page: usize) -> Self {
        let total = sets.iter().filter(|s| !s.blank).count()
            + songs.iter().filter(|s| !s.blank).count();
        let pages = pages_needed(total);
        let leading_blank = !sets.is_empty() && (pages + sets.len()) % 2 == 0;
        let set_pages: usize = sets.iter().map(|s| s.pages).sum();
        Self {
            pages,
            leading_blank,
            first_song_page: start_page + pages + set_pages + usize::from(leading_blank),
        }
    }
}

impl Toc {
    /// Build the contents for `sets` followed by `songs`, numbering from
    /// `start_page + pages_needed`.
    ///
    /// May insert a blank song at the front of `songs` (see module docs).
    /// Songs should already be paginated from [`ContentsPlan::first_song_page`].
    pub fn build(sets: &[Song], songs: &mut Vec<Song>, start_page: usize) -> Toc {
        let plan = ContentsPlan::new(sets, songs, start_page);
        log::debug!(
            "{} contents pages, songs from page {}",
            plan.pages,
            plan.first_song_page
        );

        let mut entries = Vec::new();
        let mut page = start_page + plan.pages;

        for set in sets {
            if !set.blank {
                entries.push(TocEntry {
                    kind: EntryKind::Set,
                    title: set.title.clone(),
                    key: String::new(),
                    page,
                });
            }
            page += set.pages;
        }

        if plan.leading_blank {
            songs.insert(0, Song::blank());
        }

        for song in songs.iter() {
            if !song.blank {
                entries.push(TocEntry {
                    kind: EntryKind::Song,
                    title: song.title.clone(),
                    key: song.key_string(),
                    page,
                });
            }
            page += song.pages;
        }

        Toc {
            pages: chunked(entries, plan.pages),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.pages.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split into `n` contiguous chunks of ceiling size, preserving order.
fn chunked<T>(items: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let size = items.len().div_ceil(n.max(1)).max(1);
    let mut chunks: Vec<Vec<T>> = Vec::with_capacity(n);
    let mut items = items.into_iter();
    for _ in 0..n.max(1) {
        let chunk: Vec<T> = items.by_ref().take(size).collect();
        chunks.push(chunk);
    }
    chunks
}
