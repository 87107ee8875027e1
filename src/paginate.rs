//! # Pagination
//!
//! Reorders a book so that every song with an even page count starts on an
//! even page, where it opens as a facing-page spread.
//!
//! ## Algorithm
//! One forward pass with a `waiting` queue of deferred spreads:
//!
//! ```text
//! even page            -> flush waiting, place song
//! odd page, even song  -> keep-order: blank + song
//!                         otherwise:  defer song to waiting
//! odd page, odd song   -> place song
//! end of list          -> odd page and waiting non-empty: blank, then waiting
//! ```
//!
//! Songs are never dropped or duplicated; removing the blanks from the output
//! gives back the input order except for deferred spreads.
//!
//! ## Blank accounting
//! In keep-order mode a blank is inserted in front of an odd-positioned spread.
//! Whether that blank advances the page counter is a policy
//! ([`BlankAccounting`]): `Counted` treats it as the real page it is,
//! `Uncounted` reproduces books laid out without counting it.

use serde::{Deserialize, Serialize};

use crate::song::Song;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlankAccounting {
    #[default]
    Counted,
    Uncounted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// Pad with blanks instead of deferring spreads.
    pub keep_order: bool,
    pub blank_accounting: BlankAccounting,
}

/// Arrange `songs` starting at `start_page`, inserting blank pages as needed.
///
/// # Example
/// ```
/// use chordbook::{paginate, PaginationPolicy, Song};
///
/// let songs: Vec<Song> = [2, 1].iter().map(|&pages| {
///     let mut song = Song::titled(format!("{} pages", pages));
///     song.pages = pages;
///     song
/// }).collect();
///
/// let ordered = paginate(songs, 1, PaginationPolicy::default());
/// let titles: Vec<&str> = ordered.iter().map(|s| s.title.as_str()).collect();
/// assert_eq!(titles, vec!["1 pages", "2 pages"]);
/// ```
pub fn paginate(songs: Vec<Song>, start_page: usize, policy: PaginationPolicy) -> Vec<Song> {
    let mut current_page = start_page;
    let mut ordered = Vec::with_capacity(songs.len());
    let mut waiting: Vec<Song> = Vec::new();

    for song in songs {
        if current_page % 2 == 0 {
            for deferred in waiting.drain(..) {
                current_page += deferred.pages;
                ordered.push(deferred);
            }
            current_page += song.pages;
            ordered.push(song);
        } else if song.pages % 2 == 0 {
            if policy.keep_order {
                log::debug!("Blank page {} before \"{}\"", current_page, song.title);
                ordered.push(Song::blank());
                if policy.blank_accounting == BlankAccounting::Counted {
                    current_page += 1;
                }
                current_page += song.pages;
                ordered.push(song);
            } else {
                waiting.push(song);
            }
        } else {
            current_page += song.pages;
            ordered.push(song);
        }
    }

    if current_page % 2 == 1 && !waiting.is_empty() {
        log::debug!("Blank page {} before {} deferred songs", current_page, waiting.len());
        ordered.push(Song::blank());
    }
    ordered.extend(waiting);
    ordered
}

/// First page of each song when laid out from `start_page`.
pub fn first_pages(songs: &[Song], start_page: usize) -> Vec<usize> {
    let mut page = start_page;
    songs
        .iter()
        .map(|song| {
            let first = page;
            page += song.pages;
            first
        })
        .collect()
}
