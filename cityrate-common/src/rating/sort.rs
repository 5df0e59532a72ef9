//! Table ordering
//!
//! Sorting is stable: entries that compare equal keep the order they arrived
//! in. Descending order is the ascending comparator reversed, nothing more.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::RatingMode;
use crate::models::{Rated, VoteType};
use crate::Error;

/// Column a ratings or profile table can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortColumn {
    /// Position as received from the service
    #[default]
    Index,
    Name,
    Country,
    /// Rating or hidden jam score, depending on the [`RatingMode`]
    Score,
    Likes,
    Dislikes,
    DontKnow,
    /// The user's own vote: liked > disliked > dont_know > none
    Vote,
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" | "#" | "rank" => Ok(SortColumn::Index),
            "name" | "city" => Ok(SortColumn::Name),
            "country" => Ok(SortColumn::Country),
            "score" | "rating" => Ok(SortColumn::Score),
            "likes" => Ok(SortColumn::Likes),
            "dislikes" => Ok(SortColumn::Dislikes),
            "dont_know" | "dont-know" => Ok(SortColumn::DontKnow),
            "vote" => Ok(SortColumn::Vote),
            other => Err(Error::InvalidInput(format!("unknown sort column '{}'", other))),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortColumn::Index => "index",
            SortColumn::Name => "name",
            SortColumn::Country => "country",
            SortColumn::Score => "score",
            SortColumn::Likes => "likes",
            SortColumn::Dislikes => "dislikes",
            SortColumn::DontKnow => "dont_know",
            SortColumn::Vote => "vote",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

/// Column plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn ascending(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    /// Header-click behavior: same column flips, another column starts ascending
    pub fn toggle(self, column: SortColumn) -> Self {
        if self.column == column {
            Self::new(column, self.direction.flipped())
        } else {
            Self::ascending(column)
        }
    }
}

/// Order `items` by `spec`
///
/// `items` must be in received order; [`SortColumn::Index`] refers to that
/// order. Missing scores compare lower than any number.
pub fn sort_by<T: Rated>(items: Vec<T>, spec: SortSpec, mode: RatingMode) -> Vec<T> {
    let mut indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();

    indexed.sort_by(|(ia, a), (ib, b)| {
        let ordering = match spec.column {
            SortColumn::Index => ia.cmp(ib),
            SortColumn::Name => collate(a.name(), b.name()),
            SortColumn::Country => collate(a.country(), b.country()),
            SortColumn::Score => compare_scores(mode.score(a), mode.score(b)),
            SortColumn::Likes => a.counts().likes.cmp(&b.counts().likes),
            SortColumn::Dislikes => a.counts().dislikes.cmp(&b.counts().dislikes),
            SortColumn::DontKnow => a.counts().dont_know.cmp(&b.counts().dont_know),
            SortColumn::Vote => vote_rank(a.vote_type()).cmp(&vote_rank(b.vote_type())),
        };
        spec.direction.apply(ordering)
    });

    indexed.into_iter().map(|(_, item)| item).collect()
}

/// Locale-aware string comparison
///
/// Compares on a key with case and diacritics folded away (so "Ålesund"
/// sits among the A's and "Ёлки" among the Е's), then breaks ties on the
/// accented lowercase form and finally on the raw string.
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.chars() {
        // Й is its own letter in Cyrillic alphabets, not an accented И
        if matches!(c, 'й' | 'Й') {
            key.push('й');
            continue;
        }
        key.extend(
            std::iter::once(c)
                .nfd()
                .filter(|d| !is_combining_mark(*d))
                .flat_map(char::to_lowercase),
        );
    }
    key
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

fn vote_rank(vote: Option<VoteType>) -> u8 {
    match vote {
        Some(VoteType::Liked) => 3,
        Some(VoteType::Disliked) => 2,
        Some(VoteType::DontKnow) => 1,
        None => 0,
    }
}
