//! Rating engine
//!
//! Pure computation over raw vote counters. No I/O happens here; views fetch
//! data through the API client and hand the snapshots to these functions.
//!
//! # Formulas
//!
//! - **Rating**: `likes / (likes + dislikes)`, undefined without definitive votes
//! - **Popularity**: share of all responses (including "don't know") that
//!   were definitive votes
//! - **Hidden jam score**: `rating * (1 - popularity)`, undefined without any
//!   response at all
//!
//! A city that only collected "don't know" responses scores exactly 0 (its
//! rating term is 0), not undefined.

mod merge;
mod sort;

pub use merge::{
    aggregate_countries, classify_country, group_by_country, merge_rankings, merge_user_votes,
    profile_stats, CountryVisit, ProfileStats,
};
pub use sort::{collate, sort_by, SortColumn, SortDirection, SortSpec};

use crate::models::{City, Country, Rated, VoteCounts};

/// Minimum definitive votes for an entity to count as "popular"
pub const DEFAULT_POPULARITY_THRESHOLD: u64 = 10;

/// Which score a ratings table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RatingMode {
    /// Plain like ratio
    #[default]
    Overall,
    /// Like ratio weighted by inverse popularity
    HiddenJam,
}

impl RatingMode {
    /// The score this mode displays and sorts on
    pub fn score<T: Rated + ?Sized>(&self, item: &T) -> Option<f64> {
        match self {
            RatingMode::Overall => item.rating(),
            RatingMode::HiddenJam => item.hidden_jam_score(),
        }
    }
}

/// Like ratio among definitive votes
///
/// Returns `None` when there are no likes or dislikes at all.
pub fn compute_rating(likes: u64, dislikes: u64) -> Option<f64> {
    if likes == 0 && dislikes == 0 {
        return None;
    }
    // Summed in f64: counters come from the service and may be arbitrarily large
    let total = likes as f64 + dislikes as f64;
    Some(likes as f64 / total)
}

/// Rating weighted by inverse popularity
///
/// Returns `None` only when there are no responses of any kind.
pub fn compute_hidden_jam_score(likes: u64, dislikes: u64, dont_know: u64) -> Option<f64> {
    if likes == 0 && dislikes == 0 && dont_know == 0 {
        return None;
    }

    let total_votes = likes as f64 + dislikes as f64;
    let total_responses = total_votes + dont_know as f64;
    let popularity = total_votes / total_responses;
    let rating = compute_rating(likes, dislikes).unwrap_or(0.0);

    Some(rating * (1.0 - popularity))
}

/// Fill in missing derived scores from the counters
///
/// Scores already supplied by the service are kept as-is.
pub fn fill_derived_scores(city: &mut City) {
    if city.rating.is_none() {
        city.rating = compute_rating(city.likes, city.dislikes);
    }
    if city.hidden_jam_score.is_none() {
        city.hidden_jam_score = compute_hidden_jam_score(city.likes, city.dislikes, city.dont_know);
    }
}

/// Aggregate member cities into a country
///
/// Counters are summed first and both scores recomputed from the sums, so a
/// country is never biased by how many cities it has. The flag comes from the
/// first city.
pub fn aggregate_country<'a, I>(name: &str, cities: I) -> Country
where
    I: IntoIterator<Item = &'a City>,
{
    let mut totals = VoteCounts::default();
    let mut flag = None;
    let mut city_count = 0;

    for city in cities {
        if flag.is_none() {
            flag = Some(city.flag.clone());
        }
        totals += city.counts();
        city_count += 1;
    }

    Country {
        name: name.to_string(),
        flag: flag.unwrap_or_default(),
        city_count,
        likes: totals.likes,
        dislikes: totals.dislikes,
        dont_know: totals.dont_know,
        rating: compute_rating(totals.likes, totals.dislikes),
        hidden_jam_score: compute_hidden_jam_score(totals.likes, totals.dislikes, totals.dont_know),
    }
}

/// Keep items with at least `threshold` definitive votes
pub fn filter_by_popularity<T: Rated>(items: Vec<T>, threshold: u64) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| item.counts().votes() >= threshold)
        .collect()
}

/// Rating to show next to a city in the profile
///
/// `None` means "pending": either no rating exists yet or too few people
/// voted for it to be meaningful.
pub fn display_rating<T: Rated + ?Sized>(item: &T, threshold: u64) -> Option<f64> {
    item.rating().filter(|_| item.counts().votes() >= threshold)
}
