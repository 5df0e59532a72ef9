//! Joins, grouping and visit statistics for the profile view

use std::collections::{BTreeMap, HashMap};

use super::{aggregate_country, sort::collate};
use crate::models::{City, Country, Vote, VoteType};

/// Attach the user's vote to every city it concerns
///
/// Left join on city id. Cities without a matching vote keep `vote_type`
/// unset. If the vote list repeats a city, the later entry wins.
pub fn merge_user_votes(cities: Vec<City>, votes: &[Vote]) -> Vec<City> {
    let by_city: HashMap<&str, VoteType> = votes
        .iter()
        .map(|v| (v.city_id.as_str(), v.vote_type))
        .collect();

    cities
        .into_iter()
        .map(|mut city| {
            city.vote_type = by_city.get(city.city_id.as_str()).copied();
            city
        })
        .collect()
}

/// Copy ranking rows onto the full city list
///
/// Matched cities take the rating and all three counters from their ranking
/// row. Unmatched cities end up with no rating and zeroed counters.
pub fn merge_rankings(cities: Vec<City>, rankings: &[City]) -> Vec<City> {
    let by_city: HashMap<&str, &City> = rankings
        .iter()
        .map(|r| (r.city_id.as_str(), r))
        .collect();

    cities
        .into_iter()
        .map(|mut city| {
            match by_city.get(city.city_id.as_str()) {
                Some(ranked) => {
                    city.rating = ranked.rating;
                    city.likes = ranked.likes;
                    city.dislikes = ranked.dislikes;
                    city.dont_know = ranked.dont_know;
                }
                None => {
                    city.rating = None;
                    city.likes = 0;
                    city.dislikes = 0;
                    city.dont_know = 0;
                }
            }
            city
        })
        .collect()
}

/// Group cities by country name
///
/// Countries iterate in lexicographic order; the cities of each country are
/// sorted by name.
pub fn group_by_country(cities: Vec<City>) -> BTreeMap<String, Vec<City>> {
    let mut grouped: BTreeMap<String, Vec<City>> = BTreeMap::new();
    for city in cities {
        grouped.entry(city.country.clone()).or_default().push(city);
    }
    for members in grouped.values_mut() {
        members.sort_by(|a, b| collate(&a.name, &b.name));
    }
    grouped
}

/// One aggregated [`Country`] per distinct country, in name order
pub fn aggregate_countries(cities: &[City]) -> Vec<Country> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<&City>> = HashMap::new();

    for city in cities {
        let entry = members.entry(city.country.as_str()).or_insert_with(|| {
            order.push(city.country.as_str());
            Vec::new()
        });
        entry.push(city);
    }

    order.sort_by(|a, b| collate(a, b));
    order
        .into_iter()
        .map(|name| aggregate_country(name, members[name].iter().copied()))
        .collect()
}

/// How far the user has covered a country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryVisit {
    /// At least one city liked or disliked
    Visited,
    /// Every city marked "don't know"
    AllDontKnow,
    /// No city has any vote
    NoVotes,
    /// Some "don't know", some unvoted, none visited
    Partial,
}

impl CountryVisit {
    /// Whether the bulk "not visited" action makes sense for this country
    pub fn allows_mark_not_visited(&self) -> bool {
        matches!(self, CountryVisit::NoVotes | CountryVisit::Partial)
    }
}

pub fn classify_country(cities: &[City]) -> CountryVisit {
    if cities.iter().any(City::is_visited) {
        CountryVisit::Visited
    } else if cities.iter().all(|c| c.vote_type.is_none()) {
        CountryVisit::NoVotes
    } else if cities.iter().all(|c| c.vote_type == Some(VoteType::DontKnow)) {
        CountryVisit::AllDontKnow
    } else {
        CountryVisit::Partial
    }
}

/// Visit counters shown above the profile table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub visited_cities: usize,
    pub total_cities: usize,
    pub visited_countries: usize,
    pub total_countries: usize,
}

pub fn profile_stats(grouped: &BTreeMap<String, Vec<City>>) -> ProfileStats {
    let mut stats = ProfileStats {
        total_countries: grouped.len(),
        ..Default::default()
    };

    for members in grouped.values() {
        let visited = members.iter().filter(|c| c.is_visited()).count();
        stats.visited_cities += visited;
        stats.total_cities += members.len();
        if visited > 0 {
            stats.visited_countries += 1;
        }
    }

    stats
}
