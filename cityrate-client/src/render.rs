//! Plain-text rendering of the views for the terminal

use cityrate_common::rating::{display_rating, CountryVisit, ProfileStats};
use cityrate_common::{RatingMode, Rated, VoteType};
use unicode_normalization::char::is_combining_mark;

use crate::views::{CountrySection, RatingsTable, VotingQueue};

/// Shown in place of an undefined score
pub const NO_SCORE: &str = "-";

/// Shown in the profile when a rating is missing or based on too few votes
pub const PENDING: &str = "pending";

/// Score as a percentage with one decimal
pub fn format_percent(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.1}%", s * 100.0),
        None => NO_SCORE.to_string(),
    }
}

pub fn vote_label(vote: Option<VoteType>) -> &'static str {
    match vote {
        Some(VoteType::Liked) => "liked",
        Some(VoteType::Disliked) => "disliked",
        Some(VoteType::DontKnow) => "don't know",
        None => "no vote",
    }
}

/// Terminal columns taken by one character
fn char_width(c: char) -> usize {
    match c as u32 {
        // Zero width joiner, variation selectors
        0x200B..=0x200F | 0xFE00..=0xFE0F => 0,
        _ if is_combining_mark(c) => 0,
        // Regional indicators: a pair forms one two-column flag
        0x1F1E6..=0x1F1FF => 1,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}

/// Terminal columns taken by `s`
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Left-align `s` in `width` terminal columns
///
/// `format!` pads by char count, which misaligns flags and wide scripts.
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

fn display_name<T: Rated>(flag: &str, item: &T) -> String {
    if flag.is_empty() {
        item.name().to_string()
    } else {
        format!("{} {}", flag, item.name())
    }
}

fn score_header(mode: RatingMode) -> &'static str {
    match mode {
        RatingMode::Overall => "Rating",
        RatingMode::HiddenJam => "Hidden jam",
    }
}

/// Ratings table: position, name, country, score, likes, dislikes, don't know
pub fn render_ratings(table: &RatingsTable, mode: RatingMode) -> String {
    if table.is_empty() {
        return "No cities to show\n".to_string();
    }

    let mut out = String::new();
    match table {
        RatingsTable::Cities(rows) => {
            out.push_str(&format!(
                "{:>4}  {:<32} {:<20} {:>10} {:>6} {:>8} {:>10}\n",
                "#", "City", "Country", score_header(mode), "Likes", "Dislikes", "Don't know"
            ));
            for (i, city) in rows.iter().enumerate() {
                out.push_str(&format!(
                    "{:>4}  {} {} {:>10} {:>6} {:>8} {:>10}\n",
                    i + 1,
                    pad(&display_name(&city.flag, city), 32),
                    pad(&city.country, 20),
                    format_percent(mode.score(city)),
                    city.likes,
                    city.dislikes,
                    city.dont_know
                ));
            }
        }
        RatingsTable::Countries(rows) => {
            out.push_str(&format!(
                "{:>4}  {:<32} {:>6} {:>10} {:>6} {:>8} {:>10}\n",
                "#", "Country", "Cities", score_header(mode), "Likes", "Dislikes", "Don't know"
            ));
            for (i, country) in rows.iter().enumerate() {
                out.push_str(&format!(
                    "{:>4}  {} {:>6} {:>10} {:>6} {:>8} {:>10}\n",
                    i + 1,
                    pad(&display_name(&country.flag, country), 32),
                    country.city_count,
                    format_percent(mode.score(country)),
                    country.likes,
                    country.dislikes,
                    country.dont_know
                ));
            }
        }
    }
    out
}

fn visit_label(visit: CountryVisit) -> &'static str {
    match visit {
        CountryVisit::Visited => "visited",
        CountryVisit::AllDontKnow => "not visited",
        CountryVisit::NoVotes => "no votes",
        CountryVisit::Partial => "partly answered",
    }
}

/// Profile: visit statistics, then one block per country
pub fn render_profile(sections: &[CountrySection], stats: &ProfileStats, threshold: u64) -> String {
    let mut out = format!(
        "Visited {} of {} cities in {} of {} countries\n",
        stats.visited_cities, stats.total_cities, stats.visited_countries, stats.total_countries
    );

    for section in sections {
        out.push('\n');
        out.push_str(&format!(
            "{} ({}, sorted by {} {})\n",
            display_name(&section.country.flag, &section.country),
            visit_label(section.visit),
            section.sort.column,
            section.sort.direction
        ));
        for city in &section.cities {
            let rating = match display_rating(city, threshold) {
                Some(r) => format_percent(Some(r)),
                None => PENDING.to_string(),
            };
            out.push_str(&format!(
                "  {:<12} {} {:>8}  {}\n",
                city.city_id,
                pad(&city.name, 32),
                rating,
                vote_label(city.vote_type)
            ));
        }
    }
    out
}

/// Voting prompt: progress and the city up next
pub fn render_voting(queue: &VotingQueue) -> String {
    let progress = format!("Voted {} of {}", queue.voted_count(), queue.total_count());
    match queue.current() {
        Some(city) => format!(
            "{}\n{} ({})\n",
            progress,
            display_name(&city.flag, city),
            city.country
        ),
        None => format!("{}\nAll cities voted!\n", progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityrate_common::City;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(0.5)), "50.0%");
        assert_eq!(format_percent(Some(2.0 / 3.0)), "66.7%");
        assert_eq!(format_percent(Some(1.0)), "100.0%");
        assert_eq!(format_percent(Some(0.0)), "0.0%");
        assert_eq!(format_percent(None), NO_SCORE);
    }

    #[test]
    fn test_render_city_rows() {
        let mut city = City::new("1", "Kyoto", "Japan", "🇯🇵").with_counts(3, 1, 0);
        city.rating = Some(0.75);
        let out = render_ratings(&RatingsTable::Cities(vec![city]), RatingMode::Overall);

        let row = out.lines().nth(1).unwrap();
        assert!(row.contains("🇯🇵 Kyoto"));
        assert!(row.contains("Japan"));
        assert!(row.contains("75.0%"));
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("Kyoto"), 5);
        assert_eq!(display_width("🇯🇵"), 2);
        assert_eq!(display_width("東京"), 4);
        assert_eq!(display_width("Zu\u{308}rich"), 6);
    }

    #[test]
    fn test_city_rows_align_with_flags_and_wide_names() {
        let rows = vec![
            City::new("1", "Kyoto", "Japan", "🇯🇵"),
            City::new("2", "東京", "Japan", "🇯🇵"),
            City::new("3", "Nara", "Japan", ""),
            City::new("4", "Zu\u{308}rich", "Japan", ""),
        ];
        let out = render_ratings(&RatingsTable::Cities(rows), RatingMode::Overall);

        let columns: Vec<usize> = out
            .lines()
            .skip(1)
            .map(|row| display_width(&row[..row.find("Japan").unwrap()]))
            .collect();
        assert_eq!(columns.len(), 4);
        assert!(columns.iter().all(|&c| c == columns[0]));
        assert_eq!(columns[0], 4 + 2 + 32 + 1);
    }

    #[test]
    fn test_render_empty_table() {
        let out = render_ratings(&RatingsTable::Cities(Vec::new()), RatingMode::HiddenJam);
        assert_eq!(out, "No cities to show\n");
    }

    #[test]
    fn test_render_voting_done() {
        let queue = VotingQueue::new(Vec::new(), 4, 4);
        assert_eq!(render_voting(&queue), "Voted 4 of 4\nAll cities voted!\n");
    }

    #[test]
    fn test_vote_labels() {
        assert_eq!(vote_label(None), "no vote");
        assert_eq!(vote_label(Some(VoteType::DontKnow)), "don't know");
    }
}
