//! Location label decomposition.
//!
//! Turns a flat "Region Subregion" label such as `"Tokyo Shibuya"` or
//! `"東京都渋谷区"` into a two-level hierarchy for grouping. Every function
//! here is pure and total: filters call it on every record on every
//! interaction, so no input may cause a panic or an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::place::PlaceRecord;

/// Region and subregion used for empty labels.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Subregion used when a label names only a region.
pub const ALL_AREAS: &str = "All Areas";

/// Country names stripped from the front of a label. Longest first so
/// `"South Korea"` wins over `"Korea"`.
const COUNTRY_PREFIXES: &[&str] = &[
    "South Korea",
    "Taiwan",
    "Japan",
    "Korea",
    "대한민국",
    "日本",
    "台灣",
    "台湾",
    "韓国",
];

/// A leading prefecture (都道府県) followed by at least one more character.
///
/// Only 京都府 carries a suffix character inside its name, so the named
/// prefectures are listed and every 県 name is two or three characters.
static PREFECTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(北海道|東京都|京都府|大阪府|[^都道府県市]{2,3}県)(.+)$").expect("valid regex")
});

/// A city followed by a ward, town or village: the last 市 before the unit.
static CITY_WARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+市)(.+[区町村])$").expect("valid regex"));

/// A city followed by anything else.
static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?市)(.+)$").expect("valid regex"));

/// A decomposed location label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationParts {
    pub region: String,
    pub subregion: String,
}

impl LocationParts {
    fn new(region: impl Into<String>, subregion: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            subregion: subregion.into(),
        }
    }

    fn unclassified() -> Self {
        Self::new(UNCLASSIFIED, UNCLASSIFIED)
    }
}

/// Split a free-text location label into `(region, subregion)`.
///
/// 1. Strip a known country prefix.
/// 2. Two or more whitespace tokens: first token is the region, the rest
///    (joined by a single space) the subregion.
/// 3. One token: split after a leading prefecture, else after the city (市).
/// 4. Otherwise the whole token is the region with [`ALL_AREAS`].
///
/// Empty labels map to [`UNCLASSIFIED`] for both levels.
#[must_use]
pub fn decompose_location(label: &str) -> LocationParts {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return LocationParts::unclassified();
    }

    let stripped = strip_country_prefix(trimmed);
    // A bare country name keeps the country as the region.
    let text = if stripped.is_empty() { trimmed } else { stripped };

    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|t| t.trim_matches(','))
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [] => LocationParts::unclassified(),
        [single] => split_single_token(single),
        [region, rest @ ..] => LocationParts::new(*region, rest.join(" ")),
    }
}

fn strip_country_prefix(label: &str) -> &str {
    for prefix in COUNTRY_PREFIXES {
        let Some(rest) = strip_prefix_ignore_ascii_case(label, prefix) else {
            continue;
        };
        // ASCII names must end on a word boundary ("Japanese Garden" is not "Japan").
        let boundary_ok = !prefix.is_ascii()
            || rest.is_empty()
            || rest.starts_with(|c: char| c.is_whitespace() || c == ',');
        if boundary_ok {
            return rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        }
    }
    label
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn split_single_token(token: &str) -> LocationParts {
    [&PREFECTURE_RE, &CITY_WARD_RE, &CITY_RE]
        .into_iter()
        .find_map(|re| re.captures(token))
        .map_or_else(
            || LocationParts::new(token, ALL_AREAS),
            |caps| LocationParts::new(&caps[1], &caps[2]),
        )
}

/// Places counted per region, with per-subregion counts in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGroup {
    pub region: String,
    pub subregions: Vec<(String, usize)>,
    pub total: usize,
}

/// Group records by their decomposed location, preserving first-seen order.
#[must_use]
pub fn group_by_region(records: &[PlaceRecord]) -> Vec<RegionGroup> {
    let mut groups: Vec<RegionGroup> = Vec::new();
    for record in records {
        let parts = decompose_location(&record.location_guess);
        let existing = groups.iter().position(|g| g.region == parts.region);
        let group = match existing {
            Some(idx) => &mut groups[idx],
            None => {
                groups.push(RegionGroup {
                    region: parts.region.clone(),
                    subregions: Vec::new(),
                    total: 0,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.total += 1;
        match group
            .subregions
            .iter_mut()
            .find(|(name, _)| *name == parts.subregion)
        {
            Some((_, count)) => *count += 1,
            None => group.subregions.push((parts.subregion, 1)),
        }
    }
    groups
}
