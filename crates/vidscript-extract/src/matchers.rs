//! Field matchers: category resolution, platform matching, selling-point
//! splitting and brand-name cleanup.

use once_cell::sync::Lazy;
use regex::Regex;
use vidscript_core::{Industry, MatchStrategy, Platform, VideoPurpose};

use crate::keywords::{
    KeywordTable, BRAND_DENYLIST, INDUSTRY_KEYWORDS, LEAKED_LABEL_PREFIXES, PLATFORM_KEYWORDS,
    PURPOSE_KEYWORDS,
};

pub const MAX_SELLING_POINTS: usize = 3;
pub const MAX_SELLING_POINT_CHARS: usize = 20;

static SELLING_POINT_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[，,、；;]").unwrap());
static PLATFORM_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[，,、\s]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Resolve `text` to a category of `table`.
///
/// Keywords are matched as substrings, ASCII case-insensitively.
pub fn match_category<T: Copy>(
    text: &str,
    table: KeywordTable<T>,
    strategy: MatchStrategy,
) -> Option<T> {
    let text_lower = text.to_lowercase();
    let hits = |keywords: &[&str]| {
        keywords
            .iter()
            .filter(|kw| text_lower.contains(&kw.to_lowercase()))
            .count()
    };

    match strategy {
        MatchStrategy::FirstMatch => table
            .iter()
            .find(|(_, keywords)| hits(keywords) > 0)
            .map(|(category, _)| *category),
        MatchStrategy::MostMatches => {
            let mut best: Option<(T, usize)> = None;
            for (category, keywords) in table {
                let score = hits(keywords);
                if score > 0 && best.map_or(true, |(_, s)| score > s) {
                    best = Some((*category, score));
                }
            }
            best.map(|(category, _)| category)
        }
    }
}

pub fn match_industry(text: &str, strategy: MatchStrategy) -> Option<Industry> {
    match_category(text, INDUSTRY_KEYWORDS, strategy)
}

pub fn match_purpose(text: &str, strategy: MatchStrategy) -> Option<VideoPurpose> {
    match_category(text, PURPOSE_KEYWORDS, strategy)
}

/// Match platform names in a delimited list. First-seen order, no duplicates.
///
/// A token matches a platform when it contains one of the platform's
/// keywords, or (for tokens of two or more characters) is contained in one.
pub fn match_platforms(text: &str) -> Vec<Platform> {
    let mut matched: Vec<Platform> = Vec::new();

    for token in PLATFORM_SEPARATORS.split(text) {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        let reverse_ok = token.chars().count() >= 2;

        let hit = PLATFORM_KEYWORDS.iter().find(|(_, keywords)| {
            keywords.iter().any(|kw| {
                let kw = kw.to_lowercase();
                token.contains(&kw) || (reverse_ok && kw.contains(&token))
            })
        });

        if let Some((platform, _)) = hit {
            if !matched.contains(platform) {
                matched.push(*platform);
            }
        }
    }

    matched
}

/// Split a selling-points span into at most three short points.
pub fn parse_selling_points(text: &str) -> Vec<String> {
    SELLING_POINT_SEPARATORS
        .split(text)
        .map(str::trim)
        .filter(|p| {
            !p.is_empty()
                && p.chars().count() <= MAX_SELLING_POINT_CHARS
                && !LEAKED_LABEL_PREFIXES.iter().any(|l| p.starts_with(l))
        })
        .take(MAX_SELLING_POINTS)
        .map(String::from)
        .collect()
}

/// Drop bare label words and collapse whitespace.
pub fn clean_brand_name(name: &str) -> String {
    let trimmed = name.trim();
    if BRAND_DENYLIST.iter().any(|d| d.eq_ignore_ascii_case(trimmed)) {
        return String::new();
    }
    WHITESPACE_RUN.replace_all(trimmed, " ").trim().to_string()
}

/// Map a free-text industry label (e.g. from an LLM) onto the closed set.
///
/// Exact label, then containment either way, then the keyword table.
pub fn normalize_industry(label: &str, strategy: MatchStrategy) -> Option<Industry> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Industry::from_label(label)
        .or_else(|| fuzzy_label(label, &Industry::ALL, Industry::label))
        .or_else(|| match_industry(label, strategy))
}

/// Map a free-text purpose label onto the closed set.
pub fn normalize_purpose(label: &str, strategy: MatchStrategy) -> Option<VideoPurpose> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    VideoPurpose::from_label(label)
        .or_else(|| fuzzy_label(label, &VideoPurpose::ALL, VideoPurpose::label))
        .or_else(|| match_purpose(label, strategy))
}

fn fuzzy_label<T: Copy>(label: &str, all: &[T], name: fn(&T) -> &'static str) -> Option<T> {
    let label = label.to_lowercase();
    all.iter()
        .find(|c| {
            let candidate = name(c).to_lowercase();
            candidate.contains(&label) || label.contains(&candidate)
        })
        .copied()
}
