//! Splitting multi-product documents into candidate blocks and picking the
//! block most likely to be a product brief.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::keywords::Field;

const MIN_SECTION_CHARS: usize = 10;
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Separators tried in order; the first that splits the text at all wins.
static SECTION_SEPARATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\n\s*测试案例\d+[：:]",
        r"\n\s*\d+[、.]",
        r"\n\s*[一二三四五六七八九十]+[、.]",
        r"\n\s*[A-Za-z]\s*[、.]",
        r"\n\s*[-*]\s*",
        r"\n\s*品牌[：:]",
        r"\n\s*品牌名称[：:]",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

static BRAND_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z\x{4e00}-\x{9fa5}]{2,10}\s*(?:品牌手册|应运而生|品牌)").unwrap()
});

/// Split raw text into candidate product blocks.
///
/// Always returns at least one block; for blank input it is the empty string.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    if let Some(separator) = SECTION_SEPARATORS.iter().find(|re| re.is_match(text)) {
        sections = long_parts(separator.split(text), MIN_SECTION_CHARS);
        if sections.len() > 1 {
            debug!("Split into {} sections on /{}/", sections.len(), separator.as_str());
            return sections;
        }
    }

    // A lone section still leads; paragraphs follow it so it wins ties.
    sections.extend(long_parts(PARAGRAPH_BREAK.split(text), MIN_PARAGRAPH_CHARS));
    if sections.is_empty() {
        sections.push(text.trim().to_string());
    }
    sections
}

fn long_parts<'a>(parts: impl Iterator<Item = &'a str>, min_chars: usize) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| p.chars().count() > min_chars)
        .map(String::from)
        .collect()
}

/// Heuristic likelihood that a block is a product brief.
pub fn score_block(block: &str) -> u32 {
    let mut score: u32 = Field::ALL
        .iter()
        .filter(|f| f.labels().iter().any(|l| block.contains(l)))
        .map(|f| f.marker_weight())
        .sum();

    let len = block.chars().count();
    score += match len {
        51..=499 => 3,
        501..=999 => 2,
        1001.. => 1,
        _ => 0,
    };

    if BRAND_CONTEXT.is_match(block) {
        score += 5;
    }

    score
}

/// Pick the highest-scoring block; ties keep the earliest.
pub fn select_best_block(blocks: &[String]) -> &str {
    let mut best: &str = blocks.first().map(String::as_str).unwrap_or("");
    let mut best_score = 0;

    for (idx, block) in blocks.iter().enumerate() {
        let score = score_block(block);
        debug!("Block {} scored {}", idx, score);
        if score > best_score {
            best = block;
            best_score = score;
        }
    }

    best
}
