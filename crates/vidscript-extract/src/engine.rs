//! Three-stage field extraction over a selected product block.
//!
//! 1. Regex: labelled values anywhere in the block, cut before the next label.
//! 2. Line-by-line: each line checked for any still-missing label.
//! 3. Contextual: brand heuristics and keyword inference over the block head.
//!
//! Stages 2 and 3 only run while fewer than four fields are populated, and
//! never overwrite a field an earlier stage found. Industry and purpose are
//! finally inferred from keywords across the whole block if still missing.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use vidscript_core::{ExtractedFields, MatchStrategy, ProductInfo};

use crate::blocks::{select_best_block, split_blocks};
use crate::complete::complete;
use crate::keywords::Field;
use crate::matchers::{
    clean_brand_name, match_industry, match_platforms, match_purpose, parse_selling_points,
};

const SUFFICIENT_FIELDS: usize = 4;
const CONTEXT_WINDOW_CHARS: usize = 1000;
const MAX_BRAND_CHARS: usize = 50;

struct FieldPatterns {
    /// `label：value` up to end of line; a blank value never spans lines.
    labelled: Regex,
    /// Any other field's label; marks where a labelled value ends.
    stop: Regex,
}

impl FieldPatterns {
    fn build(field: Field) -> Self {
        let own = field.labels().join("|");
        let others = Field::ALL
            .iter()
            .filter(|f| **f != field)
            .flat_map(|f| f.labels().iter().copied())
            .collect::<Vec<_>>()
            .join("|");

        Self {
            labelled: Regex::new(&format!(r"(?:{})[：:][ \t\x{{3000}}]*([^\n\r]+)", own)).unwrap(),
            stop: Regex::new(&format!(r"\s*(?:{})", others)).unwrap(),
        }
    }
}

static FIELD_PATTERNS: Lazy<Vec<FieldPatterns>> =
    Lazy::new(|| Field::ALL.iter().map(|f| FieldPatterns::build(*f)).collect());

/// Unlabelled brand cues tried when no `品牌：` value was usable.
static BRAND_CUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"([A-Za-z\x{4e00}-\x{9fa5} \t]+?)[ \t]*品牌手册",
        r"([A-Za-z\x{4e00}-\x{9fa5} \t]+?)[ \t]*应运而生",
        r"([A-Za-z\x{4e00}-\x{9fa5} \t]+?)[ \t]*诞生",
        r"([A-Za-z\x{4e00}-\x{9fa5} \t]+?)[ \t]*品牌",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Looser brand patterns for the contextual stage, most specific first.
static CONTEXT_BRAND_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:品牌名称|品牌)[：:][ \t\x{3000}]*([^\n\r：:]+)(?:[\r\n]|$)",
        r"(?i)([A-Za-z\x{4e00}-\x{9fa5}]+(?:iPhone|华为|小米|OPPO|vivo|三星|苹果|荣耀|一加|realme|iQOO))",
        r"([A-Za-z\x{4e00}-\x{9fa5}]+(?:手机|电脑|平板|耳机))",
        r"([A-Za-z\x{4e00}-\x{9fa5}]+)\s*品牌手册",
        r"([A-Za-z\x{4e00}-\x{9fa5}]+)\s*品\s*牌\s*手\s*册",
        r"([A-Za-z\x{4e00}-\x{9fa5}]{2,8})\s*应运而生",
        r"([A-Za-z\x{4e00}-\x{9fa5}]{2,8})\s*诞生",
        r"([A-Za-z\x{4e00}-\x{9fa5}]{2,8})\s*品牌",
        r"([A-Za-z]+[A-Za-z\x{4e00}-\x{9fa5}]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Rule-based product information extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionEngine {
    strategy: MatchStrategy,
}

impl ExtractionEngine {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self { strategy }
    }

    /// Split, select the best block, extract and complete. Never fails.
    pub fn extract(&self, raw: &str) -> ProductInfo {
        let blocks = split_blocks(raw);
        let block = select_best_block(&blocks);
        debug!("Selected block of {} chars from {} candidates", block.chars().count(), blocks.len());

        let fields = self.extract_fields(block);
        info!(
            "Rule extraction found {}/8 fields (strategy: {})",
            fields.populated_count(),
            self.strategy
        );
        complete(fields)
    }

    /// Run the extraction stages over one block without completing defaults.
    pub fn extract_fields(&self, block: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::default();

        self.regex_stage(block, &mut fields);
        debug!("Regex stage: {} fields", fields.populated_count());

        if fields.populated_count() < SUFFICIENT_FIELDS {
            self.line_stage(block, &mut fields);
            debug!("Line stage: {} fields", fields.populated_count());
        }

        if fields.populated_count() < SUFFICIENT_FIELDS {
            self.contextual_stage(block, &mut fields);
            debug!("Contextual stage: {} fields", fields.populated_count());
        }

        if fields.industry.is_none() {
            fields.industry = match_industry(block, self.strategy);
        }
        if fields.video_purpose.is_none() {
            fields.video_purpose = match_purpose(block, self.strategy);
        }

        fields
    }

    fn regex_stage(&self, block: &str, fields: &mut ExtractedFields) {
        for field in Field::ALL {
            if let Some((cut, full)) = labelled_value(block, field) {
                if !self.assign(fields, field, cut) && full != cut {
                    self.assign(fields, field, full);
                }
            }
        }

        if fields.brand_name.is_none() {
            fields.brand_name = BRAND_CUES
                .iter()
                .find_map(|re| capture_brand(re, block, 2));
        }
    }

    fn line_stage(&self, block: &str, fields: &mut ExtractedFields) {
        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            for field in Field::ALL {
                if is_set(fields, field) {
                    continue;
                }
                if let Some((_, full)) = labelled_value(line, field) {
                    self.assign(fields, field, full);
                }
            }
        }
    }

    fn contextual_stage(&self, block: &str, fields: &mut ExtractedFields) {
        let head = leading_chars(block, CONTEXT_WINDOW_CHARS);

        if fields.brand_name.is_none() {
            fields.brand_name = CONTEXT_BRAND_PATTERNS
                .iter()
                .find_map(|re| capture_brand(re, head, 2));
        }
        if fields.industry.is_none() {
            fields.industry = match_industry(head, self.strategy);
        }
        if fields.video_purpose.is_none() {
            fields.video_purpose = match_purpose(head, self.strategy);
        }
        if fields.platforms.is_none() {
            let platforms = match_platforms(head);
            if !platforms.is_empty() {
                fields.platforms = Some(platforms);
            }
        }
    }

    /// Parse `value` for `field` and store it if the field is still empty.
    fn assign(&self, fields: &mut ExtractedFields, field: Field, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || is_set(fields, field) {
            return false;
        }

        match field {
            Field::BrandName => set(&mut fields.brand_name, accept_brand(value, 1)),
            Field::SellingPoints => {
                set(&mut fields.selling_points, non_empty(parse_selling_points(value)))
            }
            Field::PromotionInfo => set(&mut fields.promotion_info, Some(value.to_string())),
            Field::Industry => set(&mut fields.industry, match_industry(value, self.strategy)),
            Field::TargetAudience => set(&mut fields.target_audience, Some(value.to_string())),
            Field::VideoPurpose => {
                set(&mut fields.video_purpose, match_purpose(value, self.strategy))
            }
            Field::Platforms => set(&mut fields.platforms, non_empty(match_platforms(value))),
            Field::ForbiddenWords => set(&mut fields.forbidden_words, Some(value.to_string())),
        }
    }
}

/// First `label：value` for `field` in `text`, as (value cut before the next
/// field label, whole rest of line).
///
/// A value that opens with another field's `label：` is blank, so that
/// occurrence is skipped rather than borrowing the neighbour's value.
fn labelled_value(text: &str, field: Field) -> Option<(&str, &str)> {
    let patterns = &FIELD_PATTERNS[field as usize];

    patterns.labelled.captures_iter(text).find_map(|caps| {
        let full = caps.get(1)?.as_str();
        let mut stops = patterns.stop.find_iter(full).peekable();

        if let Some(first) = stops.next_if(|m| m.start() == 0) {
            if full[first.end()..].starts_with(['：', ':']) {
                return None;
            }
        }
        let end = stops.next().map_or(full.len(), |m| m.start());

        let cut = full[..end].trim();
        let whole = full.trim();
        (!whole.is_empty()).then_some((cut, whole))
    })
}

fn capture_brand(re: &Regex, text: &str, min_chars: usize) -> Option<String> {
    let raw = re.captures(text)?.get(1)?.as_str();
    accept_brand(raw, min_chars)
}

fn accept_brand(raw: &str, min_chars: usize) -> Option<String> {
    let brand = clean_brand_name(raw);
    let len = brand.chars().count();
    (len >= min_chars && len <= MAX_BRAND_CHARS).then_some(brand)
}

fn is_set(fields: &ExtractedFields, field: Field) -> bool {
    match field {
        Field::BrandName => fields.brand_name.is_some(),
        Field::SellingPoints => fields.selling_points.is_some(),
        Field::PromotionInfo => fields.promotion_info.is_some(),
        Field::Industry => fields.industry.is_some(),
        Field::TargetAudience => fields.target_audience.is_some(),
        Field::VideoPurpose => fields.video_purpose.is_some(),
        Field::Platforms => fields.platforms.is_some(),
        Field::ForbiddenWords => fields.forbidden_words.is_some(),
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn leading_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
