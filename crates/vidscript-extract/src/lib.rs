//! vidscript extract: rule-based product information extraction from
//! Chinese product briefs, plus upload decoding.

pub mod blocks;
pub mod complete;
pub mod engine;
pub mod file;
pub mod keywords;
pub mod matchers;

pub use blocks::{score_block, select_best_block, split_blocks};
pub use complete::{complete, recomplete, validate_selling_points};
pub use engine::ExtractionEngine;
pub use file::{decode_upload, FileType};
pub use matchers::{clean_brand_name, normalize_industry, normalize_purpose};

use vidscript_core::{MatchStrategy, ProductInfo};

/// Extract a complete product record from raw text with the default strategy.
pub fn extract_product_info(raw: &str) -> ProductInfo {
    extract_product_info_with(raw, MatchStrategy::default())
}

pub fn extract_product_info_with(raw: &str, strategy: MatchStrategy) -> ProductInfo {
    ExtractionEngine::new(strategy).extract(raw)
}
