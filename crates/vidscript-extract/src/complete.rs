//! Default completion: turns partially extracted fields into a full
//! [`ProductInfo`].

use vidscript_core::product::{
    DEFAULT_BRAND_NAME, DEFAULT_FORBIDDEN_WORDS, DEFAULT_PROMOTION_INFO, DEFAULT_SELLING_POINTS,
    DEFAULT_TARGET_AUDIENCE,
};
use vidscript_core::{ExtractedFields, Platform, ProductInfo};

use crate::matchers::{clean_brand_name, MAX_SELLING_POINTS, MAX_SELLING_POINT_CHARS};

/// Fill every missing or empty field with its default.
///
/// Idempotent: completing an already complete record changes nothing.
pub fn complete(fields: ExtractedFields) -> ProductInfo {
    let brand_name = fields
        .brand_name
        .map(|b| clean_brand_name(&b))
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_BRAND_NAME.to_string());

    let mut selling_points = validate_selling_points(&fields.selling_points.unwrap_or_default());
    if selling_points.is_empty() {
        selling_points = DEFAULT_SELLING_POINTS.iter().map(|s| s.to_string()).collect();
    }

    let mut platforms: Vec<Platform> = Vec::new();
    for platform in fields.platforms.unwrap_or_default() {
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    if platforms.is_empty() {
        platforms = Platform::DEFAULTS.to_vec();
    }

    ProductInfo {
        brand_name,
        selling_points,
        promotion_info: text_or(fields.promotion_info, DEFAULT_PROMOTION_INFO),
        industry: fields.industry.unwrap_or_default(),
        target_audience: text_or(fields.target_audience, DEFAULT_TARGET_AUDIENCE),
        video_purpose: fields.video_purpose.unwrap_or_default(),
        platforms,
        forbidden_words: text_or(fields.forbidden_words, DEFAULT_FORBIDDEN_WORDS),
    }
}

/// Re-apply completion rules to a finished record (e.g. one built by an LLM).
pub fn recomplete(info: ProductInfo) -> ProductInfo {
    complete(info.into())
}

/// Keep at most three trimmed, non-empty points of at most 20 characters.
pub fn validate_selling_points(points: &[String]) -> Vec<String> {
    points
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && p.chars().count() <= MAX_SELLING_POINT_CHARS)
        .take(MAX_SELLING_POINTS)
        .map(String::from)
        .collect()
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidscript_core::{Industry, VideoPurpose};

    #[test]
    fn test_complete_empty_is_default() {
        assert_eq!(complete(ExtractedFields::default()), ProductInfo::default());
    }

    #[test]
    fn test_complete_keeps_found_fields() {
        let fields = ExtractedFields {
            brand_name: Some("  斐萃 ".into()),
            industry: Some(Industry::Supplements),
            platforms: Some(vec![Platform::Jd, Platform::Jd, Platform::Taobao]),
            promotion_info: Some("   ".into()),
            ..Default::default()
        };
        let info = complete(fields);
        assert_eq!(info.brand_name, "斐萃");
        assert_eq!(info.industry, Industry::Supplements);
        assert_eq!(info.platforms, vec![Platform::Jd, Platform::Taobao]);
        assert_eq!(info.promotion_info, DEFAULT_PROMOTION_INFO);
        assert_eq!(info.video_purpose, VideoPurpose::AdSales);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let fields = ExtractedFields {
            brand_name: Some("Fine  Nutri".into()),
            selling_points: Some(vec!["  高吸收 ".into(), "".into(), "天然".into()]),
            ..Default::default()
        };
        let once = complete(fields);
        let twice = recomplete(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.selling_points, vec!["高吸收", "天然"]);
    }

    #[test]
    fn test_validate_selling_points() {
        let points: Vec<String> = ["a", " ", "一二三四五六七八九十一二三四五六七八九十一", "b", "c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(validate_selling_points(&points), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_denylisted_brand_falls_back() {
        let fields = ExtractedFields {
            brand_name: Some("品牌手册".into()),
            ..Default::default()
        };
        assert_eq!(complete(fields).brand_name, DEFAULT_BRAND_NAME);
    }
}
