//! Canonical product information record and its closed-set categories.
//!
//! Category enums serialize as the Chinese labels used by the web client,
//! so `Industry::Supplements` goes over the wire as `"保健品"`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BRAND_NAME: &str = "未知品牌";
pub const DEFAULT_SELLING_POINTS: &[&str] = &["高性能", "优质材料", "性价比高"];
pub const DEFAULT_PROMOTION_INFO: &str = "限时优惠，欢迎咨询";
pub const DEFAULT_TARGET_AUDIENCE: &str = "25-35岁用户";
pub const DEFAULT_FORBIDDEN_WORDS: &str = "最好，第一，绝对";

/// Product industry category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "服装")]
    Apparel,
    #[serde(rename = "美妆护肤")]
    Beauty,
    #[default]
    #[serde(rename = "3c数码")]
    Digital,
    #[serde(rename = "家居家纺")]
    HomeTextile,
    #[serde(rename = "食品")]
    Food,
    #[serde(rename = "保健品")]
    Supplements,
    #[serde(rename = "个护百货")]
    PersonalCare,
    #[serde(rename = "大小家电")]
    Appliances,
    #[serde(rename = "内衣内裤")]
    Underwear,
    #[serde(rename = "鞋服箱包")]
    FootwearBags,
}

impl Industry {
    /// All industries in declaration order (the tie-break order for matching).
    pub const ALL: [Industry; 10] = [
        Self::Apparel,
        Self::Beauty,
        Self::Digital,
        Self::HomeTextile,
        Self::Food,
        Self::Supplements,
        Self::PersonalCare,
        Self::Appliances,
        Self::Underwear,
        Self::FootwearBags,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Apparel => "服装",
            Self::Beauty => "美妆护肤",
            Self::Digital => "3c数码",
            Self::HomeTextile => "家居家纺",
            Self::Food => "食品",
            Self::Supplements => "保健品",
            Self::PersonalCare => "个护百货",
            Self::Appliances => "大小家电",
            Self::Underwear => "内衣内裤",
            Self::FootwearBags => "鞋服箱包",
        }
    }

    /// Exact label lookup (ASCII case-insensitive, so `3C数码` is accepted).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.label() == label)
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Purpose of the short video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoPurpose {
    #[default]
    #[serde(rename = "广告营销卖货")]
    AdSales,
    #[serde(rename = "直播间引流")]
    LivestreamFunnel,
    #[serde(rename = "种草带货")]
    ContentSeeding,
    #[serde(rename = "品宣曝光机制")]
    BrandExposure,
}

impl VideoPurpose {
    pub const ALL: [VideoPurpose; 4] = [
        Self::AdSales,
        Self::LivestreamFunnel,
        Self::ContentSeeding,
        Self::BrandExposure,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AdSales => "广告营销卖货",
            Self::LivestreamFunnel => "直播间引流",
            Self::ContentSeeding => "种草带货",
            Self::BrandExposure => "品宣曝光机制",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl std::fmt::Display for VideoPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Short-video distribution platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "抖音")]
    Douyin,
    #[serde(rename = "快手")]
    Kuaishou,
    #[serde(rename = "小红书")]
    Xiaohongshu,
    #[serde(rename = "视频号")]
    Channels,
    #[serde(rename = "B站")]
    Bilibili,
    #[serde(rename = "淘宝")]
    Taobao,
    #[serde(rename = "京东")]
    Jd,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Self::Douyin,
        Self::Kuaishou,
        Self::Xiaohongshu,
        Self::Channels,
        Self::Bilibili,
        Self::Taobao,
        Self::Jd,
    ];

    pub const DEFAULTS: [Platform; 2] = [Self::Douyin, Self::Xiaohongshu];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Douyin => "抖音",
            Self::Kuaishou => "快手",
            Self::Xiaohongshu => "小红书",
            Self::Channels => "视频号",
            Self::Bilibili => "B站",
            Self::Taobao => "淘宝",
            Self::Jd => "京东",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fully populated product record handed to script generation.
///
/// Fields missing from incoming JSON take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductInfo {
    pub brand_name: String,
    pub selling_points: Vec<String>,
    pub promotion_info: String,
    pub industry: Industry,
    pub target_audience: String,
    pub video_purpose: VideoPurpose,
    pub platforms: Vec<Platform>,
    pub forbidden_words: String,
}

impl Default for ProductInfo {
    /// The all-default record produced for empty or unrecognisable input.
    fn default() -> Self {
        Self {
            brand_name: DEFAULT_BRAND_NAME.into(),
            selling_points: DEFAULT_SELLING_POINTS.iter().map(|s| s.to_string()).collect(),
            promotion_info: DEFAULT_PROMOTION_INFO.into(),
            industry: Industry::default(),
            target_audience: DEFAULT_TARGET_AUDIENCE.into(),
            video_purpose: VideoPurpose::default(),
            platforms: Platform::DEFAULTS.to_vec(),
            forbidden_words: DEFAULT_FORBIDDEN_WORDS.into(),
        }
    }
}

/// Partially extracted product fields. `None` means "not found yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub brand_name: Option<String>,
    pub selling_points: Option<Vec<String>>,
    pub promotion_info: Option<String>,
    pub industry: Option<Industry>,
    pub target_audience: Option<String>,
    pub video_purpose: Option<VideoPurpose>,
    pub platforms: Option<Vec<Platform>>,
    pub forbidden_words: Option<String>,
}

impl ExtractedFields {
    /// Number of populated fields; empty strings and empty lists don't count.
    pub fn populated_count(&self) -> usize {
        fn text(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }
        fn list<T>(v: &Option<Vec<T>>) -> bool {
            v.as_ref().is_some_and(|l| !l.is_empty())
        }

        [
            text(&self.brand_name),
            list(&self.selling_points),
            text(&self.promotion_info),
            self.industry.is_some(),
            text(&self.target_audience),
            self.video_purpose.is_some(),
            list(&self.platforms),
            text(&self.forbidden_words),
        ]
        .into_iter()
        .filter(|&populated| populated)
        .count()
    }
}

impl From<ProductInfo> for ExtractedFields {
    fn from(info: ProductInfo) -> Self {
        Self {
            brand_name: Some(info.brand_name),
            selling_points: Some(info.selling_points),
            promotion_info: Some(info.promotion_info),
            industry: Some(info.industry),
            target_audience: Some(info.target_audience),
            video_purpose: Some(info.video_purpose),
            platforms: Some(info.platforms),
            forbidden_words: Some(info.forbidden_words),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_info_wire_format() {
        let json = serde_json::to_value(ProductInfo::default()).unwrap();
        assert_eq!(json["brandName"], "未知品牌");
        assert_eq!(json["industry"], "3c数码");
        assert_eq!(json["videoPurpose"], "广告营销卖货");
        assert_eq!(json["platforms"], serde_json::json!(["抖音", "小红书"]));
        assert_eq!(json["sellingPoints"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_category_label_rejected() {
        let raw = r#"{"brandName":"A","sellingPoints":["x"],"promotionInfo":"p",
            "industry":"其他","targetAudience":"t","videoPurpose":"广告营销卖货",
            "platforms":[],"forbiddenWords":"f"}"#;
        assert!(serde_json::from_str::<ProductInfo>(raw).is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let raw = r#"{"brandName":"斐萃","industry":"保健品"}"#;
        let info: ProductInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.brand_name, "斐萃");
        assert_eq!(info.industry, Industry::Supplements);
        assert_eq!(info.forbidden_words, DEFAULT_FORBIDDEN_WORDS);
        assert_eq!(info.platforms, Platform::DEFAULTS.to_vec());
    }

    #[test]
    fn test_industry_from_label() {
        assert_eq!(Industry::from_label("3C数码"), Some(Industry::Digital));
        assert_eq!(Industry::from_label(" 保健品 "), Some(Industry::Supplements));
        assert_eq!(Industry::from_label("汽车用品"), None);
    }

    #[test]
    fn test_populated_count_ignores_empty() {
        let fields = ExtractedFields {
            brand_name: Some(String::new()),
            selling_points: Some(vec![]),
            industry: Some(Industry::Food),
            platforms: Some(vec![Platform::Jd]),
            ..Default::default()
        };
        assert_eq!(fields.populated_count(), 2);
    }
}
