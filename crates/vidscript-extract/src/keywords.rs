//! Keyword tables and field labels for Chinese product briefs.
//!
//! Table order matters: it is the tie-break order for category matching.

use vidscript_core::{Industry, Platform, VideoPurpose};

pub type KeywordTable<T> = &'static [(T, &'static [&'static str])];

pub static INDUSTRY_KEYWORDS: KeywordTable<Industry> = &[
    (Industry::Apparel, &["服装", "衣服", "服饰", "时装", "穿搭", "时尚", "女装", "男装", "童装"]),
    (Industry::Beauty, &["美妆", "护肤", "化妆品", "护肤品", "彩妆", "美容", "面膜", "口红", "粉底"]),
    (Industry::Digital, &["数码", "3c", "手机", "电脑", "电子", "数码产品", "平板", "耳机", "充电器"]),
    (Industry::HomeTextile, &["家居", "家纺", "家具", "床上用品", "家装", "沙发", "床垫", "窗帘"]),
    (Industry::Food, &["食品", "零食", "美食", "饮料", "食品饮料", "坚果", "饼干", "糖果"]),
    (Industry::Supplements, &["保健品", "营养品", "健康", "养生", "维生素", "蛋白粉", "钙片"]),
    (Industry::PersonalCare, &["个护", "百货", "日用品", "洗护", "洗发水", "沐浴露", "牙膏"]),
    (Industry::Appliances, &["家电", "电器", "小家电", "大家电", "冰箱", "洗衣机", "空调"]),
    (Industry::Underwear, &["内衣", "内裤", "文胸", "内衣服装", "胸罩", "睡衣"]),
    (Industry::FootwearBags, &["鞋子", "箱包", "包包", "鞋服", "运动鞋", "皮鞋", "背包"]),
];

pub static PURPOSE_KEYWORDS: KeywordTable<VideoPurpose> = &[
    (VideoPurpose::AdSales, &["卖货", "营销", "广告", "销售", "推广", "促销", "购买"]),
    (VideoPurpose::LivestreamFunnel, &["直播", "引流", "直播间", "直播带货"]),
    (VideoPurpose::ContentSeeding, &["种草", "带货", "推荐", "安利", "分享"]),
    (VideoPurpose::BrandExposure, &["品宣", "曝光", "品牌宣传", "宣传", "知名度"]),
];

pub static PLATFORM_KEYWORDS: KeywordTable<Platform> = &[
    (Platform::Douyin, &["抖音", "douyin", "tiktok"]),
    (Platform::Kuaishou, &["快手", "kuaishou"]),
    (Platform::Xiaohongshu, &["小红书", "xiaohongshu", "redbook"]),
    (Platform::Channels, &["视频号", "微信视频号", "wechat"]),
    (Platform::Bilibili, &["b站", "bilibili", "哔哩哔哩"]),
    (Platform::Taobao, &["淘宝", "taobao", "天猫"]),
    (Platform::Jd, &["京东", "jd"]),
];

/// A labelled field of a product brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BrandName,
    SellingPoints,
    PromotionInfo,
    Industry,
    TargetAudience,
    VideoPurpose,
    Platforms,
    ForbiddenWords,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Self::BrandName,
        Self::SellingPoints,
        Self::PromotionInfo,
        Self::Industry,
        Self::TargetAudience,
        Self::VideoPurpose,
        Self::Platforms,
        Self::ForbiddenWords,
    ];

    /// Label words introducing this field, longest first.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::BrandName => &["品牌名称", "品牌"],
            Self::SellingPoints => &["核心卖点", "卖点"],
            Self::PromotionInfo => &["活动优惠", "优惠"],
            Self::Industry => &["行业"],
            Self::TargetAudience => &["目标人群", "人群"],
            Self::VideoPurpose => &["视频目的", "目的"],
            Self::Platforms => &["平台"],
            Self::ForbiddenWords => &["违禁词"],
        }
    }

    /// Block-scoring weight when any of the field's labels appears.
    pub fn marker_weight(&self) -> u32 {
        match self {
            Self::BrandName => 10,
            Self::SellingPoints => 8,
            Self::Industry => 6,
            Self::TargetAudience | Self::VideoPurpose => 5,
            Self::Platforms => 4,
            Self::PromotionInfo => 3,
            Self::ForbiddenWords => 2,
        }
    }
}

/// Selling points starting with one of these are label leakage, not content.
pub const LEAKED_LABEL_PREFIXES: &[&str] = &[
    "品牌", "优惠", "行业", "人群", "目的", "平台", "违禁词", "活动", "目标", "视频",
];

/// Strings that are never brand names on their own.
pub const BRAND_DENYLIST: &[&str] = &["品牌", "手册", "应运而生", "诞生", "品牌手册"];
