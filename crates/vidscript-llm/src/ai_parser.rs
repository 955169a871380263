//! LLM-assisted product extraction with a confidence-gated fallback to the
//! rule-based engine.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use vidscript_core::{Error, ExtractedFields, MatchStrategy, Platform, ProductInfo, Result};
use vidscript_extract::matchers::match_platforms;
use vidscript_extract::{complete, extract_product_info_with, normalize_industry, normalize_purpose};

use crate::client::{ChatClient, ChatMessage, CompletionOptions};
use crate::config::{LLMConfig, DEFAULT_PARSE_TIMEOUT_SECS};

/// Replies strictly above this confidence are trusted.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Confidence assumed when the reply omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

const MAX_LIST_ITEMS: usize = 3;

const SYSTEM_PROMPT: &str = "你是一个专业的产品信息解析专家，擅长准确识别产品类型和提取关键信息。";

/// A parsed and normalised LLM reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AiParseResult {
    pub info: ProductInfo,
    pub confidence: f64,
}

/// Result of one AI extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    HighConfidence(AiParseResult),
    LowConfidence(AiParseResult),
    Failure(String),
}

impl AiOutcome {
    /// Gate a parsed reply on its confidence.
    pub fn from_result(result: AiParseResult) -> Self {
        if result.confidence > HIGH_CONFIDENCE_THRESHOLD {
            Self::HighConfidence(result)
        } else {
            Self::LowConfidence(result)
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::HighConfidence(r) | Self::LowConfidence(r) => Some(r.confidence),
            Self::Failure(_) => None,
        }
    }
}

/// Which path produced the final record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Ai,
    Rules,
}

/// Final extraction with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub info: ProductInfo,
    pub source: ExtractionSource,
    pub confidence: Option<f64>,
}

/// Anything that can attempt an AI extraction.
pub trait ProductParser: Send + Sync {
    fn parse(&self, text: &str) -> impl Future<Output = AiOutcome> + Send;
}

/// DeepSeek-backed parser. Without a client every attempt is a `Failure`.
#[derive(Debug, Clone)]
pub struct AiParser {
    client: Option<ChatClient>,
    strategy: MatchStrategy,
    timeout: Duration,
}

impl AiParser {
    pub fn new(client: Option<ChatClient>, strategy: MatchStrategy, timeout: Duration) -> Self {
        Self {
            client,
            strategy,
            timeout,
        }
    }

    pub fn from_config(config: &LLMConfig, strategy: MatchStrategy) -> Self {
        Self::new(ChatClient::from_config(config), strategy, config.parse_timeout())
    }

    pub fn unconfigured(strategy: MatchStrategy) -> Self {
        Self::new(None, strategy, Duration::from_secs(DEFAULT_PARSE_TIMEOUT_SECS))
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

impl ProductParser for AiParser {
    async fn parse(&self, text: &str) -> AiOutcome {
        let Some(client) = &self.client else {
            return AiOutcome::Failure("not configured".into());
        };

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_parse_prompt(text)),
        ];
        let options = CompletionOptions {
            temperature: 0.1,
            max_tokens: Some(1000),
            timeout: self.timeout,
        };

        let reply = match client.complete(&messages, options).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("AI extraction request failed: {}", e);
                return AiOutcome::Failure(e.to_string());
            }
        };

        match parse_ai_response(&reply, self.strategy) {
            Ok(result) => {
                info!("AI extraction parsed with confidence {:.2}", result.confidence);
                AiOutcome::from_result(result)
            }
            Err(e) => {
                warn!("AI reply could not be parsed: {}", e);
                AiOutcome::Failure(e.to_string())
            }
        }
    }
}

/// Prompt asking the model for a single JSON object.
pub fn build_parse_prompt(text: &str) -> String {
    format!(
        r#"你是一个专业的产品信息解析专家。请仔细分析以下产品信息，并准确识别产品类型和相关信息。

产品信息：
{text}

请按照以下JSON格式返回解析结果，确保准确性：

{{
  "brandName": "品牌名称（如：汤臣倍健、安利、华为、小米等）",
  "sellingPoints": ["核心卖点1", "核心卖点2", "核心卖点3"],
  "industry": "产品行业（服装、美妆护肤、3c数码、家居家纺、食品、保健品、个护百货、大小家电、内衣内裤、鞋服箱包之一）",
  "targetAudience": "目标人群（如：中老年人、年轻女性、商务人士、学生群体、健身人群等）",
  "purpose": "视频目的（广告营销卖货、直播间引流、种草带货、品宣曝光机制之一）",
  "platforms": ["抖音", "快手", "小红书", "视频号", "B站", "淘宝", "京东"],
  "discount": "优惠信息（如：买一送一、限时8折、满减优惠等）",
  "forbiddenWords": ["违禁词1", "违禁词2"],
  "confidence": 0.95
}}

重要提示：
1. 仔细分析产品描述，准确判断产品类型（保健品、3C数码、美妆等）
2. 保健品通常包含：维生素、蛋白粉、钙片、鱼油、益生菌、胶原蛋白等关键词
3. 3C数码通常包含：手机、电脑、耳机、相机、智能设备等关键词
4. 美妆护肤通常包含：面膜、精华、口红、粉底、护肤品等关键词
5. 如果信息不完整，请根据上下文合理推断
6. confidence表示解析的置信度（0-1之间）

请只返回JSON格式的结果，不要包含其他文字。"#
    )
}

/// Parse the first `{` .. last `}` span of a reply into a normalised record.
pub fn parse_ai_response(reply: &str, strategy: MatchStrategy) -> Result<AiParseResult> {
    let span = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(Error::Llm("no JSON object in AI reply".into())),
    };
    let value: Value = serde_json::from_str(span)
        .map_err(|e| Error::Llm(format!("AI reply is not valid JSON: {}", e)))?;

    let confidence = value["confidence"]
        .as_f64()
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let fields = ExtractedFields {
        brand_name: text_field(&value["brandName"]),
        selling_points: list_field(&value["sellingPoints"]),
        promotion_info: text_field(&value["discount"]),
        industry: text_field(&value["industry"]).and_then(|l| normalize_industry(&l, strategy)),
        target_audience: text_field(&value["targetAudience"]),
        video_purpose: text_field(&value["purpose"]).and_then(|l| normalize_purpose(&l, strategy)),
        platforms: list_field(&value["platforms"])
            .map(|names| platforms_from(&names))
            .filter(|platforms| !platforms.is_empty()),
        forbidden_words: forbidden_words_field(&value["forbiddenWords"]),
    };

    Ok(AiParseResult {
        info: complete(fields),
        confidence,
    })
}

fn text_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Non-blank strings of a JSON array. Capping happens after each field's
/// own validation so that junk entries never crowd out usable ones.
fn list_field(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = value.as_array()?.iter().filter_map(text_field).collect();
    (!items.is_empty()).then_some(items)
}

fn forbidden_words_field(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) => list_field(value).map(|words| {
            words
                .into_iter()
                .take(MAX_LIST_ITEMS)
                .collect::<Vec<_>>()
                .join("，")
        }),
        _ => text_field(value),
    }
}

/// Recognised platforms in reply order, deduplicated, at most three.
fn platforms_from(names: &[String]) -> Vec<Platform> {
    let mut platforms = Vec::new();
    for platform in names.iter().flat_map(|n| match_platforms(n)) {
        if platforms.len() == MAX_LIST_ITEMS {
            break;
        }
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    platforms
}

/// Turn an AI outcome into the final record; anything short of a
/// high-confidence reply runs the rule-based engine instead.
pub fn resolve(outcome: AiOutcome, text: &str, strategy: MatchStrategy) -> Extraction {
    let confidence = outcome.confidence();
    match outcome {
        AiOutcome::HighConfidence(result) => Extraction {
            info: result.info,
            source: ExtractionSource::Ai,
            confidence,
        },
        AiOutcome::LowConfidence(_) => {
            info!("AI confidence too low, using rule-based extraction");
            rules(text, strategy, confidence)
        }
        AiOutcome::Failure(reason) => {
            info!("AI extraction unavailable ({}), using rule-based extraction", reason);
            rules(text, strategy, confidence)
        }
    }
}

fn rules(text: &str, strategy: MatchStrategy, confidence: Option<f64>) -> Extraction {
    Extraction {
        info: extract_product_info_with(text, strategy),
        source: ExtractionSource::Rules,
        confidence,
    }
}

/// AI attempt first, rule-based fallback second. Each path runs at most once.
pub async fn extract_product_info_with_ai<P: ProductParser>(
    parser: &P,
    text: &str,
    strategy: MatchStrategy,
) -> Extraction {
    let outcome = parser.parse(text).await;
    resolve(outcome, text, strategy)
}
