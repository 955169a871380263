//! Short-video script generation: per-template prompts, reply parsing and
//! concurrent fan-out over all templates.

use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};
use vidscript_core::{ProductInfo, Result, ScriptContent, ScriptTemplateType};

use crate::client::{ChatClient, ChatMessage, CompletionOptions};
use crate::config::LLMConfig;

pub const PERFORMANCE_METRICS: &str = "ARPU 1.5万-2万，CTR 6%-7%，适配10-60s短视频";

const SYSTEM_PROMPT: &str =
    "你是一个专业的短视频脚本创作专家，擅长为电商产品创作吸引人的短视频脚本。请严格按照要求的格式输出内容。";

/// Per-template wording for the requested output format.
struct TemplateHints {
    name: &'static str,
    title: &'static str,
    cover: &'static str,
    hook: &'static str,
    content: &'static str,
    shooting: &'static str,
}

fn hints(template: ScriptTemplateType) -> TemplateHints {
    match template {
        ScriptTemplateType::ProblemSolution => TemplateHints {
            name: "问题解决型",
            title: "吸引人的标题，突出解决用户痛点",
            cover: "具体的封面设计建议",
            hook: "前3秒抓住用户注意力的开场",
            content: "15-60秒的完整文案，包含产品介绍、卖点展示、优惠信息",
            shooting: "远景+近景+产品细节的拍摄指导",
        },
        ScriptTemplateType::ProductShowcase => TemplateHints {
            name: "产品展示型",
            title: "突出产品特色的标题",
            cover: "展示产品亮点的封面设计",
            hook: "快速展示产品核心价值的开场",
            content: "15-60秒的产品展示文案，重点突出卖点",
            shooting: "多角度产品展示的拍摄指导",
        },
        ScriptTemplateType::StoryTelling => TemplateHints {
            name: "故事叙述型",
            title: "有故事感的标题",
            cover: "营造故事氛围的封面设计",
            hook: "引人入胜的故事开场",
            content: "15-60秒的故事化产品介绍",
            shooting: "故事化场景的拍摄指导",
        },
        ScriptTemplateType::Comparison => TemplateHints {
            name: "对比测评型",
            title: "突出对比优势的标题",
            cover: "对比展示的封面设计",
            hook: "快速展示对比结果的开场",
            content: "15-60秒的对比测评文案",
            shooting: "对比展示的拍摄指导",
        },
        ScriptTemplateType::Tutorial => TemplateHints {
            name: "教程教学型",
            title: "实用教程类标题",
            cover: "教学场景的封面设计",
            hook: "快速展示教学价值的开场",
            content: "15-60秒的产品使用教程",
            shooting: "教学演示的拍摄指导",
        },
        ScriptTemplateType::Testimonial => TemplateHints {
            name: "用户见证型",
            title: "用户推荐类标题",
            cover: "用户使用场景的封面设计",
            hook: "真实用户反馈的开场",
            content: "15-60秒的用户见证文案",
            shooting: "用户使用场景的拍摄指导",
        },
    }
}

/// Chinese display name of a template.
pub fn template_name(template: ScriptTemplateType) -> &'static str {
    hints(template).name
}

pub fn build_script_prompt(info: &ProductInfo, template: ScriptTemplateType) -> String {
    let h = hints(template);
    format!(
        "请为{industry}行业的产品生成一个\"{name}\"短视频脚本。
产品信息：
- 品牌：{brand}
- 核心卖点：{points}
- 活动优惠：{promotion}
- 目标人群：{audience}
- 视频目的：{purpose}
- 违禁词：{forbidden}

请按以下格式输出：
标题：[{title}]
封面建议：[{cover}]
黄金3s钩子：[{hook}]
内容文案：[{content}]
拍摄建议：[{shooting}]
爆款属性：{metrics}",
        industry = info.industry,
        name = h.name,
        brand = info.brand_name,
        points = info.selling_points.join("、"),
        promotion = info.promotion_info,
        audience = info.target_audience,
        purpose = info.video_purpose,
        forbidden = info.forbidden_words,
        title = h.title,
        cover = h.cover,
        hook = h.hook,
        content = h.content,
        shooting = h.shooting,
        metrics = PERFORMANCE_METRICS,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Title,
    Cover,
    Hook,
    Content,
    Shooting,
    Metrics,
}

const SECTION_LABELS: [(Section, &str); 6] = [
    (Section::Title, "标题"),
    (Section::Cover, "封面建议"),
    (Section::Hook, "黄金3s钩子"),
    (Section::Content, "内容文案"),
    (Section::Shooting, "拍摄建议"),
    (Section::Metrics, "爆款属性"),
];

/// If `line` opens a section (`label：` or `label:`), return it and the rest.
fn section_start(line: &str) -> Option<(Section, &str)> {
    SECTION_LABELS.iter().find_map(|(section, label)| {
        let rest = line.strip_prefix(label)?;
        let rest = rest.strip_prefix('：').or_else(|| rest.strip_prefix(':'))?;
        Some((*section, rest.trim()))
    })
}

fn store_section(script: &mut ScriptContent, section: Section, lines: &[&str]) {
    let text = lines
        .iter()
        .filter(|l| !l.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let slot = match section {
        Section::Title => &mut script.title,
        Section::Cover => &mut script.cover_suggestion,
        Section::Hook => &mut script.hook,
        Section::Content => &mut script.content,
        Section::Shooting => &mut script.shooting_guide,
        Section::Metrics => &mut script.performance_metrics,
    };
    *slot = text;
}

/// Parse a labelled free-text reply into script sections.
pub fn parse_script_reply(reply: &str, template: ScriptTemplateType) -> ScriptContent {
    let mut script = ScriptContent::empty(template);
    let lines: Vec<&str> = reply.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut current: Option<(Section, Vec<&str>)> = None;
    for &line in &lines {
        if let Some((section, rest)) = section_start(line) {
            if let Some((prev, body)) = current.take() {
                store_section(&mut script, prev, &body);
            }
            current = Some((section, vec![rest]));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((prev, body)) = current {
        store_section(&mut script, prev, &body);
    }

    let has_colon = |l: &&&str| l.contains('：') || l.contains(':');
    if script.title.is_empty() {
        if let Some(first) = lines.first().filter(|l| !has_colon(l)) {
            script.title = first.to_string();
        }
    }
    if script.cover_suggestion.is_empty() {
        if let Some(second) = lines.get(1).filter(|l| !has_colon(l)) {
            script.cover_suggestion = second.to_string();
        }
    }

    script
}

/// Generates scripts through the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    client: ChatClient,
    timeout: Duration,
}

impl ScriptGenerator {
    pub fn new(client: ChatClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &LLMConfig) -> Option<Self> {
        ChatClient::from_config(config).map(|c| Self::new(c, config.generate_timeout()))
    }

    pub async fn generate(
        &self,
        info: &ProductInfo,
        template: ScriptTemplateType,
    ) -> Result<ScriptContent> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_script_prompt(info, template)),
        ];
        let options = CompletionOptions {
            temperature: 0.8,
            max_tokens: None,
            timeout: self.timeout,
        };

        let reply = self.client.complete(&messages, options).await?;
        Ok(parse_script_reply(&reply, template))
    }

    /// Generate every template concurrently. Failed templates are logged and
    /// left out.
    pub async fn generate_all(&self, info: &ProductInfo, session_id: &str) -> Vec<ScriptContent> {
        let results = join_all(
            ScriptTemplateType::ALL
                .iter()
                .map(|&template| async move { (template, self.generate(info, template).await) }),
        )
        .await;

        let scripts: Vec<ScriptContent> = results
            .into_iter()
            .filter_map(|(template, result)| match result {
                Ok(mut script) => {
                    script.session_id = session_id.to_string();
                    Some(script)
                }
                Err(e) => {
                    warn!("Generating {} script failed: {}", template_name(template), e);
                    None
                }
            })
            .collect();

        info!(
            "Generated {}/{} scripts for session {} with {}",
            scripts.len(),
            ScriptTemplateType::ALL.len(),
            session_id,
            self.client.model()
        );
        scripts
    }
}
