//! Script, session and template types matching the web client's API surface.

use serde::{Deserialize, Serialize};

/// One of the six script templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTemplateType {
    ProblemSolution,
    ProductShowcase,
    StoryTelling,
    Comparison,
    Tutorial,
    Testimonial,
}

impl ScriptTemplateType {
    pub const ALL: [ScriptTemplateType; 6] = [
        Self::ProblemSolution,
        Self::ProductShowcase,
        Self::StoryTelling,
        Self::Comparison,
        Self::Tutorial,
        Self::Testimonial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProblemSolution => "problem_solution",
            Self::ProductShowcase => "product_showcase",
            Self::StoryTelling => "story_telling",
            Self::Comparison => "comparison",
            Self::Tutorial => "tutorial",
            Self::Testimonial => "testimonial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for ScriptTemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated (and possibly user-edited) script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub session_id: String,
    pub template_type: ScriptTemplateType,
    pub title: String,
    pub cover_suggestion: String,
    pub hook: String,
    pub content: String,
    pub shooting_guide: String,
    pub performance_metrics: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ScriptContent {
    /// Empty script shell for a template; sections are filled by the reply parser.
    pub fn empty(template_type: ScriptTemplateType) -> Self {
        Self {
            id: None,
            session_id: String::new(),
            template_type,
            title: String::new(),
            cover_suggestion: String::new(),
            hook: String::new(),
            content: String::new(),
            shooting_guide: String::new(),
            performance_metrics: String::new(),
            created_at: None,
        }
    }
}

/// Partial edit of a script's text sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptUpdate {
    pub title: Option<String>,
    pub cover_suggestion: Option<String>,
    pub hook: Option<String>,
    pub content: Option<String>,
    pub shooting_guide: Option<String>,
    pub performance_metrics: Option<String>,
}

impl ScriptUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.cover_suggestion.is_none()
            && self.hook.is_none()
            && self.content.is_none()
            && self.shooting_guide.is_none()
            && self.performance_metrics.is_none()
    }
}

/// A script-generation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_type_wire_names() {
        let json = serde_json::to_string(&ScriptTemplateType::StoryTelling).unwrap();
        assert_eq!(json, "\"story_telling\"");
        assert_eq!(ScriptTemplateType::parse("tutorial"), Some(ScriptTemplateType::Tutorial));
        assert_eq!(ScriptTemplateType::parse("unboxing"), None);
    }

    #[test]
    fn test_script_update_is_empty() {
        assert!(ScriptUpdate::default().is_empty());
        let update: ScriptUpdate = serde_json::from_str(r#"{"shootingGuide":"近景"}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.shooting_guide.as_deref(), Some("近景"));
    }
}
