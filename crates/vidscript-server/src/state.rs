//! Shared application state.

use tracing::{info, warn};
use vidscript_core::{AppConfig, MatchStrategy};
use vidscript_llm::{AiParser, LLMConfig, ScriptGenerator};
use vidscript_store::ScriptStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: AppConfig,
    pub store: ScriptStore,
    pub parser: AiParser,
    /// `None` when no DeepSeek API key is configured.
    pub generator: Option<ScriptGenerator>,
}

impl AppState {
    /// Build state from config, loading the LLM settings from the data directory.
    pub fn new(config: AppConfig, store: ScriptStore) -> Self {
        let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
        if llm_config.is_configured() {
            info!("LLM configured: model={}", llm_config.model);
        } else {
            warn!("No DeepSeek API key configured; AI extraction and script generation disabled");
        }

        let parser = AiParser::from_config(&llm_config, config.match_strategy);
        let generator = ScriptGenerator::from_config(&llm_config);
        Self::with_llm(config, store, parser, generator)
    }

    pub fn with_llm(
        config: AppConfig,
        store: ScriptStore,
        parser: AiParser,
        generator: Option<ScriptGenerator>,
    ) -> Self {
        Self {
            config,
            store,
            parser,
            generator,
        }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.config.match_strategy
    }
}
