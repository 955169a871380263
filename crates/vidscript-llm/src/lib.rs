//! vidscript LLM: DeepSeek chat client, AI product extraction and script
//! generation.

pub mod ai_parser;
pub mod client;
pub mod config;
pub mod scripts;

#[cfg(test)]
mod testing;

pub use ai_parser::{
    extract_product_info_with_ai, parse_ai_response, resolve, AiOutcome, AiParseResult, AiParser,
    Extraction, ExtractionSource, ProductParser,
};
pub use client::{ChatClient, ChatMessage, CompletionOptions};
pub use config::LLMConfig;
pub use scripts::{build_script_prompt, parse_script_reply, template_name, ScriptGenerator};
