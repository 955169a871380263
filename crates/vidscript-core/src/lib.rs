//! vidscript core: canonical product/script types, configuration, errors.

pub mod config;
pub mod error;
pub mod product;
pub mod script;

pub use config::{AppConfig, DataPaths, MatchStrategy};
pub use error::{Error, Result};
pub use product::{ExtractedFields, Industry, Platform, ProductInfo, VideoPurpose};
pub use script::{ScriptContent, ScriptTemplateType, ScriptUpdate, Session};
