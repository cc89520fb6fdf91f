//! Server configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub maps: MapsConfig,
    #[serde(default)]
    pub commerce: CommerceConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorAppConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Optional LLM for classification and direct answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    rumbo_llm::openai::DEFAULT_MODEL.to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Maps MCP subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_maps_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub search_radius_m: Option<u32>,
    #[serde(default = "default_max_places")]
    pub max_places: usize,
}

fn default_maps_timeout() -> u64 {
    30
}

fn default_max_places() -> usize {
    5
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-google-maps".to_string(),
            ],
            request_timeout_secs: default_maps_timeout(),
            search_radius_m: None,
            max_places: default_max_places(),
        }
    }
}

/// Product pricing and payment intents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Currency of generated travel products
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_discount")]
    pub discount_percent: u8,
    /// Default currency of `/create-payment-intent`
    #[serde(default = "default_payment_currency")]
    pub payment_currency: String,
    pub return_url: String,
    #[serde(default = "default_commerce_timeout")]
    pub timeout_secs: u64,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_discount() -> u8 {
    rumbo_tools::commerce::DEFAULT_DISCOUNT_PERCENT
}

fn default_payment_currency() -> String {
    "mxn".to_string()
}

fn default_commerce_timeout() -> u64 {
    20
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            discount_percent: default_discount(),
            payment_currency: default_payment_currency(),
            return_url: "https://your-domain.com/payment-success".to_string(),
            timeout_secs: default_commerce_timeout(),
        }
    }
}

/// Which classifier routes queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Keyword,
    Llm,
}

/// Orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorAppConfig {
    #[serde(default)]
    pub classifier: ClassifierKind,
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub purchase_includes_info: bool,
}

fn default_tool_timeout() -> u64 {
    45
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorAppConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::default(),
            tool_timeout_secs: default_tool_timeout(),
            purchase_includes_info: true,
        }
    }
}
