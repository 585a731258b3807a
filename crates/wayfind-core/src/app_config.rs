use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Grounding tool requested from the model alongside the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroundingTool {
    /// Map-provider grounding; yields map citations.
    #[default]
    GoogleMaps,
    /// Web search grounding; yields web citations.
    GoogleSearch,
    /// No grounding; every proposed map link ends up unverified.
    None,
}

impl fmt::Display for GroundingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroundingTool::GoogleMaps => write!(f, "maps"),
            GroundingTool::GoogleSearch => write!(f, "search"),
            GroundingTool::None => write!(f, "none"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub grounding: GroundingTool,
    pub request_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
    pub retry_jitter: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("grounding", &self.grounding)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_initial_delay_ms", &self.retry_initial_delay_ms)
            .field("retry_jitter", &self.retry_jitter)
            .finish()
    }
}
