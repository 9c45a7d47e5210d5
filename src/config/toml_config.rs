use crate::core::city_hub::CityHubTable;
use crate::core::retry::{
    RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
};
use crate::core::ConfigProvider;
use crate::utils::error::{HubError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.bowlinghub.example/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Extra city -> hub path entries layered over the builtin table.
    #[serde(default)]
    pub city_hubs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HubError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${API_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HubError::InvalidConfigValueError {
            field: "environment".to_string(),
            value: content.to_string(),
            reason: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn build_retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(
            self.retry.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            self.retry.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS),
            self.retry.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
        )
    }

    /// The builtin hub table plus any `[city_hubs]` entries.
    pub fn city_hub_table(&self) -> Result<CityHubTable> {
        CityHubTable::with_overrides(self.city_hub_overrides())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", self.api_base_url())?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(max_retries) = self.retry.max_retries {
            validate_range("retry.max_retries", max_retries, 0, 10)?;
        }

        self.build_retry_policy()?;
        self.city_hub_table()?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.build_retry_policy().unwrap_or_else(|e| {
            tracing::warn!("⚠️ Invalid retry settings, using defaults: {}", e);
            RetryPolicy::default()
        })
    }

    fn city_hub_overrides(&self) -> Vec<(String, String)> {
        self.city_hubs
            .iter()
            .map(|(city, path)| (city.clone(), path.clone()))
            .collect()
    }
}
