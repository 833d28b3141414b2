use crate::core::image_index::{ImageSet, INDEX_PLACEHOLDER};
use crate::core::ConfigProvider;
use crate::utils::error::{PhaseError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_MOUNT_PATH: &str = "/moon_images";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub images: ImagesConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Answer every error with 200 OK instead of 400/500.
    pub flat_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            flat_errors: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePreset {
    #[default]
    Detailed,
    Compact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub preset: ImagePreset,
    pub wax_scale: Option<f64>,
    pub wane_offset: Option<f64>,
    pub wane_scale: Option<f64>,
    pub min_index: Option<u32>,
    pub max_index: Option<u32>,
    pub url_template: Option<String>,
    /// Directory served under `mount_path`; nothing is served when unset.
    pub directory: Option<String>,
    pub mount_path: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            preset: ImagePreset::default(),
            wax_scale: None,
            wane_offset: None,
            wane_scale: None,
            min_index: None,
            max_index: None,
            url_template: None,
            directory: None,
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
        }
    }
}

impl ImagesConfig {
    /// Preset values with any explicit field layered on top.
    pub fn image_set(&self) -> ImageSet {
        let base = match self.preset {
            ImagePreset::Detailed => ImageSet::detailed(),
            ImagePreset::Compact => ImageSet::compact(),
        };

        ImageSet {
            wax_scale: self.wax_scale.unwrap_or(base.wax_scale),
            wane_offset: self.wane_offset.unwrap_or(base.wane_offset),
            wane_scale: self.wane_scale.unwrap_or(base.wane_scale),
            min_index: self.min_index.unwrap_or(base.min_index),
            max_index: self.max_index.unwrap_or(base.max_index),
            url_template: self.url_template.clone().unwrap_or(base.url_template),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PhaseError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PhaseError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${IMAGE_HOST})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PhaseError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn image_set(&self) -> ImageSet {
        self.images.image_set()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_socket_addr("server.bind", &self.server.bind)?;

        let images = self.image_set();
        validate_url_template("images.url_template", &images.url_template, INDEX_PLACEHOLDER)?;
        validate_range("images.wax_scale", images.wax_scale, 1.0, 10_000.0)?;
        validate_range("images.wane_offset", images.wane_offset, 0.0, 10_000.0)?;
        validate_range("images.wane_scale", images.wane_scale, 1.0, 10_000.0)?;
        validate_range("images.min_index", images.min_index, 0, images.max_index)?;

        // Indices the formulas can reach; outside the bounds the request fails at runtime.
        let reachable_max = (images.wane_offset + images.wane_scale).round_ties_even();
        if reachable_max > f64::from(images.max_index) {
            tracing::warn!(
                "⚠️ images.max_index {} is below the largest reachable index {}",
                images.max_index,
                reachable_max
            );
        }

        validate_mount_path("images.mount_path", &self.images.mount_path)?;
        if let Some(directory) = &self.images.directory {
            validate_path("images.directory", directory)?;
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(PhaseError::InvalidConfigValueError {
                field: "cors.allowed_origins".to_string(),
                value: "[]".to_string(),
                reason: "At least one origin (or \"*\") is required".to_string(),
            });
        }
        for origin in &self.cors.allowed_origins {
            validate_origin("cors.allowed_origins", origin)?;
        }

        if let Some(level) = &self.logging.level {
            validate_non_empty_string("logging.level", level)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn bind_address(&self) -> &str {
        &self.server.bind
    }

    fn flat_errors(&self) -> bool {
        self.server.flat_errors
    }

    fn image_directory(&self) -> Option<&str> {
        self.images.directory.as_deref()
    }

    fn image_mount_path(&self) -> &str {
        &self.images.mount_path
    }

    fn allowed_origins(&self) -> &[String] {
        &self.cors.allowed_origins
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
