pub mod taxonomy;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use anyhow::Result;

pub use taxonomy::Taxonomy;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrConfig {
    /// tesseract 可执行文件路径，默认取 PATH 中的 tesseract
    pub tesseract_path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/settings.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                database_path: "./data/questions.db".to_string(),
            },
            ocr: OcrConfig {
                tesseract_path: "tesseract".to_string(),
            },
        }
    }
}
