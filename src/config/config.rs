use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub behavior: BehaviorConfig,
}

/// Which result renderer to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Hand-built header/body table with synchronized column widths
    Manual,
    /// Delegate to the comfy-table grid widget
    Grid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Result renderer capability flag
    pub renderer: RendererKind,

    /// Show row numbers in the results table
    pub show_row_numbers: bool,

    /// Maximum rows to render before truncating the view
    pub max_display_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for exported files; defaults to the current directory
    pub directory: Option<PathBuf>,

    /// Stem for generated export filenames
    pub filename_stem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Execute the basic search automatically after a database loads
    pub execute_on_load: bool,

    /// Include duplicate files by default in the basic search form
    pub include_duplicates_default: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::Manual,
            show_row_numbers: false,
            max_display_rows: 10000,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            filename_stem: "catalog_search".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            execute_on_load: false,
            include_duplicates_default: true,
        }
    }
}

impl Config {
    /// Load config from the default location, creating it on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("catalog-search").join("config.toml"))
    }

    /// Directory where exports land
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.renderer, RendererKind::Manual);
        assert!(config.behavior.include_duplicates_default);
        assert_eq!(config.export.filename_stem, "catalog_search");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.display.renderer, parsed.display.renderer);
        assert_eq!(
            config.display.max_display_rows,
            parsed.display.max_display_rows
        );
    }

    #[test]
    fn test_renderer_flag_round_trip() {
        let parsed: Config = toml::from_str("[display]\nrenderer = \"grid\"\n").unwrap();
        assert_eq!(parsed.display.renderer, RendererKind::Grid);
    }
}
