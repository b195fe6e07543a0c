//! Document settings
//!
//! Settings are stored as JSON. Every field has a default, so partial files
//! are accepted; a file that cannot be parsed falls back to defaults with a
//! warning.

use crate::context::FormattingOptions;
use crate::format::{CurrencyFormatter, CurrencyPosition, DEFAULT_DATE_FORMAT};
use crate::order::ItemOrdering;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of one order document type (e.g. "Invoice")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentSettings {
    /// The .docx template; rendering fails without one
    pub template_path: Option<PathBuf>,
    /// File name pattern; `##token##` is replaced with placeholder values
    pub file_title: String,
    /// Sort order of line items
    pub order_collection_by: ItemOrdering,
    /// Locale tag such as `de_CH`
    pub locale: String,
    /// strftime pattern for dates
    pub date_format: String,
    /// Payment term; adds a `due_date` placeholder when set
    pub due_days: Option<u32>,
    pub currency: CurrencySettings,
    pub formatting: FormattingOptions,
    /// Directory for download artifacts; the system temp dir when unset
    pub tmp_dir: Option<PathBuf>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            template_path: None,
            file_title: "order_##document_number##".to_string(),
            order_collection_by: ItemOrdering::AsIs,
            locale: "en".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            due_days: None,
            currency: CurrencySettings::default(),
            formatting: FormattingOptions::default(),
            tmp_dir: None,
        }
    }
}

impl DocumentSettings {
    /// Settings for the given template with everything else defaulted
    pub fn with_template(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: Some(template_path.into()),
            ..Default::default()
        }
    }

    /// Directory used by downloads
    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Currency display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurrencySettings {
    /// Symbol or ISO code, e.g. `CHF`
    pub symbol: String,
    pub position: CurrencyPosition,
    /// Decimal places
    pub precision: usize,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            position: CurrencyPosition::Left,
            precision: 2,
        }
    }
}

impl CurrencySettings {
    /// The default price formatter for these settings
    pub fn formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(self.symbol.clone(), self.position).with_precision(self.precision)
    }
}

/// Loads and saves [`DocumentSettings`] from a JSON file
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: DocumentSettings,
}

impl SettingsManager {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: DocumentSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_sync(&mut self) -> Result<&DocumentSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<DocumentSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.settings_path.display(),
                        "Failed to parse settings file, using defaults: {}",
                        e
                    );
                    self.current = DocumentSettings::default();
                }
            }
        } else {
            self.current = DocumentSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &DocumentSettings {
        &self.current
    }

    /// Replace settings and save to disk
    pub fn update_sync(&mut self, settings: DocumentSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }
}
