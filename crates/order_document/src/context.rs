//! Per-render context and formatting switches

use crate::format::DEFAULT_DATE_FORMAT;
use crate::settings::DocumentSettings;
use serde::{Deserialize, Serialize};

/// Locale and date pattern for one render, passed explicitly by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Locale tag such as `de_CH` or `en`
    pub locale: String,
    /// strftime pattern for dates
    pub date_format: String,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new("en", DEFAULT_DATE_FORMAT)
    }
}

impl RenderContext {
    pub fn new(locale: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            date_format: date_format.into(),
        }
    }

    pub fn from_settings(settings: &DocumentSettings) -> Self {
        Self::new(settings.locale.clone(), settings.date_format.clone())
    }
}

/// How order values are turned into display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingOptions {
    /// Decode HTML entities in item names and surcharge labels
    pub decode_html: bool,
    /// Format prices with the price formatter instead of plain numbers
    pub format_prices: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            decode_html: true,
            format_prices: true,
        }
    }
}
