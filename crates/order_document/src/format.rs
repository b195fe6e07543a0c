//! Price and date formatting
//!
//! The renderer treats both as opaque string producers. The defaults here
//! cover the common shop setups; hosts with their own currency rules plug in
//! their own [`PriceFormatter`].

use crate::context::RenderContext;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Formats a monetary amount for display
pub trait PriceFormatter: Send + Sync {
    fn format_price(&self, amount: f64, ctx: &RenderContext) -> String;
}

/// Formats a point in time for display
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, at: DateTime<Utc>, ctx: &RenderContext) -> String;
}

/// Where the currency symbol goes relative to the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPosition {
    #[default]
    Left,
    Right,
}

/// Decimal and thousands separators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberSeparators {
    pub decimal: String,
    pub thousands: String,
}

impl NumberSeparators {
    fn new(decimal: &str, thousands: &str) -> Self {
        Self {
            decimal: decimal.to_string(),
            thousands: thousands.to_string(),
        }
    }

    /// Separators conventionally used for a locale such as `de_CH` or `en-US`
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.replace('-', "_").to_lowercase();
        let (language, region) = match normalized.split_once('_') {
            Some((language, region)) => (language.to_string(), Some(region.to_string())),
            None => (normalized.clone(), None),
        };

        match (language.as_str(), region.as_deref()) {
            (_, Some("ch")) | (_, Some("li")) => Self::new(".", "'"),
            ("de", _) | ("nl", _) | ("it", _) | ("es", _) | ("pt", _) | ("da", _) => {
                Self::new(",", ".")
            }
            ("fr", _) | ("sv", _) | ("nb", _) | ("fi", _) | ("pl", _) | ("cs", _) => {
                Self::new(",", "\u{a0}")
            }
            _ => Self::new(".", ","),
        }
    }
}

/// Default price formatter: fixed precision, grouped thousands, currency symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyFormatter {
    /// Symbol or ISO code, e.g. `CHF` or `€`; empty for none
    pub symbol: String,
    pub position: CurrencyPosition,
    pub precision: usize,
    /// Fixed separators; when unset they follow the render locale
    pub separators: Option<NumberSeparators>,
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            position: CurrencyPosition::Left,
            precision: 2,
            separators: None,
        }
    }
}

impl CurrencyFormatter {
    pub fn new(symbol: impl Into<String>, position: CurrencyPosition) -> Self {
        Self {
            symbol: symbol.into(),
            position,
            ..Default::default()
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_separators(mut self, decimal: &str, thousands: &str) -> Self {
        self.separators = Some(NumberSeparators::new(decimal, thousands));
        self
    }

    /// Format the bare number without currency symbol
    pub fn format_number(&self, amount: f64, separators: &NumberSeparators) -> String {
        let formatted = format!("{:.*}", self.precision, amount.abs());
        let (int_part, frac_part) = match formatted.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (formatted.as_str(), None),
        };

        let mut out = String::new();
        let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
        if amount < 0.0 && !is_zero {
            out.push('-');
        }

        let digits = int_part.len();
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (digits - i) % 3 == 0 {
                out.push_str(&separators.thousands);
            }
            out.push(ch);
        }

        if let Some(frac) = frac_part {
            out.push_str(&separators.decimal);
            out.push_str(frac);
        }
        out
    }
}

impl PriceFormatter for CurrencyFormatter {
    fn format_price(&self, amount: f64, ctx: &RenderContext) -> String {
        let separators = self
            .separators
            .clone()
            .unwrap_or_else(|| NumberSeparators::for_locale(&ctx.locale));
        let number = self.format_number(amount, &separators);

        if self.symbol.is_empty() {
            return number;
        }
        match self.position {
            CurrencyPosition::Left => format!("{} {}", self.symbol, number),
            CurrencyPosition::Right => format!("{} {}", number, self.symbol),
        }
    }
}

/// Default date pattern (strftime syntax)
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Date formatter using chrono strftime patterns from the render context
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoDateFormatter;

impl ChronoDateFormatter {
    /// Check that a strftime pattern is usable
    pub fn is_valid_pattern(pattern: &str) -> bool {
        !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
    }
}

impl DateFormatter for ChronoDateFormatter {
    fn format_date(&self, at: DateTime<Utc>, ctx: &RenderContext) -> String {
        let pattern = if Self::is_valid_pattern(&ctx.date_format) {
            ctx.date_format.as_str()
        } else {
            tracing::warn!(
                pattern = %ctx.date_format,
                "Invalid date format, falling back to {}",
                DEFAULT_DATE_FORMAT
            );
            DEFAULT_DATE_FORMAT
        };
        at.format(pattern).to_string()
    }
}
