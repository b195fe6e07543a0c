//! Order Documents
//!
//! Renders shop orders (invoices, delivery notes) into Word templates.
//!
//! A template carries flat placeholders such as `${order_total}` and table
//! rows anchored by a row group placeholder such as `${item_name}`. Each
//! anchored row is cloned once per record and its placeholders are indexed
//! (`${item_name#1}`, `${item_name#2}`, ...).
//!
//! # Placeholders
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `order_date` | Lock time of the order |
//! | `order_total`, `order_subtotal` | Formatted totals |
//! | `document_number` | Document number, when assigned |
//! | `due_date` | Order date plus the configured payment term |
//! | `billing_*` | Billing address fields |
//! | `item_name`, `item_quantity`, `item_price`, `item_total_price`, `item_options` | Line item rows |
//! | `surcharge_label`, `surcharge_price`, `surcharge_total_price` | Surcharge rows |
//!
//! Orders that provide notification tokens add those as flat placeholders too.

pub mod context;
pub mod document;
pub mod error;
pub mod format;
pub mod order;
pub mod renderer;
pub mod row_group;
pub mod settings;
pub mod value;

pub use context::{FormattingOptions, RenderContext};
pub use document::{
    expand_tokens, sanitize_file_stem, starter_template, DownloadArtifact, WordTemplateDocument,
};
pub use error::{RenderError, Result};
pub use format::{
    ChronoDateFormatter, CurrencyFormatter, CurrencyPosition, DateFormatter, NumberSeparators,
    PriceFormatter, DEFAULT_DATE_FORMAT,
};
pub use order::{Address, ItemOption, ItemOrdering, LineItem, OrderCollection, OrderSnapshot, Surcharge};
pub use renderer::{GroupReport, RenderReport, TemplateDocument, TemplateRenderer};
pub use row_group::RowGroup;
pub use settings::{CurrencySettings, DocumentSettings, SettingsManager};
pub use value::{row_record, PlaceholderMap, RowRecord, Value};
