//! Word template order document
//!
//! [`WordTemplateDocument`] turns an [`OrderCollection`] into the placeholder
//! map and row groups understood by the [`TemplateRenderer`], renders the
//! configured template and writes the result.

use crate::context::RenderContext;
use crate::error::{RenderError, Result};
use crate::format::{ChronoDateFormatter, DateFormatter, PriceFormatter};
use crate::order::{LineItem, OrderCollection, Surcharge};
use crate::renderer::{RenderReport, TemplateRenderer};
use crate::row_group::RowGroup;
use crate::settings::DocumentSettings;
use crate::value::{row_record, PlaceholderMap, RowRecord, Value};
use docx_template::{DocxBuilder, DocxResult, TemplateProcessor};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Row group prefix and anchor field for line items
pub const ITEM_PREFIX: &str = "item_";
pub const ITEM_ANCHOR: &str = "name";
/// Row group prefix and anchor field for surcharges
pub const SURCHARGE_PREFIX: &str = "surcharge_";
pub const SURCHARGE_ANCHOR: &str = "label";

const FALLBACK_FILE_STEM: &str = "document";

/// A rendered file waiting to be handed to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    /// Where the rendered document was written
    pub path: PathBuf,
    /// File name to offer for the attachment
    pub file_name: String,
}

/// An order document type backed by a Word template
pub struct WordTemplateDocument {
    settings: DocumentSettings,
    price_formatter: Box<dyn PriceFormatter>,
    date_formatter: Box<dyn DateFormatter>,
    renderer: TemplateRenderer,
}

impl WordTemplateDocument {
    /// Create a document with the default formatters for `settings`
    pub fn new(settings: DocumentSettings) -> Self {
        let price_formatter = Box::new(settings.currency.formatter());
        Self {
            settings,
            price_formatter,
            date_formatter: Box::new(ChronoDateFormatter),
            renderer: TemplateRenderer::new(),
        }
    }

    /// Use a host-provided price formatter
    pub fn with_price_formatter(mut self, formatter: impl PriceFormatter + 'static) -> Self {
        self.price_formatter = Box::new(formatter);
        self
    }

    /// Use a host-provided date formatter
    pub fn with_date_formatter(mut self, formatter: impl DateFormatter + 'static) -> Self {
        self.date_formatter = Box::new(formatter);
        self
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// Flat placeholders for an order.
    ///
    /// Notification tokens are applied last and win over computed values of
    /// the same name.
    pub fn build_placeholders<O>(&self, order: &O, ctx: &RenderContext) -> PlaceholderMap
    where
        O: OrderCollection + ?Sized,
    {
        let mut placeholders = PlaceholderMap::new();
        let locked_at = order.lock_time();

        placeholders.insert("order_date", self.date_formatter.format_date(locked_at, ctx));
        placeholders.insert("order_total", self.amount(order.total(), ctx));
        placeholders.insert("order_subtotal", self.amount(order.subtotal(), ctx));

        if let Some(number) = order.document_number() {
            placeholders.insert("document_number", number);
        }

        if let Some(days) = self.settings.due_days {
            let due = locked_at + chrono::Duration::days(i64::from(days));
            placeholders.insert("due_date", self.date_formatter.format_date(due, ctx));
        }

        if let Some(address) = order.billing_address() {
            placeholders.insert("billing_company", &address.company);
            placeholders.insert("billing_salutation", &address.salutation);
            placeholders.insert("billing_firstname", &address.firstname);
            placeholders.insert("billing_lastname", &address.lastname);
            placeholders.insert("billing_street", &address.street_1);
            placeholders.insert("billing_postal", &address.postal);
            placeholders.insert("billing_city", &address.city);
            placeholders.insert("billing_country", &address.country);
        }

        if let Some(tokens) = order.notification_tokens() {
            tracing::trace!(tokens = tokens.len(), "Adding notification tokens");
            placeholders.extend(tokens);
        }

        placeholders
    }

    /// The items and surcharges row groups, in that order
    pub fn build_row_groups<O>(&self, order: &O, ctx: &RenderContext) -> Vec<RowGroup>
    where
        O: OrderCollection + ?Sized,
    {
        let mut items = RowGroup::new(ITEM_PREFIX, ITEM_ANCHOR);
        for item in self.settings.order_collection_by.sort(order.items()) {
            items.push(self.item_record(item, ctx));
        }

        let mut surcharges = RowGroup::new(SURCHARGE_PREFIX, SURCHARGE_ANCHOR);
        for surcharge in order.surcharges() {
            surcharges.push(self.surcharge_record(surcharge, ctx));
        }

        vec![items, surcharges]
    }

    /// File name for the rendered document, e.g. `invoice_2024-17.docx`
    pub fn prepare_file_name<O>(&self, order: &O, ctx: &RenderContext) -> String
    where
        O: OrderCollection + ?Sized,
    {
        self.file_name_for(&self.build_placeholders(order, ctx))
    }

    /// Render the configured template for an order and return the .docx bytes
    pub fn generate<O>(&self, order: &O, ctx: &RenderContext) -> Result<Vec<u8>>
    where
        O: OrderCollection + ?Sized,
    {
        let (bytes, _, _) = self.render(order, ctx)?;
        Ok(bytes)
    }

    /// Render into `dir` under the prepared file name.
    ///
    /// The file is written to a temporary file in `dir` first and then
    /// renamed, so a failed render never leaves a partial document behind.
    pub fn output_to_file<O>(&self, order: &O, ctx: &RenderContext, dir: &Path) -> Result<PathBuf>
    where
        O: OrderCollection + ?Sized,
    {
        let (bytes, file_name, _) = self.render(order, ctx)?;
        let path = dir.join(&file_name);
        write_atomically(dir, &path, &bytes)?;

        tracing::info!(path = %path.display(), "Wrote order document");
        Ok(path)
    }

    /// Render into a uniquely named file in the temporary directory
    pub fn output_for_download<O>(&self, order: &O, ctx: &RenderContext) -> Result<DownloadArtifact>
    where
        O: OrderCollection + ?Sized,
    {
        let (bytes, file_name, _) = self.render(order, ctx)?;
        let dir = self.settings.tmp_dir();
        let path = dir.join(format!("{}.docx", Uuid::new_v4()));
        write_atomically(&dir, &path, &bytes)?;

        tracing::info!(path = %path.display(), file_name = %file_name, "Prepared order document download");
        Ok(DownloadArtifact { path, file_name })
    }

    fn render<O>(&self, order: &O, ctx: &RenderContext) -> Result<(Vec<u8>, String, RenderReport)>
    where
        O: OrderCollection + ?Sized,
    {
        let mut template = self.open_template()?;
        let placeholders = self.build_placeholders(order, ctx);
        let row_groups = self.build_row_groups(order, ctx);

        let report = self.renderer.render(&mut template, &placeholders, &row_groups)?;
        let bytes = template.save_to_bytes()?;
        let file_name = self.file_name_for(&placeholders);

        tracing::debug!(
            file_name = %file_name,
            items = order.items().len(),
            surcharges = order.surcharges().len(),
            "Rendered order document"
        );
        Ok((bytes, file_name, report))
    }

    fn open_template(&self) -> Result<TemplateProcessor> {
        let path = match &self.settings.template_path {
            Some(path) if path.is_file() => path,
            Some(path) => {
                tracing::warn!(path = %path.display(), "Configured template does not exist");
                return Err(RenderError::TemplateMissing);
            }
            None => return Err(RenderError::TemplateMissing),
        };
        TemplateProcessor::open(path).map_err(RenderError::TemplateUnreadable)
    }

    fn file_name_for(&self, placeholders: &PlaceholderMap) -> String {
        let title = expand_tokens(&self.settings.file_title, placeholders);
        format!("{}.docx", sanitize_file_stem(&title))
    }

    fn item_record(&self, item: &LineItem, ctx: &RenderContext) -> RowRecord {
        row_record([
            ("name", Value::from(self.text(&item.name))),
            ("quantity", Value::from(item.quantity)),
            ("price", Value::from(self.amount(item.price, ctx))),
            ("total_price", Value::from(self.amount(item.total_price, ctx))),
            ("options", Value::from(self.text(&item.options_text()))),
        ])
    }

    fn surcharge_record(&self, surcharge: &Surcharge, ctx: &RenderContext) -> RowRecord {
        row_record([
            ("label", Value::from(self.text(&surcharge.label))),
            ("price", Value::from(self.amount(surcharge.price, ctx))),
            ("total_price", Value::from(self.amount(surcharge.total_price, ctx))),
        ])
    }

    fn amount(&self, amount: f64, ctx: &RenderContext) -> String {
        if self.settings.formatting.format_prices {
            self.price_formatter.format_price(amount, ctx)
        } else {
            format!("{:.2}", amount)
        }
    }

    fn text(&self, text: &str) -> String {
        if self.settings.formatting.decode_html {
            html_escape::decode_html_entities(text).into_owned()
        } else {
            text.to_string()
        }
    }
}

/// Replace `##name##` tokens with placeholder values; unknown tokens become empty
pub fn expand_tokens(pattern: &str, placeholders: &PlaceholderMap) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("##") {
        let after = &rest[start + 2..];
        let Some(len) = after.find("##") else {
            break;
        };
        out.push_str(&rest[..start]);
        if let Some(value) = placeholders.get(&after[..len]) {
            out.push_str(&value.to_string_value());
        }
        rest = &after[len + 2..];
    }

    out.push_str(rest);
    out
}

/// Reduce a title to a file stem safe on every platform
pub fn sanitize_file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for ch in title.chars() {
        let ch = if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            ch
        } else {
            '_'
        };
        if ch == '_' && stem.ends_with('_') {
            continue;
        }
        stem.push(ch);
    }

    let stem = stem.trim_matches(|c| c == '_' || c == '.');
    if stem.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        stem.to_string()
    }
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A minimal invoice template using every placeholder the document fills
pub fn starter_template() -> DocxResult<Vec<u8>> {
    DocxBuilder::new()
        .paragraph("${billing_company}")
        .paragraph("${billing_salutation} ${billing_firstname} ${billing_lastname}")
        .paragraph("${billing_street}")
        .paragraph("${billing_postal} ${billing_city}")
        .paragraph("${billing_country}")
        .paragraph("Invoice ${document_number}")
        .paragraph("Date: ${order_date}")
        .paragraph("Due: ${due_date}")
        .table(&[
            &["Quantity", "Product", "Price", "Total"],
            &["${item_quantity}", "${item_name}", "${item_price}", "${item_total_price}"],
        ])
        .paragraph("Subtotal: ${order_subtotal}")
        .table(&[&["${surcharge_label}", "${surcharge_price}", "${surcharge_total_price}"]])
        .paragraph("Total: ${order_total}")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{CurrencyFormatter, CurrencyPosition};
    use crate::order::{Address, ItemOrdering, OrderSnapshot};
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    fn order() -> OrderSnapshot {
        OrderSnapshot {
            document_number: Some("2024-17".to_string()),
            locked_at: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            items: vec![
                LineItem {
                    id: 1,
                    name: "Salt &amp; Pepper".to_string(),
                    quantity: 2,
                    price: 10.0,
                    total_price: 20.0,
                    added_at: None,
                    options: Vec::new(),
                },
                LineItem {
                    id: 2,
                    name: "Apron".to_string(),
                    quantity: 1,
                    price: 35.5,
                    total_price: 35.5,
                    added_at: None,
                    options: Vec::new(),
                },
            ],
            surcharges: vec![Surcharge {
                label: "Shipping".to_string(),
                price: 5.0,
                total_price: 5.0,
            }],
            billing_address: Some(Address {
                company: "ACME".to_string(),
                firstname: "Alex".to_string(),
                lastname: "Muster".to_string(),
                city: "Bern".to_string(),
                ..Default::default()
            }),
            subtotal: 55.5,
            total: 60.5,
            notification_tokens: None,
        }
    }

    fn write_template(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("invoice.docx");
        std::fs::write(&path, starter_template().unwrap()).unwrap();
        path
    }

    fn text(map: &PlaceholderMap, name: &str) -> String {
        map.get(name).map(|v| v.to_string_value()).unwrap_or_default()
    }

    #[test]
    fn test_build_placeholders() {
        let mut settings = DocumentSettings::default();
        settings.due_days = Some(28);
        let document = WordTemplateDocument::new(settings);

        let placeholders = document.build_placeholders(&order(), &RenderContext::default());

        assert_eq!(text(&placeholders, "order_date"), "05.01.2024");
        assert_eq!(text(&placeholders, "due_date"), "02.02.2024");
        assert_eq!(text(&placeholders, "order_total"), "60.50");
        assert_eq!(text(&placeholders, "document_number"), "2024-17");
        assert_eq!(text(&placeholders, "billing_company"), "ACME");
        assert_eq!(text(&placeholders, "billing_street"), "");
    }

    #[test]
    fn test_no_due_date_without_payment_term() {
        let document = WordTemplateDocument::new(DocumentSettings::default());
        let placeholders = document.build_placeholders(&order(), &RenderContext::default());
        assert!(!placeholders.contains("due_date"));
    }

    #[test]
    fn test_notification_tokens_override_computed_values() {
        let mut order = order();
        order.notification_tokens = Some(
            PlaceholderMap::new()
                .with("order_date", "yesterday")
                .with("payment_method", "Invoice"),
        );
        let document = WordTemplateDocument::new(DocumentSettings::default());

        let placeholders = document.build_placeholders(&order, &RenderContext::default());

        assert_eq!(text(&placeholders, "order_date"), "yesterday");
        assert_eq!(text(&placeholders, "payment_method"), "Invoice");
    }

    #[test]
    fn test_row_groups_decode_and_format() {
        let mut settings = DocumentSettings::default();
        settings.order_collection_by = ItemOrdering::AscName;
        let document = WordTemplateDocument::new(settings)
            .with_price_formatter(CurrencyFormatter::new("CHF", CurrencyPosition::Left));

        let groups = document.build_row_groups(&order(), &RenderContext::new("de_CH", "%d.%m.%Y"));

        let items = &groups[0];
        assert_eq!(items.anchor_placeholder(), "item_name");
        assert_eq!(items.records[0]["name"].to_string_value(), "Apron");
        assert_eq!(items.records[1]["name"].to_string_value(), "Salt & Pepper");
        assert_eq!(items.records[1]["total_price"].to_string_value(), "CHF 20.00");
        assert_eq!(items.records[1]["quantity"].to_string_value(), "2");

        let surcharges = &groups[1];
        assert_eq!(surcharges.anchor_placeholder(), "surcharge_label");
        assert_eq!(surcharges.len(), 1);
    }

    #[test]
    fn test_formatting_switches_off() {
        let mut settings = DocumentSettings::default();
        settings.formatting.decode_html = false;
        settings.formatting.format_prices = false;
        let document = WordTemplateDocument::new(settings)
            .with_price_formatter(CurrencyFormatter::new("CHF", CurrencyPosition::Left));

        let groups = document.build_row_groups(&order(), &RenderContext::default());

        assert_eq!(groups[0].records[0]["name"].to_string_value(), "Salt &amp; Pepper");
        assert_eq!(groups[0].records[1]["price"].to_string_value(), "35.50");
    }

    #[test]
    fn test_custom_date_formatter() {
        struct IsoDate;
        impl DateFormatter for IsoDate {
            fn format_date(&self, at: DateTime<Utc>, _ctx: &RenderContext) -> String {
                at.to_rfc3339()
            }
        }

        let document =
            WordTemplateDocument::new(DocumentSettings::default()).with_date_formatter(IsoDate);
        let placeholders = document.build_placeholders(&order(), &RenderContext::default());
        assert_eq!(text(&placeholders, "order_date"), "2024-01-05T10:00:00+00:00");
    }

    #[test]
    fn test_expand_tokens() {
        let placeholders = PlaceholderMap::new().with("document_number", "17").with("city", "Bern");
        assert_eq!(expand_tokens("invoice_##document_number##", &placeholders), "invoice_17");
        assert_eq!(expand_tokens("##city##-##unknown##", &placeholders), "Bern-");
        assert_eq!(expand_tokens("open ##end", &placeholders), "open ##end");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Invoice 2024/17"), "Invoice_2024_17");
        assert_eq!(sanitize_file_stem("a  :: b"), "a_b");
        assert_eq!(sanitize_file_stem("Rechnung_Müller"), "Rechnung_Müller");
        assert_eq!(sanitize_file_stem("../"), "document");
    }

    #[test]
    fn test_prepare_file_name() {
        let mut settings = DocumentSettings::default();
        settings.file_title = "Invoice ##document_number## ##billing_lastname##".to_string();
        let document = WordTemplateDocument::new(settings);

        assert_eq!(
            document.prepare_file_name(&order(), &RenderContext::default()),
            "Invoice_2024-17_Muster.docx"
        );
    }

    #[test]
    fn test_generate_without_template() {
        let document = WordTemplateDocument::new(DocumentSettings::default());
        let err = document.generate(&order(), &RenderContext::default()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateMissing));
    }

    #[test]
    fn test_generate_with_missing_template_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = DocumentSettings::with_template(temp_dir.path().join("nope.docx"));
        let err = WordTemplateDocument::new(settings)
            .generate(&order(), &RenderContext::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateMissing));
    }

    #[test]
    fn test_generate_with_unreadable_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = WordTemplateDocument::new(DocumentSettings::with_template(path))
            .generate(&order(), &RenderContext::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateUnreadable(_)));
    }

    #[test]
    fn test_generate_renders_starter_template() {
        let temp_dir = TempDir::new().unwrap();
        let document = WordTemplateDocument::new(DocumentSettings::with_template(write_template(&temp_dir)));

        let bytes = document.generate(&order(), &RenderContext::default()).unwrap();
        let rendered = TemplateProcessor::from_bytes(&bytes).unwrap();
        let xml = rendered.main_xml();

        assert!(xml.contains("Salt &amp; Pepper"));
        assert!(xml.contains("Apron"));
        assert!(xml.contains("Shipping"));
        assert!(xml.contains("Total: 60.50"));
        assert!(!rendered.has_placeholder("item_name"));
        // No payment term configured, so the due date stays a placeholder
        assert_eq!(rendered.variables(), vec!["due_date".to_string()]);
    }

    #[test]
    fn test_output_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("out");
        let document = WordTemplateDocument::new(DocumentSettings::with_template(write_template(&temp_dir)));

        let path = document
            .output_to_file(&order(), &RenderContext::default(), &out_dir)
            .unwrap();

        assert_eq!(path, out_dir.join("order_2024-17.docx"));
        assert!(TemplateProcessor::open(&path).is_ok());
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_output_for_download() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = DocumentSettings::with_template(write_template(&temp_dir));
        settings.tmp_dir = Some(temp_dir.path().join("tmp"));
        let document = WordTemplateDocument::new(settings);

        let artifact = document
            .output_for_download(&order(), &RenderContext::default())
            .unwrap();

        assert_eq!(artifact.file_name, "order_2024-17.docx");
        assert!(artifact.path.starts_with(temp_dir.path().join("tmp")));
        assert!(artifact.path.exists());
        assert_ne!(artifact.path.file_name().unwrap(), "order_2024-17.docx");
    }
}
