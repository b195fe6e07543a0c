//! Integration tests for rendering order documents
//!
//! Templates are built in memory, rendered through the real DOCX processor
//! and inspected by reopening the result.

use docx_template::{paragraph_xml, DocxBuilder, TemplateProcessor};
use order_document::{
    row_record, DocumentSettings, LineItem, OrderSnapshot, PlaceholderMap, RenderContext,
    RenderError, RowGroup, Surcharge, TemplateRenderer, Value, WordTemplateDocument,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn invoice_template() -> Vec<u8> {
    DocxBuilder::new()
        .paragraph("Date: ${orderDate}")
        .table(&[
            &["Product", "Quantity", "Price", "Total"],
            &["${item_name}", "${item_quantity}", "${item_price}", "${item_total_price}"],
        ])
        .table(&[&["${surcharge_label}", "${surcharge_total_price}"]])
        .paragraph("Total: ${orderTotal}")
        .build()
        .unwrap()
}

fn rows(processor: &TemplateProcessor) -> usize {
    processor.main_xml().matches("<w:tr>").count()
}

fn reopen(bytes: &[u8]) -> TemplateProcessor {
    TemplateProcessor::from_bytes(bytes).unwrap()
}

fn widget_items() -> RowGroup {
    RowGroup::new("item_", "name").with_record(row_record([
        ("name", Value::from("Widget")),
        ("quantity", Value::from(2)),
        ("price", Value::from("$10.00")),
        ("total_price", Value::from("$20.00")),
    ]))
}

#[test]
fn test_worked_example() {
    let placeholders = PlaceholderMap::new()
        .with("orderTotal", "$42.00")
        .with("orderDate", "2024-01-05");

    let bytes = TemplateRenderer::new()
        .render_package(&invoice_template(), &placeholders, &[widget_items()])
        .unwrap();
    let rendered = reopen(&bytes);
    let xml = rendered.main_xml();

    // Header row, one item row, and the surcharge row left untouched
    assert_eq!(rows(&rendered), 3);
    assert!(xml.contains(">Widget<"));
    assert!(xml.contains(">2<"));
    assert!(xml.contains(">&#36;20.00<"));
    assert!(xml.contains("Total: &#36;42.00"));
    assert!(xml.contains("Date: 2024-01-05"));
    assert!(!rendered.has_placeholder("item_name#1"));
    assert!(!rendered.has_placeholder("item_name"));
}

#[test]
fn test_items_and_surcharges_render_independently() {
    let items = RowGroup::new("item_", "name")
        .with_record(row_record([("name", "Widget"), ("quantity", "2")]))
        .with_record(row_record([("name", "Gadget"), ("quantity", "1")]))
        .with_record(row_record([("name", "Gizmo"), ("quantity", "5")]));
    let surcharges = RowGroup::new("surcharge_", "label")
        .with_record(row_record([("label", "Shipping"), ("total_price", "5.00")]))
        .with_record(row_record([("label", "VAT"), ("total_price", "3.10")]));

    let bytes = TemplateRenderer::new()
        .render_package(&invoice_template(), &PlaceholderMap::new(), &[items, surcharges])
        .unwrap();
    let rendered = reopen(&bytes);
    let xml = rendered.main_xml();

    assert_eq!(rows(&rendered), 1 + 3 + 2);
    let positions: Vec<usize> = ["Widget", "Gadget", "Gizmo", "Shipping", "VAT"]
        .iter()
        .map(|text| xml.find(&format!(">{}<", text)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    // Item fields without values keep their indexed placeholders
    assert_eq!(
        rendered.variables(),
        vec![
            "item_price#1",
            "item_price#2",
            "item_price#3",
            "item_total_price#1",
            "item_total_price#2",
            "item_total_price#3",
            "orderDate",
            "orderTotal",
        ]
    );
}

#[test]
fn test_empty_group_removes_anchor_row() {
    let surcharges = RowGroup::new("surcharge_", "label");

    let bytes = TemplateRenderer::new()
        .render_package(&invoice_template(), &PlaceholderMap::new(), &[widget_items(), surcharges])
        .unwrap();
    let rendered = reopen(&bytes);

    assert_eq!(rows(&rendered), 2);
    assert!(!rendered.main_xml().contains("surcharge_"));
}

#[test]
fn test_unresolved_placeholder_left_literal() {
    let placeholders = PlaceholderMap::new().with("orderTotal", "$42.00");

    let bytes = TemplateRenderer::new()
        .render_package(&invoice_template(), &placeholders, &[])
        .unwrap();
    let rendered = reopen(&bytes);

    assert!(rendered.has_placeholder("orderDate"));
    assert!(rendered.main_xml().contains("Date: ${orderDate}"));
}

#[test]
fn test_missing_anchor_produces_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let template_path = temp_dir.path().join("letter.docx");
    std::fs::write(
        &template_path,
        DocxBuilder::new().paragraph("Dear ${billing_firstname}").build().unwrap(),
    )
    .unwrap();
    let out_dir = temp_dir.path().join("out");
    std::fs::create_dir_all(&out_dir).unwrap();

    let order = OrderSnapshot {
        document_number: Some("17".to_string()),
        locked_at: "2024-01-05T10:00:00Z".parse().unwrap(),
        items: vec![LineItem {
            id: 1,
            name: "Widget".to_string(),
            quantity: 2,
            price: 10.0,
            total_price: 20.0,
            added_at: None,
            options: Vec::new(),
        }],
        surcharges: vec![Surcharge {
            label: "Shipping".to_string(),
            price: 5.0,
            total_price: 5.0,
        }],
        billing_address: None,
        subtotal: 20.0,
        total: 25.0,
        notification_tokens: None,
    };

    let document = WordTemplateDocument::new(DocumentSettings::with_template(&template_path));
    let err = document
        .output_to_file(&order, &RenderContext::default(), &out_dir)
        .unwrap_err();

    assert!(matches!(err, RenderError::AnchorNotFound { ref anchor } if anchor == "item_name"));
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
}

#[test]
fn test_anchor_outside_table_is_rejected() {
    let template = DocxBuilder::new().paragraph("${item_name}").build().unwrap();

    let err = TemplateRenderer::new()
        .render_package(&template, &PlaceholderMap::new(), &[widget_items()])
        .unwrap_err();

    assert!(matches!(err, RenderError::AnchorNotFound { .. }));
}

#[test]
fn test_unreadable_template() {
    let err = TemplateRenderer::new()
        .render_package(b"definitely not a docx", &PlaceholderMap::new(), &[])
        .unwrap_err();

    assert!(matches!(err, RenderError::TemplateUnreadable(_)));
}

#[test]
fn test_values_are_inserted_as_literal_text() {
    let template = DocxBuilder::new()
        .paragraph("${billing_company}")
        .table(&[&["${item_name}", "${item_price}"]])
        .paragraph("Total: ${order_total}")
        .build()
        .unwrap();
    let placeholders = PlaceholderMap::new()
        .with("billing_company", "Acme ${order_total}")
        .with("order_total", "$42.00");
    let items = RowGroup::new("item_", "name")
        .with_record(row_record([("name", "See ${item_price#2}"), ("price", "1.00")]))
        .with_record(row_record([("name", "Gadget"), ("price", "2.00")]));

    let bytes = TemplateRenderer::new()
        .render_package(&template, &placeholders, &[items])
        .unwrap();
    let rendered = reopen(&bytes);
    let xml = rendered.main_xml();

    assert!(xml.contains(">Acme &#36;{order_total}<"));
    assert!(xml.contains(">See &#36;{item_price#2}<"));
    assert!(xml.contains("Total: &#36;42.00"));
    assert!(rendered.variables().is_empty());
}

#[test]
fn test_render_bytes_do_not_depend_on_time() {
    let placeholders = PlaceholderMap::new().with("orderTotal", "$42.00");
    let renderer = TemplateRenderer::new();
    let template = invoice_template();

    let first = renderer.render_package(&template, &placeholders, &[widget_items()]).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2100));
    let second = renderer.render_package(&template, &placeholders, &[widget_items()]).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_empty_group_with_anchor_outside_table_is_skipped() {
    let template = DocxBuilder::new()
        .paragraph("Fees: ${surcharge_label}")
        .table(&[&["${item_name}"]])
        .build()
        .unwrap();
    let mut processor = TemplateProcessor::from_bytes(&template).unwrap();

    let report = TemplateRenderer::new()
        .render(
            &mut processor,
            &PlaceholderMap::new(),
            &[widget_items(), RowGroup::new("surcharge_", "label")],
        )
        .unwrap();

    assert!(!report.groups[1].anchor_present);
    assert!(processor.main_xml().contains(">Widget<"));
}

#[test]
fn test_anchor_only_in_header_fails_before_substitution() {
    let template = DocxBuilder::new()
        .paragraph("Total: ${orderTotal}")
        .header(paragraph_xml("${item_name}"))
        .build()
        .unwrap();
    let mut processor = TemplateProcessor::from_bytes(&template).unwrap();
    let placeholders = PlaceholderMap::new().with("orderTotal", "$42.00");

    let err = TemplateRenderer::new()
        .render(&mut processor, &placeholders, &[widget_items()])
        .unwrap_err();

    assert!(matches!(err, RenderError::AnchorNotFound { ref anchor } if anchor == "item_name"));
    assert!(processor.main_xml().contains("Total: ${orderTotal}"));
}

fn placeholder_map() -> impl Strategy<Value = PlaceholderMap> {
    prop::collection::btree_map("(orderTotal|orderDate|unused)", "[a-zA-Z0-9 &<>$.]{0,12}", 0..3)
        .prop_map(|map| map.into_iter().collect::<PlaceholderMap>())
}

fn item_group() -> impl Strategy<Value = RowGroup> {
    prop::collection::vec(("[a-zA-Z ]{1,10}", 0u32..100), 0..5).prop_map(|records| {
        let mut group = RowGroup::new("item_", "name");
        for (name, quantity) in records {
            group.push(row_record([
                ("name", Value::from(name)),
                ("quantity", Value::from(quantity)),
            ]));
        }
        group
    })
}

proptest! {
    #[test]
    fn test_render_is_deterministic(placeholders in placeholder_map(), items in item_group()) {
        let template = invoice_template();
        let renderer = TemplateRenderer::new();
        let groups = [items.clone()];

        let first = renderer.render_package(&template, &placeholders, &groups).unwrap();
        let second = renderer.render_package(&template, &placeholders, &groups).unwrap();
        prop_assert_eq!(&first, &second);

        // Header row, one row per item and the untouched surcharge row
        prop_assert_eq!(rows(&reopen(&first)), items.len() + 2);
    }
}
