//! Order data consumed by order documents
//!
//! [`OrderCollection`] is what the host shop system provides. [`OrderSnapshot`]
//! is a plain serializable implementation used by the command line tool and
//! by tests.

use crate::value::PlaceholderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A purchased product line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub quantity: u32,
    /// Unit price
    pub price: f64,
    pub total_price: f64,
    /// When the item was added to the collection
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub options: Vec<ItemOption>,
}

/// A configured product option, e.g. size or color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOption {
    pub label: String,
    pub value: String,
}

impl LineItem {
    /// Options rendered as `Label: Value, Label: Value`
    pub fn options_text(&self) -> String {
        self.options
            .iter()
            .map(|o| format!("{}: {}", o.label, o.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A shipping fee, payment fee, tax or rule-based discount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surcharge {
    pub label: String,
    pub price: f64,
    pub total_price: f64,
}

/// Billing or shipping address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub company: String,
    pub salutation: String,
    pub firstname: String,
    pub lastname: String,
    pub street_1: String,
    pub postal: String,
    pub city: String,
    pub country: String,
}

/// Source of the data rendered into an order document
pub trait OrderCollection {
    fn items(&self) -> &[LineItem];

    fn surcharges(&self) -> &[Surcharge];

    fn billing_address(&self) -> Option<&Address>;

    /// When the collection was locked (the order date)
    fn lock_time(&self) -> DateTime<Utc>;

    fn total(&self) -> f64;

    fn subtotal(&self) -> f64;

    fn document_number(&self) -> Option<&str>;

    /// Notification tokens of purchasable collections (orders).
    ///
    /// Plain carts do not support them and return `None`; the caller decides
    /// this before rendering.
    fn notification_tokens(&self) -> Option<PlaceholderMap> {
        None
    }
}

/// Sort order for line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrdering {
    /// Keep the collection's own order
    #[default]
    AsIs,
    AscId,
    DescId,
    #[serde(rename = "asc_tstamp")]
    AscAdded,
    #[serde(rename = "desc_tstamp")]
    DescAdded,
    AscName,
    DescName,
    AscPrice,
    DescPrice,
}

impl ItemOrdering {
    /// Parse a setting value such as `asc_name`; unknown values keep the order
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "asc_id" => ItemOrdering::AscId,
            "desc_id" => ItemOrdering::DescId,
            "asc_tstamp" => ItemOrdering::AscAdded,
            "desc_tstamp" => ItemOrdering::DescAdded,
            "asc_name" => ItemOrdering::AscName,
            "desc_name" => ItemOrdering::DescName,
            "asc_price" => ItemOrdering::AscPrice,
            "desc_price" => ItemOrdering::DescPrice,
            _ => ItemOrdering::AsIs,
        }
    }

    /// Return the items in this order; ties keep their original order
    pub fn sort<'a>(&self, items: &'a [LineItem]) -> Vec<&'a LineItem> {
        let mut sorted: Vec<&LineItem> = items.iter().collect();
        if *self != ItemOrdering::AsIs {
            sorted.sort_by(|a, b| {
                let ordering = self.compare(a, b);
                if self.is_descending() {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        sorted
    }

    fn compare(&self, a: &LineItem, b: &LineItem) -> Ordering {
        match self {
            ItemOrdering::AsIs => Ordering::Equal,
            ItemOrdering::AscId | ItemOrdering::DescId => a.id.cmp(&b.id),
            ItemOrdering::AscAdded | ItemOrdering::DescAdded => a.added_at.cmp(&b.added_at),
            ItemOrdering::AscName | ItemOrdering::DescName => {
                a.name.to_lowercase().cmp(&b.name.to_lowercase())
            }
            ItemOrdering::AscPrice | ItemOrdering::DescPrice => a.price.total_cmp(&b.price),
        }
    }

    fn is_descending(&self) -> bool {
        matches!(
            self,
            ItemOrdering::DescId
                | ItemOrdering::DescAdded
                | ItemOrdering::DescName
                | ItemOrdering::DescPrice
        )
    }
}

/// A complete order held in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    #[serde(default)]
    pub document_number: Option<String>,
    pub locked_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub surcharges: Vec<Surcharge>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    pub subtotal: f64,
    pub total: f64,
    /// Present only for purchasable collections
    #[serde(default)]
    pub notification_tokens: Option<PlaceholderMap>,
}

impl OrderSnapshot {
    /// Load an order from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl OrderCollection for OrderSnapshot {
    fn items(&self) -> &[LineItem] {
        &self.items
    }

    fn surcharges(&self) -> &[Surcharge] {
        &self.surcharges
    }

    fn billing_address(&self) -> Option<&Address> {
        self.billing_address.as_ref()
    }

    fn lock_time(&self) -> DateTime<Utc> {
        self.locked_at
    }

    fn total(&self) -> f64 {
        self.total
    }

    fn subtotal(&self) -> f64 {
        self.subtotal
    }

    fn document_number(&self) -> Option<&str> {
        self.document_number.as_deref()
    }

    fn notification_tokens(&self) -> Option<PlaceholderMap> {
        self.notification_tokens.clone()
    }
}
