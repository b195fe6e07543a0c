//! Repeatable row groups

use crate::value::{RowRecord, Value};
use serde::{Deserialize, Serialize};

/// An ordered sequence of records rendered into clones of one table row.
///
/// The row holding `${<prefix><anchor_key>}` is the one that gets cloned;
/// row `i` (1-based) then carries `${<prefix><field>#i}` for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowGroup {
    /// Placeholder name prefix shared by all fields, e.g. `item_`
    pub prefix: String,
    /// Field suffix whose placeholder marks the row to clone, e.g. `name`
    pub anchor_key: String,
    /// Records, one cloned row each
    pub records: Vec<RowRecord>,
}

impl RowGroup {
    /// Create an empty row group
    pub fn new(prefix: impl Into<String>, anchor_key: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            anchor_key: anchor_key.into(),
            records: Vec::new(),
        }
    }

    /// Builder-style record append
    pub fn with_record(mut self, record: RowRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Append a record
    pub fn push(&mut self, record: RowRecord) {
        self.records.push(record);
    }

    /// Name of the placeholder that identifies the row to clone
    pub fn anchor_placeholder(&self) -> String {
        format!("{}{}", self.prefix, self.anchor_key)
    }

    /// Indexed placeholder name for a field of the `index`-th row (1-based)
    pub fn field_placeholder(&self, field: &str, index: usize) -> String {
        format!("{}{}#{}", self.prefix, field, index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All `(placeholder, value)` pairs implied by the records, row by row
    pub fn indexed_values(&self) -> impl Iterator<Item = (String, &Value)> + '_ {
        self.records.iter().enumerate().flat_map(move |(i, record)| {
            record
                .iter()
                .map(move |(field, value)| (self.field_placeholder(field, i + 1), value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::row_record;

    #[test]
    fn test_placeholder_names() {
        let group = RowGroup::new("item_", "name");
        assert_eq!(group.anchor_placeholder(), "item_name");
        assert_eq!(group.field_placeholder("total_price", 3), "item_total_price#3");
    }

    #[test]
    fn test_indexed_values() {
        let group = RowGroup::new("surcharge_", "label")
            .with_record(row_record([("label", "Shipping"), ("price", "5.00")]))
            .with_record(row_record([("label", "VAT")]));

        let names: Vec<String> = group.indexed_values().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["surcharge_label#1", "surcharge_price#1", "surcharge_label#2"]
        );
        assert_eq!(group.len(), 2);
    }
}
