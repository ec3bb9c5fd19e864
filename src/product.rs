//! Product record, editable field set, edit buffer, and history entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::view::ViewError,
    types::{HistoryId, ProductField, ProductId, StockStatus},
};

/// Product as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier (`_id` on the wire, `id` also accepted).
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Brand or manufacturer.
    pub brand: String,
    /// Category bucket.
    pub category: String,
    /// Unit of measure.
    pub unit: String,
    /// Units on hand.
    pub stock: u32,
    /// Server-derived availability; never edited locally.
    pub status: StockStatus,
}

impl Product {
    /// Editable fields of this product, used to seed an [`EditBuffer`].
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            unit: self.unit.clone(),
            stock: self.stock,
        }
    }
}

/// Client-editable product fields.
///
/// Used both as the new-product draft (POST body) and as the contents of an
/// [`EditBuffer`] (PUT body). The default value is the empty draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductFields {
    /// Display name.
    pub name: String,
    /// Brand or manufacturer.
    pub brand: String,
    /// Category bucket.
    pub category: String,
    /// Unit of measure.
    pub unit: String,
    /// Units on hand.
    pub stock: u32,
}

impl ProductFields {
    /// Returns true when every field holds its initial empty value.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overwrites a single field from its textual form-input value.
    ///
    /// `Stock` must parse as a non-negative integer; on failure nothing changes.
    pub fn set_field(&mut self, field: ProductField, value: &str) -> Result<(), ViewError> {
        match field {
            ProductField::Name => self.name = value.to_string(),
            ProductField::Brand => self.brand = value.to_string(),
            ProductField::Category => self.category = value.to_string(),
            ProductField::Unit => self.unit = value.to_string(),
            ProductField::Stock => {
                self.stock = value
                    .trim()
                    .parse()
                    .map_err(|_| ViewError::InvalidStock(value.to_string()))?;
            }
        }
        Ok(())
    }

    /// Text fields that are blank and therefore block submission.
    pub fn missing_fields(&self) -> Vec<ProductField> {
        [
            (ProductField::Name, &self.name),
            (ProductField::Brand, &self.brand),
            (ProductField::Category, &self.category),
            (ProductField::Unit, &self.unit),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(f, _)| f)
        .collect()
    }
}

/// The single in-progress row edit: which product, and its pending fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    /// Product being edited.
    pub id: ProductId,
    /// Pending field values.
    pub fields: ProductFields,
}

impl EditBuffer {
    /// Seeds a buffer as a copy of `product`'s editable fields.
    pub fn seeded_from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            fields: product.fields(),
        }
    }
}

/// Immutable record of one past action on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLogEntry {
    /// Entry identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: HistoryId,
    /// Short action tag, e.g. `UPDATE`.
    pub action_type: String,
    /// Human-readable description.
    pub description: String,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// Stock before the action, when it touched stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_stock: Option<u32>,
    /// Stock after the action, when it touched stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_stock: Option<u32>,
}

impl HistoryLogEntry {
    /// Short timestamp label such as `Mar 04, 09:15`.
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format("%b %d, %H:%M").to_string()
    }

    /// `old ➝ new` stock transition, present only when the entry records one.
    pub fn stock_change(&self) -> Option<String> {
        let old = self.old_stock?;
        let new = self
            .new_stock
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        Some(format!("{old} ➝ {new}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_accepts_underscore_and_plain_id() {
        let a: Product = serde_json::from_str(
            r#"{"_id":"p1","name":"Milk","brand":"A","category":"Dairy","unit":"l","stock":10,"status":"In Stock"}"#,
        )
        .unwrap();
        let b: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Milk","brand":"A","category":"Dairy","unit":"l","stock":10,"status":"In Stock"}"#,
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.status, StockStatus::InStock);
    }

    #[test]
    fn set_field_rejects_bad_stock_without_touching_buffer() {
        let mut fields = ProductFields {
            stock: 4,
            ..ProductFields::default()
        };
        let err = fields.set_field(ProductField::Stock, "-3").unwrap_err();
        assert_eq!(err, ViewError::InvalidStock("-3".to_string()));
        assert_eq!(fields.stock, 4);

        fields.set_field(ProductField::Stock, " 12 ").unwrap();
        assert_eq!(fields.stock, 12);
    }

    #[test]
    fn missing_fields_lists_blank_text_fields() {
        let fields = ProductFields {
            name: "Bread".to_string(),
            unit: "  ".to_string(),
            ..ProductFields::default()
        };
        assert_eq!(
            fields.missing_fields(),
            vec![ProductField::Brand, ProductField::Category, ProductField::Unit]
        );
    }

    #[test]
    fn history_entry_labels() {
        let entry: HistoryLogEntry = serde_json::from_str(
            r#"{"_id":"h1","actionType":"UPDATE","description":"Stock changed","timestamp":"2024-03-04T09:15:00Z","oldStock":10,"newStock":3}"#,
        )
        .unwrap();
        assert_eq!(entry.timestamp_label(), "Mar 04, 09:15");
        assert_eq!(entry.stock_change().as_deref(), Some("10 ➝ 3"));

        let created: HistoryLogEntry = serde_json::from_str(
            r#"{"id":"h2","actionType":"CREATE","description":"Created","timestamp":"2024-03-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(created.stock_change(), None);
    }
}
