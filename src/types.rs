//! Shared primitive IDs and inventory-related enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned product identifier.
pub type ProductId = String;
/// Server-assigned history entry identifier.
pub type HistoryId = String;

/// Stock availability bucket, derived by the server from the stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    /// At least one unit available.
    #[serde(rename = "In Stock")]
    InStock,
    /// Nothing left on hand.
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Label exactly as the backend spells it.
    pub fn label(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One editable product field, as named by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductField {
    /// Display name.
    Name,
    /// Brand or manufacturer.
    Brand,
    /// Category bucket.
    Category,
    /// Unit of measure, e.g. `kg`.
    Unit,
    /// Units on hand.
    Stock,
}

impl ProductField {
    /// Every editable field in form order.
    pub const ALL: [ProductField; 5] = [
        ProductField::Name,
        ProductField::Brand,
        ProductField::Category,
        ProductField::Unit,
        ProductField::Stock,
    ];

    /// Wire/form name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Brand => "brand",
            Self::Category => "category",
            Self::Unit => "unit",
            Self::Stock => "stock",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
