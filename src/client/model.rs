use serde::{Deserialize, Serialize};

use super::price;
use crate::database::models::{ProductId, UserId};

/// A product as the client sees it, with the price already coerced to a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "price::deserialize_lenient")]
    pub price: f64,
    pub owner_id: UserId,
}

impl ProductRecord {
    pub fn display_price(&self) -> String {
        price::format_price(self.price)
    }

    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "N/A",
        }
    }
}

/// Not-yet-submitted form state; every field is the raw text the user typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl Draft {
    pub fn from_record(record: &ProductRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            price: price::price_text(record.price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.price.is_empty()
    }

    /// Wire payload with the price coerced to a number (unparseable text is `0`)
    pub fn to_request(&self) -> ProductRequest {
        ProductRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            price: price::parse_leading_number(&self.price),
        }
    }
}

/// Body of create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
}
