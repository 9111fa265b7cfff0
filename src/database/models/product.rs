use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::{ApiError, FieldErrors};

pub type ProductId = i64;
pub type UserId = i64;

const NAME_MAX_CHARS: usize = 255;

/// Largest value a `NUMERIC(10, 2)` column holds
const PRICE_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// A catalog entry. `owner_id` is fixed at creation and drives every
/// authorization decision on the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, owner-independent fields written on create and update
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Raw create/update body. `price` may be a JSON number or a numeric string;
/// any `id` or `owner_id` sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl ProductPayload {
    pub fn validate(self) -> Result<ProductFields, ApiError> {
        let mut errors = FieldErrors::new();

        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            errors.insert("name".into(), "The name field is required.".into());
        } else if name.chars().count() > NAME_MAX_CHARS {
            errors.insert(
                "name".into(),
                format!("The name may not be greater than {NAME_MAX_CHARS} characters."),
            );
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let price = match parse_price(self.price.as_ref()) {
            Ok(price) => price,
            Err(message) => {
                errors.insert("price".into(), message.to_string());
                Decimal::ZERO
            }
        };

        if !errors.is_empty() {
            return Err(ApiError::unprocessable_entity(errors));
        }

        Ok(ProductFields {
            name,
            description,
            price,
        })
    }
}

fn parse_price(raw: Option<&Value>) -> Result<Decimal, &'static str> {
    let text = match raw {
        None | Some(Value::Null) => return Err("The price field is required."),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => return Err("The price field is required."),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err("The price must be a number."),
    };

    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| "The price must be a number.")?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err("The price must be at least 0.");
    }

    let price = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if price > PRICE_MAX {
        return Err("The price may not be greater than 99999999.99.");
    }
    Ok(price)
}
