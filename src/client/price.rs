//! Price coercion for the client.
//!
//! Two parsers exist because the list and the form are lenient in different
//! ways: list values must be entirely numeric (`"12abc"` is `0`), while form
//! input keeps its leading number (`"12abc"` is `12`). Neither ever fails; an
//! unparseable value is `0`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Whole-value numeric coercion applied to prices received from the server
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };
    finite_or_zero(parsed)
}

/// Leading-number coercion applied to draft text before submission
pub fn parse_leading_number(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    finite_or_zero(s[..end].parse::<f64>().unwrap_or(0.0))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `$` followed by the price with two decimals
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Shortest editable text for a price: `12.5` -> `"12.5"`, `5.0` -> `"5"`
pub fn price_text(price: f64) -> String {
    format!("{}", price)
}

/// Serde adapter: any missing, null or non-numeric price becomes `0`
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_number).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_list_values() {
        assert_eq!(coerce_number(&json!(12.5)), 12.5);
        assert_eq!(coerce_number(&json!("12.50")), 12.5);
        assert_eq!(coerce_number(&json!(" 7 ")), 7.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("12abc")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!({"amount": 3})), 0.0);
    }

    #[test]
    fn parses_leading_numbers_from_input() {
        assert_eq!(parse_leading_number("5"), 5.0);
        assert_eq!(parse_leading_number("12.5"), 12.5);
        assert_eq!(parse_leading_number("  3.75 dollars"), 3.75);
        assert_eq!(parse_leading_number("12abc"), 12.0);
        assert_eq!(parse_leading_number(".5"), 0.5);
        assert_eq!(parse_leading_number("1e2"), 100.0);
        assert_eq!(parse_leading_number("1e"), 1.0);
        assert_eq!(parse_leading_number("-2"), -2.0);
        assert_eq!(parse_leading_number(""), 0.0);
        assert_eq!(parse_leading_number("abc"), 0.0);
        assert_eq!(parse_leading_number("."), 0.0);
        assert_eq!(parse_leading_number("1e999"), 0.0);
    }

    #[test]
    fn formats_for_display_and_editing() {
        assert_eq!(format_price(parse_leading_number("12.5")), "$12.50");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(price_text(12.5), "12.5");
        assert_eq!(price_text(5.0), "5");
    }

    #[test]
    fn lenient_deserializer_defaults_missing_price() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_lenient")]
            price: f64,
        }

        let missing: Row = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.price, 0.0);
        let text: Row = serde_json::from_value(json!({"price": "9.99"})).unwrap();
        assert_eq!(text.price, 9.99);
        let junk: Row = serde_json::from_value(json!({"price": [1]})).unwrap();
        assert_eq!(junk.price, 0.0);
    }
}
