use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::client::ProductRecord;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

pub fn output_products(output_format: &OutputFormat, products: &[ProductRecord]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "products": products }))?);
        }
        OutputFormat::Text => {
            if products.is_empty() {
                println!("No products found");
            } else {
                print!("{}", products_table(products));
            }
        }
    }
    Ok(())
}

pub fn output_product(output_format: &OutputFormat, product: &ProductRecord) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(product)?);
        }
        OutputFormat::Text => {
            println!("ID:          {}", product.id);
            println!("Name:        {}", product.name);
            println!("Description: {}", product.display_description());
            println!("Price:       {}", product.display_price());
            println!("Owner:       {}", product.owner_id);
        }
    }
    Ok(())
}

/// Fixed-width table of id, name, description and price
pub fn products_table(products: &[ProductRecord]) -> String {
    let rows: Vec<[String; 4]> = products
        .iter()
        .map(|p| {
            [
                p.id.to_string(),
                p.name.clone(),
                p.display_description().to_string(),
                p.display_price(),
            ]
        })
        .collect();

    let header = ["ID", "NAME", "DESCRIPTION", "PRICE"];
    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 4]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_row(header);
    for row in &rows {
        push_row([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}
