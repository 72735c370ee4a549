use serde_json::Value;

use crate::cli::OutputFormat;

/// Print a server response either raw or as a short human summary
pub fn output_response(output_format: &OutputFormat, body: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(body)?),
        OutputFormat::Text => {
            if let Some(message) = body.get("message").and_then(Value::as_str) {
                println!("✓ {}", message);
            }
            if let Some(result) = body.get("result") {
                println!("Result: {}", result);
            }
            if let Some(status) = body.get("status") {
                println!("Proceed: {}", status);
            }
            let history = body
                .get("updatedHistory")
                .or_else(|| body.as_array().map(|_| body));
            if let Some(rows) = history.and_then(Value::as_array) {
                output_history(rows);
            }
        }
    }
    Ok(())
}

fn output_history(rows: &[Value]) {
    if rows.is_empty() {
        println!("History is empty");
        return;
    }
    for row in rows {
        println!("{}", format_row(row));
    }
}

pub fn format_row(row: &Value) -> String {
    let field = |name: &str| row.get(name).map(|v| v.to_string()).unwrap_or_default();
    let operation = row.get("operation").and_then(Value::as_str).unwrap_or("?");
    format!(
        "#{:<5} {} {} {} = {}",
        field("id"),
        field("num1"),
        operation,
        field("num2"),
        field("result")
    )
}
