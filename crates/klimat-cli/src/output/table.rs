use serde_json::Value;
use tabled::{builder::Builder, Table};

use crate::output::render_value;

/// Format output as a table using the tabled crate. Envelope objects get a
/// field/value table plus warnings and methodology; arrays (data points,
/// rank rows) get one row per element.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_envelope(result, map);
            } else {
                print_object(value);
            }
        }
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", value),
    }
}

fn print_envelope(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(_) => print_object(result),
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", other),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &render_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    // Data points omit absent series entirely, so headers are the union of
    // keys across all rows, not just the first.
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    if headers.is_empty() {
        for row in rows {
            println!("{}", render_value(row));
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(render_value).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}
