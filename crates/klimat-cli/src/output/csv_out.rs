use serde_json::Value;
use std::io;

use crate::output::render_value;

/// Write output as CSV to stdout: arrays become one record per element with
/// a union header, objects become field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            Some(Value::Object(result)) => write_fields(&mut wtr, result),
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => {
            let _ = wtr.write_record([&render_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &render_value(val)]);
    }
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    if rows.is_empty() {
        return;
    }

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
            let _ = wtr.write_record([&render_value(row)]);
        }
        return;
    }

    let _ = wtr.write_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(render_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
