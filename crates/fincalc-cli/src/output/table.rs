use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell;

/// Format output as tables: scalar fields first, then one table per
/// nested object or row list in the result.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_fields(map);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>) {
    print_fields(result);

    for (key, val) in result {
        match val {
            Value::Object(nested) if !nested.is_empty() => {
                println!("\n{}:", title(key));
                print_fields(nested);
            }
            Value::Array(rows) if rows.first().is_some_and(Value::is_object) => {
                println!("\n{}:", title(key));
                print_rows(rows);
            }
            _ => {}
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Field/value table of the scalar entries of `map`.
fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut any = false;
    for (key, val) in map {
        let rendered = match val {
            Value::Object(_) => continue,
            Value::Array(items) if items.first().is_some_and(Value::is_object) => continue,
            Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
            other => cell(other),
        };
        builder.push_record([key.as_str(), &rendered]);
        any = true;
    }
    if any {
        println!("{}", Table::from(builder));
    }
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = rows.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in rows {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in rows {
            println!("{}", cell(item));
        }
    }
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title("yearly_breakdown"), "Yearly breakdown");
        assert_eq!(title("schedule"), "Schedule");
        assert_eq!(title(""), "");
    }
}
