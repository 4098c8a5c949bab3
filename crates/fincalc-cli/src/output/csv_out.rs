use serde_json::{Map, Value};
use std::io::{self, Write};

use super::cell;

/// Columns of a loan ledger export; `balance` is the closing balance.
const LEDGER_COLUMNS: [(&str, &str); 7] = [
    ("month", "month"),
    ("date", "date"),
    ("emi", "emi"),
    ("principal", "principal"),
    ("interest", "interest"),
    ("prepayment", "prepayment"),
    ("balance", "closing_balance"),
];

// Row lists tried in order when the result holds one.
const ROW_KEYS: [&str; 3] = ["schedule", "yearly_breakdown", "yearly"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_csv<W: Write>(out: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match row_list(result) {
                Some(rows) if is_ledger(rows) => write_ledger(&mut wtr, rows)?,
                Some(rows) => write_rows(&mut wtr, rows)?,
                None => write_fields(&mut wtr, result)?,
            },
            _ => write_fields(&mut wtr, map)?,
        },
        Value::Array(arr) => write_rows(&mut wtr, arr)?,
        _ => wtr.write_record([cell(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn row_list(result: &Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) if !rows.is_empty() => Some(rows),
        _ => None,
    })
}

fn is_ledger(rows: &[Value]) -> bool {
    rows.first()
        .and_then(Value::as_object)
        .is_some_and(|row| row.contains_key("closing_balance") && row.contains_key("prepayment"))
}

fn write_ledger<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    wtr.write_record(LEDGER_COLUMNS.iter().map(|(header, _)| *header))?;
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = LEDGER_COLUMNS
            .iter()
            .map(|(_, field)| row.get(*field).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([cell(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_fields<W: Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &cell(val)])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_loan_ledger_columns() {
        let value = json!({
            "result": {
                "summary": {"months": 1},
                "schedule": [{
                    "month": 1,
                    "date": "2024-01-01",
                    "opening_balance": "100000",
                    "emi": "8884.88",
                    "interest": "1000.00",
                    "principal": "7884.88",
                    "prepayment": "0",
                    "closing_balance": "92115.12",
                    "rate_percent": "12",
                }],
            }
        });
        let text = render(&value);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("month,date,emi,principal,interest,prepayment,balance"));
        assert_eq!(lines.next(), Some("1,2024-01-01,8884.88,7884.88,1000.00,0,92115.12"));
    }

    #[test]
    fn test_yearly_rows_use_their_own_headers() {
        let value = json!({"result": {"future_value": "1", "yearly_breakdown": [{"year": 1, "value": "1.2345"}]}});
        let text = render(&value);
        assert_eq!(text, "value,year\n1.23,1\n");
    }

    #[test]
    fn test_scalar_result_as_fields() {
        let value = json!({"result": {"emi": "21247.04"}});
        assert_eq!(render(&value), "field,value\nemi,21247.04\n");
    }
}
