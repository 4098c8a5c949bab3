use serde_json::Value;

use super::cell;

// Headline figure of each calculator, in priority order.
const PRIORITY_KEYS: [&str; 6] = [
    "emi",
    "initial_emi",
    "maturity_value",
    "maturity_amount",
    "future_value",
    "monthly_investment",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    // Loan schedules keep their totals one level down.
    let scope = result.get("summary").unwrap_or(result);

    if let Value::Object(map) = scope {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return cell(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, cell(val));
        }
    }
    cell(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_prefers_priority_keys() {
        let v = json!({"result": {"total_investment": "1200000", "maturity_value": "2323390.7627"}});
        assert_eq!(headline(&v), "2323390.76");
    }

    #[test]
    fn test_headline_descends_into_summary() {
        let v = json!({"result": {"summary": {"loan_amount": "1000000", "initial_emi": "21247.04"}, "schedule": []}});
        assert_eq!(headline(&v), "21247.04");
    }

    #[test]
    fn test_headline_falls_back_to_first_field() {
        let v = json!({"result": {"alpha": "1"}});
        assert_eq!(headline(&v), "alpha: 1");
    }
}
