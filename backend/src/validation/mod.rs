//! JSON Schema validation for flat delivery records.
//!
//! The record schema (`schemas/delivery-record.json`, draft 7) is embedded at
//! compile time. It restates the output contract: required keys and their
//! types, nullable optional keys, and the enumerated values of `gender`,
//! `win_margin_type` and `toss_decision`.
//!
//! # Example
//!
//! ```rust,ignore
//! use ballbyball::validation::validate_delivery_record;
//!
//! let record: serde_json::Value = /* one output line */;
//! if let Err(errors) = validate_delivery_record(&record) {
//!     eprintln!("{}", errors.join("; "));
//! }
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

static DELIVERY_RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/delivery-record.json"))
        .expect("Invalid embedded schema")
});

static DELIVERY_RECORD_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    jsonschema::draft7::new(&DELIVERY_RECORD_SCHEMA).expect("Invalid embedded schema")
});

/// Validate `data` against an arbitrary draft-7 schema.
///
/// Returns every violation as a message; a schema that does not compile is
/// reported the same way.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;
    collect_errors(&validator, data)
}

pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// The embedded delivery-record schema.
pub fn delivery_record_schema() -> &'static Value {
    &DELIVERY_RECORD_SCHEMA
}

/// Validate one flat record against the delivery-record schema.
pub fn validate_delivery_record(data: &Value) -> Result<(), Vec<String>> {
    collect_errors(&DELIVERY_RECORD_VALIDATOR, data)
}

pub fn is_valid_delivery_record(data: &Value) -> bool {
    DELIVERY_RECORD_VALIDATOR.is_valid(data)
}

/// Validate a sequence of records, stopping at the first invalid one.
///
/// On failure returns the record's index with its violations.
pub fn validate_delivery_records<'a, I>(records: I) -> Result<(), (usize, Vec<String>)>
where
    I: IntoIterator<Item = &'a Value>,
{
    for (index, record) in records.into_iter().enumerate() {
        validate_delivery_record(record).map_err(|errors| (index, errors))?;
    }
    Ok(())
}

fn collect_errors(validator: &Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "match_date": "2025-05-12",
            "match_type": "T20",
            "venue": "Terdthai Cricket Ground, Bangkok",
            "city": "Bangkok",
            "teams": ["Kuwait", "Bhutan"],
            "gender": "women",
            "event": { "name": "ICC Women's T20 World Cup Asia Qualifier" },
            "winner": "Kuwait",
            "win_margin": 35,
            "win_margin_type": "runs",
            "toss_winner": "Bhutan",
            "toss_decision": "field",
            "balls_per_over": 6,
            "innings_number": 1,
            "batting_team": "Kuwait",
            "bowling_team": "Bhutan",
            "over_number": 0,
            "ball_number": 1,
            "batter": "Priyada Murali",
            "non_striker": "Zeefa Jilani",
            "bowler": "A Gurung",
            "runs_batter": 0,
            "runs_extras": 1,
            "runs_total": 1,
            "extras_type": "wides",
            "wicket_type": null,
            "wicket_player_out": null,
            "wicket_fielders": []
        })
    }

    #[test]
    fn test_valid_record() {
        assert!(is_valid_delivery_record(&record()));
        assert!(validate_delivery_record(&record()).is_ok());
    }

    #[test]
    fn test_nullable_outcome() {
        let mut r = record();
        r["winner"] = Value::Null;
        r["win_margin"] = Value::Null;
        r["win_margin_type"] = Value::Null;
        assert!(is_valid_delivery_record(&r));
    }

    #[test]
    fn test_missing_required_field() {
        let mut r = record();
        r.as_object_mut().unwrap().remove("bowler");
        let errors = validate_delivery_record(&r).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("bowler")));
    }

    #[test]
    fn test_enum_and_range_violations() {
        let mut r = record();
        r["gender"] = json!("mixed");
        assert!(!is_valid_delivery_record(&r));

        let mut r = record();
        r["ball_number"] = json!(0);
        assert!(!is_valid_delivery_record(&r));

        let mut r = record();
        r["teams"] = json!(["Kuwait"]);
        assert!(!is_valid_delivery_record(&r));
    }

    #[test]
    fn test_validate_records_reports_index() {
        let mut bad = record();
        bad["runs_total"] = json!("one");
        let records = vec![record(), record(), bad];
        let (index, errors) = validate_delivery_records(&records).unwrap_err();
        assert_eq!(index, 2);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_custom_schema() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
        assert!(!is_valid(&schema, &json!({ "age": 42 })));
    }
}
