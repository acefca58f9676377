//! Integration test: one compiled validator shared across threads.

use serde_json::json;
use sieve_validator::{Schema, SchemaValidator, Value};

#[test]
fn test_shared_across_threads() {
    let validator = SchemaValidator::new(
        &Schema::from(json!({"type": "list", "items_schema": {"type": "str", "max_length": 4, "to_upper": true}})),
        None,
    )
    .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let validator = &validator;
                scope.spawn(move || {
                    for round in 0..200 {
                        let good = Value::List(vec![Value::from(format!("t{i}")), Value::from("ab")]);
                        let out = validator.validate(&good, None).unwrap();
                        assert_eq!(out, Value::List(vec![Value::from(format!("T{i}")), Value::from("AB")]));

                        let bad = Value::List(vec![Value::from("toolong"), Value::Int(round)]);
                        assert_eq!(validator.validate(&bad, None).unwrap_err().error_count(), 2);
                        assert!(!validator.is_valid(&bad, Some(true)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}
