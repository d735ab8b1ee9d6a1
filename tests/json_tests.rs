// tests/json_tests.rs

mod common;

use std::cell::RefCell;

use braid::json::{self, parse_str, parse_tokens};
use braid::{Cursor, Input, ParseError, Parser, ReadSource, Tokenizer, TokenizerConfig};
use common::ChunkedSource;
use serde_json::{json, Value};

const DOCUMENT: &str = r#"{
    "id": 7,
    "title": "Qébec \"quoted\"",
    "ratio": 0.25,
    "flags": [true, false, null],
    "nested": { "deep": [[], [{}], [1, [2, [3]]]] }
}"#;

#[cfg(test)]
mod document_tests {
    use super::*;

    #[test]
    fn test_document_matches_serde_json() {
        let expected: Value = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(parse_str(DOCUMENT).unwrap(), expected);
    }

    #[test]
    fn test_single_values() {
        assert_eq!(parse_str("null").unwrap(), Value::Null);
        assert_eq!(parse_str(" false ").unwrap(), json!(false));
        assert_eq!(parse_str("-0.5e1").unwrap(), json!(-5.0));
        assert_eq!(parse_str(r#""😀""#).unwrap(), json!("😀"));
    }

    #[test]
    fn test_value_leaves_the_rest_of_the_input() {
        let (value, rest) = json::value().parse(Cursor::new("[1] tail")).unwrap();
        assert_eq!(value, json!([1]));
        assert_eq!(rest.position(), 3);
        assert_eq!(rest.remaining(), " tail");
    }

    #[test]
    fn test_malformed_documents_fail() {
        for bad in ["", "{", "[1,]", "{\"a\" 1}", "tru", "01", "\"unterminated"] {
            assert!(parse_str(bad).is_err(), "accepted {bad:?}");
        }
    }
}

#[cfg(test)]
mod streaming_tests {
    use super::*;

    #[test]
    fn test_document_from_a_trickling_source() {
        let tokenizer = RefCell::new(Tokenizer::new(ChunkedSource::new(DOCUMENT, 3)));
        let expected: Value = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(parse_tokens(&tokenizer).unwrap(), expected);
    }

    #[test]
    fn test_long_array_through_a_small_buffer() {
        let items: Vec<Value> = (0..500).map(|n| json!({ "n": n, "s": "x" })).collect();
        let text = serde_json::to_string(&Value::Array(items.clone())).unwrap();
        let config = TokenizerConfig::default().with_buffer_capacity(64);
        let tokenizer =
            RefCell::new(Tokenizer::with_config(ReadSource::from_text(&text), &config).unwrap());
        assert_eq!(parse_tokens(&tokenizer).unwrap(), Value::Array(items));
        assert_eq!(tokenizer.borrow().position(), text.len());
    }

    fn small_tokenizer(text: &str, capacity: usize) -> RefCell<Tokenizer<ReadSource<&[u8]>>> {
        let config = TokenizerConfig::default().with_buffer_capacity(capacity);
        RefCell::new(Tokenizer::with_config(ReadSource::from_text(text), &config).unwrap())
    }

    #[test]
    fn test_object_larger_than_the_buffer() {
        let text = r#"{"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6}"#;
        let tokenizer = small_tokenizer(text, 32);
        assert_eq!(
            parse_tokens(&tokenizer).unwrap(),
            json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6})
        );
    }

    #[test]
    fn test_nested_array_larger_than_the_buffer() {
        let text = "[[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]]";
        let tokenizer = small_tokenizer(text, 32);
        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parse_tokens(&tokenizer).unwrap(), expected);
    }

    #[test]
    fn test_deep_document_through_a_small_buffer() {
        let expected: Value = serde_json::from_str(DOCUMENT).unwrap();
        let tokenizer = small_tokenizer(DOCUMENT, 48);
        assert_eq!(parse_tokens(&tokenizer).unwrap(), expected);
    }

    #[test]
    fn test_failure_before_any_container_rewinds_the_tokenizer() {
        let tokenizer = small_tokenizer("   tru", 16);
        let err = parse_tokens(&tokenizer).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(tokenizer.borrow().position(), 0);
    }

    #[test]
    fn test_failure_inside_a_container_is_committed() {
        let tokenizer = small_tokenizer("[1, 2 3]", 16);
        let err = parse_tokens(&tokenizer).unwrap_err();
        assert!(matches!(err, ParseError::Committed { position: 1, .. }));
    }
}
