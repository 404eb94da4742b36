// SPDX-License-Identifier: Apache-2.0

//! Property tests checking the parser, validator and iterator against serde_json.

use jsonspan::{
    iterate, parse, parse_max_depth, quote, unquote, valid, ParseError, Value, MAX_NESTING,
};
use proptest::prelude::*;

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(serde_json::Value::from),
        any::<u64>().prop_map(serde_json::Value::from),
        (-1.0e9..1.0e9f64).prop_map(serde_json::Value::from),
        any::<String>().prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(any::<String>(), inner, 0..6)
                .prop_map(|fields| serde_json::Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Pieces of JSON, valid and not, joined by whitespace into candidate documents.
fn arb_fragments() -> impl Strategy<Value = String> {
    let fragment = prop::sample::select(vec![
        "[", "]", "{", "}", ":", ",", "\"", r#""a""#, r#""""#, r#""\n""#, r#""\q""#, r#""\""#,
        "1", "-0", "01", "1.5", "1.", "2e3", "-", "true", "fals", "null", "nul", "x",
    ]);
    let space = prop::sample::select(vec![" ", "\n", "\t", "  "]);
    prop::collection::vec((fragment, space), 0..12).prop_map(|parts| {
        parts
            .into_iter()
            .flat_map(|(fragment, space)| [fragment, space])
            .collect()
    })
}

fn serde_reparse(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap()
}

fn count_values(value: &serde_json::Value) -> usize {
    1 + match value {
        serde_json::Value::Array(items) => items.iter().map(count_values).sum(),
        serde_json::Value::Object(fields) => fields.values().map(count_values).sum(),
        _ => 0,
    }
}

proptest! {
    #[test]
    fn valid_agrees_with_serde_json(text in arb_fragments()) {
        let expected = serde_json::from_str::<serde_json::Value>(&text).is_ok();
        prop_assert_eq!(valid(&text), expected, "{:?}", text);
        prop_assert_eq!(parse(&text).is_ok(), expected, "{:?}", text);

        let mut it = iterate(&text);
        while it.next() {}
        let walked = it.err().is_none() && !text.trim().is_empty();
        prop_assert_eq!(walked, expected, "{:?}", text);
    }

    #[test]
    fn generated_documents_round_trip(json in arb_json(), pretty in any::<bool>()) {
        let text = if pretty {
            serde_json::to_string_pretty(&json).unwrap()
        } else {
            serde_json::to_string(&json).unwrap()
        };
        let canonical = serde_json::to_string(&json).unwrap();

        prop_assert!(valid(&text));
        let value = parse(&text).unwrap();
        prop_assert_eq!(value.json(), text.as_str());

        let compact = value.compact().unwrap();
        prop_assert_eq!(&compact, &canonical);
        prop_assert_eq!(parse(&compact).unwrap().compact().unwrap(), compact.clone());
        prop_assert_eq!(&parse(&compact).unwrap(), &value);
        prop_assert_eq!(serde_reparse(&compact), serde_reparse(&text));
    }

    #[test]
    fn max_depth_is_transparent(json in arb_json(), max_depth in 0usize..=3) {
        let text = serde_json::to_string(&json).unwrap();
        let eager = parse(&text).unwrap();
        let lazy = parse_max_depth(&text, max_depth).unwrap();
        prop_assert_eq!(lazy.json(), eager.json());
        prop_assert_eq!(lazy.compact().unwrap(), eager.compact().unwrap());
        prop_assert_eq!(&lazy, &eager);
    }

    #[test]
    fn lookup_finds_every_field(json in arb_json()) {
        let text = serde_json::to_string(&json).unwrap();
        let expected = serde_reparse(&text);
        let value = parse_max_depth(&text, 1).unwrap();
        if let serde_json::Value::Object(fields) = &expected {
            prop_assert_eq!(value.len().unwrap(), fields.len());
            for (key, field) in fields {
                let found = value.lookup(key).unwrap();
                prop_assert!(found.is_some(), "missing {:?}", key);
                let found = found.unwrap();
                prop_assert_eq!(&serde_reparse(found.json()), field);
            }
            prop_assert_eq!(value.lookup("\u{0}not a generated key\u{0}").unwrap(), None);
        }
    }

    #[test]
    fn iterator_visits_every_value(json in arb_json()) {
        let text = serde_json::to_string_pretty(&json).unwrap();
        let mut it = iterate(&text);
        let mut visited = 0;
        while it.next() {
            visited += 1;
        }
        prop_assert!(it.err().is_none());
        prop_assert_eq!(visited, count_values(&serde_reparse(&text)));
    }

    #[test]
    fn quote_matches_serde_json(s in any::<String>()) {
        let quoted = quote(&s);
        prop_assert_eq!(&quoted, &serde_json::to_string(&s).unwrap());
        prop_assert_eq!(unquote(&quoted).unwrap(), s.as_str());
    }
}

fn nested(depth: usize, open: &str, close: &str, leaf: &str) -> String {
    let mut text = open.repeat(depth);
    text.push_str(leaf);
    text.push_str(&close.repeat(depth));
    text
}

#[test_log::test]
fn test_deep_arrays() {
    let text = nested(MAX_NESTING, "[", "]", "1");
    assert!(valid(&text));
    let value = parse(&text).unwrap();
    assert_eq!(parse_max_depth(&text, 1).unwrap(), value);
    assert_eq!(value.compact().unwrap(), text);

    let mut it = iterate(&text);
    let mut deepest = 0;
    while it.next() {
        deepest = deepest.max(it.depth());
    }
    assert!(it.err().is_none());
    assert_eq!(deepest, MAX_NESTING);
}

#[test_log::test]
fn test_very_deep_documents_fail_without_overflow() {
    let depth = 100_000;
    for (open, close) in [("[", "]"), (r#"{"k":"#, "}")] {
        let text = nested(depth, open, close, "null");
        assert!(valid(&text));
        assert!(matches!(
            parse(&text),
            Err(ParseError::NestingTooDeep { .. })
        ));
        assert!(matches!(
            parse_max_depth(&text, 1),
            Err(ParseError::NestingTooDeep { .. })
        ));

        let mut it = iterate(&text);
        let mut count = 0;
        while it.next() {
            count += 1;
        }
        assert_eq!(it.err(), None);
        assert_eq!(count, depth + 1);

        let mut it = iterate(&text);
        assert!(it.next());
        assert!(matches!(
            it.value(),
            Err(ParseError::NestingTooDeep { .. })
        ));
    }
}

#[test_log::test]
fn test_deep_objects_defer_level_by_level() {
    let text = nested(MAX_NESTING, r#"{"k":"#, "}", "null");
    assert!(valid(&text));
    let value = parse_max_depth(&text, 1).unwrap();

    let mut current: &Value<'_> = &value;
    for _ in 0..MAX_NESTING {
        current = current.lookup("k").unwrap().unwrap();
    }
    assert!(current.is_null());
    assert_eq!(value.compact().unwrap(), text);
}
