// SPDX-License-Identifier: Apache-2.0

// Selective extraction of data from a JSON document with the pull iterator.
use jsonspan::{iterate, Kind, ParseError};

// A more complex, "real-world" JSON document
const REAL_WORLD_JSON: &str = r#"
{
    "user_id": "u-12345",
    "username": "jdoe",
    "email": "jdoe@example.com",
    "is_active": true,
    "login_count": "17",
    "session_timeout": "1h30m",
    "feature_flags": {
        "new_dashboard": true,
        "beta_access": false,
        "experimental_api": null
    },
    "products": [
        {
            "product_id": "p-001",
            "name": "Widget A",
            "stock": 99,
            "tags": ["gadget", "tech"]
        },
        {
            "product_id": "p-002",
            "name": "Widget B",
            "stock": 150,
            "tags": ["gadget", "classic"]
        },
        {
            "product_id": "p-003",
            "name": "Widget C",
            "stock": 42,
            "tags": ["new", "tech"]
        }
    ],
    "metadata": {
        "last_login": "2025-06-29T10:00:00Z",
        "notes": "A string with an escape sequence \n here."
    }
}
"#;

#[derive(Default)]
struct ExtractedData {
    email: Option<String>,
    second_product_id: Option<String>,
    new_dashboard_status: Option<bool>,
    total_stock: u64,
    login_count: i64,
}

#[test_log::test]
fn test_selective_extraction() -> Result<(), ParseError> {
    let mut it = iterate(REAL_WORLD_JSON);
    assert!(it.next());

    let mut extracted = ExtractedData::default();
    let mut fields = it.object()?;
    while let Some(key) = fields.next(&mut it)? {
        match key.as_ref() {
            "email" => extracted.email = Some(it.string()?.into_owned()),
            "login_count" => extracted.login_count = it.int()?,
            "feature_flags" => {
                let mut flags = it.object()?;
                while let Some(flag) = flags.next(&mut it)? {
                    if flag == "new_dashboard" {
                        extracted.new_dashboard_status = Some(it.bool()?);
                    }
                }
            }
            "products" => {
                let mut products = it.array()?;
                while let Some(index) = products.next(&mut it)? {
                    let mut product = it.object()?;
                    while let Some(field) = product.next(&mut it)? {
                        match field.as_ref() {
                            "product_id" if index == 1 => {
                                extracted.second_product_id = Some(it.string()?.into_owned());
                            }
                            "stock" => extracted.total_stock += it.uint()?,
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }
    assert!(!it.next());
    assert_eq!(it.err(), None);

    assert_eq!(extracted.email.as_deref(), Some("jdoe@example.com"));
    assert_eq!(extracted.second_product_id.as_deref(), Some("p-002"));
    assert_eq!(extracted.new_dashboard_status, Some(true));
    assert_eq!(extracted.total_stock, 291);
    assert_eq!(extracted.login_count, 17);
    Ok(())
}

#[test_log::test]
fn test_materialize_one_subtree() {
    let mut it = iterate(REAL_WORLD_JSON);
    assert!(it.next());
    let mut fields = it.object().unwrap();
    let mut metadata = None;
    while let Some(key) = fields.next(&mut it).unwrap() {
        if key == "metadata" {
            metadata = Some(it.value().unwrap());
        }
    }
    let metadata = metadata.unwrap();
    assert_eq!(
        metadata.lookup("notes").unwrap().unwrap().as_str().unwrap(),
        "A string with an escape sequence \n here."
    );
    assert!(metadata.json().starts_with('{'));
    assert!(metadata.json().ends_with('}'));
}

#[test_log::test]
fn test_flat_walk_sees_every_value() {
    let mut it = iterate(REAL_WORLD_JSON);
    let mut strings = 0;
    let mut max_depth = 0;
    while it.next() {
        if it.kind() == Kind::String {
            strings += 1;
        }
        max_depth = max_depth.max(it.depth());
    }
    assert_eq!(it.err(), None);
    assert_eq!(strings, 19);
    assert_eq!(max_depth, 4);
}

#[cfg(feature = "time")]
#[test_log::test]
fn test_duration_and_time_readers() {
    use time::{Duration, OffsetDateTime};

    let mut it = iterate(REAL_WORLD_JSON);
    assert!(it.next());
    let mut timeout = Duration::ZERO;
    let mut last_login = OffsetDateTime::UNIX_EPOCH;
    let mut fields = it.object().unwrap();
    while let Some(key) = fields.next(&mut it).unwrap() {
        match key.as_ref() {
            "session_timeout" => timeout = it.duration().unwrap(),
            "metadata" => {
                let mut metadata = it.object().unwrap();
                while let Some(key) = metadata.next(&mut it).unwrap() {
                    if key == "last_login" {
                        last_login = it.time().unwrap();
                    }
                }
            }
            _ => {}
        }
    }
    assert_eq!(timeout, Duration::minutes(90));
    assert_eq!(last_login.unix_timestamp(), 1_751_191_200);
}
