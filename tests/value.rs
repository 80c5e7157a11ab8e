// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use tplusage::Value;

#[test]
fn serialize_numbers() -> Result<()> {
    // integer data survives a round trip without gaining a fraction
    assert_eq!(serde_json::to_string(&Value::from(1i64))?, "1");
    assert_eq!(serde_json::to_string(&Value::from(-1i64))?, "-1");
    assert_eq!(serde_json::to_string(&Value::from(1.5f64))?, "1.5");
    Ok(())
}

#[test]
fn serialize_string() -> Result<()> {
    assert_eq!(
        serde_json::to_string(&Value::from("Hello, World\n"))?,
        "\"Hello, World\\n\""
    );
    Ok(())
}

#[test]
fn json_round_trip() -> Result<()> {
    let text = r#"{"a": {"b": [1, 2.5, "x", null, true]}, "c": {}}"#;
    let value = Value::from_json_str(text)?;
    let back = Value::from_json_str(&value.to_json_str()?)?;
    assert_eq!(value, back);
    Ok(())
}

#[test]
fn constructors() -> Result<()> {
    assert_eq!(Value::new_object(), Value::from_json_str("{}")?);
    assert_eq!(Value::new_array(), Value::from_json_str("[]")?);
    assert!(Value::from_json_str("null")?.is_null());
    Ok(())
}

#[test]
fn object_and_array_indexing() -> Result<()> {
    let value = Value::from_json_str(r#"{"list": [1, 2, 3], "k": "v"}"#)?;
    assert_eq!(value["k"], Value::from("v"));
    assert_eq!(value["list"][1], Value::from(2i64));

    // out-of-range and missing lookups degrade to null
    assert!(value["list"][9].is_null());
    assert!(value["nope"].is_null());
    assert!(value["k"]["nested"].is_null());
    Ok(())
}

#[test]
fn truthiness() -> Result<()> {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::from(false).is_truthy());
    assert!(!Value::from(0i64).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!Value::from_json_str("[]")?.is_truthy());
    assert!(!Value::from_json_str("{}")?.is_truthy());

    assert!(Value::from(true).is_truthy());
    assert!(Value::from(0.5f64).is_truthy());
    assert!(Value::from("x").is_truthy());
    assert!(Value::from_json_str("[0]")?.is_truthy());
    assert!(Value::from_json_str(r#"{"a": null}"#)?.is_truthy());
    Ok(())
}

#[test]
fn accessors() -> Result<()> {
    let value = Value::from_json_str(r#"{"list": [1], "s": "x", "n": 3}"#)?;
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 3);
    assert!(obj["list"].as_array().is_some());
    assert!(obj["s"].as_string().is_some());
    assert_eq!(obj["n"].as_number().and_then(|n| n.as_i64()), Some(3));
    assert!(obj["s"].as_object().is_none());
    Ok(())
}
