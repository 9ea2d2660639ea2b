//! JSON text ⇄ generic values.
use serde_json::Value;

use crate::error::{Error, Result};

/// Parse a JSON document, reporting the JSON path of the failure.
pub fn parse(src: &str) -> Result<Value> {
    let de = &mut serde_json::Deserializer::from_str(src);
    let value = match serde_path_to_error::deserialize::<_, Value>(&mut *de) {
        Ok(v) => v,
        Err(err) => {
            let path = err.path().to_string();
            return Err(Error::Json(format!("at JSON path {path} → {}", err.into_inner())));
        }
    };
    de.end().map_err(|err| Error::Json(err.to_string()))?;
    Ok(value)
}

/// Render a value; `indent == 0` gives compact output.
pub fn to_string(value: &Value, indent: usize) -> String {
    if indent == 0 {
        return value.to_string();
    }
    let pad = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&pad);
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    match serde::Serialize::serialize(value, &mut ser) {
        Ok(()) => String::from_utf8(out).unwrap_or_default(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_with_order_preserved() {
        let v = parse(r#"{"b": 1, "a": [true, null]}"#).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(v, json!({"b": 1, "a": [true, null]}));
    }

    #[test]
    fn reports_trailing_garbage() {
        assert!(matches!(parse("{} {}"), Err(Error::Json(_))));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse(r#"{"a": [1, }"#).unwrap_err();
        assert!(err.to_string().starts_with("parse json: at JSON path"));
    }

    #[test]
    fn pretty_and_compact() {
        let v = json!({"a": [1]});
        assert_eq!(to_string(&v, 0), r#"{"a":[1]}"#);
        assert_eq!(to_string(&v, 2), "{\n  \"a\": [\n    1\n  ]\n}");
    }
}
