//! JSONPath extraction modifier

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::context::Context;
use crate::error::ModifierError;
use crate::modifier::SecretModifier;

/// `?jp=<JSONPath>`: select one value out of a JSON secret.
///
/// When the path selects several values, or a single array, the first element
/// is used. Strings come out verbatim, numbers and booleans in their plain
/// textual form, objects and arrays as compact JSON. Selecting `null` is an
/// error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretModifierJsonPath;

impl SecretModifier for SecretModifierJsonPath {
    fn kind(&self) -> &str {
        "jp"
    }

    fn modify(&self, _ctx: &Context, value: &str, arg: &str) -> Result<String, ModifierError> {
        let document: Value = serde_json::from_str(value).map_err(ModifierError::NotJson)?;

        let path = JsonPath::parse(arg).map_err(|e| ModifierError::JsonPathFailed {
            path: arg.to_string(),
            source: Box::new(e),
        })?;

        let nodes = path.query(&document).all();
        let selected = match nodes.as_slice() {
            [] => {
                return Err(ModifierError::JsonPathFailed {
                    path: arg.to_string(),
                    source: "no value matched".into(),
                })
            }
            [single] => (*single).clone(),
            many => Value::Array(many.iter().map(|v| (*v).clone()).collect()),
        };

        let selected = match selected {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        };

        stringify(selected)
    }
}

fn stringify(value: Value) -> Result<String, ModifierError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(format_number(&n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(ModifierError::MatchFailed {
            reason: "JSONPath selected null".to_string(),
        }),
        other => serde_json::to_string(&other).map_err(|e| ModifierError::MatchFailed {
            reason: e.to_string(),
        }),
    }
}

/// Integers as integers, everything else in shortest plain decimal form
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "string": "value",
        "num": 123,
        "float": 1.50,
        "big": 1e21,
        "bool": true,
        "nothing": null,
        "list": ["a", "b"],
        "empty": [],
        "nested": {"key": "value"},
        "users": [{"name": "alice"}, {"name": "bob"}],
        "phoneNumbers": [{"type": "iPhone"}, {"type": "home"}]
    }"#;

    fn jp(path: &str) -> Result<String, ModifierError> {
        SecretModifierJsonPath.modify(&Context::background(), DOC, path)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(jp("$.string").unwrap(), "value");
        assert_eq!(jp("$.num").unwrap(), "123");
        assert_eq!(jp("$.float").unwrap(), "1.5");
        assert_eq!(jp("$.big").unwrap(), "1000000000000000000000");
        assert_eq!(jp("$.bool").unwrap(), "true");
    }

    #[test]
    fn test_first_match() {
        assert_eq!(jp("$.list").unwrap(), "a");
        assert_eq!(jp("$.users[*].name").unwrap(), "alice");
        assert_eq!(jp("$.phoneNumbers[0].type").unwrap(), "iPhone");
    }

    #[test]
    fn test_structures_serialize_back_to_json() {
        assert_eq!(jp("$.nested").unwrap(), r#"{"key":"value"}"#);
        assert_eq!(jp("$.empty").unwrap(), "[]");
    }

    #[test]
    fn test_null_is_match_failure() {
        assert!(matches!(
            jp("$.nothing"),
            Err(ModifierError::MatchFailed { .. })
        ));
    }

    #[test]
    fn test_no_match() {
        assert!(matches!(
            jp("$.missing"),
            Err(ModifierError::JsonPathFailed { ref path, .. }) if path == "$.missing"
        ));
    }

    #[test]
    fn test_invalid_path() {
        assert!(matches!(
            jp("$[?"),
            Err(ModifierError::JsonPathFailed { .. })
        ));
    }

    #[test]
    fn test_not_json() {
        let result = SecretModifierJsonPath.modify(&Context::background(), "not json", "$.a");
        assert!(matches!(result, Err(ModifierError::NotJson(_))));
    }
}
