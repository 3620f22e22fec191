//! Serde helpers for the loosely typed Iris REST payloads.
//!
//! The API reports flags as `0`/`1` from SQL and as `true`/`false` from
//! Python, sometimes in the same endpoint.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl BoolLike {
    fn into_bool(self) -> bool {
        match self {
            BoolLike::Bool(b) => b,
            BoolLike::Int(i) => i != 0,
            BoolLike::Str(s) => matches!(s.as_str(), "1" | "true" | "True"),
        }
    }
}

/// `true`, `1`, `"1"` → true; everything else → false
pub fn bool_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(BoolLike::deserialize(deserializer)?.into_bool())
}

/// Same as [`bool_from_any`] but `null` maps to `None`
pub fn opt_bool_from_any<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BoolLike>::deserialize(deserializer)?.map(BoolLike::into_bool))
}

/// `null` → empty string
pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serializes a flag the way the API expects it in request bodies
pub fn bool_as_int<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Deserialize, Serialize)]
    struct Flag {
        #[serde(deserialize_with = "bool_from_any", serialize_with = "bool_as_int")]
        active: bool,
        #[serde(default, deserialize_with = "opt_bool_from_any")]
        sent: Option<bool>,
    }

    #[test]
    fn test_bool_from_int_and_bool() {
        let f: Flag = serde_json::from_str(r#"{"active": 1}"#).unwrap();
        assert!(f.active);
        let f: Flag = serde_json::from_str(r#"{"active": 0}"#).unwrap();
        assert!(!f.active);
        let f: Flag = serde_json::from_str(r#"{"active": true}"#).unwrap();
        assert!(f.active);
        let f: Flag = serde_json::from_str(r#"{"active": "1"}"#).unwrap();
        assert!(f.active);
    }

    #[test]
    fn test_optional_flag() {
        let f: Flag = serde_json::from_str(r#"{"active": 0, "sent": null}"#).unwrap();
        assert_eq!(f.sent, None);
        let f: Flag = serde_json::from_str(r#"{"active": 0, "sent": 0}"#).unwrap();
        assert_eq!(f.sent, Some(false));
        let f: Flag = serde_json::from_str(r#"{"active": 0}"#).unwrap();
        assert_eq!(f.sent, None);
    }

    #[test]
    fn test_null_string() {
        #[derive(Deserialize)]
        struct Named {
            #[serde(default, deserialize_with = "string_or_null")]
            role: String,
        }
        let n: Named = serde_json::from_str(r#"{"role": null}"#).unwrap();
        assert_eq!(n.role, "");
        let n: Named = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(n.role, "");
        let n: Named = serde_json::from_str(r#"{"role": "user"}"#).unwrap();
        assert_eq!(n.role, "user");
    }

    #[test]
    fn test_serialize_as_int() {
        let json = serde_json::to_string(&Flag { active: true, sent: None }).unwrap();
        assert!(json.contains(r#""active":1"#));
    }
}
