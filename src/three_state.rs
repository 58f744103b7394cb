//! The three-state optional used by partial-update payloads.
//!
//! Plain `Option<T>` collapses "key absent" and "key present as null" into
//! the same `None`. Partial-update fields need to tell those apart, so this
//! module gives them a dedicated sum type with hand-written `Serialize`/
//! `Deserialize` impls that inspect key presence directly via
//! `#[serde(default, deserialize_with = ...)]` on the *containing* struct's
//! field, not on `ThreeState` itself — see the field-level helpers below.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A field that can be undefined (omitted), explicitly null (clear), or
/// carry a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ThreeState<T> {
    #[default]
    Undefined,
    Null,
    Value(T),
}

impl<T> ThreeState<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, ThreeState::Undefined)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            ThreeState::Undefined | ThreeState::Null => None,
            ThreeState::Value(v) => Some(v),
        }
    }
}

/// Used as `#[serde(skip_serializing_if = "three_state::is_undefined")]` on
/// the containing struct's field.
pub fn is_undefined<T>(state: &ThreeState<T>) -> bool {
    state.is_undefined()
}

/// Serializes the field: emits nothing when undefined (paired with
/// `skip_serializing_if`), `null` when null, or the encoded value.
pub fn serialize<S, T>(state: &ThreeState<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match state {
        ThreeState::Undefined => serializer.serialize_none(),
        ThreeState::Null => serializer.serialize_none(),
        ThreeState::Value(v) => v.serialize(serializer),
    }
}

/// Deserializes a present key into `Null` or `Value(T)`. Must be paired with
/// `#[serde(default)]` on the field so an absent key leaves it `Undefined`
/// (the `Default` impl above), since serde only calls a field's
/// `deserialize_with` when the key is present in the input map.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<ThreeState<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => ThreeState::Null,
        Some(v) => ThreeState::Value(v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize as De, Serialize as Se};

    #[derive(Debug, Se, De, PartialEq, Default)]
    struct SessionInfoUpdate {
        #[serde(
            default,
            skip_serializing_if = "is_undefined",
            serialize_with = "serialize",
            deserialize_with = "deserialize"
        )]
        title: ThreeState<String>,
        #[serde(
            default,
            skip_serializing_if = "is_undefined",
            serialize_with = "serialize",
            deserialize_with = "deserialize"
        )]
        updated_at: ThreeState<String>,
    }

    #[test]
    fn value_omits_undefined_sibling() {
        let p = SessionInfoUpdate {
            title: ThreeState::Value("Test".to_string()),
            updated_at: ThreeState::Undefined,
        };
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"title":"Test"}"#);
    }

    #[test]
    fn explicit_null_decodes_to_null_variant() {
        let p: SessionInfoUpdate = serde_json::from_str(r#"{"title":null}"#).unwrap();
        assert_eq!(p.title, ThreeState::Null);
        assert_eq!(p.updated_at, ThreeState::Undefined);
    }

    #[test]
    fn empty_object_decodes_both_undefined() {
        let p: SessionInfoUpdate = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p, SessionInfoUpdate::default());
    }
}
