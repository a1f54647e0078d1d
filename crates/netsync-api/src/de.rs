// Lenient deserializers for NetBox response shapes.
//
// NetBox returns references as nested objects (`{"id": 3, "url": ...}`)
// and choice fields as `{"value": "...", "label": "..."}`, but accepts
// plain ids and plain values on write. Records deserialize from either
// form so the same types round-trip through in-process stores.

use serde::{Deserialize, Deserializer};

use crate::resource::RecordId;

#[derive(Deserialize)]
#[serde(untagged)]
enum RefRepr {
    Id(RecordId),
    Nested { id: RecordId },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceRepr {
    Value(String),
    Nested { value: String },
}

/// `null`, an id, or a nested `{id}` object.
pub(crate) fn option_ref<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RefRepr>::deserialize(deserializer)?.map(|r| match r {
        RefRepr::Id(id) | RefRepr::Nested { id } => id,
    }))
}

/// A plain choice value or a nested `{value, label}` object.
pub(crate) fn option_choice<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<ChoiceRepr>::deserialize(deserializer)?.map(|c| match c {
            ChoiceRepr::Value(v) | ChoiceRepr::Nested { value: v } => v,
        }),
    )
}

/// Treat `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "option_ref")]
        site: Option<RecordId>,
        #[serde(default, deserialize_with = "option_choice")]
        status: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        serial: String,
    }

    #[test]
    fn nested_reference_and_choice() {
        let p: Sample = serde_json::from_value(json!({
            "site": { "id": 7, "name": "HQ" },
            "status": { "value": "active", "label": "Active" },
            "serial": null
        }))
        .unwrap();
        assert_eq!(p.site, Some(RecordId(7)));
        assert_eq!(p.status.as_deref(), Some("active"));
        assert!(p.serial.is_empty());
    }

    #[test]
    fn flat_reference_and_choice() {
        let p: Sample =
            serde_json::from_value(json!({ "site": 7, "status": "active", "serial": "X" }))
                .unwrap();
        assert_eq!(p.site, Some(RecordId(7)));
        assert_eq!(p.status.as_deref(), Some("active"));
        assert_eq!(p.serial, "X");
    }

    #[test]
    fn missing_fields_default() {
        let p: Sample = serde_json::from_value(json!({})).unwrap();
        assert!(p.site.is_none());
        assert!(p.status.is_none());
    }
}
