use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A link to another record: either a bare id or an embedded document.
///
/// Serializes back to the bare id, which is what every write endpoint
/// expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub label: Option<String>,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Embedded label if present, otherwise the id.
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        let id = ["_id", "id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))?
            .to_string();
        let named = [
            "name",
            "brand_name",
            "category_name",
            "product_name",
        ]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::to_string);
        let label = named.or_else(|| {
            let first = map.get("first_name").and_then(Value::as_str)?;
            let last = map.get("last_name").and_then(Value::as_str).unwrap_or("");
            Some(format!("{first} {last}").trim().to_string())
        });
        Some(Self { id, label })
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Reference::new(id)),
            Value::Number(n) => Ok(Reference::new(n.to_string())),
            Value::Object(map) => Reference::from_object(&map)
                .ok_or_else(|| D::Error::custom("embedded reference has no `_id`")),
            other => Err(D::Error::custom(format!("invalid reference: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_a_bare_id() {
        let r: Reference = serde_json::from_value(json!("b-1")).unwrap();
        assert_eq!(r, Reference::new("b-1"));
    }

    #[test]
    fn accepts_an_embedded_document() {
        let r: Reference =
            serde_json::from_value(json!({"_id": "c-1", "first_name": "Ana", "last_name": "Lima"}))
                .unwrap();
        assert_eq!(r.id, "c-1");
        assert_eq!(r.display(), "Ana Lima");
    }

    #[test]
    fn serializes_to_the_id() {
        let r = Reference {
            id: "p-9".into(),
            label: Some("Chain".into()),
        };
        assert_eq!(serde_json::to_value(&r).unwrap(), json!("p-9"));
    }
}
