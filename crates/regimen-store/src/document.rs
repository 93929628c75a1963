//! Documents and ordered collection scans.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A stored document: its id, full path, and JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub path: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, path: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            data,
        }
    }

    pub fn from_value(
        id: impl Into<String>,
        path: impl Into<String>,
        value: Value,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        match value {
            Value::Object(data) => Ok(Self::new(id, path, data)),
            _ => Err(StoreError::NotAnObject { path }),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Decodes into a typed view. The document id is injected as `id` unless
    /// the body already carries one.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        data.entry("id")
            .or_insert_with(|| Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(data)).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values used by ordered scans: null, booleans,
/// numbers, strings, arrays, objects.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Orders documents ascending by `field`, dropping documents that lack it.
/// Ties break by document id.
pub fn order_documents(documents: Vec<Document>, field: &str) -> Vec<Document> {
    let mut ordered: Vec<Document> = documents
        .into_iter()
        .filter(|doc| doc.data.contains_key(field))
        .collect();
    ordered.sort_by(|a, b| {
        let (x, y) = (&a.data[field], &b.data[field]);
        compare_values(x, y).then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn doc(id: &str, body: Value) -> Document {
        Document::from_value(id, format!("c/{id}"), body).unwrap()
    }

    #[test]
    fn orders_numerically_and_drops_unordered() {
        let docs = vec![
            doc("a", json!({ "order": 10 })),
            doc("b", json!({ "order": 2 })),
            doc("c", json!({ "name": "no order" })),
            doc("d", json!({ "order": 2 })),
            doc("e", json!({ "order": "x" })),
        ];

        let ids: Vec<String> = order_documents(docs, "order")
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "a", "e"]);
    }

    #[test]
    fn decode_injects_document_id() {
        #[derive(Deserialize)]
        struct Named {
            id: String,
            name: String,
        }

        let named: Named = doc("x1", json!({ "name": "Squat" })).decode().unwrap();
        assert_eq!(named.id, "x1");
        assert_eq!(named.name, "Squat");
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(matches!(
            Document::from_value("a", "c/a", json!([1, 2])),
            Err(StoreError::NotAnObject { .. })
        ));
    }
}
