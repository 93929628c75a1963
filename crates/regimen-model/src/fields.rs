//! Field-level override primitives
//!
//! Stored override documents are sparse: a key that is absent means "no
//! override". [`FieldOverride`] keeps that distinction explicit instead of
//! folding it into `Option`, so `image_url: null` (clear the image) and a
//! missing `image_url` (inherit it) stay different values.
//!
//! Which raw values count as an override is a per-field decision made once,
//! through the [`ScalarField`] table:
//!
//! | Field         | Presence  | Empty string wins? | `null` wins? |
//! |---------------|-----------|--------------------|--------------|
//! | `title`       | Truthy    | no                 | no           |
//! | `description` | Truthy    | no                 | no           |
//! | `image_url`   | Defined   | yes                | yes          |
//! | `order`       | Defined   | n/a                | yes          |
//!
//! After admission, precedence is uniform: the first tier holding `Set` wins.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque document fields (exercise/set payloads, unknown template keys).
pub type Fields = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// FieldOverride
// ============================================================================

/// A single overridable field: either not overridden, or overridden with a value.
///
/// Deserializes any present value (including `null`) as `Set`; pair it with
/// `#[serde(default)]` so an absent key becomes `Unset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldOverride<T> {
    Unset,
    Set(T),
}

impl<T> Default for FieldOverride<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> FieldOverride<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn unwrap_or(self, base: T) -> T {
        match self {
            Self::Set(v) => v,
            Self::Unset => base,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Set(v) => Some(v),
            Self::Unset => None,
        }
    }
}

impl<T> From<Option<T>> for FieldOverride<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Unset,
        }
    }
}

impl<T: Serialize> Serialize for FieldOverride<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Set(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldOverride<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Set)
    }
}

// ============================================================================
// Presence Policy
// ============================================================================

/// Values that have a notion of "empty".
pub trait Truthiness {
    fn is_truthy(&self) -> bool;
}

impl Truthiness for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthiness for i64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthiness for u64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthiness for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthiness for serde_json::Value {
    fn is_truthy(&self) -> bool {
        use serde_json::Value;
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

impl<T: Truthiness> Truthiness for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().map_or(false, Truthiness::is_truthy)
    }
}

/// How a stored value is admitted as an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Only non-empty values override.
    Truthy,
    /// Any present value overrides, including `null` and `""`.
    Defined,
}

impl Presence {
    pub fn admit<T: Truthiness>(self, raw: FieldOverride<T>) -> FieldOverride<T> {
        match (self, raw) {
            (Presence::Defined, raw) => raw,
            (Presence::Truthy, FieldOverride::Set(v)) if v.is_truthy() => FieldOverride::Set(v),
            (Presence::Truthy, _) => FieldOverride::Unset,
        }
    }
}

/// Scalar fields that participate in tiered precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Title,
    Description,
    ImageUrl,
    Order,
}

impl ScalarField {
    pub const fn presence(self) -> Presence {
        match self {
            ScalarField::Title | ScalarField::Description => Presence::Truthy,
            ScalarField::ImageUrl | ScalarField::Order => Presence::Defined,
        }
    }
}

/// First admitted override among `tiers`, highest priority first.
pub fn precedence<T, I>(field: ScalarField, tiers: I) -> FieldOverride<T>
where
    T: Truthiness,
    I: IntoIterator<Item = FieldOverride<T>>,
{
    let presence = field.presence();
    tiers
        .into_iter()
        .map(|tier| presence.admit(tier))
        .find(FieldOverride::is_set)
        .unwrap_or_default()
}

/// Shallow merge: every key of `over` replaces the key in `base`, except `id`.
pub fn merge_fields(base: &mut Fields, over: &Fields) {
    for (key, value) in over {
        if key == "id" {
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
        image_url: FieldOverride<Option<String>>,
    }

    #[test]
    fn absent_key_is_unset_and_null_is_set() {
        let absent: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.image_url, FieldOverride::Unset);

        let cleared: Probe = serde_json::from_value(json!({ "image_url": null })).unwrap();
        assert_eq!(cleared.image_url, FieldOverride::Set(None));
    }

    #[test]
    fn unset_is_skipped_on_serialize() {
        let probe = Probe {
            image_url: FieldOverride::Unset,
        };
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({}));
    }

    #[test]
    fn truthy_presence_rejects_empty_string() {
        let tiers = [
            FieldOverride::Set(Some(String::new())),
            FieldOverride::Set(Some("B".to_string())),
        ];
        assert_eq!(
            precedence(ScalarField::Title, tiers),
            FieldOverride::Set(Some("B".to_string()))
        );
    }

    #[test]
    fn defined_presence_admits_empty_string_and_null() {
        let empty = [
            FieldOverride::Set(Some(String::new())),
            FieldOverride::Set(Some("b.png".to_string())),
        ];
        assert_eq!(
            precedence(ScalarField::ImageUrl, empty),
            FieldOverride::Set(Some(String::new()))
        );

        let null = [FieldOverride::Set(None), FieldOverride::Unset];
        assert_eq!(
            precedence::<Option<String>, _>(ScalarField::ImageUrl, null),
            FieldOverride::Set(None)
        );
    }

    #[test]
    fn order_zero_still_overrides() {
        let tiers = [FieldOverride::Set(Some(0i64)), FieldOverride::Set(Some(4))];
        assert_eq!(
            precedence(ScalarField::Order, tiers),
            FieldOverride::Set(Some(0))
        );
    }

    #[test]
    fn merge_fields_keeps_identity() {
        let mut base = json!({ "id": "e1", "reps": 10, "weight": 20 })
            .as_object()
            .cloned()
            .unwrap();
        let over = json!({ "id": "other", "reps": 12, "tempo": null })
            .as_object()
            .cloned()
            .unwrap();

        merge_fields(&mut base, &over);

        assert_eq!(base["id"], json!("e1"));
        assert_eq!(base["reps"], json!(12));
        assert_eq!(base["weight"], json!(20));
        assert_eq!(base["tempo"], json!(null));
    }
}
