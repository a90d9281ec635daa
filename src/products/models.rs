//! Data models for product records

use mongodb::bson::oid::ObjectId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// Name of the identifier field assigned by the document store
pub const ID_FIELD: &str = "_id";

/// Quantity with unit, e.g. serving or packaging size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quantity {
    pub quantity: Number,
    pub unit: String,
}

/// Single ingredient as printed on the label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub name: String,
    /// Percentage as printed, e.g. "12%" or "" when absent
    pub percent: String,
    /// Classification or additive code, e.g. "INS 211"
    pub metadata: String,
}

/// Nutrient value against a reference base ("per 100g", "per serving")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NutrientValue {
    pub base: String,
    pub value: Number,
}

/// One row of the nutrition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Nutrient {
    pub name: String,
    pub unit: String,
    pub values: Vec<NutrientValue>,
}

/// Structured label data extracted from package photos
///
/// Every field is required and unknown fields are rejected, mirroring the
/// strict output schema sent to the model. Numbers are kept as
/// [`serde_json::Number`] so the persisted value is exactly what the model
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductRecord {
    pub product_name: String,
    pub brand_name: String,
    pub ingredients: Vec<Ingredient>,
    pub serving_size: Quantity,
    pub packaging_size: Quantity,
    pub servings_per_pack: Number,
    pub nutritional_information: Vec<Nutrient>,
    pub fssai_license_numbers: Vec<Number>,
    pub claims: Vec<String>,
    pub shelf_life: String,
}

impl ProductRecord {
    /// Render the record as a JSON object keyed by its wire field names
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde::ser::Error::custom(format!(
                "product record serialized to non-object: {}",
                other
            ))),
        }
    }
}

/// Invalid product identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid product id: {0}")]
pub struct InvalidProductId(pub String);

/// Store-assigned product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(ObjectId);

impl ProductId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for ProductId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for ProductId {
    type Err = InvalidProductId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidProductId(s.to_string()))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// A stored product as returned by lookups
///
/// Fields are passed through as stored. The identifier is kept in its
/// canonical string form, which for store-assigned ids is the 24-digit hex of
/// the ObjectId; documents written by other tools may carry any other `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl ProductDocument {
    pub fn new(id: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        fields.remove(ID_FIELD);
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn product_name(&self) -> Option<&str> {
        self.fields.get("productName").and_then(Value::as_str)
    }
}

impl Serialize for ProductDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::choco_bar_payload;
    use super::*;

    #[test]
    fn test_record_parses_complete_payload() {
        let record: ProductRecord = serde_json::from_value(choco_bar_payload()).unwrap();
        assert_eq!(record.product_name, "Choco Bar");
        assert_eq!(record.ingredients.len(), 3);
        assert_eq!(record.ingredients[2].metadata, "INS 211");
        assert_eq!(record.nutritional_information[0].values.len(), 2);
    }

    #[test]
    fn test_record_fields_match_payload() {
        let payload = choco_bar_payload();
        let record: ProductRecord = serde_json::from_value(payload.clone()).unwrap();
        let fields = record.to_fields().unwrap();
        assert_eq!(Value::Object(fields), payload);
    }

    #[test]
    fn test_license_numbers_stay_integers() {
        let record: ProductRecord = serde_json::from_value(choco_bar_payload()).unwrap();
        let rendered = serde_json::to_string(&record.fssai_license_numbers).unwrap();
        assert_eq!(rendered, "[10012345678901,10098765432109]");
    }

    #[test]
    fn test_record_rejects_missing_field() {
        let mut payload = choco_bar_payload();
        payload.as_object_mut().unwrap().remove("shelfLife");
        assert!(serde_json::from_value::<ProductRecord>(payload).is_err());
    }

    #[test]
    fn test_record_rejects_null_field() {
        let mut payload = choco_bar_payload();
        payload["claims"] = Value::Null;
        assert!(serde_json::from_value::<ProductRecord>(payload).is_err());
    }

    #[test]
    fn test_record_rejects_unknown_field() {
        let mut payload = choco_bar_payload();
        payload["servingSize"]["grams"] = Value::from(20);
        assert!(serde_json::from_value::<ProductRecord>(payload).is_err());
    }

    #[test]
    fn test_product_id_round_trip() {
        let id: ProductId = "65f1c0ffee0000000000beef".parse().unwrap();
        assert_eq!(id.to_string(), "65f1c0ffee0000000000beef");
    }

    #[test]
    fn test_product_id_canonical_lowercase() {
        let id: ProductId = "65F1C0FFEE0000000000BEEF".parse().unwrap();
        assert_eq!(id.to_string(), "65f1c0ffee0000000000beef");
    }

    #[test]
    fn test_product_id_rejects_malformed() {
        assert!("not-an-id".parse::<ProductId>().is_err());
        assert!("65f1c0ffee".parse::<ProductId>().is_err());
        assert_eq!(
            "xyz".parse::<ProductId>().unwrap_err().to_string(),
            "Invalid product id: xyz"
        );
    }

    #[test]
    fn test_document_serializes_string_id() {
        let id = ProductId::new();
        let mut fields = Map::new();
        fields.insert("productName".to_string(), Value::from("Choco Bar"));
        fields.insert(ID_FIELD.to_string(), Value::from("stale"));

        let document = ProductDocument::new(id.to_string(), fields);
        assert_eq!(document.product_name(), Some("Choco Bar"));

        let rendered = serde_json::to_value(&document).unwrap();
        assert_eq!(rendered[ID_FIELD], Value::from(id.to_string()));
        assert_eq!(rendered["productName"], "Choco Bar");
    }
}
