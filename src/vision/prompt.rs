//! Label-reading instruction and the strict output schema
//!
//! The schema is described as data once and checked against the rules of
//! strict structured output (every property required, no additional
//! properties) before any request is made.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Name attached to the schema in the `response_format` block
pub const SCHEMA_NAME: &str = "label_reader";

/// Instruction sent ahead of the label images
pub const LABEL_READER_PROMPT: &str = "\
You will be provided with a set of images corresponding to a single product. \
These images are found printed on the packaging of the product.
Your goal will be to extract information from these images to populate the schema provided. \
Here is some information you will routinely encounter. \
Ensure that you capture complete information, especially for nutritional information and ingredients:
- Ingredients: List of ingredients in the item. They may have some percent listed in brackets. \
They may also have metadata or classification like Preservative (INS 211) where INS 211 forms the metadata. \
Structure accordingly. If ingredients have subingredients like sugar: added sugar, trans sugar, \
treat them as different ingredients.
- Claims: Like a mango fruit juice says contains fruit.
- Nutritional Information: This will have nutrients, serving size, and nutrients listed per serving. \
Extract the base value for reference.
- FSSAI License number: Extract the license number. There might be many, so store relevant ones.
- Name: Extract the name of the product.
- Brand/Manufactured By: Extract the parent company of this product.
- Serving size: This might be explicitly stated or inferred from the nutrients per serving.
";

/// Strict output schema for a product record
pub static LABEL_SCHEMA: Lazy<Value> = Lazy::new(build_label_schema);

/// Schema validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{0}: missing \"type\"")]
    MissingType(String),

    #[error("{path}: unsupported type \"{kind}\"")]
    UnsupportedType { path: String, kind: String },

    #[error("{0}: object has no \"properties\"")]
    MissingProperties(String),

    #[error("{0}: array has no \"items\"")]
    MissingItems(String),

    #[error("{path}: property \"{field}\" is not required")]
    OptionalField { path: String, field: String },

    #[error("{path}: required field \"{field}\" has no property")]
    UnknownRequired { path: String, field: String },

    #[error("{0}: object must set \"additionalProperties\": false")]
    OpenObject(String),
}

fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn array(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn number() -> Value {
    json!({ "type": "number" })
}

fn quantity() -> Value {
    object(json!({
        "quantity": number(),
        "unit": string(),
    }))
}

fn build_label_schema() -> Value {
    object(json!({
        "productName": string(),
        "brandName": string(),
        "ingredients": array(object(json!({
            "name": string(),
            "percent": string(),
            "metadata": string(),
        }))),
        "servingSize": quantity(),
        "packagingSize": quantity(),
        "servingsPerPack": number(),
        "nutritionalInformation": array(object(json!({
            "name": string(),
            "unit": string(),
            "values": array(object(json!({
                "base": string(),
                "value": number(),
            }))),
        }))),
        "fssaiLicenseNumbers": array(number()),
        "claims": array(string()),
        "shelfLife": string(),
    }))
}

/// Build the `response_format` block for a chat-completions request
pub fn response_format(schema: &Value) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": SCHEMA_NAME,
            "schema": schema,
            "strict": true
        }
    })
}

/// Check a schema against the strict structured-output rules
pub fn validate_schema(schema: &Value) -> Result<(), SchemaError> {
    validate_node(schema, "$")
}

fn validate_node(node: &Value, path: &str) -> Result<(), SchemaError> {
    let kind = node
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::MissingType(path.to_string()))?;

    match kind {
        "object" => {
            let properties = node
                .get("properties")
                .and_then(Value::as_object)
                .ok_or_else(|| SchemaError::MissingProperties(path.to_string()))?;

            let required: Vec<&str> = node
                .get("required")
                .and_then(Value::as_array)
                .map(|fields| fields.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            if let Some(field) = properties.keys().find(|k| !required.contains(&k.as_str())) {
                return Err(SchemaError::OptionalField {
                    path: path.to_string(),
                    field: field.clone(),
                });
            }

            if let Some(field) = required.iter().find(|f| !properties.contains_key(**f)) {
                return Err(SchemaError::UnknownRequired {
                    path: path.to_string(),
                    field: field.to_string(),
                });
            }

            if node.get("additionalProperties") != Some(&Value::Bool(false)) {
                return Err(SchemaError::OpenObject(path.to_string()));
            }

            for (name, child) in properties {
                validate_node(child, &format!("{}.{}", path, name))?;
            }
            Ok(())
        }
        "array" => {
            let items = node
                .get("items")
                .ok_or_else(|| SchemaError::MissingItems(path.to_string()))?;
            validate_node(items, &format!("{}[]", path))
        }
        "string" | "number" | "integer" | "boolean" => Ok(()),
        other => Err(SchemaError::UnsupportedType {
            path: path.to_string(),
            kind: other.to_string(),
        }),
    }
}
