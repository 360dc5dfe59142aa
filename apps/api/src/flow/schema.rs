//! Schema Validator: one tagged schema description per record, shared by the
//! validator, the template compiler and the backend response-schema encoder.
//!
//! Validation fails closed and collects every error in a single pass, so a
//! caller can render all field messages at once.

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Maximum characters of a string value echoed back in a validation error.
const SUMMARY_MAX_CHARS: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// UTF-8 string with a minimum length in characters (0 = any).
    String { min_len: usize },
    Number,
    Boolean,
    /// Closed set of literal strings.
    Enum(Vec<String>),
    Array(Box<Schema>),
    Object(Vec<Field>),
    /// `data:<mime>;base64,<payload>` string carrying a file.
    DataUri,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn required(name: &str, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            schema,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: &str, schema: Schema) -> Self {
        Self {
            required: false,
            ..Self::required(name, schema)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

impl Schema {
    pub fn string() -> Self {
        Schema::String { min_len: 0 }
    }

    /// Non-empty string.
    pub fn text() -> Self {
        Schema::String { min_len: 1 }
    }

    pub fn string_min(min_len: usize) -> Self {
        Schema::String { min_len }
    }

    pub fn number() -> Self {
        Schema::Number
    }

    pub fn boolean() -> Self {
        Schema::Boolean
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object(fields)
    }

    pub fn data_uri() -> Self {
        Schema::DataUri
    }

    /// Looks up a top-level field of an object schema.
    pub fn field(&self, name: &str) -> Option<&Field> {
        match self {
            Schema::Object(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Short human-readable description of the expected shape.
    pub fn expected(&self) -> String {
        match self {
            Schema::String { min_len: 0 } => "string".to_string(),
            Schema::String { min_len: 1 } => "non-empty string".to_string(),
            Schema::String { min_len } => format!("string of at least {min_len} characters"),
            Schema::Number => "number".to_string(),
            Schema::Boolean => "boolean".to_string(),
            Schema::Enum(values) => format!("one of [{}]", values.join(", ")),
            Schema::Array(items) => format!("array of {}", items.expected()),
            Schema::Object(_) => "object".to_string(),
            Schema::DataUri => "data URI (data:<mime>;base64,<payload>)".to_string(),
        }
    }

    /// Encodes the schema in the OpenAPI subset accepted by the backend's
    /// `responseSchema` generation option.
    pub fn to_response_schema(&self) -> Value {
        match self {
            Schema::String { .. } | Schema::DataUri => json!({ "type": "STRING" }),
            Schema::Number => json!({ "type": "NUMBER" }),
            Schema::Boolean => json!({ "type": "BOOLEAN" }),
            Schema::Enum(values) => json!({ "type": "STRING", "format": "enum", "enum": values }),
            Schema::Array(items) => json!({ "type": "ARRAY", "items": items.to_response_schema() }),
            Schema::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    let mut encoded = field.schema.to_response_schema();
                    if let (Some(description), Some(obj)) =
                        (&field.description, encoded.as_object_mut())
                    {
                        obj.insert("description".to_string(), json!(description));
                    }
                    properties.insert(field.name.clone(), encoded);
                }
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name.as_str())
                    .collect();
                let ordering: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                    "propertyOrdering": ordering,
                })
            }
        }
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}: expected {expected}, got {actual}", display_path(.path))]
pub struct ValidationError {
    /// Field path such as `sections[2].score`; empty for the root value.
    pub path: String,
    pub expected: String,
    pub actual: String,
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}

/// Validates `value` against `schema`.
///
/// Returns the validated value with undeclared object fields removed and
/// `null` optionals dropped, or every error found.
pub fn validate(schema: &Schema, value: &Value) -> Result<Value, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let validated = check(schema, value, "", &mut errors);
    match validated {
        Some(v) if errors.is_empty() => Ok(v),
        _ => Err(errors),
    }
}

fn check(
    schema: &Schema,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    let fail = |errors: &mut Vec<ValidationError>| -> Option<Value> {
        errors.push(ValidationError {
            path: path.to_string(),
            expected: schema.expected(),
            actual: summarize(value),
        });
        None
    };

    match schema {
        Schema::String { min_len } => match value.as_str() {
            Some(s) if s.chars().count() >= *min_len => Some(value.clone()),
            _ => fail(errors),
        },
        Schema::Number => match value {
            Value::Number(_) => Some(value.clone()),
            _ => fail(errors),
        },
        Schema::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            _ => fail(errors),
        },
        Schema::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.iter().any(|a| a == s) => Some(value.clone()),
            _ => fail(errors),
        },
        Schema::DataUri => match value.as_str().and_then(parse_data_uri) {
            Some(_) => Some(value.clone()),
            None => fail(errors),
        },
        Schema::Array(items) => {
            let Some(arr) = value.as_array() else {
                return fail(errors);
            };
            let before = errors.len();
            let checked: Vec<Value> = arr
                .iter()
                .enumerate()
                .filter_map(|(i, item)| check(items, item, &format!("{path}[{i}]"), errors))
                .collect();
            (errors.len() == before).then_some(Value::Array(checked))
        }
        Schema::Object(fields) => {
            let Some(map) = value.as_object() else {
                return fail(errors);
            };
            let before = errors.len();
            let mut out = Map::new();
            for field in fields {
                let field_path = if path.is_empty() {
                    field.name.clone()
                } else {
                    format!("{path}.{}", field.name)
                };
                match map.get(&field.name) {
                    None | Some(Value::Null) => {
                        if field.required {
                            errors.push(ValidationError {
                                path: field_path,
                                expected: field.schema.expected(),
                                actual: "missing".to_string(),
                            });
                        }
                    }
                    Some(v) => {
                        if let Some(checked) = check(&field.schema, v, &field_path, errors) {
                            out.insert(field.name.clone(), checked);
                        }
                    }
                }
            }
            (errors.len() == before).then_some(Value::Object(out))
        }
    }
}

/// Short description of a value for error messages; never echoes long text.
fn summarize(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => {
            let count = s.chars().count();
            if count > SUMMARY_MAX_CHARS {
                let head: String = s.chars().take(SUMMARY_MAX_CHARS).collect();
                format!("string {head:?}… ({count} chars)")
            } else {
                format!("string {s:?}")
            }
        }
        Value::Array(a) => format!("array of {} items", a.len()),
        Value::Object(_) => "object".to_string(),
    }
}

/// A decoded `data:` URI. The payload stays base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

/// Parses `data:<mime>;base64,<payload>`. Returns `None` for anything else,
/// including non-base64 payloads.
pub fn parse_data_uri(s: &str) -> Option<DataUri<'_>> {
    let rest = s.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64")?;
    // Parameters such as `;charset=` may precede `;base64`.
    let mime_type = mime_type.split(';').next()?;
    if mime_type.is_empty() || !mime_type.contains('/') || data.is_empty() {
        return None;
    }
    let is_base64 = data
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='));
    is_base64.then_some(DataUri { mime_type, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_schema() -> Schema {
        Schema::object(vec![
            Field::required("name", Schema::text()),
            Field::required("age", Schema::number()),
            Field::optional("stage", Schema::enumeration(["before", "during", "after"])),
            Field::optional(
                "scores",
                Schema::array(Schema::object(vec![
                    Field::required("label", Schema::string()),
                    Field::required("score", Schema::number()),
                ])),
            ),
        ])
    }

    #[test]
    fn test_accepts_conforming_value() {
        let value = json!({"name": "Ada", "age": 20, "stage": "during"});
        let validated = validate(&profile_schema(), &value).unwrap();
        assert_eq!(validated, value);
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let errors = validate(&profile_schema(), &json!({"age": 20})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "name");
        assert_eq!(errors[0].actual, "missing");
    }

    #[test]
    fn test_collects_multiple_errors_in_one_pass() {
        let errors =
            validate(&profile_schema(), &json!({"name": "", "age": "20", "stage": "x"}))
                .unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "age", "stage"]);
    }

    #[test]
    fn test_enum_rejects_unknown_literal() {
        let errors = validate(
            &Schema::enumeration(["a", "b"]),
            &json!("not-a-real-id"),
        )
        .unwrap_err();
        assert_eq!(errors[0].expected, "one of [a, b]");
        assert!(errors[0].actual.contains("not-a-real-id"));
    }

    #[test]
    fn test_nested_array_paths() {
        let value = json!({
            "name": "Ada",
            "age": 20,
            "scores": [{"label": "a", "score": 1}, {"label": "b", "score": "7"}]
        });
        let errors = validate(&profile_schema(), &value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "scores[1].score");
        assert_eq!(errors[0].to_string(), "scores[1].score: expected number, got string \"7\"");
    }

    #[test]
    fn test_null_optional_is_treated_as_absent() {
        let validated =
            validate(&profile_schema(), &json!({"name": "Ada", "age": 1, "stage": null})).unwrap();
        assert!(validated.get("stage").is_none());
    }

    #[test]
    fn test_null_required_is_missing() {
        let errors = validate(&profile_schema(), &json!({"name": null, "age": 1})).unwrap_err();
        assert_eq!(errors[0].actual, "missing");
    }

    #[test]
    fn test_undeclared_fields_are_dropped() {
        let validated =
            validate(&profile_schema(), &json!({"name": "Ada", "age": 1, "extra": true})).unwrap();
        assert!(validated.get("extra").is_none());
    }

    #[test]
    fn test_root_type_mismatch() {
        let errors = validate(&profile_schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(errors[0].path, "");
        assert!(errors[0].to_string().starts_with("(root): expected object"));
    }

    #[test]
    fn test_min_len_counts_characters() {
        let schema = Schema::string_min(3);
        assert!(validate(&schema, &json!("héé")).is_ok());
        assert!(validate(&schema, &json!("hé")).is_err());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let value = json!({"name": "", "age": 3, "scores": [{"label": 1}]});
        let first = validate(&profile_schema(), &value);
        let second = validate(&profile_schema(), &value);
        assert_eq!(first, second);

        let ok = json!({"name": "Ada", "age": 3});
        let once = validate(&profile_schema(), &ok).unwrap();
        assert_eq!(validate(&profile_schema(), &once).unwrap(), once);
    }

    #[test]
    fn test_long_strings_are_truncated_in_summary() {
        let long = "x".repeat(200);
        let errors = validate(&Schema::number(), &json!(long)).unwrap_err();
        assert!(errors[0].actual.contains("(200 chars)"));
        assert!(errors[0].actual.len() < 80);
    }

    #[test]
    fn test_boolean_requires_json_bool() {
        assert_eq!(validate(&Schema::boolean(), &json!(true)).unwrap(), json!(true));
        assert!(validate(&Schema::boolean(), &json!(false)).is_ok());

        let errors = validate(&Schema::boolean(), &json!("true")).unwrap_err();
        assert_eq!(errors[0].expected, "boolean");
        assert_eq!(errors[0].actual, "string \"true\"");
        assert!(validate(&Schema::boolean(), &json!(1)).is_err());
    }

    #[test]
    fn test_boolean_response_schema() {
        assert_eq!(Schema::boolean().to_response_schema(), json!({"type": "BOOLEAN"}));
        let encoded =
            Schema::object(vec![Field::optional("remote", Schema::boolean())]).to_response_schema();
        assert_eq!(encoded["properties"]["remote"]["type"], "BOOLEAN");
    }

    #[test]
    fn test_parse_data_uri() {
        let uri = parse_data_uri("data:application/pdf;base64,JVBERi0xLjQ=").unwrap();
        assert_eq!(uri.mime_type, "application/pdf");
        assert_eq!(uri.data, "JVBERi0xLjQ=");

        let with_param = parse_data_uri("data:text/plain;charset=utf-8;base64,aGk=").unwrap();
        assert_eq!(with_param.mime_type, "text/plain");
    }

    #[test]
    fn test_parse_data_uri_rejects_malformed() {
        assert!(parse_data_uri("JVBERi0xLjQ=").is_none());
        assert!(parse_data_uri("data:application/pdf,plain").is_none());
        assert!(parse_data_uri("data:;base64,aGk=").is_none());
        assert!(parse_data_uri("data:application/pdf;base64,").is_none());
        assert!(parse_data_uri("data:application/pdf;base64,not base64!").is_none());
    }

    #[test]
    fn test_response_schema_encoding() {
        let schema = Schema::object(vec![
            Field::required("id", Schema::enumeration(["a"])).describe("career id"),
            Field::optional("tags", Schema::array(Schema::string())),
        ]);
        let encoded = schema.to_response_schema();
        assert_eq!(encoded["type"], "OBJECT");
        assert_eq!(encoded["required"], json!(["id"]));
        assert_eq!(encoded["propertyOrdering"], json!(["id", "tags"]));
        assert_eq!(encoded["properties"]["id"]["enum"], json!(["a"]));
        assert_eq!(encoded["properties"]["id"]["description"], "career id");
        assert_eq!(encoded["properties"]["tags"]["items"]["type"], "STRING");
    }
}
