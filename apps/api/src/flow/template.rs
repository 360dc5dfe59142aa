//! Prompt Template Renderer.
//!
//! Templates use a small Handlebars-like syntax:
//!
//! - `{{field}}` interpolates a top-level input field as text
//! - `{{#if field}} ... {{else}} ... {{/if}}` renders a branch depending on
//!   whether an optional field is present (the `{{else}}` branch is optional)
//! - `{{media url=field}}` attaches a data-URI field as a media part
//!
//! Templates are compiled against the flow's input schema when the flow is
//! constructed, so an unknown placeholder can never reach a live invocation.
//! Rendering is plain text substitution and cannot fail.

use serde_json::Value;
use thiserror::Error;

use crate::flow::schema::{parse_data_uri, Schema};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("input schema must be an object")]
    SchemaNotObject,

    #[error("unterminated tag starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("invalid tag '{{{{{tag}}}}}'")]
    InvalidTag { tag: String },

    #[error("placeholder references unknown field '{field}'")]
    UnknownField { field: String },

    #[error("media placeholder field '{field}' is not a data URI field")]
    MediaNotDataUri { field: String },

    #[error("'{{{{else}}}}' outside of an '{{{{#if}}}}' block")]
    UnexpectedElse,

    #[error("'{{{{/if}}}}' without a matching '{{{{#if}}}}'")]
    UnexpectedClose,

    #[error("'{{{{#if {field}}}}}' is never closed")]
    UnclosedIf { field: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    If {
        field: String,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },
    Media(String),
}

/// A compiled prompt template.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

/// One piece of a rendered prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    /// Base64 payload attached as a document or image.
    Media { mime_type: String, data: String },
}

/// Fully expanded prompt: text interleaved with attached media.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub parts: Vec<PromptPart>,
}

impl RenderedPrompt {
    /// Concatenated text parts. Media parts are left out.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                PromptPart::Text(t) => Some(t.as_str()),
                PromptPart::Media { .. } => None,
            })
            .collect()
    }

    pub fn media_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, PromptPart::Media { .. }))
            .count()
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(PromptPart::Text(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(PromptPart::Text(text.to_string()));
        }
    }

    fn trim(mut self) -> Self {
        if let Some(PromptPart::Text(first)) = self.parts.first_mut() {
            *first = first.trim_start().to_string();
        }
        if let Some(PromptPart::Text(last)) = self.parts.last_mut() {
            *last = last.trim_end().to_string();
        }
        self.parts
            .retain(|p| !matches!(p, PromptPart::Text(t) if t.is_empty()));
        self
    }
}

/// Open `{{#if}}` block while parsing.
struct Frame {
    field: String,
    then_branch: Vec<Node>,
    else_branch: Option<Vec<Node>>,
}

impl Frame {
    fn current(&mut self) -> &mut Vec<Node> {
        match &mut self.else_branch {
            Some(nodes) => nodes,
            None => &mut self.then_branch,
        }
    }
}

impl Template {
    /// Parses `source` and checks every placeholder against `input_schema`.
    pub fn compile(source: &str, input_schema: &Schema) -> Result<Self, TemplateError> {
        if !matches!(input_schema, Schema::Object(_)) {
            return Err(TemplateError::SchemaNotObject);
        }

        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                push_node(&mut root, &mut stack, Node::Text(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::Unterminated {
                    offset: offset + open,
                })?;
            let tag = after_open[..close].trim();

            if let Some(field) = tag.strip_prefix("#if ") {
                let field = checked_field(field.trim(), input_schema)?;
                stack.push(Frame {
                    field,
                    then_branch: Vec::new(),
                    else_branch: None,
                });
            } else if tag == "else" {
                match stack.last_mut() {
                    Some(frame) if frame.else_branch.is_none() => {
                        frame.else_branch = Some(Vec::new())
                    }
                    _ => return Err(TemplateError::UnexpectedElse),
                }
            } else if tag == "/if" {
                let frame = stack.pop().ok_or(TemplateError::UnexpectedClose)?;
                let node = Node::If {
                    field: frame.field,
                    then_branch: frame.then_branch,
                    else_branch: frame.else_branch.unwrap_or_default(),
                };
                push_node(&mut root, &mut stack, node);
            } else if let Some(args) = tag.strip_prefix("media ") {
                let field = args
                    .trim()
                    .strip_prefix("url=")
                    .ok_or_else(|| TemplateError::InvalidTag {
                        tag: tag.to_string(),
                    })?;
                let field = checked_field(field, input_schema)?;
                if !matches!(
                    input_schema.field(&field).map(|f| &f.schema),
                    Some(Schema::DataUri)
                ) {
                    return Err(TemplateError::MediaNotDataUri { field });
                }
                push_node(&mut root, &mut stack, Node::Media(field));
            } else if is_identifier(tag) {
                let field = checked_field(tag, input_schema)?;
                push_node(&mut root, &mut stack, Node::Var(field));
            } else {
                return Err(TemplateError::InvalidTag {
                    tag: tag.to_string(),
                });
            }

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            push_node(&mut root, &mut stack, Node::Text(rest.to_string()));
        }
        if let Some(frame) = stack.pop() {
            return Err(TemplateError::UnclosedIf { field: frame.field });
        }

        Ok(Self { nodes: root })
    }

    /// Expands the template against an input already validated against the
    /// schema it was compiled with.
    pub fn render(&self, input: &Value) -> RenderedPrompt {
        let mut prompt = RenderedPrompt::default();
        render_nodes(&self.nodes, input, &mut prompt);
        prompt.trim()
    }
}

fn push_node(root: &mut Vec<Node>, stack: &mut [Frame], node: Node) {
    match stack.last_mut() {
        Some(frame) => frame.current().push(node),
        None => root.push(node),
    }
}

fn is_identifier(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn checked_field(name: &str, schema: &Schema) -> Result<String, TemplateError> {
    if !is_identifier(name) {
        return Err(TemplateError::InvalidTag {
            tag: name.to_string(),
        });
    }
    match schema.field(name) {
        Some(_) => Ok(name.to_string()),
        None => Err(TemplateError::UnknownField {
            field: name.to_string(),
        }),
    }
}

fn render_nodes(nodes: &[Node], input: &Value, prompt: &mut RenderedPrompt) {
    for node in nodes {
        match node {
            Node::Text(text) => prompt.push_text(text),
            Node::Var(field) => {
                if let Some(value) = input.get(field) {
                    prompt.push_text(&value_text(value));
                }
            }
            Node::If {
                field,
                then_branch,
                else_branch,
            } => {
                let branch = if is_truthy(input.get(field)) {
                    then_branch
                } else {
                    else_branch
                };
                render_nodes(branch, input, prompt);
            }
            Node::Media(field) => {
                if let Some(uri) = input.get(field).and_then(Value::as_str).and_then(parse_data_uri)
                {
                    prompt.parts.push(PromptPart::Media {
                        mime_type: uri.mime_type.to_string(),
                        data: uri.data.to_string(),
                    });
                }
            }
        }
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Number(n) => match n.as_f64() {
            // Typed inputs serialize 90000 as 90000.0
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::flow::schema::Field;

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required("name", Schema::text()),
            Field::optional("career", Schema::string()),
            Field::optional("salary", Schema::number()),
            Field::optional("skills", Schema::array(Schema::string())),
            Field::optional("resume", Schema::data_uri()),
        ])
    }

    fn compile(source: &str) -> Result<Template, TemplateError> {
        Template::compile(source, &schema())
    }

    #[test]
    fn test_interpolates_strings_and_numbers() {
        let template = compile("Hi {{name}}, offer {{ salary }}.").unwrap();
        let prompt = template.render(&json!({"name": "Ada", "salary": 90000}));
        assert_eq!(prompt.text(), "Hi Ada, offer 90000.");
    }

    #[test]
    fn test_whole_floats_render_without_fraction() {
        let template = compile("Offer {{salary}}").unwrap();
        assert_eq!(
            template.render(&json!({"salary": 90000.0})).text(),
            "Offer 90000"
        );
        assert_eq!(template.render(&json!({"salary": 3.7})).text(), "Offer 3.7");
        assert_eq!(template.render(&json!({"salary": -12.0})).text(), "Offer -12");
    }

    #[test]
    fn test_conditional_fallback_when_absent() {
        let template =
            compile("Career: {{#if career}}{{career}}{{else}}Not selected yet{{/if}}").unwrap();
        assert_eq!(
            template.render(&json!({"name": "Ada"})).text(),
            "Career: Not selected yet"
        );
        assert_eq!(
            template.render(&json!({"name": "Ada", "career": ""})).text(),
            "Career: Not selected yet"
        );
        assert_eq!(
            template
                .render(&json!({"name": "Ada", "career": "data-scientist"}))
                .text(),
            "Career: data-scientist"
        );
    }

    #[test]
    fn test_conditional_without_else_renders_nothing() {
        let template = compile("A{{#if career}} ({{career}}){{/if}}B").unwrap();
        assert_eq!(template.render(&json!({"name": "x"})).text(), "AB");
    }

    #[test]
    fn test_nested_conditionals() {
        let template = compile(
            "{{#if career}}{{#if salary}}both{{else}}career only{{/if}}{{else}}none{{/if}}",
        )
        .unwrap();
        assert_eq!(
            template.render(&json!({"career": "x", "salary": 1})).text(),
            "both"
        );
        assert_eq!(template.render(&json!({"career": "x"})).text(), "career only");
        assert_eq!(template.render(&json!({})).text(), "none");
    }

    #[test]
    fn test_arrays_are_joined() {
        let template = compile("Skills: {{skills}}").unwrap();
        let prompt = template.render(&json!({"skills": ["Rust", "SQL"]}));
        assert_eq!(prompt.text(), "Skills: Rust, SQL");
    }

    #[test]
    fn test_media_becomes_attachment() {
        let template = compile("Review this:\n{{media url=resume}}\nThanks").unwrap();
        let prompt = template.render(&json!({"resume": "data:application/pdf;base64,JVBERg=="}));
        assert_eq!(
            prompt.parts,
            vec![
                PromptPart::Text("Review this:\n".to_string()),
                PromptPart::Media {
                    mime_type: "application/pdf".to_string(),
                    data: "JVBERg==".to_string(),
                },
                PromptPart::Text("\nThanks".to_string()),
            ]
        );
        assert!(!prompt.text().contains("base64"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let template = compile("{{name}} {{#if career}}{{career}}{{else}}-{{/if}}").unwrap();
        let input = json!({"name": "Ada", "career": "x"});
        assert_eq!(template.render(&input), template.render(&input));
    }

    #[test]
    fn test_output_is_trimmed() {
        let template = compile("\n\n  {{name}}  \n").unwrap();
        assert_eq!(template.render(&json!({"name": "Ada"})).text(), "Ada");
    }

    #[test]
    fn test_unknown_field_is_compile_error() {
        assert_eq!(
            compile("{{nmae}}").unwrap_err(),
            TemplateError::UnknownField {
                field: "nmae".to_string()
            }
        );
        assert!(matches!(
            compile("{{#if nope}}x{{/if}}"),
            Err(TemplateError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            compile("{{#if career}}x").unwrap_err(),
            TemplateError::UnclosedIf {
                field: "career".to_string()
            }
        );
        assert_eq!(compile("x{{/if}}").unwrap_err(), TemplateError::UnexpectedClose);
        assert_eq!(compile("{{else}}").unwrap_err(), TemplateError::UnexpectedElse);
        assert_eq!(
            compile("{{#if career}}a{{else}}b{{else}}c{{/if}}").unwrap_err(),
            TemplateError::UnexpectedElse
        );
        assert_eq!(
            compile("hello {{name").unwrap_err(),
            TemplateError::Unterminated { offset: 6 }
        );
        assert!(matches!(
            compile("{{name.first}}"),
            Err(TemplateError::InvalidTag { .. })
        ));
    }

    #[test]
    fn test_media_requires_data_uri_field() {
        assert_eq!(
            compile("{{media url=name}}").unwrap_err(),
            TemplateError::MediaNotDataUri {
                field: "name".to_string()
            }
        );
        assert!(matches!(
            compile("{{media resume}}"),
            Err(TemplateError::InvalidTag { .. })
        ));
    }

    #[test]
    fn test_schema_must_be_object() {
        assert_eq!(
            Template::compile("x", &Schema::string()).unwrap_err(),
            TemplateError::SchemaNotObject
        );
    }
}
