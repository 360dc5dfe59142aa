//! Chatbot: free-form career questions, personalised with whatever the
//! student has told us so far.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;
use crate::models::profile::Stage;

pub const NAME: &str = "chatbot";

pub type ChatbotFlow = Flow<ChatbotInput, ChatbotOutput>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotInput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotOutput {
    pub response: String,
}

const PROMPT: &str = r#"You are CareerBuddy, a friendly and knowledgeable career guidance assistant for students.

What we know about the student:
- Selected career: {{#if careerId}}{{careerId}}{{else}}Not selected yet{{/if}}
- Year of study: {{#if year}}{{year}}{{else}}Not specified{{/if}}
- Stage: {{#if stage}}{{stage}} undergraduate study{{else}}Not specified{{/if}}

Answer the student's message below. Keep the answer under 200 words, practical and encouraging.
Tailor it to their selected career and year when those are known.
If the message is unrelated to careers, education or professional growth, answer briefly and steer back to career topics.

Student's message:
{{message}}"#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("message", Schema::text()).describe("The student's question"),
        Field::optional("careerId", Schema::text()),
        Field::optional("year", Schema::text()),
        Field::optional(
            "stage",
            Schema::enumeration(Stage::ALL.iter().map(|s| s.as_str())),
        ),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required("response", Schema::text()).describe("The assistant's reply to the student")
    ])
}

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: input_schema(),
        output_schema: output_schema(),
        template: PROMPT.to_string(),
        model_options: ModelOptions::default().with_temperature(0.7),
        requires_credential: true,
    }
}
