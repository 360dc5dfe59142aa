//! Career Roadmap: a phased plan from where the student is today to their
//! target career.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;
use crate::models::profile::Stage;

pub const NAME: &str = "careerRoadmap";

pub type CareerRoadmapFlow = Flow<CareerRoadmapInput, CareerRoadmapOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRoadmapInput {
    pub career_name: String,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_skills: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub title: String,
    pub timeframe: String,
    pub milestones: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRoadmapOutput {
    pub summary: String,
    pub phases: Vec<RoadmapPhase>,
}

const PROMPT: &str = r#"You are a career coach building a step-by-step roadmap for a student who wants to become a {{careerName}}.

Where the student is today:
- Stage: {{stage}} undergraduate study
- Year: {{#if year}}{{year}}{{else}}Not specified{{/if}}
- Current skills: {{#if currentSkills}}{{currentSkills}}{{else}}Not specified{{/if}}

Build a roadmap of four to six phases that starts from the student's current stage.
Each phase needs a short title, a realistic timeframe, concrete milestones and specific resources (courses, books, communities, competitions).
Begin with a two-sentence summary of the overall path."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("careerName", Schema::text()),
        Field::required(
            "stage",
            Schema::enumeration(Stage::ALL.iter().map(|s| s.as_str())),
        ),
        Field::optional("year", Schema::text()),
        Field::optional("currentSkills", Schema::text()),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required("summary", Schema::text()),
        Field::required(
            "phases",
            Schema::array(Schema::object(vec![
                Field::required("title", Schema::text()),
                Field::required("timeframe", Schema::text()),
                Field::required("milestones", Schema::array(Schema::text())),
                Field::required("resources", Schema::array(Schema::text())),
            ])),
        ),
    ])
}

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: input_schema(),
        output_schema: output_schema(),
        template: PROMPT.to_string(),
        model_options: ModelOptions::default(),
        requires_credential: true,
    }
}
