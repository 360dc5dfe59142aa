//! Career Deep-Dive: a detailed profile of a single career.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;

pub const NAME: &str = "careerDeepDive";

pub type CareerDeepDiveFlow = Flow<CareerDeepDiveInput, CareerDeepDiveOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerDeepDiveInput {
    pub career_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerDeepDiveOutput {
    pub overview: String,
    pub day_in_the_life: String,
    pub required_skills: Vec<String>,
    pub education_path: String,
    pub salary_range: String,
    pub job_outlook: String,
    pub related_careers: Vec<String>,
}

const PROMPT: &str = r#"You are a career research expert writing for students who are exploring their options.

Write a detailed, realistic profile of the career "{{careerName}}"{{#if location}} for someone planning to work in {{location}}{{/if}}.

Cover:
1. An overview of what the role is and why it matters.
2. A typical day in the life, including the less glamorous parts.
3. The key technical and soft skills required.
4. The usual education path and any certifications or licenses.
5. A typical salary range from entry level to senior, noting that figures are estimates.
6. The job outlook for the next five to ten years.
7. Related careers a student might also consider."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("careerName", Schema::text()),
        Field::optional("location", Schema::text()),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required("overview", Schema::text()),
        Field::required("dayInTheLife", Schema::text()),
        Field::required("requiredSkills", Schema::array(Schema::text())),
        Field::required("educationPath", Schema::text()),
        Field::required("salaryRange", Schema::text()),
        Field::required("jobOutlook", Schema::text()),
        Field::required("relatedCareers", Schema::array(Schema::text())),
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
