//! Graduate School Finder: matches a student to graduate programs.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;

pub const NAME: &str = "gradSchoolFinder";

pub const DEGREE_TYPES: [&str; 4] = ["masters", "phd", "mba", "professional"];

pub type GradSchoolFinderFlow = Flow<GradSchoolFinderInput, GradSchoolFinderOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradSchoolFinderInput {
    pub field_of_study: String,
    pub degree_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_interests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_required: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradProgram {
    pub university_name: String,
    pub program_name: String,
    pub location: String,
    pub why_good_fit: String,
    pub admission_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradSchoolFinderOutput {
    pub programs: Vec<GradProgram>,
    pub application_tips: Vec<String>,
}

const PROMPT: &str = r#"You are a graduate admissions consultant.

Find graduate programs for a student with this profile:
- Field of study: {{fieldOfStudy}}
- Degree type: {{degreeType}}
- Undergraduate GPA: {{#if gpa}}{{gpa}}{{else}}Not provided{{/if}}
- Research interests: {{#if researchInterests}}{{researchInterests}}{{else}}Not specified{{/if}}
- Location preference: {{#if locationPreference}}{{locationPreference}}{{else}}No preference{{/if}}
- Funding: {{#if fundingRequired}}Required, favour funded positions and assistantships{{else}}Not a constraint{{/if}}

Recommend five to eight programs across a realistic range of selectivity for this profile.
For each program give the university, program name, location, why it fits, key admission requirements and the usual application deadline if you know it.
Finish with practical application tips (statement of purpose, recommendations, tests, funding)."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("fieldOfStudy", Schema::text()),
        Field::required("degreeType", Schema::enumeration(DEGREE_TYPES)),
        Field::optional("gpa", Schema::number()),
        Field::optional("researchInterests", Schema::text()),
        Field::optional("locationPreference", Schema::text()),
        Field::optional("fundingRequired", Schema::boolean()),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required(
            "programs",
            Schema::array(Schema::object(vec![
                Field::required("universityName", Schema::text()),
                Field::required("programName", Schema::text()),
                Field::required("location", Schema::text()),
                Field::required("whyGoodFit", Schema::text()),
                Field::required("admissionRequirements", Schema::array(Schema::text())),
                Field::optional("applicationDeadline", Schema::text()),
            ])),
        ),
        Field::required("applicationTips", Schema::array(Schema::text())),
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
