//! Career Assessment: recommends one career from the catalog based on a
//! short questionnaire. The recommendation is constrained to known career ids.

use serde::{Deserialize, Serialize};

use crate::advisors::careers::{career_ids, catalog_text};
use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;

pub const NAME: &str = "careerAssessment";

/// Minimum characters for each free-text questionnaire answer.
pub const MIN_ANSWER_CHARS: usize = 10;

pub type CareerAssessmentFlow = Flow<CareerAssessmentInput, CareerAssessmentOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAssessmentInput {
    pub interests: String,
    pub subjects: String,
    pub work_style: String,
    pub strengths: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAssessmentOutput {
    pub recommended_career_id: String,
    pub career_name: String,
    pub reasoning: String,
    pub alternative_career_ids: Vec<String>,
    pub next_steps: Vec<String>,
}

const PROMPT_HEAD: &str = r#"You are an experienced career counselor helping a student choose a career path.

Based on the student's answers below, recommend the single best-fitting career from the catalog.
Explain your reasoning by connecting specific answers to the demands of the career.
Also suggest up to three alternative careers from the catalog and three to five concrete next steps the student can take this month.

Only use career ids that appear in this catalog:
"#;

const PROMPT_TAIL: &str = r#"

Student's answers:
- Interests: {{interests}}
- Favourite subjects: {{subjects}}
- Preferred work style: {{workStyle}}
- Strengths: {{strengths}}
{{#if additionalInfo}}- Anything else: {{additionalInfo}}
{{/if}}"#;

pub fn input_schema() -> Schema {
    let answer = || Schema::string_min(MIN_ANSWER_CHARS);
    Schema::object(vec![
        Field::required("interests", answer()),
        Field::required("subjects", answer()),
        Field::required("workStyle", answer()),
        Field::required("strengths", answer()),
        Field::optional("additionalInfo", Schema::string()),
    ])
}

pub fn output_schema() -> Schema {
    let career_id = || Schema::enumeration(career_ids());
    Schema::object(vec![
        Field::required("recommendedCareerId", career_id())
            .describe("Id of the recommended career, from the catalog"),
        Field::required("careerName", Schema::text()),
        Field::required("reasoning", Schema::text()),
        Field::required("alternativeCareerIds", Schema::array(career_id())),
        Field::required("nextSteps", Schema::array(Schema::text())),
    ])
}

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: input_schema(),
        output_schema: output_schema(),
        template: format!("{PROMPT_HEAD}{}{PROMPT_TAIL}", catalog_text()),
        model_options: ModelOptions::default(),
        requires_credential: true,
    }
}
