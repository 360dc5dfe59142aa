//! College Explorer: suggests undergraduate colleges for a career goal.
//! Exempt from the credential precondition.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;

pub const NAME: &str = "collegeExplorer";

pub type CollegeExplorerFlow = Flow<CollegeExplorerInput, CollegeExplorerOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeExplorerInput {
    pub career_goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeSuggestion {
    pub name: String,
    pub location: String,
    pub why_good_fit: String,
    pub notable_programs: Vec<String>,
    pub estimated_tuition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeExplorerOutput {
    pub colleges: Vec<CollegeSuggestion>,
    pub advice: String,
}

const PROMPT: &str = r#"You are a college admissions advisor helping a high-school student shortlist colleges.

The student wants to pursue: {{careerGoal}}
Preferred location: {{#if location}}{{location}}{{else}}Anywhere{{/if}}
Budget: {{#if budget}}{{budget}}{{else}}Not specified{{/if}}
{{#if preferences}}Other preferences: {{preferences}}
{{/if}}
Suggest five to eight colleges with strong programs for this goal, mixing reach, match and safety options.
For each college give its location, why it is a good fit, notable programs and an estimated annual tuition (say that it is an estimate).
Finish with one paragraph of general advice for the application process."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("careerGoal", Schema::text()),
        Field::optional("location", Schema::text()),
        Field::optional("budget", Schema::text()),
        Field::optional("preferences", Schema::text()),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required(
            "colleges",
            Schema::array(Schema::object(vec![
                Field::required("name", Schema::text()),
                Field::required("location", Schema::text()),
                Field::required("whyGoodFit", Schema::text()),
                Field::required("notablePrograms", Schema::array(Schema::text())),
                Field::required("estimatedTuition", Schema::text()),
            ])),
        ),
        Field::required("advice", Schema::text()),
    ])
}

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: input_schema(),
        output_schema: output_schema(),
        template: PROMPT.to_string(),
        model_options: ModelOptions::default(),
        requires_credential: false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::llm_client::stub::StubBackend;

    #[tokio::test]
    async fn test_runs_without_credential() {
        let backend = Arc::new(StubBackend::without_credential(json!({
            "colleges": [{
                "name": "State University",
                "location": "Ohio",
                "whyGoodFit": "Strong nursing school",
                "notablePrograms": ["BSN"],
                "estimatedTuition": "$12k/year (estimate)"
            }],
            "advice": "Apply early."
        })));
        let flow: CollegeExplorerFlow = Flow::new(spec(), backend.clone()).unwrap();
        let out = flow
            .run(&CollegeExplorerInput {
                career_goal: "Nursing".to_string(),
                location: None,
                budget: Some("Under $20k".to_string()),
                preferences: None,
            })
            .await
            .unwrap();
        assert_eq!(out.colleges[0].name, "State University");
        assert_eq!(backend.calls(), 1);

        let prompt = backend.last_prompt().unwrap().text();
        assert!(prompt.contains("Preferred location: Anywhere"));
        assert!(prompt.contains("Budget: Under $20k"));
        assert!(!prompt.contains("Other preferences"));
    }
}
