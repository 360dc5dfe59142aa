//! Company Insights: culture, interview process and pay at one company.
//! Exempt from the credential precondition.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;

pub const NAME: &str = "companyInsights";

pub type CompanyInsightsFlow = Flow<CompanyInsightsInput, CompanyInsightsOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInsightsInput {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInsightsOutput {
    pub overview: String,
    pub culture: String,
    pub interview_process: String,
    pub salary_insights: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub tips: Vec<String>,
}

const PROMPT: &str = r#"You are an industry analyst preparing a student for applications to {{companyName}}.
{{#if role}}The student is interested in the {{role}} role.
{{/if}}
Write a balanced company report covering:
- A short overview of the company and what it does.
- Work culture and values, as employees commonly describe them.
- The typical interview process{{#if role}} for this role{{/if}}, stage by stage.
- Salary insights for early-career hires, clearly marked as estimates.
- The main pros and cons of working there.
- Practical tips for standing out as an applicant.

If the company is small or little-known, say what you cannot verify instead of guessing."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("companyName", Schema::text()),
        Field::optional("role", Schema::text()),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required("overview", Schema::text()),
        Field::required("culture", Schema::text()),
        Field::required("interviewProcess", Schema::text()),
        Field::required("salaryInsights", Schema::text()),
        Field::required("pros", Schema::array(Schema::text())),
        Field::required("cons", Schema::array(Schema::text())),
        Field::required("tips", Schema::array(Schema::text())),
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
    async fn test_role_is_optional() {
        let backend = Arc::new(StubBackend::replying(json!({
            "overview": "o",
            "culture": "c",
            "interviewProcess": "i",
            "salaryInsights": "s",
            "pros": ["p"],
            "cons": [],
            "tips": ["t"]
        })));
        let flow: CompanyInsightsFlow = Flow::new(spec(), backend.clone()).unwrap();

        let out = flow.invoke(json!({"companyName": "Acme"})).await.unwrap();
        assert!(out.cons.is_empty());
        let prompt = backend.last_prompt().unwrap().text();
        assert!(prompt.contains("applications to Acme."));
        assert!(!prompt.contains("role."));
        assert!(prompt.contains("typical interview process, stage by stage"));

        flow.invoke(json!({"companyName": "Acme", "role": "Analyst"}))
            .await
            .unwrap();
        let prompt = backend.last_prompt().unwrap().text();
        assert!(prompt.contains("interested in the Analyst role."));
        assert!(prompt.contains("interview process for this role, stage by stage"));
    }
}
