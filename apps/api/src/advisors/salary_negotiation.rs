//! Salary Negotiation coach.
//!
//! Negotiation talk trips the default safety filters more often than the
//! other advisors, so every harm category is relaxed to block only
//! high-probability content.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::{HarmBlockThreshold, HarmCategory, ModelOptions};

pub const NAME: &str = "salaryNegotiation";

pub type SalaryNegotiationFlow = Flow<SalaryNegotiationInput, SalaryNegotiationOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryNegotiationInput {
    pub job_title: String,
    pub company_name: String,
    pub base_salary: f64,
    pub location: String,
    pub years_of_experience: f64,
    pub benefits: String,
    pub strengths: String,
    pub other_offers: String,
    pub desired_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryNegotiationOutput {
    pub negotiation_strategy: String,
    pub justification_points: String,
    pub market_data: String,
    pub counter_offer_suggestions: String,
    pub confidence_boost: String,
}

const PROMPT: &str = r#"You are an expert salary negotiation coach helping a candidate respond to a job offer.

Offer details:
- Job title: {{jobTitle}}
- Company: {{companyName}}
- Offered base salary: {{baseSalary}}
- Location: {{location}}
- Years of experience: {{yearsOfExperience}}
- Benefits offered: {{benefits}}
- Candidate strengths: {{strengths}}
- Other offers: {{otherOffers}}
- Desired salary: {{desiredSalary}}

Prepare the candidate for the conversation:
1. A negotiation strategy: when to counter, what tone to use and what to open with.
2. Justification points grounded in the candidate's strengths and experience.
3. Market data for this role and location, clearly marked as estimates.
4. Concrete counter-offer suggestions, including non-salary items worth asking for.
5. A short confidence boost the candidate can read right before the call.

Keep the advice honest. Never suggest inventing competing offers."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![
        Field::required("jobTitle", Schema::text()),
        Field::required("companyName", Schema::text()),
        Field::required("baseSalary", Schema::number()),
        Field::required("location", Schema::text()),
        Field::required("yearsOfExperience", Schema::number()),
        Field::required("benefits", Schema::text()),
        Field::required("strengths", Schema::text()),
        Field::required("otherOffers", Schema::text()),
        Field::required("desiredSalary", Schema::number()),
    ])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required("negotiationStrategy", Schema::text()),
        Field::required("justificationPoints", Schema::text()),
        Field::required("marketData", Schema::text()),
        Field::required("counterOfferSuggestions", Schema::text()),
        Field::required("confidenceBoost", Schema::text()),
    ])
}

fn model_options() -> ModelOptions {
    HarmCategory::ALL
        .into_iter()
        .fold(ModelOptions::default(), |options, category| {
            options.with_safety(category, HarmBlockThreshold::BlockOnlyHigh)
        })
}

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: input_schema(),
        output_schema: output_schema(),
        template: PROMPT.to_string(),
        model_options: model_options(),
        requires_credential: true,
    }
}
