//! The advisory flows behind the student-facing AI tools.
//!
//! Each submodule defines one flow: typed input and output records, the
//! schemas they are validated against, and the prompt template. `Advisors`
//! compiles all of them once at startup against a shared model backend.

pub mod career_assessment;
pub mod career_deep_dive;
pub mod career_roadmap;
pub mod careers;
pub mod chatbot;
pub mod college_explorer;
pub mod company_insights;
pub mod grad_school_finder;
pub mod handlers;
pub mod resume_analyzer;
pub mod salary_negotiation;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::flow::registry::{FlowRegistry, RegistryError};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelBackend;

use career_assessment::CareerAssessmentFlow;
use career_deep_dive::CareerDeepDiveFlow;
use career_roadmap::CareerRoadmapFlow;
use chatbot::ChatbotFlow;
use college_explorer::CollegeExplorerFlow;
use company_insights::CompanyInsightsFlow;
use grad_school_finder::GradSchoolFinderFlow;
use resume_analyzer::ResumeAnalyzerFlow;
use salary_negotiation::SalaryNegotiationFlow;

/// Typed handles to every compiled flow.
#[derive(Clone)]
pub struct Advisors {
    pub chatbot: Arc<ChatbotFlow>,
    pub career_assessment: Arc<CareerAssessmentFlow>,
    pub career_deep_dive: Arc<CareerDeepDiveFlow>,
    pub career_roadmap: Arc<CareerRoadmapFlow>,
    pub college_explorer: Arc<CollegeExplorerFlow>,
    pub company_insights: Arc<CompanyInsightsFlow>,
    pub grad_school_finder: Arc<GradSchoolFinderFlow>,
    pub resume_analyzer: Arc<ResumeAnalyzerFlow>,
    pub salary_negotiation: Arc<SalaryNegotiationFlow>,
}

fn build<I, O>(
    spec: FlowSpec,
    backend: &Arc<dyn ModelBackend>,
) -> Result<Arc<Flow<I, O>>, RegistryError>
where
    I: Serialize,
    O: DeserializeOwned,
{
    let name = spec.name;
    Flow::new(spec, Arc::clone(backend))
        .map(Arc::new)
        .map_err(|source| RegistryError::Template { name, source })
}

impl Advisors {
    /// Compiles every flow. A template that references an undeclared field
    /// fails here, before the server accepts traffic.
    pub fn new(backend: Arc<dyn ModelBackend>) -> Result<Self, RegistryError> {
        Ok(Self {
            chatbot: build(chatbot::spec(), &backend)?,
            career_assessment: build(career_assessment::spec(), &backend)?,
            career_deep_dive: build(career_deep_dive::spec(), &backend)?,
            career_roadmap: build(career_roadmap::spec(), &backend)?,
            college_explorer: build(college_explorer::spec(), &backend)?,
            company_insights: build(company_insights::spec(), &backend)?,
            grad_school_finder: build(grad_school_finder::spec(), &backend)?,
            resume_analyzer: build(resume_analyzer::spec(), &backend)?,
            salary_negotiation: build(salary_negotiation::spec(), &backend)?,
        })
    }

    /// Name-indexed view of the same flows for the HTTP layer.
    pub fn registry(&self) -> Result<FlowRegistry, RegistryError> {
        let mut registry = FlowRegistry::new();
        registry.register(self.chatbot.clone())?;
        registry.register(self.career_assessment.clone())?;
        registry.register(self.career_deep_dive.clone())?;
        registry.register(self.career_roadmap.clone())?;
        registry.register(self.college_explorer.clone())?;
        registry.register(self.company_insights.clone())?;
        registry.register(self.grad_school_finder.clone())?;
        registry.register(self.resume_analyzer.clone())?;
        registry.register(self.salary_negotiation.clone())?;
        Ok(registry)
    }
}
