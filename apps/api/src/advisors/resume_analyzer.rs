//! Resume Analyzer: scores an uploaded resume section by section.
//!
//! The document travels as a data URI and is attached to the model request
//! as a media part, never inlined into the prompt text.

use serde::{Deserialize, Serialize};

use crate::flow::schema::{Field, Schema};
use crate::flow::{Flow, FlowSpec};
use crate::llm_client::ModelOptions;

pub const NAME: &str = "resumeAnalyzer";

pub type ResumeAnalyzerFlow = Flow<ResumeAnalyzerInput, ResumeAnalyzerOutput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalyzerInput {
    /// `data:<mime>;base64,<payload>`
    pub resume_data_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFeedback {
    pub section_name: String,
    pub score: f64,
    pub feedback: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalyzerOutput {
    pub overall_score: f64,
    pub summary: String,
    pub sections: Vec<SectionFeedback>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

const PROMPT: &str = r#"You are an experienced recruiter reviewing a student's resume.

Resume:
{{media url=resumeDataUri}}

Evaluate the resume for an early-career candidate.
Give an overall score from 0 to 100 and a short summary of your impression.
Then score each section you find (for example Education, Experience, Projects, Skills) from 1 to 10, with feedback and concrete suggestions.
List the main strengths and the most important improvements.
Judge content, clarity and impact. Do not comment on personal details such as name, age or photo."#;

pub fn input_schema() -> Schema {
    Schema::object(vec![Field::required("resumeDataUri", Schema::data_uri())])
}

pub fn output_schema() -> Schema {
    Schema::object(vec![
        Field::required("overallScore", Schema::number()).describe("Score from 0 to 100"),
        Field::required("summary", Schema::text()),
        Field::required(
            "sections",
            Schema::array(Schema::object(vec![
                Field::required("sectionName", Schema::text()),
                Field::required("score", Schema::number()).describe("Score from 1 to 10"),
                Field::required("feedback", Schema::text()),
                Field::required("suggestions", Schema::array(Schema::text())),
            ])),
        ),
        Field::required("strengths", Schema::array(Schema::text())),
        Field::required("improvements", Schema::array(Schema::text())),
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::flow::template::PromptPart;
    use crate::flow::{InvocationFailure, ValidationStage};
    use crate::llm_client::stub::StubBackend;

    const PDF_URI: &str = "data:application/pdf;base64,JVBERi0xLjQK";

    fn analysis() -> serde_json::Value {
        json!({
            "overallScore": 72,
            "summary": "Solid foundation.",
            "sections": [{
                "sectionName": "Projects",
                "score": 8,
                "feedback": "Good variety.",
                "suggestions": ["Quantify impact"]
            }],
            "strengths": ["Clear layout"],
            "improvements": ["Add metrics"]
        })
    }

    #[tokio::test]
    async fn test_resume_is_attached_as_media() {
        let backend = Arc::new(StubBackend::replying(analysis()));
        let flow: ResumeAnalyzerFlow = Flow::new(spec(), backend.clone()).unwrap();
        let out = flow
            .run(&ResumeAnalyzerInput {
                resume_data_uri: PDF_URI.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(out.overall_score, 72.0);
        assert_eq!(out.sections[0].section_name, "Projects");

        let prompt = backend.last_prompt().unwrap();
        assert_eq!(prompt.media_count(), 1);
        assert!(!prompt.text().contains("JVBERi0xLjQK"));
        assert!(prompt.parts.iter().any(|part| matches!(
            part,
            PromptPart::Media { mime_type, data }
                if mime_type == "application/pdf" && data == "JVBERi0xLjQK"
        )));
    }

    #[tokio::test]
    async fn test_prompt_and_schema_state_score_ranges() {
        let backend = Arc::new(StubBackend::replying(analysis()));
        let flow: ResumeAnalyzerFlow = Flow::new(spec(), backend.clone()).unwrap();
        flow.invoke(json!({"resumeDataUri": PDF_URI})).await.unwrap();

        let prompt = backend.last_prompt().unwrap().text();
        assert!(prompt.contains("overall score from 0 to 100"));
        assert!(prompt.contains("Skills) from 1 to 10"));

        let schema = backend.last_schema().unwrap();
        assert_eq!(
            schema["properties"]["overallScore"]["description"],
            "Score from 0 to 100"
        );
        assert_eq!(
            schema["properties"]["sections"]["items"]["properties"]["score"]["description"],
            "Score from 1 to 10"
        );
    }

    #[tokio::test]
    async fn test_plain_text_is_not_a_resume() {
        let backend = Arc::new(StubBackend::replying(analysis()));
        let flow: ResumeAnalyzerFlow = Flow::new(spec(), backend.clone()).unwrap();
        let err = flow
            .invoke(json!({"resumeDataUri": "my resume, pasted"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InvocationFailure::ValidationFailed {
                stage: ValidationStage::Input,
                ..
            }
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_score_as_string_fails_output_validation() {
        let mut reply = analysis();
        reply["overallScore"] = json!("72");
        let backend = Arc::new(StubBackend::replying(reply));
        let flow: ResumeAnalyzerFlow = Flow::new(spec(), backend.clone()).unwrap();
        let err = flow
            .invoke(json!({"resumeDataUri": PDF_URI}))
            .await
            .unwrap_err();
        match err {
            InvocationFailure::ValidationFailed { stage, errors, .. } => {
                assert_eq!(stage, ValidationStage::Output);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "overallScore");
                assert_eq!(errors[0].expected, "number");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }
}
