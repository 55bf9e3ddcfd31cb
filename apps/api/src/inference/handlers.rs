use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::inference::feedback::{clean_summary, parse_feedback, InterviewFeedback};
use crate::inference::prompts::{interview_feedback_prompt, site_summary_prompt};
use crate::models::resume::ParsedResume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub resume: ParsedResume,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

fn validate_feedback_request(req: &FeedbackRequest) -> Result<(), AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::Validation("question must not be empty".into()));
    }
    if req.answer.trim().is_empty() {
        return Err(AppError::Validation("answer must not be empty".into()));
    }
    Ok(())
}

/// POST /api/ai/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<InterviewFeedback>, AppError> {
    validate_feedback_request(&req)?;

    let prompt = interview_feedback_prompt(&req.question, &req.answer, req.role.as_deref());
    let raw = state.inference.generate(&prompt).await?;
    let feedback = parse_feedback(&raw);

    info!(
        "Interview feedback for user {}: score={:?} structured={}",
        user.id, feedback.score, feedback.structured
    );
    Ok(Json(feedback))
}

/// POST /api/ai/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let prompt = site_summary_prompt(&req.resume);
    let raw = state.inference.generate(&prompt).await?;
    let summary = clean_summary(&raw);
    if summary.is_empty() {
        return Err(AppError::Inference("Model returned an empty summary".into()));
    }

    info!("Generated site summary for user {} ({} chars)", user.id, summary.chars().count());
    Ok(Json(SummaryResponse { summary }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_request_requires_question_and_answer() {
        let blank_question = FeedbackRequest {
            question: "  ".into(),
            answer: "An answer".into(),
            role: None,
        };
        assert!(matches!(
            validate_feedback_request(&blank_question),
            Err(AppError::Validation(_))
        ));

        let blank_answer = FeedbackRequest {
            question: "Why?".into(),
            answer: "".into(),
            role: None,
        };
        assert!(validate_feedback_request(&blank_answer).is_err());

        let ok = FeedbackRequest {
            question: "Why?".into(),
            answer: "Because.".into(),
            role: Some("SRE".into()),
        };
        assert!(validate_feedback_request(&ok).is_ok());
    }

    #[test]
    fn test_summary_request_accepts_partial_resume() {
        let req: SummaryRequest =
            serde_json::from_str(r#"{"resume": {"skills": ["Rust"]}}"#).unwrap();
        assert_eq!(req.resume.skills, vec!["Rust"]);
        assert!(req.resume.experience.is_empty());
    }
}
