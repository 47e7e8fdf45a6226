use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskQuestionRequest {
    #[validate(length(min = 1, max = 1000, message = "Please type your question."))]
    pub question: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Please type an answer."))]
    pub answer: String,
}
