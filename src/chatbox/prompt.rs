// src/chatbox/prompt.rs

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    chatbox::prompts::*,
    config::{MAX_QUESTION_COUNT, QuizConfig},
    models::{
        conversation::{Conversation, Message, QuizPurpose, Role},
        profile::UserProfile,
        quiz_assessment::{
            ChatboxCommon, GenerateQuizAssessmentRequest, ReinforceQuizAssessmentRequest,
            SubmitQuizAssessmentRequest, SubmitReinforceQuizAssessmentRequest,
        },
        user_quiz_assessment::UserQuizAssessment,
    },
};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// Builds chatbox conversations for each pipeline step.
///
/// Output content depends only on the inputs: no timestamps or random tokens
/// end up in the prompt text. Stored question/answer JSON is inserted exactly
/// as persisted, never re-encoded.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    default_question_count: u32,
    subject: String,
}

impl PromptBuilder {
    pub fn new(quiz: &QuizConfig) -> Self {
        Self {
            default_question_count: quiz.question_count,
            subject: quiz.subject.clone(),
        }
    }

    pub fn generate(
        &self,
        req: &GenerateQuizAssessmentRequest,
        profile: Option<&UserProfile>,
    ) -> Conversation {
        let profile = resolve_profile(&req.uid, profile);
        let purpose = req.common.purpose.unwrap_or_default();
        let template = match purpose {
            QuizPurpose::New => GENERATE_NEW_TEMPLATE,
            QuizPurpose::Practice => GENERATE_PRACTICE_TEMPLATE,
            QuizPurpose::Exam => GENERATE_EXAM_TEMPLATE,
        };

        let count = self.question_count(&req.common).to_string();
        let mut prompt = render(
            template,
            &[
                ("count", count.as_str()),
                ("subject", self.subject.as_str()),
                ("grade", profile.grade.as_str()),
                ("semester", profile.semester.as_str()),
                ("question_shape", QUESTION_SHAPE),
            ],
        );
        append_extra_instructions(&mut prompt, &req.common);

        conversation(&req.common, purpose, system_prompt_for(purpose), prompt)
    }

    pub fn submit(
        &self,
        req: &SubmitQuizAssessmentRequest,
        assessment: &UserQuizAssessment,
        answers_json: &str,
    ) -> Conversation {
        let prompt = render(
            SUBMIT_TEMPLATE,
            &[
                ("questions", assessment.questions.as_str()),
                ("answers", answers_json),
                ("grading_shape", GRADING_SHAPE),
            ],
        );
        let purpose = req.common.purpose.unwrap_or_default();
        conversation(&req.common, purpose, SYSTEM_PROMPT_GRADER, prompt)
    }

    pub fn reinforce(
        &self,
        req: &ReinforceQuizAssessmentRequest,
        assessment: &UserQuizAssessment,
    ) -> Conversation {
        let purpose = req.common.purpose.unwrap_or(QuizPurpose::Practice);
        let detected_grade = non_empty_or(&assessment.ai_detect_grade, "an unknown grade");
        let answers = non_empty_or(&assessment.answers, "[]");
        let review = non_empty_or(&assessment.ai_review, "(no review yet)");
        let count = self.question_count(&req.common).to_string();

        let mut prompt = render(
            REINFORCE_TEMPLATE,
            &[
                ("detected_grade", detected_grade),
                ("questions", assessment.questions.as_str()),
                ("answers", answers),
                ("ai_review", review),
                ("count", count.as_str()),
                ("subject", self.subject.as_str()),
                ("question_shape", QUESTION_SHAPE),
            ],
        );
        append_extra_instructions(&mut prompt, &req.common);

        conversation(&req.common, purpose, system_prompt_for(purpose), prompt)
    }

    /// The reinforcement questions come from `req.common.message`, the way clients send them back.
    pub fn submit_reinforce(
        &self,
        req: &SubmitReinforceQuizAssessmentRequest,
        assessment: &UserQuizAssessment,
        answers_json: &str,
        profile: Option<&UserProfile>,
    ) -> Conversation {
        let profile = resolve_profile(&req.uid, profile);
        let questions = req.common.message.as_deref().unwrap_or_default();
        let review = non_empty_or(&assessment.ai_review, "(no review yet)");

        let prompt = render(
            SUBMIT_REINFORCE_TEMPLATE,
            &[
                ("grade", profile.grade.as_str()),
                ("semester", profile.semester.as_str()),
                ("ai_review", review),
                ("questions", questions),
                ("answers", answers_json),
                ("grading_shape", GRADING_SHAPE),
            ],
        );
        let purpose = req.common.purpose.unwrap_or(QuizPurpose::Practice);
        conversation(&req.common, purpose, SYSTEM_PROMPT_GRADER, prompt)
    }

    fn question_count(&self, common: &ChatboxCommon) -> u32 {
        common
            .question_count
            .unwrap_or(self.default_question_count)
            .clamp(1, MAX_QUESTION_COUNT)
    }
}

fn system_prompt_for(purpose: QuizPurpose) -> &'static str {
    match purpose {
        QuizPurpose::New => SYSTEM_PROMPT_NEW,
        QuizPurpose::Practice => SYSTEM_PROMPT_PRACTICE,
        QuizPurpose::Exam => SYSTEM_PROMPT_EXAM,
    }
}

fn resolve_profile(uid: &str, profile: Option<&UserProfile>) -> UserProfile {
    profile
        .cloned()
        .unwrap_or_else(|| UserProfile::neutral(uid))
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

fn append_extra_instructions(prompt: &mut String, common: &ChatboxCommon) {
    if let Some(message) = common.message.as_deref().filter(|m| !m.trim().is_empty()) {
        prompt.push_str(&render(EXTRA_INSTRUCTIONS, &[("message", message)]));
    }
}

fn conversation(
    common: &ChatboxCommon,
    purpose: QuizPurpose,
    default_system: &str,
    user_prompt: String,
) -> Conversation {
    let system = common
        .system_prompt
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default_system.to_string());

    Conversation {
        messages: vec![
            Message::new(Role::System, system.clone()),
            Message::new(Role::User, user_prompt),
        ],
        model: common.model.clone(),
        temperature: common.temperature,
        max_tokens: common.max_tokens,
        system_prompt: Some(system),
        purpose,
    }
}

/// Single-pass placeholder substitution. Inserted values are never rescanned,
/// so braces inside learner or model text survive untouched.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
