use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, services::QuizAssessmentService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub quiz: Arc<QuizAssessmentService>,
}

impl FromRef<AppState> for Arc<QuizAssessmentService> {
    fn from_ref(state: &AppState) -> Self {
        state.quiz.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
