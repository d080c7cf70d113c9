pub mod profile;
pub mod quiz_assessment;

pub use profile::{PgProfileProvider, ProfileProvider, StaticProfileProvider};
pub use quiz_assessment::QuizAssessmentService;
