pub mod lesson_client;

pub use lesson_client::{LessonApiClient, QuestionSubmitter};
