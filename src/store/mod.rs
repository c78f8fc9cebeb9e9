pub mod memory;
pub mod models;
mod seed;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

pub use memory::MemStorage;
use models::*;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: Id },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Inconsistent state: {0}")]
    Inconsistent(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the API needs from the data layer.
///
/// Lookups return `None` for missing rows. Each mutating call is a single
/// read-modify-write step: implementations must not let another caller see
/// or clobber the intermediate state.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn get_user(&self, id: Id) -> Option<User>;
    async fn get_user_by_external_id(&self, external_id: &str) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Adds `delta` to the user's XP and recomputes the level.
    async fn award_xp(&self, user_id: Id, delta: u64) -> StoreResult<User>;
    async fn update_streak(&self, user_id: Id, streak: u32) -> StoreResult<User>;

    /// Sets the role. Promoting to instructor also sets the instructor flag.
    async fn update_role(&self, user_id: Id, role: Role) -> StoreResult<User>;

    /// Top `limit` users by descending XP.
    async fn leaderboard(&self, limit: usize) -> Vec<User>;

    // Courses
    async fn list_courses(&self) -> Vec<Course>;
    async fn get_course(&self, id: Id) -> Option<Course>;
    async fn create_course(&self, course: NewCourse) -> StoreResult<Course>;

    // Lessons
    /// Lessons of a course in ascending `order`.
    async fn lessons_by_course(&self, course_id: Id) -> Vec<Lesson>;
    async fn get_lesson(&self, id: Id) -> Option<Lesson>;
    async fn create_lesson(&self, lesson: NewLesson) -> StoreResult<Lesson>;

    // Quizzes
    async fn quizzes_by_lesson(&self, lesson_id: Id) -> Vec<Quiz>;
    async fn get_quiz(&self, id: Id) -> Option<Quiz>;
    async fn create_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz>;

    // Progress
    async fn user_progress(&self, user_id: Id, course_id: Id) -> Vec<UserProgress>;

    /// Insert or update the record for (user, lesson). `completedAt` is set on
    /// the first transition into completed and is never cleared afterwards.
    async fn upsert_progress(&self, progress: NewProgress) -> StoreResult<ProgressUpdate>;
    async fn completed_course_count(&self, user_id: Id) -> usize;
    async fn weekly_activity(&self, user_id: Id, now: DateTime<Local>) -> Vec<DayActivity>;

    // Achievements
    async fn list_achievements(&self) -> Vec<Achievement>;
    async fn user_achievements(&self, user_id: Id) -> StoreResult<Vec<EarnedAchievement>>;
    async fn grant_achievement(&self, grant: NewUserAchievement) -> StoreResult<UserAchievement>;

    /// Grants every rule-based achievement the user now qualifies for and has
    /// not earned yet. Returns the newly granted definitions.
    async fn evaluate_achievements(&self, user_id: Id) -> StoreResult<Vec<Achievement>>;

    // Forum
    /// Up to `limit` most recent posts, newest first, each with its author.
    async fn forum_feed(&self, limit: usize) -> StoreResult<Vec<ForumPostWithAuthor>>;
    async fn create_forum_post(&self, post: NewForumPost) -> StoreResult<ForumPost>;
    async fn like_forum_post(&self, post_id: Id) -> StoreResult<ForumPost>;

    // Quiz attempts
    async fn create_quiz_attempt(&self, attempt: NewQuizAttempt) -> StoreResult<QuizAttempt>;
    async fn quiz_attempts(&self, user_id: Id, quiz_id: Id) -> Vec<QuizAttempt>;
}
