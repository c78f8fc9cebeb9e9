use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

pub type Id = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Achievement categories. Unknown strings are kept verbatim so free-form
/// types survive a round trip through the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AchievementKind {
    CourseCompletion,
    Streak,
    QuizPerfect,
    LessonCompletion,
    Other(String),
}

impl AchievementKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CourseCompletion => "course_completion",
            Self::Streak => "streak",
            Self::QuizPerfect => "quiz_perfect",
            Self::LessonCompletion => "lesson_completion",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for AchievementKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "course_completion" => Self::CourseCompletion,
            "streak" => Self::Streak,
            "quiz_perfect" => Self::QuizPerfect,
            "lesson_completion" => Self::LessonCompletion,
            _ => Self::Other(value),
        }
    }
}

impl From<AchievementKind> for String {
    fn from(kind: AchievementKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Entities --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar: Option<String>,
    #[serde(alias = "firebaseUid")]
    pub external_id: String,
    pub role: Role,
    pub is_instructor: bool,
    pub xp: u64,
    pub level: u32,
    pub streak: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub level: CourseLevel,
    pub category: String,
    pub duration: u32,
    pub thumbnail: Option<String>,
    pub total_lessons: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Id,
    pub course_id: Id,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration: u32,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Id,
    pub lesson_id: Id,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub id: Id,
    pub user_id: Id,
    pub course_id: Id,
    pub lesson_id: Id,
    pub completed: bool,
    /// First time the lesson was marked completed. Never cleared.
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    pub requirement: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: Id,
    pub user_id: Id,
    pub achievement_id: Id,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub content: String,
    pub likes: u32,
    pub replies: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Id,
    pub user_id: Id,
    pub quiz_id: Id,
    pub selected_answer: usize,
    /// Supplied by the caller; never recomputed from the quiz.
    pub correct: bool,
    pub attempted_at: DateTime<Utc>,
}

// -- Joined read models --

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievement {
    #[serde(flatten)]
    pub earned: UserAchievement,
    pub achievement: Achievement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPostWithAuthor {
    #[serde(flatten)]
    pub post: ForumPost,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayActivity {
    pub day: &'static str,
    pub hours: f64,
    pub progress: u32,
}

/// Result of a progress upsert. `newly_completed` is true only when this call
/// moved the record into the completed state for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub progress: UserProgress,
    pub newly_completed: bool,
}

// -- Insert payloads --

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "displayName is required"))]
    pub display_name: String,
    #[validate(url(message = "avatar must be a URL"))]
    pub avatar: Option<String>,
    #[serde(alias = "firebaseUid")]
    #[validate(length(min = 1, message = "externalId is required"))]
    pub external_id: String,
    /// Anything but `student` needs an admin when admin checks are enforced.
    /// `isInstructor` follows from the role.
    #[serde(default)]
    pub role: Role,
    pub xp: Option<u64>,
    pub streak: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "instructor is required"))]
    pub instructor: String,
    pub level: CourseLevel,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(range(min = 1, message = "duration must be at least one minute"))]
    pub duration: u32,
    #[validate(url(message = "thumbnail must be a URL"))]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub total_lessons: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    #[validate(range(min = 1, message = "courseId must be positive"))]
    pub course_id: Id,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(url(message = "videoUrl must be a URL"))]
    pub video_url: String,
    #[validate(range(min = 1, message = "duration must be at least one minute"))]
    pub duration: u32,
    #[validate(range(min = 1, message = "order must be positive"))]
    pub order: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_answer_index", skip_on_field_errors = false))]
pub struct NewQuiz {
    #[validate(range(min = 1, message = "lessonId must be positive"))]
    pub lesson_id: Id,
    #[validate(length(min = 1, message = "question is required"))]
    pub question: String,
    #[validate(length(min = 2, message = "at least two options are required"))]
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

fn validate_answer_index(quiz: &NewQuiz) -> Result<(), ValidationError> {
    if quiz.correct_answer >= quiz.options.len() {
        let mut err = ValidationError::new("answer_index");
        err.message = Some("correctAnswer must index into options".into());
        return Err(err);
    }
    if quiz.options.iter().any(|o| o.trim().is_empty()) {
        let mut err = ValidationError::new("empty_option");
        err.message = Some("options must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProgress {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: Id,
    #[validate(range(min = 1, message = "courseId must be positive"))]
    pub course_id: Id,
    #[validate(range(min = 1, message = "lessonId must be positive"))]
    pub lesson_id: Id,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUserAchievement {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: Id,
    #[validate(range(min = 1, message = "achievementId must be positive"))]
    pub achievement_id: Id,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewForumPost {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: Id,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewQuizAttempt {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: Id,
    #[validate(range(min = 1, message = "quizId must be positive"))]
    pub quiz_id: Id,
    pub selected_answer: usize,
    pub correct: bool,
}
