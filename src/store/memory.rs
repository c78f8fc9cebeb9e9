// In-memory storage - one keyed table per entity, guarded by a single lock
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use super::models::*;
use super::{seed, Storage, StoreError, StoreResult};
use crate::gamification::{self, LearnerStats};

/// Rows keyed by id, plus the counter that hands out the next id.
/// Ids start at 1 and are never reused.
pub(super) struct Table<T> {
    rows: BTreeMap<Id, T>,
    next_id: Id,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    /// Allocate an id, build the row with it and store it.
    pub(super) fn insert_with(&mut self, build: impl FnOnce(Id) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub(super) fn get(&self, id: Id) -> Option<&T> {
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn contains(&self, id: Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Rows in ascending id order.
    pub(super) fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub(super) fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Default)]
pub(super) struct Tables {
    pub(super) users: Table<User>,
    pub(super) courses: Table<Course>,
    pub(super) lessons: Table<Lesson>,
    pub(super) quizzes: Table<Quiz>,
    pub(super) progress: Table<UserProgress>,
    pub(super) achievements: Table<Achievement>,
    pub(super) user_achievements: Table<UserAchievement>,
    pub(super) forum_posts: Table<ForumPost>,
    pub(super) quiz_attempts: Table<QuizAttempt>,
}

impl Tables {
    fn user_mut(&mut self, id: Id) -> StoreResult<&mut User> {
        self.users
            .get_mut(id)
            .ok_or(StoreError::NotFound { entity: "user", id })
    }

    fn require<T: Clone>(table: &Table<T>, entity: &'static str, id: Id) -> StoreResult<()> {
        if table.contains(id) {
            Ok(())
        } else {
            Err(StoreError::InvalidReference { entity, id })
        }
    }

    fn completed_courses(&self, user_id: Id) -> usize {
        gamification::count_completed_courses(
            self.progress.values().filter(|p| p.user_id == user_id),
            |course_id| self.courses.get(course_id).map(|c| c.total_lessons),
        )
    }

    fn learner_stats(&self, user: &User) -> LearnerStats {
        let lessons_completed = self
            .progress
            .values()
            .filter(|p| p.user_id == user.id && p.completed)
            .count();

        let quizzes_answered_correctly = self
            .quiz_attempts
            .values()
            .filter(|a| a.user_id == user.id && a.correct)
            .map(|a| a.quiz_id)
            .collect::<HashSet<_>>()
            .len();

        LearnerStats {
            lessons_completed,
            courses_completed: self.completed_courses(user.id),
            quizzes_answered_correctly,
            streak: user.streak,
        }
    }
}

pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl MemStorage {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Store pre-populated with demonstration courses, lessons, quizzes and
    /// achievement definitions.
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        seed::populate(&mut tables, &mut rand::thread_rng());
        tracing::info!(
            courses = tables.courses.len(),
            lessons = tables.lessons.len(),
            quizzes = tables.quizzes.len(),
            achievements = tables.achievements.len(),
            "Seeded demo data"
        );
        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    // -- Users --

    async fn get_user(&self, id: Id) -> Option<User> {
        self.tables.read().await.users.get(id).cloned()
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> Option<User> {
        let t = self.tables.read().await;
        let found = t
            .users
            .values()
            .find(|u| u.external_id == external_id)
            .cloned();
        found
    }

    async fn list_users(&self) -> Vec<User> {
        self.tables.read().await.users.values().cloned().collect()
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;

        if t.users.values().any(|u| u.external_id == user.external_id) {
            return Err(StoreError::Conflict(format!(
                "a user with external id {} already exists",
                user.external_id
            )));
        }

        let xp = user.xp.unwrap_or(0);
        let created = t.users.insert_with(|id| User {
            id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            avatar: user.avatar,
            external_id: user.external_id,
            role: user.role,
            is_instructor: user.role == Role::Instructor,
            xp,
            level: gamification::level_for_xp(xp),
            streak: user.streak.unwrap_or(0),
            created_at: Utc::now(),
        });

        tracing::info!(user_id = created.id, username = %created.username, "Created user");
        Ok(created)
    }

    async fn award_xp(&self, user_id: Id, delta: u64) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let user = t.user_mut(user_id)?;

        user.xp = user.xp.saturating_add(delta);
        user.level = gamification::level_for_xp(user.xp);

        tracing::debug!(user_id, delta, xp = user.xp, level = user.level, "Awarded XP");
        Ok(user.clone())
    }

    async fn update_streak(&self, user_id: Id, streak: u32) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let user = t.user_mut(user_id)?;
        user.streak = streak;
        Ok(user.clone())
    }

    async fn update_role(&self, user_id: Id, role: Role) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let user = t.user_mut(user_id)?;

        user.role = role;
        match role {
            Role::Instructor => user.is_instructor = true,
            Role::Student => user.is_instructor = false,
            Role::Admin => {}
        }

        tracing::info!(user_id, ?role, "Updated user role");
        Ok(user.clone())
    }

    async fn leaderboard(&self, limit: usize) -> Vec<User> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t.users.values().cloned().collect();
        // Stable sort: equal XP keeps ascending id order
        users.sort_by(|a, b| b.xp.cmp(&a.xp));
        users.truncate(limit);
        users
    }

    // -- Courses --

    async fn list_courses(&self) -> Vec<Course> {
        self.tables.read().await.courses.values().cloned().collect()
    }

    async fn get_course(&self, id: Id) -> Option<Course> {
        self.tables.read().await.courses.get(id).cloned()
    }

    async fn create_course(&self, course: NewCourse) -> StoreResult<Course> {
        let mut t = self.tables.write().await;
        let created = t.courses.insert_with(|id| Course {
            id,
            title: course.title,
            description: course.description,
            instructor: course.instructor,
            level: course.level,
            category: course.category,
            duration: course.duration,
            thumbnail: course.thumbnail,
            total_lessons: course.total_lessons,
            created_at: Utc::now(),
        });
        tracing::info!(course_id = created.id, title = %created.title, "Created course");
        Ok(created)
    }

    // -- Lessons --

    async fn lessons_by_course(&self, course_id: Id) -> Vec<Lesson> {
        let t = self.tables.read().await;
        let mut lessons: Vec<Lesson> = t
            .lessons
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order);
        lessons
    }

    async fn get_lesson(&self, id: Id) -> Option<Lesson> {
        self.tables.read().await.lessons.get(id).cloned()
    }

    async fn create_lesson(&self, lesson: NewLesson) -> StoreResult<Lesson> {
        let mut t = self.tables.write().await;
        Tables::require(&t.courses, "course", lesson.course_id)?;

        if t
            .lessons
            .values()
            .any(|l| l.course_id == lesson.course_id && l.order == lesson.order)
        {
            return Err(StoreError::Conflict(format!(
                "course {} already has a lesson at position {}",
                lesson.course_id, lesson.order
            )));
        }

        Ok(t.lessons.insert_with(|id| Lesson {
            id,
            course_id: lesson.course_id,
            title: lesson.title,
            description: lesson.description,
            video_url: lesson.video_url,
            duration: lesson.duration,
            order: lesson.order,
            created_at: Utc::now(),
        }))
    }

    // -- Quizzes --

    async fn quizzes_by_lesson(&self, lesson_id: Id) -> Vec<Quiz> {
        let t = self.tables.read().await;
        t.quizzes
            .values()
            .filter(|q| q.lesson_id == lesson_id)
            .cloned()
            .collect()
    }

    async fn get_quiz(&self, id: Id) -> Option<Quiz> {
        self.tables.read().await.quizzes.get(id).cloned()
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let mut t = self.tables.write().await;
        Tables::require(&t.lessons, "lesson", quiz.lesson_id)?;

        Ok(t.quizzes.insert_with(|id| Quiz {
            id,
            lesson_id: quiz.lesson_id,
            question: quiz.question,
            options: quiz.options,
            correct_answer: quiz.correct_answer,
            explanation: quiz.explanation,
        }))
    }

    // -- Progress --

    async fn user_progress(&self, user_id: Id, course_id: Id) -> Vec<UserProgress> {
        let t = self.tables.read().await;
        t.progress
            .values()
            .filter(|p| p.user_id == user_id && p.course_id == course_id)
            .cloned()
            .collect()
    }

    async fn upsert_progress(&self, progress: NewProgress) -> StoreResult<ProgressUpdate> {
        let mut t = self.tables.write().await;
        Tables::require(&t.users, "user", progress.user_id)?;
        Tables::require(&t.courses, "course", progress.course_id)?;

        let lesson_course = t
            .lessons
            .get(progress.lesson_id)
            .map(|l| l.course_id)
            .ok_or(StoreError::InvalidReference {
                entity: "lesson",
                id: progress.lesson_id,
            })?;
        if lesson_course != progress.course_id {
            return Err(StoreError::InvalidInput(format!(
                "lesson {} does not belong to course {}",
                progress.lesson_id, progress.course_id
            )));
        }

        let now = Utc::now();
        let existing = t
            .progress
            .values()
            .find(|p| p.user_id == progress.user_id && p.lesson_id == progress.lesson_id)
            .map(|p| p.id);

        let update = match existing {
            Some(id) => {
                let record = t.progress.get_mut(id).ok_or_else(|| {
                    StoreError::Inconsistent(format!("progress {} vanished during update", id))
                })?;
                let newly_completed = progress.completed && record.completed_at.is_none();
                record.completed = progress.completed;
                if newly_completed {
                    record.completed_at = Some(now);
                }
                ProgressUpdate {
                    progress: record.clone(),
                    newly_completed,
                }
            }
            None => {
                let created = t.progress.insert_with(|id| UserProgress {
                    id,
                    user_id: progress.user_id,
                    course_id: progress.course_id,
                    lesson_id: progress.lesson_id,
                    completed: progress.completed,
                    completed_at: progress.completed.then_some(now),
                });
                ProgressUpdate {
                    progress: created,
                    newly_completed: progress.completed,
                }
            }
        };

        tracing::debug!(
            user_id = progress.user_id,
            lesson_id = progress.lesson_id,
            completed = update.progress.completed,
            newly_completed = update.newly_completed,
            "Recorded progress"
        );
        Ok(update)
    }

    async fn completed_course_count(&self, user_id: Id) -> usize {
        self.tables.read().await.completed_courses(user_id)
    }

    async fn weekly_activity(&self, user_id: Id, now: DateTime<Local>) -> Vec<DayActivity> {
        let t = self.tables.read().await;
        let completions = t
            .progress
            .values()
            .filter(|p| p.user_id == user_id && p.completed)
            .filter_map(|p| p.completed_at);
        gamification::weekly_activity(completions, now)
    }

    // -- Achievements --

    async fn list_achievements(&self) -> Vec<Achievement> {
        self.tables.read().await.achievements.values().cloned().collect()
    }

    async fn user_achievements(&self, user_id: Id) -> StoreResult<Vec<EarnedAchievement>> {
        let t = self.tables.read().await;
        t.user_achievements
            .values()
            .filter(|ua| ua.user_id == user_id)
            .map(|ua| -> StoreResult<EarnedAchievement> {
                let achievement = t.achievements.get(ua.achievement_id).ok_or_else(|| {
                    StoreError::Inconsistent(format!(
                        "user achievement {} references missing achievement {}",
                        ua.id, ua.achievement_id
                    ))
                })?;
                Ok(EarnedAchievement {
                    earned: ua.clone(),
                    achievement: achievement.clone(),
                })
            })
            .collect()
    }

    async fn grant_achievement(&self, grant: NewUserAchievement) -> StoreResult<UserAchievement> {
        let mut t = self.tables.write().await;
        Tables::require(&t.users, "user", grant.user_id)?;
        Tables::require(&t.achievements, "achievement", grant.achievement_id)?;

        let earned = t.user_achievements.insert_with(|id| UserAchievement {
            id,
            user_id: grant.user_id,
            achievement_id: grant.achievement_id,
            earned_at: Utc::now(),
        });
        tracing::info!(
            user_id = grant.user_id,
            achievement_id = grant.achievement_id,
            "Granted achievement"
        );
        Ok(earned)
    }

    async fn evaluate_achievements(&self, user_id: Id) -> StoreResult<Vec<Achievement>> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .get(user_id)
            .ok_or(StoreError::NotFound { entity: "user", id: user_id })?;
        let stats = t.learner_stats(user);

        let already: HashSet<Id> = t
            .user_achievements
            .values()
            .filter(|ua| ua.user_id == user_id)
            .map(|ua| ua.achievement_id)
            .collect();

        let newly: Vec<Achievement> = t
            .achievements
            .values()
            .filter(|a| !already.contains(&a.id) && gamification::is_earned(a, &stats))
            .cloned()
            .collect();

        let now = Utc::now();
        for achievement in &newly {
            t.user_achievements.insert_with(|id| UserAchievement {
                id,
                user_id,
                achievement_id: achievement.id,
                earned_at: now,
            });
            tracing::info!(user_id, achievement = %achievement.title, "Achievement unlocked");
        }

        Ok(newly)
    }

    // -- Forum --

    async fn forum_feed(&self, limit: usize) -> StoreResult<Vec<ForumPostWithAuthor>> {
        let t = self.tables.read().await;
        let mut posts: Vec<&ForumPost> = t.forum_posts.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        posts
            .into_iter()
            .take(limit)
            .map(|post| -> StoreResult<ForumPostWithAuthor> {
                let user = t.users.get(post.user_id).ok_or_else(|| {
                    StoreError::Inconsistent(format!(
                        "forum post {} references missing user {}",
                        post.id, post.user_id
                    ))
                })?;
                Ok(ForumPostWithAuthor {
                    post: post.clone(),
                    user: user.clone(),
                })
            })
            .collect()
    }

    async fn create_forum_post(&self, post: NewForumPost) -> StoreResult<ForumPost> {
        let mut t = self.tables.write().await;
        Tables::require(&t.users, "user", post.user_id)?;

        Ok(t.forum_posts.insert_with(|id| ForumPost {
            id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            likes: 0,
            replies: 0,
            created_at: Utc::now(),
        }))
    }

    async fn like_forum_post(&self, post_id: Id) -> StoreResult<ForumPost> {
        let mut t = self.tables.write().await;
        let post = t.forum_posts.get_mut(post_id).ok_or(StoreError::NotFound {
            entity: "forum post",
            id: post_id,
        })?;
        post.likes = post.likes.saturating_add(1);
        Ok(post.clone())
    }

    // -- Quiz attempts --

    async fn create_quiz_attempt(&self, attempt: NewQuizAttempt) -> StoreResult<QuizAttempt> {
        let mut t = self.tables.write().await;
        Tables::require(&t.users, "user", attempt.user_id)?;
        Tables::require(&t.quizzes, "quiz", attempt.quiz_id)?;

        Ok(t.quiz_attempts.insert_with(|id| QuizAttempt {
            id,
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            selected_answer: attempt.selected_answer,
            correct: attempt.correct,
            attempted_at: Utc::now(),
        }))
    }

    async fn quiz_attempts(&self, user_id: Id, quiz_id: Id) -> Vec<QuizAttempt> {
        let t = self.tables.read().await;
        t.quiz_attempts
            .values()
            .filter(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .cloned()
            .collect()
    }
}
