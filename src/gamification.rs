// XP, levels, weekly activity and achievement rules.
// Pure functions only; the store feeds them snapshots of its tables.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

use crate::store::models::{Achievement, AchievementKind, DayActivity, Id, UserProgress};

pub const XP_PER_LEVEL: u64 = 1000;
pub const XP_LESSON_COMPLETE: u64 = 100;
pub const XP_QUIZ_CORRECT: u64 = 50;

/// Estimated study time credited for each completed lesson.
pub const HOURS_PER_LESSON: f64 = 0.5;
/// Daily hours that fill the progress bar.
pub const TARGET_DAILY_HOURS: f64 = 4.0;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn level_for_xp(xp: u64) -> u32 {
    u32::try_from(xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Sunday of the week containing `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
}

/// Buckets completion timestamps into the local calendar week containing
/// `now`, Sunday through Saturday. Always returns seven entries.
pub fn weekly_activity<I>(completions: I, now: DateTime<Local>) -> Vec<DayActivity>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let start = week_start(now.date_naive());

    let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();
    for at in completions {
        let day = at.with_timezone(&Local).date_naive();
        *per_day.entry(day).or_default() += 1;
    }

    DAY_NAMES
        .iter()
        .enumerate()
        .map(|(offset, &name)| {
            let day = start + Duration::days(offset as i64);
            let lessons = per_day.get(&day).copied().unwrap_or(0);
            let hours = f64::from(lessons) * HOURS_PER_LESSON;
            let progress = ((hours / TARGET_DAILY_HOURS).min(1.0) * 100.0).round() as u32;
            DayActivity {
                day: name,
                hours,
                progress,
            }
        })
        .collect()
}

/// Counts courses whose number of distinct completed lessons reaches the
/// course's declared `totalLessons`.
///
/// This only compares counts. It does not check that the completed lessons
/// still make up the course's current lesson list, so a drifting
/// `totalLessons` changes the answer.
pub fn count_completed_courses<'a, I, F>(progress: I, total_lessons: F) -> usize
where
    I: IntoIterator<Item = &'a UserProgress>,
    F: Fn(Id) -> Option<u32>,
{
    let mut lessons_by_course: HashMap<Id, HashSet<Id>> = HashMap::new();
    for record in progress.into_iter().filter(|p| p.completed) {
        lessons_by_course
            .entry(record.course_id)
            .or_default()
            .insert(record.lesson_id);
    }

    lessons_by_course
        .iter()
        .filter(|(course_id, lessons)| match total_lessons(**course_id) {
            Some(total) => lessons.len() >= total as usize,
            None => false,
        })
        .count()
}

/// Per-user counters achievement rules are checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearnerStats {
    pub lessons_completed: usize,
    pub courses_completed: usize,
    /// Distinct quizzes with at least one correct attempt.
    pub quizzes_answered_correctly: usize,
    pub streak: u32,
}

/// Whether `stats` satisfies the achievement's requirement. Free-form types
/// have no rule and are only ever granted explicitly.
pub fn is_earned(achievement: &Achievement, stats: &LearnerStats) -> bool {
    let requirement = achievement.requirement as usize;
    match &achievement.kind {
        AchievementKind::LessonCompletion => stats.lessons_completed >= requirement,
        AchievementKind::CourseCompletion => stats.courses_completed >= requirement,
        AchievementKind::QuizPerfect => stats.quizzes_answered_correctly >= requirement,
        AchievementKind::Streak => stats.streak as usize >= requirement,
        AchievementKind::Other(_) => false,
    }
}
