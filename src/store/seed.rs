// Demonstration data loaded at startup
use chrono::Utc;
use rand::Rng;

use super::memory::Tables;
use super::models::*;

/// Share of seeded lessons that get a quiz.
const QUIZ_PROBABILITY: f64 = 0.3;

const DEMO_VIDEO: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

pub(super) fn populate(tables: &mut Tables, rng: &mut impl Rng) {
    let achievements = [
        ("First Steps", "Complete your first lesson", "fas fa-baby", AchievementKind::LessonCompletion, 1),
        ("Course Completed", "Complete your first course", "fas fa-trophy", AchievementKind::CourseCompletion, 1),
        ("Streak Master", "Maintain a 15-day learning streak", "fas fa-fire", AchievementKind::Streak, 15),
        ("Perfect Quiz", "Score 100% on 5 quizzes", "fas fa-star", AchievementKind::QuizPerfect, 5),
        ("Knowledge Seeker", "Complete 10 courses", "fas fa-book", AchievementKind::CourseCompletion, 10),
    ];
    for (title, description, icon, kind, requirement) in achievements {
        tables.achievements.insert_with(|id| Achievement {
            id,
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            kind,
            requirement,
        });
    }

    let courses = [
        (
            "JavaScript Fundamentals",
            "Learn the basics of JavaScript programming with hands-on exercises and real-world examples.",
            "John Smith",
            CourseLevel::Beginner,
            "Programming",
            480,
            "https://images.unsplash.com/photo-1522202176988-66273c2fd55f?auto=format&fit=crop&w=800&h=400",
            12,
        ),
        (
            "Advanced React Development",
            "Master advanced React concepts including hooks, context, performance optimization, and modern patterns.",
            "Sarah Wilson",
            CourseLevel::Intermediate,
            "Frontend",
            720,
            "https://images.unsplash.com/photo-1517077304055-6e89abbf09b0?auto=format&fit=crop&w=800&h=400",
            18,
        ),
        (
            "UI/UX Design Principles",
            "Master the fundamentals of user interface and experience design with practical projects.",
            "Mike Chen",
            CourseLevel::Intermediate,
            "Design",
            600,
            "https://images.unsplash.com/photo-1581291518857-4e27b48ff24e?auto=format&fit=crop&w=800&h=400",
            15,
        ),
    ];

    let now = Utc::now();
    for (title, description, instructor, level, category, duration, thumbnail, total_lessons) in courses {
        let course = tables.courses.insert_with(|id| Course {
            id,
            title: title.into(),
            description: description.into(),
            instructor: instructor.into(),
            level,
            category: category.into(),
            duration,
            thumbnail: Some(thumbnail.into()),
            total_lessons,
            created_at: now,
        });

        for order in 1..=course.total_lessons {
            let lesson = tables.lessons.insert_with(|id| Lesson {
                id,
                course_id: course.id,
                title: format!("{} - Lesson {}", course.title, order),
                description: format!(
                    "Learn about {} concepts in this lesson.",
                    course.title.to_lowercase()
                ),
                video_url: DEMO_VIDEO.into(),
                duration: rng.gen_range(15..45),
                order,
                created_at: now,
            });

            if rng.gen_bool(QUIZ_PROBABILITY) {
                tables.quizzes.insert_with(|id| Quiz {
                    id,
                    lesson_id: lesson.id,
                    question: "Which of the following is correct?".into(),
                    options: ["Option A", "Option B", "Option C", "Option D"]
                        .into_iter()
                        .map(String::from)
                        .collect(),
                    correct_answer: 1,
                    explanation: Some("Option B is correct because it matches the lesson.".into()),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded() -> Tables {
        let mut tables = Tables::default();
        populate(&mut tables, &mut StdRng::seed_from_u64(7));
        tables
    }

    #[test]
    fn seeds_courses_with_their_declared_lessons() {
        let tables = seeded();
        assert_eq!(tables.courses.len(), 3);
        assert_eq!(tables.achievements.len(), 5);

        for course in tables.courses.values() {
            let lessons: Vec<_> = tables
                .lessons
                .values()
                .filter(|l| l.course_id == course.id)
                .collect();
            assert_eq!(lessons.len(), course.total_lessons as usize);
            assert!(lessons.iter().all(|l| (15..45).contains(&l.duration)));
        }
        assert_eq!(tables.lessons.len(), 45);
    }

    #[test]
    fn seeded_quizzes_point_at_lessons_and_valid_answers() {
        let tables = seeded();
        assert!(tables.quizzes.len() <= tables.lessons.len());
        for quiz in tables.quizzes.values() {
            assert!(tables.lessons.get(quiz.lesson_id).is_some());
            assert!(quiz.correct_answer < quiz.options.len());
        }
    }
}
