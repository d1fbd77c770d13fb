use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity;
use crate::database::Collection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExerciseResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub answer: String,
    pub is_correct: bool,
    /// Sorted on as text, so always written with microsecond precision
    #[serde(with = "fixed_width")]
    pub attempted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMastery {
    pub id: Uuid,
    pub user_id: Uuid,
    pub concept_id: Uuid,
    pub attempts: u64,
    pub correct_attempts: u64,
    pub mastery_percentage: f64,
    pub last_practiced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConceptMastery {
    pub fn new(user_id: Uuid, concept_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            concept_id,
            attempts: 0,
            correct_attempts: 0,
            mastery_percentage: 0.0,
            last_practiced_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record(&mut self, correct: bool, at: DateTime<Utc>) {
        self.attempts += 1;
        if correct {
            self.correct_attempts += 1;
        }
        self.mastery_percentage = percentage(self.correct_attempts, self.attempts);
        self.last_practiced_at = at;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtopicProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtopic_id: Uuid,
    pub exercises_attempted: u64,
    #[serde(default)]
    pub completed_exercises: Vec<Uuid>,
    pub completion_percentage: f64,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubtopicProgress {
    pub fn new(user_id: Uuid, subtopic_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            subtopic_id,
            exercises_attempted: 0,
            completed_exercises: Vec::new(),
            completion_percentage: 0.0,
            last_activity_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Count an attempt. `total_exercises` is the number of exercises across
    /// the subtopic's modules.
    pub fn record(&mut self, exercise_id: Uuid, correct: bool, total_exercises: u64, at: DateTime<Utc>) {
        self.exercises_attempted += 1;
        if correct && !self.completed_exercises.contains(&exercise_id) {
            self.completed_exercises.push(exercise_id);
        }
        self.completion_percentage = percentage(self.completed_exercises.len() as u64, total_exercises);
        self.last_activity_at = at;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Uuid,
    pub subtopics_started: u64,
    pub completion_percentage: f64,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TopicProgress {
    pub fn new(user_id: Uuid, topic_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            topic_id,
            subtopics_started: 0,
            completion_percentage: 0.0,
            last_activity_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

mod fixed_width {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

/// Share of `part` in `whole` as a percentage rounded to one decimal.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = (part.min(whole) as f64 / whole as f64) * 100.0;
    (raw * 10.0).round() / 10.0
}

entity!(UserExerciseResult, Collection::ExerciseResults, "Exercise result");
entity!(ConceptMastery, Collection::ConceptMastery, "Concept mastery");
entity!(SubtopicProgress, Collection::SubtopicProgress, "Subtopic progress");
entity!(TopicProgress, Collection::TopicProgress, "Topic progress");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_and_handles_empty_totals() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 2), 100.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn subtopic_completion_counts_distinct_correct_exercises() {
        let mut progress = SubtopicProgress::new(Uuid::new_v4(), Uuid::new_v4());
        let exercise = Uuid::new_v4();
        progress.record(exercise, true, 4, Utc::now());
        progress.record(exercise, true, 4, Utc::now());
        progress.record(Uuid::new_v4(), false, 4, Utc::now());

        assert_eq!(progress.exercises_attempted, 3);
        assert_eq!(progress.completed_exercises, vec![exercise]);
        assert_eq!(progress.completion_percentage, 25.0);
    }

    #[test]
    fn attempt_times_sort_chronologically_as_text() {
        let result = |at: &str| UserExerciseResult {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            exercise_id: Uuid::new_v4(),
            answer: "4".to_string(),
            is_correct: true,
            attempted_at: at.parse().unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let earlier = serde_json::to_value(result("2024-03-01T10:00:00.123Z")).unwrap();
        let later = serde_json::to_value(result("2024-03-01T10:00:00.123456Z")).unwrap();

        assert_eq!(earlier["attemptedAt"], "2024-03-01T10:00:00.123000Z");
        assert!(earlier["attemptedAt"].as_str() < later["attemptedAt"].as_str());

        let back: UserExerciseResult = serde_json::from_value(later).unwrap();
        assert_eq!(back.attempted_at.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn mastery_tracks_ratio_of_correct_attempts() {
        let mut mastery = ConceptMastery::new(Uuid::new_v4(), Uuid::new_v4());
        mastery.record(true, Utc::now());
        mastery.record(false, Utc::now());
        assert_eq!(mastery.attempts, 2);
        assert_eq!(mastery.mastery_percentage, 50.0);
    }
}
