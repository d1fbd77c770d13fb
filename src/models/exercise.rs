use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{child_of, entity, Module};
use crate::database::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    MultipleChoice,
    TrueFalse,
    Numeric,
    ShortAnswer,
}

impl ExerciseType {
    pub const ALL: &'static [&'static str] = &["multiple-choice", "true-false", "numeric", "short-answer"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConcept {
    pub concept_id: Uuid,
    pub is_primary_focus: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub question: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub hint: Option<String>,
    pub difficulty_level: i64,
    #[serde(default)]
    pub concepts: Vec<ExerciseConcept>,
    pub module_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    /// Grade a submitted answer. Numeric exercises compare as numbers,
    /// everything else compares case-insensitively with whitespace collapsed.
    pub fn is_correct(&self, answer: &str) -> bool {
        if self.exercise_type == ExerciseType::Numeric {
            if let (Ok(given), Ok(expected)) = (answer.trim().parse::<f64>(), self.correct_answer.trim().parse::<f64>()) {
                return (given - expected).abs() <= 1e-9 * expected.abs().max(1.0);
            }
        }
        normalize(answer) == normalize(&self.correct_answer)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

entity!(Exercise, Collection::Exercises, "Exercise");
child_of!(Exercise, Module, "exercises", module_id, "moduleId");

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(exercise_type: ExerciseType, correct_answer: &str) -> Exercise {
        let now = Utc::now();
        Exercise {
            id: Uuid::new_v4(),
            exercise_type,
            question: "?".to_string(),
            correct_answer: correct_answer.to_string(),
            explanation: None,
            options: Vec::new(),
            hint: None,
            difficulty_level: 1,
            concepts: Vec::new(),
            module_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn numeric_answers_compare_as_numbers() {
        let ex = exercise(ExerciseType::Numeric, "0.5");
        assert!(ex.is_correct(" .50 "));
        assert!(!ex.is_correct("0.51"));
    }

    #[test]
    fn text_answers_ignore_case_and_spacing() {
        let ex = exercise(ExerciseType::ShortAnswer, "x = 2");
        assert!(ex.is_correct("X  =   2"));
        assert!(!ex.is_correct("x = 3"));
    }

    #[test]
    fn serializes_type_with_wire_names() {
        let value = serde_json::to_value(exercise(ExerciseType::MultipleChoice, "a")).unwrap();
        assert_eq!(value["type"], "multiple-choice");
        assert!(value.get("moduleId").is_some());
    }
}
