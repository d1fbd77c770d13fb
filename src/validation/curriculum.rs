//! Body validators for the curriculum routes. `New*` inputs come from POST
//! bodies where the creation fields are required; `*Fields` come from PUT
//! bodies where every field is optional.

use serde_json::Value;
use uuid::Uuid;

use super::{FieldError, Presence, Rules, Validated};
use crate::models::{DifficultyRange, ExerciseConcept, ExerciseType, ModuleType, RelationshipType};

use Presence::{Nullable, Optional, Required};

/// Required fields of a creation body are all present once its rules pass.
fn complete<T>(build: impl FnOnce() -> Option<T>) -> Validated<T> {
    build().ok_or_else(|| vec![FieldError::new("body", "Invalid request body")])
}

fn presence(creating: bool) -> Presence {
    if creating {
        Required
    } else {
        Optional
    }
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub icon_url: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectFields {
    pub name: Option<String>,
    pub icon_url: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub fn new_subject(body: &Value) -> Validated<NewSubject> {
    let f = subject_fields(body, true)?;
    complete(|| {
        Some(NewSubject {
            name: f.name?,
            icon_url: f.icon_url?,
            description: f.description?,
        })
    })
}

pub fn subject_changes(body: &Value) -> Validated<SubjectFields> {
    subject_fields(body, false)
}

fn subject_fields(body: &Value, creating: bool) -> Validated<SubjectFields> {
    let mut rules = Rules::new(body);
    let name = rules.string("name", presence(creating));
    let icon_url = rules.string("iconUrl", presence(creating));
    let description = rules.string("description", presence(creating));
    let is_active = rules.boolean("isActive", Optional);
    rules.finish(|| {
        Some(SubjectFields {
            name,
            icon_url,
            description,
            is_active,
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct TopicFields {
    pub name: Option<String>,
    pub subject_id: Option<Uuid>,
    pub position: Option<i64>,
    pub difficulty_range: Option<DifficultyRange>,
    pub estimated_study_hours: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub name: String,
    pub subject_id: Uuid,
    pub position: i64,
    pub difficulty_range: DifficultyRange,
    pub estimated_study_hours: f64,
    pub is_active: bool,
}

pub fn new_topic(body: &Value) -> Validated<NewTopic> {
    let f = topic_fields(body, true)?;
    complete(|| {
        Some(NewTopic {
            name: f.name?,
            subject_id: f.subject_id?,
            position: f.position?,
            difficulty_range: f.difficulty_range?,
            estimated_study_hours: f.estimated_study_hours?,
            is_active: f.is_active.unwrap_or(true),
        })
    })
}

pub fn topic_changes(body: &Value) -> Validated<TopicFields> {
    topic_fields(body, false)
}

fn topic_fields(body: &Value, creating: bool) -> Validated<TopicFields> {
    let p = presence(creating);
    let mut rules = Rules::new(body);
    let name = rules.string("name", p);
    let subject_id = rules.id("subjectId", p);
    let position = rules.integer("position", p, 0, i64::MAX);
    let difficulty_range = rules.choice("difficultyRange", p, DifficultyRange::ALL);
    let estimated_study_hours = rules.number("estimatedStudyHours", p, 0.0, f64::INFINITY);
    let is_active = rules.boolean("isActive", Optional);
    rules.finish(|| {
        Some(TopicFields {
            name,
            subject_id,
            position,
            difficulty_range,
            estimated_study_hours,
            is_active,
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct SubtopicFields {
    pub name: Option<String>,
    pub topic_id: Option<Uuid>,
    pub position: Option<i64>,
    pub difficulty_score: Option<f64>,
    pub estimated_study_minutes: Option<i64>,
    pub concepts: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct NewSubtopic {
    pub name: String,
    pub topic_id: Uuid,
    pub position: i64,
    pub difficulty_score: f64,
    pub estimated_study_minutes: i64,
    pub concepts: Vec<Uuid>,
}

pub fn new_subtopic(body: &Value) -> Validated<NewSubtopic> {
    let f = subtopic_fields(body, true)?;
    complete(|| {
        Some(NewSubtopic {
            name: f.name?,
            topic_id: f.topic_id?,
            position: f.position?,
            difficulty_score: f.difficulty_score?,
            estimated_study_minutes: f.estimated_study_minutes?,
            concepts: f.concepts.unwrap_or_default(),
        })
    })
}

pub fn subtopic_changes(body: &Value) -> Validated<SubtopicFields> {
    subtopic_fields(body, false)
}

fn subtopic_fields(body: &Value, creating: bool) -> Validated<SubtopicFields> {
    let p = presence(creating);
    let mut rules = Rules::new(body);
    let name = rules.string("name", p);
    let topic_id = rules.id("topicId", p);
    let position = rules.integer("position", p, 0, i64::MAX);
    let difficulty_score = rules.number("difficultyScore", p, 1.0, 10.0);
    let estimated_study_minutes = rules.integer("estimatedStudyMinutes", p, 0, i64::MAX);
    let concepts = rules.ids("concepts", Optional);
    rules.finish(|| {
        Some(SubtopicFields {
            name,
            topic_id,
            position,
            difficulty_score,
            estimated_study_minutes,
            concepts,
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct ModuleFields {
    pub name: Option<String>,
    pub subtopic_id: Option<Uuid>,
    pub position: Option<i64>,
    pub module_type: Option<ModuleType>,
    pub xp_reward: Option<i64>,
    pub difficulty_level: Option<i64>,
    pub estimated_minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewModule {
    pub name: String,
    pub subtopic_id: Uuid,
    pub position: i64,
    pub module_type: ModuleType,
    pub xp_reward: i64,
    pub difficulty_level: i64,
    pub estimated_minutes: i64,
}

pub fn new_module(body: &Value) -> Validated<NewModule> {
    let f = module_fields(body, true)?;
    complete(|| {
        Some(NewModule {
            name: f.name?,
            subtopic_id: f.subtopic_id?,
            position: f.position?,
            module_type: f.module_type?,
            xp_reward: f.xp_reward?,
            difficulty_level: f.difficulty_level?,
            estimated_minutes: f.estimated_minutes?,
        })
    })
}

pub fn module_changes(body: &Value) -> Validated<ModuleFields> {
    module_fields(body, false)
}

fn module_fields(body: &Value, creating: bool) -> Validated<ModuleFields> {
    let p = presence(creating);
    let mut rules = Rules::new(body);
    let name = rules.string("name", p);
    let subtopic_id = rules.id("subtopicId", p);
    let position = rules.integer("position", p, 0, i64::MAX);
    let module_type = rules.choice("moduleType", p, ModuleType::ALL);
    let xp_reward = rules.integer("xpReward", p, 0, i64::MAX);
    let difficulty_level = rules.integer("difficultyLevel", p, 1, 5);
    let estimated_minutes = rules.integer("estimatedMinutes", p, 1, i64::MAX);
    rules.finish(|| {
        Some(ModuleFields {
            name,
            subtopic_id,
            position,
            module_type,
            xp_reward,
            difficulty_level,
            estimated_minutes,
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct ConceptFields {
    pub name: Option<String>,
    pub subject_id: Option<Uuid>,
    pub symbol_notation: Option<String>,
    pub description: Option<String>,
    pub difficulty_level: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewConcept {
    pub name: String,
    pub subject_id: Uuid,
    pub symbol_notation: Option<String>,
    pub description: String,
    pub difficulty_level: i64,
}

pub fn new_concept(body: &Value) -> Validated<NewConcept> {
    let f = concept_fields(body, true)?;
    complete(|| {
        Some(NewConcept {
            name: f.name?,
            subject_id: f.subject_id?,
            symbol_notation: f.symbol_notation,
            description: f.description?,
            difficulty_level: f.difficulty_level?,
        })
    })
}

pub fn concept_changes(body: &Value) -> Validated<ConceptFields> {
    concept_fields(body, false)
}

fn concept_fields(body: &Value, creating: bool) -> Validated<ConceptFields> {
    let p = presence(creating);
    let mut rules = Rules::new(body);
    let name = rules.string("name", p);
    let subject_id = rules.id("subjectId", p);
    let symbol_notation = rules.string("symbolNotation", Nullable);
    let description = rules.string("description", p);
    let difficulty_level = rules.integer("difficultyLevel", p, 1, 5);
    rules.finish(|| {
        Some(ConceptFields {
            name,
            subject_id,
            symbol_notation,
            description,
            difficulty_level,
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct FormulaFields {
    pub name: Option<String>,
    pub concept_id: Option<Uuid>,
    pub latex_notation: Option<String>,
    pub plain_text: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFormula {
    pub name: String,
    pub concept_id: Uuid,
    pub latex_notation: String,
    pub plain_text: Option<String>,
    pub description: Option<String>,
}

pub fn new_formula(body: &Value) -> Validated<NewFormula> {
    let f = formula_fields(body, true)?;
    complete(|| {
        Some(NewFormula {
            name: f.name?,
            concept_id: f.concept_id?,
            latex_notation: f.latex_notation?,
            plain_text: f.plain_text,
            description: f.description,
        })
    })
}

pub fn formula_changes(body: &Value) -> Validated<FormulaFields> {
    formula_fields(body, false)
}

fn formula_fields(body: &Value, creating: bool) -> Validated<FormulaFields> {
    let p = presence(creating);
    let mut rules = Rules::new(body);
    let name = rules.string("name", p);
    let concept_id = rules.id("conceptId", p);
    let latex_notation = rules.string("latexNotation", p);
    let plain_text = rules.string("plainText", Nullable);
    let description = rules.string("description", Nullable);
    rules.finish(|| {
        Some(FormulaFields {
            name,
            concept_id,
            latex_notation,
            plain_text,
            description,
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseFields {
    pub module_id: Option<Uuid>,
    pub exercise_type: Option<ExerciseType>,
    pub question: Option<String>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub options: Option<Vec<String>>,
    pub hint: Option<String>,
    pub difficulty_level: Option<i64>,
    pub concepts: Option<Vec<ExerciseConcept>>,
}

#[derive(Debug, Clone)]
pub struct NewExercise {
    pub module_id: Uuid,
    pub exercise_type: ExerciseType,
    pub question: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub options: Vec<String>,
    pub hint: Option<String>,
    pub difficulty_level: i64,
    pub concepts: Vec<ExerciseConcept>,
}

pub fn new_exercise(body: &Value) -> Validated<NewExercise> {
    let f = exercise_fields(body, true)?;
    let input = complete(|| {
        Some(NewExercise {
            module_id: f.module_id?,
            exercise_type: f.exercise_type?,
            question: f.question?,
            correct_answer: f.correct_answer?,
            explanation: f.explanation,
            options: f.options.unwrap_or_default(),
            hint: f.hint,
            difficulty_level: f.difficulty_level?,
            concepts: f.concepts.unwrap_or_default(),
        })
    })?;
    match options_error(input.exercise_type, &input.options, &input.correct_answer) {
        Some(error) => Err(vec![error]),
        None => Ok(input),
    }
}

/// Multiple-choice exercises need at least two options, one of them the
/// correct answer.
pub fn options_error(exercise_type: ExerciseType, options: &[String], correct_answer: &str) -> Option<FieldError> {
    if exercise_type != ExerciseType::MultipleChoice {
        return None;
    }
    if options.len() < 2 {
        return Some(FieldError::new("options", "Multiple-choice exercises need at least two options"));
    }
    if !options.iter().any(|option| option.trim() == correct_answer.trim()) {
        return Some(FieldError::new("options", "options must contain the correct answer"));
    }
    None
}

pub fn exercise_changes(body: &Value) -> Validated<ExerciseFields> {
    exercise_fields(body, false)
}

fn exercise_fields(body: &Value, creating: bool) -> Validated<ExerciseFields> {
    let p = presence(creating);
    let mut rules = Rules::new(body);
    let module_id = rules.id("moduleId", p);
    let exercise_type = rules.choice("type", p, ExerciseType::ALL);
    let question = rules.string("question", p);
    let correct_answer = rules.string("correctAnswer", p);
    let explanation = rules.string("explanation", Nullable);
    let options = rules.strings("options", Optional);
    let hint = rules.string("hint", Nullable);
    let difficulty_level = rules.integer("difficultyLevel", p, 1, 5);
    let concepts = exercise_concepts(&mut rules);

    rules.finish(|| {
        Some(ExerciseFields {
            module_id,
            exercise_type,
            question,
            correct_answer,
            explanation,
            options,
            hint,
            difficulty_level,
            concepts,
        })
    })
}

fn exercise_concepts(rules: &mut Rules<'_>) -> Option<Vec<ExerciseConcept>> {
    let value = rules.value("concepts")?;
    let parsed: Option<Vec<ExerciseConcept>> = value.as_array().and_then(|items| {
        items
            .iter()
            .map(|item| {
                let concept_id = item.get("conceptId")?.as_str()?.parse().ok()?;
                let is_primary_focus = match item.get("isPrimaryFocus") {
                    None | Some(Value::Null) => false,
                    Some(flag) => flag.as_bool()?,
                };
                Some(ExerciseConcept {
                    concept_id,
                    is_primary_focus,
                })
            })
            .collect()
    });

    match parsed {
        Some(concepts) if concepts.iter().filter(|c| c.is_primary_focus).count() > 1 => {
            rules.push("concepts", "Only one concept can be the primary focus");
            None
        }
        Some(concepts)
            if concepts
                .iter()
                .enumerate()
                .any(|(i, c)| concepts[..i].iter().any(|earlier| earlier.concept_id == c.concept_id)) =>
        {
            rules.push("concepts", "Each concept can be linked only once");
            None
        }
        Some(concepts) => Some(concepts),
        None => {
            rules.push("concepts", "concepts must be a list of {conceptId, isPrimaryFocus}");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRelationship {
    pub target_concept_id: Uuid,
    pub relationship_type: RelationshipType,
    pub strength: Option<f64>,
    pub description: Option<String>,
}

pub fn new_relationship(body: &Value) -> Validated<NewRelationship> {
    let mut rules = Rules::new(body);
    let target_concept_id = rules.id("targetConceptId", Required);
    let relationship_type = rules.choice("relationshipType", Required, RelationshipType::ALL);
    let strength = rules.number("strength", Optional, 0.0, 1.0);
    let description = rules.string("description", Nullable);
    rules.finish(|| {
        Some(NewRelationship {
            target_concept_id: target_concept_id?,
            relationship_type: relationship_type?,
            strength,
            description,
        })
    })
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub answer: String,
}

pub fn attempt(body: &Value) -> Validated<Attempt> {
    let mut rules = Rules::new(body);
    let answer = match rules.value("answer") {
        // numeric and true/false answers may arrive unquoted
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => rules.string("answer", Required),
    };
    rules.finish(|| Some(Attempt { answer: answer? }))
}
