//! Checklist question bank with randomized, size-bounded selection.
//!
//! The random source is always passed in, so draws are reproducible with a
//! seeded generator.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::entities::{AnswerChoice, InspectionQuestion, QuestionScope};
use crate::enums::{EntityType, EquipmentCategory};
use crate::errors::CoreError;

const BUILTIN_QUESTIONS: &str = include_str!("../data/questions.toml");

#[derive(Deserialize)]
struct QuestionFile {
    questions: Vec<InspectionQuestion>,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<InspectionQuestion>,
}

impl QuestionBank {
    /// The checklist shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Catalog` if the embedded data is malformed.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_toml_str(BUILTIN_QUESTIONS)
    }

    /// Parse a bank from `[[questions]]` TOML tables.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Catalog` on parse failure or invariant violation.
    pub fn from_toml_str(source: &str) -> Result<Self, CoreError> {
        let file: QuestionFile = toml::from_str(source)
            .map_err(|e| CoreError::Catalog(format!("invalid question TOML: {e}")))?;
        Self::from_questions(file.questions)
    }

    /// Build a bank from already-parsed questions.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Catalog` if any question breaks the choice rules.
    pub fn from_questions(questions: Vec<InspectionQuestion>) -> Result<Self, CoreError> {
        let mut question_ids = HashSet::new();
        let mut choice_ids = HashSet::new();
        for question in &questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(CoreError::Catalog(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
            for choice in &question.choices {
                if !choice_ids.insert(choice.id.as_str()) {
                    return Err(CoreError::Catalog(format!(
                        "duplicate choice id '{}'",
                        choice.id
                    )));
                }
            }
            validate_question(question)?;
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn all(&self) -> &[InspectionQuestion] {
        &self.questions
    }

    /// Look up a question by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if absent.
    pub fn get(&self, id: &str) -> Result<&InspectionQuestion, CoreError> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| CoreError::not_found(EntityType::Question, id))
    }

    /// Common questions plus the ones scoped to `category`, in authoring order.
    #[must_use]
    pub fn eligible(&self, category: EquipmentCategory) -> Vec<&InspectionQuestion> {
        self.questions
            .iter()
            .filter(|q| q.scope.applies_to(category))
            .collect()
    }

    /// Draw `min(count, pool)` distinct eligible questions in shuffled order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyPool` if nothing is eligible for `category`.
    pub fn select_questions<R: Rng + ?Sized>(
        &self,
        category: EquipmentCategory,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<InspectionQuestion>, CoreError> {
        let pool = self.eligible(category);
        if pool.is_empty() {
            return Err(CoreError::EmptyPool { category });
        }

        let take = count.min(pool.len());
        let mut drawn: Vec<InspectionQuestion> = pool
            .choose_multiple(rng, take)
            .map(|q| (*q).clone())
            .collect();
        drawn.shuffle(rng);

        tracing::debug!(
            %category,
            pool = pool.len(),
            drawn = drawn.len(),
            "selected inspection questions"
        );
        Ok(drawn)
    }
}

/// Return a uniformly shuffled copy of `choices` for presentation.
pub fn shuffle_choices<R: Rng + ?Sized>(choices: &[AnswerChoice], rng: &mut R) -> Vec<AnswerChoice> {
    let mut shuffled = choices.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

fn validate_question(question: &InspectionQuestion) -> Result<(), CoreError> {
    let fail = |reason: &str| {
        Err(CoreError::Catalog(format!(
            "question '{}' {reason}",
            question.id
        )))
    };

    if question.id.trim().is_empty() || question.text.trim().is_empty() {
        return fail("has a blank id or text");
    }
    if let QuestionScope::Categories(set) = &question.scope {
        if set.is_empty() {
            return fail("is scoped to an empty category set");
        }
    }

    let acceptable = question.choices.iter().filter(|c| c.is_acceptable).count();
    if acceptable != 1 {
        return fail("must have exactly one acceptable choice");
    }
    if question.choices.len() < 2 {
        return fail("must have at least one defect choice");
    }
    for choice in &question.choices {
        match (choice.is_acceptable, choice.severity) {
            (true, Some(_)) => return fail("has an acceptable choice with a severity"),
            (false, None) => return fail("has a defect choice without a severity"),
            _ => {}
        }
    }
    Ok(())
}
