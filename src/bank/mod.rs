use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;


#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("could not read {0}")]
    Unreachable(String, #[source] std::io::Error),
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid question bank: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Hero {
    pub name: String,
    pub image_url: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionSet {
    pub hero_name: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct QuestionsDocument {
    trivia_questions: Vec<QuestionSet>,
}

#[derive(Debug)]
pub struct QuestionBank {
    heroes: Vec<Hero>,
    sets: Vec<QuestionSet>,
    question_count: usize,
}

impl QuestionBank {
    pub fn load(heroes_path: &Path, questions_path: &Path) -> Result<QuestionBank, DataLoadError> {
        let heroes = fs::read_to_string(heroes_path)
            .map_err(|e| DataLoadError::Unreachable(heroes_path.display().to_string(), e))?;
        let questions = fs::read_to_string(questions_path)
            .map_err(|e| DataLoadError::Unreachable(questions_path.display().to_string(), e))?;
        Self::from_json(&heroes, &questions)
    }

    pub fn from_json(heroes_json: &str, questions_json: &str) -> Result<QuestionBank, DataLoadError> {
        let heroes: Vec<Hero> = serde_json::from_str(heroes_json)?;
        let document: QuestionsDocument = serde_json::from_str(questions_json)?;
        Self::validate(heroes, document.trivia_questions)
    }

    fn validate(heroes: Vec<Hero>, sets: Vec<QuestionSet>) -> Result<QuestionBank, DataLoadError> {
        if heroes.is_empty() {
            return Err(DataLoadError::Invalid("hero list is empty".into()));
        }

        let hero_names: HashSet<&str> = heroes.iter().map(|h| h.name.as_str()).collect();
        let mut seen_questions = HashSet::new();
        let mut question_count = 0;

        for set in &sets {
            if !hero_names.contains(set.hero_name.as_str()) {
                return Err(DataLoadError::Invalid(format!(
                    "question set for unknown hero '{}'",
                    set.hero_name
                )));
            }
            for question in &set.questions {
                if question.text.trim().is_empty() {
                    return Err(DataLoadError::Invalid(format!(
                        "empty question text for hero '{}'",
                        set.hero_name
                    )));
                }
                if question.options.len() < 2 {
                    return Err(DataLoadError::Invalid(format!(
                        "question '{}' needs at least two options",
                        question.text
                    )));
                }
                if !question.options.contains(&question.correct_answer) {
                    return Err(DataLoadError::Invalid(format!(
                        "correct answer for '{}' is not one of its options",
                        question.text
                    )));
                }
                // Question text doubles as the question's identity.
                if !seen_questions.insert(question.text.as_str()) {
                    return Err(DataLoadError::Invalid(format!(
                        "duplicate question '{}'",
                        question.text
                    )));
                }
                question_count += 1;
            }
        }

        if question_count == 0 {
            return Err(DataLoadError::Invalid("no questions for any hero".into()));
        }

        Ok(QuestionBank {
            heroes,
            sets,
            question_count,
        })
    }

    pub fn get_heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn get_questions(&self, hero_name: &str) -> Option<&[Question]> {
        self.sets
            .iter()
            .find(|s| s.hero_name == hero_name)
            .map(|s| s.questions.as_slice())
    }

    pub fn get_question_count(&self) -> usize {
        self.question_count
    }
}
