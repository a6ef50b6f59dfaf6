use anyhow::{anyhow, Result};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::bank::{Hero, Question, QuestionBank};
use crate::game::settings::Settings;
use crate::gateway::{IdentityGateway, ScoreGateway};
use crate::output::{GameNotifier, Notice};

#[cfg(test)]
mod tests;

#[derive(Clone, Debug, PartialEq)]
pub struct Prompt {
    pub hero: Hero,
    pub question: Question,
    pub options: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnswerResult {
    Correct,
    Incorrect,
}

#[derive(Debug, Default)]
struct Round {
    score: u32,
    wrong_answers: u32,
    asked: HashSet<String>,
    prompt: Option<Prompt>,
    feedback_elapsed: Option<Duration>,
}

enum Phase {
    Idle,
    InProgress(Round),
    Finished { score: u32 },
}

pub struct Session<N> {
    bank: Arc<QuestionBank>,
    identity: Arc<dyn IdentityGateway>,
    scores: Arc<dyn ScoreGateway>,
    notifier: N,
    settings: Settings,
    phase: Phase,
    pending_score: Option<u32>,
}

impl<N: GameNotifier> Session<N> {
    pub fn new(
        bank: Arc<QuestionBank>,
        identity: Arc<dyn IdentityGateway>,
        scores: Arc<dyn ScoreGateway>,
        notifier: N,
        settings: Settings,
    ) -> Session<N> {
        Session {
            bank,
            identity,
            scores,
            notifier,
            settings,
            phase: Phase::Idle,
            pending_score: None,
        }
    }

    /// Valid from any phase. Discards the previous play-through, keeps any
    /// pending score.
    pub async fn start(&mut self) {
        debug!("starting a new session");
        self.phase = Phase::InProgress(Round::default());
        self.advance().await;
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.phase, Phase::InProgress(_))
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    pub fn get_score(&self) -> u32 {
        match &self.phase {
            Phase::Idle => 0,
            Phase::InProgress(round) => round.score,
            Phase::Finished { score } => *score,
        }
    }

    pub fn get_wrong_answers(&self) -> u32 {
        match &self.phase {
            Phase::InProgress(round) => round.wrong_answers,
            _ => 0,
        }
    }

    pub fn get_current_prompt(&self) -> Option<&Prompt> {
        match &self.phase {
            Phase::InProgress(round) => round.prompt.as_ref(),
            _ => None,
        }
    }

    pub fn get_pending_score(&self) -> Option<u32> {
        self.pending_score
    }

    /// Grades the answer against the current question and schedules the next
    /// one. The next question is presented only after the feedback delay has
    /// elapsed through `tick`.
    pub fn submit_answer(&mut self, choice: &str) -> Result<AnswerResult> {
        let Phase::InProgress(round) = &mut self.phase else {
            return Err(anyhow!("there is no game in progress"));
        };
        if round.feedback_elapsed.is_some() {
            return Err(anyhow!("answer already graded, waiting for the next question"));
        }
        let Some(prompt) = &round.prompt else {
            return Err(anyhow!("there is no active question"));
        };

        let correct_answer = prompt.question.correct_answer.clone();
        let result = if choice == correct_answer {
            round.score += 1;
            AnswerResult::Correct
        } else {
            round.wrong_answers += 1;
            AnswerResult::Incorrect
        };
        round.feedback_elapsed = Some(Duration::default());

        let notice = match result {
            AnswerResult::Correct => Notice::AnswerCorrect { score: round.score },
            AnswerResult::Incorrect => Notice::AnswerIncorrect { correct_answer },
        };
        self.notifier.notify(notice);
        Ok(result)
    }

    /// Advances time. The embedding event loop owns the clock; the session
    /// never sleeps on its own.
    pub async fn tick(&mut self, dt: Duration) {
        let advance_due = match &mut self.phase {
            Phase::InProgress(round) => match round.feedback_elapsed.as_mut() {
                Some(elapsed) => {
                    *elapsed += dt;
                    *elapsed >= self.settings.feedback_delay
                }
                None => false,
            },
            _ => false,
        };
        if advance_due {
            if let Phase::InProgress(round) = &mut self.phase {
                round.feedback_elapsed = None;
            }
            self.advance().await;
        }
    }

    /// Flushes a score held from a session finished while signed out. One
    /// attempt only; the pending score is cleared whether or not it lands.
    pub async fn flush_pending_score(&mut self) {
        if let Some(score) = self.pending_score.take() {
            self.submit_score(score).await;
        }
    }

    async fn advance(&mut self) {
        let ended = match &self.phase {
            Phase::InProgress(round) if round.wrong_answers >= self.settings.max_wrong_answers => {
                Some(round.score)
            }
            Phase::InProgress(_) => None,
            _ => return,
        };
        if let Some(score) = ended {
            self.finish(score).await;
            return;
        }

        match self.next_prompt() {
            Some(prompt) => {
                if let Phase::InProgress(round) = &mut self.phase {
                    round.prompt = Some(prompt.clone());
                }
                self.notifier.notify(Notice::QuestionBegins(prompt));
            }
            None => {
                // The bank guarantees at least one question, so this only
                // happens if selection has nothing left to offer.
                let score = self.get_score();
                self.finish(score).await;
            }
        }
    }

    fn next_prompt(&mut self) -> Option<Prompt> {
        let bank = Arc::clone(&self.bank);
        let Phase::InProgress(round) = &mut self.phase else {
            return None;
        };

        if round.asked.len() == bank.get_question_count() {
            self.notifier.notify(Notice::PoolExhausted);
            round.asked.clear();
        }

        let mut rng = rand::thread_rng();

        // Uniform pick among heroes that still have an unasked question, so a
        // hero with a spent pool can never stall the selection.
        let candidates: Vec<&Hero> = bank
            .get_heroes()
            .iter()
            .filter(|hero| {
                bank.get_questions(&hero.name)
                    .map_or(false, |qs| qs.iter().any(|q| !round.asked.contains(&q.text)))
            })
            .collect();
        let hero = (*candidates.choose(&mut rng)?).clone();

        let available: Vec<&Question> = bank
            .get_questions(&hero.name)?
            .iter()
            .filter(|q| !round.asked.contains(&q.text))
            .collect();
        let question = (*available.choose(&mut rng)?).clone();
        round.asked.insert(question.text.clone());

        let mut options = question.options.clone();
        options.shuffle(&mut rng);

        Some(Prompt {
            hero,
            question,
            options,
        })
    }

    async fn finish(&mut self, score: u32) {
        self.phase = Phase::Finished { score };
        self.notifier.notify(Notice::GameOver { score });
        if score == 0 {
            return;
        }

        let user = match self.identity.current_user().await {
            Ok(user) => user,
            Err(err) => {
                warn!(%err, "identity lookup failed, treating player as signed out");
                None
            }
        };
        match user {
            Some(_) => self.submit_score(score).await,
            None => {
                self.pending_score = Some(score);
                self.notifier.notify(Notice::SignInToSaveScore { score });
            }
        }
    }

    async fn submit_score(&mut self, score: u32) {
        match self.scores.submit(score).await {
            Ok(()) => self.notifier.notify(Notice::ScoreSaved { score }),
            Err(err) => {
                warn!(%err, "score submission failed");
                self.notifier.notify(Notice::ScoreSaveFailed(err.to_string()));
            }
        }
    }
}
