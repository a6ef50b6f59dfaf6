use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::bank::QuestionBank;
use crate::game::settings::Settings;
use crate::gateway::mock::{MockIdentityGateway, MockScoreGateway};
use crate::gateway::Player;
use crate::output::mock::MockNotifier;

const HEROES_JSON: &str = r#"[
    {"name": "Hero One", "image_url": "https://example.com/one.png"},
    {"name": "Hero Two", "image_url": "https://example.com/two.png"}
]"#;

const QUESTIONS_JSON: &str = r#"{
    "trivia_questions": [
        {
            "hero_name": "Hero One",
            "questions": [
                {"question": "Q1", "options": ["a", "b", "c"], "correct_answer": "a"},
                {"question": "Q2", "options": ["a", "b"], "correct_answer": "b"}
            ]
        },
        {
            "hero_name": "Hero Two",
            "questions": [
                {"question": "Q3", "options": ["x", "y"], "correct_answer": "y"},
                {"question": "Q4", "options": ["x", "y", "z"], "correct_answer": "z"}
            ]
        }
    ]
}"#;

struct ContextBuilder {
    settings: Settings,
    signed_in: Option<Player>,
}

impl ContextBuilder {
    fn new() -> Self {
        ContextBuilder {
            settings: Settings::default(),
            signed_in: None,
        }
    }

    fn signed_in_as(mut self, name: &str) -> Self {
        self.signed_in = Some(Player {
            id: name.to_string(),
            display_name: name.to_string(),
        });
        self
    }

    fn feedback_delay(mut self, delay: Duration) -> Self {
        self.settings.feedback_delay = delay;
        self
    }

    fn build(self) -> Context {
        let bank = Arc::new(QuestionBank::from_json(HEROES_JSON, QUESTIONS_JSON).unwrap());
        let identity = MockIdentityGateway::new();
        if let Some(player) = self.signed_in {
            identity.sign_in(player);
        }
        let scores = MockScoreGateway::new();
        let notifier = MockNotifier::new();
        let session = Session::new(
            Arc::clone(&bank),
            Arc::new(identity.clone()),
            Arc::new(scores.clone()),
            notifier.clone(),
            self.settings,
        );
        Context {
            session,
            bank,
            identity,
            scores,
            notifier,
        }
    }
}

struct Context {
    session: Session<MockNotifier>,
    bank: Arc<QuestionBank>,
    identity: MockIdentityGateway,
    scores: MockScoreGateway,
    notifier: MockNotifier,
}

impl Context {
    fn correct_answer(&self) -> String {
        self.session
            .get_current_prompt()
            .expect("no active question")
            .question
            .correct_answer
            .clone()
    }

    fn wrong_answer(&self) -> String {
        let prompt = self.session.get_current_prompt().expect("no active question");
        prompt
            .options
            .iter()
            .find(|o| **o != prompt.question.correct_answer)
            .expect("question has no wrong option")
            .clone()
    }

    async fn answer_and_wait(&mut self, choice: &str) {
        self.session.submit_answer(choice).unwrap();
        self.session
            .tick(self.session.settings.feedback_delay)
            .await;
    }
}

#[tokio::test]
async fn start_presents_a_question_with_fresh_state() {
    let mut ctx = ContextBuilder::new().build();
    assert!(!ctx.session.is_in_progress());
    ctx.session.start().await;
    assert!(ctx.session.is_in_progress());
    assert_eq!(ctx.session.get_score(), 0);
    assert_eq!(ctx.session.get_wrong_answers(), 0);

    let prompt = ctx.session.get_current_prompt().unwrap();
    assert!(prompt.options.contains(&prompt.question.correct_answer));
    assert!(matches!(
        ctx.notifier.flush().as_slice(),
        [Notice::QuestionBegins(_)]
    ));
}

#[tokio::test]
async fn presented_options_are_the_question_options() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let prompt = ctx.session.get_current_prompt().unwrap();
    let mut shuffled = prompt.options.clone();
    let mut original = prompt.question.options.clone();
    shuffled.sort();
    original.sort();
    assert_eq!(shuffled, original);
}

#[tokio::test]
async fn correct_answer_increments_score() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    assert_eq!(
        ctx.session.submit_answer(&answer).unwrap(),
        AnswerResult::Correct
    );
    assert_eq!(ctx.session.get_score(), 1);
    assert_eq!(ctx.session.get_wrong_answers(), 0);
    assert!(ctx.session.is_in_progress());
    assert!(ctx.notifier.contains(&Notice::AnswerCorrect { score: 1 }));
}

#[tokio::test]
async fn incorrect_answer_reveals_the_expected_one() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let expected = ctx.correct_answer();
    let wrong = ctx.wrong_answer();
    assert_eq!(
        ctx.session.submit_answer(&wrong).unwrap(),
        AnswerResult::Incorrect
    );
    assert_eq!(ctx.session.get_score(), 0);
    assert_eq!(ctx.session.get_wrong_answers(), 1);
    assert!(ctx.notifier.contains(&Notice::AnswerIncorrect {
        correct_answer: expected,
    }));
}

#[tokio::test]
async fn next_question_waits_for_the_feedback_delay() {
    let mut ctx = ContextBuilder::new()
        .feedback_delay(Duration::from_millis(2000))
        .build();
    ctx.session.start().await;
    let first = ctx.session.get_current_prompt().unwrap().question.clone();
    let answer = ctx.correct_answer();
    ctx.session.submit_answer(&answer).unwrap();

    ctx.session.tick(Duration::from_millis(1000)).await;
    assert_eq!(
        ctx.session.get_current_prompt().unwrap().question,
        first,
        "question changed before the delay elapsed"
    );
    ctx.session.tick(Duration::from_millis(1000)).await;
    assert_ne!(ctx.session.get_current_prompt().unwrap().question, first);
}

#[tokio::test]
async fn answers_during_feedback_are_rejected() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    ctx.session.submit_answer(&answer).unwrap();
    assert!(ctx.session.submit_answer(&answer).is_err());
    assert_eq!(ctx.session.get_score(), 1);
}

#[tokio::test]
async fn three_wrong_answers_end_the_game() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    for _ in 0..3 {
        assert!(ctx.session.is_in_progress());
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert_eq!(ctx.session.get_score(), 0);
    assert!(ctx.notifier.contains(&Notice::GameOver { score: 0 }));
}

#[tokio::test]
async fn answers_after_the_game_ended_are_ignored() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert!(ctx.session.submit_answer("anything").is_err());
    assert_eq!(ctx.session.get_score(), 0);
    assert!(ctx.session.is_over());
}

#[tokio::test]
async fn questions_do_not_repeat_before_the_pool_is_exhausted() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let total = ctx.bank.get_question_count();

    let mut seen = Vec::new();
    for _ in 0..total {
        let text = ctx.session.get_current_prompt().unwrap().question.text.clone();
        assert!(!seen.contains(&text), "question '{}' repeated", text);
        seen.push(text);
        let answer = ctx.correct_answer();
        ctx.answer_and_wait(&answer).await;
    }
    assert_eq!(seen.len(), total);
}

#[tokio::test]
async fn exhausting_the_pool_signals_once_and_recycles() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let total = ctx.bank.get_question_count();

    for _ in 0..total {
        assert!(!ctx.notifier.contains(&Notice::PoolExhausted));
        let answer = ctx.correct_answer();
        ctx.answer_and_wait(&answer).await;
    }
    // The answer to question N schedules question N+1, which only exists
    // because the pool was cleared.
    let notices = ctx.notifier.flush();
    let exhausted = notices
        .iter()
        .filter(|n| **n == Notice::PoolExhausted)
        .count();
    assert_eq!(exhausted, 1);
    assert!(ctx.session.get_current_prompt().is_some());
    assert_eq!(ctx.session.get_score(), total as u32);
}

#[tokio::test]
async fn finished_game_submits_the_score_when_signed_in() {
    let mut ctx = ContextBuilder::new().signed_in_as("ada").build();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    ctx.answer_and_wait(&answer).await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert_eq!(ctx.scores.submitted(), vec![1]);
    assert_eq!(ctx.session.get_pending_score(), None);
    assert!(ctx.notifier.contains(&Notice::ScoreSaved { score: 1 }));
}

#[tokio::test]
async fn zero_score_is_never_submitted() {
    let mut ctx = ContextBuilder::new().signed_in_as("ada").build();
    ctx.session.start().await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert!(ctx.scores.submitted().is_empty());
    assert_eq!(ctx.session.get_pending_score(), None);
}

#[tokio::test]
async fn unauthenticated_finish_holds_the_score_for_later() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    ctx.answer_and_wait(&answer).await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert!(ctx.scores.submitted().is_empty());
    assert_eq!(ctx.session.get_pending_score(), Some(1));
    assert!(ctx.notifier.contains(&Notice::SignInToSaveScore { score: 1 }));

    // Signing in later flushes the held score exactly once.
    ctx.identity.sign_in(Player {
        id: "ada".into(),
        display_name: "Ada".into(),
    });
    ctx.session.flush_pending_score().await;
    assert_eq!(ctx.scores.submitted(), vec![1]);
    assert_eq!(ctx.session.get_pending_score(), None);

    ctx.session.flush_pending_score().await;
    assert_eq!(ctx.scores.submitted(), vec![1]);
}

#[tokio::test]
async fn flushing_without_a_pending_score_is_a_noop() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.flush_pending_score().await;
    assert!(ctx.scores.submitted().is_empty());
    assert!(ctx.notifier.flush().is_empty());
}

#[tokio::test]
async fn identity_lookup_failure_degrades_to_signed_out() {
    let mut ctx = ContextBuilder::new().build();
    ctx.identity.fail_lookups();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    ctx.answer_and_wait(&answer).await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert!(ctx.scores.submitted().is_empty());
    assert_eq!(ctx.session.get_pending_score(), Some(1));
}

#[tokio::test]
async fn failed_submission_is_reported_and_not_retried() {
    let mut ctx = ContextBuilder::new().signed_in_as("ada").build();
    ctx.scores.fail_submissions();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    ctx.answer_and_wait(&answer).await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert!(ctx.session.is_over());
    assert!(ctx.scores.submitted().is_empty());
    assert_eq!(ctx.session.get_pending_score(), None);
    let reported = ctx
        .notifier
        .flush()
        .iter()
        .any(|n| matches!(n, Notice::ScoreSaveFailed(_)));
    assert!(reported);
}

#[tokio::test]
async fn restart_resets_play_state_but_keeps_the_pending_score() {
    let mut ctx = ContextBuilder::new().build();
    ctx.session.start().await;
    let answer = ctx.correct_answer();
    ctx.answer_and_wait(&answer).await;
    for _ in 0..3 {
        let wrong = ctx.wrong_answer();
        ctx.answer_and_wait(&wrong).await;
    }
    assert_eq!(ctx.session.get_pending_score(), Some(1));

    ctx.session.start().await;
    assert!(ctx.session.is_in_progress());
    assert_eq!(ctx.session.get_score(), 0);
    assert_eq!(ctx.session.get_wrong_answers(), 0);
    assert_eq!(ctx.session.get_pending_score(), Some(1));
}
