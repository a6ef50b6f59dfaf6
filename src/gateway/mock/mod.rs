use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::gateway::{
    AuthError, IdentityGateway, LeaderboardEntry, Player, ScoreGateway, SubmissionError,
};

#[derive(Clone, Default)]
pub struct MockIdentityGateway {
    user: Arc<RwLock<Option<Player>>>,
    fail_lookups: Arc<RwLock<bool>>,
}

impl MockIdentityGateway {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn sign_in(&self, player: Player) {
        *self.user.write() = Some(player);
    }

    pub fn sign_out(&self) {
        *self.user.write() = None;
    }

    pub fn fail_lookups(&self) {
        *self.fail_lookups.write() = true;
    }
}

#[async_trait]
impl IdentityGateway for MockIdentityGateway {
    async fn current_user(&self) -> Result<Option<Player>, AuthError> {
        if *self.fail_lookups.read() {
            return Err(AuthError::Provider("mock lookup failure".into()));
        }
        Ok(self.user.read().clone())
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn login(&self, username: &str, _password: &str) -> Result<Player, AuthError> {
        let player = Player {
            id: username.to_string(),
            display_name: username.to_string(),
        };
        self.sign_in(player.clone());
        Ok(player)
    }

    async fn sign_up(
        &self,
        _username: &str,
        _password: &str,
        _display_name: &str,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn confirm(&self, _username: &str, _code: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.sign_out();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockScoreGateway {
    submitted: Arc<RwLock<Vec<u32>>>,
    entries: Arc<RwLock<Vec<LeaderboardEntry>>>,
    fail_submissions: Arc<RwLock<bool>>,
    fail_fetches: Arc<RwLock<bool>>,
    fetch_count: Arc<RwLock<u32>>,
}

impl MockScoreGateway {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn submitted(&self) -> Vec<u32> {
        self.submitted.read().clone()
    }

    pub fn set_entries(&self, entries: Vec<LeaderboardEntry>) {
        *self.entries.write() = entries;
    }

    pub fn fail_submissions(&self) {
        *self.fail_submissions.write() = true;
    }

    pub fn fail_fetches(&self) {
        *self.fail_fetches.write() = true;
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetch_count.read()
    }
}

#[async_trait]
impl ScoreGateway for MockScoreGateway {
    async fn submit(&self, score: u32) -> Result<(), SubmissionError> {
        if *self.fail_submissions.read() {
            return Err(SubmissionError::Store("mock submission failure".into()));
        }
        self.submitted.write().push(score);
        Ok(())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, SubmissionError> {
        if *self.fail_fetches.read() {
            return Err(SubmissionError::Store("mock fetch failure".into()));
        }
        *self.fetch_count.write() += 1;
        let mut entries = self.entries.read().clone();
        entries.truncate(limit);
        Ok(entries)
    }
}
