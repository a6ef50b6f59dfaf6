use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use crate::gateway::{
    AuthError, IdentityGateway, LeaderboardEntry, Player, ScoreGateway, SubmissionError,
};

#[derive(Clone, Debug)]
struct Account {
    password: String,
    display_name: String,
    confirmed: bool,
}

/// Identity directory for offline play. Mirrors the hosted provider's flow,
/// confirmation step included, so the full auth surface can be exercised
/// without any cloud account.
#[derive(Default)]
pub struct MemoryIdentityGateway {
    accounts: RwLock<HashMap<String, Account>>,
    signed_in: RwLock<Option<Player>>,
}

#[async_trait]
impl IdentityGateway for MemoryIdentityGateway {
    async fn current_user(&self) -> Result<Option<Player>, AuthError> {
        Ok(self.signed_in.read().clone())
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Player, AuthError> {
        let player = {
            let accounts = self.accounts.read();
            let account = accounts
                .get(username)
                .ok_or_else(|| AuthError::Provider("unknown account".into()))?;
            if account.password != password {
                return Err(AuthError::Provider("incorrect password".into()));
            }
            if !account.confirmed {
                return Err(AuthError::NotConfirmed);
            }
            Player {
                id: username.to_string(),
                display_name: account.display_name.clone(),
            }
        };
        *self.signed_in.write() = Some(player.clone());
        Ok(player)
    }

    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(username) {
            return Err(AuthError::Provider("account already exists".into()));
        }
        accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                display_name: display_name.to_string(),
                confirmed: false,
            },
        );
        Ok(())
    }

    async fn confirm(&self, username: &str, _code: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| AuthError::Provider("unknown account".into()))?;
        account.confirmed = true;
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        *self.signed_in.write() = None;
        Ok(())
    }
}

pub struct MemoryScoreGateway {
    identity: Arc<dyn IdentityGateway>,
    rows: RwLock<Vec<LeaderboardEntry>>,
}

impl MemoryScoreGateway {
    pub fn new(identity: Arc<dyn IdentityGateway>) -> Self {
        MemoryScoreGateway {
            identity,
            rows: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScoreGateway for MemoryScoreGateway {
    async fn submit(&self, score: u32) -> Result<(), SubmissionError> {
        let player = self
            .identity
            .current_user()
            .await
            .map_err(|e| SubmissionError::Store(e.to_string()))?
            .ok_or(SubmissionError::NotSignedIn)?;
        self.rows.write().push(LeaderboardEntry {
            display_name: player.display_name,
            score,
        });
        Ok(())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, SubmissionError> {
        let mut rows = self.rows.read().clone();
        rows.sort_by_key(|entry| Reverse(entry.score));
        rows.truncate(limit);
        Ok(rows)
    }
}
