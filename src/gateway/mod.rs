use async_trait::async_trait;
use thiserror::Error;

pub mod cognito;
pub mod dynamo;
pub mod memory;

#[cfg(test)]
pub mod mock;


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub id: String,
    pub display_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub score: u32,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("account is not confirmed yet")]
    NotConfirmed,
    #[error("identity provider error: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("cannot save a score without a signed-in player")]
    NotSignedIn,
    #[error("score store error: {0}")]
    Store(String),
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Returns the signed-in player, or None when nobody is signed in or the
    /// stored session is no longer valid.
    async fn current_user(&self) -> Result<Option<Player>, AuthError>;

    /// Renews short-lived credentials. A no-op success when no session exists.
    async fn refresh(&self) -> Result<(), AuthError>;

    async fn login(&self, username: &str, password: &str) -> Result<Player, AuthError>;

    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError>;

    async fn confirm(&self, username: &str, code: &str) -> Result<(), AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;
}

#[async_trait]
pub trait ScoreGateway: Send + Sync {
    async fn submit(&self, score: u32) -> Result<(), SubmissionError>;

    /// Top entries, highest score first, at most `limit` of them.
    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, SubmissionError>;
}
