use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::game::Settings;
use crate::gateway::ScoreGateway;
use crate::output::{GameNotifier, Notice};


/// Collapses a burst of requests into one: only the most recent request
/// fires, and only once its quiet window has elapsed.
#[derive(Debug)]
pub struct Debounce {
    quiet_window: Duration,
    elapsed: Duration,
    armed: bool,
}

impl Debounce {
    pub fn new(quiet_window: Duration) -> Self {
        Debounce {
            quiet_window,
            elapsed: Duration::default(),
            armed: false,
        }
    }

    pub fn request(&mut self) {
        self.armed = true;
        self.elapsed = Duration::default();
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.quiet_window {
            self.armed = false;
            return true;
        }
        false
    }
}

pub struct Leaderboard<N> {
    scores: Arc<dyn ScoreGateway>,
    notifier: N,
    debounce: Debounce,
    size: usize,
}

impl<N: GameNotifier> Leaderboard<N> {
    pub fn new(scores: Arc<dyn ScoreGateway>, notifier: N, settings: &Settings) -> Leaderboard<N> {
        Leaderboard {
            scores,
            notifier,
            debounce: Debounce::new(settings.leaderboard_quiet_window),
            size: settings.leaderboard_size,
        }
    }

    pub fn request_refresh(&mut self) {
        self.debounce.request();
    }

    pub async fn tick(&mut self, dt: Duration) {
        if self.debounce.tick(dt) {
            self.refresh().await;
        }
    }

    pub async fn refresh(&mut self) {
        match self.scores.top_scores(self.size).await {
            Ok(entries) => self.notifier.notify(Notice::LeaderboardUpdated(entries)),
            Err(err) => {
                warn!(%err, "leaderboard refresh failed");
                self.notifier
                    .notify(Notice::LeaderboardUnavailable(err.to_string()));
            }
        }
    }
}
