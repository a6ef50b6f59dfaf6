use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub max_wrong_answers: u32,
    pub feedback_delay: Duration,
    pub leaderboard_quiet_window: Duration,
    pub leaderboard_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_wrong_answers: 3,
            feedback_delay: Duration::from_millis(2000),
            leaderboard_quiet_window: Duration::from_millis(300),
            leaderboard_size: 10,
        }
    }
}
