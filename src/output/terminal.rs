use crate::output::{GameNotifier, Notice};

#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalNotifier;

impl GameNotifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::QuestionBegins(prompt) => {
                println!();
                println!("=== {} ===", prompt.hero.name);
                println!("({})", prompt.hero.image_url);
                println!("{}", prompt.question.text);
                for (index, option) in prompt.options.iter().enumerate() {
                    println!("  {}. {}", index + 1, option);
                }
                println!("Answer with the option number.");
            }
            Notice::AnswerCorrect { score } => {
                println!("Correct answer! Score: {}", score);
            }
            Notice::AnswerIncorrect { correct_answer } => {
                println!("Wrong answer. Correct answer was: {}", correct_answer);
            }
            Notice::PoolExhausted => {
                println!("Congratulations! You've answered all questions. Starting over.");
            }
            Notice::GameOver { score } => {
                println!("Game Over! Your final score is {}.", score);
            }
            Notice::ScoreSaved { score } => {
                println!("Score {} saved to the leaderboard.", score);
            }
            Notice::ScoreSaveFailed(reason) => {
                println!("Error saving score: {}. Please try again.", reason);
            }
            Notice::SignInToSaveScore { score } => {
                println!(
                    "Your score: {}. Login or create an account to save your score!",
                    score
                );
            }
            Notice::LeaderboardUpdated(entries) => {
                println!();
                println!("--- Leaderboard ---");
                if entries.is_empty() {
                    println!("No scores yet.");
                }
                for (rank, entry) in entries.iter().enumerate() {
                    println!("  {:>2}. {:<24} {}", rank + 1, entry.display_name, entry.score);
                }
            }
            Notice::LeaderboardUnavailable(reason) => {
                println!("Error loading leaderboard: {}. Please try again later.", reason);
            }
            Notice::SignUpAccepted { username } => {
                println!(
                    "Signup successful! Check your email for the confirmation code, then run: confirm {} <code>",
                    username
                );
            }
            Notice::AccountConfirmed => {
                println!("Account confirmed successfully! You can now log in.");
            }
            Notice::LoginSucceeded { display_name } => {
                println!("Login successful! Welcome, {}.", display_name);
            }
            Notice::LoggedOut => {
                println!("Logged out successfully!");
            }
            Notice::AuthFailed(reason) => {
                println!("{}", reason);
            }
        }
    }
}
