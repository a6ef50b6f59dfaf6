use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

mod bank;
mod game;
mod gateway;
mod leaderboard;
mod output;

use crate::bank::QuestionBank;
use crate::game::{Session, Settings};
use crate::gateway::cognito::CognitoIdentityGateway;
use crate::gateway::dynamo::DynamoScoreGateway;
use crate::gateway::memory::{MemoryIdentityGateway, MemoryScoreGateway};
use crate::gateway::{AuthError, IdentityGateway, ScoreGateway};
use crate::leaderboard::Leaderboard;
use crate::output::terminal::TerminalNotifier;
use crate::output::{GameNotifier, Notice};

const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(version, about = "AWS Heroes trivia, in the terminal")]
struct Args {
    /// JSON document listing the heroes
    #[arg(long, default_value = "data/aws_heroes.json")]
    heroes: PathBuf,

    /// JSON document with each hero's trivia questions
    #[arg(long, default_value = "data/aws_heroes_questions.json")]
    questions: PathBuf,

    /// Play against in-memory gateways instead of AWS
    #[arg(long)]
    offline: bool,

    /// DynamoDB table holding submitted scores
    #[arg(long, env = "TRIVIA_SCORES_TABLE", default_value = "aws-heroes-games")]
    scores_table: String,

    /// Global secondary index of the scores table, sorted by score
    #[arg(long, env = "TRIVIA_SCORES_INDEX", default_value = "score-index")]
    scores_index: String,

    /// Cognito user pool app client id
    #[arg(long, env = "TRIVIA_USER_POOL_CLIENT", default_value = "")]
    user_pool_client: String,

    /// Answer feedback delay in milliseconds
    #[arg(long, default_value_t = 2000)]
    feedback_delay_ms: u64,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let bank = Arc::new(
        QuestionBank::load(&args.heroes, &args.questions)
            .context("cannot start a game without its question bank")?,
    );

    let (identity, scores): (Arc<dyn IdentityGateway>, Arc<dyn ScoreGateway>) = if args.offline {
        let identity: Arc<dyn IdentityGateway> = Arc::new(MemoryIdentityGateway::default());
        (
            Arc::clone(&identity),
            Arc::new(MemoryScoreGateway::new(Arc::clone(&identity))),
        )
    } else {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let identity: Arc<dyn IdentityGateway> = Arc::new(CognitoIdentityGateway::new(
            &config,
            args.user_pool_client.clone(),
        ));
        let scores = Arc::new(DynamoScoreGateway::new(
            &config,
            args.scores_table.clone(),
            args.scores_index.clone(),
            Arc::clone(&identity),
        ));
        (identity, scores)
    };

    let settings = Settings {
        feedback_delay: Duration::from_millis(args.feedback_delay_ms),
        ..Settings::default()
    };
    let notifier = TerminalNotifier;
    let mut session = Session::new(
        bank,
        Arc::clone(&identity),
        Arc::clone(&scores),
        notifier,
        settings.clone(),
    );
    let mut leaderboard = Leaderboard::new(scores, notifier, &settings);

    println!("Welcome to AWS Heroes Trivia!");
    print_help();
    leaderboard.refresh().await;

    run(&mut session, &mut leaderboard, &identity, &notifier).await
}

async fn run(
    session: &mut Session<TerminalNotifier>,
    leaderboard: &mut Leaderboard<TerminalNotifier>,
    identity: &Arc<dyn IdentityGateway>,
    notifier: &TerminalNotifier,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut clock = tokio::time::interval(TICK);
    let mut was_over = session.is_over();

    loop {
        tokio::select! {
            _ = clock.tick() => {
                session.tick(TICK).await;
                leaderboard.tick(TICK).await;
                // A game that just ended may have put a new score on the board.
                let over = session.is_over();
                if over && !was_over {
                    leaderboard.request_refresh();
                }
                was_over = over;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(line.trim(), session, leaderboard, identity, notifier).await {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn handle_command(
    line: &str,
    session: &mut Session<TerminalNotifier>,
    leaderboard: &mut Leaderboard<TerminalNotifier>,
    identity: &Arc<dyn IdentityGateway>,
    notifier: &TerminalNotifier,
) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["play"] | ["start"] => session.start().await,
        ["board"] | ["leaderboard"] => leaderboard.request_refresh(),
        ["status"] => {
            if session.is_in_progress() {
                println!(
                    "In progress. Score: {}, wrong answers: {}.",
                    session.get_score(),
                    session.get_wrong_answers()
                );
            } else if session.is_over() {
                println!("Game over. Final score: {}.", session.get_score());
            } else {
                println!("No game started yet.");
            }
            if let Some(score) = session.get_pending_score() {
                println!("Pending score waiting for login: {}.", score);
            }
        }
        ["login", username, password] => match identity.login(username, password).await {
            Ok(player) => {
                notifier.notify(Notice::LoginSucceeded {
                    display_name: player.display_name,
                });
                session.flush_pending_score().await;
                leaderboard.request_refresh();
            }
            Err(AuthError::NotConfirmed) => notifier.notify(Notice::AuthFailed(format!(
                "Please confirm your account first: confirm {} <code>",
                username
            ))),
            Err(err) => notifier.notify(Notice::AuthFailed(err.to_string())),
        },
        ["signup", username, password, display_name] => {
            match identity.sign_up(username, password, display_name).await {
                Ok(()) => notifier.notify(Notice::SignUpAccepted {
                    username: username.to_string(),
                }),
                Err(err) => notifier.notify(Notice::AuthFailed(err.to_string())),
            }
        }
        ["confirm", username, code] => match identity.confirm(username, code).await {
            Ok(()) => notifier.notify(Notice::AccountConfirmed),
            Err(err) => notifier.notify(Notice::AuthFailed(err.to_string())),
        },
        ["logout"] => match identity.logout().await {
            Ok(()) => {
                notifier.notify(Notice::LoggedOut);
                leaderboard.request_refresh();
            }
            Err(err) => notifier.notify(Notice::AuthFailed(err.to_string())),
        },
        ["help"] => print_help(),
        ["quit"] | ["exit"] => return false,
        [choice] if choice.chars().all(|c| c.is_ascii_digit()) => {
            answer(session, choice);
        }
        _ => println!("Unknown command. Type 'help' for the list of commands."),
    }
    true
}

fn answer(session: &mut Session<TerminalNotifier>, choice: &str) {
    let Some(prompt) = session.get_current_prompt() else {
        println!("There is no question to answer right now.");
        return;
    };
    let option = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| prompt.options.get(index).cloned());
    let Some(option) = option else {
        println!("Pick an option between 1 and {}.", prompt.options.len());
        return;
    };
    if let Err(err) = session.submit_answer(&option) {
        // Late and duplicate answers are dropped.
        debug!(%err, "answer ignored");
    }
}

fn print_help() {
    println!("Commands:");
    println!("  play                                 start a new game");
    println!("  1..9                                 answer the current question");
    println!("  board                                refresh the leaderboard");
    println!("  status                               show the current game state");
    println!("  signup <email> <password> <name>     create an account");
    println!("  confirm <email> <code>               confirm a new account");
    println!("  login <email> <password>             sign in (saves any pending score)");
    println!("  logout                               sign out");
    println!("  quit                                 leave the game");
}
