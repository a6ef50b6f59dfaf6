pub mod session;
mod settings;

pub use self::session::{AnswerResult, Prompt, Session};
pub use self::settings::Settings;
