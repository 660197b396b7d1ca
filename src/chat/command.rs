use std::str::FromStr;

use crate::models::{Counter, Flag, Prayer};
use crate::utils::input::{parse_amount, InputError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Today,
    Stats,
    Goals,
    ResetToday,
    Wipe,
    Remaining,
    Cancel,
    Help,
    Mosque(Prayer),
    Toggle(Flag),
    /// Without an amount the bot asks for one.
    Add(Counter, Option<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    MissingArgument(&'static str),
    BadArgument(String),
    BadAmount(InputError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Unknown(cmd) => write!(f, "Unknown command /{}. Try /help", cmd),
            ParseError::MissingArgument(usage) => write!(f, "Usage: {}", usage),
            ParseError::BadArgument(msg) => write!(f, "{}", msg),
            ParseError::BadAmount(e) => write!(f, "{}", e),
        }
    }
}

/// `None` when the text is not a slash command.
pub fn parse(text: &str) -> Option<Result<ChatCommand, ParseError>> {
    let body = text.trim().strip_prefix('/')?;
    let mut parts = body.split_whitespace();
    let name = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next();
    let extra = parts.next();

    let cmd = match name.as_str() {
        "start" => Ok(ChatCommand::Start),
        "today" | "report" => Ok(ChatCommand::Today),
        "stats" => Ok(ChatCommand::Stats),
        "goals" => Ok(ChatCommand::Goals),
        "reset_today" => Ok(ChatCommand::ResetToday),
        "wipe" => Ok(ChatCommand::Wipe),
        "remaining" => Ok(ChatCommand::Remaining),
        "cancel" => Ok(ChatCommand::Cancel),
        "help" => Ok(ChatCommand::Help),
        "mosque" => parse_arg::<Prayer>(arg, "/mosque <fajr|dhuhr|asr|maghrib|isha>")
            .map(ChatCommand::Mosque),
        "toggle" => parse_arg::<Flag>(
            arg,
            "/toggle <taraweeh|tahajjud|morning|evening|duha>",
        )
        .map(ChatCommand::Toggle),
        "add" => parse_arg::<Counter>(arg, "/add <quran|istighfar|dhikr|charity|dua> [amount]")
            .and_then(|counter| {
                let amount = extra
                    .map(parse_amount)
                    .transpose()
                    .map_err(ParseError::BadAmount)?;
                Ok(ChatCommand::Add(counter, amount))
            }),
        other => Err(ParseError::Unknown(other.to_string())),
    };
    Some(cmd)
}

fn parse_arg<T>(arg: Option<&str>, usage: &'static str) -> Result<T, ParseError>
where
    T: FromStr<Err = anyhow::Error>,
{
    let arg = arg.ok_or(ParseError::MissingArgument(usage))?;
    arg.parse::<T>()
        .map_err(|e| ParseError::BadArgument(e.to_string()))
}

pub const HELP: &str = "\
/today — today's checklist
/mosque <prayer> — toggle mosque attendance
/toggle <habit> — toggle taraweeh, tahajjud, morning, evening, duha
/add <metric> [amount] — add quran pages, istighfar, dhikr, charity, dua
/remaining — what is left for today
/stats — statistics
/goals — set your goals again
/reset_today — clear today's marks
/wipe — delete all your data
/cancel — stop the current question";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(parse("20").is_none());
        assert!(parse("hello /today").is_none());
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse("/start"), Some(Ok(ChatCommand::Start)));
        assert_eq!(parse(" /report "), Some(Ok(ChatCommand::Today)));
        assert_eq!(parse("/RESET_TODAY"), Some(Ok(ChatCommand::ResetToday)));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            parse("/mosque zuhr"),
            Some(Ok(ChatCommand::Mosque(Prayer::Dhuhr)))
        );
        assert_eq!(
            parse("/toggle duha"),
            Some(Ok(ChatCommand::Toggle(Flag::Duha)))
        );
        assert_eq!(
            parse("/add quran 4"),
            Some(Ok(ChatCommand::Add(Counter::QuranPages, Some(4))))
        );
        assert_eq!(
            parse("/add dhikr"),
            Some(Ok(ChatCommand::Add(Counter::Dhikr, None)))
        );
    }

    #[test]
    fn reports_bad_arguments() {
        assert!(matches!(
            parse("/mosque"),
            Some(Err(ParseError::MissingArgument(_)))
        ));
        assert!(matches!(
            parse("/toggle nap"),
            Some(Err(ParseError::BadArgument(_)))
        ));
        assert_eq!(
            parse("/add dua -2"),
            Some(Err(ParseError::BadAmount(InputError::Negative)))
        );
        assert_eq!(
            parse("/dance"),
            Some(Err(ParseError::Unknown("dance".into())))
        );
    }
}
