use clap::{Arg, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in verbosity order; the index is the numeric level.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name (any case) or its number, `0` (error) to `4` (trace).
fn parse_log_level(level: &str) -> Result<u8, String> {
    let level = level.trim();
    if let Ok(number) = level.parse::<u8>() {
        return if usize::from(number) < LEVELS.len() {
            Ok(number)
        } else {
            Err(format!("log level {number} out of range 0-4"))
        };
    }

    LEVELS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(level))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {level}"))
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_log_level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE or 0-4 (default: ERROR)")
            .env("AUTHGATE_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_numbers_map_to_levels() {
        assert_eq!(parse_log_level("error"), Ok(0));
        assert_eq!(parse_log_level("WARN"), Ok(1));
        assert_eq!(parse_log_level("Info"), Ok(2));
        assert_eq!(parse_log_level(" debug "), Ok(3));
        assert_eq!(parse_log_level("trace"), Ok(4));
        assert_eq!(parse_log_level("0"), Ok(0));
        assert_eq!(parse_log_level("4"), Ok(4));
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        assert!(parse_log_level("5").is_err());
        assert!(parse_log_level("255").is_err());
        assert!(parse_log_level("-1").is_err());
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn env_level_five_fails_parsing() {
        temp_env::with_vars([("AUTHGATE_LOG_LEVEL", Some("5"))], || {
            let command = with_args(Command::new("authgate"));
            assert!(command.try_get_matches_from(vec!["authgate"]).is_err());
        });
    }
}
