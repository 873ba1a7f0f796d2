use clap::{builder::ValueParser, Arg, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("SEGRETI_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_level(value: &str) -> Result<Option<u8>, clap::Error> {
        Command::new("test")
            .arg(
                Arg::new("level")
                    .long("level")
                    .value_parser(validator_log_level()),
            )
            .try_get_matches_from(vec!["test", "--level", value])
            .map(|matches| matches.get_one::<u8>("level").copied())
    }

    #[test]
    fn numeric_levels_accepted() -> Result<(), clap::Error> {
        for level in 0..=5u8 {
            assert_eq!(parse_level(&level.to_string())?, Some(level));
        }
        Ok(())
    }

    #[test]
    fn named_levels_accepted() -> Result<(), clap::Error> {
        let levels = [("error", 0), ("warn", 1), ("INFO", 2), ("debug", 3), ("trace", 4)];
        for (level, expected) in levels {
            assert_eq!(parse_level(level)?, Some(expected));
        }
        Ok(())
    }

    #[test]
    fn invalid_levels_rejected() {
        for level in ["6", "verbose", ""] {
            assert!(parse_level(level).is_err(), "level {level} should be rejected");
        }
    }
}
