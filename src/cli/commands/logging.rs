use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in verbosity order; the index is the `-v` count.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name (any case) or its index, e.g. `info` or `2`.
fn parse_log_level(level: &str) -> Result<u8, String> {
    let level = level.trim();

    let index = match level.parse::<usize>() {
        Ok(index) if index < LEVELS.len() => Some(index),
        Ok(_) => None,
        Err(_) => LEVELS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(level)),
    };

    index
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level {level:?}, expected one of {LEVELS:?} or 0-4"))
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
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("REGISTRAR_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
