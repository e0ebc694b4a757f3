use anyhow::Error;
use ims_client::ApiError;
use ims_config::ConfigError;
use ims_core::time::TimeParseError;
use ims_core::{CoreError, FilterParseError};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(api_err) = cause.downcast_ref::<ApiError>() {
            return ExitCode::from(api_exit_code(api_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(match core_err {
                CoreError::NotLoaded(_) | CoreError::UnknownSite(_) => EXIT_NOT_FOUND,
                _ => EXIT_INVALID_INPUT,
            });
        }
        if cause.downcast_ref::<FilterParseError>().is_some()
            || cause.downcast_ref::<TimeParseError>().is_some()
        {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn api_exit_code(err: &ApiError) -> u8 {
    match err {
        ApiError::NotFound(_) => EXIT_NOT_FOUND,
        ApiError::Validation { .. } | ApiError::Conflict(_) | ApiError::Url(_) => {
            EXIT_INVALID_INPUT
        }
        ApiError::Unauthorized(_)
        | ApiError::Server { .. }
        | ApiError::Transport(_)
        | ApiError::Decode(_) => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir | ConfigError::Read { .. } => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidTimezone(_)
        | ConfigError::InvalidPageSize(_)
        | ConfigError::InvalidSiteId(_)
        | ConfigError::InvalidBaseUrl(_)
        | ConfigError::InvalidTimeout(_)
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
