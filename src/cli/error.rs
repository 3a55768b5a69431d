//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::api::ApiError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::HttpClient(_) => exitcode::SOFTWARE,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::NoProjectSpecified => exitcode::USAGE,
        ApplicationError::Domain(_) => exitcode::DATAERR,
        ApplicationError::ProjectNotFound { .. } => exitcode::NOINPUT,
        ApplicationError::NotLoggedIn => exitcode::NOPERM,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { .. } => exitcode::IOERR,
        ApplicationError::Api(api) => match api {
            ApiError::AuthExpired => exitcode::NOPERM,
            ApiError::NotFound { .. } => exitcode::NOINPUT,
            ApiError::InvalidUrl { .. } => exitcode::CONFIG,
            ApiError::Remote { .. } | ApiError::Transport { .. } | ApiError::Decode { .. } => {
                exitcode::UNAVAILABLE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApplicationError::NoProjectSpecified, exitcode::USAGE)]
    #[case(ApplicationError::ProjectNotFound { identifier: "x".into() }, exitcode::NOINPUT)]
    #[case(ApplicationError::NotLoggedIn, exitcode::NOPERM)]
    #[case(ApplicationError::Api(ApiError::AuthExpired), exitcode::NOPERM)]
    #[case(ApplicationError::Api(ApiError::remote(503, "down")), exitcode::UNAVAILABLE)]
    #[case(ApplicationError::Config { message: "bad".into() }, exitcode::CONFIG)]
    fn given_application_error_when_mapping_then_uses_sysexits_code(
        #[case] error: ApplicationError,
        #[case] expected: i32,
    ) {
        assert_eq!(CliError::from(error).exit_code(), expected);
    }

    #[test]
    fn given_no_project_error_when_displayed_then_message_passes_through() {
        let err = CliError::from(ApplicationError::NoProjectSpecified);
        assert!(err.to_string().starts_with("no project specified"));
    }
}
