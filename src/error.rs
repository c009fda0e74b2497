use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad repo path: {0}")]
    BadRepoPath(String),

    #[error("Missing field on {object}: {field}")]
    MissingField { object: String, field: &'static str },

    #[error("Unknown review state: {0}")]
    UnknownReviewState(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn missing(object: impl Into<String>, field: &'static str) -> Self {
        Error::MissingField {
            object: object.into(),
            field,
        }
    }

    /// Short name of the failure, used in per-PR console lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::GitHubApi(_) => "GitHubApi",
            Error::Config(_) => "Config",
            Error::BadRepoPath(_) => "BadRepoPath",
            Error::MissingField { .. } => "MissingField",
            Error::UnknownReviewState(_) => "UnknownReviewState",
            Error::Network(_) => "Network",
            Error::Serialization(_) => "Serialization",
            Error::Io(_) => "Io",
            Error::Csv(_) => "Csv",
            Error::UserNotFound(_) => "UserNotFound",
            Error::RepoNotFound(_) => "RepoNotFound",
            Error::BranchNotFound(_) => "BranchNotFound",
            Error::InvalidHeader(_) => "InvalidHeader",
        }
    }

    /// Errors caused by the run's own settings: a bad variable, path, owner
    /// or branch. Retrying will not help until the settings change.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::BadRepoPath(_)
                | Error::InvalidHeader(_)
                | Error::UserNotFound(_)
                | Error::RepoNotFound(_)
                | Error::BranchNotFound(_)
        )
    }
}
