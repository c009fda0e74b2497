pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod analysis;
pub mod report;

pub use config::{Config, PrState, ReportConfig, ReportSettings, RepositorySelector};
pub use error::{Error, Result};
pub use github::{GitHubApi, GitHubClient};
pub use analysis::ReportPipeline;
