use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::analysis::aggregator::{PrAggregator, PrFailure};
use crate::analysis::resolver::resolve_repositories;
use crate::analysis::totals::{user_totals, UserTotals};
use crate::config::{ReportConfig, ReportSettings, RepositorySelector};
use crate::error::Result;
use crate::github::GitHubApi;
use crate::report::write_report;

/// What a finished report run produced.
#[derive(Debug)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub rows_written: usize,
    pub failures: Vec<PrFailure>,
}

pub struct ReportPipeline<'a, A: GitHubApi + ?Sized> {
    github: &'a A,
    repositories: RepositorySelector,
    settings: ReportSettings,
    show_progress: bool,
}

impl<'a, A: GitHubApi + ?Sized> ReportPipeline<'a, A> {
    pub fn new(github: &'a A, config: &ReportConfig) -> Self {
        Self {
            github,
            repositories: config.repositories.clone(),
            settings: ReportSettings::from(config),
            show_progress: false,
        }
    }

    pub fn with_settings(mut self, settings: ReportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Resolve repositories, aggregate PR rows and write the CSV.
    ///
    /// Nothing is written unless every configured repository resolves.
    pub async fn run(&self, output: &Path) -> Result<ReportSummary> {
        let repos = resolve_repositories(self.github, &self.repositories).await?;
        println!();

        let progress = if self.show_progress {
            repo_progress(repos.len())
        } else {
            ProgressBar::hidden()
        };

        let outcome = PrAggregator::new(self.github, &self.settings)
            .with_progress(progress)
            .aggregate(&repos)
            .await?;

        let rows_written = write_report(output, &outcome.rows)?;

        Ok(ReportSummary {
            path: output.to_path_buf(),
            rows_written,
            failures: outcome.failures,
        })
    }

    pub async fn totals(&self) -> Result<Vec<UserTotals>> {
        let repos = resolve_repositories(self.github, &self.repositories).await?;
        user_totals(self.github, &self.settings, &repos).await
    }
}

fn repo_progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
