use futures::TryStreamExt;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::fmt;

use crate::analysis::summary::{PullRequestDetails, PullRequestSummary};
use crate::config::ReportSettings;
use crate::error::{Error, Result};
use crate::github::GitHubApi;
use crate::models::{PullRequest, Repository};
use crate::report::ReportRow;

/// A pull request that could not be turned into a report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrFailure {
    pub repo: String,
    pub number: u64,
    pub kind: &'static str,
    pub message: String,
}

impl PrFailure {
    fn new(repo: &Repository, number: u64, error: &Error) -> Self {
        Self {
            repo: repo.full_name.clone(),
            number,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for PrFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not fetch or parse PR. {}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub rows: Vec<ReportRow>,
    pub failures: Vec<PrFailure>,
    /// Matching PRs left out because they predate the cutoff.
    pub skipped_stale: usize,
}

/// Display names by login, looked up at most once per run.
#[derive(Debug, Default)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    pub async fn load<A>(&mut self, api: &A, login: &str)
    where
        A: GitHubApi + ?Sized,
    {
        if self.names.contains_key(login) {
            return;
        }
        let name = match api.get_user(login).await {
            Ok(user) => user.display_name(),
            Err(e) => {
                tracing::debug!("Falling back to login for {}: {}", login, e);
                login.to_string()
            }
        };
        self.names.insert(login.to_string(), name);
    }

    pub fn display(&self, login: &str) -> String {
        self.names
            .get(login)
            .cloned()
            .unwrap_or_else(|| login.to_string())
    }
}

pub struct PrAggregator<'a, A: GitHubApi + ?Sized> {
    api: &'a A,
    settings: &'a ReportSettings,
    users: UserDirectory,
    progress: ProgressBar,
}

impl<'a, A: GitHubApi + ?Sized> PrAggregator<'a, A> {
    pub fn new(api: &'a A, settings: &'a ReportSettings) -> Self {
        Self {
            api,
            settings,
            users: UserDirectory::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Build a row for every PR by a tracked user. A PR whose row cannot be
    /// built is recorded as a failure and the run moves on.
    pub async fn aggregate(&mut self, repos: &[Repository]) -> Result<AggregateOutcome> {
        let api = self.api;
        let mut outcome = AggregateOutcome::default();
        self.progress.set_length(repos.len() as u64);

        for repo in repos {
            self.say(format!("REPO: {}", repo.name));
            self.progress.set_message(repo.full_name.clone());

            let mut pulls = api.pull_requests(repo, self.settings.pr_state);
            while let Some(pull) = pulls.try_next().await? {
                if !self.settings.is_tracked(&pull.user.login) {
                    continue;
                }
                if let Some(cutoff) = self.settings.cutoff {
                    if pull.updated_at < cutoff {
                        tracing::debug!("Skipping PR #{}, not updated since {}", pull.number, cutoff);
                        outcome.skipped_stale += 1;
                        continue;
                    }
                }

                self.say(format!("PR #{}", pull.number));
                match self.build_row(repo, &pull).await {
                    Ok(row) => outcome.rows.push(row),
                    Err(e) => {
                        let failure = PrFailure::new(repo, pull.number, &e);
                        tracing::warn!("{}#{} skipped: {}", failure.repo, failure.number, e);
                        self.say(failure.to_string());
                        outcome.failures.push(failure);
                    }
                }
            }

            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        tracing::info!(
            "Aggregated {} pull requests ({} failed)",
            outcome.rows.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn build_row(&mut self, repo: &Repository, listed: &PullRequest) -> Result<ReportRow> {
        let api = self.api;
        let pull = api.get_pull_request(repo, listed.number).await?;
        let reviews = api.get_reviews(repo, pull.number).await?;
        let commits = api.get_pull_commits(repo, pull.number).await?;
        let files = api.get_pull_files(repo, pull.number).await?;

        self.users.load(api, &repo.owner.login).await;
        self.users.load(api, &pull.user.login).await;
        if let Some(merger) = &pull.merged_by {
            self.users.load(api, &merger.login).await;
        }
        for reviewer in reviews.iter().filter_map(|r| r.user.as_ref()) {
            self.users.load(api, &reviewer.login).await;
        }

        let users = &self.users;
        let summary = PullRequestSummary::derive(
            PullRequestDetails {
                pull: &pull,
                reviews: &reviews,
                commits: &commits,
                files: &files,
            },
            |user| users.display(&user.login),
        )?;

        Ok(ReportRow {
            repo_owner: users.display(&repo.owner.login),
            repo_name: repo.name.clone(),
            repo_url: repo.html_url.clone(),
            summary,
        })
    }

    fn say(&self, line: String) {
        self.progress.suspend(|| println!("{}", line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrState;
    use crate::github::fake::{file, pull, repo, review, ts, user, FakeGitHub};
    use crate::models::ReviewState;

    fn settings(usernames: &[&str]) -> ReportSettings {
        ReportSettings {
            usernames: usernames.iter().map(|u| u.to_string()).collect(),
            pr_state: PrState::All,
            cutoff: None,
        }
    }

    fn fixture() -> FakeGitHub {
        FakeGitHub::default()
            .with_repo(repo("acme/api"))
            .with_repo(repo("acme/web"))
            .with_user(user("acme", Some("Acme Corp")))
            .with_user(user("alice", Some("Alice Smith")))
            .with_pull("acme/api", pull(1, "alice"))
            .with_pull("acme/api", pull(2, "mallory"))
            .with_pull("acme/api", pull(3, "bob"))
            .with_pull("acme/web", pull(10, "alice"))
            .with_reviews(
                "acme/api",
                1,
                vec![review("bob", "APPROVED"), review("bob", "COMMENTED")],
            )
            .with_files("acme/api", 1, vec![file("a.rs", 3, 1)])
    }

    #[tokio::test]
    async fn test_only_tracked_authors_in_order() {
        let api = fixture();
        let settings = settings(&["alice", "bob"]);
        let repos = vec![repo("acme/api"), repo("acme/web")];

        let outcome = PrAggregator::new(&api, &settings)
            .aggregate(&repos)
            .await
            .unwrap();

        let ids: Vec<(String, u64)> = outcome
            .rows
            .iter()
            .map(|r| (r.repo_name.clone(), r.summary.number))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("api".to_string(), 1),
                ("api".to_string(), 3),
                ("web".to_string(), 10)
            ]
        );
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_display_names_and_counts() {
        let api = fixture();
        let settings = settings(&["alice"]);

        let outcome = PrAggregator::new(&api, &settings)
            .aggregate(&[repo("acme/api")])
            .await
            .unwrap();

        let row = &outcome.rows[0];
        assert_eq!(row.repo_owner, "Acme Corp (acme)");
        assert_eq!(row.summary.author, "Alice Smith (alice)");
        // bob has no profile so the login is shown
        assert_eq!(row.summary.reviewers(), "bob");
        assert_eq!(row.summary.review_counts.get(ReviewState::Approved), 1);
        assert_eq!(row.summary.review_counts.get(ReviewState::Commented), 1);
        assert_eq!(row.summary.review_counts.total(), 2);
        assert_eq!(row.summary.additions, 3);
    }

    #[tokio::test]
    async fn test_failed_pull_request_is_skipped() {
        let api = fixture().failing_reviews_for("acme/api", 1);
        let settings = settings(&["alice"]);
        let repos = vec![repo("acme/api"), repo("acme/web")];

        let outcome = PrAggregator::new(&api, &settings)
            .aggregate(&repos)
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].summary.number, 10);
        assert_eq!(outcome.failures.len(), 1);

        let failure = &outcome.failures[0];
        assert_eq!((failure.repo.as_str(), failure.number), ("acme/api", 1));
        assert_eq!(
            failure.to_string(),
            "Could not fetch or parse PR. GitHubApi: GitHub API error: 502 Bad Gateway"
        );
    }

    #[tokio::test]
    async fn test_cutoff_skips_stale_pull_requests() {
        let mut fresh = pull(20, "alice");
        fresh.updated_at = ts(20);
        let api = fixture().with_pull("acme/web", fresh);
        let mut settings = settings(&["alice"]);
        settings.cutoff = Some(ts(15));

        let outcome = PrAggregator::new(&api, &settings)
            .aggregate(&[repo("acme/web")])
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].summary.number, 20);
        assert_eq!(outcome.skipped_stale, 1);
    }

    #[tokio::test]
    async fn test_state_filter_is_passed_through() {
        let mut closed = pull(30, "alice");
        closed.state = "closed".to_string();
        closed.closed_at = Some(ts(4));
        let api = fixture().with_pull("acme/web", closed);
        let mut settings = settings(&["alice"]);
        settings.pr_state = PrState::Closed;

        let outcome = PrAggregator::new(&api, &settings)
            .aggregate(&[repo("acme/web")])
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].summary.number, 30);
        assert_eq!(outcome.rows[0].summary.status_changed_at, Some(ts(4)));
    }
}
