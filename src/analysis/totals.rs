use futures::TryStreamExt;
use std::fmt;

use crate::config::ReportSettings;
use crate::error::Result;
use crate::github::GitHubApi;
use crate::models::Repository;

/// PR and commit activity of one user across the resolved repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTotals {
    pub login: String,
    pub pull_requests: usize,
    pub commits: usize,
    pub additions: u64,
    pub deletions: u64,
}

impl fmt::Display for UserTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} PRs, {} commits, +{} / -{}",
            self.login, self.pull_requests, self.commits, self.additions, self.deletions
        )
    }
}

/// Count, for every tracked user in a single pass, the PRs they opened and
/// the commits they authored on those PRs.
///
/// Only activity inside pull requests is counted. Commits without a linked
/// GitHub account are not attributed to anyone.
pub async fn user_totals<A>(
    api: &A,
    settings: &ReportSettings,
    repos: &[Repository],
) -> Result<Vec<UserTotals>>
where
    A: GitHubApi + ?Sized,
{
    let mut totals: Vec<UserTotals> = settings
        .usernames
        .iter()
        .map(|login| UserTotals {
            login: login.clone(),
            ..Default::default()
        })
        .collect();

    for repo in repos {
        tracing::info!("Counting activity in {}", repo.full_name);
        let mut pulls = api.pull_requests(repo, settings.pr_state);

        while let Some(pull) = pulls.try_next().await? {
            let Some(entry) = totals.iter_mut().find(|t| t.login == pull.user.login) else {
                continue;
            };
            if settings.cutoff.is_some_and(|cutoff| pull.updated_at < cutoff) {
                continue;
            }
            entry.pull_requests += 1;

            for summary in api.get_pull_commits(repo, pull.number).await? {
                let authored = summary
                    .author
                    .as_ref()
                    .is_some_and(|author| author.login == entry.login);
                if !authored {
                    tracing::debug!(
                        "Commit {} on PR #{} not by {}",
                        summary.sha,
                        pull.number,
                        entry.login
                    );
                    continue;
                }

                let commit = api.get_commit(repo, &summary.sha).await?;
                let stats = commit.stats.unwrap_or_default();
                entry.commits += 1;
                entry.additions += stats.additions;
                entry.deletions += stats.deletions;
            }
        }
    }

    Ok(totals)
}
