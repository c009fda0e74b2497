use crate::config::RepositorySelector;
use crate::error::{Error, Result};
use crate::github::GitHubApi;
use crate::models::Repository;

/// Turn the configured selector into concrete repositories.
///
/// Explicit paths are all fetched up front, so a bad path fails the run
/// before any pull request is looked at.
pub async fn resolve_repositories<A>(api: &A, selector: &RepositorySelector) -> Result<Vec<Repository>>
where
    A: GitHubApi + ?Sized,
{
    match selector {
        RepositorySelector::Owner(owner) => {
            tracing::info!("Fetching repositories owned by {}", owner);
            let repos = api.get_user_repos(owner).await?;
            tracing::info!("Found {} repositories", repos.len());
            Ok(repos)
        }
        RepositorySelector::Paths(paths) => {
            let mut repos = Vec::with_capacity(paths.len());
            for path in paths {
                println!("Fetching repo: {}", path);
                let repo = api.get_repo(path).await.map_err(|e| match e {
                    Error::RepoNotFound(_) => Error::BadRepoPath(path.clone()),
                    other => other,
                })?;
                repos.push(repo);
            }
            Ok(repos)
        }
    }
}
