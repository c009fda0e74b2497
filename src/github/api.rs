use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::PrState;
use crate::error::Result;
use crate::models::{
    Branch, Commit, CommitSummary, FileChange, GitHubUser, PullRequest, Repository, Review,
};

/// The slice of the GitHub REST API the reports are built from.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn get_user(&self, login: &str) -> Result<GitHubUser>;

    async fn get_user_repos(&self, owner: &str) -> Result<Vec<Repository>>;

    /// Fails with [`crate::Error::RepoNotFound`] when the path does not exist.
    async fn get_repo(&self, full_name: &str) -> Result<Repository>;

    /// Pull requests of a repository, fetched lazily page by page.
    fn pull_requests<'a>(
        &'a self,
        repo: &'a Repository,
        state: PrState,
    ) -> BoxStream<'a, Result<PullRequest>>;

    async fn get_pull_request(&self, repo: &Repository, number: u64) -> Result<PullRequest>;

    async fn get_reviews(&self, repo: &Repository, number: u64) -> Result<Vec<Review>>;

    async fn get_pull_commits(&self, repo: &Repository, number: u64)
        -> Result<Vec<CommitSummary>>;

    async fn get_pull_files(&self, repo: &Repository, number: u64) -> Result<Vec<FileChange>>;

    async fn get_branches(&self, repo: &Repository) -> Result<Vec<Branch>>;

    async fn get_branch(&self, repo: &Repository, name: &str) -> Result<Branch>;

    async fn get_commit(&self, repo: &Repository, sha: &str) -> Result<Commit>;
}
