use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::PrState;
use crate::error::{Error, Result};
use crate::github::api::GitHubApi;
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::models::{
    Branch, Commit, CommitSummary, FileChange, GitHubUser, PullRequest, Repository, Review,
};

const PER_PAGE: u32 = 100;

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, "https://api.github.com")
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Config("GitHub access token is empty".to_string()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("aggregit/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.client, &self.rate_limiter)
    }

    fn repo_url(&self, repo: &Repository) -> String {
        format!("{}/repos/{}", self.base_url, repo.full_name)
    }

    /// GET a single resource. A 404 becomes the error built by `not_found`.
    async fn get_json<T, F>(&self, url: &str, not_found: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Error,
    {
        self.rate_limiter.wait().await;
        tracing::debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;
        self.rate_limiter.update_from_response(&response);

        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch {}: {} - {}",
                url, status, body
            )));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        let url = format!("{}/users/{}", self.base_url, login);
        self.get_json(&url, || Error::UserNotFound(login.to_string()))
            .await
    }

    async fn get_user_repos(&self, owner: &str) -> Result<Vec<Repository>> {
        // The listing 404s the same way for any cause, so look the owner up first.
        let owner = self.get_user(owner).await?.login;
        let url = format!("{}/users/{}/repos?type=owner", self.base_url, owner);
        tracing::info!("Fetching repositories for: {}", owner);
        self.paginator().fetch_all(&url, PER_PAGE).await
    }

    async fn get_repo(&self, full_name: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}", self.base_url, full_name);
        self.get_json(&url, || Error::RepoNotFound(full_name.to_string()))
            .await
    }

    fn pull_requests<'a>(
        &'a self,
        repo: &'a Repository,
        state: PrState,
    ) -> BoxStream<'a, Result<PullRequest>> {
        let url = format!("{}/pulls?state={}", self.repo_url(repo), state);
        self.paginator().stream(url, PER_PAGE)
    }

    async fn get_pull_request(&self, repo: &Repository, number: u64) -> Result<PullRequest> {
        let url = format!("{}/pulls/{}", self.repo_url(repo), number);
        self.get_json(&url, || {
            Error::GitHubApi(format!("PR #{} not found in {}", number, repo.full_name))
        })
        .await
    }

    async fn get_reviews(&self, repo: &Repository, number: u64) -> Result<Vec<Review>> {
        let url = format!("{}/pulls/{}/reviews", self.repo_url(repo), number);
        self.paginator().fetch_all(&url, PER_PAGE).await
    }

    async fn get_pull_commits(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<CommitSummary>> {
        let url = format!("{}/pulls/{}/commits", self.repo_url(repo), number);
        self.paginator().fetch_all(&url, PER_PAGE).await
    }

    async fn get_pull_files(&self, repo: &Repository, number: u64) -> Result<Vec<FileChange>> {
        let url = format!("{}/pulls/{}/files", self.repo_url(repo), number);
        self.paginator().fetch_all(&url, PER_PAGE).await
    }

    async fn get_branches(&self, repo: &Repository) -> Result<Vec<Branch>> {
        let url = format!("{}/branches", self.repo_url(repo));
        self.paginator().fetch_all(&url, PER_PAGE).await
    }

    async fn get_branch(&self, repo: &Repository, name: &str) -> Result<Branch> {
        let url = format!("{}/branches/{}", self.repo_url(repo), name);
        self.get_json(&url, || {
            Error::BranchNotFound(format!("{}:{}", repo.full_name, name))
        })
        .await
    }

    async fn get_commit(&self, repo: &Repository, sha: &str) -> Result<Commit> {
        let url = format!("{}/commits/{}", self.repo_url(repo), sha);
        tracing::debug!("Fetching commit: {}", sha);
        self.get_json(&url, || {
            Error::GitHubApi(format!("Commit {} not found in {}", sha, repo.full_name))
        })
        .await
    }
}
