//! In-memory `GitHubApi` used by unit tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::config::PrState;
use crate::error::{Error, Result};
use crate::github::api::GitHubApi;
use crate::models::{
    Branch, Commit, CommitAuthor, CommitDetails, CommitStats, CommitSummary, FileChange,
    GitHubUser, ParentRef, PullRequest, Repository, Review, UserRef,
};

#[derive(Default)]
pub struct FakeGitHub {
    pub users: HashMap<String, GitHubUser>,
    pub repos: Vec<Repository>,
    pub pulls: HashMap<String, Vec<PullRequest>>,
    pub reviews: HashMap<(String, u64), Vec<Review>>,
    pub pull_commits: HashMap<(String, u64), Vec<CommitSummary>>,
    pub files: HashMap<(String, u64), Vec<FileChange>>,
    pub branches: HashMap<String, Vec<Branch>>,
    pub commits: HashMap<String, Commit>,
    /// `(repo, number)` pairs whose review fetch fails.
    pub failing_reviews: HashSet<(String, u64)>,
    pub commit_fetches: Mutex<Vec<String>>,
}

pub fn ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

pub fn user(login: &str, name: Option<&str>) -> GitHubUser {
    GitHubUser {
        login: login.to_string(),
        id: 1,
        name: name.map(str::to_string),
    }
}

pub fn repo(full_name: &str) -> Repository {
    let (owner, name) = full_name.split_once('/').unwrap();
    Repository {
        id: 1,
        name: name.to_string(),
        full_name: full_name.to_string(),
        html_url: format!("https://github.com/{}", full_name),
        owner: UserRef {
            login: owner.to_string(),
        },
    }
}

/// An open pull request with detail counters filled in.
pub fn pull(number: u64, author: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Change {}", number),
        html_url: format!("https://github.com/acme/api/pull/{}", number),
        state: "open".to_string(),
        user: UserRef {
            login: author.to_string(),
        },
        created_at: ts(1),
        updated_at: ts(2),
        closed_at: None,
        merged_at: None,
        merged: Some(false),
        merged_by: None,
        comments: Some(0),
        deletions: Some(0),
    }
}

pub fn review(reviewer: &str, state: &str) -> Review {
    Review {
        id: 1,
        user: Some(UserRef {
            login: reviewer.to_string(),
        }),
        state: state.to_string(),
    }
}

pub fn file(filename: &str, additions: u64, deletions: u64) -> FileChange {
    FileChange {
        filename: filename.to_string(),
        status: "modified".to_string(),
        additions,
        deletions,
        changes: additions + deletions,
        blob_url: None,
    }
}

pub fn commit(sha: &str, parents: &[&str]) -> Commit {
    Commit {
        sha: sha.to_string(),
        html_url: Some(format!("https://github.com/acme/api/commit/{}", sha)),
        commit: CommitDetails {
            message: format!("commit {}\n\nbody", sha),
            author: Some(CommitAuthor {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                date: ts(5),
            }),
        },
        author: Some(UserRef {
            login: "alice".to_string(),
        }),
        stats: Some(CommitStats {
            additions: 2,
            deletions: 1,
            total: 3,
        }),
        files: Vec::new(),
        parents: parents
            .iter()
            .map(|sha| ParentRef {
                sha: sha.to_string(),
            })
            .collect(),
    }
}

pub fn commit_summary(sha: &str, author: Option<&str>) -> CommitSummary {
    CommitSummary {
        sha: sha.to_string(),
        commit: CommitDetails {
            message: format!("commit {}", sha),
            author: None,
        },
        author: author.map(|login| UserRef {
            login: login.to_string(),
        }),
    }
}

impl FakeGitHub {
    pub fn with_repo(mut self, repo: Repository) -> Self {
        self.repos.push(repo);
        self
    }

    pub fn with_user(mut self, user: GitHubUser) -> Self {
        self.users.insert(user.login.clone(), user);
        self
    }

    pub fn with_pull(mut self, repo: &str, pull: PullRequest) -> Self {
        self.pulls.entry(repo.to_string()).or_default().push(pull);
        self
    }

    pub fn with_reviews(mut self, repo: &str, number: u64, reviews: Vec<Review>) -> Self {
        self.reviews.insert((repo.to_string(), number), reviews);
        self
    }

    pub fn with_files(mut self, repo: &str, number: u64, files: Vec<FileChange>) -> Self {
        self.files.insert((repo.to_string(), number), files);
        self
    }

    pub fn with_pull_commits(
        mut self,
        repo: &str,
        number: u64,
        commits: Vec<CommitSummary>,
    ) -> Self {
        self.pull_commits.insert((repo.to_string(), number), commits);
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.insert(commit.sha.clone(), commit);
        self
    }

    pub fn with_branch(mut self, repo: &str, name: &str, head: &str) -> Self {
        self.branches.entry(repo.to_string()).or_default().push(Branch {
            name: name.to_string(),
            commit: ParentRef {
                sha: head.to_string(),
            },
        });
        self
    }

    pub fn failing_reviews_for(mut self, repo: &str, number: u64) -> Self {
        self.failing_reviews.insert((repo.to_string(), number));
        self
    }

    pub fn fetched_commits(&self) -> Vec<String> {
        self.commit_fetches.lock().unwrap().clone()
    }

    fn key(repo: &Repository, number: u64) -> (String, u64) {
        (repo.full_name.clone(), number)
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        self.users
            .get(login)
            .cloned()
            .ok_or_else(|| Error::UserNotFound(login.to_string()))
    }

    async fn get_user_repos(&self, owner: &str) -> Result<Vec<Repository>> {
        let repos: Vec<Repository> = self
            .repos
            .iter()
            .filter(|r| r.owner.login == owner)
            .cloned()
            .collect();
        if repos.is_empty() && !self.users.contains_key(owner) {
            return Err(Error::UserNotFound(owner.to_string()));
        }
        Ok(repos)
    }

    async fn get_repo(&self, full_name: &str) -> Result<Repository> {
        self.repos
            .iter()
            .find(|r| r.full_name == full_name)
            .cloned()
            .ok_or_else(|| Error::RepoNotFound(full_name.to_string()))
    }

    fn pull_requests<'a>(
        &'a self,
        repo: &'a Repository,
        state: PrState,
    ) -> BoxStream<'a, Result<PullRequest>> {
        let pulls: Vec<PullRequest> = self
            .pulls
            .get(&repo.full_name)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| match state {
                PrState::All => true,
                PrState::Open => !p.is_closed(),
                PrState::Closed => p.is_closed(),
            })
            .collect();
        stream::iter(pulls.into_iter().map(Ok)).boxed()
    }

    async fn get_pull_request(&self, repo: &Repository, number: u64) -> Result<PullRequest> {
        self.pulls
            .get(&repo.full_name)
            .and_then(|pulls| pulls.iter().find(|p| p.number == number))
            .cloned()
            .ok_or_else(|| Error::GitHubApi(format!("PR #{} not found", number)))
    }

    async fn get_reviews(&self, repo: &Repository, number: u64) -> Result<Vec<Review>> {
        let key = Self::key(repo, number);
        if self.failing_reviews.contains(&key) {
            return Err(Error::GitHubApi("502 Bad Gateway".to_string()));
        }
        Ok(self.reviews.get(&key).cloned().unwrap_or_default())
    }

    async fn get_pull_commits(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<CommitSummary>> {
        Ok(self
            .pull_commits
            .get(&Self::key(repo, number))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_pull_files(&self, repo: &Repository, number: u64) -> Result<Vec<FileChange>> {
        Ok(self
            .files
            .get(&Self::key(repo, number))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_branches(&self, repo: &Repository) -> Result<Vec<Branch>> {
        Ok(self
            .branches
            .get(&repo.full_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_branch(&self, repo: &Repository, name: &str) -> Result<Branch> {
        self.branches
            .get(&repo.full_name)
            .and_then(|branches| branches.iter().find(|b| b.name == name))
            .cloned()
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }

    async fn get_commit(&self, _repo: &Repository, sha: &str) -> Result<Commit> {
        self.commit_fetches.lock().unwrap().push(sha.to_string());
        self.commits
            .get(sha)
            .cloned()
            .ok_or_else(|| Error::GitHubApi(format!("Commit {} not found", sha)))
    }
}
