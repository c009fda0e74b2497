use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub commit: CommitDetails,
    pub author: Option<UserRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// A single commit with stats, files and parent links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub html_url: Option<String>,
    pub commit: CommitDetails,
    /// Null when the GitHub account behind the patch no longer exists.
    pub author: Option<UserRef>,
    pub stats: Option<CommitStats>,
    #[serde(default)]
    pub files: Vec<FileChange>,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
}

impl Commit {
    pub fn short_message(&self) -> String {
        self.commit.message.replace('\n', "\t")
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().map(|a| a.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
    pub blob_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: ParentRef,
}
