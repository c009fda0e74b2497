use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::{Error, Result};
use crate::models::{CommitSummary, FileChange, PullRequest, Review, ReviewCounts, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrStatus {
    Open,
    Closed,
    Merged,
}

impl PrStatus {
    pub fn of(pull: &PullRequest) -> Self {
        if pull.is_merged() {
            PrStatus::Merged
        } else if pull.is_closed() {
            PrStatus::Closed
        } else {
            PrStatus::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "open",
            PrStatus::Closed => "closed",
            PrStatus::Merged => "merged",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything fetched for one pull request before it is flattened.
pub struct PullRequestDetails<'a> {
    pub pull: &'a PullRequest,
    pub reviews: &'a [Review],
    pub commits: &'a [CommitSummary],
    pub files: &'a [FileChange],
}

/// Flat, read-only projection of a pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PrStatus,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub merged_by: Option<String>,
    pub reviewer_names: Vec<String>,
    pub comment_count: u32,
    pub commit_count: usize,
    pub changed_files: usize,
    pub additions: u64,
    pub deletions: u64,
    pub changed_lines: u64,
    pub review_counts: ReviewCounts,
}

impl PullRequestSummary {
    /// Derive the summary. `display` turns a user reference into the name
    /// shown in the report.
    pub fn derive<F>(details: PullRequestDetails<'_>, display: F) -> Result<Self>
    where
        F: Fn(&UserRef) -> String,
    {
        let PullRequestDetails {
            pull,
            reviews,
            commits,
            files,
        } = details;
        let label = format!("PR #{}", pull.number);

        let status = PrStatus::of(pull);
        let (status_changed_at, merged_by) = match status {
            PrStatus::Merged => {
                let merged_at = pull
                    .merged_at
                    .ok_or_else(|| Error::missing(&label, "merged_at"))?;
                let merged_by = pull
                    .merged_by
                    .as_ref()
                    .ok_or_else(|| Error::missing(&label, "merged_by"))?;
                (Some(merged_at), Some(display(merged_by)))
            }
            PrStatus::Closed => {
                let closed_at = pull
                    .closed_at
                    .ok_or_else(|| Error::missing(&label, "closed_at"))?;
                (Some(closed_at), None)
            }
            PrStatus::Open => (None, None),
        };

        let mut reviewer_names: Vec<String> = Vec::new();
        for reviewer in reviews.iter().filter_map(|r| r.user.as_ref()) {
            let name = display(reviewer);
            if !reviewer_names.contains(&name) {
                reviewer_names.push(name);
            }
        }

        let review_counts = ReviewCounts::from_reviews(reviews)?;

        let additions: u64 = files.iter().map(|f| f.additions).sum();
        let deletions: u64 = files.iter().map(|f| f.deletions).sum();
        // Deliberately the PR object's own deletions, not the summed ones.
        let raw_deletions = pull
            .deletions
            .ok_or_else(|| Error::missing(&label, "deletions"))?;

        Ok(Self {
            number: pull.number,
            title: pull.title.clone(),
            url: pull.html_url.clone(),
            author: display(&pull.user),
            created_at: pull.created_at,
            updated_at: pull.updated_at,
            status,
            status_changed_at,
            merged_by,
            reviewer_names,
            comment_count: pull
                .comments
                .ok_or_else(|| Error::missing(&label, "comments"))?,
            commit_count: commits.len(),
            changed_files: files.len(),
            additions,
            deletions,
            changed_lines: additions + raw_deletions,
            review_counts,
        })
    }

    pub fn reviewers(&self) -> String {
        self.reviewer_names.join(", ")
    }
}
