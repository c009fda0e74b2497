use chrono::{DateTime, Utc};

use crate::analysis::summary::PullRequestSummary;
use crate::models::ReviewState;

pub const BUSINESS_COLUMN_COUNT: usize = 19;

/// Fixed leading columns; the review states follow in canonical order.
pub const BUSINESS_COLUMNS: [&str; BUSINESS_COLUMN_COUNT] = [
    "Repo Owner",
    "Repo Name",
    "Repo URL",
    "PR ID",
    "PR Title",
    "Author",
    "PR URL",
    "Status",
    "Status Changed At",
    "Updated At",
    "Created At",
    "Commits",
    "Changed Files",
    "Added Lines",
    "Deleted Lines",
    "Changed Lines",
    "Comments",
    "Merged By",
    "Reviewers",
];

/// Complete report header.
pub fn header() -> Vec<&'static str> {
    BUSINESS_COLUMNS
        .into_iter()
        .chain(ReviewState::ALL.into_iter().map(|s| s.as_str()))
        .collect()
}

/// One line of the PR report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub repo_owner: String,
    pub repo_name: String,
    pub repo_url: String,
    pub summary: PullRequestSummary,
}

impl ReportRow {
    fn business_fields(&self) -> [String; BUSINESS_COLUMN_COUNT] {
        let pr = &self.summary;
        [
            self.repo_owner.clone(),
            self.repo_name.clone(),
            self.repo_url.clone(),
            format!("#{}", pr.number),
            pr.title.clone(),
            pr.author.clone(),
            pr.url.clone(),
            pr.status.to_string(),
            pr.status_changed_at.map(format_time).unwrap_or_default(),
            format_time(pr.updated_at),
            format_time(pr.created_at),
            pr.commit_count.to_string(),
            pr.changed_files.to_string(),
            pr.additions.to_string(),
            pr.deletions.to_string(),
            pr.changed_lines.to_string(),
            pr.comment_count.to_string(),
            pr.merged_by.clone().unwrap_or_default(),
            pr.reviewers(),
        ]
    }

    /// Field values in [`header`] order.
    pub fn to_record(&self) -> Vec<String> {
        let review_fields = self
            .summary
            .review_counts
            .iter()
            .map(|(_, count)| count.to_string());

        self.business_fields()
            .into_iter()
            .chain(review_fields)
            .collect()
    }
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
