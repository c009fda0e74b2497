use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::user::UserRef;
use crate::error::Error;

/// A pull request as returned by the list or detail endpoint.
///
/// The list endpoint omits the counters and merge details, so those are
/// optional here and only present on the detail object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
    pub user: UserRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merged: Option<bool>,
    pub merged_by: Option<UserRef>,
    pub comments: Option<u32>,
    pub deletions: Option<u64>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false) || self.merged_at.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub user: Option<UserRef>,
    pub state: String,
}

/// The disposition of a single review, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl ReviewState {
    pub const COUNT: usize = 5;

    pub const ALL: [ReviewState; Self::COUNT] = [
        ReviewState::Approved,
        ReviewState::ChangesRequested,
        ReviewState::Commented,
        ReviewState::Dismissed,
        ReviewState::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Pending => "PENDING",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for ReviewState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::UnknownReviewState(s.to_string()))
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review count per state. Every known state is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewCounts([u32; ReviewState::COUNT]);

impl ReviewCounts {
    pub fn from_reviews(reviews: &[Review]) -> Result<Self, Error> {
        let mut counts = Self::default();
        for review in reviews {
            counts.record(review.state.parse()?);
        }
        Ok(counts)
    }

    pub fn record(&mut self, state: ReviewState) {
        self.0[state.index()] += 1;
    }

    pub fn get(&self, state: ReviewState) -> u32 {
        self.0[state.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Counts in [`ReviewState::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ReviewState, u32)> + '_ {
        ReviewState::ALL.into_iter().map(|state| (state, self.get(state)))
    }
}
