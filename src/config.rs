use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Pull request state filter passed to the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrState {
    Open,
    Closed,
    #[default]
    All,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::All => "all",
        }
    }
}

impl FromStr for PrState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(PrState::Open),
            "closed" => Ok(PrState::Closed),
            "all" => Ok(PrState::All),
            other => Err(Error::Config(format!(
                "PR state must be one of open, closed or all, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which repositories a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySelector {
    /// Every repository owned by this user or organization.
    Owner(String),
    /// Explicit `owner/name` paths.
    Paths(Vec<String>),
}

/// Cutoff for PR activity: PRs not updated since then are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinDate {
    /// Number of days ago, inclusive. 1 means yesterday and today.
    DaysAgo(u32),
    Date(NaiveDate),
}

impl MinDate {
    pub fn cutoff(&self, today: NaiveDate) -> DateTime<Utc> {
        let day = match self {
            MinDate::DaysAgo(days) => today - Duration::days(i64::from(*days)),
            MinDate::Date(date) => *date,
        };
        day.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

impl FromStr for MinDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(days) = s.parse::<u32>() {
            return Ok(MinDate::DaysAgo(days));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(MinDate::Date)
            .map_err(|_| {
                Error::Config(format!(
                    "min date must be a number of days or a YYYY-MM-DD date, got '{}'",
                    s
                ))
            })
    }
}

/// Settings every command needs: the token and the walker's pacing.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub walk_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build and validate a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let github_token = read(&lookup, "GITHUB_TOKEN")
            .ok_or_else(|| Error::Config("GITHUB_TOKEN environment variable not set".to_string()))?;

        let walk_delay_ms = match read(&lookup, "AGGREGIT_WALK_DELAY_MS") {
            Some(v) => v.parse().map_err(|_| {
                Error::Config(format!("AGGREGIT_WALK_DELAY_MS must be a number, got '{}'", v))
            })?,
            None => 1000,
        };

        Ok(Self {
            github_token,
            walk_delay_ms,
        })
    }
}

/// What the `report` and `totals` commands cover. Loaded only by those
/// commands.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub usernames: Vec<String>,
    pub repositories: RepositorySelector,
    pub min_date: Option<MinDate>,
    pub pr_state: PrState,
    pub pr_csv_path: PathBuf,
}

impl ReportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let usernames = read(&lookup, "AGGREGIT_USERNAMES")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        if usernames.is_empty() {
            return Err(Error::Config(
                "AGGREGIT_USERNAMES must name at least one GitHub user".to_string(),
            ));
        }

        let by_owner = match read(&lookup, "AGGREGIT_BY_OWNER") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                Error::Config(format!("AGGREGIT_BY_OWNER must be true or false, got '{}'", v))
            })?,
            None => false,
        };

        let repositories = if by_owner {
            let owner = read(&lookup, "AGGREGIT_REPO_OWNER").ok_or_else(|| {
                Error::Config("AGGREGIT_REPO_OWNER must be set when AGGREGIT_BY_OWNER is true".to_string())
            })?;
            RepositorySelector::Owner(owner)
        } else {
            let paths = read(&lookup, "AGGREGIT_REPO_PATHS")
                .map(|v| split_list(&v))
                .unwrap_or_default();
            if paths.is_empty() {
                return Err(Error::Config(
                    "AGGREGIT_REPO_PATHS must list at least one owner/name path".to_string(),
                ));
            }
            if let Some(bad) = paths.iter().find(|p| !is_repo_path(p)) {
                return Err(Error::BadRepoPath(bad.clone()));
            }
            RepositorySelector::Paths(paths)
        };

        let min_date = read(&lookup, "AGGREGIT_MIN_DATE")
            .map(|v| v.parse::<MinDate>())
            .transpose()?;

        let pr_state = read(&lookup, "AGGREGIT_PR_STATE")
            .map(|v| v.parse::<PrState>())
            .transpose()?
            .unwrap_or_default();

        let pr_csv_path = read(&lookup, "AGGREGIT_PR_CSV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pr_report.csv"));

        Ok(Self {
            usernames,
            repositories,
            min_date,
            pr_state,
            pr_csv_path,
        })
    }

    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.min_date
            .map(|min_date| min_date.cutoff(Utc::now().date_naive()))
    }
}

/// Settings the PR aggregator runs with.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub usernames: Vec<String>,
    pub pr_state: PrState,
    pub cutoff: Option<DateTime<Utc>>,
}

impl ReportSettings {
    pub fn is_tracked(&self, login: &str) -> bool {
        self.usernames.iter().any(|u| u == login)
    }
}

impl From<&ReportConfig> for ReportSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            usernames: config.usernames.clone(),
            pr_state: config.pr_state,
            cutoff: config.cutoff(),
        }
    }
}

/// The trimmed value of `key`, if set and not blank.
fn read<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn is_repo_path(path: &str) -> bool {
    let mut parts = path.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}
