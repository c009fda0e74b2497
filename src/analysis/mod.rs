pub mod resolver;
pub mod summary;
pub mod aggregator;
pub mod pipeline;
pub mod commit_walker;
pub mod totals;

pub use aggregator::{AggregateOutcome, PrAggregator, PrFailure};
pub use commit_walker::{find_branch, CommitWalker, WalkOptions, WalkStats, WalkStyle};
pub use pipeline::{ReportPipeline, ReportSummary};
pub use resolver::resolve_repositories;
pub use summary::{PrStatus, PullRequestSummary};
pub use totals::{user_totals, UserTotals};
