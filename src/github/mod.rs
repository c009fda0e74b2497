pub mod api;
pub mod client;
pub mod rate_limiter;
pub mod paginator;

#[cfg(test)]
pub mod fake;

pub use api::GitHubApi;
pub use client::GitHubClient;
pub use rate_limiter::RateLimiter;
pub use paginator::Paginator;
