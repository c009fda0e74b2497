use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::github::rate_limiter::RateLimiter;

#[derive(Clone, Copy)]
pub struct Paginator<'a> {
    client: &'a Client,
    rate_limiter: &'a RateLimiter,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client, rate_limiter: &'a RateLimiter) -> Self {
        Self {
            client,
            rate_limiter,
        }
    }

    pub async fn fetch_all<T>(&self, base_url: &str, per_page: u32) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'a,
    {
        self.stream(base_url.to_string(), per_page).try_collect().await
    }

    /// Items across all pages, fetching the next page only once the
    /// previous one has been consumed.
    pub fn stream<T>(self, base_url: String, per_page: u32) -> BoxStream<'a, Result<T>>
    where
        T: DeserializeOwned + Send + 'a,
    {
        stream::try_unfold(Some(1u32), move |page| {
            self.next_page::<T>(base_url.clone(), per_page, page)
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, Error>)))
        .try_flatten()
        .boxed()
    }

    async fn next_page<T: DeserializeOwned>(
        self,
        base_url: String,
        per_page: u32,
        page: Option<u32>,
    ) -> Result<Option<(Vec<T>, Option<u32>)>> {
        let Some(page) = page else {
            return Ok(None);
        };

        self.rate_limiter.wait().await;

        let separator = if base_url.contains('?') { "&" } else { "?" };
        let url = format!("{}{}per_page={}&page={}", base_url, separator, per_page, page);

        tracing::debug!("Fetching: {}", url);
        let response = self.client.get(&url).send().await?;
        self.rate_limiter.update_from_response(&response);

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch {}: {} - {}",
                url, status, body
            )));
        }

        // Check for next page in Link header
        let has_next = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("rel=\"next\""))
            .unwrap_or(false);

        let body = response.text().await?;
        let items: Vec<T> = serde_json::from_str(&body)?;

        let next = (has_next && items.len() >= per_page as usize).then_some(page + 1);
        Ok(Some((items, next)))
    }
}
