use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// HTTP client shared by every fetch in a run.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// GET a problem page, backing off on 429 and 5xx.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let mut attempt = 0;
    loop {
        info!("Fetching {}", url);
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;
        let status = response.status();

        if status.is_success() {
            return response
                .text()
                .await
                .with_context(|| format!("Failed to read body of {}", url));
        }

        if !should_retry(status) || attempt == MAX_RETRIES {
            bail!("GET {} returned {}", url, status);
        }

        let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
        warn!(
            "{} on {} (attempt {}/{}), backing off {:.1}s",
            status,
            url,
            attempt + 1,
            MAX_RETRIES,
            backoff.as_secs_f64()
        );
        tokio::time::sleep(backoff).await;
        attempt += 1;
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Folder name for a problem: the path segment after `problems/`,
/// lower-cased with whitespace runs turned into `-`.
pub fn problem_slug(url: &str) -> Result<String> {
    let path = url.trim().split_once("://").map_or(url.trim(), |(_, rest)| rest);
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut segments = path.split('/');
    segments
        .by_ref()
        .find(|s| *s == "problems")
        .ok_or_else(|| anyhow!("Not a problem URL: {}", url))?;
    let name = segments
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("No problem name after /problems/ in {}", url))?;

    Ok(WS_RE.replace_all(&name.to_lowercase(), "-").into_owned())
}
