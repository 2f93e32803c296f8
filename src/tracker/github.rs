use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::IssueTracker;
use crate::config::EnvConfig;
use crate::model::issue::{Issue, IssueState};

pub struct GitHubTracker {
    api_url: String,
    owner: String,
    repo: String,
    token: String,
    client: reqwest::Client,
}

impl GitHubTracker {
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, self.owner, self.repo, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!(%method, url, "GitHub request");
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", concat!("issue-checker/", env!("CARGO_PKG_VERSION")))
    }
}

#[derive(Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    body: Option<String>,
    state: IssueState,
    #[serde(default)]
    labels: Vec<GhLabel>,
}

#[derive(Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Serialize)]
struct AddLabelsRequest<'a> {
    labels: &'a [&'a str],
}

#[derive(Serialize)]
struct UpdateStateRequest {
    state: IssueState,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

impl From<GhIssue> for Issue {
    fn from(issue: GhIssue) -> Self {
        Issue {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            state: issue.state,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

/// Turn a non-2xx response into an error carrying the status and body.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("GitHub {what} returned {status}: {body}");
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn fetch_issue(&self, number: u64) -> Result<Issue> {
        let url = self.repo_url(&format!("/issues/{number}"));
        let resp = self
            .request(Method::GET, &url)
            .send()
            .await
            .context("GitHub fetch issue request failed")?;
        let resp = ensure_success(resp, "fetch issue").await?;
        let issue: GhIssue = resp
            .json()
            .await
            .context("Failed to parse GitHub issue response")?;
        Ok(issue.into())
    }

    async fn ensure_label(&self, name: &str) -> Result<()> {
        let url = self.repo_url(&format!("/labels/{}", urlencoding::encode(name)));
        let resp = self
            .request(Method::GET, &url)
            .send()
            .await
            .context("GitHub get label request failed")?;
        if resp.status() == StatusCode::NOT_FOUND {
            anyhow::bail!(
                "Label {name:?} does not exist in {}/{}",
                self.owner,
                self.repo
            );
        }
        ensure_success(resp, "get label").await?;
        Ok(())
    }

    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}/labels"));
        let resp = self
            .request(Method::POST, &url)
            .json(&AddLabelsRequest { labels })
            .send()
            .await
            .context("GitHub add labels request failed")?;
        ensure_success(resp, "add labels").await?;
        Ok(())
    }

    async fn remove_all_labels(&self, number: u64) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}/labels"));
        let resp = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .context("GitHub remove labels request failed")?;
        ensure_success(resp, "remove labels").await?;
        Ok(())
    }

    async fn set_state(&self, number: u64, state: IssueState) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}"));
        let resp = self
            .request(Method::PATCH, &url)
            .json(&UpdateStateRequest { state })
            .send()
            .await
            .context("GitHub update issue request failed")?;
        ensure_success(resp, "update issue").await?;
        Ok(())
    }

    async fn add_comment(&self, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}/comments"));
        let resp = self
            .request(Method::POST, &url)
            .json(&CommentRequest { body })
            .send()
            .await
            .context("GitHub create comment request failed")?;
        ensure_success(resp, "create comment").await?;
        Ok(())
    }
}
