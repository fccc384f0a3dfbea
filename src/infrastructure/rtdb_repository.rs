// Realtime-database REST repository implementation
use crate::application::history_store::{DeviceDirectory, HistoryStore, KeyRange};
use crate::domain::sample::RecordSet;
use crate::infrastructure::config::StoreSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RtdbRepository {
    client: reqwest::Client,
    database_url: String,
    data_path: String,
    boards_path: String,
    auth_token: Option<String>,
    directory_poll: Duration,
}

impl RtdbRepository {
    pub fn new(settings: &StoreSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            database_url: settings.database_url.trim_end_matches('/').to_string(),
            data_path: settings.data_path.trim_matches('/').to_string(),
            boards_path: settings.boards_path.trim_matches('/').to_string(),
            auth_token: settings.auth_token.clone(),
            directory_poll: Duration::from_millis(settings.directory_poll_ms),
        })
    }

    /// `<database>/<path>.json`, with every path segment percent-encoded
    fn build_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        format!("{}/{}.json", self.database_url, encoded.join("/"))
    }

    fn data_url(&self, root: &str) -> String {
        self.build_url(&format!("{}/{}", self.data_path, root))
    }

    async fn execute_query(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut request = self.client.get(url).query(params);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to history store")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("History store query failed with status {}: {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse history store response")
    }

    async fn list_boards(&self) -> Result<Vec<String>> {
        let url = self.build_url(&self.boards_path);
        let value = self.execute_query(&url, &[]).await?;
        Ok(top_level_keys(value))
    }
}

/// Decode a collection payload into keyed records, keeping delivery order.
/// Arrays show up when every key is a small integer; their holes are skipped.
pub fn records_from_value(value: Value) -> Result<RecordSet> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect()),
        other => anyhow::bail!("Unexpected history payload: {}", other),
    }
}

fn top_level_keys(value: Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl HistoryStore for RtdbRepository {
    async fn fetch(&self, root: &str, range: Option<&KeyRange>) -> Result<RecordSet> {
        let url = self.data_url(root);
        let params: Vec<(&str, String)> = match range {
            Some(range) => vec![
                ("orderBy", "\"$key\"".to_string()),
                ("startAt", format!("\"{}\"", range.start)),
                ("endAt", format!("\"{}\"", range.end)),
            ],
            None => Vec::new(),
        };

        tracing::debug!("Fetching {} with {:?}", url, range);
        let value = self.execute_query(&url, &params).await?;
        records_from_value(value)
    }

    async fn list_roots(&self) -> Result<Vec<String>> {
        let url = self.build_url(&self.data_path);
        let value = self
            .execute_query(&url, &[("shallow", "true".to_string())])
            .await?;
        Ok(top_level_keys(value))
    }
}

#[async_trait]
impl DeviceDirectory for RtdbRepository {
    /// Polls the boards list; the first poll happens immediately.
    async fn watch(&self) -> Result<BoxStream<'static, Result<Vec<String>>>> {
        let first = self.list_boards().await?;
        let repo = self.clone();
        let rest = stream::unfold(repo, |repo| async move {
            tokio::time::sleep(repo.directory_poll).await;
            let update = repo.list_boards().await;
            Some((update, repo))
        });
        Ok(stream::once(async move { Ok(first) }).chain(rest).boxed())
    }
}
