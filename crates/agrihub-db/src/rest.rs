//! PostgREST-dialect client for the hosted row store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::DbError;
use crate::query::{Query, RowStore};

/// Error body returned by the backend on a rejected request.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestStore {
    http: Client,
    rest_base: Url,
    api_key: String,
}

impl RestStore {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// `project_url` is the project root (`https://<ref>.supabase.co`); the
    /// REST endpoint lives under `/rest/v1/`.
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Result<Self, DbError> {
        let mut base = Url::parse(project_url).map_err(|e| DbError::InvalidUrl(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|e| DbError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("agrihub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DbError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            rest_base,
            api_key: api_key.into(),
        })
    }

    pub fn rest_base(&self) -> &Url {
        &self.rest_base
    }

    /// Query-string parameters for `query`, in PostgREST syntax.
    pub fn query_pairs(query: &Query) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), query.select_clause())];
        for filter in &query.filters {
            pairs.push((
                filter.column.to_string(),
                format!("eq.{}", param_value(&filter.value)),
            ));
        }
        if let Some(order) = query.order {
            let dir = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = query.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    fn table_url(&self, query: &Query) -> Result<Url, DbError> {
        let mut url = self
            .rest_base
            .join(query.table)
            .map_err(|e| DbError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().extend_pairs(Self::query_pairs(query));
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn returning(&self, req: RequestBuilder) -> RequestBuilder {
        self.authorize(req).header("Prefer", "return=representation")
    }

    async fn rows(&self, req: RequestBuilder) -> Result<Vec<Value>, DbError> {
        let res = req.send().await?;
        match read_body(res).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

#[async_trait]
impl RowStore for RestStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, DbError> {
        let url = self.table_url(query)?;
        debug!(table = query.table, "select");
        self.rows(self.authorize(self.http.get(url))).await
    }

    async fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>, DbError> {
        let url = self.table_url(query)?;
        debug!(table = query.table, count = rows.len(), "insert");
        self.rows(self.returning(self.http.post(url)).json(&rows)).await
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, DbError> {
        let url = self.table_url(query)?;
        debug!(table = query.table, "update");
        self.rows(self.returning(self.http.patch(url)).json(&patch)).await
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>, DbError> {
        let url = self.table_url(query)?;
        debug!(table = query.table, "delete");
        self.rows(self.returning(self.http.delete(url))).await
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, DbError> {
        let url = self
            .rest_base
            .join(&format!("rpc/{function}"))
            .map_err(|e| DbError::InvalidUrl(e.to_string()))?;
        let res = self.authorize(self.http.post(url)).json(&args).send().await?;
        read_body(res).await
    }
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn read_body(res: Response) -> Result<Value, DbError> {
    let status = res.status();

    if status.is_success() {
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = res.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text)?);
    }

    let status = status.as_u16();
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                format!("http {status}")
            } else {
                text
            }
        });

    Err(DbError::Backend { status, message })
}
