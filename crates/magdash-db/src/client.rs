//! HTTP client for the hosted PostgREST-style backend.
//!
//! Tables live under `{base}/rest/v1/<table>`, database functions under
//! `{base}/rest/v1/rpc/<fn>` and serverless functions under
//! `{base}/functions/v1/<name>`. Every request carries the `apikey` header and
//! a matching bearer token when a key is configured.

use std::fmt::Display;
use std::time::Duration;

use magdash_core::AppConfig;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::DbError;

const REST_PREFIX: &str = "rest/v1/";
const RPC_PREFIX: &str = "rest/v1/rpc/";
const FUNCTIONS_PREFIX: &str = "functions/v1/";

/// Handle to the hosted backend. Cheap to clone.
///
/// A client built without a base URL is valid but every call fails with
/// [`DbError::NotConfigured`].
#[derive(Clone)]
pub struct HostedClient {
    http: Client,
    base_url: Option<Url>,
    api_key: Option<String>,
}

impl std::fmt::Debug for HostedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedClient")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl HostedClient {
    /// # Errors
    ///
    /// Returns [`DbError::Http`] if the `reqwest::Client` cannot be built.
    ///
    /// A `base_url` that does not parse is logged and left unset, so the
    /// client runs unconfigured instead of failing startup.
    pub fn new(
        base_url: Option<&str>,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, DbError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("magdash/0.1")
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.and_then(|raw| {
                parse_base_url(raw)
                    .inspect_err(|e| tracing::warn!(error = %e, "hosted URL ignored"))
                    .ok()
            }),
            api_key: api_key.map(str::to_owned),
        })
    }

    /// # Errors
    ///
    /// See [`HostedClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, DbError> {
        Self::new(
            config.hosted_url.as_deref(),
            config.hosted_anon_key.as_deref(),
            config.http_timeout_secs,
        )
    }

    /// Client pointed at an explicit base URL, e.g. a wiremock server.
    ///
    /// # Errors
    ///
    /// See [`HostedClient::new`].
    pub fn with_base_url(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, DbError> {
        Self::new(Some(base_url), Some(api_key), timeout_secs)
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Start a query against `table`.
    #[must_use]
    pub fn table(&self, name: &str) -> Query<'_> {
        Query {
            client: self,
            table: name.to_string(),
            params: Vec::new(),
            filtered: false,
        }
    }

    /// Call a database function through `rest/v1/rpc/<function>`.
    ///
    /// An empty response body deserializes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Api`] on a non-2xx status, [`DbError::Http`] on
    /// transport failure, or [`DbError::Deserialize`] if the body does not
    /// match `T`.
    pub async fn rpc<P, T>(&self, function: &str, params: &P) -> Result<T, DbError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&format!("{RPC_PREFIX}{function}"))?;
        let response = execute(self.request(Method::POST, url).json(params)).await?;
        read_json(response, &format!("rpc {function}")).await
    }

    /// Invoke a serverless function and return its JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`HostedClient::rpc`].
    pub async fn invoke_function<B>(&self, name: &str, body: &B) -> Result<Value, DbError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(&format!("{FUNCTIONS_PREFIX}{name}"))?;
        let response = execute(self.request(Method::POST, url).json(body)).await?;
        read_json(response, &format!("function {name}")).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, DbError> {
        let base = self.base_url.as_ref().ok_or(DbError::NotConfigured)?;
        base.join(path).map_err(|e| DbError::InvalidBaseUrl {
            url: format!("{base}{path}"),
            reason: e.to_string(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }
}

/// A PostgREST query under construction.
///
/// Filters append `column=op.value` pairs. Repeated columns are allowed, so
/// `gte` and `lte` on the same column form a range.
#[derive(Debug)]
pub struct Query<'a> {
    client: &'a HostedClient,
    table: String,
    params: Vec<(String, String)>,
    filtered: bool,
}

impl Query<'_> {
    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("eq.{value}"))
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("gte.{value}"))
    }

    #[must_use]
    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("lte.{value}"))
    }

    /// `column=in.(a,b)`. Values containing reserved characters are quoted.
    #[must_use]
    pub fn in_list(self, column: &str, values: &[String]) -> Self {
        let list = values
            .iter()
            .map(|v| quote_list_value(v))
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, format!("in.({list})"))
    }

    /// Scope to `store_ids` when the list is non-empty, otherwise leave the
    /// query unscoped.
    #[must_use]
    pub fn in_stores(self, store_ids: &[String]) -> Self {
        if store_ids.is_empty() {
            self
        } else {
            self.in_list("store_id", store_ids)
        }
    }

    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is.null".to_string())
    }

    #[must_use]
    pub fn not_null(self, column: &str) -> Self {
        self.filter(column, "not.is.null".to_string())
    }

    #[must_use]
    pub fn order(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.param("order", format!("{column}.{direction}"))
    }

    #[must_use]
    pub fn limit(self, n: usize) -> Self {
        self.param("limit", n.to_string())
    }

    /// Full request URL for this query.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotConfigured`] when the client has no base URL.
    pub fn url(&self) -> Result<Url, DbError> {
        let mut url = self
            .client
            .endpoint(&format!("{REST_PREFIX}{}", self.table))?;
        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Run the query and return every matching row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on configuration, transport, API or decode failure.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, DbError> {
        let url = self.url()?;
        let context = format!("select {}", self.table);
        let response = execute(self.client.request(Method::GET, url)).await?;
        let rows: Option<Vec<T>> = read_json(response, &context).await?;
        Ok(rows.unwrap_or_default())
    }

    /// First matching row, if any.
    ///
    /// # Errors
    ///
    /// See [`Query::fetch`].
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, DbError> {
        let rows: Vec<T> = self.limit(1).fetch().await?;
        Ok(rows.into_iter().next())
    }

    /// Exact row count from the `Content-Range` header. `None` when the
    /// backend does not report a total.
    ///
    /// # Errors
    ///
    /// See [`Query::fetch`].
    pub async fn count(self) -> Result<Option<u64>, DbError> {
        let url = self.url()?;
        let response = execute(
            self.client
                .request(Method::HEAD, url)
                .header("Prefer", "count=exact"),
        )
        .await?;
        Ok(response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total))
    }

    /// Insert `body` and return the stored rows.
    ///
    /// # Errors
    ///
    /// See [`Query::fetch`].
    pub async fn insert<B, T>(self, body: &B) -> Result<Vec<T>, DbError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.write(Method::POST, body).await
    }

    /// Update the filtered rows and return them as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnscopedMutation`] when no filter was applied, plus
    /// the errors of [`Query::fetch`].
    pub async fn update<B, T>(self, body: &B) -> Result<Vec<T>, DbError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !self.filtered {
            return Err(DbError::UnscopedMutation("update"));
        }
        self.write(Method::PATCH, body).await
    }

    /// Delete the filtered rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnscopedMutation`] when no filter was applied, plus
    /// the errors of [`Query::fetch`].
    pub async fn delete(self) -> Result<(), DbError> {
        if !self.filtered {
            return Err(DbError::UnscopedMutation("delete"));
        }
        let url = self.url()?;
        execute(self.client.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn write<B, T>(self, method: Method, body: &B) -> Result<Vec<T>, DbError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url()?;
        let context = format!("{method} {}", self.table);
        let response = execute(
            self.client
                .request(method, url)
                .header("Prefer", "return=representation")
                .json(body),
        )
        .await?;
        let rows: Option<Vec<T>> = read_json(response, &context).await?;
        Ok(rows.unwrap_or_default())
    }

    fn filter(mut self, column: &str, expr: String) -> Self {
        self.filtered = true;
        self.params.push((column.to_string(), expr));
        self
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value));
        self
    }
}

async fn execute(builder: RequestBuilder) -> Result<Response, DbError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

fn parse_base_url(raw: &str) -> Result<Url, DbError> {
    // A single trailing slash makes `Url::join` append rather than replace.
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| DbError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, DbError> {
    let body = response.text().await?;
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| DbError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

fn api_error(status: u16, body: &str) -> DbError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let message = field("message")
        .or_else(|| field("error"))
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("request failed with status {status}")
            } else {
                body.to_string()
            }
        });
    DbError::Api {
        status,
        code: field("code"),
        message,
    }
}

fn quote_list_value(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.parse().ok()
}
