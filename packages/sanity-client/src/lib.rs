//! Pure Sanity HTTP API client.
//!
//! A minimal client for the Sanity content lake. Supports creating documents,
//! patching fields, fetching a document by id and running GROQ queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use sanity_client::{SanityClient, SanityOptions};
//!
//! let client = SanityClient::new(SanityOptions {
//!     project_id: "abc123".into(),
//!     dataset: "production".into(),
//!     api_version: "2023-12-01".into(),
//!     token: Some("sk...".into()),
//!     timeout: None,
//! })?;
//!
//! let approved: Vec<serde_json::Value> = client
//!     .query(r#"*[_type == $type && status == "approved"]"#, [("type", "gallerySubmission".into())])
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, SanityError};
pub use types::{Mutation, MutateResponse, Patch};

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use types::{DocumentsResponse, MutateRequest, QueryRequest, QueryResponse};

#[derive(Debug, Clone)]
pub struct SanityOptions {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    /// Upper bound for every request made by this client.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SanityClient {
    http_client: Client,
    options: SanityOptions,
    base_url: String,
}

impl SanityClient {
    pub fn new(options: SanityOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = format!(
            "https://{}.api.sanity.io/v{}",
            options.project_id, options.api_version
        );

        Ok(Self {
            http_client: builder.build()?,
            options,
            base_url,
        })
    }

    /// Point the client at a different host (proxies, local fakes).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn dataset(&self) -> &str {
        &self.options.dataset
    }

    fn mutate_url(&self) -> String {
        format!(
            "{}/data/mutate/{}?returnIds=true&returnDocuments=true",
            self.base_url, self.options.dataset
        )
    }

    /// Ids are percent-encoded so `a,b` cannot become a multi-document fetch.
    fn doc_url(&self, id: &str) -> String {
        format!(
            "{}/data/doc/{}/{}",
            self.base_url,
            self.options.dataset,
            urlencoding::encode(id)
        )
    }

    fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.base_url, self.options.dataset)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.options.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }

    /// Run a batch of mutations in one transaction.
    pub async fn mutate(&self, mutations: Vec<Mutation>) -> Result<MutateResponse> {
        let request = MutateRequest { mutations };
        let response = self
            .authorize(self.http_client.post(self.mutate_url()))
            .json(&request)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let body: MutateResponse = response.json().await?;
        debug!(transaction_id = %body.transaction_id, results = body.results.len(), "Sanity mutation committed");
        Ok(body)
    }

    /// Create a document and return it as stored (with `_id`, `_createdAt`, ...).
    pub async fn create(&self, document: Value) -> Result<Value> {
        let body = self.mutate(vec![Mutation::Create(document)]).await?;
        body.results
            .into_iter()
            .next()
            .and_then(|result| result.document)
            .ok_or_else(|| SanityError::MissingDocument(body.transaction_id))
    }

    /// Set and unset fields on an existing document, returning the patched document.
    pub async fn patch(&self, id: &str, set: Option<Value>, unset: Vec<String>) -> Result<Value> {
        let patch = Patch {
            id: id.to_string(),
            set,
            unset,
        };
        let body = self.mutate(vec![Mutation::Patch(patch)]).await?;
        body.results
            .into_iter()
            .find(|result| result.id == id)
            .and_then(|result| result.document)
            .ok_or_else(|| SanityError::MissingDocument(id.to_string()))
    }

    /// Fetch a single document. Returns `None` when no document has this id.
    pub async fn get_document(&self, id: &str) -> Result<Option<Value>> {
        let response = self
            .authorize(self.http_client.get(self.doc_url(id)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        let body: DocumentsResponse = response.json().await?;
        Ok(body.documents.into_iter().next())
    }

    /// Run a GROQ query. Parameters are referenced as `$name` inside the query.
    pub async fn query<T, K, P>(&self, groq: &str, params: P) -> Result<T>
    where
        T: DeserializeOwned,
        K: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
    {
        let request = QueryRequest {
            query: groq,
            params: params
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        };

        let response = self
            .authorize(self.http_client.post(self.query_url()))
            .json(&request)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let body: QueryResponse<T> = response.json().await?;
        debug!(ms = ?body.ms, "Sanity query completed");
        Ok(body.result)
    }
}
