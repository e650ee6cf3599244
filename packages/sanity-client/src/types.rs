use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a `data/mutate` call.
#[derive(Debug, Clone, Serialize)]
pub struct MutateRequest {
    pub mutations: Vec<Mutation>,
}

/// A single mutation. Serializes to `{"create": {...}}` or `{"patch": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Create(Value),
    Patch(Patch),
}

#[derive(Debug, Clone, Serialize)]
pub struct Patch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutationResult {
    pub id: String,
    pub operation: Option<String>,
    pub document: Option<Value>,
}

/// Response of `data/doc/{dataset}/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Value>,
}

/// Body of a POST `data/query` call.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub params: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse<T> {
    pub result: T,
    pub ms: Option<u64>,
}
