//! Pure Airtable REST API client.
//!
//! Covers the handful of record operations a CRM mirror needs: filtered
//! listing (with pagination), creating rows and patching rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use airtable_client::{field_equals, AirtableClient, AirtableOptions, ListOptions};
//!
//! let client = AirtableClient::new(AirtableOptions {
//!     base_id: "appXXXX".into(),
//!     token: "pat...".into(),
//!     timeout: None,
//! })?;
//!
//! let rows = client
//!     .list_records("Submissions", &ListOptions {
//!         filter_by_formula: Some(field_equals("Email", "a@b.com")),
//!         max_records: Some(1),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{AirtableError, Result};
pub use types::{Direction, Fields, ListOptions, Record};

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use types::{CreateRecords, NewRecord, RecordList, UpdateRecord};

const BASE_URL: &str = "https://api.airtable.com/v0";

#[derive(Debug, Clone)]
pub struct AirtableOptions {
    pub base_id: String,
    pub token: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct AirtableClient {
    client: Client,
    base_id: String,
    token: String,
    base_url: String,
}

/// Build an equality formula, e.g. `{Email} = "a@b.com"`.
///
/// The value is escaped so user-supplied text cannot break out of the string literal.
pub fn field_equals(column: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{{{}}} = \"{}\"", column, escaped)
}

impl AirtableClient {
    pub fn new(options: AirtableOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_id: options.base_id,
            token: options.token,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.base_id,
            urlencoding::encode(table)
        )
    }

    fn record_url(&self, table: &str, record_id: &str) -> String {
        format!("{}/{}", self.table_url(table), urlencoding::encode(record_id))
    }

    fn list_query(options: &ListOptions, offset: Option<&str>) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(formula) = &options.filter_by_formula {
            query.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(max) = options.max_records {
            query.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some((field, direction)) = &options.sort {
            query.push(("sort[0][field]".to_string(), field.clone()));
            query.push(("sort[0][direction]".to_string(), direction.as_str().to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AirtableError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }

    /// List records, following `offset` pagination until exhausted.
    pub async fn list_records(&self, table: &str, options: &ListOptions) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let response = self
                .client
                .get(self.table_url(table))
                .bearer_auth(&self.token)
                .query(&Self::list_query(options, offset.as_deref()))
                .send()
                .await?;

            let page: RecordList = Self::check(response).await?.json().await?;
            records.extend(page.records);

            match page.offset {
                Some(next) if options.max_records.map_or(true, |max| records.len() < max as usize) => {
                    offset = Some(next);
                }
                _ => break,
            }
        }

        debug!(table, count = records.len(), "Listed Airtable records");
        Ok(records)
    }

    pub async fn create_record(&self, table: &str, fields: Fields) -> Result<Record> {
        let body = CreateRecords {
            records: vec![NewRecord { fields }],
            typecast: true,
        };

        let response = self
            .client
            .post(self.table_url(table))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let created: RecordList = Self::check(response).await?.json().await?;
        created
            .records
            .into_iter()
            .next()
            .ok_or_else(|| AirtableError::EmptyResponse(table.to_string()))
    }

    /// Patch the given columns; columns not present in `fields` are left untouched.
    pub async fn update_record(&self, table: &str, record_id: &str, fields: Fields) -> Result<Record> {
        let body = UpdateRecord {
            fields,
            typecast: true,
        };

        let response = self
            .client
            .patch(self.record_url(table, record_id))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AirtableClient {
        AirtableClient::new(AirtableOptions {
            base_id: "appBASE".into(),
            token: "pat".into(),
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn formula_quotes_value() {
        assert_eq!(field_equals("Email", "a@b.com"), r#"{Email} = "a@b.com""#);
    }

    #[test]
    fn formula_escapes_quotes_and_backslashes() {
        assert_eq!(
            field_equals("Email", r#"x" OR 1=1 OR "\"#),
            r#"{Email} = "x\" OR 1=1 OR \"\\""#
        );
    }

    #[test]
    fn table_names_are_encoded() {
        let client = client();
        assert_eq!(
            client.table_url("Event Registrations"),
            "https://api.airtable.com/v0/appBASE/Event%20Registrations"
        );
        assert_eq!(
            client.record_url("Submissions", "rec123"),
            "https://api.airtable.com/v0/appBASE/Submissions/rec123"
        );
    }

    #[test]
    fn list_query_includes_sort_and_offset() {
        let options = ListOptions {
            filter_by_formula: Some(field_equals("Email", "a@b.com")),
            max_records: Some(1),
            sort: Some(("JoinedDate".into(), Direction::Desc)),
        };
        let query = AirtableClient::list_query(&options, Some("itr1"));
        let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "filterByFormula",
                "maxRecords",
                "sort[0][field]",
                "sort[0][direction]",
                "offset"
            ]
        );
        assert_eq!(query[3].1, "desc");
    }

    #[test]
    fn record_text_reads_string_cells() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "id": "rec1",
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": {"Email": "a@b.com", "Count": 3}
        }))
        .unwrap();
        assert_eq!(record.text("Email"), Some("a@b.com"));
        assert_eq!(record.text("Count"), None);
        assert_eq!(record.text("Missing"), None);
    }
}
