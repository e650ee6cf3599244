use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::kernel::{BaseRelationalSync, CrmRecord};

pub const MEMBERS_TABLE: &str = "Members";

/// Member model - CRM persistence layer
///
/// Members live only in the CRM; `id` is the CRM row id and `member_id` the
/// `MBR-` code handed to the member.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub member_id: String,
    pub status: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub interests: String,
    pub website: String,
    pub bio: String,
    pub joined_date: String,
}

impl Member {
    fn to_fields(&self) -> Map<String, Value> {
        [
            ("MemberId", &self.member_id),
            ("Status", &self.status),
            ("Name", &self.name),
            ("Email", &self.email),
            ("Role", &self.role),
            ("Interests", &self.interests),
            ("Website", &self.website),
            ("Bio", &self.bio),
            ("JoinedDate", &self.joined_date),
        ]
        .into_iter()
        .map(|(column, value)| (column.to_string(), Value::String(value.clone())))
        .collect()
    }

    fn from_record(record: CrmRecord) -> Self {
        let status = match record.text("Status") {
            s if s.is_empty() => "active".to_string(),
            s => s,
        };
        Self {
            member_id: record.text("MemberId"),
            status,
            name: record.text("Name"),
            email: record.text("Email"),
            role: record.text("Role"),
            interests: record.text("Interests"),
            website: record.text("Website"),
            bio: record.text("Bio"),
            joined_date: record.text("JoinedDate"),
            id: record.id,
        }
    }

    /// Insert a new member row
    pub async fn insert(&self, crm: &dyn BaseRelationalSync) -> Result<Self> {
        let record = crm.create_record(MEMBERS_TABLE, self.to_fields()).await?;
        Ok(Self::from_record(record))
    }

    /// All members, most recently joined first
    pub async fn find_all(crm: &dyn BaseRelationalSync) -> Result<Vec<Self>> {
        let records = crm.list_records(MEMBERS_TABLE, Some("JoinedDate")).await?;
        Ok(records.into_iter().map(Self::from_record).collect())
    }
}
