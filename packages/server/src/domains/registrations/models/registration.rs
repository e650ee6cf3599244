use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::kernel::{BaseRelationalSync, CrmRecord};

pub const REGISTRATIONS_TABLE: &str = "EventRegistrations";

/// Event registration model - CRM persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub id: String,
    pub registration_number: String,
    pub status: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event_name: String,
    pub event_date: String,
    pub notes: String,
    pub registered_date: String,
}

impl EventRegistration {
    fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        let mut put = |column: &str, value: &str| {
            fields.insert(column.to_string(), Value::String(value.to_string()));
        };
        put("RegistrationNumber", &self.registration_number);
        put("Status", &self.status);
        put("Name", &self.name);
        put("Email", &self.email);
        put("Phone", &self.phone);
        put("EventName", &self.event_name);
        put("EventDate", &self.event_date);
        put("AdditionalNotes", &self.notes);
        put("RegisteredDate", &self.registered_date);
        fields
    }

    fn from_record(record: CrmRecord) -> Self {
        let status = Some(record.text("Status"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "confirmed".to_string());
        Self {
            registration_number: record.text("RegistrationNumber"),
            status,
            name: record.text("Name"),
            email: record.text("Email"),
            phone: record.text("Phone"),
            event_name: record.text("EventName"),
            event_date: record.text("EventDate"),
            notes: record.text("AdditionalNotes"),
            registered_date: record.text("RegisteredDate"),
            id: record.id,
        }
    }

    pub async fn insert(&self, crm: &dyn BaseRelationalSync) -> Result<Self> {
        let record = crm.create_record(REGISTRATIONS_TABLE, self.to_fields()).await?;
        Ok(Self::from_record(record))
    }

    /// All registrations, most recent first
    pub async fn find_all(crm: &dyn BaseRelationalSync) -> Result<Vec<Self>> {
        let records = crm
            .list_records(REGISTRATIONS_TABLE, Some("RegisteredDate"))
            .await?;
        Ok(records.into_iter().map(Self::from_record).collect())
    }
}
