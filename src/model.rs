//! Data models for the client follow-up application
//!
//! This module defines all the data structures used throughout the
//! application: the two stored record types, the form payloads the views
//! accept, the declared form schemas, and the JSON view-models the two
//! views render.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// A customer/company record as stored in the `clients` table.
///
/// Only the company name is required. All other fields are optional and are
/// stored as absent rather than as empty strings, so deserialization maps a
/// missing key to `None`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Client {
    /// Opaque unique identifier assigned by the gateway on insert
    pub id: String,

    /// Company name, trimmed, unique among clients ignoring case
    pub company_name: String,

    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub contact_name: Option<String>,
    pub website: Option<String>,
    pub map_link: Option<String>,
    pub folder_link: Option<String>,
}

/// One logged follow-up event, owned by exactly one client.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Activity {
    pub id: String,

    /// Identifier of the owning client
    pub client_id: String,

    pub activity_type: String,
    pub result: String,

    /// Calendar date of the follow-up, `YYYY-MM-DD` on the wire
    pub date: NaiveDate,

    pub notes: Option<String>,
}

/// Describes one input of a form: which record field it maps to, the label
/// rendered next to it, and whether submission requires it.
///
/// Both views render their forms from an ordered list of these descriptors
/// instead of hard-coding the inputs.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
}

/// Ordered client form schema. Labels are the Arabic UI strings.
pub const CLIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "company_name", label: "اسم الشركة", required: true },
    FieldSpec { key: "contact_name", label: "الاسم الشخصي", required: false },
    FieldSpec { key: "city", label: "المدينة", required: false },
    FieldSpec { key: "phone", label: "رقم الهاتف", required: false },
    FieldSpec { key: "email", label: "الإيميل", required: false },
    FieldSpec { key: "website", label: "رابط الموقع", required: false },
    FieldSpec { key: "map_link", label: "رابط الخريطة", required: false },
    FieldSpec { key: "folder_link", label: "رابط المجلد", required: false },
];

/// Ordered activity form schema.
pub const ACTIVITY_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "activity_type", label: "نوع المتابعة", required: true },
    FieldSpec { key: "result", label: "النتيجة", required: true },
    FieldSpec { key: "date", label: "التاريخ", required: true },
    FieldSpec { key: "notes", label: "ملاحظات", required: false },
];

/// Client form values exactly as typed by the user.
///
/// Every field is a plain string; trimming and empty-to-absent conversion
/// happen in [`ClientForm::clean`] right before the record is persisted.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ClientForm {
    pub company_name: String,
    pub contact_name: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub map_link: String,
    pub folder_link: String,
}

impl ClientForm {
    /// Normalizes the form into a gateway record: every field trimmed,
    /// blank fields serialized as `null` so the gateway drops them.
    pub fn clean(&self) -> ClientPayload {
        ClientPayload {
            company_name: clean_field(&self.company_name),
            contact_name: clean_field(&self.contact_name),
            city: clean_field(&self.city),
            phone: clean_field(&self.phone),
            email: clean_field(&self.email),
            website: clean_field(&self.website),
            map_link: clean_field(&self.map_link),
            folder_link: clean_field(&self.folder_link),
        }
    }

    /// Pre-fills the form from a cached record for editing.
    pub fn from_client(client: &Client) -> Self {
        ClientForm {
            company_name: client.company_name.clone(),
            contact_name: client.contact_name.clone().unwrap_or_default(),
            city: client.city.clone().unwrap_or_default(),
            phone: client.phone.clone().unwrap_or_default(),
            email: client.email.clone().unwrap_or_default(),
            website: client.website.clone().unwrap_or_default(),
            map_link: client.map_link.clone().unwrap_or_default(),
            folder_link: client.folder_link.clone().unwrap_or_default(),
        }
    }
}

/// Normalized client record sent to the gateway. `None` serializes as
/// `null`, which the gateway treats as "clear this field".
#[derive(Serialize, Debug, Clone)]
pub struct ClientPayload {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub map_link: Option<String>,
    pub folder_link: Option<String>,
}

/// Activity form values as typed, date included as its raw string.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ActivityForm {
    pub activity_type: String,
    pub result: String,
    pub date: String,
    pub notes: String,
}

impl ActivityForm {
    /// Pre-fills the form from a cached activity for editing.
    pub fn from_activity(activity: &Activity) -> Self {
        ActivityForm {
            activity_type: activity.activity_type.clone(),
            result: activity.result.clone(),
            date: activity.date.to_string(),
            notes: activity.notes.clone().unwrap_or_default(),
        }
    }
}

/// Normalized activity record sent to the gateway, already carrying the
/// owning client id.
#[derive(Serialize, Debug, Clone)]
pub struct ActivityPayload {
    pub client_id: String,
    pub activity_type: String,
    pub result: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

fn clean_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Query parameters accepted by the client list view.
#[derive(Deserialize)]
pub struct SearchParams {
    /// Search term matched against company name and city
    pub q: Option<String>,
}

/// Body of a delete request. Deletion only proceeds when the user has
/// explicitly confirmed it.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ConfirmPayload {
    pub confirm: bool,
}

/// JSON view-model of the client list view.
#[derive(Serialize)]
pub struct ClientListView {
    pub theme: Theme,
    pub search: String,
    pub show_form: bool,
    /// Id of the client being edited, `null` in create mode
    pub editing: Option<String>,
    pub fields: &'static [FieldSpec],
    pub form: ClientForm,
    /// Id of the single expanded client, if any
    pub expanded: Option<String>,
    /// Cached collection filtered by the search term
    pub clients: Vec<Client>,
    /// Size of the unfiltered cached collection
    pub total: usize,
}

/// JSON view-model of the activity log view.
#[derive(Serialize)]
pub struct ActivityLogView {
    pub theme: Theme,
    pub client_id: Option<String>,
    pub client_name: String,
    pub editing: Option<String>,
    pub fields: &'static [FieldSpec],
    pub form: ActivityForm,
    pub activities: Vec<Activity>,
}
