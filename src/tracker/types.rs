//! Core work item type definitions
//!
//! Defines the tracked record, its role/status enumerations and the payloads
//! accepted by the create and update endpoints. Enum values travel as their
//! human-readable labels both on the wire (serde) and in the database (strum).

use chrono::{NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// The part a researcher plays on a manuscript or event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum Role {
    Reviewer,
    #[serde(rename = "Associate Editor")]
    #[strum(serialize = "Associate Editor")]
    AssociateEditor,
    #[serde(rename = "Session Chair")]
    #[strum(serialize = "Session Chair")]
    SessionChair,
    Author,
}

/// Where a work item is in its review lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum Status {
    Invited,
    Active,
    #[serde(rename = "In Review")]
    #[strum(serialize = "In Review")]
    InReview,
    #[serde(rename = "Pending Decision")]
    #[strum(serialize = "Pending Decision")]
    PendingDecision,
    Completed,
    Accepted,
    Rejected,
}

/// A single tracked piece of review work
///
/// `id` and both timestamps are assigned by the server on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Store-assigned primary key, never reused after deletion
    pub id: i64,
    pub title: String,
    /// Journal/conference manuscript number (e.g., "TPAMI-2024-0042")
    pub manuscript_id: Option<String>,
    /// Journal or conference name
    pub venue: Option<String>,
    pub role: Role,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    /// Set at creation; updates leave it alone
    pub updated_at: NaiveDateTime,
}

/// Request body for work item creation
///
/// Unknown fields, including any client-supplied `id` or timestamps, are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkItem {
    pub title: String,
    #[serde(default)]
    pub manuscript_id: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    pub role: Role,
    pub status: Status,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for partial updates
///
/// Outer `None` means "field not sent, leave it alone". For nullable columns
/// `Some(None)` means "clear it". Required columns cannot be cleared, so a
/// JSON `null` for `title`, `role` or `status` is a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkItemPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub manuscript_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub venue: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl WorkItemPatch {
    /// Merge every explicitly-sent field onto `item`
    ///
    /// `id` and the timestamps are never touched.
    pub fn apply_to(self, item: &mut WorkItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(manuscript_id) = self.manuscript_id {
            item.manuscript_id = manuscript_id;
        }
        if let Some(venue) = self.venue {
            item.venue = venue;
        }
        if let Some(role) = self.role {
            item.role = role;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(due_date) = self.due_date {
            item.due_date = due_date;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
    }

    /// True when the body carried no recognised field at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Deserialize a field that may be absent but must not be null
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize a field that may be absent, null, or a value
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Current UTC time at the precision both backends can store (microseconds)
///
/// Truncating up front keeps the record returned by create identical to a later fetch.
pub fn now_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_item() -> WorkItem {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        WorkItem {
            id: 7,
            title: "Review: Sparse attention".to_string(),
            manuscript_id: Some("TPAMI-2024-0042".to_string()),
            venue: Some("TPAMI".to_string()),
            role: Role::Reviewer,
            status: Status::Invited,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 15),
            notes: Some("second round".to_string()),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn enums_use_human_readable_labels() {
        assert_eq!(serde_json::to_string(&Role::AssociateEditor).unwrap(), "\"Associate Editor\"");
        assert_eq!(serde_json::to_string(&Status::PendingDecision).unwrap(), "\"Pending Decision\"");
        assert_eq!(Status::InReview.to_string(), "In Review");
        assert_eq!(Role::from_str("Session Chair").unwrap(), Role::SessionChair);
        assert_eq!(Status::from_str("Rejected").unwrap(), Status::Rejected);
    }

    #[test]
    fn serde_and_strum_labels_agree() {
        let statuses = [
            Status::Invited,
            Status::Active,
            Status::InReview,
            Status::PendingDecision,
            Status::Completed,
            Status::Accepted,
            Status::Rejected,
        ];
        for status in statuses {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json.as_str().unwrap(), status.to_string());
        }
        let roles = [Role::Reviewer, Role::AssociateEditor, Role::SessionChair, Role::Author];
        for role in roles {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json.as_str().unwrap(), role.to_string());
        }
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(serde_json::from_str::<Status>("\"Withdrawn\"").is_err());
        assert!(serde_json::from_str::<Role>("\"reviewer\"").is_err());
        assert!(Status::from_str("Archived").is_err());
    }

    #[test]
    fn new_item_ignores_client_id() {
        let json = r#"{"id": 99, "title": "T", "role": "Author", "status": "Active"}"#;
        let new_item: NewWorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(new_item.title, "T");
        assert_eq!(new_item.role, Role::Author);
        assert!(new_item.manuscript_id.is_none());
        assert!(new_item.due_date.is_none());
    }

    #[test]
    fn new_item_requires_title_role_status() {
        assert!(serde_json::from_str::<NewWorkItem>(r#"{"role": "Author", "status": "Active"}"#).is_err());
        assert!(serde_json::from_str::<NewWorkItem>(r#"{"title": "T", "status": "Active"}"#).is_err());
        assert!(serde_json::from_str::<NewWorkItem>(r#"{"title": "T", "role": "Author"}"#).is_err());
    }

    #[test]
    fn patch_distinguishes_absent_null_and_value() {
        let patch: WorkItemPatch =
            serde_json::from_str(r#"{"venue": null, "notes": "chased editor"}"#).unwrap();
        assert_eq!(patch.venue, Some(None));
        assert_eq!(patch.notes, Some(Some("chased editor".to_string())));
        assert_eq!(patch.manuscript_id, None);
        assert_eq!(patch.title, None);
    }

    #[test]
    fn patch_rejects_null_for_required_fields() {
        assert!(serde_json::from_str::<WorkItemPatch>(r#"{"title": null}"#).is_err());
        assert!(serde_json::from_str::<WorkItemPatch>(r#"{"status": null}"#).is_err());
    }

    #[test]
    fn apply_leaves_unsent_fields_and_id_alone() {
        let mut item = sample_item();
        let before = item.clone();
        let patch: WorkItemPatch =
            serde_json::from_str(r#"{"id": 1234, "status": "In Review", "venue": null}"#).unwrap();
        patch.apply_to(&mut item);

        assert_eq!(item.id, before.id);
        assert_eq!(item.status, Status::InReview);
        assert_eq!(item.venue, None);
        assert_eq!(item.title, before.title);
        assert_eq!(item.manuscript_id, before.manuscript_id);
        assert_eq!(item.role, before.role);
        assert_eq!(item.due_date, before.due_date);
        assert_eq!(item.notes, before.notes);
        assert_eq!(item.created_at, before.created_at);
        assert_eq!(item.updated_at, before.updated_at);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut item = sample_item();
        let patch: WorkItemPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
        patch.apply_to(&mut item);
        assert_eq!(item, sample_item());
    }

    #[test]
    fn work_item_wire_format() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "Reviewer");
        assert_eq!(json["due_date"], "2024-04-15");
        assert_eq!(json["created_at"], "2024-03-01T09:30:00");
    }

    #[test]
    fn timestamps_are_microsecond_precision() {
        use chrono::Timelike;
        assert_eq!(now_timestamp().nanosecond() % 1_000, 0);
    }
}
