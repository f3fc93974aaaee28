//! Domain DTOs for the facilities API.
//!
//! Field names and enum spellings follow the server's JSON: request
//! priorities are capitalized, every status is snake_case. Update types
//! (`*Update`) omit unset fields so a PATCH only touches what it names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// A complaint filed by a student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Complaint {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub status: ComplaintStatus,
    pub student_id: u64,
    pub assigned_to: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub student_id: u64,
}

/// Partial update. Omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplaintStatus>,
}

/// Priority labels are sent capitalized (`"Critical"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

/// A maintenance request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaintenanceRequest {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub requested_by: u64,
    pub assigned_to: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub priority: Priority,
    pub requested_by: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Student,
    Staff,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Staff {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: StaffRole,
    pub department: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub role: StaffRole,
    pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Body of the `/assign` endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub staff_id: u64,
}

/// Metadata for a file uploaded against a complaint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: u64,
    pub complaint_id: u64,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_serializes_capitalized() {
        assert_eq!(serde_json::to_value(Priority::Critical).unwrap(), json!("Critical"));
        assert!(Priority::Critical > Priority::High);
    }

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(serde_json::to_value(RequestStatus::InProgress).unwrap(), json!("in_progress"));
        assert_eq!(serde_json::to_value(ComplaintStatus::Resolved).unwrap(), json!("resolved"));
    }

    #[test]
    fn partial_update_omits_unset_fields() {
        let update = RequestUpdate {
            status: Some(RequestStatus::Completed),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"status": "completed"}));
    }

    #[test]
    fn complaint_decodes_unassigned() {
        let complaint: Complaint = serde_json::from_value(json!({
            "id": 3,
            "title": "Noisy radiator",
            "description": "Clanks all night",
            "category": "heating",
            "location": "Hall B 204",
            "status": "open",
            "student_id": 11,
            "assigned_to": null
        }))
        .unwrap();
        assert_eq!(complaint.status, ComplaintStatus::Open);
        assert!(complaint.assigned_to.is_none());
    }
}
