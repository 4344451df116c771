//! # Missions Module
//!
//! Missions are the marketplace's work orders: created and assigned by
//! admins, accepted/rejected/completed by technicians.
//!
//! ## Mission Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MISSION LIFECYCLE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   proposed ──► accepted ──► in_progress ──► completed                  │
//! │      │                                                                  │
//! │      └──────► rejected   (terminal alternative)                         │
//! │                                                                         │
//! │  The arrows are the expected path only. Transitions are caller-driven  │
//! │  via update_mission_status and nothing enforces the order — any        │
//! │  status can be set from any other, matching the app's behavior.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Lifecycle status of a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Created, waiting for the assigned technician's answer
    Proposed,
    /// Technician accepted
    Accepted,
    /// Work has started
    InProgress,
    /// Work is done
    Completed,
    /// Technician declined
    Rejected,
}

impl MissionStatus {
    /// Convert to the persisted string
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Proposed => "proposed",
            MissionStatus::Accepted => "accepted",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Completed => "completed",
            MissionStatus::Rejected => "rejected",
        }
    }

    /// Parse from the persisted string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "proposed" => Some(MissionStatus::Proposed),
            "accepted" => Some(MissionStatus::Accepted),
            "in_progress" => Some(MissionStatus::InProgress),
            "completed" => Some(MissionStatus::Completed),
            "rejected" => Some(MissionStatus::Rejected),
            _ => None,
        }
    }
}

/// How urgently a mission needs staffing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Can wait
    Low,
    /// Normal priority
    Medium,
    /// Needs a technician now
    High,
}

impl Urgency {
    /// Convert to the persisted string
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    /// Parse from the persisted string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            _ => None,
        }
    }
}

/// A mission record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    /// Sequentially assigned unique id
    pub id: i64,
    /// Short title shown in lists
    pub title: String,
    /// Full description
    pub description: String,
    /// City / site name
    pub location: String,
    /// Street address
    pub address: String,
    /// Planned start, ISO date string
    pub start_date: String,
    /// Planned end, ISO date string
    pub end_date: String,
    /// Duration in days
    pub duration: i64,
    /// Budget in the app's display currency
    pub budget: f64,
    /// Staffing urgency
    pub urgency: Urgency,
    /// Required skills, comma-joined as entered (not a normalized set)
    pub skills: String,
    /// Lifecycle status
    pub status: MissionStatus,
    /// Assigned technician, if any; may dangle after a user delete
    pub assigned_to_user_id: Option<i64>,
    /// Creating admin
    pub created_by_user_id: i64,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Payload for the admin create-mission panel
#[derive(Debug, Clone)]
pub struct NewMission {
    /// Short title
    pub title: String,
    /// Full description
    pub description: String,
    /// City / site name
    pub location: String,
    /// Street address
    pub address: String,
    /// Planned start, ISO date string
    pub start_date: String,
    /// Planned end, ISO date string
    pub end_date: String,
    /// Duration in days
    pub duration: i64,
    /// Budget
    pub budget: f64,
    /// Staffing urgency
    pub urgency: Urgency,
    /// Required skills, comma-joined
    pub skills: String,
    /// Assigned technician, if already chosen
    pub assigned_to_user_id: Option<i64>,
    /// Creating admin
    pub created_by_user_id: i64,
}

/// Partial update for the admin edit-mission panel
///
/// `None` fields are left untouched; the assignment is doubly optional so
/// `Some(None)` can unassign.
#[derive(Debug, Clone, Default)]
pub struct MissionUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New address
    pub address: Option<String>,
    /// New start date
    pub start_date: Option<String>,
    /// New end date
    pub end_date: Option<String>,
    /// New duration in days
    pub duration: Option<i64>,
    /// New budget
    pub budget: Option<f64>,
    /// New urgency
    pub urgency: Option<Urgency>,
    /// New skills string
    pub skills: Option<String>,
    /// New status
    pub status: Option<MissionStatus>,
    /// Assign (`Some(Some(id))`) or unassign (`Some(None)`)
    pub assigned_to_user_id: Option<Option<i64>>,
}

impl MissionUpdate {
    /// Apply this update to a mission record in place
    pub fn apply(&self, mission: &mut Mission) {
        if let Some(ref title) = self.title {
            mission.title = title.clone();
        }
        if let Some(ref description) = self.description {
            mission.description = description.clone();
        }
        if let Some(ref location) = self.location {
            mission.location = location.clone();
        }
        if let Some(ref address) = self.address {
            mission.address = address.clone();
        }
        if let Some(ref start_date) = self.start_date {
            mission.start_date = start_date.clone();
        }
        if let Some(ref end_date) = self.end_date {
            mission.end_date = end_date.clone();
        }
        if let Some(duration) = self.duration {
            mission.duration = duration;
        }
        if let Some(budget) = self.budget {
            mission.budget = budget;
        }
        if let Some(urgency) = self.urgency {
            mission.urgency = urgency;
        }
        if let Some(ref skills) = self.skills {
            mission.skills = skills.clone();
        }
        if let Some(status) = self.status {
            mission.status = status;
        }
        if let Some(assigned) = self.assigned_to_user_id {
            mission.assigned_to_user_id = assigned;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mission() -> Mission {
        Mission {
            id: 3,
            title: "HVAC inspection".into(),
            description: "Quarterly rooftop unit inspection".into(),
            location: "Lyon".into(),
            address: "12 Rue de la République".into(),
            start_date: "2026-09-01".into(),
            end_date: "2026-09-03".into(),
            duration: 3,
            budget: 1200.0,
            urgency: Urgency::Medium,
            skills: "hvac,electrical".into(),
            status: MissionStatus::Proposed,
            assigned_to_user_id: Some(2),
            created_by_user_id: 1,
            created_at: "2026-08-20T08:30:00.000Z".into(),
        }
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(MissionStatus::InProgress.as_str(), "in_progress");
        assert_eq!(MissionStatus::parse("completed"), Some(MissionStatus::Completed));
        assert_eq!(MissionStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_urgency_strings() {
        assert_eq!(Urgency::High.as_str(), "high");
        assert_eq!(Urgency::parse("low"), Some(Urgency::Low));
        assert_eq!(Urgency::parse("urgent"), None);
    }

    #[test]
    fn test_mission_serializes_persisted_layout() {
        let json = serde_json::to_string(&sample_mission()).unwrap();
        assert!(json.contains("\"assignedToUserId\":2"));
        assert!(json.contains("\"createdByUserId\":1"));
        assert!(json.contains("\"status\":\"proposed\""));
        assert!(json.contains("\"urgency\":\"medium\""));
    }

    #[test]
    fn test_mission_json_roundtrip() {
        let mission = sample_mission();
        let json = serde_json::to_string(&mission).unwrap();
        let restored: Mission = serde_json::from_str(&json).unwrap();
        assert_eq!(mission, restored);
    }

    #[test]
    fn test_update_can_unassign() {
        let mut mission = sample_mission();
        let update = MissionUpdate {
            status: Some(MissionStatus::Rejected),
            assigned_to_user_id: Some(None),
            ..Default::default()
        };

        update.apply(&mut mission);

        assert_eq!(mission.status, MissionStatus::Rejected);
        assert!(mission.assigned_to_user_id.is_none());
        assert_eq!(mission.title, "HVAC inspection");
    }
}
