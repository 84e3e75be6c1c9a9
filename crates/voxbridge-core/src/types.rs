use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The kind of emergency a session was raised for.
///
/// Also used as the `kind` of an emergency contact, so the dispatch step can
/// pick the contacts relevant to the active emergency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    /// Medical emergency (default).
    #[default]
    Medical,
    /// Police assistance.
    Police,
    /// Fire emergency.
    Fire,
    /// Personal safety concern.
    Personal,
}

impl EmergencyType {
    /// Every emergency type, in display order.
    pub const ALL: [EmergencyType; 4] = [
        EmergencyType::Medical,
        EmergencyType::Police,
        EmergencyType::Fire,
        EmergencyType::Personal,
    ];

    /// Human-readable name shown on the confirmation screen.
    pub fn display_name(&self) -> &'static str {
        match self {
            EmergencyType::Medical => "Medical Emergency",
            EmergencyType::Police => "Police Emergency",
            EmergencyType::Fire => "Fire Emergency",
            EmergencyType::Personal => "Personal Safety",
        }
    }

    /// Alert message used when the user has not written one.
    pub fn default_message(&self) -> &'static str {
        match self {
            EmergencyType::Medical => "I need immediate medical assistance!",
            EmergencyType::Police => "I need police assistance immediately!",
            EmergencyType::Fire => "Fire emergency! Need immediate help!",
            EmergencyType::Personal => "I feel unsafe and need assistance!",
        }
    }

    /// Roles that are informed for this emergency type.
    pub fn contact_roles(&self) -> &'static [&'static str] {
        match self {
            EmergencyType::Medical => &["Ambulance", "Doctor", "Family"],
            EmergencyType::Police => &["Police", "Security", "Family"],
            EmergencyType::Fire => &["Fire Department", "Neighbors", "Family"],
            EmergencyType::Personal => &["Trusted Contacts", "Security", "Family"],
        }
    }
}

impl fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmergencyType::Medical => write!(f, "medical"),
            EmergencyType::Police => write!(f, "police"),
            EmergencyType::Fire => write!(f, "fire"),
            EmergencyType::Personal => write!(f, "personal"),
        }
    }
}

impl FromStr for EmergencyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medical" => Ok(EmergencyType::Medical),
            "police" => Ok(EmergencyType::Police),
            "fire" => Ok(EmergencyType::Fire),
            "personal" => Ok(EmergencyType::Personal),
            other => Err(format!("unknown emergency type: {}", other)),
        }
    }
}

/// Lifecycle status of the emergency session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyStatus {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Countdown running, the user can still cancel.
    Confirming,
    /// Emergency committed, dispatch actions running or done.
    Active,
}

impl fmt::Display for EmergencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmergencyStatus::Idle => write!(f, "idle"),
            EmergencyStatus::Confirming => write!(f, "confirming"),
            EmergencyStatus::Active => write!(f, "active"),
        }
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Unique identifier of a user-authored phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseId(pub Uuid);

impl PhraseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhraseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhraseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhraseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(PhraseId)
    }
}

/// Unix timestamp in seconds (UTC).
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

// =============================================================================
// Value Objects
// =============================================================================

/// Confidence assigned to the top-ranked candidate.
pub const TOP_CONFIDENCE: u8 = 85;

/// Confidence lost per rank step.
pub const CONFIDENCE_STEP: u8 = 10;

/// A ranked continuation offered to the user.
///
/// Candidates are built fresh by every prediction call and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub rank: usize,
    /// Relative confidence, 0..=100. Non-increasing with rank.
    pub confidence_score: u8,
}

impl Candidate {
    /// Build the candidate at `rank`, deriving its confidence from the rank.
    pub fn ranked(text: impl Into<String>, rank: usize) -> Self {
        Self {
            text: text.into(),
            rank,
            confidence_score: confidence_for_rank(rank),
        }
    }
}

/// `max(0, 85 - rank * 10)`.
pub fn confidence_for_rank(rank: usize) -> u8 {
    let penalty = rank.saturating_mul(CONFIDENCE_STEP as usize);
    (TOP_CONFIDENCE as usize).saturating_sub(penalty) as u8
}

/// Someone the emergency workflow can inform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub number: String,
    /// Emergency type this contact is relevant to.
    pub kind: EmergencyType,
    /// 1 is the highest priority; priority-1 contacts are informed for every type.
    pub priority: u8,
}

impl EmergencyContact {
    pub fn new(name: &str, number: &str, kind: EmergencyType, priority: u8) -> Self {
        Self {
            name: name.to_string(),
            number: number.to_string(),
            kind,
            priority,
        }
    }

    /// Whether this contact is informed for an emergency of `kind`.
    pub fn applies_to(&self, kind: EmergencyType) -> bool {
        self.kind == kind || self.priority == 1
    }
}

/// A geographic position reported by the location dispatch action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub label: String,
}

impl Default for GeoLocation {
    fn default() -> Self {
        Self {
            latitude: -1.2921,
            longitude: 36.8219,
            label: "Nairobi, Kenya".to_string(),
        }
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
        } else {
            write!(f, "{} ({:.4}, {:.4})", self.label, self.latitude, self.longitude)
        }
    }
}
