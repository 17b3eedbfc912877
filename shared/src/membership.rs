use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Membership tiers assignable to portal members.
///
/// The serialized names are the display strings the backing store
/// holds, so the set is closed on both sides of the wire.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MembershipType {
    #[serde(rename = "Individual International")]
    IndividualInternational,
    #[serde(rename = "Chapter Membership")]
    ChapterMembership,
    #[serde(rename = "Corporate")]
    Corporate,
    #[serde(rename = "Institutional")]
    Institutional,
    #[serde(rename = "Charter or Lifetime")]
    CharterOrLifetime,
    #[serde(rename = "Student")]
    Student,
}

impl MembershipType {
    /// All tiers, in display order.
    pub const ALL: [MembershipType; 6] = [
        MembershipType::IndividualInternational,
        MembershipType::ChapterMembership,
        MembershipType::Corporate,
        MembershipType::Institutional,
        MembershipType::CharterOrLifetime,
        MembershipType::Student,
    ];

    /// The label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            MembershipType::IndividualInternational => "Individual International",
            MembershipType::ChapterMembership => "Chapter Membership",
            MembershipType::Corporate => "Corporate",
            MembershipType::Institutional => "Institutional",
            MembershipType::CharterOrLifetime => "Charter or Lifetime",
            MembershipType::Student => "Student",
        }
    }

    /// Billing description shown alongside the tier.
    pub fn description(&self) -> &'static str {
        match self {
            MembershipType::IndividualInternational => "₹1,500 + GST / Year",
            MembershipType::ChapterMembership => "₹1,500 + GST / Year",
            MembershipType::Corporate => "Corporate / Year",
            MembershipType::Institutional => "Institutional / Year",
            MembershipType::CharterOrLifetime => "₹1,00,000 + GST",
            MembershipType::Student => "₹750 + GST / Year",
        }
    }
}

impl Display for MembershipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-admin portal user as listed for the operator.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
    pub membership_type: Option<MembershipType>,
    pub membership_expiry: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateMembershipDescriptor {
    pub user_id: String,
    pub membership_type: MembershipType,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UsersResult {
    pub users: Vec<UserRow>,
}

/// How a membership expiry timestamp is presented.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum ExpiryDisplay {
    NeverExpires,
    Expired,
    Date(String),
}

impl Display for ExpiryDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryDisplay::NeverExpires => f.write_str("Never Expires"),
            ExpiryDisplay::Expired => f.write_str("Expired"),
            ExpiryDisplay::Date(date) => f.write_str(date),
        }
    }
}

/// Presentation of a membership expiry at the given instant.
///
/// No expiry means the membership never expires; a past expiry renders
/// as the expired indicator; anything else is a calendar date.
pub fn expiry_display(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ExpiryDisplay {
    match expiry {
        None => ExpiryDisplay::NeverExpires,
        Some(at) if at < now => ExpiryDisplay::Expired,
        Some(at) => ExpiryDisplay::Date(at.format("%b %-d, %Y").to_string()),
    }
}
