use serde::{Deserialize, Serialize};

/// One concrete shift on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,

    pub office_id: String,

    /// `YYYY-MM-DD`.
    pub date: String,

    pub title: String,

    /// `HH:MM`, no timezone.
    pub start_time: String,

    pub end_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// How `assigned_to` is interpreted (an employee id, a role name, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub is_recurring: bool,

    /// Back-reference to the pattern that generated this shift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<String>,

    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

/// A template that generates shifts over a date range.
///
/// `days_of_week` uses 0 = Sunday through 6 = Saturday. Weekly and
/// biweekly patterns match on weekday; monthly patterns match the
/// day-of-month of `start_date` and ignore `days_of_week`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPattern {
    pub id: String,

    pub office_id: String,

    pub title: String,

    pub start_time: String,

    pub end_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub frequency: Frequency,

    pub days_of_week: Vec<u8>,

    /// `YYYY-MM-DD`.
    pub start_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    pub created_at: String,
}

/// Body for `POST /{officeId}/shifts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftRequest {
    pub date: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assignment_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for `POST /{officeId}/recurring`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatternRequest {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assignment_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}
