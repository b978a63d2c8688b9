use serde::{Deserialize, Serialize};

/// One clock-in/out record.
///
/// While the employee is clocked in, `clock_out`, `hours_worked`, and
/// `wages_earned` are unset; clocking out fills them in and replaces the
/// history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockEntry {
    pub id: String,

    pub employee_id: String,

    pub office_id: String,

    /// RFC 3339 timestamp.
    pub clock_in: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<String>,

    /// Wall-clock hours between clock-in and clock-out, rounded to cents
    /// of an hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<f64>,

    /// `hours_worked * pay_rate`, rounded to cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wages_earned: Option<f64>,
}

/// Body for `POST /in` and `POST /out`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockRequest {
    pub employee_id: String,
    pub office_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_entry_omits_unset_fields() {
        let entry = ClockEntry {
            id: "c1".into(),
            employee_id: "e1".into(),
            office_id: "o1".into(),
            clock_in: "2026-03-01T09:00:00Z".into(),
            clock_out: None,
            hours_worked: None,
            wages_earned: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("clockOut"));
        assert!(!json.contains("wagesEarned"));

        let back: ClockEntry = serde_json::from_str(&json).unwrap();
        assert!(back.clock_out.is_none());
    }
}
