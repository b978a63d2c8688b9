use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Office
// ---------------------------------------------------------------------------

/// A tenant unit. Created once; immutable except `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: String,

    /// 6-character uppercase base-36 join token, unique across offices.
    pub code: String,

    /// Employee id of the office creator.
    pub creator_id: String,

    pub name: String,

    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// A user's membership record within one office.
///
/// Distinct from the authentication identity: `user_id` links to whoever
/// the external auth provider says is logged in, everything else is
/// office-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,

    pub user_id: String,

    pub name: String,

    /// Zero-padded 5-digit decimal string, sequential by join order.
    /// The office creator is always `"00001"`.
    pub employee_number: String,

    /// Role reference by name, not id.
    pub role: String,

    #[serde(default)]
    pub is_creator: bool,

    #[serde(default)]
    pub is_head_manager: bool,

    /// Hourly pay rate, used by the timeclock's wage computation.
    #[serde(default)]
    pub pay_rate: f64,

    pub joined_at: String,
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A named capability bundle assignable to employees within an office.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,

    pub name: String,

    /// Capability strings; `"all"` is a wildcard matching everything.
    pub permissions: Vec<String>,

    #[serde(default)]
    pub color: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

/// The protected role every office is seeded with.
pub const OWNER_ROLE: &str = "Owner";

/// The default role assigned on join.
pub const DEFAULT_ROLE: &str = "Employee";

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// The office's billing plan record. Payment capture itself is delegated
/// to an external provider; this is only the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: String,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renews_at: Option<String>,
}

impl Default for Subscription {
    fn default() -> Self {
        Self {
            plan: "free".to_string(),
            status: "active".to_string(),
            renews_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /offices`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficeRequest {
    pub user_id: String,
    /// Display name for the creator's employee record.
    pub user_name: String,
    pub office_name: String,
}

/// Body for `POST /offices/@join`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOfficeRequest {
    pub user_id: String,
    /// Human-entered join code; case-normalized before lookup.
    pub code: String,
    pub name: String,
}

/// Body for `POST /offices/{id}/@rename`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOfficeRequest {
    pub name: String,
}

/// Body for `PUT /users/{userId}/current-office`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCurrentOfficeRequest {
    pub office_id: String,
}

/// Body for `POST /offices/{id}/roles`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Query for `GET .../permissions/@check`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheckQuery {
    pub capability: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_json_uses_camel_case() {
        let employee = Employee {
            id: "e1".into(),
            user_id: "u1".into(),
            name: "Dana".into(),
            employee_number: "00001".into(),
            role: OWNER_ROLE.into(),
            is_creator: true,
            is_head_manager: true,
            pay_rate: 20.0,
            joined_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&employee).unwrap();
        assert!(json.contains("\"employeeNumber\":\"00001\""));
        assert!(json.contains("\"isCreator\":true"));
        assert!(json.contains("\"payRate\":20.0"));

        let back: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(back.employee_number, "00001");
    }

    #[test]
    fn subscription_default_is_free_active() {
        let sub = Subscription::default();
        assert_eq!(sub.plan, "free");
        assert_eq!(sub.status, "active");
        assert!(sub.renews_at.is_none());
    }

    #[test]
    fn join_request_deserialize() {
        let json = r#"{"userId":"u1","code":"ab12cd","name":"Kim"}"#;
        let req: JoinOfficeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.code, "ab12cd");
        assert_eq!(req.name, "Kim");
    }
}
