//! Key builders for the office keyspace.
//!
//! Everything belonging to a tenant lives under `office:{officeId}:…`;
//! per-user indexes live under `user:{userId}:…`. The timeclock module
//! reads employee records through these builders too.

/// `office:{officeId}` — the office record itself.
pub fn office(office_id: &str) -> String {
    format!("office:{office_id}")
}

/// `office-code:{CODE}` — join-code index, value is the office id.
pub fn office_code(code: &str) -> String {
    format!("office-code:{code}")
}

/// `office:{officeId}:employees:` — employee collection prefix.
pub fn employees(office_id: &str) -> String {
    format!("office:{office_id}:employees:")
}

/// `office:{officeId}:employees:{employeeId}`.
pub fn employee(office_id: &str, employee_id: &str) -> String {
    format!("office:{office_id}:employees:{employee_id}")
}

/// `office:{officeId}:roles:` — role collection prefix.
pub fn roles(office_id: &str) -> String {
    format!("office:{office_id}:roles:")
}

/// `office:{officeId}:roles:{roleId}`.
pub fn role(office_id: &str, role_id: &str) -> String {
    format!("office:{office_id}:roles:{role_id}")
}

/// `office:{officeId}:subscription`.
pub fn subscription(office_id: &str) -> String {
    format!("office:{office_id}:subscription")
}

/// `user:{userId}:offices` — membership index, value is a JSON id array.
pub fn user_offices(user_id: &str) -> String {
    format!("user:{user_id}:offices")
}

/// `user:{userId}:current-office`.
pub fn current_office(user_id: &str) -> String {
    format!("user:{user_id}:current-office")
}
