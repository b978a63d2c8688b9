use buziz_core::{ServiceError, merge_patch};

use crate::keys;
use crate::model::Employee;
use crate::service::OfficeService;

/// Fields that a merge-patch may not touch. `role` changes are allowed but
/// validated against the office's role set.
const PROTECTED_FIELDS: &[&str] = &["id", "userId", "isCreator", "employeeNumber", "joinedAt"];

impl OfficeService {
    pub fn list_employees(&self, office_id: &str) -> Result<Vec<Employee>, ServiceError> {
        self.get_office(office_id)?;
        self.scan_json(&keys::employees(office_id))
    }

    pub fn get_employee(
        &self,
        office_id: &str,
        employee_id: &str,
    ) -> Result<Employee, ServiceError> {
        self.get_json(&keys::employee(office_id, employee_id))?
            .ok_or_else(|| ServiceError::NotFound(format!("employee {employee_id}")))
    }

    /// Update an employee with JSON merge-patch.
    ///
    /// Identity fields are restored after the patch; a `role` change must
    /// name an existing role in this office.
    pub fn update_employee(
        &self,
        office_id: &str,
        employee_id: &str,
        patch: serde_json::Value,
    ) -> Result<Employee, ServiceError> {
        let current = self.get_employee(office_id, employee_id)?;

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);

        let original = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        for field in PROTECTED_FIELDS {
            base[*field] = original[*field].clone();
        }

        let updated: Employee = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("bad employee patch: {e}")))?;

        if updated.role != current.role {
            let roles = self.list_roles(office_id)?;
            if !roles.iter().any(|r| r.name == updated.role) {
                return Err(ServiceError::Validation(format!(
                    "no role named '{}' in this office",
                    updated.role
                )));
            }
        }
        if updated.name.trim().is_empty() {
            return Err(ServiceError::Validation("employee name cannot be empty".into()));
        }
        if updated.pay_rate < 0.0 {
            return Err(ServiceError::Validation("pay rate cannot be negative".into()));
        }

        self.put_json(&keys::employee(office_id, employee_id), &updated)?;
        Ok(updated)
    }

    /// Remove an employee. The office creator cannot be removed.
    pub fn remove_employee(
        &self,
        office_id: &str,
        employee_id: &str,
    ) -> Result<(), ServiceError> {
        let employee = self.get_employee(office_id, employee_id)?;
        if employee.is_creator {
            return Err(ServiceError::Validation(
                "the office creator cannot be removed".into(),
            ));
        }
        self.kv
            .delete(&keys::employee(office_id, employee_id))
            .map_err(crate::service::kv_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JoinOfficeRequest;
    use crate::service::test_support::{make_office, test_service};

    fn joined(svc: &OfficeService, code: &str, user: &str, name: &str) -> Employee {
        svc.join_office(JoinOfficeRequest {
            user_id: user.into(),
            code: code.into(),
            name: name.into(),
        })
        .unwrap()
    }

    #[test]
    fn merge_patch_updates_pay_rate_and_flags() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let emp = joined(&svc, &office.code, "u2", "Kim");

        let updated = svc
            .update_employee(
                &office.id,
                &emp.id,
                serde_json::json!({"payRate": 22.5, "isHeadManager": true}),
            )
            .unwrap();
        assert_eq!(updated.pay_rate, 22.5);
        assert!(updated.is_head_manager);
        assert_eq!(updated.name, "Kim");
    }

    #[test]
    fn protected_fields_survive_patch() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let emp = joined(&svc, &office.code, "u2", "Kim");

        let updated = svc
            .update_employee(
                &office.id,
                &emp.id,
                serde_json::json!({
                    "employeeNumber": "99999",
                    "isCreator": true,
                    "id": "forged",
                }),
            )
            .unwrap();
        assert_eq!(updated.employee_number, emp.employee_number);
        assert!(!updated.is_creator);
        assert_eq!(updated.id, emp.id);
    }

    #[test]
    fn role_change_must_name_existing_role() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let emp = joined(&svc, &office.code, "u2", "Kim");

        let err = svc
            .update_employee(&office.id, &emp.id, serde_json::json!({"role": "Wizard"}))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        svc.update_employee(&office.id, &emp.id, serde_json::json!({"role": "Owner"}))
            .unwrap();
    }

    #[test]
    fn creator_cannot_be_removed() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let err = svc
            .remove_employee(&office.id, &office.creator_id)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let emp = joined(&svc, &office.code, "u2", "Kim");
        svc.remove_employee(&office.id, &emp.id).unwrap();
        assert_eq!(svc.list_employees(&office.id).unwrap().len(), 1);
    }
}
