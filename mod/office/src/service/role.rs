use buziz_core::{ServiceError, merge_patch, new_id, now_rfc3339};

use crate::keys;
use crate::model::{CreateRoleRequest, Employee, OWNER_ROLE, Role};
use crate::service::OfficeService;

impl OfficeService {
    pub fn create_role(
        &self,
        office_id: &str,
        req: CreateRoleRequest,
    ) -> Result<Role, ServiceError> {
        self.get_office(office_id)?;
        if req.name.trim().is_empty() {
            return Err(ServiceError::Validation("role name cannot be empty".into()));
        }
        if req.permissions.is_empty() {
            return Err(ServiceError::Validation(
                "role must have at least one permission".into(),
            ));
        }

        let name = req.name.trim().to_string();
        let roles = self.list_roles(office_id)?;
        if roles.iter().any(|r| r.name == name) {
            return Err(ServiceError::Conflict(format!(
                "a role named '{name}' already exists"
            )));
        }

        let now = now_rfc3339();
        let role = Role {
            id: new_id(),
            name,
            permissions: req.permissions,
            color: req.color,
            created_at: now.clone(),
            updated_at: now,
        };
        self.put_json(&keys::role(office_id, &role.id), &role)?;
        Ok(role)
    }

    pub fn list_roles(&self, office_id: &str) -> Result<Vec<Role>, ServiceError> {
        self.scan_json(&keys::roles(office_id))
    }

    pub fn get_role(&self, office_id: &str, role_id: &str) -> Result<Role, ServiceError> {
        self.get_json(&keys::role(office_id, role_id))?
            .ok_or_else(|| ServiceError::NotFound(format!("role {role_id}")))
    }

    /// Update a role with JSON merge-patch.
    ///
    /// A role cannot be renamed while any employee references its name —
    /// employee records point at roles by name, and a silent rename would
    /// strand them.
    pub fn update_role(
        &self,
        office_id: &str,
        role_id: &str,
        patch: serde_json::Value,
    ) -> Result<Role, ServiceError> {
        let current = self.get_role(office_id, role_id)?;

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["createdAt"] = serde_json::json!(current.created_at);
        base["updatedAt"] = serde_json::json!(now_rfc3339());

        let updated: Role = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("bad role patch: {e}")))?;

        if updated.permissions.is_empty() {
            return Err(ServiceError::Validation(
                "role must have at least one permission".into(),
            ));
        }
        if updated.name != current.name {
            if current.name == OWNER_ROLE {
                return Err(ServiceError::Validation(
                    "the Owner role cannot be renamed".into(),
                ));
            }
            let in_use = self.count_role_references(office_id, &current.name)?;
            if in_use > 0 {
                return Err(ServiceError::Conflict(format!(
                    "cannot rename role '{}': in use by {in_use} employee(s)",
                    current.name
                )));
            }
        }

        self.put_json(&keys::role(office_id, role_id), &updated)?;
        Ok(updated)
    }

    /// Delete a role. The Owner role is protected, and a role cannot be
    /// deleted while any employee's `role` field equals its name.
    pub fn delete_role(&self, office_id: &str, role_id: &str) -> Result<(), ServiceError> {
        let role = self.get_role(office_id, role_id)?;
        if role.name == OWNER_ROLE {
            return Err(ServiceError::Validation(
                "the Owner role cannot be deleted".into(),
            ));
        }
        let in_use = self.count_role_references(office_id, &role.name)?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "cannot delete role '{}': in use by {in_use} employee(s)",
                role.name
            )));
        }
        self.kv
            .delete(&keys::role(office_id, role_id))
            .map_err(crate::service::kv_err)
    }

    // -----------------------------------------------------------------------
    // Permission checks
    // -----------------------------------------------------------------------

    /// Whether the employee holds a capability.
    ///
    /// The creator passes everything; otherwise the employee's role must
    /// contain either the capability string or the `"all"` wildcard. An
    /// employee whose role no longer exists holds nothing.
    pub fn has_permission(
        &self,
        office_id: &str,
        employee_id: &str,
        capability: &str,
    ) -> Result<bool, ServiceError> {
        let employee = self.get_employee(office_id, employee_id)?;
        if employee.is_creator {
            return Ok(true);
        }
        let roles = self.list_roles(office_id)?;
        let Some(role) = roles.iter().find(|r| r.name == employee.role) else {
            return Ok(false);
        };
        Ok(role
            .permissions
            .iter()
            .any(|p| p == "all" || p == capability))
    }

    fn count_role_references(
        &self,
        office_id: &str,
        role_name: &str,
    ) -> Result<usize, ServiceError> {
        let employees: Vec<Employee> = self.scan_json(&keys::employees(office_id))?;
        Ok(employees.iter().filter(|e| e.role == role_name).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JoinOfficeRequest;
    use crate::service::test_support::{make_office, test_service};

    fn role_named<'a>(roles: &'a [Role], name: &str) -> &'a Role {
        roles.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn owner_role_cannot_be_deleted() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let roles = svc.list_roles(&office.id).unwrap();
        let owner = role_named(&roles, OWNER_ROLE);

        let err = svc.delete_role(&office.id, &owner.id).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn role_in_use_cannot_be_deleted() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        svc.join_office(JoinOfficeRequest {
            user_id: "u2".into(),
            code: office.code.clone(),
            name: "Kim".into(),
        })
        .unwrap();

        // "Employee" is referenced by Kim.
        let roles = svc.list_roles(&office.id).unwrap();
        let default = role_named(&roles, "Employee");
        let err = svc.delete_role(&office.id, &default.id).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // An unreferenced role deletes fine.
        let extra = svc
            .create_role(
                &office.id,
                CreateRoleRequest {
                    name: "Closer".into(),
                    permissions: vec!["schedule".into()],
                    color: None,
                },
            )
            .unwrap();
        svc.delete_role(&office.id, &extra.id).unwrap();
    }

    #[test]
    fn duplicate_role_names_conflict() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let err = svc
            .create_role(
                &office.id,
                CreateRoleRequest {
                    name: "Employee".into(),
                    permissions: vec!["schedule".into()],
                    color: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn wildcard_and_capability_checks() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        let kim = svc
            .join_office(JoinOfficeRequest {
                user_id: "u2".into(),
                code: office.code.clone(),
                name: "Kim".into(),
            })
            .unwrap();

        // Creator passes everything.
        assert!(svc.has_permission(&office.id, &office.creator_id, "billing").unwrap());

        // Default role carries "timeclock" but not "billing".
        assert!(svc.has_permission(&office.id, &kim.id, "timeclock").unwrap());
        assert!(!svc.has_permission(&office.id, &kim.id, "billing").unwrap());

        // Promoting Kim to Owner grants the "all" wildcard.
        svc.update_employee(&office.id, &kim.id, serde_json::json!({"role": "Owner"}))
            .unwrap();
        assert!(svc.has_permission(&office.id, &kim.id, "billing").unwrap());
    }

    #[test]
    fn rename_in_use_role_conflicts() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        svc.join_office(JoinOfficeRequest {
            user_id: "u2".into(),
            code: office.code.clone(),
            name: "Kim".into(),
        })
        .unwrap();

        let roles = svc.list_roles(&office.id).unwrap();
        let default = role_named(&roles, "Employee");

        let err = svc
            .update_role(&office.id, &default.id, serde_json::json!({"name": "Staff"}))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Permissions can still change while the role is in use.
        let updated = svc
            .update_role(
                &office.id,
                &default.id,
                serde_json::json!({"permissions": ["schedule", "timeclock", "inventory"]}),
            )
            .unwrap();
        assert!(updated.permissions.contains(&"inventory".to_string()));
    }
}
