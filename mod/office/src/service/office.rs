use rand::Rng;
use tracing::info;

use buziz_core::{ServiceError, new_id, now_rfc3339, pad_number};

use crate::keys;
use crate::model::{
    CreateOfficeRequest, DEFAULT_ROLE, Employee, JoinOfficeRequest, OWNER_ROLE, Office, Role,
    Subscription,
};
use crate::service::{OfficeService, kv_err};

/// Join codes are 6-character uppercase base-36 strings.
const CODE_LEN: usize = 6;
const CODE_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// How many collisions to tolerate before giving up. With 36^6 codes this
/// only trips if the store is returning garbage.
const CODE_ATTEMPTS: usize = 16;

impl OfficeService {
    // -----------------------------------------------------------------------
    // Create / join
    // -----------------------------------------------------------------------

    /// Create an office, seed its roles, and enroll the creator as
    /// employee "00001" with the Owner role.
    pub fn create_office(&self, req: CreateOfficeRequest) -> Result<Office, ServiceError> {
        if req.office_name.trim().is_empty() {
            return Err(ServiceError::Validation("office name cannot be empty".into()));
        }
        if req.user_name.trim().is_empty() {
            return Err(ServiceError::Validation("your name cannot be empty".into()));
        }

        let now = now_rfc3339();
        let office_id = new_id();
        let code = self.unique_join_code()?;

        let creator = Employee {
            id: new_id(),
            user_id: req.user_id.clone(),
            name: req.user_name.trim().to_string(),
            employee_number: pad_number(1, 5),
            role: OWNER_ROLE.to_string(),
            is_creator: true,
            is_head_manager: true,
            pay_rate: 0.0,
            joined_at: now.clone(),
        };

        let office = Office {
            id: office_id.clone(),
            code: code.clone(),
            creator_id: creator.id.clone(),
            name: req.office_name.trim().to_string(),
            created_at: now.clone(),
        };

        let owner_role = seed_role(OWNER_ROLE, vec!["all".into()], Some("#f59e0b"), &now);
        let default_role = seed_role(
            DEFAULT_ROLE,
            vec![
                "schedule".into(),
                "timeclock".into(),
                "tasks".into(),
                "chat".into(),
            ],
            Some("#3b82f6"),
            &now,
        );

        // One batch write covers the office, its code index, seed roles,
        // and the creator employee.
        let office_bytes = to_bytes(&office)?;
        let creator_bytes = to_bytes(&creator)?;
        let owner_bytes = to_bytes(&owner_role)?;
        let default_bytes = to_bytes(&default_role)?;

        let office_key = keys::office(&office_id);
        let code_key = keys::office_code(&code);
        let creator_key = keys::employee(&office_id, &creator.id);
        let owner_key = keys::role(&office_id, &owner_role.id);
        let default_key = keys::role(&office_id, &default_role.id);

        self.kv
            .batch_set(&[
                (office_key.as_str(), office_bytes.as_slice()),
                (code_key.as_str(), office_id.as_bytes()),
                (creator_key.as_str(), creator_bytes.as_slice()),
                (owner_key.as_str(), owner_bytes.as_slice()),
                (default_key.as_str(), default_bytes.as_slice()),
            ])
            .map_err(kv_err)?;

        self.append_membership(&req.user_id, &office_id)?;
        self.set_current_office(&req.user_id, &office_id)?;

        info!("created office {} ({})", office.name, office_id);
        Ok(office)
    }

    /// Join an office by code. The code is case-normalized before lookup;
    /// the new employee gets the next sequential number and the default role.
    pub fn join_office(&self, req: JoinOfficeRequest) -> Result<Employee, ServiceError> {
        if req.name.trim().is_empty() {
            return Err(ServiceError::Validation("your name cannot be empty".into()));
        }
        let code = req.code.trim().to_uppercase();
        if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ServiceError::Validation(format!(
                "join codes are {CODE_LEN} letters or digits"
            )));
        }

        let office_id = match self.kv.get(&keys::office_code(&code)).map_err(kv_err)? {
            Some(bytes) => String::from_utf8(bytes)
                .map_err(|e| ServiceError::Storage(format!("bad code index: {e}")))?,
            None => return Err(ServiceError::NotFound(format!("no office with code {code}"))),
        };

        // Refuse a second membership for the same user.
        let existing: Vec<Employee> = self.scan_json(&keys::employees(&office_id))?;
        if existing.iter().any(|e| e.user_id == req.user_id) {
            return Err(ServiceError::Conflict(
                "you are already a member of this office".into(),
            ));
        }

        let employee = Employee {
            id: new_id(),
            user_id: req.user_id.clone(),
            name: req.name.trim().to_string(),
            employee_number: pad_number(existing.len() + 1, 5),
            role: DEFAULT_ROLE.to_string(),
            is_creator: false,
            is_head_manager: false,
            pay_rate: 0.0,
            joined_at: now_rfc3339(),
        };

        self.put_json(&keys::employee(&office_id, &employee.id), &employee)?;
        self.append_membership(&req.user_id, &office_id)?;
        self.set_current_office(&req.user_id, &office_id)?;

        info!(
            "employee {} joined office {} as #{}",
            employee.name, office_id, employee.employee_number
        );
        Ok(employee)
    }

    // -----------------------------------------------------------------------
    // Office record
    // -----------------------------------------------------------------------

    pub fn get_office(&self, office_id: &str) -> Result<Office, ServiceError> {
        self.get_json(&keys::office(office_id))?
            .ok_or_else(|| ServiceError::NotFound(format!("office {office_id}")))
    }

    /// Rename an office. `name` is the only mutable field.
    pub fn rename_office(&self, office_id: &str, name: &str) -> Result<Office, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("office name cannot be empty".into()));
        }
        let mut office = self.get_office(office_id)?;
        office.name = name.trim().to_string();
        self.put_json(&keys::office(office_id), &office)?;
        Ok(office)
    }

    // -----------------------------------------------------------------------
    // Per-user indexes
    // -----------------------------------------------------------------------

    /// All offices the user belongs to, in join order.
    pub fn user_offices(&self, user_id: &str) -> Result<Vec<Office>, ServiceError> {
        let ids: Vec<String> = self
            .get_json(&keys::user_offices(user_id))?
            .unwrap_or_default();
        ids.iter().map(|id| self.get_office(id)).collect()
    }

    pub fn current_office(&self, user_id: &str) -> Result<Option<Office>, ServiceError> {
        match self.kv.get(&keys::current_office(user_id)).map_err(kv_err)? {
            Some(bytes) => {
                let id = String::from_utf8(bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad current-office: {e}")))?;
                Ok(Some(self.get_office(&id)?))
            }
            None => Ok(None),
        }
    }

    /// Point the user's session at one of their offices.
    pub fn set_current_office(&self, user_id: &str, office_id: &str) -> Result<(), ServiceError> {
        let ids: Vec<String> = self
            .get_json(&keys::user_offices(user_id))?
            .unwrap_or_default();
        if !ids.iter().any(|id| id == office_id) {
            return Err(ServiceError::Validation(
                "you are not a member of that office".into(),
            ));
        }
        self.kv
            .set(&keys::current_office(user_id), office_id.as_bytes())
            .map_err(kv_err)
    }

    fn append_membership(&self, user_id: &str, office_id: &str) -> Result<(), ServiceError> {
        let key = keys::user_offices(user_id);
        let mut ids: Vec<String> = self.get_json(&key)?.unwrap_or_default();
        if !ids.iter().any(|id| id == office_id) {
            ids.push(office_id.to_string());
        }
        self.put_json(&key, &ids)
    }

    // -----------------------------------------------------------------------
    // Subscription
    // -----------------------------------------------------------------------

    /// The office's subscription record; a never-written office is on the
    /// free plan.
    pub fn subscription(&self, office_id: &str) -> Result<Subscription, ServiceError> {
        self.get_office(office_id)?;
        Ok(self
            .get_json(&keys::subscription(office_id))?
            .unwrap_or_default())
    }

    pub fn set_subscription(
        &self,
        office_id: &str,
        sub: Subscription,
    ) -> Result<Subscription, ServiceError> {
        self.get_office(office_id)?;
        self.put_json(&keys::subscription(office_id), &sub)?;
        Ok(sub)
    }

    // -----------------------------------------------------------------------
    // Join codes
    // -----------------------------------------------------------------------

    /// Generate a join code that is not already indexed, regenerating on
    /// collision.
    fn unique_join_code(&self) -> Result<String, ServiceError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = random_code();
            if self
                .kv
                .get(&keys::office_code(&code))
                .map_err(kv_err)?
                .is_none()
            {
                return Ok(code);
            }
        }
        Err(ServiceError::Internal(
            "could not generate a unique join code".into(),
        ))
    }
}

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

fn seed_role(name: &str, permissions: Vec<String>, color: Option<&str>, now: &str) -> Role {
    Role {
        id: new_id(),
        name: name.to_string(),
        permissions,
        color: color.map(str::to_string),
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

fn to_bytes<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec(value).map_err(|e| ServiceError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{make_office, test_service};

    #[test]
    fn create_seeds_creator_and_roles() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");

        assert_eq!(office.code.len(), 6);
        assert!(office.code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

        let employees = svc.list_employees(&office.id).unwrap();
        assert_eq!(employees.len(), 1);
        let creator = &employees[0];
        assert!(creator.is_creator);
        assert_eq!(creator.employee_number, "00001");
        assert_eq!(creator.role, OWNER_ROLE);
        assert_eq!(office.creator_id, creator.id);

        let roles = svc.list_roles(&office.id).unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&OWNER_ROLE));
        assert!(names.contains(&DEFAULT_ROLE));
    }

    #[test]
    fn join_assigns_sequential_numbers() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");

        let second = svc
            .join_office(JoinOfficeRequest {
                user_id: "u2".into(),
                code: office.code.to_lowercase(), // case-normalized on input
                name: "Kim".into(),
            })
            .unwrap();
        assert_eq!(second.employee_number, "00002");
        assert!(!second.is_creator);
        assert_eq!(second.role, DEFAULT_ROLE);

        let third = svc
            .join_office(JoinOfficeRequest {
                user_id: "u3".into(),
                code: office.code.clone(),
                name: "Ana".into(),
            })
            .unwrap();
        assert_eq!(third.employee_number, "00003");

        // Exactly one creator.
        let employees = svc.list_employees(&office.id).unwrap();
        assert_eq!(employees.iter().filter(|e| e.is_creator).count(), 1);
    }

    #[test]
    fn join_unknown_code_is_not_found() {
        let svc = test_service();
        let err = svc
            .join_office(JoinOfficeRequest {
                user_id: "u1".into(),
                code: "ZZZZZZ".into(),
                name: "Kim".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn join_twice_conflicts() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");
        svc.join_office(JoinOfficeRequest {
            user_id: "u2".into(),
            code: office.code.clone(),
            name: "Kim".into(),
        })
        .unwrap();

        let err = svc
            .join_office(JoinOfficeRequest {
                user_id: "u2".into(),
                code: office.code.clone(),
                name: "Kim".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn join_code_shape_validated() {
        let svc = test_service();
        let err = svc
            .join_office(JoinOfficeRequest {
                user_id: "u1".into(),
                code: "nope".into(),
                name: "Kim".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn rename_is_the_only_office_mutation() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");

        let renamed = svc.rename_office(&office.id, "Main Street").unwrap();
        assert_eq!(renamed.name, "Main Street");
        assert_eq!(renamed.code, office.code);
        assert_eq!(renamed.creator_id, office.creator_id);
    }

    #[test]
    fn membership_and_current_office() {
        let svc = test_service();
        let a = make_office(&svc, "u1", "A");
        let b = make_office(&svc, "u1", "B");

        let offices = svc.user_offices("u1").unwrap();
        assert_eq!(offices.len(), 2);

        // Creating B switched the current office to B.
        assert_eq!(svc.current_office("u1").unwrap().unwrap().id, b.id);

        svc.set_current_office("u1", &a.id).unwrap();
        assert_eq!(svc.current_office("u1").unwrap().unwrap().id, a.id);

        // Cannot point at an office the user is not in.
        assert!(svc.set_current_office("u2", &a.id).is_err());
        assert!(svc.current_office("u2").unwrap().is_none());
    }

    #[test]
    fn subscription_defaults_to_free() {
        let svc = test_service();
        let office = make_office(&svc, "u1", "HQ");

        let sub = svc.subscription(&office.id).unwrap();
        assert_eq!(sub.plan, "free");

        let paid = svc
            .set_subscription(
                &office.id,
                Subscription {
                    plan: "pro".into(),
                    status: "active".into(),
                    renews_at: Some("2026-09-01T00:00:00Z".into()),
                },
            )
            .unwrap();
        assert_eq!(paid.plan, "pro");
        assert_eq!(svc.subscription(&office.id).unwrap().plan, "pro");
    }

    #[test]
    fn join_codes_are_unique_per_office() {
        let svc = test_service();
        let mut codes = std::collections::HashSet::new();
        for i in 0..20 {
            let office = make_office(&svc, &format!("u{i}"), &format!("Office {i}"));
            assert!(codes.insert(office.code));
        }
    }
}
