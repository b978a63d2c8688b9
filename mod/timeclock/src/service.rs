use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use buziz_core::{ServiceError, new_id};
use buziz_kv::{KVError, KVStore};
use buziz_office::model::Employee;

use crate::model::ClockEntry;

fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// `office:{officeId}:clock-history:{entryId}`.
fn history_key(office_id: &str, entry_id: &str) -> String {
    format!("office:{office_id}:clock-history:{entry_id}")
}

/// `office:{officeId}:clock-history:` — history prefix.
fn history_prefix(office_id: &str) -> String {
    format!("office:{office_id}:clock-history:")
}

/// `employee:{employeeId}:active-clock` — the single open entry slot.
fn active_key(employee_id: &str) -> String {
    format!("employee:{employee_id}:active-clock")
}

/// Round to two decimal places, matching how the numbers are displayed.
fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct TimeclockService {
    kv: Arc<dyn KVStore>,
}

impl TimeclockService {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    // -----------------------------------------------------------------------
    // Clock in / out
    // -----------------------------------------------------------------------

    pub fn clock_in(&self, employee_id: &str, office_id: &str) -> Result<ClockEntry, ServiceError> {
        self.clock_in_at(employee_id, office_id, Utc::now())
    }

    /// Clock in at an explicit instant. Exposed for simulated-time tests;
    /// production callers go through [`TimeclockService::clock_in`].
    pub fn clock_in_at(
        &self,
        employee_id: &str,
        office_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ClockEntry, ServiceError> {
        self.lookup_employee(office_id, employee_id)?;

        if self.active_entry(employee_id)?.is_some() {
            return Err(ServiceError::Conflict("already clocked in".into()));
        }

        let entry = ClockEntry {
            id: new_id(),
            employee_id: employee_id.to_string(),
            office_id: office_id.to_string(),
            clock_in: now.to_rfc3339(),
            clock_out: None,
            hours_worked: None,
            wages_earned: None,
        };

        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let hkey = history_key(office_id, &entry.id);
        let akey = active_key(employee_id);
        self.kv
            .batch_set(&[(hkey.as_str(), bytes.as_slice()), (akey.as_str(), bytes.as_slice())])
            .map_err(kv_err)?;

        info!("employee {employee_id} clocked in at {}", entry.clock_in);
        Ok(entry)
    }

    pub fn clock_out(&self, employee_id: &str, office_id: &str) -> Result<ClockEntry, ServiceError> {
        self.clock_out_at(employee_id, office_id, Utc::now())
    }

    /// Clock out at an explicit instant.
    ///
    /// Hours worked are the raw wall-clock delta — no timezone
    /// normalization and no special handling of multi-day spans. Wages
    /// are `hours * pay_rate` at the employee's current rate.
    pub fn clock_out_at(
        &self,
        employee_id: &str,
        office_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ClockEntry, ServiceError> {
        let mut entry = self
            .active_entry(employee_id)?
            .ok_or_else(|| ServiceError::Validation("no active clock-in".into()))?;

        let employee = self.lookup_employee(office_id, employee_id)?;

        let clocked_in = DateTime::parse_from_rfc3339(&entry.clock_in)
            .map_err(|e| ServiceError::Storage(format!("bad clock-in timestamp: {e}")))?
            .with_timezone(&Utc);
        let hours = (now - clocked_in).num_milliseconds() as f64 / 3_600_000.0;
        let hours = round_cents(hours);
        let wages = round_cents(hours * employee.pay_rate);

        entry.clock_out = Some(now.to_rfc3339());
        entry.hours_worked = Some(hours);
        entry.wages_earned = Some(wages);

        // Replace the matching history entry, then clear the slot.
        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv
            .set(&history_key(office_id, &entry.id), &bytes)
            .map_err(kv_err)?;
        self.kv.delete(&active_key(employee_id)).map_err(kv_err)?;

        info!("employee {employee_id} clocked out: {hours}h, {wages} earned");
        Ok(entry)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The employee's open entry, if clocked in.
    pub fn active_entry(&self, employee_id: &str) -> Result<Option<ClockEntry>, ServiceError> {
        match self.kv.get(&active_key(employee_id)).map_err(kv_err)? {
            Some(bytes) => {
                let entry = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad active-clock record: {e}")))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Full clock history for an office.
    pub fn history(&self, office_id: &str) -> Result<Vec<ClockEntry>, ServiceError> {
        let entries = self.kv.scan(&history_prefix(office_id)).map_err(kv_err)?;
        entries
            .iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record at {key}: {e}")))
            })
            .collect()
    }

    fn lookup_employee(
        &self,
        office_id: &str,
        employee_id: &str,
    ) -> Result<Employee, ServiceError> {
        let key = buziz_office::keys::employee(office_id, employee_id);
        match self.kv.get(&key).map_err(kv_err)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Storage(format!("bad employee record: {e}"))),
            None => Err(ServiceError::NotFound(format!("employee {employee_id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use buziz_kv::MemoryStore;
    use buziz_office::model::{CreateOfficeRequest, JoinOfficeRequest};
    use buziz_office::service::OfficeService;

    use super::*;

    /// One office, one non-creator employee at payRate 20.
    fn setup() -> (TimeclockService, String, String) {
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        let offices = OfficeService::new(Arc::clone(&kv));

        let office = offices
            .create_office(CreateOfficeRequest {
                user_id: "u1".into(),
                user_name: "Dana".into(),
                office_name: "HQ".into(),
            })
            .unwrap();
        let employee = offices
            .join_office(JoinOfficeRequest {
                user_id: "u2".into(),
                code: office.code.clone(),
                name: "Kim".into(),
            })
            .unwrap();
        offices
            .update_employee(&office.id, &employee.id, serde_json::json!({"payRate": 20.0}))
            .unwrap();

        (TimeclockService::new(kv), office.id, employee.id)
    }

    #[test]
    fn two_hours_at_twenty_earns_forty() {
        let (clock, office_id, employee_id) = setup();

        let start = Utc::now();
        clock.clock_in_at(&employee_id, &office_id, start).unwrap();
        assert!(clock.active_entry(&employee_id).unwrap().is_some());

        let entry = clock
            .clock_out_at(&employee_id, &office_id, start + Duration::hours(2))
            .unwrap();
        assert_eq!(entry.hours_worked, Some(2.0));
        assert_eq!(entry.wages_earned, Some(40.0));
        assert!(clock.active_entry(&employee_id).unwrap().is_none());
    }

    #[test]
    fn clock_out_without_clock_in_fails() {
        let (clock, office_id, employee_id) = setup();
        let err = clock.clock_out(&employee_id, &office_id).unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert!(msg.contains("no active clock-in")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn double_clock_in_conflicts() {
        let (clock, office_id, employee_id) = setup();
        clock.clock_in(&employee_id, &office_id).unwrap();
        let err = clock.clock_in(&employee_id, &office_id).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn history_entry_is_replaced_not_appended() {
        let (clock, office_id, employee_id) = setup();

        let start = Utc::now();
        let open = clock.clock_in_at(&employee_id, &office_id, start).unwrap();
        assert_eq!(clock.history(&office_id).unwrap().len(), 1);

        clock
            .clock_out_at(&employee_id, &office_id, start + Duration::minutes(90))
            .unwrap();

        let history = clock.history(&office_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, open.id);
        assert_eq!(history[0].hours_worked, Some(1.5));
        assert_eq!(history[0].wages_earned, Some(30.0));
    }

    #[test]
    fn unknown_employee_cannot_clock_in() {
        let (clock, office_id, _) = setup();
        let err = clock.clock_in("ghost", &office_id).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
