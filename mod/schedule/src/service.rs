use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use buziz_core::{ServiceError, new_id, now_rfc3339};
use buziz_kv::{KVError, KVStore};

use crate::expand::{HORIZON_DAYS, expand_patterns};
use crate::model::{CreatePatternRequest, CreateShiftRequest, RecurringPattern, Shift};

fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

fn shift_key(office_id: &str, shift_id: &str) -> String {
    format!("office:{office_id}:shifts:{shift_id}")
}

fn shifts_prefix(office_id: &str) -> String {
    format!("office:{office_id}:shifts:")
}

fn pattern_key(office_id: &str, pattern_id: &str) -> String {
    format!("office:{office_id}:recurring:{pattern_id}")
}

fn patterns_prefix(office_id: &str) -> String {
    format!("office:{office_id}:recurring:")
}

pub struct ScheduleService {
    kv: Arc<dyn KVStore>,
}

impl ScheduleService {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    // -----------------------------------------------------------------------
    // Shifts
    // -----------------------------------------------------------------------

    pub fn create_shift(
        &self,
        office_id: &str,
        req: CreateShiftRequest,
    ) -> Result<Shift, ServiceError> {
        validate_date(&req.date)?;
        let shift = Shift {
            id: new_id(),
            office_id: office_id.to_string(),
            date: req.date,
            title: req.title,
            start_time: req.start_time,
            end_time: req.end_time,
            assigned_to: req.assigned_to,
            assignment_type: req.assignment_type,
            notes: req.notes,
            is_recurring: false,
            recurring_id: None,
            created_at: now_rfc3339(),
        };
        self.put_json(&shift_key(office_id, &shift.id), &shift)?;
        Ok(shift)
    }

    pub fn list_shifts(&self, office_id: &str) -> Result<Vec<Shift>, ServiceError> {
        self.scan_json(&shifts_prefix(office_id))
    }

    pub fn get_shift(&self, office_id: &str, shift_id: &str) -> Result<Shift, ServiceError> {
        self.get_json(&shift_key(office_id, shift_id))?
            .ok_or_else(|| ServiceError::NotFound(format!("shift {shift_id}")))
    }

    pub fn delete_shift(&self, office_id: &str, shift_id: &str) -> Result<(), ServiceError> {
        self.get_shift(office_id, shift_id)?;
        self.kv.delete(&shift_key(office_id, shift_id)).map_err(kv_err)
    }

    // -----------------------------------------------------------------------
    // Recurring patterns
    // -----------------------------------------------------------------------

    /// Create a pattern and immediately materialize its instances.
    pub fn create_pattern(
        &self,
        office_id: &str,
        req: CreatePatternRequest,
    ) -> Result<RecurringPattern, ServiceError> {
        validate_date(&req.start_date)?;
        if let Some(end) = &req.end_date {
            validate_date(end)?;
        }
        if req.days_of_week.iter().any(|d| *d > 6) {
            return Err(ServiceError::Validation(
                "daysOfWeek entries must be 0 (Sunday) through 6 (Saturday)".into(),
            ));
        }

        let pattern = RecurringPattern {
            id: new_id(),
            office_id: office_id.to_string(),
            title: req.title,
            start_time: req.start_time,
            end_time: req.end_time,
            assigned_to: req.assigned_to,
            assignment_type: req.assignment_type,
            notes: req.notes,
            frequency: req.frequency,
            days_of_week: req.days_of_week,
            start_date: req.start_date,
            end_date: req.end_date,
            created_at: now_rfc3339(),
        };
        self.put_json(&pattern_key(office_id, &pattern.id), &pattern)?;
        self.materialize(office_id)?;
        Ok(pattern)
    }

    pub fn list_patterns(&self, office_id: &str) -> Result<Vec<RecurringPattern>, ServiceError> {
        self.scan_json(&patterns_prefix(office_id))
    }

    pub fn get_pattern(
        &self,
        office_id: &str,
        pattern_id: &str,
    ) -> Result<RecurringPattern, ServiceError> {
        self.get_json(&pattern_key(office_id, pattern_id))?
            .ok_or_else(|| ServiceError::NotFound(format!("pattern {pattern_id}")))
    }

    /// Delete a pattern. Already-materialized shifts stay on the calendar.
    pub fn delete_pattern(&self, office_id: &str, pattern_id: &str) -> Result<(), ServiceError> {
        self.get_pattern(office_id, pattern_id)?;
        self.kv
            .delete(&pattern_key(office_id, pattern_id))
            .map_err(kv_err)
    }

    // -----------------------------------------------------------------------
    // Materialization
    // -----------------------------------------------------------------------

    /// Expand the office's patterns over the forward horizon and persist
    /// only the instances not already on the calendar. Idempotent.
    pub fn materialize(&self, office_id: &str) -> Result<usize, ServiceError> {
        self.materialize_at(office_id, Utc::now().date_naive())
    }

    pub fn materialize_at(
        &self,
        office_id: &str,
        today: NaiveDate,
    ) -> Result<usize, ServiceError> {
        let patterns = self.list_patterns(office_id)?;
        let existing = self.list_shifts(office_id)?;
        let new_shifts = expand_patterns(&patterns, &existing, today, HORIZON_DAYS);
        if new_shifts.is_empty() {
            return Ok(0);
        }

        let encoded: Vec<(String, Vec<u8>)> = new_shifts
            .iter()
            .map(|s| {
                let bytes =
                    serde_json::to_vec(s).map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok((shift_key(office_id, &s.id), bytes))
            })
            .collect::<Result<_, ServiceError>>()?;
        let pairs: Vec<(&str, &[u8])> = encoded
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        self.kv.batch_set(&pairs).map_err(kv_err)?;

        info!(
            "materialized {} shifts for office {office_id}",
            new_shifts.len()
        );
        Ok(new_shifts.len())
    }

    /// Materialize every office that has at least one pattern. Offices
    /// are discovered from the pattern keyspace itself.
    pub fn materialize_all(&self) -> Result<usize, ServiceError> {
        let entries = self.kv.scan("office:").map_err(kv_err)?;
        let mut offices: Vec<String> = entries
            .iter()
            .filter_map(|(key, _)| {
                let rest = key.strip_prefix("office:")?;
                let (office_id, tail) = rest.split_once(':')?;
                tail.starts_with("recurring:").then(|| office_id.to_string())
            })
            .collect();
        offices.dedup();

        let mut total = 0;
        for office_id in offices {
            total += self.materialize(&office_id)?;
        }
        Ok(total)
    }

    // -----------------------------------------------------------------------
    // JSON helpers
    // -----------------------------------------------------------------------

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, ServiceError> {
        match self.kv.get(key).map_err(kv_err)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record at {key}: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn put_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), ServiceError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv.set(key, &bytes).map_err(kv_err)
    }

    fn scan_json<T: serde::de::DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, ServiceError> {
        let entries = self.kv.scan(prefix).map_err(kv_err)?;
        entries
            .iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(bytes)
                    .map_err(|e| ServiceError::Storage(format!("bad record at {key}: {e}")))
            })
            .collect()
    }
}

fn validate_date(s: &str) -> Result<(), ServiceError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ServiceError::Validation(format!("invalid date {s:?}, expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use buziz_kv::MemoryStore;

    use crate::model::Frequency;

    use super::*;

    fn service() -> ScheduleService {
        ScheduleService::new(Arc::new(MemoryStore::new()))
    }

    fn pattern_req(days: &[u8]) -> CreatePatternRequest {
        CreatePatternRequest {
            title: "Opening".into(),
            start_time: "09:00".into(),
            end_time: "13:00".into(),
            assigned_to: None,
            assignment_type: None,
            notes: None,
            frequency: Frequency::Weekly,
            days_of_week: days.to_vec(),
            start_date: "2026-01-01".into(),
            end_date: None,
        }
    }

    #[test]
    fn create_pattern_materializes_instances() {
        let svc = service();
        let pattern = svc.create_pattern("o1", pattern_req(&[1, 3, 5])).unwrap();

        let shifts = svc.list_shifts("o1").unwrap();
        assert!(!shifts.is_empty());
        assert!(
            shifts
                .iter()
                .all(|s| s.recurring_id.as_deref() == Some(pattern.id.as_str()))
        );
    }

    #[test]
    fn materialize_twice_adds_nothing() {
        let svc = service();
        svc.create_pattern("o1", pattern_req(&[2])).unwrap();

        let count = svc.list_shifts("o1").unwrap().len();
        assert_eq!(svc.materialize("o1").unwrap(), 0);
        assert_eq!(svc.list_shifts("o1").unwrap().len(), count);
    }

    #[test]
    fn deleting_pattern_keeps_materialized_shifts() {
        let svc = service();
        let pattern = svc.create_pattern("o1", pattern_req(&[4])).unwrap();
        let count = svc.list_shifts("o1").unwrap().len();
        assert!(count > 0);

        svc.delete_pattern("o1", &pattern.id).unwrap();
        assert!(svc.list_patterns("o1").unwrap().is_empty());
        assert_eq!(svc.list_shifts("o1").unwrap().len(), count);
    }

    #[test]
    fn invalid_weekday_is_rejected() {
        let svc = service();
        let err = svc.create_pattern("o1", pattern_req(&[7])).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn manual_shift_crud() {
        let svc = service();
        let shift = svc
            .create_shift(
                "o1",
                CreateShiftRequest {
                    date: "2026-04-01".into(),
                    title: "Inventory".into(),
                    start_time: "18:00".into(),
                    end_time: "20:00".into(),
                    assigned_to: Some("e1".into()),
                    assignment_type: Some("employee".into()),
                    notes: None,
                },
            )
            .unwrap();
        assert!(!shift.is_recurring);

        assert_eq!(svc.get_shift("o1", &shift.id).unwrap().title, "Inventory");
        svc.delete_shift("o1", &shift.id).unwrap();
        assert!(matches!(
            svc.get_shift("o1", &shift.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn materialize_all_discovers_offices() {
        let svc = service();
        svc.create_pattern("o1", pattern_req(&[1])).unwrap();
        svc.create_pattern("o2", pattern_req(&[2])).unwrap();

        // Instances were written at creation; a fresh pass is a no-op.
        assert_eq!(svc.materialize_all().unwrap(), 0);
        assert!(!svc.list_shifts("o2").unwrap().is_empty());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let svc = service();
        let err = svc
            .create_shift(
                "o1",
                CreateShiftRequest {
                    date: "04/01/2026".into(),
                    title: "x".into(),
                    start_time: "09:00".into(),
                    end_time: "10:00".into(),
                    assigned_to: None,
                    assignment_type: None,
                    notes: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
