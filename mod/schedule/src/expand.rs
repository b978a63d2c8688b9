//! Recurring-pattern expansion.
//!
//! Pure calendar arithmetic: no storage, no clock. The service decides
//! what "today" is and persists whatever comes back.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate};

use buziz_core::{new_id, now_rfc3339};

use crate::model::{Frequency, RecurringPattern, Shift};

/// Forward horizon for materialized shifts.
pub const HORIZON_DAYS: u64 = 90;

/// Expand `patterns` into the concrete shifts needed to cover
/// `[today, today + horizon_days]`, skipping every `(date, recurring_id)`
/// pair already present in `existing`.
///
/// Degenerate patterns (start after end, unparseable dates, an empty
/// weekday set on a weekly/biweekly pattern) contribute nothing.
pub fn expand_patterns(
    patterns: &[RecurringPattern],
    existing: &[Shift],
    today: NaiveDate,
    horizon_days: u64,
) -> Vec<Shift> {
    let horizon = today + Days::new(horizon_days);

    let mut seen: HashSet<(NaiveDate, String)> = existing
        .iter()
        .filter_map(|s| {
            let rid = s.recurring_id.clone()?;
            let date = parse_date(&s.date)?;
            Some((date, rid))
        })
        .collect();

    let mut generated = Vec::new();
    for pattern in patterns {
        let Some(start) = parse_date(&pattern.start_date) else {
            continue;
        };
        let end = pattern
            .end_date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(horizon)
            .min(horizon);

        let mut date = start.max(today);
        while date <= end {
            if matches_rule(pattern, start, date) {
                let key = (date, pattern.id.clone());
                if !seen.contains(&key) {
                    seen.insert(key);
                    generated.push(instance(pattern, date));
                }
            }
            date = date + Days::new(1);
        }
    }
    generated
}

fn matches_rule(pattern: &RecurringPattern, start: NaiveDate, date: NaiveDate) -> bool {
    // 0 = Sunday, matching the stored days_of_week convention.
    let weekday = date.weekday().num_days_from_sunday() as u8;
    match pattern.frequency {
        Frequency::Weekly => pattern.days_of_week.contains(&weekday),
        Frequency::Biweekly => {
            // Anchor to the Sunday of the start date's week so every day
            // of an "on" week is on, regardless of which weekday the
            // pattern started.
            let anchor = start - Days::new(start.weekday().num_days_from_sunday() as u64);
            let weeks = (date - anchor).num_days() / 7;
            pattern.days_of_week.contains(&weekday) && weeks % 2 == 0
        }
        // Same day-of-month as the start date; shorter months skip.
        Frequency::Monthly => date.day() == start.day(),
    }
}

fn instance(pattern: &RecurringPattern, date: NaiveDate) -> Shift {
    Shift {
        id: new_id(),
        office_id: pattern.office_id.clone(),
        date: date.format("%Y-%m-%d").to_string(),
        title: pattern.title.clone(),
        start_time: pattern.start_time.clone(),
        end_time: pattern.end_time.clone(),
        assigned_to: pattern.assigned_to.clone(),
        assignment_type: pattern.assignment_type.clone(),
        notes: pattern.notes.clone(),
        is_recurring: true,
        recurring_id: Some(pattern.id.clone()),
        created_at: now_rfc3339(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn pattern(frequency: Frequency, days: &[u8], start: &str, end: Option<&str>) -> RecurringPattern {
        RecurringPattern {
            id: "p1".into(),
            office_id: "o1".into(),
            title: "Open".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            assigned_to: None,
            assignment_type: None,
            notes: None,
            frequency,
            days_of_week: days.to_vec(),
            start_date: start.into(),
            end_date: end.map(str::to_string),
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn weekly_covers_every_matching_weekday_in_horizon() {
        // Mon/Wed/Fri over 90 days.
        let p = pattern(Frequency::Weekly, &[1, 3, 5], "2026-01-01", None);
        let today = date("2026-03-02"); // a Monday

        let shifts = expand_patterns(&[p], &[], today, 90);

        let mut expected = 0;
        let mut d = today;
        while d <= today + Days::new(90) {
            if [1, 3, 5].contains(&(d.weekday().num_days_from_sunday() as u8)) {
                expected += 1;
            }
            d = d + Days::new(1);
        }
        assert_eq!(shifts.len(), expected);
        assert!(shifts.iter().all(|s| s.is_recurring));
        assert!(shifts.iter().all(|s| s.recurring_id.as_deref() == Some("p1")));
    }

    #[test]
    fn expansion_is_idempotent() {
        let p = pattern(Frequency::Weekly, &[2], "2026-01-01", None);
        let today = date("2026-03-02");

        let first = expand_patterns(std::slice::from_ref(&p), &[], today, 90);
        assert!(!first.is_empty());

        let second = expand_patterns(&[p], &first, today, 90);
        assert!(second.is_empty());
    }

    #[test]
    fn biweekly_skips_alternate_weeks() {
        // 2026-03-02 is a Monday; its week anchor is Sunday 2026-03-01.
        let p = pattern(Frequency::Biweekly, &[1], "2026-03-02", None);
        let today = date("2026-03-01");

        let shifts = expand_patterns(&[p], &[], today, 28);
        let dates: Vec<&str> = shifts.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-02", "2026-03-16"]);
    }

    #[test]
    fn monthly_matches_day_of_month_and_skips_short_months() {
        let p = pattern(Frequency::Monthly, &[], "2026-01-31", None);
        let today = date("2026-01-31");

        let shifts = expand_patterns(&[p], &[], today, 120);
        let dates: Vec<&str> = shifts.iter().map(|s| s.date.as_str()).collect();
        // February has no 31st; March and May do.
        assert_eq!(dates, vec!["2026-01-31", "2026-03-31", "2026-05-31"]);
    }

    #[test]
    fn degenerate_patterns_produce_nothing() {
        let today = date("2026-03-01");

        // Start after end.
        let inverted = pattern(Frequency::Weekly, &[1], "2026-06-01", Some("2026-05-01"));
        assert!(expand_patterns(&[inverted], &[], today, 90).is_empty());

        // Empty weekday set.
        let empty = pattern(Frequency::Weekly, &[], "2026-01-01", None);
        assert!(expand_patterns(&[empty], &[], today, 90).is_empty());

        // Unparseable start date.
        let bad = pattern(Frequency::Weekly, &[1], "not-a-date", None);
        assert!(expand_patterns(&[bad], &[], today, 90).is_empty());
    }

    #[test]
    fn end_date_caps_the_range() {
        let p = pattern(Frequency::Weekly, &[1], "2026-03-02", Some("2026-03-09"));
        let today = date("2026-03-01");

        let shifts = expand_patterns(&[p], &[], today, 90);
        let dates: Vec<&str> = shifts.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-02", "2026-03-09"]);
    }
}
