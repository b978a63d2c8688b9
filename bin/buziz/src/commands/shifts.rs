//! Schedule commands.

use anyhow::Result;

use buziz_schedule::service::ScheduleService;

use crate::config::Context;

pub fn list(ctx: &Context, office_id: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = ScheduleService::new(kv);

    let shifts = service.list_shifts(office_id)?;
    if shifts.is_empty() {
        println!("No shifts scheduled.");
        return Ok(());
    }

    println!("{:12} {:7} {:7} {:20} {:10}", "DATE", "START", "END", "TITLE", "ASSIGNED");
    for shift in &shifts {
        println!(
            "{:12} {:7} {:7} {:20} {:10}",
            shift.date,
            shift.start_time,
            shift.end_time,
            shift.title,
            shift.assigned_to.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

pub fn materialize(ctx: &Context, office_id: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = ScheduleService::new(kv);

    let generated = service.materialize(office_id)?;
    println!("Generated {generated} shifts.");
    Ok(())
}
