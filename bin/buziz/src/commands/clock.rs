//! Time clock commands.

use anyhow::Result;

use buziz_timeclock::service::TimeclockService;

use crate::config::Context;

pub fn clock_in(ctx: &Context, employee_id: &str, office_id: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = TimeclockService::new(kv);

    let entry = service.clock_in(employee_id, office_id)?;
    println!("Clocked in at {}.", entry.clock_in);
    Ok(())
}

pub fn clock_out(ctx: &Context, employee_id: &str, office_id: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = TimeclockService::new(kv);

    let entry = service.clock_out(employee_id, office_id)?;
    println!(
        "Clocked out: {:.2} hours, {:.2} earned.",
        entry.hours_worked.unwrap_or_default(),
        entry.wages_earned.unwrap_or_default()
    );
    Ok(())
}

pub fn status(ctx: &Context, employee_id: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = TimeclockService::new(kv);

    match service.active_entry(employee_id)? {
        Some(entry) => println!("Clocked in since {}.", entry.clock_in),
        None => println!("Not clocked in."),
    }
    Ok(())
}
