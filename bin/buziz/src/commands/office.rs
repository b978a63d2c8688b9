//! Office commands.

use anyhow::Result;

use buziz_office::model::{CreateOfficeRequest, JoinOfficeRequest};
use buziz_office::service::OfficeService;

use crate::config::Context;

pub fn create(ctx: &Context, user_id: &str, user_name: &str, office_name: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = OfficeService::new(kv);

    let office = service.create_office(CreateOfficeRequest {
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        office_name: office_name.to_string(),
    })?;

    println!("Office \"{}\" created.", office.name);
    println!("  ID:        {}", office.id);
    println!("  Join code: {}", office.code);
    Ok(())
}

pub fn join(ctx: &Context, user_id: &str, name: &str, code: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = OfficeService::new(kv);

    let employee = service.join_office(JoinOfficeRequest {
        user_id: user_id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
    })?;

    println!("Joined as employee #{}.", employee.employee_number);
    println!("  Employee ID: {}", employee.id);
    println!("  Role:        {}", employee.role);
    Ok(())
}

pub fn list(ctx: &Context, user_id: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = OfficeService::new(kv);

    let offices = service.user_offices(user_id)?;
    if offices.is_empty() {
        println!("No offices. Run: buziz office create <name> --user <id> --as <name>");
        return Ok(());
    }

    let current = service.current_office(user_id)?.map(|o| o.id);
    println!("{:2} {:34} {:8} {:20}", "", "ID", "CODE", "NAME");
    for office in &offices {
        let marker = if current.as_deref() == Some(office.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{:2} {:34} {:8} {:20}", marker, office.id, office.code, office.name);
    }
    Ok(())
}
