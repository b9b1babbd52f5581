// server/src/cli/handlers_appointments.rs

use anyhow::Result;
use scheduling::NewAppointment;
use storage::AppointmentFilter;

use crate::cli::cli::Services;
use crate::cli::commands::{AppointmentsArgs, CancelArgs, ScheduleArgs, SetStatusArgs, SlotsArgs};

pub async fn handle_schedule(services: &Services, args: ScheduleArgs) -> Result<()> {
    let appointment = services
        .scheduler
        .schedule(NewAppointment {
            doctor_id: args.doctor,
            patient_id: args.patient,
            date_time: args.at,
            duration_minutes: args.duration,
            reason: args.reason,
        })
        .await?;
    println!("==> Appointment scheduled");
    println!("{}", serde_json::to_string_pretty(&appointment)?);
    Ok(())
}

pub async fn handle_cancel(services: &Services, args: CancelArgs) -> Result<()> {
    let appointment = services.scheduler.cancel(&args.id, args.reason).await?;
    println!("==> Appointment cancelled");
    println!("{}", serde_json::to_string_pretty(&appointment)?);
    Ok(())
}

pub async fn handle_set_status(services: &Services, args: SetStatusArgs) -> Result<()> {
    let appointment = services
        .scheduler
        .change_status(&args.id, args.status, args.reason)
        .await?;
    println!("==> Appointment {} is now {}", appointment.id, appointment.status);
    Ok(())
}

pub async fn handle_slots(services: &Services, args: SlotsArgs) -> Result<()> {
    let slots = services.scheduler.available_slots(&args.doctor, args.date).await?;
    if slots.is_empty() {
        println!("==> No free slots on {}", args.date);
        return Ok(());
    }
    println!("==> {} free slots on {}", slots.len(), args.date);
    for slot in slots {
        println!("{}", slot.to_rfc3339());
    }
    Ok(())
}

pub async fn handle_list(services: &Services, args: AppointmentsArgs) -> Result<()> {
    let filter = AppointmentFilter {
        doctor_id: args.doctor,
        patient_id: args.patient,
        status_in: if args.status.is_empty() { None } else { Some(args.status) },
        from: None,
        until: None,
    };
    let appointments = services.scheduler.list(&filter).await?;
    println!("==> {} appointments", appointments.len());
    println!("{}", serde_json::to_string_pretty(&appointments)?);
    Ok(())
}
