// server/src/cli/handlers_directory.rs

use anyhow::Result;
use models::medical::DoctorStatus;
use models::schedule::WeeklySchedule;
use scheduling::{DoctorUpdate, NewDoctor, NewPatient, PatientUpdate};
use storage::{DoctorFilter, PatientFilter};

use crate::cli::cli::Services;
use crate::cli::commands::{
    DoctorAddArgs, DoctorCommand, DoctorUpdateArgs, PatientAddArgs, PatientCommand,
    PatientUpdateArgs,
};

pub async fn handle_doctor_command(services: &Services, command: DoctorCommand) -> Result<()> {
    match command {
        DoctorCommand::Add(args) => handle_doctor_add(services, args).await,
        DoctorCommand::Show { id } => {
            let doctor = services.directory.find_doctor(&id).await?;
            println!("{}", serde_json::to_string_pretty(&doctor)?);
            Ok(())
        }
        DoctorCommand::List { specialty } => {
            let filter = DoctorFilter {
                specialty,
                status: None,
            };
            let doctors = services.directory.list_doctors(&filter).await?;
            println!("==> {} doctors", doctors.len());
            println!("{}", serde_json::to_string_pretty(&doctors)?);
            Ok(())
        }
        DoctorCommand::Update(args) => handle_doctor_update(services, args).await,
        DoctorCommand::Deactivate { id } => {
            let doctor = services.directory.deactivate_doctor(&id).await?;
            println!("==> Doctor {} deactivated", doctor.id);
            Ok(())
        }
        DoctorCommand::Stats => {
            let stats = services.directory.doctor_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

async fn handle_doctor_add(services: &Services, args: DoctorAddArgs) -> Result<()> {
    let schedule = build_schedule(&args.days, args.start, args.end);
    let doctor = services
        .directory
        .register_doctor(NewDoctor {
            first_name: args.first_name,
            last_name: args.last_name,
            license_number: args.license,
            specialties: args.specialty,
            phone: args.phone,
            email: args.email,
            schedule,
        })
        .await?;
    println!("==> Doctor registered");
    println!("{}", serde_json::to_string_pretty(&doctor)?);
    Ok(())
}

async fn handle_doctor_update(services: &Services, args: DoctorUpdateArgs) -> Result<()> {
    let status = match args.status.as_deref() {
        Some(raw) => Some(raw.parse::<DoctorStatus>().map_err(anyhow::Error::from)?),
        None => None,
    };
    let schedule = build_schedule(&args.days, args.start, args.end);
    let doctor = services
        .directory
        .update_doctor(
            &args.id,
            DoctorUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
                specialties: if args.specialty.is_empty() { None } else { Some(args.specialty) },
                phone: args.phone,
                email: args.email,
                schedule,
                status,
            },
        )
        .await?;
    println!("==> Doctor updated");
    println!("{}", serde_json::to_string_pretty(&doctor)?);
    Ok(())
}

/// A schedule argument group only takes effect when at least one of its
/// parts is given; missing parts fall back to the defaults.
fn build_schedule(
    days: &[models::schedule::Weekday],
    start: Option<chrono::NaiveTime>,
    end: Option<chrono::NaiveTime>,
) -> Option<WeeklySchedule> {
    if days.is_empty() && start.is_none() && end.is_none() {
        return None;
    }
    let defaults = WeeklySchedule::default();
    Some(WeeklySchedule::new(
        if days.is_empty() {
            defaults.working_days.iter().copied().collect::<Vec<_>>()
        } else {
            days.to_vec()
        },
        start.unwrap_or(defaults.start_time),
        end.unwrap_or(defaults.end_time),
    ))
}

pub async fn handle_patient_command(services: &Services, command: PatientCommand) -> Result<()> {
    match command {
        PatientCommand::Add(args) => handle_patient_add(services, args).await,
        PatientCommand::Show { id } => {
            let patient = services.directory.find_patient(&id).await?;
            println!("{}", serde_json::to_string_pretty(&patient)?);
            Ok(())
        }
        PatientCommand::List => {
            let patients = services.directory.list_patients(&PatientFilter::default()).await?;
            println!("==> {} patients", patients.len());
            println!("{}", serde_json::to_string_pretty(&patients)?);
            Ok(())
        }
        PatientCommand::Update(args) => handle_patient_update(services, args).await,
        PatientCommand::Deactivate { id } => {
            let patient = services.directory.deactivate_patient(&id).await?;
            println!("==> Patient {} deactivated", patient.id);
            Ok(())
        }
        PatientCommand::Stats => {
            let stats = services.directory.patient_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

async fn handle_patient_add(services: &Services, args: PatientAddArgs) -> Result<()> {
    let patient = services
        .directory
        .register_patient(NewPatient {
            first_name: args.first_name,
            last_name: args.last_name,
            date_of_birth: args.born,
            phone: args.phone,
            email: args.email,
        })
        .await?;
    println!("==> Patient registered");
    println!("{}", serde_json::to_string_pretty(&patient)?);
    Ok(())
}

async fn handle_patient_update(services: &Services, args: PatientUpdateArgs) -> Result<()> {
    let patient = services
        .directory
        .update_patient(
            &args.id,
            PatientUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
                phone: args.phone,
                email: args.email,
            },
        )
        .await?;
    println!("==> Patient updated");
    println!("{}", serde_json::to_string_pretty(&patient)?);
    Ok(())
}
