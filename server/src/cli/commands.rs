// server/src/cli/commands.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use models::medical::AppointmentStatus;
use models::schedule::Weekday;
use scheduling::Role;
use std::path::PathBuf;
use storage::{parse_store_engine, StoreEngineType};
use uuid::Uuid;

/// Custom parser for appointment instants: RFC 3339, or the short local
/// form `YYYY-MM-DDTHH:MM` interpreted as UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            format!(
                "Invalid date-time '{}'. Use RFC 3339 (2024-01-15T10:00:00Z) or YYYY-MM-DDTHH:MM",
                value
            )
        })
}

/// Custom parser for `HH:MM` wall-clock times.
pub fn parse_wall_clock(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| format!("Invalid time '{}'. Use HH:MM, e.g. 09:00", value))
}

#[derive(Debug, Parser)]
#[command(name = "medisched", about = "Medical appointment and records service", version)]
pub struct MedischedCli {
    /// Path to the YAML store configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store engine override (sled, inmemory)
    #[arg(long, global = true, value_parser = parse_store_engine)]
    pub storage: Option<StoreEngineType>,

    /// Role the command runs as; checked against the authorization policy
    #[arg(long, global = true, default_value = "admin")]
    pub role: Role,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Book a new appointment
    Schedule(ScheduleArgs),
    /// Cancel an appointment (requires 24 hours notice)
    Cancel(CancelArgs),
    /// Move an appointment to a new status
    SetStatus(SetStatusArgs),
    /// List a doctor's free 30-minute slots on a date
    Slots(SlotsArgs),
    /// List appointments
    Appointments(AppointmentsArgs),
    /// Doctor directory
    #[command(subcommand)]
    Doctor(DoctorCommand),
    /// Patient directory
    #[command(subcommand)]
    Patient(PatientCommand),
    /// Medical records
    #[command(subcommand)]
    Record(RecordCommand),
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub doctor: Uuid,
    #[arg(long)]
    pub patient: Uuid,
    #[arg(long, value_parser = parse_instant)]
    pub at: DateTime<Utc>,
    /// Minutes; defaults to the standard 30-minute slot
    #[arg(long)]
    pub duration: Option<i32>,
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Debug, Args)]
pub struct CancelArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Debug, Args)]
pub struct SetStatusArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub status: AppointmentStatus,
    /// Cancellation reason, used when the target status is cancelled
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Debug, Args)]
pub struct SlotsArgs {
    #[arg(long)]
    pub doctor: Uuid,
    /// Calendar date, YYYY-MM-DD
    #[arg(long)]
    pub date: NaiveDate,
}

#[derive(Debug, Args)]
pub struct AppointmentsArgs {
    #[arg(long)]
    pub doctor: Option<Uuid>,
    #[arg(long)]
    pub patient: Option<Uuid>,
    /// Restrict to one or more statuses
    #[arg(long)]
    pub status: Vec<AppointmentStatus>,
}

#[derive(Debug, Subcommand)]
pub enum DoctorCommand {
    /// Register a doctor
    Add(DoctorAddArgs),
    /// Show one doctor
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// List doctors
    List {
        #[arg(long)]
        specialty: Option<String>,
    },
    /// Update a doctor's profile or schedule
    Update(DoctorUpdateArgs),
    /// Soft-delete a doctor
    Deactivate {
        #[arg(long)]
        id: Uuid,
    },
    /// Counts by status
    Stats,
}

#[derive(Debug, Args)]
pub struct DoctorAddArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub license: String,
    #[arg(long)]
    pub specialty: Vec<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Working days; defaults to Monday through Friday
    #[arg(long)]
    pub days: Vec<Weekday>,
    #[arg(long, value_parser = parse_wall_clock)]
    pub start: Option<NaiveTime>,
    #[arg(long, value_parser = parse_wall_clock)]
    pub end: Option<NaiveTime>,
}

#[derive(Debug, Args)]
pub struct DoctorUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub specialty: Vec<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub days: Vec<Weekday>,
    #[arg(long, value_parser = parse_wall_clock)]
    pub start: Option<NaiveTime>,
    #[arg(long, value_parser = parse_wall_clock)]
    pub end: Option<NaiveTime>,
    /// active, inactive, or vacation
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PatientCommand {
    /// Register a patient
    Add(PatientAddArgs),
    /// Show one patient
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// List patients
    List,
    /// Update a patient's contact details
    Update(PatientUpdateArgs),
    /// Soft-delete a patient (refused while appointments are upcoming)
    Deactivate {
        #[arg(long)]
        id: Uuid,
    },
    /// Counts by status
    Stats,
}

#[derive(Debug, Args)]
pub struct PatientAddArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub born: Option<NaiveDate>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct PatientUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// Append a medical record
    Add(RecordAddArgs),
    /// Show one record
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// List a patient's records, newest first
    List {
        #[arg(long)]
        patient: Uuid,
    },
    /// Search records by diagnosis text
    Search {
        #[arg(long)]
        diagnosis: String,
    },
}

#[derive(Debug, Args)]
pub struct RecordAddArgs {
    #[arg(long)]
    pub doctor: Uuid,
    #[arg(long)]
    pub patient: Uuid,
    #[arg(long, value_parser = parse_instant)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub diagnosis: String,
    #[arg(long)]
    pub treatment: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}
