// server/src/cli/cli.rs

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use log::debug;
use scheduling::{is_allowed, Action, AppointmentScheduler, DirectoryService, RecordsService};
use storage::{create_store, load_store_config_from_yaml, RecordStore};

use crate::cli::commands::{Command, MedischedCli};
use crate::cli::{handlers_appointments, handlers_directory, handlers_records};

/// Services shared by every handler.
pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub scheduler: AppointmentScheduler,
    pub directory: DirectoryService,
    pub records: RecordsService,
}

fn required_action(command: &Command) -> Action {
    use crate::cli::commands::{DoctorCommand, PatientCommand, RecordCommand};
    match command {
        Command::Schedule(_) => Action::ScheduleAppointment,
        Command::Cancel(_) => Action::CancelAppointment,
        Command::SetStatus(_) => Action::ChangeAppointmentStatus,
        Command::Slots(_) => Action::ViewAvailability,
        Command::Appointments(_) => Action::ViewAppointments,
        Command::Doctor(sub) => match sub {
            DoctorCommand::Show { .. } | DoctorCommand::List { .. } | DoctorCommand::Stats => {
                Action::ViewAvailability
            }
            _ => Action::ManageDoctors,
        },
        Command::Patient(sub) => match sub {
            PatientCommand::Show { .. } | PatientCommand::List | PatientCommand::Stats => {
                Action::ViewAppointments
            }
            _ => Action::ManagePatients,
        },
        Command::Record(sub) => match sub {
            RecordCommand::Add(_) => Action::CreateMedicalRecord,
            _ => Action::ViewMedicalRecords,
        },
    }
}

pub async fn start_cli() -> Result<()> {
    let cli = MedischedCli::parse();

    let action = required_action(&cli.command);
    if !is_allowed(cli.role, action) {
        bail!("role '{}' is not allowed to perform this action", cli.role);
    }
    debug!("Role {} authorized for {:?}", cli.role, action);

    let mut config = load_store_config_from_yaml(cli.config.as_deref())?;
    if let Some(engine) = cli.storage {
        config.engine = engine;
    }
    let store = create_store(&config).await?;

    let services = Services {
        store: store.clone(),
        scheduler: AppointmentScheduler::new(store.clone()),
        directory: DirectoryService::new(store.clone()),
        records: RecordsService::new(store.clone()),
    };

    let outcome = dispatch(&services, cli.command).await;
    services.store.close().await?;
    outcome
}

async fn dispatch(services: &Services, command: Command) -> Result<()> {
    match command {
        Command::Schedule(args) => handlers_appointments::handle_schedule(services, args).await,
        Command::Cancel(args) => handlers_appointments::handle_cancel(services, args).await,
        Command::SetStatus(args) => handlers_appointments::handle_set_status(services, args).await,
        Command::Slots(args) => handlers_appointments::handle_slots(services, args).await,
        Command::Appointments(args) => handlers_appointments::handle_list(services, args).await,
        Command::Doctor(sub) => handlers_directory::handle_doctor_command(services, sub).await,
        Command::Patient(sub) => handlers_directory::handle_patient_command(services, sub).await,
        Command::Record(sub) => handlers_records::handle_record_command(services, sub).await,
    }
}
