// server/src/cli/handlers_records.rs

use anyhow::Result;
use scheduling::NewMedicalRecord;

use crate::cli::cli::Services;
use crate::cli::commands::{RecordAddArgs, RecordCommand};

pub async fn handle_record_command(services: &Services, command: RecordCommand) -> Result<()> {
    match command {
        RecordCommand::Add(args) => handle_record_add(services, args).await,
        RecordCommand::Show { id } => {
            let record = services.records.get_record(&id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        RecordCommand::List { patient } => {
            let records = services.records.list_for_patient(&patient).await?;
            println!("==> {} records", records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        RecordCommand::Search { diagnosis } => {
            let records = services.records.search_by_diagnosis(&diagnosis).await?;
            println!("==> {} records matching '{}'", records.len(), diagnosis);
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
    }
}

async fn handle_record_add(services: &Services, args: RecordAddArgs) -> Result<()> {
    let record = services
        .records
        .create_record(NewMedicalRecord {
            doctor_id: args.doctor,
            patient_id: args.patient,
            date: args.date,
            diagnosis: args.diagnosis,
            treatment: args.treatment,
            prescriptions: vec![],
            vital_signs: None,
            notes: args.notes,
        })
        .await?;
    println!("==> Medical record created");
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
