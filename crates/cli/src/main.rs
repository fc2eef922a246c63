use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use carebook_core::constants::{DEFAULT_BOOKING_DATA_DIR, DEFAULT_CLINIC_LABEL};
use carebook_core::repositories::appointments::FsAppointmentStore;
use carebook_core::repositories::patients::PatientDirectory;
use carebook_core::{
    AppointmentStore, AppointmentWorkflow, CoreConfig, NonEmptyText, OperationKind,
    RawFieldValues, RecordId, StatusTally, SubmitContext, WorkflowOutcome,
};

#[derive(Parser)]
#[command(name = "carebook")]
#[command(about = "carebook appointment portal CLI")]
struct Cli {
    /// Booking data directory (defaults to $CAREBOOK_DATA_DIR or "booking_data")
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a patient
    Register {
        /// Patient full name
        name: String,
        /// Contact email
        email: String,
        /// Contact phone
        phone: String,
    },
    /// Request a new appointment
    Book {
        /// Portal user id submitting the booking
        user_id: String,
        /// Registered patient id
        patient_id: String,
        /// Physician to see
        physician: String,
        /// Appointment time (RFC 3339, e.g. 2026-09-01T10:00:00Z)
        schedule: String,
        /// Reason for the appointment
        reason: String,
        /// Free-text note (optional)
        #[arg(long)]
        note: Option<String>,
    },
    /// Confirm an existing appointment
    Schedule {
        /// Appointment id
        appointment_id: String,
        /// Portal user id
        user_id: String,
        /// Physician to see
        physician: String,
        /// Appointment time (RFC 3339)
        schedule: String,
    },
    /// Cancel an existing appointment
    Cancel {
        /// Appointment id
        appointment_id: String,
        /// Portal user id
        user_id: String,
        /// Reason for cancellation
        reason: String,
    },
    /// List all appointments
    List,
    /// Show appointment tallies per status
    Counts,
    /// List registered patients
    Patients,
}

fn build_config(data_dir: Option<PathBuf>) -> Result<Arc<CoreConfig>, Box<dyn std::error::Error>> {
    let booking_data_dir = data_dir
        .or_else(|| std::env::var("CAREBOOK_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BOOKING_DATA_DIR));
    std::fs::create_dir_all(&booking_data_dir)?;

    let clinic_label = match std::env::var("CAREBOOK_CLINIC") {
        Ok(label) => NonEmptyText::new(label)?,
        Err(_) => NonEmptyText::new(DEFAULT_CLINIC_LABEL)?,
    };

    Ok(Arc::new(CoreConfig::new(booking_data_dir, clinic_label)?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = build_config(cli.data_dir)?;
    let store: Arc<dyn AppointmentStore> = Arc::new(FsAppointmentStore::new(cfg.clone()));
    let workflow = AppointmentWorkflow::new(store.clone());

    match cli.command {
        Some(Commands::Register { name, email, phone }) => {
            let directory = PatientDirectory::new(cfg);
            match directory.register(NonEmptyText::new(&name)?, &email, &phone) {
                Ok(patient) => println!("Registered patient with ID: {}", patient.id),
                Err(e) => eprintln!("Error registering patient: {}", e),
            }
        }
        Some(Commands::Book {
            user_id,
            patient_id,
            physician,
            schedule,
            reason,
            note,
        }) => {
            let fields = RawFieldValues {
                primary_physician: Some(physician),
                schedule: Some(schedule),
                reason: Some(reason),
                note,
                cancellation_reason: None,
            };
            let context = SubmitContext {
                user_id,
                patient_id: Some(patient_id),
                appointment_id: None,
            };
            match workflow.submit(OperationKind::Create, &fields, context).await {
                Ok(WorkflowOutcome::Confirmation { appointment_id, .. }) => {
                    println!("Created appointment with ID: {}", appointment_id);
                }
                Ok(WorkflowOutcome::CloseAndReset) => {}
                Err(e) => eprintln!("Error creating appointment: {}", e),
            }
        }
        Some(Commands::Schedule {
            appointment_id,
            user_id,
            physician,
            schedule,
        }) => {
            let fields = RawFieldValues {
                primary_physician: Some(physician),
                schedule: Some(schedule),
                ..Default::default()
            };
            let context = SubmitContext {
                user_id,
                patient_id: None,
                appointment_id: Some(RecordId::parse(&appointment_id)?),
            };
            match workflow
                .submit(OperationKind::Schedule, &fields, context)
                .await
            {
                Ok(_) => println!("Scheduled appointment: {}", appointment_id),
                Err(e) => eprintln!("Error scheduling appointment: {}", e),
            }
        }
        Some(Commands::Cancel {
            appointment_id,
            user_id,
            reason,
        }) => {
            let fields = RawFieldValues {
                cancellation_reason: Some(reason),
                ..Default::default()
            };
            let context = SubmitContext {
                user_id,
                patient_id: None,
                appointment_id: Some(RecordId::parse(&appointment_id)?),
            };
            match workflow.submit(OperationKind::Cancel, &fields, context).await {
                Ok(_) => println!("Cancelled appointment: {}", appointment_id),
                Err(e) => eprintln!("Error cancelling appointment: {}", e),
            }
        }
        Some(Commands::List) => match store.list_appointments().await {
            Ok(appointments) => {
                if appointments.is_empty() {
                    println!("No appointments found.");
                } else {
                    for appointment in appointments {
                        println!(
                            "ID: {}, Patient: {}, Physician: {}, When: {}, Status: {}",
                            appointment.id,
                            appointment.patient,
                            appointment.primary_physician,
                            appointment.schedule.to_rfc3339(),
                            appointment.status
                        );
                    }
                }
            }
            Err(e) => eprintln!("Error listing appointments: {}", e),
        },
        Some(Commands::Counts) => match store.list_appointments().await {
            Ok(appointments) => {
                let tally = StatusTally::of(&appointments);
                println!(
                    "Scheduled: {}, Pending: {}, Cancelled: {}",
                    tally.scheduled, tally.pending, tally.cancelled
                );
            }
            Err(e) => eprintln!("Error counting appointments: {}", e),
        },
        Some(Commands::Patients) => {
            let directory = PatientDirectory::new(cfg);
            let patients = directory.list();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Email: {}, Phone: {}",
                        patient.id, patient.name, patient.email, patient.phone
                    );
                }
            }
        }
        None => {
            println!("Use 'carebook --help' for commands");
        }
    }

    Ok(())
}
