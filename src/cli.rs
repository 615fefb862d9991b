//! Command-line entry: the HTTP server plus operator maintenance commands.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::{self, ServerError};
use crate::clinic::{self, ClinicError};
use crate::config::{self, Config, ConfigError};
use crate::core_state::{CoreError, CoreState};
use crate::db::{Database, DatabaseError};

#[derive(Parser, Debug)]
#[command(name = "dispensary", version)]
#[command(about = "Clinic backend: patients, doctors, appointments and visits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// List a user's appointments and the number of registered doctors
    CheckAppointments {
        #[arg(long)]
        email: String,
    },
    /// Delete a user without clinical records
    DeleteUser {
        #[arg(long)]
        email: String,
    },
    /// Store a new password for a user
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Check whether an email/password pair would log in
    VerifyLogin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Clinic(#[from] ClinicError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

impl Cli {
    pub async fn run(self) -> Result<(), CliError> {
        match self.command.unwrap_or(Command::Serve) {
            Command::Serve => serve().await,
            command => maintain(command),
        }
    }
}

async fn serve() -> Result<(), CliError> {
    let config = Config::from_env()?;
    tracing::info!(
        "{} v{} listening on {}",
        config::APP_NAME,
        config::APP_VERSION,
        config.listen_addr()
    );
    let core = Arc::new(CoreState::from_config(&config)?);
    api::serve(core, config.listen_addr()).await?;
    Ok(())
}

fn maintain(command: Command) -> Result<(), CliError> {
    let db = Database::open_location(&config::database_from_env())?;
    let conn = db.connect()?;

    match command {
        Command::Serve => {}
        Command::CheckAppointments { email } => {
            let report = clinic::maintenance::check_appointments(&conn, &email)?;
            println!(
                "{} ({}, {})",
                report.user.full_name, report.user.email, report.user.role
            );
            if report.appointments.is_empty() {
                println!("No appointments.");
            }
            for listing in &report.appointments {
                let appt = &listing.appointment;
                let doctor = listing
                    .doctor
                    .as_ref()
                    .map_or("<unknown doctor>", |d| d.full_name.as_str());
                println!(
                    "  {}  {}  {}  {}",
                    appt.appointment_time.to_rfc3339(),
                    appt.status,
                    doctor,
                    appt.reason.as_deref().unwrap_or("-")
                );
            }
            println!("Registered doctors: {}", report.doctor_count);
        }
        Command::DeleteUser { email } => {
            let user = clinic::maintenance::delete_user(&conn, &email)?;
            println!("Deleted {} ({})", user.email, user.id);
        }
        Command::ResetPassword { email, password } => {
            let cost = config::password_cost_from_env()?;
            let user = clinic::maintenance::reset_password(&conn, &email, &password, cost)?;
            println!("Password updated for {}", user.email);
        }
        Command::VerifyLogin { email, password } => {
            if clinic::maintenance::verify_login(&conn, &email, &password)? {
                println!("Credentials are valid.");
            } else {
                println!("Credentials are NOT valid.");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["dispensary"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_maintenance_commands() {
        let cli = Cli::try_parse_from(["dispensary", "delete-user", "--email", "a@x.com"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::DeleteUser {
                email: "a@x.com".into()
            })
        );

        let cli = Cli::try_parse_from([
            "dispensary",
            "verify-login",
            "--email",
            "a@x.com",
            "--password",
            "pw",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::VerifyLogin { .. })));
    }

    #[test]
    fn missing_required_flag_rejected() {
        assert!(Cli::try_parse_from(["dispensary", "reset-password", "--email", "a@x.com"]).is_err());
    }
}
