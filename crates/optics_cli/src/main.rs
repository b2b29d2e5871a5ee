//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `optics_core` linkage and print ping/version.
//! - Run read-only lookups against the configured records database.
//!
//! Usage:
//!   optics                          - Print ping/version only
//!   optics search <query...>        - Search customers by name or ssn
//!   optics history <customer_id>    - List all exams of one customer

use clap::{Parser, Subcommand};
use log::info;
use optics_core::{parse_customer_id, CoreConfig, Customer, SqliteCustomerService};
use std::error::Error;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "optics")]
#[command(about = "Optics shop customer and exam records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Search customers by name tokens or ssn digits
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print refraction, glasses and contact lens history
    History {
        /// Customer id as typed; validated by the core
        customer_id: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::History { .. } => "history",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("optics_core ping={}", optics_core::ping());
    println!("optics_core version={}", optics_core::core_version());

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Option<Command>) -> Result<(), Box<dyn Error>> {
    let Some(command) = command else {
        return Ok(());
    };

    let config = CoreConfig::from_env();
    let conn = config.open()?;
    let service = SqliteCustomerService::try_from_connection(&conn)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command.name()
    );

    match command {
        Command::Search { query } => {
            let customers = service.search_customers(&query.join(" "))?;
            for customer in &customers {
                print_customer(customer);
            }
            println!("matches={}", customers.len());
        }
        Command::History { customer_id } => {
            let customer_id = parse_customer_id(&customer_id)?;
            for exam in service.get_refraction_history(customer_id)? {
                println!(
                    "refraction id={} date={} examiner={}",
                    exam.id.unwrap_or_default(),
                    exam.exam_date,
                    exam.examiner.as_deref().unwrap_or("-")
                );
            }
            for exam in service.get_glasses_history(customer_id)? {
                println!(
                    "glasses id={} date={} role={}",
                    exam.id.unwrap_or_default(),
                    exam.exam_date,
                    exam.measurements.glasses_role.as_deref().unwrap_or("-")
                );
            }
            for exam in service.get_contact_lenses_history(customer_id)? {
                println!(
                    "contact_lenses id={} date={} brand={}",
                    exam.id.unwrap_or_default(),
                    exam.exam_date,
                    exam.measurements.right.brand.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn print_customer(customer: &Customer) {
    println!(
        "customer id={} ssn={} name=\"{}\" mobile={}",
        customer.id.unwrap_or_default(),
        customer.ssn,
        customer.full_name(),
        customer.tel_mobile.as_deref().unwrap_or("-")
    );
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn search_collects_every_query_word() {
        let cli = Cli::try_parse_from(["optics", "search", "Ben", "Zeid"]).unwrap();
        match cli.command {
            Some(Command::Search { query }) => assert_eq!(query, vec!["Ben", "Zeid"]),
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn history_keeps_customer_id_as_text() {
        let cli = Cli::try_parse_from(["optics", "history", "x"]).unwrap();
        match cli.command {
            Some(Command::History { customer_id }) => assert_eq!(customer_id, "x"),
            _ => panic!("expected history command"),
        }
    }

    #[test]
    fn no_command_is_accepted() {
        assert!(Cli::try_parse_from(["optics"]).unwrap().command.is_none());
    }

    #[test]
    fn unknown_or_incomplete_commands_are_rejected() {
        assert!(Cli::try_parse_from(["optics", "export"]).is_err());
        assert!(Cli::try_parse_from(["optics", "search"]).is_err());
        assert!(Cli::try_parse_from(["optics", "history"]).is_err());
    }
}
