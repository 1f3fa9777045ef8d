use anyhow::{anyhow, Result};
use chrono::Local;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;

use pickup_schedule::location::LocationRegistry;
use pickup_schedule::{api_server, config, env_manager, Config, EnrichedInvitee, Pipeline};

/// Command line arguments structure
#[derive(Debug)]
struct CommandArgs {
    command: String,
    args: Vec<String>,
    json: bool,
}

impl CommandArgs {
    fn parse(input: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        for c in input.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                ' ' if !in_quotes => {
                    if !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(c),
            }
        }
        if !current.is_empty() {
            parts.push(current);
        }

        if parts.is_empty() {
            return Err(anyhow!("No command provided"));
        }

        let command = parts.remove(0);
        let json = parts.iter().any(|p| p == "--json");
        let args = parts.into_iter().filter(|p| p != "--json").collect();

        Ok(CommandArgs { command, args, json })
    }
}

struct Shell {
    config: Config,
    runtime: Runtime,
    pipeline: Option<Pipeline>,
}

impl Shell {
    fn new(config: Config) -> Result<Self> {
        Ok(Self { config, runtime: Runtime::new()?, pipeline: None })
    }

    /// The pipeline needs the bearer token, so it is only built on first use
    fn ensure_pipeline(&mut self) -> Result<()> {
        if self.pipeline.is_none() {
            let token = config::bearer_token()?;
            self.pipeline = Some(Pipeline::from_config(&self.config, token)?);
        }
        Ok(())
    }

    fn process_command(&mut self, input: &str) -> Result<()> {
        let args = CommandArgs::parse(input)?;

        match args.command.as_str() {
            "schedule" => {
                let Some(location) = args.args.first() else {
                    println!("Usage: schedule <location> [--json]");
                    return Ok(());
                };
                self.ensure_pipeline()?;
                let Some(pipeline) = self.pipeline.as_ref() else {
                    return Err(anyhow!("Pipeline unavailable"));
                };
                let invitees = self.runtime.block_on(pipeline.run(location))?;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&invitees)?);
                } else {
                    print_schedule(location, &invitees);
                }
                Ok(())
            }
            "locations" => {
                let registry = LocationRegistry::new(&self.config.schedule.locations);
                println!("Known locations:");
                for location in registry.all() {
                    println!("  - {}", location);
                }
                Ok(())
            }
            "serve" => {
                let config = self.config.clone();
                self.runtime.block_on(api_server::start_api_server(config))
            }
            "help" => {
                println!("Available commands:");
                println!("  schedule <location> [--json] - Show the pickup schedule for a location");
                println!("  locations - List known locations");
                println!("  serve - Start the HTTP API server");
                println!("  help - Show this help");
                println!("  exit - Exit the application");
                Ok(())
            }
            "exit" => {
                std::process::exit(0);
            }
            _ => {
                println!("Unknown command. Type 'help' for available commands.");
                Ok(())
            }
        }
    }
}

fn print_schedule(location: &str, invitees: &[EnrichedInvitee]) {
    if invitees.is_empty() {
        println!("No one is scheduled at {}.", location);
        return;
    }

    println!("Schedule for {} ({} invitees):", location, invitees.len());
    for entry in invitees {
        println!(
            "  {} - {}  {} <{}>  {}  {}",
            entry.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            entry.end_time.with_timezone(&Local).format("%H:%M"),
            entry.invitee.name,
            entry.invitee.email,
            entry.invitee.school,
            entry.invitee.phone
        );
    }
}

fn main() -> Result<()> {
    if let Err(e) = env_manager::load_env_file() {
        eprintln!("Could not prepare .env file: {}", e);
    }
    pickup_schedule::init_logger();

    let mut shell = Shell::new(Config::load()?)?;

    // One-shot mode when a command is given on the command line
    let cli_args: Vec<String> = std::env::args().skip(1).collect();
    if !cli_args.is_empty() {
        return shell.process_command(&cli_args.join(" "));
    }

    if !env_manager::check_env_vars() {
        println!("Schedules cannot be fetched until the missing variables are set.");
    }

    info!("Starting pickup schedule shell");

    let mut rl = DefaultEditor::new()?;
    println!("Welcome to the pickup schedule shell! Type 'help' for commands.");

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                if let Err(err) = shell.process_command(&line) {
                    error!("Failed to process command: {:#}", err);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
