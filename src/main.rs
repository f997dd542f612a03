use crate::aircraft::AircraftCatalog;
use crate::crew::CrewCatalog;
use crate::flight::{FlightId, FlightInstance};
use crate::forecast::ForecastCatalog;
use crate::route::RouteCatalog;
use crate::schedule::schedule::{Allocation, Schedule};
use crate::schedule::scheduler::generate_schedule;
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tabled::settings::Style;
use tabled::Tabled;

mod aircraft;
mod crew;
mod error;
mod flight;
mod forecast;
mod route;
mod schedule;

#[derive(Parser)]
struct Args {
    /// Path to the fleet CSV file
    #[arg(short, long, value_name = "FILE", default_value = "data/aircraft.csv")]
    aircraft: PathBuf,

    /// Path to the crew roster JSON file
    #[arg(short, long, value_name = "FILE", default_value = "data/crew.json")]
    crew: PathBuf,

    /// Path to the timetable XML file
    #[arg(short, long, value_name = "FILE", default_value = "data/routes.xml")]
    routes: PathBuf,

    /// Path to the passenger forecast SQLite database
    #[arg(short, long, value_name = "FILE")]
    passengers: Option<PathBuf>,

    /// First day of the scheduling period
    #[arg(long, default_value = "2020-07-01")]
    from: NaiveDate,

    /// Last day of the scheduling period
    #[arg(long, default_value = "2020-08-31")]
    to: NaiveDate,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

#[derive(Tabled)]
struct FlightRow {
    #[tabled(rename = "Flight")]
    flight_number: u32,
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Departs")]
    departs: String,
    #[tabled(rename = "Aircraft")]
    aircraft: String,
    #[tabled(rename = "Captain")]
    captain: String,
    #[tabled(rename = "First Officer")]
    first_officer: String,
    #[tabled(rename = "Cabin Crew")]
    cabin_crew: String,
}

impl FlightRow {
    fn new(instance: &FlightInstance, allocation: Option<&Allocation>) -> FlightRow {
        let crew_name = |p: Option<&crate::crew::Pilot>| {
            p.map(|p| p.name.to_string()).unwrap_or_else(|| "-".to_string())
        };
        FlightRow {
            flight_number: instance.route.flight_number,
            date: instance.date,
            route: format!(
                "{} -> {}",
                instance.route.departure_airport_code, instance.route.arrival_airport_code
            ),
            departs: instance.departure.format("%H:%M").to_string(),
            aircraft: allocation
                .and_then(|a| a.aircraft.as_ref())
                .map(|a| format!("{} ({})", a.tail_code, a.type_code))
                .unwrap_or_else(|| "-".to_string()),
            captain: crew_name(allocation.and_then(|a| a.captain.as_ref())),
            first_officer: crew_name(allocation.and_then(|a| a.first_officer.as_ref())),
            cabin_crew: allocation
                .map(|a| a.cabin_crew.len().to_string())
                .unwrap_or_else(|| "0".to_string()),
        }
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn print_flight_table(schedule: &Schedule, instances: Vec<&FlightInstance>) {
    if instances.is_empty() {
        println!("No matching flights found.");
        return;
    }
    let rows: Vec<FlightRow> = instances
        .iter()
        .map(|i| FlightRow::new(i, schedule.allocation_for(i.id())))
        .collect();
    let mut table = tabled::Table::new(&rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn print_summary(schedule: &Schedule) {
    let completed = schedule.completed_allocations().len();
    let remaining = schedule.remaining_allocations().len();
    println!("{}", format!("Completed = {}", completed).green());
    if remaining > 0 {
        println!("{}", format!("Remaining = {}", remaining).red());
    } else {
        println!("Remaining = 0");
    }
}

fn print_report(schedule: &Schedule) {
    let Some(report) = &schedule.last_report else {
        println!("No scheduling run recorded yet.");
        return;
    };
    println!(
        "Attempts: {}, completed: {}, unresolved: {}",
        report.attempts,
        report.completed,
        report.unresolved.len()
    );
    for (flight, reason) in &report.unresolved {
        println!("  {} {}", flight.to_string().yellow(), reason);
    }
}

fn show_flight(schedule: &Schedule, flight_number: &str, date: &str) {
    let Ok(flight_number) = flight_number.parse::<u32>() else {
        println!("Invalid flight number: {}", flight_number);
        return;
    };
    let Ok(date) = date.parse::<NaiveDate>() else {
        println!("Invalid date (expected YYYY-MM-DD): {}", date);
        return;
    };
    let id = FlightId {
        flight_number,
        date,
    };
    let Some(instance) = schedule.instance(id) else {
        println!("No flight {} in this schedule.", id);
        return;
    };
    println!(
        "Flight {}: {} ({}) -> {} ({}), {} to {}",
        id,
        instance.route.departure_airport,
        instance.route.departure_airport_code,
        instance.route.arrival_airport,
        instance.route.arrival_airport_code,
        instance.departure,
        instance.arrival
    );
    let Some(allocation) = schedule.allocation_for(id) else {
        return;
    };
    match &allocation.aircraft {
        Some(a) => println!("  Aircraft: {} {} {} ({} seats)", a.tail_code, a.manufacturer, a.model, a.seats),
        None => println!("  Aircraft: {}", "unassigned".red()),
    }
    match &allocation.captain {
        Some(p) => println!("  Captain: {}", p.name),
        None => println!("  Captain: {}", "unassigned".red()),
    }
    match &allocation.first_officer {
        Some(p) => println!("  First Officer: {}", p.name),
        None => println!("  First Officer: {}", "unassigned".red()),
    }
    if allocation.cabin_crew.is_empty() {
        println!("  Cabin crew: {}", "none".red());
    } else {
        for member in &allocation.cabin_crew {
            println!("  Cabin crew: {}", member.name);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let fleet = AircraftCatalog::load(&args.aircraft)?;
    let crew = CrewCatalog::load(&args.crew)?;
    let routes = RouteCatalog::load(&args.routes)?;
    let forecasts = match &args.passengers {
        Some(path) => ForecastCatalog::load(path)?,
        None => ForecastCatalog::empty(),
    };

    println!(
        "Loaded {} aircraft, {} pilots, {} cabin crew, {} routes.",
        fleet.len(),
        crew.number_of_pilots(),
        crew.number_of_cabin_crew(),
        routes.len()
    );
    println!("Scheduling {} to {}...", args.from, args.to);

    let schedule = generate_schedule(&fleet, &crew, &routes, &forecasts, args.from, args.to);
    print_summary(&schedule);

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "ls".to_string(),
            "show".to_string(),
            "report".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => {
                        let sub = parts.get(1).copied().unwrap_or("a");
                        let instances = match sub {
                            "r" | "remaining" => schedule.remaining_allocations(),
                            "c" | "completed" => schedule.completed_allocations(),
                            _ => schedule.instances().iter().collect(), // 'ls' or 'ls a'
                        };
                        print_flight_table(&schedule, instances);
                    },
                    "show" => {
                        if let (Some(number), Some(date)) = (parts.get(1), parts.get(2)) {
                            show_flight(&schedule, number, date);
                        } else {
                            println!("Usage: show <flight_number> <YYYY-MM-DD>");
                        }
                    },
                    "report" => print_report(&schedule),
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [filter]    - List flights in a table, filter: a - all, r - remaining, c - completed");
                        println!("  show <n> <d>   - Show the full allocation for flight <n> on date <d>");
                        println!("  report         - Show the last scheduling run and unresolved flights");
                        println!("  help / ?       - Show this help menu");
                        println!("  exit / quit    - Exit\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
