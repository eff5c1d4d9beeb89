//! Command-line interface for the sbml-units library
//!
//! This binary derives and inspects the units of SBML models stored as
//! JSON documents.
//!
//! # Usage
//!
//! ```bash
//! # Print the derived units of every component as a table
//! sbml-units units --path model.json
//!
//! # Print the record of a single variable as JSON
//! sbml-units units --path model.json --id S --json
//!
//! # Derive the units of an expression over the model's identifiers
//! sbml-units units --path model.json --math "k * S / (Km + S)"
//!
//! # Check a document against the model schema
//! sbml-units validate --path model.json
//! ```
//!
//! Set `RUST_LOG` or pass `--verbose` to see how units are derived.

use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use colored::Colorize;
use sbml_units::{
    io::load_model,
    math::{extract_symbols, parse_math},
    prelude::{FormulaUnitsData, Model},
    validation::validate_json,
};

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log how units are derived
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Derive the units of a model
    Units {
        /// Path to the JSON model document
        #[arg(short, long)]
        path: PathBuf,

        /// Only show the record of this variable or assignment target
        #[arg(short, long, conflicts_with = "math")]
        id: Option<String>,

        /// Derive the units of an infix expression instead
        #[arg(short, long)]
        math: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a JSON model document against the model schema
    Validate {
        /// Path to the JSON model document
        #[arg(short, long)]
        path: PathBuf,
    },
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".bold().red());
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> Result<ExitCode, Box<dyn Error>> {
    match command {
        Commands::Units {
            path,
            id,
            math,
            json,
        } => {
            let mut model = load_model(path)?;

            if let Some(math) = math {
                return print_math_units(&model, math, *json);
            }

            model.populate_list_formula_units_data();

            match id {
                Some(id) => {
                    let record = find_record(&model, id)
                        .ok_or_else(|| format!("No derived units for '{id}'"))?;
                    if *json {
                        println!("{}", serde_json::to_string_pretty(record)?);
                    } else {
                        print_record(record);
                    }
                }
                None if *json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(model.formula_units_data())?
                    );
                }
                None => println!("{}", model.formula_units_registry()),
            }

            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { path } => {
            let content = std::fs::read_to_string(path)?;
            let report = validate_json(&content)?;

            if report.valid {
                println!("{}", "Model document is valid".bold().green());
                return Ok(ExitCode::SUCCESS);
            }

            for error in &report.errors {
                println!("{error}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Variables first, then assignment targets, then any record with that id.
fn find_record<'a>(model: &'a Model, id: &str) -> Option<&'a FormulaUnitsData> {
    model
        .get_formula_units_data_for_variable(id)
        .or_else(|| model.get_formula_units_data_for_assignment(id))
        .or_else(|| {
            model
                .formula_units_data()
                .iter()
                .find(|record| record.unit_reference_id() == id)
        })
}

fn print_record(record: &FormulaUnitsData) {
    let show = |ud: Option<&sbml_units::prelude::UnitDefinition>| {
        ud.map(|ud| ud.to_string()).unwrap_or("-".to_string())
    };

    println!(
        "{} ({})",
        record.unit_reference_id().bold(),
        record.component_typecode()
    );
    println!("  units:      {}", show(record.unit_definition()));
    println!("  per time:   {}", show(record.per_time_unit_definition()));
    if let Some(substance) = record.species_substance_unit_definition() {
        println!("  substance:  {substance}");
    }
    if let Some(extent) = record.species_extent_unit_definition() {
        println!("  extent:     {extent}");
    }
    if let Some(time) = record.event_time_unit_definition() {
        println!("  event time: {time}");
    }
    println!(
        "  {}",
        flags(
            record.has_known_units(),
            record.contains_parameters_with_undeclared_units()
        )
    );
}

fn print_math_units(model: &Model, math: &str, json: bool) -> Result<ExitCode, Box<dyn Error>> {
    let symbols = extract_symbols(&parse_math(math)?);
    let units = model.derive_math_units(math);

    if json {
        let value = serde_json::json!({
            "math": math,
            "symbols": symbols,
            "unit_definition": units.unit_definition,
            "contains_undeclared_units": units.contains_undeclared_units,
            "can_ignore_undeclared_units": units.can_ignore_undeclared_units,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", math.bold());
        println!("  symbols: {}", symbols.join(", "));
        println!("  units:   {}", units.unit_definition);
        let known = !units.contains_undeclared_units || units.can_ignore_undeclared_units;
        println!("  {}", flags(known, units.contains_undeclared_units));
    }

    Ok(ExitCode::SUCCESS)
}

fn flags(known: bool, undeclared: bool) -> String {
    match (known, undeclared) {
        (_, false) => "all units declared".green().to_string(),
        (true, true) => "undeclared units can be ignored".yellow().to_string(),
        (false, true) => "undeclared units".red().to_string(),
    }
}
