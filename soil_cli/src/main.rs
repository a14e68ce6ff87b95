//! # Soil Lab CLI
//!
//! Command-line front end for `soil_core`: runs calculators from
//! `name=value` fields or JSON files and manages the feedback store.
//!
//! ```text
//! soil calc plasticity liquid_limit=45 plastic_limit=20
//! soil calc consolidation mode=pressure-increment initial_void_ratio=0.9 ...
//! soil run test.json --format json
//! soil feedback submit --name Asha --rating 5 --text "Useful"
//! soil feedback export --type exit
//! ```

mod args;
mod render;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use args::{Cli, Commands, ExitAnswer, FeedbackCommands, FilterArgs, GlobalOpts, OutputFormat};
use soil_core::feedback::{
    self, export_csv, export_filename, FeedbackFilter, FeedbackStats, FeedbackStore, JsonFileStore, NewFeedback,
};
use soil_core::{CalcError, CalcResult, FormFields, LabSettings, Notification, SoilTest, TestReport};

/// JSON output of a calculation
#[derive(Serialize)]
struct CalcOutput<'a> {
    notification: &'a Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a TestReport>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let outcome = match cli.command {
        Commands::Calc(args) => FormFields::parse_assignments(&args.fields).and_then(|fields| {
            calculate(&cli.global, &args.test, SoilTest::from_fields(&args.test, &fields))
        }),
        Commands::Run(args) => {
            let test = read_input(&args.file).and_then(|json| {
                serde_json::from_str::<SoilTest>(&json).map_err(|e| CalcError::SerializationError {
                    reason: format!("Invalid test JSON: {}", e),
                })
            });
            let name = test.as_ref().map(|t| t.calc_type()).unwrap_or("Soil test");
            calculate(&cli.global, name, test)
        }
        Commands::Feedback(command) => run_feedback(&cli.global, command),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: &Path) -> CalcResult<String> {
    let mut contents = String::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_string(&mut contents)
            .map_err(|e| CalcError::file_error("read", "stdin", e.to_string()))?;
    } else {
        contents = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    }
    Ok(contents)
}

fn to_json<T: Serialize>(value: &T) -> CalcResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError { reason: e.to_string() })
}

/// Run a parsed test and print the outcome. `Ok(false)` when the test was rejected.
fn calculate(global: &GlobalOpts, name: &str, test: CalcResult<SoilTest>) -> CalcResult<bool> {
    let settings = LabSettings::load_or_default(global.settings.as_deref())?;
    let outcome = test.and_then(|test| test.run(&settings));
    let note = Notification::for_calculation(&outcome);
    let report = outcome.as_ref().ok();

    match global.format {
        OutputFormat::Json => {
            println!("{}", to_json(&CalcOutput { notification: &note, report })?);
        }
        OutputFormat::Text => {
            if let Some(report) = report {
                print!("{}", render::report(name, report));
            }
            if let Err(err) = &outcome {
                log::info!("rejected: {}", err);
            }
            eprintln!("{}", render::notification(&note));
        }
    }
    Ok(note.is_success())
}

fn filter_from(args: &FilterArgs) -> CalcResult<FeedbackFilter> {
    Ok(FeedbackFilter {
        search: args.search.clone(),
        feedback_type: args.feedback_type.parse()?,
        rating: args.rating.parse()?,
    })
}

fn user_id() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "soil".to_string())
}

fn run_feedback(global: &GlobalOpts, command: FeedbackCommands) -> CalcResult<bool> {
    let mut store = JsonFileStore::new(&global.store, user_id());

    let submission = match command {
        FeedbackCommands::Submit(args) => Some(NewFeedback::regular(&args.name, &args.email, args.rating, &args.text)),
        FeedbackCommands::Exit(args) => Some(Ok(NewFeedback::exit(args.answer == ExitAnswer::Liked))),
        FeedbackCommands::List(args) => {
            let filter = filter_from(&args)?;
            let records = load_records(&store)?;
            let shown = filter.apply(&records);
            match global.format {
                OutputFormat::Json => println!("{}", to_json(&shown)?),
                OutputFormat::Text => print!("{}", render::feedback_list(&shown)),
            }
            None
        }
        FeedbackCommands::Stats => {
            let stats = FeedbackStats::from_records(&load_records(&store)?);
            match global.format {
                OutputFormat::Json => println!("{}", to_json(&stats)?),
                OutputFormat::Text => print!("{}", render::stats(&stats)),
            }
            None
        }
        FeedbackCommands::Export(args) => {
            let filter = filter_from(&args.filter)?;
            let csv = export_csv(&filter.apply(&load_records(&store)?))?;
            if args.stdout {
                print!("{}", csv);
            } else {
                let path = args.dir.join(export_filename(Utc::now().date_naive()));
                fs::write(&path, csv)
                    .map_err(|e| CalcError::file_error("write export", path.display().to_string(), e.to_string()))?;
                eprintln!("Exported to {}", path.display());
            }
            None
        }
    };

    let Some(entry) = submission else {
        return Ok(true);
    };
    let note = feedback::submit(&mut store, entry);
    match global.format {
        OutputFormat::Json => println!("{}", to_json(&note)?),
        OutputFormat::Text => eprintln!("{}", render::notification(&note)),
    }
    Ok(note.is_success())
}

fn load_records(store: &JsonFileStore) -> CalcResult<Vec<feedback::FeedbackRecord>> {
    store.query().map_err(|err| {
        let note = feedback::load_failure_notice(&err);
        eprintln!("{}", render::notification(&note));
        err
    })
}
