//! CLI for inspecting how a document would be bound.
//!
//! Usage:
//!   ctrl page.html                          # print the dispatch plan
//!   ctrl page.html --config ctrl.toml       # with a configuration file
//!   ctrl page.html -c tabs -c modal --run   # start tracing controllers

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ctrl::dom::Document;
use ctrl::runner::controller::{Constructor, Registry};
use ctrl::runner::{Binder, BinderConfig, BinderError, Options};

#[derive(Parser, Debug)]
#[command(name = "ctrl", about = "Bind data-controller elements in a markup file")]
struct Args {
    /// Markup file to load.
    file: PathBuf,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the candidate selector.
    #[arg(long)]
    selector: Option<String>,

    /// Register a controller that logs its options when started.
    #[arg(short = 'c', long = "controller")]
    controllers: Vec<String>,

    /// Dispatch the controllers instead of only printing the plan.
    #[arg(long)]
    run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = execute(args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn execute(args: Args) -> Result<(), BinderError> {
    let markup = fs::read_to_string(&args.file).map_err(|error| BinderError::Io {
        path: args.file.clone(),
        error,
    })?;
    let document = Document::parse(&markup)?;

    let mut config = match &args.config {
        Some(path) => BinderConfig::load(path)?,
        None => BinderConfig::default(),
    };
    if let Some(selector) = args.selector {
        config = config.with_selector(selector);
    }

    let controllers: Registry = args
        .controllers
        .iter()
        .map(|name| (name.clone(), tracing_controller(name.clone())))
        .collect();

    let binder = Binder::new(document, controllers, config);
    print_plan(&binder)?;

    if args.run {
        binder.run()?;
    }
    Ok(())
}

fn tracing_controller(name: String) -> Constructor {
    Constructor::new(move |options: Options| {
        info!(controller = %name, ?options, "controller started");
        Ok(())
    })
}

fn print_plan(binder: &Binder<Document>) -> Result<(), BinderError> {
    let plan = binder.plan()?;

    println!("{:<6} {:<24} {:>10} {:<10} {}", "Order", "Controller", "Priority", "Status", "Element");
    println!("{}", "-".repeat(70));
    for (order, entry) in plan.iter().enumerate() {
        let priority = entry
            .priority
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match (&entry.controller, entry.registered) {
            (None, _) => "unnamed",
            (Some(_), true) => "ready",
            (Some(_), false) => "unknown",
        };
        println!(
            "{:<6} {:<24} {:>10} {:<10} {:?}",
            order + 1,
            entry.controller.as_deref().unwrap_or("-"),
            priority,
            status,
            entry.element
        );
    }
    println!("{}", "-".repeat(70));
    println!("{} candidate(s)", plan.len());
    Ok(())
}
