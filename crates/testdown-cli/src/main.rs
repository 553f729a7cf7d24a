use anyhow::{Context, Result};
use clap::Parser;
use relative_path::RelativePath;
use std::path::Path;
use std::process;
use testdown::{Deadline, LoadError, Loader, NoCancel, Recorder, Runner, Summary, Test};
use testdown_config::Config;

mod args;
mod command;
mod listing;
mod report;

use args::{Args, Command};
use command::CommandOutput;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns whether everything that ran passed.
fn run(args: Args) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("config file {} not found", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };
    if let Some(root) = args.root {
        config.root = root;
    }
    log::debug!("using config {config:?}");

    match args.command {
        Command::Run {
            path,
            verbose,
            json,
            command,
        } => {
            if let Some(path) = path {
                config.path = path;
            }
            if !command.is_empty() {
                config.command = command;
            }
            run_tests(&config, verbose, json)
        }
        Command::List { path, json } => {
            if let Some(path) = path {
                config.path = path;
            }
            list_tests(&config, json)?;
            Ok(true)
        }
    }
}

fn run_tests(config: &Config, verbose: bool, json: bool) -> Result<bool> {
    let output = CommandOutput::new(&config.command, &config.root)
        .context("pass an output command after `--` or set `command` in testdown.toml")?;
    let test = load(config)?;

    let mut root = Recorder::new("testdown");
    Runner::with_options(output, config.run_options()).run(&mut root, &test);
    let report = root.finish();

    if json {
        println!("{}", report::render_json(&report)?);
    } else {
        print!("{}", report::render(&report, verbose));
    }
    Ok(!report.failed())
}

fn list_tests(config: &Config, json: bool) -> Result<()> {
    let test = load(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&test)?);
        return Ok(());
    }

    print!("{}", listing::render(&test));
    let summary = Summary::of(&test);
    println!(
        "{} suites, {} documents, {} assertions ({} skipped, {} dangling)",
        summary.suites, summary.documents, summary.assertions, summary.skipped, summary.dangling
    );
    Ok(())
}

fn load(config: &Config) -> Result<Test> {
    let loader = Loader::new(&config.root);
    let path = RelativePath::new(&config.path);
    log::info!("loading {path} from {}", config.root.display());

    let test = match config.load_timeout() {
        Some(timeout) => loader.load(&Deadline::after(timeout), path),
        None => loader.load(&NoCancel, path),
    };

    test.map_err(|e| describe_load_error(e, loader.root()))
}

fn describe_load_error(error: LoadError, root: &Path) -> anyhow::Error {
    let hint = match &error {
        LoadError::Io { .. } => format!("while loading from {}", root.display()),
        LoadError::NotATestDocument(_) => {
            format!("only files ending in {} can be loaded", testdown::DOCUMENT_SUFFIX)
        }
        LoadError::OutsideRoot(_) => format!("paths are resolved within {}", root.display()),
        LoadError::Cancelled { .. } => "load_timeout_secs elapsed".to_string(),
    };
    anyhow::Error::new(error).context(hint)
}
