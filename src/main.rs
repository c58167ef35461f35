use anyhow::{Context, Result};
use clap::Parser;
use retrofit_fabric::io::{read_actions, read_project, write_project};
use retrofit_fabric::{FabricPage, ScenarioId, SyncConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fabric-sync")]
#[command(about = "Apply fabric page actions to a scenario of an assessment project")]
struct Args {
    /// Project document to read
    project: PathBuf,

    /// Scenario whose fabric elements are edited
    scenario_id: String,

    /// JSON array of actions to dispatch in order
    actions: PathBuf,

    /// Sync configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the project (defaults to overwriting the input)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the final page state as JSON to stdout
    #[arg(long, default_value_t = false)]
    dump_state: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };

    let mut project = read_project(&args.project)?;
    let actions = read_actions(&args.actions)?;
    let mut page = FabricPage::new(ScenarioId::from(args.scenario_id.clone()), config);

    let count = actions.len();
    for (i, action) in actions.into_iter().enumerate() {
        let name = action.name();
        page.dispatch(&mut project, action)
            .with_context(|| format!("Action {} ({name}) failed", i + 1))?;
    }
    info!(
        scenario = %page.scenario_id(),
        actions = count,
        walls = page.state().walls.len(),
        "applied actions"
    );

    let out = args.out.as_ref().unwrap_or(&args.project);
    write_project(out, &project)?;
    info!(path = %out.display(), "project written");

    if args.dump_state {
        let state = serde_json::to_string_pretty(page.state())
            .context("Failed to serialize page state")?;
        println!("{state}");
    }

    Ok(())
}
