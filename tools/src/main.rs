//! panel-runner: headless batch runner for the officer-risk panels.
//!
//! Usage:
//!   panel-runner --db study.db --import-dir ./clean --config study.json
//!   panel-runner --db study.db            (re-run over stored inputs)

use anyhow::{Context, Result};
use officer_risk_core::{
    allegation::AllegationRecord,
    config::PipelineConfig,
    dataset::CareerDatesRecord,
    engine::PipelineEngine,
    lawsuit::{prepare_lawsuits, LawsuitExportRow},
    manifest::RunManifest,
    observation::RosterRecord,
    store::PanelStore,
};
use serde::de::DeserializeOwned;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = parse_flag(&args, "--db").unwrap_or(":memory:");
    let config_path = parse_flag(&args, "--config");
    let import_dir = parse_flag(&args, "--import-dir");

    println!("panel-runner");
    println!("  db:          {db}");
    println!("  config:      {}", config_path.unwrap_or("(defaults)"));
    println!("  import_dir:  {}", import_dir.unwrap_or("(none)"));
    println!();

    let config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let store = PanelStore::open(db)?;
    store.migrate()?;

    if let Some(dir) = import_dir {
        import_extracts(&store, Path::new(dir), &config)?;
    }

    let engine = PipelineEngine::build(PipelineEngine::new_run_id(), config, store)?;
    let manifest = engine.run()?;
    print_summary(&manifest);
    Ok(())
}

/// Load the cleaned extracts into an empty store. A store that already
/// holds allegations is left untouched.
fn import_extracts(store: &PanelStore, dir: &Path, config: &PipelineConfig) -> Result<()> {
    if store.row_count("allegation")? > 0 {
        log::warn!("store already holds allegations; skipping import from {}", dir.display());
        return Ok(());
    }

    let roster: Vec<RosterRecord> = read_json(&dir.join("roster.json"))?;
    let tax_ids: Vec<_> = roster.iter().map(|r| r.tax_id).collect();
    store.insert_roster(&tax_ids)?;

    let records: Vec<AllegationRecord> = read_json(&dir.join("clean_allegations.json"))?;
    let total = records.len();
    let mut allegations = Vec::with_capacity(total);
    for record in records {
        if let Some(event) = record.into_event()? {
            allegations.push(event);
        }
    }
    if allegations.len() < total {
        log::warn!("skipped {} allegations without a tax_id", total - allegations.len());
    }
    store.insert_allegations(&allegations)?;

    let exports: Vec<LawsuitExportRow> = read_json(&dir.join("lawsuit_exports.json"))?;
    let lawsuits = prepare_lawsuits(exports, &config.lawsuits)?;
    store.upsert_lawsuits(&lawsuits)?;

    let careers_path = dir.join("career_dates.json");
    let careers = if careers_path.exists() {
        let records: Vec<CareerDatesRecord> = read_json(&careers_path)?;
        let careers = records
            .into_iter()
            .map(CareerDatesRecord::into_career_dates)
            .collect::<Result<Vec<_>, _>>()?;
        store.upsert_career_dates(&careers)?;
        careers.len()
    } else {
        0
    };

    log::info!(
        "imported {} officers, {} allegations, {} lawsuits, {} career records",
        tax_ids.len(),
        allegations.len(),
        lawsuits.len(),
        careers,
    );
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Cannot parse {}", path.display()))
}

fn print_summary(manifest: &RunManifest) {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {}", manifest.run_id);
    println!("  officers:      {}", manifest.officers);
    if let (Some(first), Some(last)) =
        (manifest.observation_dates.first(), manifest.observation_dates.last())
    {
        println!(
            "  as-of dates:   {} ({first} .. {last})",
            manifest.observation_dates.len()
        );
    }
    println!("  allegations:   {}", manifest.allegations);
    println!("  lawsuits:      {}", manifest.lawsuits);
    for panel in &manifest.panels {
        println!("  {:<14} {} rows x {} columns", format!("{}:", panel.name), panel.rows, panel.columns);
    }
    match manifest.modeling_rows {
        Some(rows) => println!("  modeling rows: {rows}"),
        None => println!("  modeling rows: (no career dates)"),
    }
}

fn parse_flag<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
