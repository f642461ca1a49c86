use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::Table;
use tracing::info_span;

use edflow_cli::pipeline::{RunInputs, load_config, render_config, run_pipeline};
use edflow_cli::types::RunResult;

use crate::cli::{CheckConfigArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("run", events = %args.events.display());
    let _guard = span.enter();
    let config = load_config(args.config.as_deref())?;
    let inputs = RunInputs {
        events: args.events.clone(),
        admissions: args.admissions.clone(),
        observations: args.observations.clone(),
        diagnostics: args.diagnostics.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&args.events)),
        dry_run: args.dry_run,
    };
    run_pipeline(&inputs, &config)
}

pub fn check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["Analysis", "Pruning", "Threshold"]);
    apply_table_style(&mut table);
    for analysis in &config.analyses {
        table.add_row(vec![
            analysis.name.clone(),
            analysis.pruning_mode.as_str().to_string(),
            analysis
                .pruning_threshold
                .map_or_else(|| "-".to_string(), |value| value.to_string()),
        ]);
    }
    match &args.config {
        Some(path) => println!("Config OK: {}", path.display()),
        None => println!("Config OK: built-in defaults"),
    }
    println!("{table}");
    println!();
    print!("{}", render_config(&config)?);
    Ok(())
}

fn default_output_dir(events: &Path) -> PathBuf {
    events
        .parent()
        .map_or_else(|| PathBuf::from("output"), |dir| dir.join("output"))
}
