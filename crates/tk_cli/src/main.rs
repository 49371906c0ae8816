//! tk: command line driver for the KPI and feedback stages
//!
//! events.csv + rounds.csv + map.yml → kpis_team.json + per_round.csv
//! kpis_team.json + per_round.csv + thresholds.yml → feedback.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use tk_core::io::{
    kpi_output_files, load_match, read_kpis, read_notes, to_json_bytes, write_all, write_file,
    write_kpi_outputs, KpiArtifacts, FEEDBACK_FILE,
};
use tk_core::{
    generate, AnalyticsError, EngineConfig, FeedbackReport, KpiEngine, KpiOutput, KpiReport,
    Thresholds, ZoneConfig, ZoneIndex,
};

#[derive(Parser)]
#[command(name = "tk")]
#[command(about = "Tactical KPIs and coaching feedback from match event tables", long_about = None)]
struct Cli {
    /// Engine tuning document (YAML); defaults apply when omitted
    #[arg(long, global = true, alias = "engine_config")]
    engine_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute team KPIs and per-round notes
    Kpis {
        /// Events table (CSV)
        #[arg(long)]
        events: PathBuf,

        /// Rounds table (CSV)
        #[arg(long)]
        rounds: PathBuf,

        /// Map zone definition (YAML)
        #[arg(long, alias = "map_config")]
        map_config: PathBuf,

        /// Directory receiving kpis_team.json and per_round.csv
        #[arg(long, alias = "out_dir")]
        out_dir: PathBuf,
    },

    /// Turn KPIs into ranked findings and scores
    Feedback {
        /// KPI document produced by `kpis`
        #[arg(long)]
        kpis: PathBuf,

        /// Per-round notes produced by `kpis`
        #[arg(long, alias = "per_round")]
        per_round: PathBuf,

        /// Thresholds document (YAML)
        #[arg(long)]
        thresholds: PathBuf,

        /// Output feedback JSON path
        #[arg(long)]
        out: PathBuf,
    },

    /// Run both stages back to back
    Pipeline {
        #[arg(long)]
        events: PathBuf,

        #[arg(long)]
        rounds: PathBuf,

        #[arg(long, alias = "map_config")]
        map_config: PathBuf,

        #[arg(long)]
        thresholds: PathBuf,

        /// Directory receiving kpis_team.json, per_round.csv and feedback.json
        #[arg(long, alias = "out_dir")]
        out_dir: PathBuf,
    },

    /// Print the JSON Schema of an output document
    Schema {
        #[arg(long, value_enum)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Kpis,
    Feedback,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let status = exit_status(&err);
            error!(status, "{:#}", err);
            eprintln!("❌ {:#}", err);
            ExitCode::from(status)
        }
    }
}

/// 2 for input-contract failures anywhere in the chain, 1 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    let contract = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<AnalyticsError>())
        .any(AnalyticsError::is_input_contract);
    if contract {
        2
    } else {
        1
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.engine_config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Kpis {
            events,
            rounds,
            map_config,
            out_dir,
        } => {
            println!("🔨 Computing KPIs...");
            println!("   Events: {}", events.display());
            println!("   Rounds: {}", rounds.display());
            println!("   Map:    {}", map_config.display());

            let output = compute_kpis(&events, &rounds, &map_config, &config)?;
            let artifacts = write_kpi_outputs(&out_dir, &output)
                .with_context(|| format!("Failed to write KPI outputs to {}", out_dir.display()))?;

            print_kpis(&output);
            println!("\n✅ OK → {}", out_dir.display());
            println!("   {}", artifacts.kpis.display());
            println!("   {}", artifacts.notes.display());
        }

        Commands::Feedback {
            kpis,
            per_round,
            thresholds,
            out,
        } => {
            println!("🔨 Generating feedback...");
            let kpi_report = read_kpis(&kpis)
                .with_context(|| format!("Failed to read KPIs: {}", kpis.display()))?;
            let report = feedback_from(&kpi_report, &per_round, &thresholds, &config)?;
            save_feedback(&out, &report)?;
        }

        Commands::Pipeline {
            events,
            rounds,
            map_config,
            thresholds,
            out_dir,
        } => {
            println!("🔨 Running KPI + feedback pipeline...");
            let output = compute_kpis(&events, &rounds, &map_config, &config)?;
            let thresholds = load_thresholds(&thresholds)?;
            let report = generate(&output.kpis, &output.notes, &thresholds, &config);

            let artifacts = KpiArtifacts::in_dir(&out_dir);
            let feedback_path = out_dir.join(FEEDBACK_FILE);
            let mut files = kpi_output_files(&artifacts, &output)?;
            files.push((feedback_path.clone(), to_json_bytes(&report)?));
            write_all(&files)
                .with_context(|| format!("Failed to write outputs to {}", out_dir.display()))?;

            print_kpis(&output);
            print_summary(&report);
            println!("\n✅ OK → {}", out_dir.display());
            println!("   {}", artifacts.kpis.display());
            println!("   {}", artifacts.notes.display());
            println!("   {}", feedback_path.display());
        }

        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaKind::Kpis => KpiReport::json_schema(),
                SchemaKind::Feedback => FeedbackReport::json_schema(),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn compute_kpis(
    events: &Path,
    rounds: &Path,
    map_config: &Path,
    config: &EngineConfig,
) -> Result<KpiOutput> {
    // map config first: a malformed map should fail before reading large tables
    let zone_config = ZoneConfig::load(map_config)
        .with_context(|| format!("Failed to load map config: {}", map_config.display()))?;
    let zones = ZoneIndex::new(zone_config)?;
    println!(
        "   Zones:  {} in {} layers",
        zones.zone_count(),
        zones.layer_count()
    );
    let data = load_match(events, rounds).context("Failed to load input tables")?;

    Ok(KpiEngine::new(&zones, config.clone()).run(&data))
}

fn load_thresholds(path: &Path) -> Result<Thresholds> {
    Thresholds::load(path).with_context(|| format!("Failed to load thresholds: {}", path.display()))
}

fn feedback_from(
    kpis: &KpiReport,
    per_round: &Path,
    thresholds: &Path,
    config: &EngineConfig,
) -> Result<FeedbackReport> {
    let notes = read_notes(per_round)
        .with_context(|| format!("Failed to read per-round notes: {}", per_round.display()))?;
    let thresholds = load_thresholds(thresholds)?;
    Ok(generate(kpis, &notes, &thresholds, config))
}

fn save_feedback(path: &Path, report: &FeedbackReport) -> Result<()> {
    let bytes = to_json_bytes(report)?;
    write_file(path, &bytes)
        .with_context(|| format!("Failed to write feedback: {}", path.display()))?;
    print_summary(report);
    println!("\n✅ OK → {}", path.display());
    Ok(())
}

fn fmt_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| format!("{:.3}", v))
}

fn print_kpis(output: &KpiOutput) {
    let kpis = &output.kpis;
    println!("\n📊 KPIs");
    println!("   Entry duels:            {}", output.entries.len());
    println!("   Trade rate (5s):        {}", fmt_metric(kpis.trade_rate_5s));
    println!("   Flash effectiveness:    {}", fmt_metric(kpis.flash_effectiveness));
    println!("   Utility dmg / round:    {}", fmt_metric(kpis.utility_dmg_per_round));
    println!("   Post-plant early death: {}", fmt_metric(kpis.postplant_early_deaths));
    for (side, count) in &kpis.entry_duel_counts_by_side {
        println!("   Entries won ({:>2}):      {}", side, count);
    }
}

fn print_summary(report: &FeedbackReport) {
    let scores = &report.summary.scores;
    println!("\n📋 Feedback");
    println!(
        "   Scores: entry_trades={} utility={} postplant={}",
        scores.entry_trades, scores.utility, scores.postplant
    );
    for f in &report.findings {
        println!("   [{:?}] {} ({})", f.severity, f.title, f.id);
    }
}
