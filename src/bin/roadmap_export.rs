//! Export a roadmap scene to PDF or PNG
//!
//! Reads a scene description (JSON box tree) and writes the exported artifact
//! into an output directory.
//!
//! Usage:
//!   cargo run --release --bin roadmap_export -- --scene overview.json
//!   cargo run --release --bin roadmap_export -- --scene track.json --mode track --team payments --format png
//!   cargo run --release --bin roadmap_export -- --scene detailed.json --mode detailed --config export.json --out exports/

use roadmap_export::diagnostics::{LogSink, SharedSink};
use roadmap_export::export::{
    ExportFormat, ExportMode, ExportOptions, ExportOrchestrator, FileSink,
};
use roadmap_export::scene::SceneSurface;
use roadmap_export::ExportConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

struct CliArgs {
    scene: PathBuf,
    out_dir: PathBuf,
    mode: ExportMode,
    format: ExportFormat,
    title: String,
    subtitle: Option<String>,
    team: Option<String>,
    portrait: bool,
    config: Option<PathBuf>,
}

impl CliArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut scene = None;
        let mut out_dir = PathBuf::from("exports");
        let mut mode = ExportMode::Overview;
        let mut format = ExportFormat::Document;
        let mut title = "Roadmap".to_string();
        let mut subtitle = None;
        let mut team = None;
        let mut portrait = false;
        let mut config = None;

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let mut value = || {
                i += 1;
                args.get(i)
                    .cloned()
                    .ok_or_else(|| format!("{} needs a value", flag))
            };
            match flag {
                "--scene" => scene = Some(PathBuf::from(value()?)),
                "--out" | "--output-dir" => out_dir = PathBuf::from(value()?),
                "--mode" => mode = value()?.parse().map_err(|e| format!("{}", e))?,
                "--format" => format = value()?.parse().map_err(|e| format!("{}", e))?,
                "--title" => title = value()?,
                "--subtitle" => subtitle = Some(value()?),
                "--team" => team = Some(value()?),
                "--config" => config = Some(PathBuf::from(value()?)),
                "--portrait" => portrait = true,
                "--help" | "-h" => return Err(usage()),
                other => return Err(format!("unknown argument '{}'\n\n{}", other, usage())),
            }
            i += 1;
        }

        Ok(Self {
            scene: scene.ok_or_else(usage)?,
            out_dir,
            mode,
            format,
            title,
            subtitle,
            team,
            portrait,
            config,
        })
    }

    fn options(&self) -> ExportOptions {
        let mut options = ExportOptions::new(self.mode, self.format, self.title.clone())
            .with_landscape(!self.portrait)
            .with_include_details(self.mode == ExportMode::Detailed);
        if let Some(subtitle) = &self.subtitle {
            options = options.with_subtitle(subtitle.clone());
        }
        if let Some(team) = &self.team {
            options = options.with_team_filter(team.clone());
        }
        options
    }
}

fn usage() -> String {
    "Usage: roadmap_export --scene <scene.json> [--mode overview|detailed|track] \
     [--format pdf|png] [--out <dir>] [--title <title>] [--subtitle <text>] \
     [--team <name>] [--portrait] [--config <config.json>]"
        .to_string()
}

async fn run(args: CliArgs) -> roadmap_export::Result<()> {
    let config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    let surface = SceneSurface::from_json_file(&args.scene)?;
    let diagnostics: SharedSink = Arc::new(LogSink);

    let orchestrator = ExportOrchestrator::builder(Arc::new(FileSink::new(
        &args.out_dir,
        diagnostics.clone(),
    )))
    .config(config)
    .diagnostics(diagnostics)
    .build()?;

    let start = Instant::now();
    let outcome = orchestrator.export(&surface, args.options()).await?;

    println!(
        "✓ {} ({} page(s), {:.1} KB) in {:.2}s",
        args.out_dir.join(&outcome.filename).display(),
        outcome.page_count,
        outcome.byte_len as f64 / 1024.0,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CliArgs::from_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        },
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
