use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use ts_app::{AppError, AppResult, RunLength, RunProgress, RunRequest, project_service};

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(about = "TankSim CLI - tank level simulation under PID control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter project file
    Init {
        /// Path of the project file to create (.yaml or .json)
        project_path: PathBuf,
        /// Project name
        #[arg(long, default_value = "Tank level")]
        name: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file
        project_path: PathBuf,
    },
    /// Show a project summary
    Show {
        /// Path to the project file
        project_path: PathBuf,
        /// Print the migrated project as YAML instead of a summary
        #[arg(long)]
        yaml: bool,
    },
    /// Run a project and export its history
    Run {
        /// Path to the project file
        project_path: PathBuf,
        /// Number of steps to run
        #[arg(long, conflicts_with = "duration")]
        steps: Option<usize>,
        /// Simulated duration in seconds
        #[arg(long)]
        duration: Option<f64>,
        /// Output file for the history (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (defaults to the output file extension, else csv)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },
    /// Score candidate controller gains on the project's first loop
    Sweep {
        /// Path to the project file
        project_path: PathBuf,
        /// Candidate Kc values, comma separated
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        kc: Vec<f64>,
        /// Steps per candidate
        #[arg(long, default_value_t = 600)]
        steps: usize,
        /// Override the first controller's initial setpoint
        #[arg(long)]
        setpoint: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Jsonl,
}

impl ExportFormat {
    fn resolve(explicit: Option<Self>, output: Option<&Path>) -> Self {
        explicit.unwrap_or_else(|| {
            match output
                .and_then(|p| p.extension())
                .and_then(|e| e.to_str())
            {
                Some(ext) if ext.eq_ignore_ascii_case("jsonl") => ExportFormat::Jsonl,
                _ => ExportFormat::Csv,
            }
        })
    }
}

fn main() -> AppResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            project_path,
            name,
            force,
        } => cmd_init(&project_path, &name, force),
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Show { project_path, yaml } => cmd_show(&project_path, yaml),
        Commands::Run {
            project_path,
            steps,
            duration,
            output,
            format,
        } => {
            let length = match (steps, duration) {
                (_, Some(d)) => RunLength::Duration(d),
                (Some(n), None) => RunLength::Steps(n),
                (None, None) => RunLength::Duration(600.0),
            };
            let format = ExportFormat::resolve(format, output.as_deref());
            cmd_run(&project_path, length, output.as_deref(), format)
        }
        Commands::Sweep {
            project_path,
            kc,
            steps,
            setpoint,
        } => cmd_sweep(&project_path, &kc, steps, setpoint),
    }
}

fn cmd_init(project_path: &Path, name: &str, force: bool) -> AppResult<()> {
    project_service::init_project(project_path, name, force)?;
    println!("✓ Wrote project: {}", project_path.display());
    Ok(())
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    project_service::load_project(project_path)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_show(project_path: &Path, yaml: bool) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    if yaml {
        let text = serde_yaml::to_string(&project)
            .map_err(|e| AppError::Project(format!("Failed to serialize project: {}", e)))?;
        print!("{}", text);
        return Ok(());
    }

    let s = project_service::summarize(&project)?;
    println!("Project: {} (version {})", s.name, s.version);
    println!("  dt: {:.3} s", s.dt_s);
    println!("  Initial level: {:.3} m", s.initial_level_m);
    match s.initial_setpoint {
        Some(sp) => println!("  Controllers: {} (first setpoint {:.3} m)", s.controller_count, sp),
        None => println!("  Controllers: none (open loop)"),
    }
    println!("  Balancing inlet flow: {:.4} m^3/s", s.balancing_inlet_flow);
    println!("  Inlet mode: {}", s.inlet_mode);
    println!("  Events: {}", s.event_count);
    println!(
        "  History: {} records, every {} step(s)",
        s.history_capacity, s.record_every
    );
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    length: RunLength,
    output: Option<&Path>,
    format: ExportFormat,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let request = RunRequest { length };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let result = ts_app::run_project(
        &project,
        &request,
        Some(&mut |event: RunProgress| {
            let emit_now = (event.fraction_complete - last_fraction).abs() >= 0.005
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_progress(&event);
                last_fraction = event.fraction_complete;
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    let summary = &result.summary;
    eprintln!("✓ Simulation completed");
    eprintln!("  Steps: {}", summary.steps);
    eprintln!("  Final time: {:.3} s", summary.final_time_s);
    if let Some(level) = summary.final_state.first() {
        eprintln!("  Final level: {:.4} m", level);
    }
    for (i, iae) in summary.iae.iter().enumerate() {
        eprintln!("  IAE[{}]: {:.4} m*s", i, iae);
    }
    eprintln!("  Events fired: {}", summary.events_fired);
    eprintln!("  Wall time: {:.3} s", summary.wall_time_s);

    match output {
        Some(path) => {
            match format {
                ExportFormat::Csv => ts_results::save_csv(path, &result.history)?,
                ExportFormat::Jsonl => ts_results::save_jsonl(path, &result.history)?,
            }
            info!(path = %path.display(), records = result.history.len(), "history exported");
            eprintln!(
                "✓ Exported {} records to {}",
                result.history.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout().lock();
            match format {
                ExportFormat::Csv => ts_results::write_csv(stdout, &result.history)?,
                ExportFormat::Jsonl => ts_results::write_jsonl(stdout, &result.history)?,
            }
        }
    }
    Ok(())
}

fn cmd_sweep(
    project_path: &Path,
    kcs: &[f64],
    steps: usize,
    setpoint: Option<f64>,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let mut config = project.simulation;
    if let Some(sp) = setpoint {
        let first = config.controllers.first_mut().ok_or_else(|| {
            AppError::InvalidInput("project has no controller to sweep".to_string())
        })?;
        first.initial_setpoint = sp;
    }

    let points = ts_app::sweep_gains(&config, kcs, steps)?;
    println!("{:>10}  {:>12}", "Kc", "IAE [m*s]");
    for p in &points {
        println!("{:>10.4}  {:>12.4}", p.kc, p.iae);
    }
    if let Some(best) = points.iter().min_by(|a, b| a.iae.total_cmp(&b.iae)) {
        println!("Best: Kc = {:.4} (IAE {:.4})", best.kc, best.iae);
    }
    Ok(())
}

fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(100));
    let _ = io::stderr().flush();
}

fn render_progress(event: &RunProgress) {
    let width = 28usize;
    let filled = ((event.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    eprint!(
        "\r[{}] {:>6.2}%  t={:.1}s  step={}/{}  elapsed={:.1}s",
        bar,
        event.fraction_complete * 100.0,
        event.sim_time_s,
        event.step,
        event.total_steps,
        event.elapsed_wall_s
    );
    let _ = io::stderr().flush();
}
