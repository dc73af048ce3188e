use clap::{Parser, Subcommand, ValueEnum};
use hu_sim::{PlantConfig, PlantSnapshot, RunOptions, Scenario, SimError, SimRecord, run_scenario};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "hu-cli")]
#[command(about = "Heatup CLI - PWR cold shutdown to hot standby simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a heatup scenario
    Run {
        /// Scenario name (cold-shutdown, solid-near-saturation, two-phase-standby)
        #[arg(long, default_value = "cold-shutdown")]
        scenario: String,
        /// Simulated hours
        #[arg(long, default_value_t = 8.0)]
        hours: f64,
        /// Plant configuration YAML (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Record every N-th tick
        #[arg(long, default_value_t = 60)]
        record_every: usize,
        /// Start the reactor coolant pumps once the bubble is complete
        #[arg(long)]
        start_pumps: bool,
        /// Stop after the pumps have run this many hours
        #[arg(long)]
        pump_hours: Option<f64>,
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default plant configuration as YAML
    Config,
    /// Validate a plant configuration file
    ValidateConfig {
        /// Path to the configuration YAML file
        config_path: PathBuf,
    },
    /// List available scenarios
    Scenarios,
}

fn main() -> CliResult<()> {
    // Logs go to stderr so recorded output on stdout stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            hours,
            config,
            record_every,
            start_pumps,
            pump_hours,
            format,
            output,
        } => {
            let opts = RunOptions {
                duration_s: hours * 3_600.0,
                record_every,
                start_pumps_when_complete: start_pumps,
                stop_after_pumps_s: pump_hours.map(|h| h * 3_600.0),
            };
            cmd_run(&scenario, config.as_deref(), &opts, format, output.as_deref())
        }
        Commands::Config => cmd_config(),
        Commands::ValidateConfig { config_path } => cmd_validate_config(&config_path),
        Commands::Scenarios => cmd_scenarios(),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<PlantConfig> {
    match path {
        Some(path) => Ok(PlantConfig::from_yaml_str(&std::fs::read_to_string(path)?)?),
        None => Ok(PlantConfig::default()),
    }
}

fn cmd_run(
    scenario: &str,
    config_path: Option<&Path>,
    opts: &RunOptions,
    format: OutputFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let scenario: Scenario = scenario.parse()?;
    let config = load_config(config_path)?;
    eprintln!("Running scenario: {}", scenario);
    eprintln!(
        "  dt = {:.3} s, duration = {:.1} h",
        config.dt_s,
        opts.duration_s / 3_600.0
    );

    debug!(?opts, "run options");
    let record = run_scenario(scenario, config, opts)?;
    if let Some(last) = record.last() {
        eprintln!("✓ Run finished at t = {:.0} s in phase {}", last.time_s, last.phase);
        eprintln!(
            "  P = {:.1} psia, T_loop = {:.1} °F, level = {:.1} %",
            last.pressure_psia, last.loop_temp_f, last.pzr_level_pct
        );
        eprintln!("  Mass error: {:.3e} lbm", last.mass_error_lbm);
    }

    let text = match format {
        OutputFormat::Csv => render_csv(&record),
        OutputFormat::Json => serde_json::to_string_pretty(&record.x)?,
    };

    if let Some(path) = output {
        std::fs::write(path, text)?;
        eprintln!("✓ Wrote {} records to {}", record.x.len(), path.display());
    } else {
        print!("{}", text);
    }
    Ok(())
}

const CSV_HEADER: &str = "time_s,phase,pressure_psia,loop_temp_f,pzr_liquid_temp_f,pzr_level_pct,\
subcooling_f,heatup_rate_f_per_hr,charging_gpm,letdown_gpm,spray_gpm,heater_kw,\
heater_setpoint_psia,steam_dump_kw,pumps,tank_level_pct,divert_gpm,makeup_gpm,rcs_boron_ppm,\
mass_error_lbm\n";

fn render_csv(record: &SimRecord) -> String {
    let mut csv = String::from(CSV_HEADER);
    for s in &record.x {
        csv.push_str(&csv_row(s));
    }
    csv
}

fn csv_row(s: &PlantSnapshot) -> String {
    format!(
        "{},{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.2},{:.2},{:.2},{:.1},{:.1},{:.1},{},{:.2},{:.2},{:.2},{:.1},{:.3e}\n",
        s.time_s,
        s.phase,
        s.pressure_psia,
        s.loop_temp_f,
        s.pzr_liquid_temp_f,
        s.pzr_level_pct,
        s.subcooling_f,
        s.heatup_rate_f_per_hr,
        s.charging_gpm,
        s.letdown_gpm,
        s.spray_gpm,
        s.heater_effective_kw,
        s.heater_setpoint_psia,
        s.steam_dump_kw,
        s.pumps_running,
        s.tank_level_pct,
        s.divert_gpm,
        s.makeup_gpm,
        s.rcs_boron_ppm,
        s.mass_error_lbm,
    )
}

fn cmd_config() -> CliResult<()> {
    print!("{}", PlantConfig::default().to_yaml_string()?);
    Ok(())
}

fn cmd_validate_config(config_path: &Path) -> CliResult<()> {
    println!("Validating configuration: {}", config_path.display());
    load_config(Some(config_path))?;
    println!("✓ Configuration is valid");
    Ok(())
}

fn cmd_scenarios() -> CliResult<()> {
    println!("Scenarios:");
    for scenario in Scenario::ALL {
        let ic = scenario.initial_conditions();
        println!(
            "  {:<24} P = {:.0} psia, T_pzr = {:.0} °F, T_loop = {:.0} °F",
            scenario.name(),
            ic.pressure_psia,
            ic.pzr_temp_f,
            ic.loop_temp_f
        );
    }
    Ok(())
}
