use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use ballistic_simulator::constants::{
    DEFAULT_LOG_INTERVAL, DEFAULT_MAX_DROP_M, DEFAULT_MAX_ZERO_ITERATIONS, DEFAULT_TIMESTEP_MS,
    DEFAULT_ZERO_DISTANCE_M, STANDARD_AIR_DENSITY,
};
use ballistic_simulator::{
    export, BulletCatalog, DragCoefficientModel, DragModel, Effect, Simulator, TrajectorySample,
};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ballistics")]
#[command(version)]
#[command(about = "Projectile trajectory simulator and zeroing calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Bullet catalog JSON (defaults to the built-in catalog)
    #[arg(long, global = true)]
    bullets: Option<PathBuf>,

    /// Directory containing g1.txt and g7.txt (defaults to the built-in tables)
    #[arg(long, global = true)]
    drag_tables: Option<PathBuf>,

    /// Air density (kg/m³)
    #[arg(long, global = true, default_value_t = STANDARD_AIR_DENSITY)]
    density: f64,

    /// Integration timestep (milliseconds)
    #[arg(long, global = true, default_value_t = DEFAULT_TIMESTEP_MS)]
    timestep: f64,

    /// Steps between logged samples
    #[arg(long, global = true, default_value_t = DEFAULT_LOG_INTERVAL)]
    log_interval: u64,

    /// Iteration cap for the zero solver
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ZERO_ITERATIONS)]
    max_iterations: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the zero angle for a distance
    Zero {
        /// Catalog path, e.g. "6.5/6.5 creedmoor/140"
        bullet: String,

        /// Zero distance (meters)
        #[arg(short = 'd', long, default_value_t = DEFAULT_ZERO_DISTANCE_M)]
        distance: f64,
    },

    /// Zero, then fire one shot and print the trajectory
    Shoot {
        bullet: String,

        /// Adjustment on top of the zero (milliradians)
        #[arg(short = 'a', long, default_value_t = 0.0, allow_hyphen_values = true)]
        adjustment: f64,

        /// Maximum downrange distance (meters)
        #[arg(long, default_value_t = 1000.0)]
        max_distance: f64,

        /// Maximum drop below the line of sight (meters)
        #[arg(long, default_value_t = DEFAULT_MAX_DROP_M)]
        max_drop: f64,

        /// Zero distance (meters)
        #[arg(long, default_value_t = DEFAULT_ZERO_DISTANCE_M)]
        zero: f64,

        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Zero, then solve and fire at a target on a slope
    ShootAt {
        bullet: String,

        /// Distance to the target along the slope (meters)
        #[arg(short = 'd', long)]
        distance: f64,

        /// Slope angle (degrees, negative is downhill)
        #[arg(short = 'a', long, default_value_t = 0.0, allow_hyphen_values = true)]
        angle: f64,

        /// Zero distance (meters)
        #[arg(long, default_value_t = 100.0)]
        zero: f64,

        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Distance at which each adjustment leaves a vertical band around the line of sight
    Lookup {
        bullet: String,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        start: f64,

        #[arg(long, default_value_t = 9.0, allow_hyphen_values = true)]
        stop: f64,

        #[arg(long, default_value_t = 0.5)]
        step: f64,

        /// Half height of the band (meters)
        #[arg(long, default_value_t = 0.15)]
        band: f64,

        #[arg(long, default_value_t = 1000.0)]
        max_distance: f64,

        /// Zero distance (meters)
        #[arg(long, default_value_t = DEFAULT_ZERO_DISTANCE_M)]
        zero: f64,
    },

    /// Query a standard drag table
    Drag {
        /// Drag model (g1 or g7)
        #[arg(short = 'm', long, default_value = "g7")]
        model: DragModel,

        /// Speed (m/s)
        speed: f64,
    },

    /// List bullets in the catalog
    Bullets,

    /// Display simulator information
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Zero { bullet, distance } => {
            let mut simulator = build_simulator(&cli, bullet)?;
            let zero = simulator.zero(*distance)?;
            println!("Zero angle for {} at {:.2} m: {:.4} mrad", bullet, distance, zero);
        }

        Commands::Shoot { bullet, adjustment, max_distance, max_drop, zero, output } => {
            let mut simulator = build_simulator(&cli, bullet)?;
            simulator.zero(*zero)?;
            simulator.shoot(*adjustment, *max_distance, *max_drop)?;
            display_samples(simulator.logs(), *output)?;
        }

        Commands::ShootAt { bullet, distance, angle, zero, output } => {
            let mut simulator = build_simulator(&cli, bullet)?;
            simulator.zero(*zero)?;
            let shot = simulator.shoot_at(*distance, *angle)?;
            if let OutputFormat::Table = output {
                println!("Target:      ({:.2}, {:.2}) m", shot.target.x, shot.target.y);
                println!("Elevation:   {:.4} mrad", shot.elevation);
                println!("Adjustment:  +{:.4} mrad", shot.adjustment);
                println!();
            }
            display_samples(simulator.logs(), *output)?;
        }

        Commands::Lookup { bullet, start, stop, step, band, max_distance, zero } => {
            let mut simulator = build_simulator(&cli, bullet)?;
            simulator.zero(*zero)?;
            let rows = simulator.adjustment_table(*start, *stop, *step, *max_distance, *band)?;
            println!("adjustment_mrad,exit_distance_m,exit_height_m");
            for (adjustment, last) in rows {
                println!("{:.2},{:.2},{:.4}", adjustment, last.position.x, last.position.y);
            }
        }

        Commands::Drag { model, speed } => {
            let drag_model = load_drag_model(&cli)?;
            println!("{} Cd at {:.2} m/s: {:.4}", model, speed, drag_model.lookup(*model, *speed));
        }

        Commands::Bullets => {
            for path in load_catalog(&cli)?.paths() {
                println!("{}", path);
            }
        }

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      BALLISTIC SIMULATOR v{:<13}║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Fixed-step 2D trajectory simulator.    ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Features:                              ║");
            println!("║ • G1/G7 drag table interpolation       ║");
            println!("║ • Gravity and drag effects             ║");
            println!("║ • Iterative zero solver                ║");
            println!("║ • Table, JSON and CSV output           ║");
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn load_catalog(cli: &Cli) -> Result<BulletCatalog, Box<dyn Error>> {
    Ok(match &cli.bullets {
        Some(path) => BulletCatalog::from_path(path)?,
        None => BulletCatalog::builtin()?,
    })
}

fn load_drag_model(cli: &Cli) -> Result<DragCoefficientModel, Box<dyn Error>> {
    Ok(match &cli.drag_tables {
        Some(dir) => DragCoefficientModel::from_dir(dir)?,
        None => DragCoefficientModel::standard()?,
    })
}

fn build_simulator(cli: &Cli, bullet: &str) -> Result<Simulator, Box<dyn Error>> {
    let projectile = load_catalog(cli)?.projectile(bullet)?;
    let drag_model = Arc::new(load_drag_model(cli)?);
    let effects = vec![Effect::gravity(), Effect::drag(cli.density, drag_model)];
    let simulator = Simulator::new(projectile, effects, cli.timestep, cli.log_interval)?
        .with_max_zero_iterations(cli.max_iterations);
    Ok(simulator)
}

fn display_samples(samples: &[TrajectorySample], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Table => print!("{}", export::render_table(samples)),
        OutputFormat::Json => println!("{}", export::to_json(samples)?),
        OutputFormat::Csv => export::write_csv(samples, std::io::stdout().lock())?,
    }
    Ok(())
}
