use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use wayfarer_core::brain::{decode_genome, encode_genome, GenomeLogic};
use wayfarer_core::voxel::{MaterialLogic, VoxelGrid, VoxelWorld};
use wayfarer_core::VoxelPathfinder;
use wayfarer_data::{CellCoord, Genome, Locomotion, SpeciesProfile};
use wayfarer_lib::{App, AppConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the world seed
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a number of ticks and print a summary
    Run {
        #[arg(short, long, default_value_t = 1000)]
        ticks: u64,
    },
    /// Search one path across the surface of a generated world
    Path {
        #[arg(long, required = true, num_args = 2, value_names = ["X", "Y"])]
        from: Vec<i32>,
        #[arg(long, required = true, num_args = 2, value_names = ["X", "Y"])]
        to: Vec<i32>,
        #[arg(long, value_enum, default_value = "walker")]
        mover: Mover,
    },
    /// Print a random genome as hex, or validate a hex/binary one
    Genome {
        /// Hex string produced by an earlier run
        #[arg(long)]
        decode: Option<String>,
        /// Also print the compact binary encoding as hex
        #[arg(long)]
        binary: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Mover {
    Walker,
    Climber,
    Swimmer,
    Burrower,
    Flyer,
}

impl Mover {
    fn profile(self) -> SpeciesProfile {
        let locomotion = match self {
            Mover::Walker => Locomotion::WALKER,
            Mover::Climber => Locomotion {
                walks: true,
                climbs: true,
                ..Default::default()
            },
            Mover::Swimmer => Locomotion {
                walks: true,
                swims: true,
                ..Default::default()
            },
            Mover::Burrower => Locomotion {
                walks: true,
                burrows: true,
                ..Default::default()
            },
            Mover::Flyer => Locomotion {
                walks: true,
                flies: true,
                ..Default::default()
            },
        };
        SpeciesProfile::new(uuid::Uuid::nil(), format!("{self:?}").to_lowercase(), locomotion)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(&args.config);
    if args.seed.is_some() {
        config.world.seed = args.seed;
    }

    match args.command {
        Command::Run { ticks } => run(config, ticks),
        Command::Path { from, to, mover } => path(&config, &from, &to, mover),
        Command::Genome { decode, binary } => genome(&config, decode.as_deref(), binary),
    }
}

fn run(config: AppConfig, ticks: u64) -> Result<()> {
    let mut app = App::new(config)?;
    let summary = app.run(ticks);
    println!("seed           {}", app.seed);
    println!("ticks          {}", summary.ticks);
    println!("population     {}", app.population());
    println!("mean energy    {:.2}", app.mean_energy());
    println!("moves          {}", summary.moved);
    println!("holds          {}", summary.held);
    println!("stuck          {}", summary.stuck);
    println!("deposits       {}", summary.deposits);
    println!("highways       {}", summary.highways);
    println!("eaten          {}", summary.consumed);
    println!("replaced       {}", summary.replaced);
    for (name, value) in app.metrics.counters_snapshot() {
        println!("  {name:<14} {value}");
    }
    Ok(())
}

fn path(config: &AppConfig, from: &[i32], to: &[i32], mover: Mover) -> Result<()> {
    let w = &config.world;
    let seed = w.seed.unwrap_or(0);
    let world = VoxelGrid::generate(w.width, w.depth, w.height, seed);
    let surface = |xy: &[i32]| -> Result<CellCoord> {
        let (x, y) = (xy[0], xy[1]);
        let z = world
            .surface_height(x, y)
            .with_context(|| format!("({x}, {y}) has no open surface cell"))?;
        Ok(CellCoord::new(x, y, z))
    };
    let start = surface(from)?;
    let goal = surface(to)?;

    let species = mover.profile();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let genome = Genome::new_random_with_rng(&config.brain, &mut rng);
    let pathfinder = VoxelPathfinder::new(config.pathfinding.clone());

    match pathfinder.find_path(
        &world,
        start,
        goal,
        &species,
        &genome,
        config.pathfinding.max_distance,
    ) {
        Some(result) => {
            println!(
                "{} steps, cost {:.2}, {} nodes expanded",
                result.steps(),
                result.cost,
                result.expanded
            );
            for cell in &result.cells {
                let symbol = world.cell_at(*cell).map_or('?', |v| v.material.symbol());
                println!("  ({:>3}, {:>3}, {:>3}) {symbol:?}", cell.x, cell.y, cell.z);
            }
        }
        None => println!("No path from {start:?} to {goal:?} for {mover:?}"),
    }
    Ok(())
}

fn genome(config: &AppConfig, decode: Option<&str>, binary: bool) -> Result<()> {
    let genome = match decode {
        Some(hex_str) => Genome::from_hex(hex_str)?,
        None => {
            let mut rng = ChaCha8Rng::seed_from_u64(config.world.seed.unwrap_or_else(rand::random));
            Genome::new_random_with_rng(&config.brain, &mut rng)
        }
    };
    println!("topology    {:?}", genome.topology());
    println!("activations {:?}", genome.activations());
    println!("neurons     {}", genome.neuron_count());
    println!("connections {}", genome.connection_count());
    if binary {
        let bytes = encode_genome(&genome)?;
        let back = decode_genome(&bytes)?;
        anyhow::ensure!(back == genome, "Binary encoding did not round-trip");
        println!("binary      {}", hex::encode(bytes));
    }
    if decode.is_none() {
        println!("hex         {}", genome.to_hex());
    }
    Ok(())
}
