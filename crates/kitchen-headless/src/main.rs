use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use kitchen_core::event::{Event, EventKind};
use kitchen_core::id::FoodId;
use kitchen_data::loader::{build_level, deserialize_file, find_data_file, LEVEL_FILE};
use kitchen_data::schema::LevelData;
use kitchen_data::{DataLoadError, Level};

/// Shift length used when neither the level nor the command line sets one.
const DEFAULT_SHIFT_SECONDS: f64 = 180.0;

#[derive(Parser, Debug)]
#[command(name = "kitchen-headless")]
#[command(about = "Run a kitchen shift without a renderer and print the score")]
struct Args {
    /// Level file, or a directory holding a level.ron/.toml/.json
    level: PathBuf,

    /// Shift length in seconds (overrides the level)
    #[arg(long)]
    seconds: Option<f64>,

    /// RNG seed (overrides the level)
    #[arg(long)]
    seed: Option<u64>,

    /// Print order events as they happen
    #[arg(long)]
    events: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), DataLoadError> {
    let mut level = load(&args.level, args)?;
    log::info!("seed: {}", level.kitchen.config().seed);

    if args.events {
        let names: Vec<String> = level
            .kitchen
            .catalog()
            .iter()
            .map(|(_, def)| def.name.clone())
            .collect();
        for kind in [
            EventKind::OrderCreated,
            EventKind::OrderCompleted,
            EventKind::OrderExpired,
            EventKind::NoPlateWarning,
        ] {
            let names = names.clone();
            level
                .kitchen
                .on(kind, Box::new(move |event| print_event(&names, event)));
        }
    }

    let kitchen = &mut level.kitchen;
    kitchen.start_shift();
    let result = kitchen.advance(u64::MAX);
    log::debug!("ran {} ticks", result.steps_run);

    println!("{}: {}", level.name, level.kitchen.scoreboard());
    Ok(())
}

/// Load the level, applying command-line overrides before the kitchen is
/// built.
fn load(path: &Path, args: &Args) -> Result<Level, DataLoadError> {
    let file = if path.is_dir() {
        find_data_file(path, LEVEL_FILE)?.ok_or_else(|| DataLoadError::MissingLevel {
            dir: path.to_path_buf(),
        })?
    } else {
        path.to_path_buf()
    };

    let mut data: LevelData = deserialize_file(&file)?;
    if let Some(seed) = args.seed {
        data.config.seed = seed;
    }
    data.config.shift_seconds = args
        .seconds
        .or(data.config.shift_seconds)
        .or(Some(DEFAULT_SHIFT_SECONDS));

    build_level(&data, &file)
}

fn print_event(names: &[String], event: &Event) {
    let tick = event.tick();
    let name = |food: &FoodId| names.get(food.0 as usize).map_or("?", String::as_str);
    match event {
        Event::OrderCreated { order, food, .. } => {
            println!("[{tick:>6}] order {order:?}: {}", name(food))
        }
        Event::OrderCompleted { order, score, .. } => {
            println!("[{tick:>6}] order {order:?} served, +{score}")
        }
        Event::OrderExpired { order, reason, .. } => {
            println!("[{tick:>6}] order {order:?} gone ({reason:?})")
        }
        Event::NoPlateWarning { order, .. } => {
            println!("[{tick:>6}] order {order:?} needs a plate")
        }
        _ => {}
    }
}
