use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use keymatch_cli::{
    load_intensity_grid, DebugImageWriter, KeyDescription, KeyMatchConfig, KeyMatchError, KeyMatchResult,
    KeyMatcher, ReferenceDatabase,
};
use keymatch_context::Matcher;
use keymatch_silhouette::{NoopObserver, StageObserver};
use log::info;

#[derive(Parser)]
#[command(name = "keymatch", version)]
#[command(about = "Identify a photographed key against a database of shape descriptors")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Write the intermediate stage images into this directory
    #[arg(long, global = true)]
    debug_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the silhouette and print its landmarks
    Describe {
        /// Photograph of the key, teeth to the left and blade pointing down
        image: PathBuf,
    },
    /// Append the key's descriptor to a database
    Add {
        image: PathBuf,
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Find the closest key in a database
    Match {
        image: PathBuf,
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> KeyMatchResult<()> {
    let mut config = match &cli.config {
        Some(path) => KeyMatchConfig::load_toml(path)?,
        None => KeyMatchConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.silhouette.core.n_threads = threads;
    }
    let debug_dir = cli.debug_dir.or_else(|| config.debug_dir.clone());
    let matcher = KeyMatcher::new(config.silhouette.clone())?;

    match cli.command {
        Command::Describe { image } => {
            let description = describe(&matcher, &image, debug_dir.as_deref())?;
            print_description(&description);
        }
        Command::Add { image, database } => {
            let path = database_path(database, &config)?;
            let description = describe(&matcher, &image, debug_dir.as_deref())?;
            let mut db = ReferenceDatabase::load_or_default(&path)?;
            let index = db.push(description.descriptor);
            db.save(&path)?;
            println!("Added {} as key {} ({} keys in {})", image.display(), index, db.len(), path.display());
        }
        Command::Match { image, database } => {
            let path = database_path(database, &config)?;
            let db = ReferenceDatabase::load(&path)?;
            let description = describe(&matcher, &image, debug_dir.as_deref())?;

            let t0 = Instant::now();
            let outcome = Matcher::match_key(&description.descriptor, db.descriptors())?;
            info!("matched against {} keys in {:.2?}", db.len(), t0.elapsed());

            for (index, cost) in outcome.costs.iter().enumerate() {
                println!("key {}: cost {:.4}", index, cost);
            }
            println!("Index of most similar key: {}", outcome.best_index);
        }
    }
    Ok(())
}

fn database_path(arg: Option<PathBuf>, config: &KeyMatchConfig) -> KeyMatchResult<PathBuf> {
    arg.or_else(|| config.database.clone())
        .ok_or_else(|| KeyMatchError::Config("no database given; pass --database or set it in the config".into()))
}

fn describe(matcher: &KeyMatcher, image: &Path, debug_dir: Option<&Path>) -> KeyMatchResult<KeyDescription> {
    let grid = load_intensity_grid(image)?;
    let mut observer: Box<dyn StageObserver> = match debug_dir {
        Some(dir) => Box::new(DebugImageWriter::new(dir)?),
        None => Box::new(NoopObserver),
    };

    let t0 = Instant::now();
    let description = matcher.describe_with_observer(&grid, observer.as_mut())?;
    info!("described {} in {:.2?}", image.display(), t0.elapsed());
    Ok(description)
}

fn print_description(description: &KeyDescription) {
    let silhouette = &description.silhouette;
    match silhouette.threshold {
        Some(t) => println!("Threshold: {}", t),
        None => println!("Threshold: none (single-class image)"),
    }
    println!("Boundary points: {}", silhouette.boundary.len());
    println!("Right edge points: {}", silhouette.right_edge.len());
    if let Some(geometry) = &silhouette.geometry {
        println!("Angle offset: {:.4} rad", geometry.angle_offset);
        println!("Blade beginning: {}", geometry.blade_beginning);
        println!("Tip: {}", geometry.tip);
        println!("Center: {}", geometry.center);
    }
    println!("Retained edge points: {}", silhouette.edges.len());
    let occupied = description.descriptor.as_slice().iter().filter(|&&f| f > 0).count();
    println!("Occupied descriptor bins: {}", occupied);
}
