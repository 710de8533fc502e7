use std::time::{Duration, Instant};

use chrono::Local;
use clap::{CommandFactory, Parser};
use env_logger::Env;
use log::{debug, error, info, warn};

use strassen_tree::{
    leaf, validate_dimension, verify, EngineConfig, Matrix, Result, MAX_TREE_HEIGHT,
    MIN_SIZE_THRESHOLD,
};

/// Inputs and results up to this size are printed in full.
const PRINT_LIMIT: usize = 8;
/// Above this size the sequential check is skipped.
const VERIFY_LIMIT: usize = 2048;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Matrix dimension, a power of two >= 2
    #[clap(default_value_t = 4)]
    size: usize,

    /// Number of in-process ranks (the MPI world size is used under the `mpi` feature)
    #[clap(short, long, default_value_t = 8)]
    procs: usize,

    /// Recursion levels at which products may still be delegated
    #[clap(long, default_value_t = MAX_TREE_HEIGHT)]
    max_tree_height: usize,

    /// Dimension at or below which the cubic leaf is used
    #[clap(long, default_value_t = MIN_SIZE_THRESHOLD)]
    leaf_threshold: usize,

    /// Seed for matrix A
    #[clap(long, default_value_t = 123)]
    seed_a: u64,

    /// Seed for matrix B
    #[clap(long, default_value_t = 456)]
    seed_b: u64,

    /// Skip the comparison against sequential Strassen
    #[clap(long)]
    no_verify: bool,
}

fn init_logger() {
    let env = Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init();
}

fn size_is_valid(size: usize) -> bool {
    match validate_dimension(size) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", Cli::command().render_usage());
            false
        }
    }
}

fn print_banner(cli: &Cli, procs: usize, config: &EngineConfig) {
    println!("=== Distributed Strassen Matrix Multiplication ===");
    println!("Started: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Matrix size: {}x{}", cli.size, cli.size);
    println!("Number of processes: {}", procs);
    println!("Tree height limit: {}", config.max_tree_height);
    println!("Sequential threshold: {}", config.leaf_threshold);
    println!("==================================================\n");
}

fn print_matrix(m: &Matrix, name: &str) {
    println!("\nMatrix {} ({}x{}):", name, m.size(), m.size());
    println!("{}", m);
}

fn inputs(cli: &Cli) -> (Matrix, Matrix) {
    let a = Matrix::random(cli.size, cli.seed_a);
    let b = Matrix::random(cli.size, cli.seed_b);
    if cli.size <= PRINT_LIMIT {
        print_matrix(&a, "A");
        print_matrix(&b, "B");
    }
    (a, b)
}

fn report(cli: &Cli, a: &Matrix, b: &Matrix, c: &Matrix, wall: Duration) -> Result<()> {
    println!("Distributed Strassen multiplication completed!");
    println!("Wall Time: {:.6} seconds", wall.as_secs_f64());

    if cli.size <= PRINT_LIMIT {
        print_matrix(c, "Result C");
    }

    if cli.no_verify || cli.size > VERIFY_LIMIT {
        return Ok(());
    }

    println!("\nVerifying result with Strassen sequential multiplication...");
    let start = Instant::now();
    let expected = leaf::sequential_strassen(a, b)?;
    let oracle_time = start.elapsed();
    println!(
        "Strassen sequential multiplication time: {:.6} seconds",
        oracle_time.as_secs_f64()
    );

    let verification = verify(&expected, c);
    println!("{}", verification);
    if verification.passed() {
        println!(
            "Speedup: {:.2}x",
            oracle_time.as_secs_f64() / wall.as_secs_f64().max(f64::EPSILON)
        );
    } else {
        warn!("distributed product disagrees with the sequential reference");
    }
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn run(cli: &Cli) -> Result<()> {
    if !size_is_valid(cli.size) {
        return Ok(());
    }
    let config = EngineConfig::new(cli.max_tree_height, cli.leaf_threshold)?;

    print_banner(cli, cli.procs, &config);
    let (a, b) = inputs(cli);

    info!("starting distributed Strassen multiplication");
    let start = Instant::now();
    let run = strassen_tree::run_local(config, cli.procs, &a, &b)?;
    let wall = start.elapsed();

    for worker in &run.workers {
        debug!("rank {} handled {} tasks", worker.rank, worker.tasks);
    }

    report(cli, &a, &b, &run.product, wall)
}

#[cfg(feature = "mpi")]
fn run(cli: &Cli) -> Result<()> {
    use strassen_tree::error::communication_error;
    use strassen_tree::{Communicator, Coordinator, MpiComm, Worker, ROOT_RANK};

    let universe = mpi::initialize()
        .ok_or_else(|| communication_error(ROOT_RANK, "MPI was already initialized"))?;
    let comm = MpiComm::new(universe.world());
    let is_root = comm.rank() == ROOT_RANK;

    // every rank checks, only the root complains
    if validate_dimension(cli.size).is_err() {
        if is_root {
            size_is_valid(cli.size);
        }
        return Ok(());
    }
    let config = EngineConfig::new(cli.max_tree_height, cli.leaf_threshold)?;

    if !is_root {
        let worker = Worker::new(&comm, config).run()?;
        debug!("rank {} handled {} tasks", worker.rank, worker.tasks);
        return Ok(());
    }

    print_banner(cli, comm.size(), &config);
    let (a, b) = inputs(cli);

    info!("starting distributed Strassen multiplication");
    let start = Instant::now();
    let c = Coordinator::new(&comm, config)?.multiply(&a, &b)?;
    let wall = start.elapsed();

    report(cli, &a, &b, &c, wall)
}

fn main() {
    init_logger();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
