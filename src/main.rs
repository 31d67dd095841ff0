//! Qwirkle CLI: `serve` starts the HTTP session server, `simulate` runs
//! batch AI-vs-AI games and writes one JSON record per game.

use std::fs;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use qwirkle::server::{create_router, ServerState};
use qwirkle::simulation::{run_batch, RunnerConfig, RunnerStats};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "serve" => run_serve(&args[2..]),
        "simulate" => run_simulate(&args[2..]),
        "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Qwirkle - game server and simulator");
    println!();
    println!("Usage:");
    println!("  qwirkle serve [--addr HOST:PORT]   Start the web server");
    println!("  qwirkle simulate [options]         Run AI vs AI simulations");
    println!();
    println!("Simulate options:");
    println!("  -n N            Number of games (default: 1000)");
    println!("  -p1 STRATEGY    Player 1 strategy: greedy, random, weighted");
    println!("  -p2 STRATEGY    Player 2 strategy (default: greedy)");
    println!("  -workers N      Parallel workers (0 = all CPUs, default: 0)");
    println!("  -seed N         Base seed (0 = derive from clock)");
    println!("  -o PATH         Output file (default: stdout)");
}

// ── serve ───────────────────────────────────────────────────────────

fn run_serve(args: &[String]) {
    let mut addr = "0.0.0.0:8080".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" | "-addr" => {
                i += 1;
                match args.get(i) {
                    Some(a) => addr = a.clone(),
                    None => flag_error("--addr requires a HOST:PORT value"),
                }
            }
            other => flag_error(&format!("Unknown serve argument: {other}")),
        }
        i += 1;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            process::exit(1);
        }
    };
    runtime.block_on(serve(addr));
}

async fn serve(addr: String) {
    let state = Arc::new(ServerState::new());
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            process::exit(1);
        }
    };
    println!("Qwirkle server listening on {addr}. Press Ctrl+C to stop.");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
        process::exit(1);
    }
    println!("\nStopping server...");
}

async fn shutdown_signal() {
    // If the handler cannot be installed, run until killed externally.
    let _ = tokio::signal::ctrl_c().await;
}

// ── simulate ────────────────────────────────────────────────────────

fn run_simulate(args: &[String]) {
    let mut config = RunnerConfig {
        num_games: 1000,
        player1: "greedy".to_string(),
        player2: "greedy".to_string(),
        seed: 0,
    };
    let mut workers = 0usize;
    let mut output: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = match args.get(i) {
            Some(v) => v.as_str(),
            None => {
                flag_error(&format!("{flag} requires a value"));
                unreachable!()
            }
        };
        match flag {
            "-n" => config.num_games = parse_flag(flag, value),
            "-p1" => config.player1 = value.to_string(),
            "-p2" => config.player2 = value.to_string(),
            "-workers" => workers = parse_flag(flag, value),
            "-seed" => config.seed = parse_flag(flag, value),
            "-o" => output = Some(value.to_string()),
            other => flag_error(&format!("Unknown simulate argument: {other}")),
        }
        i += 1;
    }

    if workers > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
        {
            eprintln!("Failed to configure worker pool: {e}");
            process::exit(1);
        }
    }

    println!(
        "Simulating {} games: {} vs {}",
        config.num_games, config.player1, config.player2
    );

    let stats = match output {
        Some(ref path) => {
            let mut file = match fs::File::create(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Cannot create output file {path}: {e}");
                    process::exit(1);
                }
            };
            run_batch(&config, &mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            run_batch(&config, &mut handle)
        }
    };

    match stats {
        Ok(stats) => print_stats(&config, &stats),
        Err(e) => {
            eprintln!("Simulation error: {e}");
            process::exit(1);
        }
    }
}

fn print_stats(config: &RunnerConfig, stats: &RunnerStats) {
    let games = stats.games as f64;
    let secs = stats.elapsed.as_secs_f64();

    let mut out = io::stderr();
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Simulation Complete ===");
    let _ = writeln!(out, "Games:      {}", stats.games);
    let _ = writeln!(out, "Duration:   {:.1} s", secs);
    let _ = writeln!(out, "Speed:      {:.1} games/sec", games / secs.max(1e-9));
    let _ = writeln!(
        out,
        "Avg moves:  {:.1}",
        stats.total_moves as f64 / games.max(1.0)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "--- Results ---");
    let _ = writeln!(
        out,
        "{} wins: {} ({:.1}%)",
        config.player1,
        stats.player1_wins,
        100.0 * stats.player1_wins as f64 / games.max(1.0)
    );
    let _ = writeln!(
        out,
        "{} wins: {} ({:.1}%)",
        config.player2,
        stats.player2_wins,
        100.0 * stats.player2_wins as f64 / games.max(1.0)
    );
    let _ = writeln!(
        out,
        "Ties:       {} ({:.1}%)",
        stats.ties,
        100.0 * stats.ties as f64 / games.max(1.0)
    );
}

// ── flag helpers ────────────────────────────────────────────────────

fn parse_flag<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {value}");
        process::exit(1);
    })
}

fn flag_error(msg: &str) {
    eprintln!("{msg}");
    print_usage();
    process::exit(1);
}
