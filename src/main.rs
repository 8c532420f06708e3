//! Standalone benchmark runner.
//!
//! Seeds `./TestDB.db` with synthetic data if the expected dataset is not
//! already present (wipe-and-recreate otherwise), then times every query
//! variant and prints the formatted report.
//!
//! Usage:
//!   cargo run --release
//!
//! No flags and no environment variables; the dataset size is fixed by
//! [`GenParams::standard`].

use anyhow::{Context, Result};
use join_bench::populate::generate_test_data;
use join_bench::queries::{all_variants, QueryVariant};
use join_bench::report::{print_iteration, print_report, VariantResult};
use join_bench::schema::{
    configure_connection, create_tables, test_data_exists, GenParams, DB_PATH,
};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

const BENCH_ITERATIONS: u32 = 5;

fn main() {
    if let Err(err) = run() {
        println!("Exception creating DB: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    println!("About to create SQLite DB...");

    let params = GenParams::standard();
    ensure_test_data(&params)?;

    // Fresh connection for the benchmark: one connection per logical unit
    // of work, never shared between generation and measurement.
    let conn = Connection::open(DB_PATH).context("open database for benchmark")?;
    configure_connection(&conn)?;

    let results = run_benchmark(&conn)?;
    print_report(&results);
    Ok(())
}

/// Populate-if-missing: the BasketEntries row count is the sentinel for a
/// complete dataset; anything else triggers a full wipe and regeneration.
fn ensure_test_data(params: &GenParams) -> Result<()> {
    let conn = Connection::open(DB_PATH).context("open database")?;
    configure_connection(&conn)?;

    if test_data_exists(&conn, params)? {
        println!("Test data already exists.");
        return Ok(());
    }
    drop(conn);

    remove_database_files()?;

    let mut conn = Connection::open(DB_PATH).context("create database")?;
    configure_connection(&conn)?;
    create_tables(&conn)?;
    println!("Successfully created DB...");

    generate_test_data(&mut conn, params)?;
    Ok(())
}

/// Delete the database file plus any WAL sidecar files from a previous run.
fn remove_database_files() -> Result<()> {
    for path in [
        DB_PATH.to_string(),
        format!("{DB_PATH}-wal"),
        format!("{DB_PATH}-shm"),
    ] {
        if Path::new(&path).exists() {
            std::fs::remove_file(&path).with_context(|| format!("remove {path}"))?;
        }
    }
    Ok(())
}

fn run_benchmark(conn: &Connection) -> Result<Vec<VariantResult>> {
    let mut results = Vec::new();

    for variant in all_variants() {
        println!("\nRunning {} query...", variant.name());

        let mut result = VariantResult::new(variant.name());
        for _ in 0..BENCH_ITERATIONS {
            let start = Instant::now();
            let stats = variant.run(conn)?;
            result.add_iteration(start.elapsed(), stats);
            print_iteration(&stats);
        }

        println!(
            "{} run {}x in {:.0}ms ({:.0}ms per run).",
            variant.name(),
            BENCH_ITERATIONS,
            result.total_ms(),
            result.mean_ms()
        );
        results.push(result);
    }

    Ok(results)
}
