//! Criterion benchmark harness: measures each query variant against an
//! in-memory dataset.
//!
//! The on-disk harness (`cargo run --release`) is the reference measurement
//! at 500k images; this bench keeps the dataset small enough to iterate on
//! the materialization code without minute-long setup.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use join_bench::populate::generate_test_data;
use join_bench::queries::{all_variants, QueryVariant};
use join_bench::schema::{configure_connection, create_tables, GenParams};
use rusqlite::Connection;

/// Dataset sizes to benchmark.
fn dataset_levels() -> Vec<(&'static str, GenParams)> {
    vec![
        (
            "small",
            GenParams {
                image_count: 5_000,
                seed: 0xBE4C_4A5E,
            },
        ),
        (
            "medium",
            GenParams {
                image_count: 50_000,
                seed: 0xBE4C_4A5E,
            },
        ),
    ]
}

/// Create an in-memory SQLite database, populate it, and return the connection.
fn setup_db(params: &GenParams) -> Connection {
    let mut conn = Connection::open_in_memory().expect("Failed to open in-memory SQLite");
    configure_connection(&conn).expect("Failed to configure connection");
    create_tables(&conn).expect("Failed to create tables");
    generate_test_data(&mut conn, params).expect("Failed to populate");
    conn
}

fn bench_variants(c: &mut Criterion) {
    for (label, params) in dataset_levels() {
        let conn = setup_db(&params);

        let mut group = c.benchmark_group(format!("query/{label}"));
        group.sample_size(50);

        for variant in all_variants() {
            group.bench_with_input(
                BenchmarkId::from_parameter(variant.name()),
                &conn,
                |b, conn| {
                    b.iter(|| variant.run(conn).expect("query failed"));
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, bench_variants);
criterion_main!(benches);
