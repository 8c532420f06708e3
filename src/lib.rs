//! SQLite Eager-Loading Benchmark
//!
//! Reproduces a classic ORM performance trap: fetching a parent entity
//! together with two levels of nested collections (basket entries → images
//! → image tags → tags) in a single composed query. The join fans out to
//! `entries × tags-per-image` rows and the object graph has to be
//! deduplicated client-side, which gets slow at scale.
//!
//! Four logically equivalent query strategies are timed against the same
//! generated dataset:
//! - **nested include**: one composed query, graph reassembled client-side
//! - **split load**: parents first, then one follow-up tag query per image
//! - **raw SQL, mapping-shaped**: the decorrelated LEFT JOIN an ORM emits
//! - **raw SQL, ordered joins**: plain INNER JOINs with ORDER BY on the keys
//!
//! Run the harness: `cargo run --release`
//! Run tests: `cargo test`
//! Run benchmarks: `cargo bench`

pub mod populate;
pub mod queries;
pub mod report;
pub mod schema;
