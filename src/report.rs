//! Report module: prints per-iteration progress lines and the final timing
//! summary comparing query variants.

use crate::queries::FetchStats;
use std::time::Duration;

/// Results from running one query variant for all its iterations.
#[derive(Debug, Clone)]
pub struct VariantResult {
    pub variant_name: String,
    pub iteration_stats: Vec<FetchStats>,
    pub iteration_durations: Vec<Duration>,
}

impl VariantResult {
    pub fn new(variant_name: &str) -> Self {
        Self {
            variant_name: variant_name.to_string(),
            iteration_stats: Vec::new(),
            iteration_durations: Vec::new(),
        }
    }

    pub fn add_iteration(&mut self, elapsed: Duration, stats: FetchStats) {
        self.iteration_durations.push(elapsed);
        self.iteration_stats.push(stats);
    }

    pub fn iterations(&self) -> usize {
        self.iteration_durations.len()
    }

    pub fn total_ms(&self) -> f64 {
        self.iteration_durations
            .iter()
            .map(|d| d.as_secs_f64() * 1e3)
            .sum()
    }

    pub fn mean_ms(&self) -> f64 {
        if self.iteration_durations.is_empty() {
            return 0.0;
        }
        self.total_ms() / self.iteration_durations.len() as f64
    }

    /// Distinct images seen in the last iteration (identical across
    /// iterations — the data never changes between runs).
    pub fn distinct_images(&self) -> usize {
        self.iteration_stats
            .last()
            .map(|s| s.distinct_images)
            .unwrap_or(0)
    }

    fn deduplicated(&self) -> bool {
        self.iteration_stats
            .last()
            .map(|s| s.deduplicated)
            .unwrap_or(true)
    }
}

/// Per-iteration progress line.
pub fn print_iteration(stats: &FetchStats) {
    if stats.deduplicated {
        println!(
            " Loaded {} images, with {} tags.",
            stats.images_loaded, stats.tags_loaded
        );
    } else {
        // Known issue, preserved on purpose: raw materialization keeps one
        // record per join row, so repeated parents are counted again.
        println!(
            " Loaded {} image rows ({} distinct; join fan-out not deduplicated), with {} tags.",
            stats.images_loaded, stats.distinct_images, stats.tags_loaded
        );
    }
}

/// Print the formatted summary comparing all variants.
pub fn print_report(results: &[VariantResult]) {
    println!("\n{}", "=".repeat(80));
    println!("  Eager-Loading Query Benchmark Report");
    println!("{}", "=".repeat(80));

    for result in results {
        println!("\n  Variant: {}", result.variant_name);
        println!("  {}", "-".repeat(60));
        println!("  Iterations:      {:>10}", result.iterations());
        println!("  Total:           {:>10.0}ms", result.total_ms());
        println!("  Mean:            {:>10.0}ms", result.mean_ms());
        println!("  Distinct images: {:>10}", result.distinct_images());
        if !result.deduplicated() {
            println!("  Note: image counts include join fan-out duplicates (known issue).");
        }
    }

    println!("\n{}", "=".repeat(80));

    if results.len() >= 2 {
        println!("\n  Comparison Summary:");
        println!(
            "  {:26} {:>12} {:>12} {:>10}",
            "Variant", "Total (ms)", "Mean (ms)", "Images"
        );
        println!("  {}", "-".repeat(64));
        for r in results {
            println!(
                "  {:26} {:>12.0} {:>12.0} {:>10}",
                r.variant_name,
                r.total_ms(),
                r.mean_ms(),
                r.distinct_images(),
            );
        }
    }

    println!();
}
