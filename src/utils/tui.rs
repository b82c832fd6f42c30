//! Text User Interface (TUI) utilities.
//!
//! Handles formatted output for the CLI.

use crate::registry::{AlgorithmRegistry, AlgorithmRunner, BenchmarkResult};
use crate::utils::bench::format_measurement;
use crate::utils::runner::SuiteResults;
use terminal_size::{terminal_size, Width};

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Sorting priority: `switch` (the baseline) first, then the other Rust
/// variants, then C variants.
fn variant_sort_key(result: &BenchmarkResult) -> (u8, String) {
    let name = result.name.to_lowercase();
    if name == "switch" {
        (0, String::new())
    } else if name.starts_with("c-") {
        (2, name)
    } else {
        (1, name)
    }
}

/// Sort variants so the baseline comes first
pub fn sort_variants(results: &mut [BenchmarkResult]) {
    results.sort_by_key(variant_sort_key);
}

/// Truncate string with ellipsis if it exceeds width (character-wise)
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

/// Print algorithm info box
pub fn print_algo_info_box(algo: &dyn AlgorithmRunner) {
    let max_content_width = get_term_width().saturating_sub(4).max(40);

    let lines = [
        format!("Algorithm: {}", algo.name()),
        format!("Category:  {}", algo.category()),
        algo.description().to_string(),
        format!("Variants: {}", algo.available_variants().join(", ")),
    ];

    let content_width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(60)
        .min(max_content_width);

    let border = "─".repeat(content_width + 2);

    println!("┌{}┐", border);
    for (idx, line) in lines.iter().enumerate() {
        if idx == lines.len() - 1 {
            println!("├{}┤", border);
        }
        println!(
            "│ {:<width$} │",
            truncate(line, content_width),
            width = content_width
        );
    }
    println!("└{}┘", border);
    println!();
}

/// Relative difference between a result and the baseline result.
///
/// Every dispatch variant computes the same accumulator, so anything but
/// zero here points at a broken variant.
fn relative_difference(result: Option<f64>, baseline: Option<f64>) -> f64 {
    match (result, baseline) {
        (Some(res), Some(base)) => {
            let diff = (res - base).abs();
            if base.abs() > 1e-9 {
                diff / base.abs()
            } else {
                diff
            }
        }
        _ => 0.0,
    }
}

/// Print results table for a single size
pub fn print_results_table(results: &[BenchmarkResult], size: usize, runs: usize) {
    if results.is_empty() {
        return;
    }

    let term_width = get_term_width();
    // 12+12+12+12+9+9+10 = 76 chars + 7 spaces + 2 indent = 85
    let fixed_width = 85;
    let variant_col_width = term_width.saturating_sub(fixed_width).max(15);
    let table_width = variant_col_width + 76 + 7;

    let baseline_time = results
        .first()
        .map(|r| r.avg_nanos_f64)
        .unwrap_or(1.0);
    let baseline_result = results.first().and_then(|r| r.result_sample);
    let budget = results.first().map(|r| r.iterations).unwrap_or(0);

    println!("  Fan-out: {} ({} runs x {} iterations)", size, runs, budget);
    println!("  {}", "─".repeat(table_width));
    println!(
        "  {:<v_width$} {:>12} {:>12} {:>12} {:>12} {:>9} {:>9} {:>10}",
        "Variant",
        "Average",
        "Median",
        "Min",
        "Max",
        "Speedup",
        "CV",
        "Rel. Diff",
        v_width = variant_col_width
    );
    println!("  {}", "─".repeat(table_width));

    for result in results {
        let speedup = if result.avg_nanos_f64 > 0.0 {
            baseline_time / result.avg_nanos_f64
        } else {
            0.0
        };

        let std_dev = result.std_dev.as_nanos() as f64;
        let cv = if result.avg_nanos_f64 > 0.0 {
            std_dev / result.avg_nanos_f64
        } else {
            0.0
        };

        let display_name = if result.name.starts_with("c-") {
            match crate::utils::C_COMPILER_NAME {
                Some(c) => format!("{} ({})", result.name, c),
                None => result.name.clone(),
            }
        } else {
            result.name.clone()
        };

        println!(
            "  {:<v_width$} {:>12} {:>12} {:>12} {:>12} {:>8.2}x {:>8.2}% {:>10.2e}",
            truncate(&display_name, variant_col_width),
            format_measurement(result.avg_time),
            format_measurement(result.median_time),
            format_measurement(result.min_time),
            format_measurement(result.max_time),
            speedup,
            cv * 100.0,
            relative_difference(result.result_sample, baseline_result),
            v_width = variant_col_width
        );
    }
    println!();
}

/// Print the application header
pub fn print_header() {
    let term_width = get_term_width().min(80);
    let title = " Dispatch Benchmarks: switch vs table ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());

    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!(
        "║{}{}{}║",
        " ".repeat(padding),
        title,
        " ".repeat(right_padding)
    );
    println!("╚{}╝", border);
    println!();
}

/// Print the list of available algorithms
pub fn print_available_algorithms(registry: &AlgorithmRegistry) {
    println!("Available algorithms:");
    println!();
    for algo in registry.all() {
        println!(
            "  {:<36} [{}] - {}",
            algo.name(),
            algo.category(),
            algo.description()
        );
    }
}

/// Display suite results grouped by algorithm and size.
pub fn print_suite_results(
    algorithms: &[&dyn AlgorithmRunner],
    sizes: &[usize],
    runs: usize,
    suite: &SuiteResults,
) {
    for (algo_idx, algo) in algorithms.iter().enumerate() {
        print_algo_info_box(*algo);

        for (size_idx, &size) in sizes.iter().enumerate() {
            let mut variant_results = suite.results[algo_idx][size_idx].clone();
            sort_variants(&mut variant_results);
            print_results_table(&variant_results, size, runs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(name: &str) -> BenchmarkResult {
        BenchmarkResult {
            name: name.to_string(),
            description: String::new(),
            avg_time: Duration::ZERO,
            avg_nanos_f64: 0.0,
            median_time: Duration::ZERO,
            min_time: Duration::ZERO,
            max_time: Duration::ZERO,
            std_dev: Duration::ZERO,
            iterations: 0,
            result_sample: None,
        }
    }

    #[test]
    fn test_sort_puts_switch_first() {
        let mut results = vec![result("c-table"), result("table"), result("c-switch"), result("switch")];
        sort_variants(&mut results);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["switch", "table", "c-switch", "c-table"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_relative_difference() {
        assert_eq!(relative_difference(Some(12.0), Some(12.0)), 0.0);
        assert_eq!(relative_difference(Some(6.0), Some(12.0)), 0.5);
        assert_eq!(relative_difference(None, Some(12.0)), 0.0);
    }
}
