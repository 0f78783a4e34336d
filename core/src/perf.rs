//! Synthetic before/after timings for the visualization pane.
//!
//! Nothing here is measured: figures are drawn from per-pattern ranges so the
//! charts have plausible shapes. Pass a seeded RNG for reproducible output.

use crate::pattern::PatternType;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    pub label: String,
    /// Milliseconds.
    pub original_time: u64,
    /// Milliseconds.
    pub optimized_time: u64,
    pub speedup: f64,
}

impl PerformanceData {
    fn new(label: impl Into<String>, original_time: u64, optimized_time: u64) -> Self {
        let optimized_time = optimized_time.max(1);
        Self {
            label: label.into(),
            original_time,
            optimized_time,
            speedup: original_time as f64 / optimized_time as f64,
        }
    }
}

/// (base time floor ms, base time spread ms, speedup floor, speedup spread)
fn profile(kind: PatternType) -> (f64, f64, f64, f64) {
    match kind {
        PatternType::Map => (200.0, 100.0, 2.5, 1.5),
        PatternType::Reduce => (150.0, 100.0, 3.0, 2.0),
        PatternType::Scan => (180.0, 120.0, 2.0, 1.5),
        PatternType::Stencil => (250.0, 150.0, 2.0, 1.0),
        PatternType::Broadcast => (100.0, 50.0, 1.5, 1.0),
        PatternType::Gather => (120.0, 80.0, 2.0, 1.5),
        PatternType::Scatter => (130.0, 70.0, 2.0, 1.2),
        PatternType::Unknown => (100.0, 100.0, 1.5, 1.0),
    }
}

const GENERAL_PROFILE: (f64, f64, f64, f64) = (300.0, 200.0, 1.8, 1.2);

fn draw<R: Rng>(rng: &mut R, (base, spread, factor, factor_spread): (f64, f64, f64, f64)) -> (u64, u64) {
    let original = (base + rng.gen::<f64>() * spread).round();
    let speedup = factor + rng.gen::<f64>() * factor_spread;
    (original as u64, (original / speedup).round() as u64)
}

/// One row per detected pattern (`Unknown` skipped), or a single general row
/// when none qualify, followed by "Overall Execution" and "Memory Utilization".
pub fn generate_performance_data<R: Rng>(patterns: &[PatternType], rng: &mut R) -> Vec<PerformanceData> {
    let mut rows: Vec<PerformanceData> = patterns
        .iter()
        .filter(|p| **p != PatternType::Unknown)
        .map(|p| {
            let (original, optimized) = draw(rng, profile(*p));
            PerformanceData::new(format!("{} Pattern", p.title()), original, optimized)
        })
        .collect();

    if rows.is_empty() {
        let (original, optimized) = draw(rng, GENERAL_PROFILE);
        rows.push(PerformanceData::new("General Parallelization", original, optimized));
    }

    let total_original: u64 = rows.iter().map(|r| r.original_time).sum();
    let total_optimized: u64 = rows.iter().map(|r| r.optimized_time).sum();

    rows.push(PerformanceData::new("Overall Execution", total_original, total_optimized));

    let mem_original = total_original as f64 * 0.6;
    let mem_optimized = total_optimized as f64 * 0.5;
    let mut memory = PerformanceData::new(
        "Memory Utilization",
        mem_original.round() as u64,
        mem_optimized.round() as u64,
    );
    memory.speedup = mem_original / mem_optimized.max(1.0);
    rows.push(memory);

    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub average_speedup: f64,
    pub max_speedup: f64,
    /// `1 - 1/average`; higher speedup reads as better utilization.
    pub resource_utilization: f64,
}

impl PerformanceSummary {
    #[must_use]
    pub fn from_rows(rows: &[PerformanceData]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let average_speedup = rows.iter().map(|r| r.speedup).sum::<f64>() / rows.len() as f64;
        let max_speedup = rows.iter().map(|r| r.speedup).fold(f64::MIN, f64::max);
        Some(Self {
            average_speedup,
            max_speedup,
            resource_utilization: 1.0 - 1.0 / average_speedup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn labels(rows: &[PerformanceData]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn one_row_per_pattern_plus_totals() {
        let mut rng = StdRng::seed_from_u64(42);
        let rows = generate_performance_data(&[PatternType::Map, PatternType::Unknown, PatternType::Reduce], &mut rng);
        assert_eq!(
            labels(&rows),
            vec!["Map Pattern", "Reduce Pattern", "Overall Execution", "Memory Utilization"]
        );

        let map = &rows[0];
        assert!((200..=300).contains(&map.original_time));
        assert!(map.speedup >= 2.0 && map.speedup <= 4.5);

        let overall = &rows[2];
        assert_eq!(overall.original_time, rows[0].original_time + rows[1].original_time);
        assert_eq!(overall.optimized_time, rows[0].optimized_time + rows[1].optimized_time);
    }

    #[test]
    fn no_known_patterns_gives_general_row() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = generate_performance_data(&[PatternType::Unknown], &mut rng);
        assert_eq!(labels(&rows), vec!["General Parallelization", "Overall Execution", "Memory Utilization"]);
        assert!((300..=500).contains(&rows[0].original_time));
    }

    #[test]
    fn same_seed_same_figures() {
        let a = generate_performance_data(&[PatternType::Stencil], &mut StdRng::seed_from_u64(3));
        let b = generate_performance_data(&[PatternType::Stencil], &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn summary_averages_speedups() {
        let rows = vec![
            PerformanceData::new("a", 100, 50),
            PerformanceData::new("b", 100, 25),
        ];
        let summary = PerformanceSummary::from_rows(&rows).unwrap();
        assert!((summary.average_speedup - 3.0).abs() < 1e-9);
        assert!((summary.max_speedup - 4.0).abs() < 1e-9);
        assert!((summary.resource_utilization - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
        assert!(PerformanceSummary::from_rows(&[]).is_none());
    }
}
