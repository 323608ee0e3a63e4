//! Criterion benchmarks for gardensim_core
//!
//! Run with: cargo bench -p gardensim_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gardensim_core::config::{SimulationBuilder, SimulationConfig};
use gardensim_core::consensus::synthesize_calendar;
use gardensim_core::model::{CropCategory, SummerScenario};
use gardensim_core::simulation::{SimulationOptions, run_simulation};
use jiff::Timestamp;

fn create_config(iterations: usize) -> SimulationConfig {
    SimulationBuilder::new()
        .season_start(2025, 1, 1)
        .allocate(CropCategory::HeatTolerant, 40.0)
        .allocate(CropCategory::CoolSeason, 35.0)
        .allocate(CropCategory::Perennial, 25.0)
        .base_investment(400.0)
        .summer(SummerScenario::Extreme)
        .iterations(iterations)
        .build()
}

fn options() -> SimulationOptions {
    SimulationOptions::seeded(42).generated_at(Timestamp::UNIX_EPOCH)
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");

    for iterations in [100, 1000, 5000].iter() {
        let config = create_config(*iterations);
        group.bench_with_input(
            BenchmarkId::new("iterations", iterations),
            iterations,
            |b, _| b.iter(|| run_simulation(black_box(&config), options())),
        );
    }

    group.finish();
}

fn bench_consensus(c: &mut Criterion) {
    let mut group = c.benchmark_group("consensus");

    // Reuse the calendars of one run so only the synthesis is measured
    let Ok(result) = run_simulation(&create_config(1000), options()) else {
        return;
    };
    group.bench_function("synthesize_1000", |b| {
        b.iter(|| {
            synthesize_calendar(
                black_box(result.iterations.iter().map(|i| &i.calendar)),
                Timestamp::UNIX_EPOCH,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_monte_carlo, bench_consensus);
criterion_main!(benches);
