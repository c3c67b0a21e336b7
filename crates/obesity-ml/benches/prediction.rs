//! Serving latency: single predictions and batches against an in-memory bundle.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use obesity_ml::testing::data::synthetic_table;
use obesity_ml::{InferenceService, PatientInput, Preprocessor, ServingBundle, Trainer, TrainingConfig, Verbosity};

fn trained_service() -> InferenceService {
    let prepared = Preprocessor::default().prepare(synthetic_table(1_000, 42)).expect("synthetic data prepares");
    let config = TrainingConfig::builder().verbosity(Verbosity::Silent).build().expect("default config is valid");
    let models = Trainer::new(config).train_prepared(&prepared).expect("training succeeds");
    InferenceService::from_bundle(ServingBundle::new(models.ensemble, prepared.bundle, models.stats))
}

fn inputs(n: usize) -> Vec<PatientInput> {
    (0..n)
        .map(|i| {
            let gender = if i % 2 == 0 { "Female" } else { "Male" };
            let weight = 50.0 + (i % 70) as f64;
            PatientInput::new(20 + (i % 40) as u32, gender, 160.0 + (i % 30) as f64, weight, "Light", "yes")
        })
        .collect()
}

fn bench_prediction(c: &mut Criterion) {
    let service = trained_service();

    let mut group = c.benchmark_group("predict");
    let single = PatientInput::new(35, "Male", 175.0, 95.0, "Sedentary", "Yes");
    group.bench_function("single", |b| b.iter(|| black_box(service.predict(black_box(&single)))));

    for batch_size in [16usize, 256] {
        let batch = inputs(batch_size);
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::new("batch", batch_size), &batch, |b, batch| {
            b.iter(|| black_box(service.predict_batch(black_box(batch))))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_prediction
}
criterion_main!(benches);
