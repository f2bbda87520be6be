//! Collection Benchmarks — Per-Scrape Translation Cost
//!
//! Benchmarks the work done on every scrape once the document has been
//! fetched: decode, gauge mapping, family construction and encoding.
//!
//! Run with: cargo bench --bench collect_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gitlab_license_exporter::adapters::metrics::prometheus::{encode_text, LicenseDescriptors};
use gitlab_license_exporter::domain::gauges::GaugeSet;
use gitlab_license_exporter::domain::license::{date_to_unix, LicenseRecord};

const BODY: &[u8] = br#"{"id":3,"starts_at":"2024-01-15","expires_at":"2025-01-15","historical_max":75,"maximum_user_count":75,"expired":false,"overage":0,"user_limit":100,"active_users":64}"#;

/// Benchmark JSON decode of a typical license document.
fn bench_decode(c: &mut Criterion) {
    c.bench_function("license_decode", |b| {
        b.iter(|| {
            let _record = LicenseRecord::from_json(black_box(BODY));
        });
    });
}

/// Benchmark date string to Unix seconds.
fn bench_date(c: &mut Criterion) {
    c.bench_function("date_to_unix", |b| {
        b.iter(|| {
            let _secs = date_to_unix(black_box("2025-01-15"));
        });
    });
}

/// Benchmark record → families → text.
fn bench_translate(c: &mut Criterion) {
    let descriptors = LicenseDescriptors::new().expect("descriptors");
    let record = LicenseRecord::from_json(BODY).expect("fixture decodes");

    c.bench_function("translate_and_encode", |b| {
        b.iter(|| {
            let gauges = GaugeSet::from_record(black_box(&record));
            let families = descriptors.families(&gauges);
            let _text = encode_text(&families);
        });
    });
}

criterion_group!(benches, bench_decode, bench_date, bench_translate);
criterion_main!(benches);
