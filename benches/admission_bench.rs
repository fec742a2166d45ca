//! Benchmarks for the booking admission engine and its session surface.
//!
//! Benchmarks cover:
//! - Admission checks over growing per-date booking sets
//! - Brand-budget summation for newsletter-heavy dates
//! - Calendar projection of full booking snapshots
//! - End-to-end session scenarios (load, check, persist, realign)

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tokio::runtime::Runtime;

use campaign_calendar::api::{calendar_events, BookingForm};
use campaign_calendar::config::CalendarConfig;
use campaign_calendar::core::{
    evaluate, Booking, BookingController, CapacityPolicy, Entity, Record, RecordId, RecordStore,
    ResolvedBooking, ServiceType, SlotStatus, Target,
};
use campaign_calendar::infra::record_store::MemoryRecordStore;

// ============================================================================
// Helper Functions
// ============================================================================

fn slot(id: u64, service: ServiceType, date: NaiveDate) -> Booking {
    Booking {
        id: Some(RecordId::new(format!("slot-{id}"))),
        service_type: service,
        date,
        target: Target::National,
        status: SlotStatus::Booked,
        opportunity_id: None,
    }
}

fn service_for(id: u64) -> ServiceType {
    match id % 3 {
        0 => ServiceType::Newsletter,
        1 => ServiceType::Dem,
        _ => ServiceType::Push,
    }
}

fn july(day: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1 + (day % 28) as u32).unwrap()
}

// ============================================================================
// Admission Benchmarks
// ============================================================================

fn bench_admission_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_scan");

    for size in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let date = july(0);
            let existing: Vec<ResolvedBooking> = (0..size)
                .map(|i| ResolvedBooking::with_default_brands(slot(i, service_for(i), date)))
                .collect();
            let policy = CapacityPolicy::unrestricted();
            let candidate = slot(size + 1, ServiceType::Dem, date);

            b.iter(|| {
                let decision = evaluate(black_box(&candidate), &existing, &policy);
                black_box(decision);
            });
        });
    }
    group.finish();
}

fn bench_admission_brand_sums(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_brand_sums");

    for size in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let date = july(0);
            let existing: Vec<ResolvedBooking> = (0..size)
                .map(|i| {
                    let brands = 1 + (i % 3) as u32;
                    ResolvedBooking::new(slot(i, ServiceType::Newsletter, date), brands)
                })
                .collect();
            // Only the brand rule is live, so the summation runs to the end
            let policy = CapacityPolicy {
                max_non_push_per_date: None,
                max_push_per_date: None,
                max_brands_per_newsletter_date: Some(u32::MAX),
            };
            let candidate = slot(size + 1, ServiceType::Newsletter, date);

            b.iter(|| {
                let decision = evaluate(black_box(&candidate), &existing, &policy);
                black_box(decision);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Projection Benchmarks
// ============================================================================

fn bench_calendar_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar_projection");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let bookings: Vec<Booking> = (0..size)
                .map(|i| slot(i, service_for(i), july(i * 7)))
                .collect();

            b.iter(|| {
                let events = calendar_events(black_box(&bookings));
                black_box(events);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Session Benchmarks (Async)
// ============================================================================

fn bench_end_to_end_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end_session");

    for size in [10, 100, 500] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let store = MemoryRecordStore::new();
                for i in 0..size {
                    let booking = slot(i, service_for(i), july(i / 2));
                    let record = Record::new(booking.id.clone().unwrap(), booking.to_fields());
                    store.seed(Entity::Bookings, record).await;
                }
                let mut rules = Map::new();
                rules.insert(
                    "ConfigJSON".into(),
                    Value::String(r#"{"rules":{"newsletter":{"maxBrands":3}}}"#.into()),
                );
                store.insert(Entity::ConfigRules, rules).await.unwrap();

                let mut controller =
                    BookingController::start(store, &CalendarConfig::default())
                        .await
                        .unwrap();

                // Submit onto an empty date: full check, write, and realign
                let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
                controller.open_new(date);
                let outcome = controller
                    .submit(BookingForm {
                        service_type: ServiceType::Dem,
                        date,
                        target: Target::National,
                        opportunity_id: None,
                    })
                    .await
                    .unwrap();
                black_box(outcome);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    admission_benches,
    bench_admission_scan,
    bench_admission_brand_sums
);

criterion_group!(projection_benches, bench_calendar_projection);

criterion_group!(session_benches, bench_end_to_end_session);

criterion_main!(admission_benches, projection_benches, session_benches);
