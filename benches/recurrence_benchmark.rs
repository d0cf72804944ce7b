use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use taskdeck::models::RepeatUnit;
use taskdeck::time_utils::catch_up_due_date;

fn benchmark_catch_up(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();

    // A task that slipped a few days behind (the common case)
    let recent = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();

    // A daily task that nobody touched for years (worst case loop)
    let ancient = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    let mut group = c.benchmark_group("recurrence_catch_up");

    group.bench_function("one_week_behind", |b| {
        b.iter(|| {
            catch_up_due_date(
                black_box(recent),
                black_box(today),
                1,
                RepeatUnit::Weeks,
                None,
            )
        })
    });

    group.bench_function("six_years_behind_daily", |b| {
        b.iter(|| {
            catch_up_due_date(
                black_box(ancient),
                black_box(today),
                1,
                RepeatUnit::Days,
                None,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_catch_up);
criterion_main!(benches);
