//! This bench measures availability checks and booking requests against a
//! workflow holding a large number of bookings.

#![allow(missing_docs)]

use chrono::{Days, NaiveDate};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use roombook::{
    BookingWorkflow, Config, Fixture, SlotRequest, Username,
    domain::{PolicyKind, slot::parse_time},
};

/// Books every free morning hour in every demo room for a year.
fn preseed_workflow(policy: PolicyKind) -> BookingWorkflow {
    let mut config = Config::default();
    config.policy = policy;
    let mut workflow = Fixture::demo().into_workflow(&config).unwrap();

    let user = Username::new("bench").unwrap();
    let first = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let rooms: Vec<String> = workflow.rooms().map(|r| r.id.to_string()).collect();
    for day in 0..365 {
        let date = first.checked_add_days(Days::new(day)).unwrap();
        for room in &rooms {
            for hour in 8..12 {
                let request = SlotRequest::new(
                    room.clone(),
                    date,
                    parse_time(&format!("{hour:02}:00")).unwrap(),
                    parse_time(&format!("{:02}:00", hour + 1)).unwrap(),
                );
                workflow.request_booking(&request, &user).unwrap();
            }
        }
    }
    workflow
}

fn check_availability(c: &mut Criterion) {
    let workflow = preseed_workflow(PolicyKind::Overlap);
    let slot = workflow
        .validate(&SlotRequest::new(
            "Innovation Hub",
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            parse_time("10:30").unwrap(),
            parse_time("11:30").unwrap(),
        ))
        .unwrap();

    c.bench_function("overlap check", |b| {
        b.iter(|| workflow.check_availability(std::hint::black_box(&slot)));
    });

    let workflow = preseed_workflow(PolicyKind::Denylist);
    c.bench_function("denylist check", |b| {
        b.iter(|| workflow.check_availability(std::hint::black_box(&slot)));
    });
}

fn request_booking(c: &mut Criterion) {
    let user = Username::new("bench").unwrap();
    let request = SlotRequest::new(
        "Creative Studio",
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        parse_time("13:00").unwrap(),
        parse_time("14:00").unwrap(),
    );

    c.bench_function("request booking", |b| {
        b.iter_batched(
            || preseed_workflow(PolicyKind::Overlap),
            |mut workflow| workflow.request_booking(&request, &user).unwrap(),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, check_availability, request_booking);
criterion_main!(benches);
