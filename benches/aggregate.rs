use bugspot::model::{Commit, FileChange};
use bugspot::{aggregate, FilterOptions, HotspotQuery, MemorySource};
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const MESSAGES: &[&str] = &[
    "fix: null pointer in parser",
    "add feature flag",
    "refactor storage layer",
    "bugfix for cache eviction",
    "docs: update readme",
];

fn synthetic_history(commits: usize, files: usize) -> MemorySource {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let history = (0..commits)
        .map(|i| Commit {
            id: format!("{i:040x}"),
            message: MESSAGES[i % MESSAGES.len()].to_string(),
            author_name: format!("dev{}", i % 7),
            timestamp: start + Duration::hours(i as i64),
            changes: (0..3)
                .map(|j| {
                    let ext = if (i + j) % 3 == 0 { "rs" } else { "py" };
                    FileChange::modified(format!("src/mod{}/file{}.{ext}", (i + j) % 13, (i * 7 + j) % files))
                })
                .collect(),
        })
        .collect();
    MemorySource::new(history)
}

fn bench_aggregate(c: &mut Criterion) {
    let source = synthetic_history(20_000, 500);

    c.bench_function("aggregate_unfiltered", |b| {
        let query = HotspotQuery::default();
        b.iter(|| aggregate(black_box(&source), &query).unwrap())
    });

    c.bench_function("aggregate_filtered_with_trend", |b| {
        let query = HotspotQuery {
            filters: FilterOptions {
                since: Some("2020-06-01".to_string()),
                extension: Some("py".to_string()),
                keywords: vec!["fix".to_string(), "feature".to_string()],
                ..Default::default()
            },
            time_series: true,
            ..Default::default()
        };
        b.iter(|| aggregate(black_box(&source), &query).unwrap())
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
