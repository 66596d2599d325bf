//! Criterion benchmark for the parameter pipeline: array expansion on its own, and a full
//! `Database::query` round trip against the in-memory driver so the statement overhead
//! (expansion, filtering, tracing, hydration) is measured without network noise.

#![allow(clippy::cast_possible_wrap)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mysql_middleware::config::ConnectOptions;
use mysql_middleware::placeholders::expand_array_params;
use mysql_middleware::test_utils::MockConnector;
use mysql_middleware::types::{Params, SqlValue};
use mysql_middleware::{Database, Row};
use std::hint::black_box;
use tokio::runtime::Runtime;

const SELECT_IN: &str =
    "SELECT id, name FROM items WHERE status = :status AND id IN (:ids) ORDER BY id";

fn params_for(len: usize) -> Params {
    let ids: Vec<i64> = (0..len as i64).collect();
    Params::new()
        .bind("status", "active")
        .bind("ids", ids)
        .bind("unused", 1_i64)
}

fn expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_array_params");
    for len in [10_usize, 100, 1_000] {
        let params = params_for(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_function(BenchmarkId::new("in_list", len), |b| {
            b.iter(|| {
                let expanded = expand_array_params(black_box(SELECT_IN), black_box(&params));
                black_box(expanded.map(|(sql, params)| (sql.len(), params.len())))
            });
        });
    }

    let scalar_only = Params::new().bind("status", "active").bind("ids", 3_i64);
    group.bench_function("no_lists", |b| {
        b.iter(|| black_box(expand_array_params(black_box(SELECT_IN), &scalar_only)));
    });
    group.finish();
}

fn session_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mock = MockConnector::new();
    let rows: Vec<Vec<SqlValue>> = (0..50)
        .map(|i| vec![SqlValue::Int(i), SqlValue::Text(format!("item-{i}"))])
        .collect();
    mock.rows("SELECT id, name", &["id", "name"], rows);

    let open = Database::open(
        mock.clone(),
        "localhost/bench/bench/bench",
        ConnectOptions::default(),
    );
    let db = rt.block_on(open).expect("mock connection");
    let db = tokio::sync::Mutex::new(db);

    let mut group = c.benchmark_group("database_query");
    for len in [10_usize, 100] {
        let params = params_for(len);
        group.bench_function(BenchmarkId::new("mock_rows_50", len), |b| {
            b.to_async(&rt).iter(|| async {
                mock.clear();
                let mut db = db.lock().await;
                let rows: Vec<Row> = db.query(SELECT_IN, &params).await.expect("query");
                black_box(rows.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, expansion, session_round_trip);
criterion_main!(benches);
