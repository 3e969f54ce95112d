use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sixdegrees::algo::Strategy;
use sixdegrees::graph::{GraphSnapshot, GraphStore, Movie, NodeRef, ParticipationEdge, Person};
use sixdegrees::query::{PathEngine, QueryConfig};

/// Bipartite graph with roughly `cast` people per movie
fn build_graph(people: usize, movies: usize, cast: usize) -> GraphSnapshot {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = GraphStore::new();
    for p in 0..people {
        let _ = store.add_person(Person::new(format!("nm{p:07}"), format!("Person {p}"), None));
    }
    for m in 0..movies {
        let _ = store.add_movie(Movie::new(format!("tt{m:07}"), format!("Movie {m}"), None));
        for _ in 0..cast {
            let p = rng.gen_range(0..people);
            let _ = store.add_participation(&ParticipationEdge::new(
                format!("nm{p:07}"),
                format!("tt{m:07}"),
                "actor",
            ));
        }
    }
    store.freeze()
}

/// Benchmark graph construction (builder + freeze)
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    group.sample_size(10);

    for movies in [1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(movies), movies, |b, &movies| {
            b.iter(|| build_graph(movies * 2, movies, 8));
        });
    }
    group.finish();
}

/// Compare unidirectional and bidirectional BFS on random person pairs
fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");
    let people = 40_000;
    let snapshot = build_graph(people, 20_000, 6);

    let mut rng = StdRng::seed_from_u64(7);
    let pairs: Vec<(NodeRef, NodeRef)> = (0..64)
        .map(|_| {
            (
                NodeRef::person(format!("nm{:07}", rng.gen_range(0..people))),
                NodeRef::person(format!("nm{:07}", rng.gen_range(0..people))),
            )
        })
        .collect();

    for strategy in [Strategy::Unidirectional, Strategy::Bidirectional] {
        let engine = PathEngine::new(QueryConfig {
            strategy,
            ..Default::default()
        });
        group.bench_function(BenchmarkId::from_parameter(strategy), |b| {
            let mut i = 0;
            b.iter(|| {
                let (from, to) = &pairs[i % pairs.len()];
                i += 1;
                black_box(engine.find_shortest_path(&snapshot, from, to))
            });
        });
    }
    group.finish();
}

/// Benchmark name search
fn bench_search(c: &mut Criterion) {
    let snapshot = build_graph(40_000, 20_000, 6);
    let engine = PathEngine::default();
    c.bench_function("search_substring", |b| {
        b.iter(|| black_box(engine.search(&snapshot, "son 12").ok()))
    });
}

criterion_group!(benches, bench_build, bench_shortest_path, bench_search);
criterion_main!(benches);
