use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use runoff_election::Election;

fn seeded_election(candidates: usize, ballots: usize) -> Election {
    let names = (0..candidates).map(|i| format!("Candidate {}", i));
    let mut election = Election::new(names).unwrap();
    for ballot in 0..ballots {
        // Skew toward low indexes so the field has a clear leader.
        let index = (ballot * ballot) % candidates;
        election.cast_vote(Some(index)).unwrap();
    }
    election
}

fn bench_close_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("close_round");
    for &candidates in &[10usize, 100, 1_000] {
        group.bench_function(format!("{}_candidates", candidates), |b| {
            b.iter_batched(
                || seeded_election(candidates, 10_000),
                |mut election| black_box(election.close_round().unwrap()),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_cast_vote(c: &mut Criterion) {
    c.bench_function("cast_vote", |b| {
        let mut election = seeded_election(10, 0);
        let mut index = 0;
        b.iter(|| {
            index = (index + 1) % 10;
            black_box(election.cast_vote(Some(index)).unwrap())
        })
    });
}

criterion_group!(benches, bench_close_round, bench_cast_vote);
criterion_main!(benches);
