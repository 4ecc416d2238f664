use criterion::{Criterion, criterion_group, criterion_main};
use scorch::compute;

fn bench_burn(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    group.sample_size(50);

    group.bench_function(
        format!("burn {} transcendental rounds", compute::ROUNDS),
        |b| {
            b.iter(compute::burn);
        },
    );

    group.finish();
}

criterion_group!(benches, bench_burn);
criterion_main!(benches);
