use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fsm::random::{generate_random_machine, RandomMachineConfig};

const SIZES: &[usize] = &[4, 8, 12, 16];

fn machine(states: usize) -> fsm::Machine {
    let config = RandomMachineConfig {
        states,
        symbols: 3,
        density: 0.2,
        epsilon: 0.05,
        accepting: 0.3,
        initial: 1,
    };
    generate_random_machine(&config, &mut fastrand::Rng::with_seed(states as u64))
}

fn determinize(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_to_dfa");
    for &states in SIZES {
        let nfa = machine(states);
        group.bench_with_input(BenchmarkId::from_parameter(states), &nfa, |b, nfa| {
            b.iter(|| {
                let mut dfa = nfa.clone();
                dfa.convert_to_dfa();
                dfa
            })
        });
    }
    group.finish();
}

fn minimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimize");
    for &states in SIZES {
        let nfa = machine(states);
        group.bench_with_input(BenchmarkId::from_parameter(states), &nfa, |b, nfa| {
            b.iter(|| {
                let mut min = nfa.clone();
                min.minimize();
                min
            })
        });
    }
    group.finish();
}

fn equivalence(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_equivalent_to");
    for &states in SIZES {
        let nfa = machine(states);
        let mut dfa = nfa.clone();
        dfa.convert_to_dfa();
        group.bench_with_input(
            BenchmarkId::from_parameter(states),
            &(&nfa, &dfa),
            |b, (nfa, dfa)| b.iter(|| nfa.is_equivalent_to(dfa)),
        );
    }
    group.finish();
}

criterion_group!(benches, determinize, minimize, equivalence);
criterion_main!(benches);
