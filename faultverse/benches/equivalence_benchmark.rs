use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use faultverse::{distinguishing_weight, import_stim, push_out, EquivalenceOptions, NoiseModel};
use pauliweb::generate::{shor_extraction, steane_code_stabilisers, zweb};
use pauliweb::FlipOperators;
use std::fmt::Write;
use std::sync::Arc;

pub fn push_out_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("push_out/steane_extraction");
    group.sample_size(10);
    for repeat in [1usize, 2] {
        let Ok(extraction) = shor_extraction(&steane_code_stabilisers(), 7, repeat, false) else {
            continue;
        };
        let diagram = Arc::new(extraction.diagram);
        let Ok(flip_ops) = FlipOperators::build(Arc::clone(&diagram)) else {
            continue;
        };
        let noise = NoiseModel::<u64>::edge_flip_noise(diagram);
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &noise, |bencher, noise| {
            bencher.iter(|| push_out(noise, &flip_ops));
        });
    }
    group.finish();
}

pub fn equivalence_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("distinguishing_weight/zweb");
    group.sample_size(10);
    for depth in [2usize, 3] {
        let first = NoiseModel::<u64>::edge_flip_noise(Arc::new(zweb(2, depth)));
        let second = NoiseModel::<u64>::edge_flip_noise(Arc::new(zweb(2, depth + 1)));
        let options = EquivalenceOptions::default().with_until(4);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &(first, second), |bencher, (first, second)| {
            bencher.iter(|| distinguishing_weight(first, second, &options));
        });
    }
    group.finish();
}

/// Repetition code memory experiment over `rounds` rounds of `data` data qubits.
fn repetition_code(data: usize, rounds: usize) -> String {
    let ancillas = data - 1;
    let data_qubits = (0..data).map(|qubit| qubit.to_string()).collect::<Vec<_>>().join(" ");
    let mut circuit = String::from("R");
    for qubit in 0..data + ancillas {
        let _ = write!(circuit, " {qubit}");
    }
    circuit.push('\n');
    for round in 0..rounds {
        let _ = writeln!(circuit, "DEPOLARIZE1(0.001) {data_qubits}");
        for ancilla in 0..ancillas {
            let _ = writeln!(circuit, "CX {} {} {} {}", ancilla, data + ancilla, ancilla + 1, data + ancilla);
        }
        let _ = write!(circuit, "MR");
        for ancilla in 0..ancillas {
            let _ = write!(circuit, " {}", data + ancilla);
        }
        circuit.push('\n');
        for ancilla in 0..ancillas {
            let lookback = ancillas - ancilla;
            if round == 0 {
                let _ = writeln!(circuit, "DETECTOR rec[-{lookback}]");
            } else {
                let _ = writeln!(circuit, "DETECTOR rec[-{lookback}] rec[-{}]", lookback + ancillas);
            }
        }
    }
    let _ = writeln!(circuit, "M {data_qubits}");
    circuit.push_str("OBSERVABLE_INCLUDE(0) rec[-1]\n");
    circuit
}

pub fn stim_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("detector_error_model/repetition_code");
    group.sample_size(10);
    for rounds in [2usize, 4] {
        let circuit = repetition_code(3, rounds);
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &circuit, |bencher, circuit| {
            bencher.iter(|| import_stim(circuit).and_then(|imported| imported.detector_error_model()));
        });
    }
    group.finish();
}

criterion_group!(benches, push_out_benchmark, equivalence_benchmark, stim_benchmark);
criterion_main!(benches);
