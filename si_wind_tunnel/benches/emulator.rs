// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use si_emulator::{Emulator, EmulatorConfig, FlatMemory, NdRange};
use si_wind_tunnel::alu_loop;

/// Entry point for the emulator benchmarks.
fn bench_emulator(c: &mut Criterion) {
    bench_alu_loop(c);
    bench_partial_wavefronts(c);
}

/// Instruction throughput of a scalar-controlled ALU loop on full wavefronts.
fn bench_alu_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("alu_loop");
    let kernel = alu_loop(64);
    for &work_groups in &[1_u32, 8, 32] {
        let ndrange = NdRange::linear(work_groups * 256, 256, vec![]);
        let mut emu = Emulator::new(EmulatorConfig::default(), FlatMemory::new()).unwrap();
        let per_run = emu.run(&kernel, &ndrange, None).unwrap().counters.total;
        group.throughput(Throughput::Elements(per_run));
        group.bench_with_input(
            BenchmarkId::from_parameter(work_groups),
            &ndrange,
            |b, ndrange| {
                b.iter(|| {
                    let summary = emu.run(black_box(&kernel), ndrange, None).unwrap();
                    black_box(summary.counters.total);
                });
            },
        );
    }
    group.finish();
}

/// The same loop on work groups whose last wavefront is mostly masked off.
fn bench_partial_wavefronts(c: &mut Criterion) {
    let mut group = c.benchmark_group("alu_loop_partial_wavefront");
    let kernel = alu_loop(64);
    for &local in &[65_u32, 100, 127] {
        let ndrange = NdRange::linear(local * 4, local, vec![]);
        let mut emu = Emulator::new(EmulatorConfig::default(), FlatMemory::new()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(local), &ndrange, |b, ndrange| {
            b.iter(|| {
                black_box(emu.run(&kernel, ndrange, None).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_emulator);
criterion_main!(benches);
