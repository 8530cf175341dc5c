//! Criterion benchmarks for the per-block audio path
//!
//! Run with: cargo bench -p pulsar-engine
//!
//! At 48 kHz with 4-frame blocks the whole dispatch has 83 µs.
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pulsar_core::{Frame, ManualClock, ProcessArgs, Program};
use pulsar_engine::{AudioDispatch, ProgramRack};
use pulsar_platform::{CvBank, GateConfig, SimAdc, Switch};

struct Gain;

impl Program for Gain {
    fn name(&self) -> &'static str {
        "Gain"
    }

    fn init(&mut self, _sample_rate: f32) {}

    fn process(&mut self, args: &mut ProcessArgs<'_>) {
        let gain = f32::from(args.cv[2]) / 65535.0;
        for (out, inp) in args.output.iter_mut().zip(args.input) {
            *out = inp.scaled(gain);
        }
    }
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("AudioDispatch");

    let clock = ManualClock::new(0);
    let adc = SimAdc::new();
    adc.set(2, 40_000);
    let bank = CvBank::new(&adc, &clock, GateConfig::default());
    let button = Switch::unconfigured();
    let rack = ProgramRack::new(vec![Box::new(Gain)], 48_000.0);
    rack.run_program(Some(0));
    let audio = AudioDispatch::new(&rack, &bank, &button);

    for block_size in [4usize, 64] {
        let input = vec![Frame::mono(0.25); block_size];
        let mut output = vec![Frame::SILENCE; block_size];
        group.bench_function(format!("process_{block_size}"), |b| {
            b.iter(|| {
                clock.advance(83);
                audio.process(black_box(&input), &mut output);
                black_box(&output);
            });
        });
    }

    let idle = ProgramRack::new(Vec::new(), 48_000.0);
    let idle_audio = AudioDispatch::new(&idle, &bank, &button);
    group.bench_function("process_no_program", |b| {
        let input = [Frame::SILENCE; 4];
        let mut output = [Frame::SILENCE; 4];
        b.iter(|| {
            idle_audio.process(black_box(&input), &mut output);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
