use callstitch::conversation::{Role, Timelines, Turn, assemble, compile};
use callstitch::media::ffmpeg::encode_filter_complex;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::PathBuf;

/// Alternating agent/customer turns with uneven durations, like a real call.
fn synthetic_turns(count: usize) -> Vec<Turn> {
    (0..count)
        .map(|i| Turn {
            sort_key: format!("{:014}", 20251218093214u64 + i as u64),
            role: if i % 3 == 1 { Role::Customer } else { Role::Agent },
            path: PathBuf::from(format!("/calls/c/{:06}.mp3", i)),
            duration: 0.5 + (i % 7) as f64 * 0.731,
        })
        .collect()
}

fn file_names(count: usize) -> Vec<String> {
    (0..count)
        .rev()
        .map(|i| {
            let role = if i % 2 == 0 { "agent" } else { "Customer" };
            format!("{:06}_{}.MP3", i, role)
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitch_plan");

    for count in [10usize, 100, 1000] {
        let turns = synthetic_turns(count);
        let names = file_names(count);

        group.bench_with_input(BenchmarkId::new("assemble", count), &names, |b, names| {
            b.iter(|| assemble(black_box(names)))
        });

        group.bench_with_input(BenchmarkId::new("build_compile", count), &turns, |b, turns| {
            b.iter(|| {
                let timelines = Timelines::build(black_box(turns)).unwrap();
                compile(&timelines, 48000).unwrap()
            })
        });

        let graph = compile(&Timelines::build(&turns).unwrap(), 48000).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", count), &graph, |b, graph| {
            b.iter(|| encode_filter_complex(black_box(graph)))
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
