// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use git_history_log::augment::parse_numstat_output;
use git_history_log::parser::parse_log;

/// Synthetic `git log` output alternating stat-only and multi-line bodies
fn synthetic_log(commits: usize, with_files: bool) -> String {
    let mut out = String::new();
    for i in 0..commits {
        let hash = format!("{i:040x}");
        let parent = format!("{:040x}", i + 1);
        out.push_str(&format!(
            "{hash}|{}|Ann Example|ann@example.com|2026-01-17T02:33:06+01:00|Ann Example|2026-01-17T02:33:06+01:00|Change number {i}|",
            &hash[..7]
        ));
        if i % 2 == 0 {
            out.push_str("First body line\nSecond line | with a pipe\n\nClosing paragraph\n");
        }
        out.push_str(&format!("|{parent}|\n\n"));
        if with_files {
            out.push_str("M\tsrc/lib.rs\nA\tsrc/new module.rs\nR087\tsrc/old.rs\tsrc/renamed.rs\n\n");
        } else {
            out.push_str(" src/lib.rs | 12 ++++++++----\n src/new.rs | 40 ++++++++++++++++++++++++++++++++++++++++\n");
            out.push_str(" 2 files changed, 48 insertions(+), 4 deletions(-)\n\n");
        }
    }
    out
}

fn parser_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_log");
    for size in [100usize, 1_000] {
        for with_files in [false, true] {
            let input = synthetic_log(size, with_files);
            let label = if with_files { "name_status" } else { "stat" };
            group.throughput(Throughput::Bytes(input.len() as u64));
            group.bench_with_input(BenchmarkId::new(label, size), &input, |b, input| {
                b.iter(|| parse_log(std::hint::black_box(input), with_files))
            });
        }
    }
    group.finish();
}

fn numstat_benchmark(c: &mut Criterion) {
    let input: String = (0..500)
        .map(|i| format!("{i}\t{}\tsrc/{{old => new}}/file_{i}.rs\n", i % 7))
        .collect();
    c.bench_function("parse_numstat_output", |b| {
        b.iter(|| parse_numstat_output(std::hint::black_box(&input)))
    });
}

criterion_group!(benches, parser_benchmark, numstat_benchmark);
criterion_main!(benches);
