use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fsstate::{BuildRoot, BuildTarget, FsState, PermissiveCatalog, Timestamps};
use std::hint::black_box;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn populated_state(targets: usize, files_per_target: usize) -> FsState {
    let state = FsState::new();
    for t in 0..targets {
        let target = BuildTarget::new("java-production", format!("module{t}"));
        let root = BuildRoot::new(target.clone(), "src");
        state.mark_initial_scan_performed(&target);
        for f in 0..files_per_target {
            let file = PathBuf::from(format!("/project/module{t}/src/File{f}.java"));
            state.mark_dirty(&file, &root, None, false);
            if f % 10 == 0 {
                state.register_deleted(&target, &file.with_extension("kt"), None);
            }
        }
    }
    state
}

fn benchmark_mark_dirty(c: &mut Criterion) {
    let target = BuildTarget::new("java-production", "core");
    let root = BuildRoot::new(target.clone(), "src");
    let files: Vec<_> = (0..1000)
        .map(|i| PathBuf::from(format!("/project/src/File{i}.java")))
        .collect();
    let timestamps = Timestamps::new();

    let mut group = c.benchmark_group("mark_dirty");

    group.bench_function("fresh_1000", |b| {
        b.iter(|| {
            let state = FsState::new();
            for file in &files {
                black_box(state.mark_dirty(file, &root, Some(&timestamps), true));
            }
        });
    });

    group.bench_function("already_dirty_1000", |b| {
        let state = FsState::new();
        for file in &files {
            state.mark_dirty(file, &root, None, false);
        }
        b.iter(|| {
            for file in &files {
                black_box(state.mark_dirty(file, &root, None, false));
            }
        });
    });

    for threads in [2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("parallel_targets", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let state = Arc::new(FsState::new());
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let state = Arc::clone(&state);
                            thread::spawn(move || {
                                let target = BuildTarget::new("java-production", format!("m{t}"));
                                let root = BuildRoot::new(target, "src");
                                for i in 0..250 {
                                    let file = PathBuf::from(format!("/p/m{t}/F{i}.java"));
                                    state.mark_dirty(&file, &root, None, false);
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");

    for targets in [10, 100] {
        let state = populated_state(targets, 100);
        let mut bytes = Vec::new();
        state.save(&mut bytes).unwrap();

        group.bench_with_input(BenchmarkId::new("save", targets), &state, |b, state| {
            b.iter(|| {
                let mut out = Vec::with_capacity(bytes.len());
                state.save(&mut out).unwrap();
                black_box(out)
            });
        });

        group.bench_with_input(BenchmarkId::new("load", targets), &bytes, |b, bytes| {
            b.iter(|| {
                let restored = FsState::new();
                restored
                    .load(&mut bytes.as_slice(), &PermissiveCatalog)
                    .unwrap();
                black_box(restored)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_mark_dirty, benchmark_persistence);
criterion_main!(benches);
