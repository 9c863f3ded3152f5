use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use fridge::{EncodeOptions, Fridge, Value};
use std::io::{Cursor, Seek};
use tempfile::tempdir;

const N: usize = 1_000;
const VAL_SIZE: usize = 100;

fn document(n: usize) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut fridge = Fridge::from_stream(&mut buf).unwrap();
        for i in 0..n {
            fridge.insert(format!("k{}", i), "x".repeat(VAL_SIZE));
        }
    }
    buf.into_inner()
}

fn fridge_load(c: &mut Criterion) {
    let doc = document(N);
    c.bench_function("fridge_load_1k", |b| {
        b.iter_batched(
            || Cursor::new(doc.clone()),
            |mut buf| {
                let fridge = Fridge::options()
                    .stream(&mut buf)
                    .open_read_only()
                    .unwrap();
                assert_eq!(fridge.len(), N);
            },
            BatchSize::SmallInput,
        );
    });
}

fn fridge_save_in_memory(c: &mut Criterion) {
    let doc = document(N);
    c.bench_function("fridge_save_in_memory_1k", |b| {
        let mut buf = Cursor::new(doc.clone());
        let mut fridge = Fridge::from_stream(&mut buf).unwrap();
        b.iter(|| {
            fridge.insert("counter", criterion::black_box(1));
            fridge.save().unwrap();
        });
    });
}

fn fridge_save_pretty(c: &mut Criterion) {
    let doc = document(N);
    c.bench_function("fridge_save_pretty_1k", |b| {
        let mut buf = Cursor::new(doc.clone());
        let mut fridge = Fridge::options()
            .stream(&mut buf)
            .encode(EncodeOptions::pretty(2))
            .open()
            .unwrap();
        b.iter(|| fridge.save().unwrap());
    });
}

fn fridge_file_cycle(c: &mut Criterion) {
    c.bench_function("fridge_file_open_mutate_close", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("fridge.json");
                std::fs::write(&path, document(N)).unwrap();
                (dir, path)
            },
            |(_dir, path)| {
                let mut fridge = Fridge::open(&path).unwrap();
                fridge.insert("n", Value::from(1));
                fridge.remove("k0");
                fridge.close().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

fn fridge_reload(c: &mut Criterion) {
    let doc = document(N);
    c.bench_function("fridge_rewind_and_reload_1k", |b| {
        let mut buf = Cursor::new(doc.clone());
        let mut fridge = Fridge::from_stream(&mut buf).unwrap();
        b.iter(|| {
            fridge.stream_mut().unwrap().rewind().unwrap();
            fridge.load().unwrap();
        });
    });
}

criterion_group!(
    benches,
    fridge_load,
    fridge_save_in_memory,
    fridge_save_pretty,
    fridge_file_cycle,
    fridge_reload,
);

criterion_main!(benches);
