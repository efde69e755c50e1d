use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use panelview::listing::{build_listing, ListingOptions};
use panelview::types::FileObject;

fn make_entries(count: usize) -> Vec<FileObject> {
    (0..count)
        .map(|i| {
            let is_file = i % 7 != 0;
            let name = if is_file { format!("log-{}.txt", count - i) } else { format!("dir{}", i) };
            FileObject {
                key: format!("{}_{}", if is_file { "file" } else { "dir" }, name),
                name,
                is_file,
                is_symlink: false,
                size: (i as u64) * 512,
                mimetype: if is_file { "text/plain" } else { "inode/directory" }.to_string(),
                modified_at: None,
            }
        })
        .collect()
}

fn bench_build_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_listing");
    for count in [250usize, 5_000, 50_000] {
        let entries = make_entries(count);
        group.bench_with_input(BenchmarkId::new("no_filter", count), &entries, |b, entries| {
            b.iter(|| build_listing(black_box(entries), "", 1, ListingOptions::default()))
        });
        group.bench_with_input(BenchmarkId::new("filtered", count), &entries, |b, entries| {
            b.iter(|| build_listing(black_box(entries), "log-1", 2, ListingOptions::default()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_listing);
criterion_main!(benches);
