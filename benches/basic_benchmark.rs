use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use zfx_thaw::bootstrap::ProcessedCache;
use zfx_thaw::choices::Status;
use zfx_thaw::id::{Id, VertexId};
use zfx_thaw::queue::{Job, JobContext, JobKind, Jobs};
use zfx_thaw::storage::VertexStore;
use zfx_thaw::vertex::{Manager, StatelessVertex, Vertex, VertexHeap};
use zfx_thaw::vm::{Ledger, UnsignedTx};

pub fn run_traversal_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal_benchmark");
    let iterations = vec![100, 1000, 10000];

    vertex_heap_benchmark(&mut group, iterations.clone());
    processed_cache_benchmark(&mut group, iterations.clone());

    group.finish();
}

pub fn run_store_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_benchmark");
    let iterations = vec![100, 1000];

    get_ancestors_benchmark(&mut group, iterations.clone());
    execute_jobs_benchmark(&mut group, iterations.clone());

    group.finish();
}

fn vertex_heap_benchmark(group: &mut BenchmarkGroup<WallTime>, iterations: Vec<u64>) {
    for i in iterations.iter() {
        let vertices = (0..*i).map(|n| Vertex::unknown(Id::new(&n.to_be_bytes()))).collect::<Vec<_>>();

        group.throughput(Throughput::Elements(*i));
        group.bench_with_input(BenchmarkId::new("vertex_heap", i), i, |b, _| {
            b.iter(|| {
                let mut heap = VertexHeap::new();
                for vtx in vertices.iter() {
                    let _ = heap.push(vtx.clone());
                }
                while let Some(vtx) = heap.pop() {
                    black_box(vtx);
                }
            })
        });
    }
}

fn processed_cache_benchmark(group: &mut BenchmarkGroup<WallTime>, iterations: Vec<u64>) {
    for i in iterations.iter() {
        let ids = (0..*i).map(|n| Id::new(&n.to_be_bytes())).collect::<Vec<VertexId>>();

        group.throughput(Throughput::Elements(*i));
        group.bench_with_input(BenchmarkId::new("processed_cache", i), i, |b, _| {
            b.iter(|| {
                let mut cache = ProcessedCache::new(NonZeroUsize::new(1000).unwrap(), 20, 5);
                for (height, id) in ids.iter().enumerate() {
                    let _ = cache.admit(*id, height as u64);
                    black_box(cache.contains(id));
                }
            })
        });
    }
}

/// Stores a chain of `n` vertices in `store`, the first one accepted, returning the encoded
/// vertices from the bottom up.
fn build_chain(store: &VertexStore, n: u64) -> Vec<Vec<u8>> {
    let mut chain = vec![];
    let mut parents = vec![];
    for height in 0..n {
        let tx = UnsignedTx::new(vec![], height.to_be_bytes().to_vec()).encode().unwrap();
        let bytes =
            StatelessVertex::new(store.chain_id(), height, parents, vec![tx]).encode().unwrap();
        let status = if height == 0 { Status::Accepted } else { Status::Processing };
        let vtx = store.insert_vtx(&bytes, status).unwrap();
        parents = vec![vtx.id()];
        chain.push(bytes);
    }
    chain
}

fn get_ancestors_benchmark(group: &mut BenchmarkGroup<WallTime>, iterations: Vec<u64>) {
    for i in iterations.iter() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let store = VertexStore::new(&db, Id::zero()).unwrap();
        let chain = build_chain(&store, *i);
        let top = Id::new(chain.last().unwrap());

        group.throughput(Throughput::Elements(*i));
        group.bench_with_input(BenchmarkId::new("get_ancestors", i), i, |b, i| {
            b.iter(|| store.get_ancestors(&top, *i as usize, usize::MAX).unwrap())
        });
    }
}

fn execute_jobs_benchmark(group: &mut BenchmarkGroup<WallTime>, iterations: Vec<u64>) {
    for i in iterations.iter() {
        group.throughput(Throughput::Elements(*i));
        group.bench_with_input(BenchmarkId::new("execute_jobs", i), i, |b, i| {
            b.iter(|| {
                let db = sled::Config::new().temporary(true).open().unwrap();
                let store = Arc::new(VertexStore::new(&db, Id::zero()).unwrap());
                let ledger = Arc::new(Ledger::new(&db).unwrap());
                let chain = build_chain(&store, *i);
                for bytes in chain.iter().skip(1) {
                    let vtx = store.parse_vtx(bytes).unwrap();
                    for tx in vtx.txs() {
                        let _ = ledger.insert_tx(tx, Status::Accepted).unwrap();
                    }
                }

                let cx = JobContext::new(store.clone(), ledger.clone());
                let mut jobs = Jobs::new(&db, JobKind::Vertex, cx.clone()).unwrap();
                // pushed top down, executed bottom up
                for bytes in chain.iter().skip(1).rev() {
                    let job = Job::parse(JobKind::Vertex, bytes, &cx).unwrap();
                    let _ = jobs.push(job).unwrap();
                }
                jobs.commit().unwrap();
                jobs.execute_all(&CancellationToken::new(), false, &[]).unwrap()
            })
        });
    }
}

criterion_group!(benches, run_traversal_benchmark, run_store_benchmark);
criterion_main!(benches);
