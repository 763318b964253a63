use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use ami_helper::adapter::CatalogQueryAdapter;
use ami_helper::address::TagAddress;
use ami_helper::cache::QueryCache;
use ami_helper::catalog::{Catalog, Row, Rows};
use ami_helper::query;
use ami_helper::scope::ScopeTable;
use ami_helper::search::CompletionSearch;
use ami_helper::Result;

// ------------- Synthetic catalog -------------
// Answers every slot query with `branching` hashtags of the requested dimension.
struct Synthetic {
    branching: usize,
}

impl Catalog for Synthetic {
    fn execute(&self, command: &str) -> Result<Rows> {
        let marker = "`HASHTAGS`.`SCOPE`='";
        let dimension = command
            .find(marker)
            .map(|at| &command[at + marker.len()..at + marker.len() + 5])
            .unwrap_or("PMGL1");
        Ok((0..self.branching)
            .map(|n| {
                let mut row = Row::new();
                row.insert("HASHTAGS.SCOPE".to_string(), dimension.to_string());
                row.insert("HASHTAGS.NAME".to_string(), format!("{dimension}_{n}"));
                row
            })
            .collect())
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let scopes = ScopeTable::builtin();
    let seed = TagAddress::new("mc16_13TeV", [Some("Top".into()), None, None, None]);

    c.bench_function("render slot query", |b| {
        b.iter(|| query::slot_candidates(black_box("mc15_001:production"), black_box(&seed), 1))
    });

    for branching in [2, 8] {
        c.bench_function(&format!("complete cold b={branching}"), |b| {
            b.iter(|| {
                let cache = QueryCache::in_memory().unwrap();
                let adapter = CatalogQueryAdapter::new(Synthetic { branching }, &cache, &scopes);
                CompletionSearch::new(&adapter).complete_address(black_box(&seed)).unwrap()
            })
        });

        let cache = QueryCache::in_memory().unwrap();
        let adapter = CatalogQueryAdapter::new(Synthetic { branching }, &cache, &scopes);
        let search = CompletionSearch::new(&adapter);
        let results = search.complete_address(&seed).unwrap();
        println!("b={branching}: {} completions, {:?}", results.len(), cache.stats());
        c.bench_function(&format!("complete warm b={branching}"), |b| {
            b.iter(|| search.complete_address(black_box(&seed)).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
