// This file is part of kvreactor.
// Copyright (C) 2026 kvreactor contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kvreactor::hash::{str_hash, HashMap2, HashNode};

fn insert_n(n: usize) -> HashMap2<(String, usize)> {
    let mut m = HashMap2::new();
    for i in 0..n {
        let key = format!("key-{i}");
        let hcode = str_hash(key.as_bytes());
        m.insert(Box::new(HashNode::new(hcode, (key, i))));
    }
    m
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashmap2_insert");
    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(insert_n(size)));
        });
    }
    group.finish();
}

fn bench_lookup_during_rehash(c: &mut Criterion) {
    // 10,000 keys guarantees the map has resized at least once and may still
    // be migrating, exercising the progressive-rehash path on every lookup.
    let mut map = insert_n(10_000);
    c.bench_function("hashmap2_lookup_during_rehash", |b| {
        b.iter(|| {
            let hcode = str_hash(b"key-9999");
            black_box(map.lookup(hcode, |(k, _)| k == "key-9999"));
        })
    });
}

criterion_group!(benches, bench_insert, bench_lookup_during_rehash);
criterion_main!(benches);
