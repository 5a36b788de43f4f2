////////////////////////////////////////////////////////////////////////////////
// This file is part of "Lady Deirdre", a compiler front-end foundation       //
// technology.                                                                //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/lady-deirdre/blob/master/EULA.md           //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lazy_proxy::{Deferred, ProxyRegistry};
use lazy_proxy_tests::{
    contracts::{Accumulator, Calculator, English, Greeter},
    gen::{CallGen, CallGenConfig},
};
use rand::{rngs::StdRng, SeedableRng};

const CALLS: usize = 1_000;

pub fn bench_forwarding(criterion: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1000);

    let calls = CallGen::new(CallGenConfig::default()).gen_many(&mut rng, CALLS);

    let registry = ProxyRegistry::new();

    let mut group = criterion.benchmark_group("Member Calls");

    group.bench_function(BenchmarkId::new("Direct", CALLS), |bencher| {
        bencher.iter_custom(|iters| {
            let mut time = Duration::ZERO;

            for _ in 0..iters {
                let mut target = Accumulator::default();

                let start = Instant::now();

                for call in &calls {
                    let _ = black_box(call.apply(&mut target));
                }

                time += start.elapsed();
            }

            time
        });
    });

    group.bench_function(BenchmarkId::new("Forwarded", CALLS), |bencher| {
        bencher.iter_custom(|iters| {
            let mut time = Duration::ZERO;

            for _ in 0..iters {
                let mut target = match registry
                    .create_proxy::<dyn Calculator, Accumulator>(Deferred::new(Accumulator::default))
                {
                    Ok(target) => target,
                    Err(error) => panic!("{error}"),
                };

                let start = Instant::now();

                for call in &calls {
                    let _ = black_box(call.apply(target.as_mut()));
                }

                time += start.elapsed();
            }

            time
        });
    });

    group.finish();
}

pub fn bench_creation(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("Proxy Creation");

    group.bench_function("Cold Registry", |bencher| {
        bencher.iter_custom(|iters| {
            let mut time = Duration::ZERO;

            for _ in 0..iters {
                let registry = ProxyRegistry::new();

                let start = Instant::now();
                let proxy = registry.create_proxy::<dyn Greeter, English>(Deferred::ready(English));
                time += start.elapsed();

                let _ = black_box(proxy);
            }

            time
        });
    });

    let registry = ProxyRegistry::new();

    let _ = black_box(registry.ensure_closed_entry::<dyn Greeter, English>());

    group.bench_function("Warm Registry", |bencher| {
        bencher.iter(|| {
            black_box(registry.create_proxy::<dyn Greeter, English>(Deferred::new(|| English)))
        });
    });

    group.bench_function("Warm Registry, First Call", |bencher| {
        bencher.iter(|| match registry.create_proxy::<dyn Greeter, English>(Deferred::new(|| English)) {
            Ok(greeter) => black_box(greeter.greet()),
            Err(error) => panic!("{error}"),
        });
    });

    group.finish();
}

criterion_group!(benches, bench_forwarding, bench_creation);
criterion_main!(benches);
