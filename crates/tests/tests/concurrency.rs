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

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Barrier,
    },
    thread,
    time::Duration,
};

use lazy_proxy::{Deferred, ProxyRegistry};
use lazy_proxy_tests::contracts::{Counted, English, French, Greeter};

#[test]
fn test_single_evaluation_race() {
    const THREADS: usize = 16;

    let registry = ProxyRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Barrier::new(THREADS);

    let greeter = {
        let calls = calls.clone();

        registry
            .create_shared_proxy::<dyn Greeter, English>(Deferred::new(move || {
                let _ = calls.fetch_add(1, Ordering::SeqCst);

                thread::sleep(Duration::from_millis(20));

                English
            }))
            .unwrap()
    };

    let results = thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let _ = barrier.wait();

                    greeter.greet()
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert!(results.iter().all(|result| result == "Hello"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_type_creation() {
    const THREADS: usize = 8;

    let registry = ProxyRegistry::new();
    let barrier = Barrier::new(THREADS);

    let types = thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|index| {
                let registry = &registry;
                let barrier = &barrier;

                scope.spawn(move || {
                    let _ = barrier.wait();

                    match index % 2 == 0 {
                        true => registry.proxy_type::<dyn Greeter, English>().unwrap(),
                        false => registry.proxy_type::<dyn Greeter, French>().unwrap(),
                    }
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    for (index, ty) in types.iter().enumerate() {
        assert_eq!(ty, &types[index % 2]);
    }

    assert_ne!(types[0], types[1]);
    assert_eq!(registry.templates_count(), 1);
    assert_eq!(registry.entries_count(), 2);
}

#[test]
fn test_independent_proxies() {
    const PROXIES: usize = 4;

    let registry = ProxyRegistry::new();
    let before = Counted::instances();

    let proxies = (0..PROXIES)
        .map(|_| {
            registry
                .create_proxy::<dyn Greeter, Counted>(Deferred::new(Counted::new))
                .unwrap()
        })
        .collect::<Vec<_>>();

    assert_eq!(Counted::instances(), before);

    thread::scope(|scope| {
        for proxy in &proxies {
            let _ = scope.spawn(move || proxy.greet());
        }
    });

    assert_eq!(Counted::instances(), before + PROXIES);
    assert_eq!(registry.entries_count(), 1);
}
