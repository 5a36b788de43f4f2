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
    panic::{catch_unwind, panic_any, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
        Arc,
        OnceLock,
    },
    thread,
    time::Duration,
};

use lazy_proxy::{create_proxy, Deferred, DeferredState, EvaluationError};
use lazy_proxy_tests::contracts::{English, Greeter};

#[test]
fn test_greeter_scenario() {
    let calls = Arc::new(AtomicUsize::new(0));

    let greeter = {
        let calls = calls.clone();

        create_proxy::<dyn Greeter, English>(Deferred::new(move || {
            let _ = calls.fetch_add(1, Ordering::SeqCst);

            English
        }))
        .unwrap()
    };

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    for _ in 0..3 {
        assert_eq!(greeter.greet(), "Hello");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

struct Unreachable;

impl Greeter for Unreachable {
    fn greet(&self) -> String {
        String::from("unreachable")
    }
}

#[test]
fn test_failure_is_replayed() {
    let calls = Arc::new(AtomicUsize::new(0));

    let greeter = {
        let calls = calls.clone();

        create_proxy::<dyn Greeter, Unreachable>(Deferred::new(move || {
            let code = calls.fetch_add(1, Ordering::SeqCst) + 42;

            panic!("Service {code} is down.");
        }))
        .unwrap()
    };

    let first = catch_unwind(AssertUnwindSafe(|| greeter.greet())).unwrap_err();
    let second = catch_unwind(AssertUnwindSafe(|| greeter.greet())).unwrap_err();

    assert_eq!(first.downcast_ref::<String>().unwrap(), "Service 42 is down.");
    assert_eq!(second.downcast_ref::<String>().unwrap(), "Service 42 is down.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_static_payload() {
    let deferred = Deferred::<u8>::new(|| panic!("static failure"));

    for _ in 0..2 {
        let payload = catch_unwind(AssertUnwindSafe(|| *deferred.get())).unwrap_err();

        assert_eq!(*payload.downcast_ref::<&'static str>().unwrap(), "static failure");
    }

    let error = deferred.try_get().unwrap_err();

    assert_eq!(error.message(), Some("static failure"));
    assert_eq!(deferred.state(), DeferredState::Failed);
}

#[derive(Debug)]
struct Outage(u16);

#[test]
fn test_opaque_payload() {
    let deferred = Deferred::<u8>::new(|| panic_any(Outage(503)));

    let first = catch_unwind(AssertUnwindSafe(|| *deferred.get())).unwrap_err();

    assert_eq!(first.downcast_ref::<Outage>().unwrap().0, 503);

    let second = catch_unwind(AssertUnwindSafe(|| *deferred.get())).unwrap_err();
    let error = second.downcast_ref::<EvaluationError>().unwrap();

    assert_eq!(error.message(), None);
    assert_eq!(error.target(), "u8");

    assert_eq!(deferred.into_inner().unwrap_err().target(), "u8");
}

#[test]
fn test_try_get_evaluates() {
    let deferred = Deferred::new(|| String::from("value"));

    assert_eq!(deferred.state(), DeferredState::Unevaluated);
    assert_eq!(deferred.try_get().map(String::as_str), Ok("value"));
    assert_eq!(deferred.state(), DeferredState::Evaluated);

    let debug = format!("{deferred:?}");

    assert!(debug.contains("Evaluated"));
}

struct Relay(String);

impl Greeter for Relay {
    fn greet(&self) -> String {
        self.0.clone()
    }
}

#[test]
fn test_recursive_access_fails() {
    let own = Arc::new(OnceLock::<Arc<dyn Greeter>>::new());

    let greeter: Arc<dyn Greeter> = {
        let own = own.clone();

        Arc::from(
            create_proxy::<dyn Greeter, Relay>(Deferred::new(move || {
                let greeter = own.get().unwrap();

                Relay(greeter.greet())
            }))
            .unwrap(),
        )
    };

    let _ = own.set(greeter.clone());

    let (sender, receiver) = mpsc::channel();

    let _ = thread::spawn(move || {
        let messages = (0..2)
            .map(|_| {
                catch_unwind(AssertUnwindSafe(|| greeter.greet()))
                    .err()
                    .and_then(|payload| payload.downcast_ref::<String>().cloned())
            })
            .collect::<Vec<_>>();

        let _ = sender.send(messages);
    });

    let messages = receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("Recursive access deadlocked.");

    assert_eq!(messages.len(), 2);

    for message in messages {
        let message = message.unwrap();

        assert!(message.contains("accessed recursively"), "{message}");
        assert!(message.contains("Relay"), "{message}");
    }
}
