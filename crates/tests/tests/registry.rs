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

use std::{any::TypeId, sync::Arc};

use lazy_proxy::{
    proxy_type,
    Contract,
    Deferred,
    Member,
    Method,
    ProxyOf,
    ProxyRegistry,
    Receiver,
    ServiceDescriptor,
};
use lazy_proxy_tests::contracts::{Calculator, English, French, Greeter, GreeterLazyProxy};

#[test]
fn test_entry_identity() {
    let registry = ProxyRegistry::new();

    let first = registry.ensure_closed_entry::<dyn Greeter, English>().unwrap();
    let second = registry.ensure_closed_entry::<dyn Greeter, English>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.proxy_type(), second.proxy_type());
    assert!(first.proxy_type().is::<GreeterLazyProxy<English>>());

    assert_eq!(first.service(), TypeId::of::<dyn Greeter>());
    assert_eq!(first.implementation(), TypeId::of::<English>());
    assert!(first.implementation_name().ends_with("English"));

    let template = registry.ensure_open_template::<dyn Greeter>().unwrap();

    assert!(Arc::ptr_eq(first.template(), &template));
}

#[test]
fn test_distinct_implementations() {
    let registry = ProxyRegistry::new();

    let english = registry.proxy_type::<dyn Greeter, English>().unwrap();
    let french = registry.proxy_type::<dyn Greeter, French>().unwrap();

    assert_ne!(english, french);
    assert_eq!(registry.templates_count(), 1);
    assert_eq!(registry.entries_count(), 2);

    let greeter = registry
        .create_proxy::<dyn Greeter, French>(Deferred::ready(French))
        .unwrap();

    assert_eq!(greeter.greet(), "Bonjour");
    assert_eq!(registry.entries_count(), 2);
}

#[test]
fn test_global_registry() {
    let first = proxy_type::<dyn Greeter, English>().unwrap();
    let second = proxy_type::<dyn Greeter, English>().unwrap();

    assert_eq!(first, second);
    assert!(ProxyRegistry::global().contains_entry::<dyn Greeter, English>());
    assert!(ProxyRegistry::global().contains_template::<dyn Greeter>());
}

#[test]
fn test_registries_are_independent() {
    let left = ProxyRegistry::with_shards(1);
    let right = ProxyRegistry::with_shards(8);

    let _ = left.ensure_closed_entry::<dyn Greeter, English>().unwrap();

    assert!(left.contains_entry::<dyn Greeter, English>());
    assert!(!right.contains_entry::<dyn Greeter, English>());
    assert!(!right.contains_template::<dyn Greeter>());

    assert_eq!(
        left.proxy_type::<dyn Greeter, English>().unwrap(),
        right.proxy_type::<dyn Greeter, English>().unwrap(),
    );
}

#[test]
fn test_erased_construction() {
    let registry = ProxyRegistry::new();

    let service = TypeId::of::<dyn Greeter>();
    let implementation = TypeId::of::<English>();

    let error = registry
        .create_proxy_erased(service, implementation, Box::new(Deferred::ready(English)))
        .unwrap_err();

    assert!(error.is_type_closure());

    let _ = registry.ensure_closed_entry::<dyn Greeter, English>().unwrap();

    let error = registry
        .create_proxy_erased(service, implementation, Box::new(Deferred::ready(French)))
        .unwrap_err();

    assert!(error.is_type_closure());
    assert!(error.to_string().contains("Greeter"));

    let greeter = registry
        .create_proxy_erased(service, implementation, Box::new(Deferred::ready(English)))
        .unwrap();

    let greeter = greeter.downcast::<Box<dyn Greeter>>().unwrap();

    assert_eq!(greeter.greet(), "Hello");
}

#[test]
fn test_typed_entry_mismatch() {
    let registry = ProxyRegistry::new();

    let entry = registry.ensure_closed_entry::<dyn Greeter, English>().unwrap();

    let error = entry
        .construct::<dyn Calculator, English>(Deferred::ready(English))
        .map(|_| ())
        .unwrap_err();

    assert!(error.is_type_closure());
}

trait Malformed: Send + Sync {
    fn run(&self);
}

struct MalformedProxy<T>(Deferred<T>);

impl<T: Malformed> Malformed for MalformedProxy<T> {
    fn run(&self) {
        self.0.get().run()
    }
}

static MALFORMED: ServiceDescriptor = ServiceDescriptor {
    name: "Malformed",
    module: module_path!(),
    template: "MalformedProxy",
    members: &[
        Member::Method(Method {
            name: "run",
            receiver: Receiver::Shared,
            inputs: &[],
            output: "()",
        }),
        Member::Method(Method {
            name: "run",
            receiver: Receiver::Shared,
            inputs: &[],
            output: "()",
        }),
    ],
};

impl Contract for dyn Malformed {
    fn descriptor() -> &'static ServiceDescriptor {
        &MALFORMED
    }
}

impl<T: Malformed + 'static> ProxyOf<T> for dyn Malformed {
    type Proxy = MalformedProxy<T>;

    fn construct(deferred: Deferred<T>) -> Self::Proxy {
        MalformedProxy(deferred)
    }

    fn upcast(proxy: Self::Proxy) -> Box<Self> {
        Box::new(proxy)
    }
}

struct Job;

impl Malformed for Job {
    fn run(&self) {}
}

#[test]
fn test_invalid_contract() {
    let registry = ProxyRegistry::new();

    for _ in 0..2 {
        let error = registry
            .create_proxy::<dyn Malformed, Job>(Deferred::ready(Job))
            .map(|_| ())
            .unwrap_err();

        assert!(error.is_invalid_service());
        assert!(error.to_string().contains("Duplicate member \"run\""));
    }

    assert!(!registry.contains_template::<dyn Malformed>());
    assert!(!registry.contains_entry::<dyn Malformed, Job>());
    assert_eq!(registry.templates_count(), 0);
    assert_eq!(registry.entries_count(), 0);
}
