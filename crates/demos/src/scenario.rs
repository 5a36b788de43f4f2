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

use std::sync::atomic::{AtomicUsize, Ordering};

use lazy_proxy::lazy_proxy;

use crate::container::{Container, ContainerResult};

static BARS_CREATED: AtomicUsize = AtomicUsize::new(0);

/// A service that depends on [Bar].
#[lazy_proxy]
pub trait Foo: Send + Sync {
    /// Exercises the [Bar] dependency and returns the report lines.
    fn test(&self) -> Vec<String>;
}

/// A service that depends on [Foo].
#[lazy_proxy]
pub trait Bar: Send + Sync {
    /// Returns a greeting.
    fn baz(&self) -> String;

    /// Returns the answer.
    #[property]
    fn x(&self) -> i32;

    /// Checks the answer.
    #[property(set)]
    fn set_x(&self, value: i32);
}

/// The [Foo] implementation.
pub struct FooService {
    bar: Box<dyn Bar>,
}

impl FooService {
    /// Creates the service from its dependency.
    #[inline(always)]
    pub fn new(bar: Box<dyn Bar>) -> Self {
        Self { bar }
    }
}

impl Foo for FooService {
    fn test(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);

        lines.push(format!("Baz(): {}", self.bar.baz()));
        lines.push(format!("X: {}", self.bar.x()));
        lines.push(String::from("Setting X to 123"));

        self.bar.set_x(123);

        lines
    }
}

/// The [Bar] implementation.
pub struct BarService {
    _foo: Box<dyn Foo>,
}

impl BarService {
    /// Creates the service from its dependency.
    pub fn new(foo: Box<dyn Foo>) -> Self {
        let _ = BARS_CREATED.fetch_add(1, Ordering::SeqCst);

        tracing::info!(target: "lazy_proxy_demos", "Bar service created.");

        Self { _foo: foo }
    }
}

impl Bar for BarService {
    fn baz(&self) -> String {
        String::from("Hello world")
    }

    fn x(&self) -> i32 {
        42
    }

    fn set_x(&self, value: i32) {
        match value == 42 {
            true => tracing::info!(target: "lazy_proxy_demos", "OK!"),
            false => tracing::info!(target: "lazy_proxy_demos", "No, the answer is 42"),
        }
    }
}

/// Returns the number of [BarService] instances created in this process.
#[inline(always)]
pub fn bars_created() -> usize {
    BARS_CREATED.load(Ordering::SeqCst)
}

/// Creates a container with the [Foo] service registered eagerly and
/// the [Bar] service registered lazily.
///
/// Eager registration of both services would recurse infinitely, because
/// each service requires the other one upon construction.
pub fn container() -> Container {
    let container = Container::new();

    container
        .register_type::<dyn Foo>(|container| {
            Ok(Box::new(FooService::new(container.resolve::<dyn Bar>()?)))
        })
        .register_lazy::<dyn Bar, BarService>(|container| {
            Ok(BarService::new(container.resolve::<dyn Foo>()?))
        });

    container
}

/// Resolves the [Foo] service from the scenario [container] and runs its
/// test.
pub fn run() -> ContainerResult<Vec<String>> {
    let foo = container().resolve::<dyn Foo>()?;

    Ok(foo.test())
}
