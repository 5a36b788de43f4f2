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

#![deny(missing_docs)]

//! # Lazy Proxy API Documentation
//!
//! Lazy Proxy is a library of forwarding objects that defer the construction
//! of their underlying service until the first access to any service member.
//!
//! A typical use case is a dependency injection container that hands out
//! a service before the service is actually needed. The container wraps
//! the service factory into a [Deferred] value, and passes it to
//! the [create_proxy] function. The function returns a boxed trait object
//! of the service contract. The object implements every contract member by
//! forwarding the call to the service instance, which is created by
//! the factory on the first call.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use lazy_proxy::{create_proxy, lazy_proxy, Deferred};
//!
//! static CREATED: AtomicUsize = AtomicUsize::new(0);
//!
//! #[lazy_proxy]
//! pub trait Storage: Send + Sync {
//!     fn read(&self, key: &str) -> Option<String>;
//! }
//!
//! struct Database;
//!
//! impl Storage for Database {
//!     fn read(&self, key: &str) -> Option<String> {
//!         Some(format!("value of {key}"))
//!     }
//! }
//!
//! let storage = create_proxy::<dyn Storage, Database>(Deferred::new(|| {
//!     let _ = CREATED.fetch_add(1, Ordering::SeqCst);
//!
//!     Database
//! }))
//! .unwrap();
//!
//! assert_eq!(CREATED.load(Ordering::SeqCst), 0);
//!
//! assert_eq!(storage.read("foo").as_deref(), Some("value of foo"));
//! assert_eq!(storage.read("bar").as_deref(), Some("value of bar"));
//!
//! assert_eq!(CREATED.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## Service Contracts
//!
//! A service contract is an object-safe trait annotated with
//! the [lazy_proxy](macro@lazy_proxy) attribute macro. The macro generates
//! a forwarding type for the trait, and implements the [Contract] and
//! [ProxyOf] traits for the trait object type. Contract methods may take
//! `&self` or `&mut self` receivers. Getter and setter pairs can be grouped
//! into properties using the `#[property]` helper attribute.
//!
//! ## Type Caching
//!
//! The [ProxyRegistry] caches the contract descriptions (open templates) and
//! the contract-implementation bindings (closed entries). Each template and
//! each entry is created once per registry, even if several threads request
//! it concurrently. The forwarding objects themselves are never cached: each
//! [create_proxy] call returns a new object with its own deferred value.
//!
//! ## Logging
//!
//! The crate reports cache misses and factory evaluations through
//! the [tracing](https://docs.rs/tracing) facade under the `lazy_proxy`
//! target. Cache creations are reported at the `debug` level, factory
//! evaluations at the `trace` level, and failures at the `warn` level.

extern crate self as lazy_proxy;

/// Service contract descriptions.
///
/// The [Contract](contract::Contract) trait exposes a static
/// [ServiceDescriptor](contract::ServiceDescriptor) of the service trait, and
/// the [ProxyOf](contract::ProxyOf) trait binds the service trait to
/// the forwarding type of a particular implementation.
///
/// Normally, these traits are implemented by
/// the [lazy_proxy](macro@crate::lazy_proxy) macro.
pub mod contract;

/// Deferred values.
///
/// The [Deferred](deferred::Deferred) object is a thread-safe cell that
/// evaluates its factory function at most once, on the first access.
pub mod deferred;

/// Error types of this crate.
pub mod error;

/// The two-level cache of the forwarding types.
pub mod registry;
mod report;

/// Synchronization primitives.
///
/// The [Table](sync::Table) is a sharded concurrent hash map, and
/// the [OnceSlot](sync::OnceSlot) is a write-once cell with fallible
/// initialization. The registry builds its caches from these two objects.
pub mod sync;

/// Runtime representations of the cached forwarding types.
pub mod template;

pub use lazy_proxy_derive::lazy_proxy;

pub use crate::{
    contract::{Accessor, Contract, Member, Method, Property, ProxyOf, Receiver, ServiceDescriptor},
    deferred::{Deferred, DeferredState},
    error::{EvaluationError, ProxyError, ProxyResult},
    registry::{create_proxy, proxy_type, ProxyRegistry},
    template::{ClosedEntry, OpenTemplate, ProxyType},
};
