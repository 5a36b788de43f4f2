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
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::{Arc, RwLock},
};

use lazy_proxy::{Deferred, ProxyError, ProxyOf, ProxyRegistry};
use thiserror::Error;

/// A result of the container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// An error of the service resolution.
#[derive(Error, Debug, Clone)]
pub enum ContainerError {
    /// The service has no registration under the requested name.
    #[error("Service \"{service}\" is not registered{}.", display_name(.name))]
    NotRegistered {
        /// A name of the service type.
        service: &'static str,

        /// A name of the registration, if any.
        name: Option<String>,
    },

    /// The registration produced an object of a different type.
    #[error("Service \"{service}\" registration produced an object of a different type.")]
    Mismatch {
        /// A name of the service type.
        service: &'static str,
    },

    /// The proxy registry rejected the lazy registration.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

fn display_name(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" under name \"{name}\""),
        None => String::new(),
    }
}

type Factory = Arc<dyn Fn(&Container) -> ContainerResult<Box<dyn Any>> + Send + Sync>;

type Key = (TypeId, Option<String>);

/// A toy dependency injection container.
///
/// The container maps a service contract (a trait object type), optionally
/// accompanied by a registration name, to a factory of the service objects.
/// Every registration is transient: each resolution calls the factory anew.
///
/// Eager registrations ([register_type](Container::register_type)) construct
/// the implementation immediately during the resolution. Lazy registrations
/// ([register_lazy](Container::register_lazy)) hand out a forwarding object,
/// and postpone the implementation construction (together with
/// the resolution of its own dependencies) until the first call of any
/// contract member.
///
/// The Container is a cheap to clone handle, the clones share registrations.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: Arc<ProxyRegistry>,
    registrations: RwLock<HashMap<Key, Registration>>,
}

#[derive(Clone)]
struct Registration {
    lazy: bool,
    factory: Factory,
}

impl Debug for Container {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let registrations = match self.inner.registrations.read() {
            Ok(guard) => guard.len(),
            Err(poison) => poison.get_ref().len(),
        };

        formatter
            .debug_struct("Container")
            .field("registrations", &registrations)
            .field("registry", &self.inner.registry)
            .finish()
    }
}

impl Default for Container {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container with its own proxy registry.
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ProxyRegistry::new()))
    }

    /// Creates an empty container that creates the forwarding objects
    /// through the specified `registry`.
    pub fn with_registry(registry: Arc<ProxyRegistry>) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry,
                registrations: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Returns the proxy registry of this container.
    #[inline(always)]
    pub fn registry(&self) -> &ProxyRegistry {
        &self.inner.registry
    }

    /// Registers an eager `factory` of the `S` service.
    ///
    /// Replaces the previous unnamed registration of `S`, if any.
    #[inline(always)]
    pub fn register_type<S>(
        &self,
        factory: impl Fn(&Container) -> ContainerResult<Box<S>> + Send + Sync + 'static,
    ) -> &Self
    where
        S: ?Sized + 'static,
    {
        self.insert::<S>(None, false, factory)
    }

    /// Registers an eager `factory` of the `S` service under the `name`.
    #[inline(always)]
    pub fn register_type_named<S>(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&Container) -> ContainerResult<Box<S>> + Send + Sync + 'static,
    ) -> &Self
    where
        S: ?Sized + 'static,
    {
        self.insert::<S>(Some(name.into()), false, factory)
    }

    /// Registers a lazy `factory` of the `I` implementation of
    /// the `S` service contract.
    ///
    /// The resolution of `S` returns a forwarding object. The `factory` is
    /// called when the forwarding object is accessed for the first time.
    /// If the factory fails, the forwarding object panics with
    /// the factory's error on every access.
    #[inline(always)]
    pub fn register_lazy<S, I>(
        &self,
        factory: impl Fn(&Container) -> ContainerResult<I> + Send + Sync + 'static,
    ) -> &Self
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        self.insert_lazy::<S, I>(None, factory)
    }

    /// Registers a lazy `factory` of the `I` implementation of
    /// the `S` service contract under the `name`.
    #[inline(always)]
    pub fn register_lazy_named<S, I>(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&Container) -> ContainerResult<I> + Send + Sync + 'static,
    ) -> &Self
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        self.insert_lazy::<S, I>(Some(name.into()), factory)
    }

    /// Returns true if the container has a registration of the `S` service
    /// under the `name`.
    pub fn is_registered<S: ?Sized + 'static>(&self, name: Option<&str>) -> bool {
        let key = (TypeId::of::<S>(), name.map(String::from));

        match self.inner.registrations.read() {
            Ok(guard) => guard.contains_key(&key),
            Err(poison) => poison.get_ref().contains_key(&key),
        }
    }

    /// Returns true if the unnamed registration of the `S` service is lazy.
    pub fn is_lazy<S: ?Sized + 'static>(&self) -> bool {
        self.registration::<S>(None)
            .map_or(false, |registration| registration.lazy)
    }

    /// Resolves the unnamed registration of the `S` service.
    #[inline(always)]
    pub fn resolve<S: ?Sized + 'static>(&self) -> ContainerResult<Box<S>> {
        self.resolve_inner::<S>(None)
    }

    /// Resolves the `S` service registered under the `name`.
    #[inline(always)]
    pub fn resolve_named<S: ?Sized + 'static>(&self, name: &str) -> ContainerResult<Box<S>> {
        self.resolve_inner::<S>(Some(name))
    }

    fn resolve_inner<S: ?Sized + 'static>(&self, name: Option<&str>) -> ContainerResult<Box<S>> {
        let Some(registration) = self.registration::<S>(name) else {
            return Err(ContainerError::NotRegistered {
                service: type_name::<S>(),
                name: name.map(String::from),
            });
        };

        tracing::trace!(
            target: "lazy_proxy_demos",
            service = type_name::<S>(),
            name,
            lazy = registration.lazy,
            "Resolving service.",
        );

        let service = (registration.factory)(self)?;

        match service.downcast::<Box<S>>() {
            Ok(service) => Ok(*service),
            Err(_) => Err(ContainerError::Mismatch {
                service: type_name::<S>(),
            }),
        }
    }

    fn registration<S: ?Sized + 'static>(&self, name: Option<&str>) -> Option<Registration> {
        let key = (TypeId::of::<S>(), name.map(String::from));

        match self.inner.registrations.read() {
            Ok(guard) => guard.get(&key).cloned(),
            Err(poison) => poison.get_ref().get(&key).cloned(),
        }
    }

    fn insert_lazy<S, I>(
        &self,
        name: Option<String>,
        factory: impl Fn(&Container) -> ContainerResult<I> + Send + Sync + 'static,
    ) -> &Self
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        let factory = Arc::new(factory);

        self.insert::<S>(name, true, move |container| {
            let factory = factory.clone();
            let owner = container.clone();

            let deferred = Deferred::new(move || match factory(&owner) {
                Ok(service) => service,

                Err(error) => {
                    tracing::warn!(
                        target: "lazy_proxy_demos",
                        %error,
                        "Lazy service construction failed.",
                    );

                    panic!("{error}");
                }
            });

            Ok(container.inner.registry.create_proxy::<S, I>(deferred)?)
        })
    }

    fn insert<S: ?Sized + 'static>(
        &self,
        name: Option<String>,
        lazy: bool,
        factory: impl Fn(&Container) -> ContainerResult<Box<S>> + Send + Sync + 'static,
    ) -> &Self {
        tracing::debug!(
            target: "lazy_proxy_demos",
            service = type_name::<S>(),
            name = name.as_deref(),
            lazy,
            "Service registered.",
        );

        let registration = Registration {
            lazy,
            factory: Arc::new(move |container: &Container| -> ContainerResult<Box<dyn Any>> {
                let service: Box<dyn Any> = Box::new(factory(container)?);

                Ok(service)
            }),
        };

        let key = (TypeId::of::<S>(), name);

        let mut guard = match self.inner.registrations.write() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        };

        let _ = guard.insert(key, registration);

        self
    }
}
