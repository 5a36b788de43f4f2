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
    any::{Any, TypeId},
    fmt::{Debug, Formatter},
    hash::{BuildHasher, RandomState},
    sync::Arc,
};

use crate::{
    contract::{Contract, ProxyOf},
    deferred::Deferred,
    error::{ProxyError, ProxyResult},
    sync::{Lazy, OnceSlot, Table},
    template::{ClosedEntry, OpenTemplate, ProxyType},
};

static GLOBAL: Lazy<ProxyRegistry> = Lazy::new(ProxyRegistry::new);

type TemplateSlot = Arc<OnceSlot<Arc<OpenTemplate>>>;
type EntrySlot = Arc<OnceSlot<Arc<ClosedEntry>>>;

/// A two-level cache of the forwarding types.
///
/// The first level maps the service contract to its [OpenTemplate].
/// The template is created on the first request for the contract, when
/// the registry validates the contract descriptor.
///
/// The second level maps the (contract, implementation) pair to
/// a [ClosedEntry]: the template bound to the implementation type together
/// with its construction function.
///
/// Both levels are insert-only. Each key owns a [OnceSlot] that is inserted
/// into a sharded [Table] under a short shard lock, and then initialized
/// outside of the shard lock. Therefore, concurrent requests for the same key
/// create exactly one cache entry, while requests for distinct keys do not
/// wait for each other's initialization. Lookups of the existing entries only
/// take a shard read lock.
///
/// ```
/// use lazy_proxy::{lazy_proxy, Deferred, ProxyRegistry};
///
/// #[lazy_proxy]
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         String::from("Hello")
///     }
/// }
///
/// let registry = ProxyRegistry::new();
///
/// let greeter = registry
///     .create_proxy::<dyn Greeter, English>(Deferred::new(|| English))
///     .unwrap();
///
/// assert_eq!(greeter.greet(), "Hello");
/// ```
///
/// Most applications need only one registry per process. The process-wide
/// instance is available through the [global](ProxyRegistry::global) function
/// and the crate's top-level [create_proxy](crate::create_proxy) and
/// [proxy_type](crate::proxy_type) functions.
pub struct ProxyRegistry<H = RandomState> {
    templates: Table<TypeId, TemplateSlot, H>,
    entries: Table<(TypeId, TypeId), EntrySlot, H>,
}

impl<H> Debug for ProxyRegistry<H> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ProxyRegistry")
            .field("templates", &self.templates)
            .field("entries", &self.entries)
            .finish()
    }
}

impl Default for ProxyRegistry {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyRegistry {
    /// Creates an empty registry with the default hasher and the shards
    /// amount estimated from the available parallelism.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            templates: Table::new(),
            entries: Table::new(),
        }
    }

    /// Creates an empty registry with the specified amount of shards in
    /// each cache level.
    ///
    /// **Panic**
    ///
    /// Panics, if the `shards` value is zero or is not a power of two.
    #[inline(always)]
    pub fn with_shards(shards: usize) -> Self {
        Self::with_hasher_and_shards(RandomState::new(), shards)
    }

    /// Returns the process-wide registry.
    #[inline(always)]
    pub fn global() -> &'static Self {
        &GLOBAL
    }
}

impl<H: BuildHasher + Clone> ProxyRegistry<H> {
    /// Creates an empty registry with the specified key `hasher` and
    /// the amount of `shards` in each cache level.
    ///
    /// **Panic**
    ///
    /// Panics, if the `shards` value is zero or is not a power of two.
    pub fn with_hasher_and_shards(hasher: H, shards: usize) -> Self {
        Self {
            templates: Table::with_hasher_and_shards(hasher.clone(), shards),
            entries: Table::with_hasher_and_shards(hasher, shards),
        }
    }

    /// Returns the open template of the contract `S`, creating it if needed.
    ///
    /// Returns an [InvalidServiceType](ProxyError::InvalidServiceType) error
    /// if the contract descriptor is malformed. In this case the registry
    /// does not cache anything, and the next call validates
    /// the descriptor again.
    pub fn ensure_open_template<S: Contract + ?Sized>(&self) -> ProxyResult<Arc<OpenTemplate>> {
        let key = TypeId::of::<S>();

        if let Some(template) = self.templates.get(&key).and_then(|slot| slot.get().cloned()) {
            return Ok(template);
        }

        let slot = self
            .templates
            .get_or_insert_with(key, || Arc::new(OnceSlot::new()));

        let template = slot.get_or_try_init(|| {
            let template = match OpenTemplate::synthesize::<S>() {
                Ok(template) => template,

                Err(error) => {
                    tracing::warn!(target: "lazy_proxy", %error, "Service contract rejected.");

                    return Err(error);
                }
            };

            tracing::debug!(
                target: "lazy_proxy",
                service = %template.descriptor(),
                template = template.template_name(),
                forwarding = template.forwarding_count(),
                "Open proxy template created.",
            );

            Ok(Arc::new(template))
        })?;

        Ok(template.clone())
    }

    /// Returns the closed entry of the contract `S` bound to
    /// the implementation `I`, creating it and the contract's open template
    /// if needed.
    ///
    /// Repeated calls with the same pair return the same [Arc] instance.
    pub fn ensure_closed_entry<S, I>(&self) -> ProxyResult<Arc<ClosedEntry>>
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        let key = (TypeId::of::<S>(), TypeId::of::<I>());

        if let Some(entry) = self.lookup(&key) {
            return Ok(entry);
        }

        let template = self.ensure_open_template::<S>()?;

        let slot = self
            .entries
            .get_or_insert_with(key, || Arc::new(OnceSlot::new()));

        let entry = slot.get_or_try_init(|| {
            let entry = match ClosedEntry::close::<S, I>(template) {
                Ok(entry) => entry,

                Err(error) => {
                    tracing::warn!(target: "lazy_proxy", %error, "Implementation binding rejected.");

                    return Err(error);
                }
            };

            tracing::debug!(
                target: "lazy_proxy",
                service = %entry.template().descriptor(),
                implementation = entry.implementation_name(),
                proxy = %entry.proxy_type(),
                "Closed proxy entry created.",
            );

            Ok(Arc::new(entry))
        })?;

        Ok(entry.clone())
    }

    /// Creates a forwarding object of the contract `S` that defers
    /// the construction of the implementation `I` to the `deferred` value.
    ///
    /// The `deferred` value is not evaluated until the first call of any
    /// contract member on the returning object. Each call of this function
    /// produces an independent forwarding object, even though the forwarding
    /// type is created only once per pair.
    #[inline]
    pub fn create_proxy<S, I>(&self, deferred: Deferred<I>) -> ProxyResult<Box<S>>
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        self.ensure_closed_entry::<S, I>()?.construct::<S, I>(deferred)
    }

    /// Creates a shared forwarding object of the contract `S`.
    ///
    /// This function is similar to the [create_proxy](Self::create_proxy)
    /// function, but it returns the object in [Arc].
    #[inline]
    pub fn create_shared_proxy<S, I>(&self, deferred: Deferred<I>) -> ProxyResult<Arc<S>>
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        Ok(Arc::from(self.create_proxy::<S, I>(deferred)?))
    }

    /// Returns the identity of the forwarding type of the contract `S`
    /// bound to the implementation `I` without constructing any object.
    #[inline]
    pub fn proxy_type<S, I>(&self) -> ProxyResult<ProxyType>
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        Ok(self.ensure_closed_entry::<S, I>()?.proxy_type())
    }

    /// Creates a forwarding object from type-erased arguments.
    ///
    /// The `service` and `implementation` pair must be bound in advance by
    /// any typed function of this registry (for example,
    /// [ensure_closed_entry](Self::ensure_closed_entry)). The `deferred`
    /// object must be a `Deferred<I>` of the implementation type.
    ///
    /// On success, returns a `Box<S>` of the contract trait object wrapped
    /// into [Any].
    ///
    /// Returns a [TypeClosure](ProxyError::TypeClosure) error if the pair is
    /// not bound, or if the `deferred` object has a different type.
    pub fn create_proxy_erased(
        &self,
        service: TypeId,
        implementation: TypeId,
        deferred: Box<dyn Any>,
    ) -> ProxyResult<Box<dyn Any>> {
        match self.lookup(&(service, implementation)) {
            Some(entry) => entry.construct_erased(deferred),

            None => {
                let service = match self.templates.get(&service).and_then(|slot| slot.get().cloned()) {
                    Some(template) => template.descriptor().to_string(),
                    None => format!("{service:?}"),
                };

                Err(ProxyError::closure(
                    service,
                    format!("{implementation:?}"),
                    "The implementation has not been bound to the contract.",
                ))
            }
        }
    }

    /// Returns true if the registry has an open template of the contract `S`.
    #[inline(always)]
    pub fn contains_template<S: Contract + ?Sized>(&self) -> bool {
        self.templates
            .get(&TypeId::of::<S>())
            .map_or(false, |slot| slot.is_set())
    }

    /// Returns true if the registry has a closed entry of the contract `S`
    /// bound to the implementation `I`.
    #[inline(always)]
    pub fn contains_entry<S, I>(&self) -> bool
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        self.lookup(&(TypeId::of::<S>(), TypeId::of::<I>()))
            .is_some()
    }

    /// Returns the number of the open templates in this registry.
    #[inline(always)]
    pub fn templates_count(&self) -> usize {
        self.templates.count(|_, slot| slot.is_set())
    }

    /// Returns the number of the closed entries in this registry.
    #[inline(always)]
    pub fn entries_count(&self) -> usize {
        self.entries.count(|_, slot| slot.is_set())
    }

    #[inline(always)]
    fn lookup(&self, key: &(TypeId, TypeId)) -> Option<Arc<ClosedEntry>> {
        self.entries.get(key)?.get().cloned()
    }
}

/// Creates a forwarding object of the contract `S` that defers
/// the construction of the implementation `I` to the `deferred` value.
///
/// This function uses the process-wide [ProxyRegistry::global] registry.
#[inline(always)]
pub fn create_proxy<S, I>(deferred: Deferred<I>) -> ProxyResult<Box<S>>
where
    S: ProxyOf<I> + ?Sized,
    I: 'static,
{
    ProxyRegistry::global().create_proxy::<S, I>(deferred)
}

/// Returns the identity of the forwarding type of the contract `S`
/// bound to the implementation `I`.
///
/// This function uses the process-wide [ProxyRegistry::global] registry.
#[inline(always)]
pub fn proxy_type<S, I>() -> ProxyResult<ProxyType>
where
    S: ProxyOf<I> + ?Sized,
    I: 'static,
{
    ProxyRegistry::global().proxy_type::<S, I>()
}
