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
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    contract::{Contract, Member, ProxyOf, ServiceDescriptor},
    deferred::Deferred,
    error::{ProxyError, ProxyResult},
};

type ErasedConstructor = fn(Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>>;

/// An open forwarding template of the service contract.
///
/// The template is the contract's generic forwarding type that is not yet
/// bound to any implementation type, together with the validated contract
/// descriptor and an index of its members.
///
/// The [ProxyRegistry](crate::registry::ProxyRegistry) creates at most one
/// template per contract.
pub struct OpenTemplate {
    service: TypeId,
    descriptor: &'static ServiceDescriptor,
    index: HashMap<&'static str, usize>,
}

impl Debug for OpenTemplate {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("OpenTemplate")
            .field("service", &self.descriptor.name)
            .field("template", &self.descriptor.template)
            .field("members", &self.index.len())
            .finish()
    }
}

impl OpenTemplate {
    pub(crate) fn synthesize<S: Contract + ?Sized>() -> ProxyResult<Self> {
        let descriptor = S::descriptor();

        descriptor.validate()?;

        let index = descriptor
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| (member.name(), index))
            .collect();

        Ok(Self {
            service: TypeId::of::<S>(),
            descriptor,
            index,
        })
    }

    /// Returns the type identity of the service contract.
    #[inline(always)]
    pub fn service(&self) -> TypeId {
        self.service
    }

    /// Returns the contract descriptor.
    #[inline(always)]
    pub fn descriptor(&self) -> &'static ServiceDescriptor {
        self.descriptor
    }

    /// Returns the name of the service contract.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Returns the name of the generic forwarding type.
    #[inline(always)]
    pub fn template_name(&self) -> &'static str {
        self.descriptor.template
    }

    /// Looks up a contract member by name.
    #[inline]
    pub fn member(&self, name: &str) -> Option<&'static Member> {
        let index = *self.index.get(name)?;

        self.descriptor.members.get(index)
    }

    /// Returns the total number of the forwarding functions.
    #[inline(always)]
    pub fn forwarding_count(&self) -> usize {
        self.descriptor.forwarding_count()
    }
}

/// A runtime identity of the closed forwarding type.
///
/// Two ProxyTypes are equal if and only if they denote the same Rust type.
#[derive(Clone, Copy)]
pub struct ProxyType {
    id: TypeId,
    name: &'static str,
}

impl Debug for ProxyType {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

impl Display for ProxyType {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

impl PartialEq for ProxyType {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProxyType {}

impl Hash for ProxyType {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl ProxyType {
    /// Returns the ProxyType of the type `P`.
    #[inline(always)]
    pub fn of<P: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<P>(),
            name: type_name::<P>(),
        }
    }

    /// Returns the [TypeId] of the forwarding type.
    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified name of the forwarding type.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this ProxyType denotes the type `P`.
    #[inline(always)]
    pub fn is<P: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<P>()
    }
}

/// A forwarding template closed against a particular implementation type.
///
/// The entry keeps the identity of the closed forwarding type and the
/// construction functions that turn a [Deferred] value of the implementation
/// into a contract trait object.
///
/// The [ProxyRegistry](crate::registry::ProxyRegistry) creates at most one
/// entry per contract and implementation pair.
pub struct ClosedEntry {
    template: Arc<OpenTemplate>,
    implementation: TypeId,
    implementation_name: &'static str,
    proxy: ProxyType,
    typed: Box<dyn Any + Send + Sync>,
    erased: ErasedConstructor,
}

impl Debug for ClosedEntry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClosedEntry")
            .field("service", &self.template.name())
            .field("implementation", &self.implementation_name)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl ClosedEntry {
    pub(crate) fn close<S, I>(template: Arc<OpenTemplate>) -> ProxyResult<Self>
    where
        S: ProxyOf<I> + ?Sized,
        I: 'static,
    {
        if template.service() != TypeId::of::<S>() {
            return Err(ProxyError::closure(
                template.descriptor().to_string(),
                type_name::<I>(),
                "Template belongs to a different contract.",
            ));
        }

        if TypeId::of::<S::Proxy>() == TypeId::of::<I>() {
            return Err(ProxyError::closure(
                template.descriptor().to_string(),
                type_name::<I>(),
                "Binding resolves to the implementation type itself rather than \
                to a forwarding type.",
            ));
        }

        let typed: fn(Deferred<I>) -> Box<S> = construct::<S, I>;

        Ok(Self {
            template,
            implementation: TypeId::of::<I>(),
            implementation_name: type_name::<I>(),
            proxy: ProxyType::of::<S::Proxy>(),
            typed: Box::new(typed),
            erased: construct_erased::<S, I>,
        })
    }

    /// Returns the open template this entry was closed from.
    #[inline(always)]
    pub fn template(&self) -> &Arc<OpenTemplate> {
        &self.template
    }

    /// Returns the type identity of the service contract.
    #[inline(always)]
    pub fn service(&self) -> TypeId {
        self.template.service()
    }

    /// Returns the type identity of the implementation type.
    #[inline(always)]
    pub fn implementation(&self) -> TypeId {
        self.implementation
    }

    /// Returns the fully qualified name of the implementation type.
    #[inline(always)]
    pub fn implementation_name(&self) -> &'static str {
        self.implementation_name
    }

    /// Returns the identity of the closed forwarding type.
    #[inline(always)]
    pub fn proxy_type(&self) -> ProxyType {
        self.proxy
    }

    /// Creates a new forwarding object from the `deferred` value.
    ///
    /// Returns a [TypeClosure](ProxyError::TypeClosure) error if `S` and `I`
    /// are not the contract and the implementation of this entry.
    pub fn construct<S, I>(&self, deferred: Deferred<I>) -> ProxyResult<Box<S>>
    where
        S: ?Sized + 'static,
        I: 'static,
    {
        match self.typed.downcast_ref::<fn(Deferred<I>) -> Box<S>>() {
            Some(constructor) => Ok(constructor(deferred)),

            None => Err(ProxyError::closure(
                type_name::<S>(),
                type_name::<I>(),
                format!(
                    "The entry binds \"{}\" to \"{}\".",
                    self.implementation_name,
                    self.template.descriptor(),
                ),
            )),
        }
    }

    /// Creates a new forwarding object from the type-erased `deferred` value.
    ///
    /// The `deferred` object must be a `Deferred<I>` of the entry's
    /// implementation type `I`. The returning object is a `Box<dyn S>` of
    /// the entry's contract `S`.
    ///
    /// Returns a [TypeClosure](ProxyError::TypeClosure) error if the deferred
    /// object has a different type.
    pub fn construct_erased(&self, deferred: Box<dyn Any>) -> ProxyResult<Box<dyn Any>> {
        (self.erased)(deferred).map_err(|_| {
            ProxyError::closure(
                self.template.descriptor().to_string(),
                self.implementation_name,
                "Deferred value type does not match the implementation type.",
            )
        })
    }
}

#[inline(always)]
fn construct<S, I>(deferred: Deferred<I>) -> Box<S>
where
    S: ProxyOf<I> + ?Sized,
    I: 'static,
{
    S::upcast(S::construct(deferred))
}

fn construct_erased<S, I>(deferred: Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>>
where
    S: ProxyOf<I> + ?Sized,
    I: 'static,
{
    let deferred = deferred.downcast::<Deferred<I>>()?;

    Ok(Box::new(construct::<S, I>(*deferred)))
}
