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

use std::fmt::{Display, Formatter};

use crate::{
    deferred::Deferred,
    error::{ProxyError, ProxyResult},
};

/// A service contract: a trait that can be proxied.
///
/// The Contract is implemented for the trait object type of the contract
/// trait (`dyn MyService`), and it provides a static description of
/// the contract's members.
///
/// You are encouraged to use the companion
/// [lazy_proxy](lazy_proxy_derive::lazy_proxy) attribute macro, which
/// implements this trait together with the [ProxyOf] trait and generates
/// the forwarding type. A manual implementation is possible, but
/// the implementor is responsible for the descriptor to be consistent with
/// the trait.
pub trait Contract: 'static {
    /// Returns the description of the contract members.
    ///
    /// The function must return the same descriptor on every call.
    fn descriptor() -> &'static ServiceDescriptor;
}

/// A binding of the service contract to a particular implementation type.
///
/// The trait is implemented for the trait object type of the contract
/// (`dyn MyService`) for every type `T` implementing the contract trait.
///
/// The [Proxy](ProxyOf::Proxy) type is the "closed" forwarding type:
/// the contract's generic forwarding template instantiated with `T`.
pub trait ProxyOf<T: 'static>: Contract {
    /// A type of the forwarding object that holds a [Deferred] value of `T`,
    /// and implements the contract trait by forwarding every member to
    /// the deferred value.
    type Proxy: 'static;

    /// Creates a forwarding object from the `deferred` value.
    ///
    /// The function must not access the `deferred` value.
    fn construct(deferred: Deferred<T>) -> Self::Proxy;

    /// Upcasts the forwarding object to the contract trait object.
    fn upcast(proxy: Self::Proxy) -> Box<Self>;
}

/// A static description of the service contract.
///
/// The descriptor lists the contract members in the order of their
/// declaration. Methods that implement property accessors are listed as
/// parts of the [Property] members rather than as individual methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    /// A name of the contract trait.
    pub name: &'static str,

    /// A module path where the contract trait is declared.
    pub module: &'static str,

    /// A name of the generic forwarding type.
    pub template: &'static str,

    /// A list of the contract members.
    pub members: &'static [Member],
}

/// A member of the service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    /// A plain method.
    Method(Method),

    /// A property implemented by a getter method, a setter method, or both.
    Property(Property),
}

/// A method of the service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method {
    /// A name of the method.
    pub name: &'static str,

    /// A kind of the method's receiver.
    pub receiver: Receiver,

    /// A list of the parameter types excluding the receiver.
    pub inputs: &'static [&'static str],

    /// A return type of the method. Unit return is denoted as `()`.
    pub output: &'static str,
}

/// A property of the service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Property {
    /// A name of the property.
    pub name: &'static str,

    /// A type of the property value.
    pub ty: &'static str,

    /// A method that reads the property, if the property is readable.
    pub getter: Option<Accessor>,

    /// A method that writes the property, if the property is writable.
    pub setter: Option<Accessor>,
}

/// A method that implements a property accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accessor {
    /// A name of the accessor method.
    pub method: &'static str,

    /// A kind of the accessor method's receiver.
    pub receiver: Receiver,
}

/// A kind of the method receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// The `&self` receiver.
    Shared,

    /// The `&mut self` receiver.
    Exclusive,
}

impl Display for ServiceDescriptor {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.module.is_empty() {
            true => formatter.write_str(self.name),
            false => write!(formatter, "{}::{}", self.module, self.name),
        }
    }
}

impl ServiceDescriptor {
    /// Looks up a member by name.
    ///
    /// Property accessor methods are not members on their own, use
    /// the property name instead.
    #[inline]
    pub fn member(&self, name: &str) -> Option<&'static Member> {
        let members: &'static [Member] = self.members;

        members.iter().find(|member| member.name() == name)
    }

    /// Iterates over the plain methods of the contract.
    #[inline]
    pub fn methods(&self) -> impl Iterator<Item = &'static Method> {
        let members: &'static [Member] = self.members;

        members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            Member::Property(_) => None,
        })
    }

    /// Iterates over the properties of the contract.
    #[inline]
    pub fn properties(&self) -> impl Iterator<Item = &'static Property> {
        let members: &'static [Member] = self.members;

        members.iter().filter_map(|member| match member {
            Member::Method(_) => None,
            Member::Property(property) => Some(property),
        })
    }

    /// Returns the total number of the forwarding functions: plain methods
    /// and property accessors.
    pub fn forwarding_count(&self) -> usize {
        self.members
            .iter()
            .map(|member| match member {
                Member::Method(_) => 1,
                Member::Property(property) => {
                    property.getter.is_some() as usize + property.setter.is_some() as usize
                }
            })
            .sum()
    }

    /// Checks the descriptor consistency.
    ///
    /// Returns an [InvalidServiceType](ProxyError::InvalidServiceType) error
    /// if the descriptor has empty names or types, duplicate member names,
    /// duplicate accessor method names, a property without accessors,
    /// a getter that shares a method with a setter, or if the template name
    /// coincides with the contract name.
    pub fn validate(&self) -> ProxyResult<()> {
        let service = self.to_string();

        if self.name.is_empty() {
            return Err(ProxyError::invalid(service, "Contract name is empty."));
        }

        if self.template.is_empty() || self.template == self.name {
            return Err(ProxyError::invalid(
                service,
                format!("Invalid forwarding type name \"{}\".", self.template),
            ));
        }

        let mut names = Vec::with_capacity(self.members.len());
        let mut functions = Vec::with_capacity(self.forwarding_count());

        for member in self.members {
            let name = member.name();

            if name.is_empty() {
                return Err(ProxyError::invalid(service, "Member with empty name."));
            }

            if names.contains(&name) {
                return Err(ProxyError::invalid(
                    service,
                    format!("Duplicate member \"{name}\"."),
                ));
            }

            names.push(name);

            match member {
                Member::Method(method) => {
                    if method.output.is_empty() || method.inputs.iter().any(|ty| ty.is_empty()) {
                        return Err(ProxyError::invalid(
                            service,
                            format!("Method \"{name}\" has an unnamed type in its signature."),
                        ));
                    }

                    functions.push(method.name);
                }

                Member::Property(property) => {
                    if property.ty.is_empty() {
                        return Err(ProxyError::invalid(
                            service,
                            format!("Property \"{name}\" has an unnamed type."),
                        ));
                    }

                    if property.getter.is_none() && property.setter.is_none() {
                        return Err(ProxyError::invalid(
                            service,
                            format!("Property \"{name}\" has neither getter nor setter."),
                        ));
                    }

                    functions.extend(property.getter.map(|accessor| accessor.method));
                    functions.extend(property.setter.map(|accessor| accessor.method));
                }
            }
        }

        for (index, function) in functions.iter().enumerate() {
            if function.is_empty() {
                return Err(ProxyError::invalid(service, "Accessor with empty name."));
            }

            if functions[..index].contains(function) {
                return Err(ProxyError::invalid(
                    service,
                    format!("Function \"{function}\" forwards more than one member."),
                ));
            }
        }

        Ok(())
    }
}

impl Member {
    /// Returns the member name.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Method(method) => method.name,
            Self::Property(property) => property.name,
        }
    }

    /// Returns true if the member is a property that can be read.
    #[inline(always)]
    pub fn is_readable(&self) -> bool {
        match self {
            Self::Property(property) => property.getter.is_some(),
            Self::Method(_) => false,
        }
    }

    /// Returns true if the member is a property that can be written.
    #[inline(always)]
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Property(property) => property.setter.is_some(),
            Self::Method(_) => false,
        }
    }
}
