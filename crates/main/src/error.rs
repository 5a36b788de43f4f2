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
    any::Any,
    fmt::{Display, Formatter},
    sync::Arc,
};

/// A result of the registry operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// An error of the proxy template synthesis or closing.
///
/// Both kinds of errors are raised synchronously to the caller that
/// triggered the creation of the cache entry, and in both cases nothing is
/// cached for the failed key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    /// The service contract cannot be proxied.
    ///
    /// Raised when the contract descriptor is malformed: for example, it has
    /// duplicate members, or a property without accessors.
    #[error("Service contract \"{service}\" cannot be proxied. {reason}")]
    InvalidServiceType {
        /// A name of the service contract.
        service: String,

        /// A description of the problem.
        reason: String,
    },

    /// The implementation type cannot be bound to the service contract.
    ///
    /// Raised when the type-erased API receives a pair that has never been
    /// bound, or a deferred value of a different type, and when a manually
    /// implemented binding does not produce a forwarding type.
    #[error("Implementation \"{implementation}\" cannot be bound to service contract \"{service}\". {reason}")]
    TypeClosure {
        /// A name of the service contract.
        service: String,

        /// A name of the implementation type.
        implementation: String,

        /// A description of the problem.
        reason: String,
    },
}

impl ProxyError {
    #[inline(always)]
    pub(crate) fn invalid(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidServiceType {
            service: service.into(),
            reason: reason.into(),
        }
    }

    #[inline(always)]
    pub(crate) fn closure(
        service: impl Into<String>,
        implementation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeClosure {
            service: service.into(),
            implementation: implementation.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is an [InvalidServiceType](Self::InvalidServiceType)
    /// error.
    #[inline(always)]
    pub fn is_invalid_service(&self) -> bool {
        match self {
            Self::InvalidServiceType { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this is a [TypeClosure](Self::TypeClosure) error.
    #[inline(always)]
    pub fn is_type_closure(&self) -> bool {
        match self {
            Self::TypeClosure { .. } => true,
            _ => false,
        }
    }
}

/// A failure of the [Deferred](crate::deferred::Deferred) value factory.
///
/// The factory function of the Deferred value reports failures by panicking.
/// The Deferred catches the panic and keeps it as an EvaluationError, so that
/// every subsequent access to the value re-raises the same failure without
/// running the factory again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Deferred \"{target}\" evaluation failed. {payload}")]
pub struct EvaluationError {
    target: &'static str,
    payload: Payload,
}

impl EvaluationError {
    pub(crate) fn capture(target: &'static str, payload: &(dyn Any + Send)) -> Self {
        let payload = if let Some(message) = payload.downcast_ref::<&'static str>() {
            Payload::Static(message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Payload::Owned(Arc::from(message.as_str()))
        } else {
            Payload::Opaque
        };

        Self { target, payload }
    }

    /// Returns a type name of the value that the failed factory was supposed
    /// to produce.
    #[inline(always)]
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Returns the panic message of the failed factory.
    ///
    /// Returns None if the factory panicked with a payload other than a string.
    #[inline(always)]
    pub fn message(&self) -> Option<&str> {
        match &self.payload {
            Payload::Static(message) => Some(message),
            Payload::Owned(message) => Some(message),
            Payload::Opaque => None,
        }
    }

    /// Recreates a panic payload equal to the payload of the original panic.
    ///
    /// String payloads (`&'static str` and [String]) are reproduced with
    /// the same type and content. Other payloads cannot be reproduced, and
    /// in this case the function returns a boxed copy of this
    /// EvaluationError instead.
    pub fn payload(&self) -> Box<dyn Any + Send> {
        match &self.payload {
            Payload::Static(message) => Box::new(*message),
            Payload::Owned(message) => Box::new(String::from(message.as_ref())),
            Payload::Opaque => Box::new(self.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    Static(&'static str),
    Owned(Arc<str>),
    Opaque,
}

impl Display for Payload {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(message) => formatter.write_str(message),
            Self::Owned(message) => formatter.write_str(message),
            Self::Opaque => formatter.write_str("<non-string panic payload>"),
        }
    }
}
