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
    any::{type_name, Any},
    fmt::{Debug, Formatter},
    panic::{catch_unwind, resume_unwind, AssertUnwindSafe},
    sync::{Mutex, MutexGuard, OnceLock},
    thread::{self, ThreadId},
};

use crate::{error::EvaluationError, report::system_panic};

type Factory<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// A memoized computation of a service implementation instance.
///
/// The Deferred value wraps a factory function that constructs the value on
/// the first access. The factory runs at most once per Deferred instance:
/// when several threads access a not-yet-evaluated Deferred simultaneously,
/// exactly one of them runs the factory, and the others block until
/// the factory finishes and then share its outcome.
///
/// ```
/// use lazy_proxy::Deferred;
///
/// let deferred = Deferred::new(|| String::from("Hello"));
///
/// assert!(!deferred.is_evaluated());
/// assert_eq!(deferred.get(), "Hello");
/// assert!(deferred.is_evaluated());
/// ```
///
/// ## Failures
///
/// The factory reports construction failures by panicking. The Deferred
/// catches the panic, moves into the [Failed](DeferredState::Failed) state,
/// and re-raises the panic to the caller. The failure is memoized: every
/// subsequent access re-raises the failure without running the factory again.
///
/// Panic payloads of `&'static str` and [String] types are re-raised with
/// the same type and content on every access. Any other payload is re-raised
/// untouched only once, to the caller that triggered the evaluation. Later
/// accesses raise an [EvaluationError] payload instead, because an arbitrary
/// payload cannot be cloned (see [EvaluationError::payload]).
///
/// The [try_get](Self::try_get) function is a non-panicking alternative that
/// returns the failure as an [EvaluationError].
///
/// ## Reentrancy
///
/// The factory must not access the Deferred value it belongs to. A recurrent
/// access from the factory's thread panics with a descriptive message, and
/// the Deferred value then fails with this panic. A recurrent access from
/// another thread that the factory waits for is not detected and deadlocks.
pub struct Deferred<T> {
    cell: OnceLock<Outcome<T>>,
    factory: Mutex<Option<Factory<T>>>,
    evaluator: Mutex<Option<ThreadId>>,
}

/// A state of the [Deferred] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredState {
    /// The factory has not been called yet.
    Unevaluated,

    /// The factory is currently running.
    Evaluating,

    /// The factory returned a value.
    Evaluated,

    /// The factory panicked.
    Failed,
}

enum Outcome<T> {
    Evaluated(T),
    Failed(EvaluationError),
}

impl<T> Debug for Deferred<T> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Deferred")
            .field("type", &type_name::<T>())
            .field("state", &self.state())
            .finish()
    }
}

impl<T> From<T> for Deferred<T> {
    #[inline(always)]
    fn from(value: T) -> Self {
        Self::ready(value)
    }
}

impl<T> Deferred<T> {
    /// Creates a Deferred value that will be computed by the `factory`
    /// function on the first access.
    #[inline(always)]
    pub fn new(factory: impl FnOnce() -> T + Send + 'static) -> Self {
        Self {
            cell: OnceLock::new(),
            factory: Mutex::new(Some(Box::new(factory))),
            evaluator: Mutex::new(None),
        }
    }

    /// Creates an already evaluated Deferred value.
    #[inline(always)]
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceLock::from(Outcome::Evaluated(value)),
            factory: Mutex::new(None),
            evaluator: Mutex::new(None),
        }
    }

    /// Returns the current state of this Deferred value.
    ///
    /// The function never triggers evaluation.
    pub fn state(&self) -> DeferredState {
        match self.cell.get() {
            Some(Outcome::Evaluated(_)) => DeferredState::Evaluated,
            Some(Outcome::Failed(_)) => DeferredState::Failed,
            None => match self.evaluator().is_some() {
                true => DeferredState::Evaluating,
                false => DeferredState::Unevaluated,
            },
        }
    }

    /// Returns true if the factory has successfully produced the value.
    #[inline(always)]
    pub fn is_evaluated(&self) -> bool {
        match self.cell.get() {
            Some(Outcome::Evaluated(_)) => true,
            _ => false,
        }
    }

    /// Returns a reference to the value, evaluating it if needed.
    ///
    /// **Panic**
    ///
    /// If the factory panics, this function re-raises the factory's panic.
    /// Subsequent calls re-raise the memoized failure.
    #[inline]
    pub fn get(&self) -> &T {
        match self.force() {
            Outcome::Evaluated(value) => value,
            Outcome::Failed(error) => resume_unwind(error.payload()),
        }
    }

    /// Returns a mutable reference to the value, evaluating it if needed.
    ///
    /// **Panic**
    ///
    /// If the factory panics, this function re-raises the factory's panic.
    /// Subsequent calls re-raise the memoized failure.
    pub fn get_mut(&mut self) -> &mut T {
        let _ = self.get();

        match self.cell.get_mut() {
            Some(Outcome::Evaluated(value)) => value,
            _ => system_panic!("Deferred value is not evaluated after forcing."),
        }
    }

    /// Returns a reference to the value, evaluating it if needed.
    ///
    /// Unlike the [get](Self::get) function, returns the factory failure as
    /// an error instead of re-raising the panic.
    pub fn try_get(&self) -> Result<&T, EvaluationError> {
        match self.outcome() {
            Outcome::Evaluated(value) => Ok(value),
            Outcome::Failed(error) => Err(error.clone()),
        }
    }

    /// Returns the value if it has been evaluated.
    ///
    /// The function never triggers evaluation.
    #[inline(always)]
    pub fn peek(&self) -> Option<&T> {
        match self.cell.get() {
            Some(Outcome::Evaluated(value)) => Some(value),
            _ => None,
        }
    }

    /// Consumes this Deferred value and returns the underlying value,
    /// evaluating it if needed.
    pub fn into_inner(self) -> Result<T, EvaluationError> {
        let _ = self.outcome();

        match self.cell.into_inner() {
            Some(Outcome::Evaluated(value)) => Ok(value),
            Some(Outcome::Failed(error)) => Err(error),
            None => system_panic!("Deferred value is not evaluated after forcing."),
        }
    }

    // Re-raises the original panic payload if the current thread was
    // the one that ran the failed factory.
    #[inline(always)]
    fn force(&self) -> &Outcome<T> {
        if let Some(outcome) = self.cell.get() {
            return outcome;
        }

        let mut original = None;

        let outcome = self.initialize(&mut original);

        if let Some(payload) = original {
            resume_unwind(payload);
        }

        outcome
    }

    #[inline(always)]
    fn outcome(&self) -> &Outcome<T> {
        if let Some(outcome) = self.cell.get() {
            return outcome;
        }

        self.initialize(&mut None)
    }

    fn initialize(&self, original: &mut Option<Box<dyn Any + Send>>) -> &Outcome<T> {
        if *self.evaluator() == Some(thread::current().id()) {
            panic!(
                "Deferred value of type {} is accessed recursively from its own factory.",
                type_name::<T>(),
            );
        }

        let outcome = self.cell.get_or_init(|| self.evaluate(original));

        // The outcome is stored at this point.
        *self.evaluator() = None;

        outcome
    }

    #[inline(always)]
    fn evaluator(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.evaluator
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn evaluate(&self, original: &mut Option<Box<dyn Any + Send>>) -> Outcome<T> {
        let factory = self
            .factory
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .take();

        let Some(factory) = factory else {
            system_panic!("Deferred factory is missing.");
        };

        *self.evaluator() = Some(thread::current().id());

        tracing::trace!(target: "lazy_proxy", value = type_name::<T>(), "Evaluating deferred value.");

        let result = catch_unwind(AssertUnwindSafe(factory));

        match result {
            Ok(value) => {
                tracing::trace!(target: "lazy_proxy", value = type_name::<T>(), "Deferred value evaluated.");

                Outcome::Evaluated(value)
            }

            Err(payload) => {
                let error = EvaluationError::capture(type_name::<T>(), payload.as_ref());

                tracing::warn!(target: "lazy_proxy", %error, "Deferred value factory failed.");

                *original = Some(payload);

                Outcome::Failed(error)
            }
        }
    }
}
