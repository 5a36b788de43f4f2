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
    fmt::{Debug, Formatter},
    sync::{Mutex, OnceLock},
};

use crate::report::system_panic;

/// A write-once cell with fallible initialization.
///
/// The OnceSlot is a create-once-per-key primitive of the registry caches:
/// the [Table](crate::sync::Table) hands out one slot per key, and the slot
/// guarantees that the value is created at most once even if many threads
/// request it simultaneously.
///
/// Unlike [OnceLock], a failed initialization leaves the slot empty, so that
/// the next [get_or_try_init](Self::get_or_try_init) call runs the initializer
/// again.
///
/// Reading an already initialized slot does not lock anything.
pub struct OnceSlot<T> {
    value: OnceLock<T>,
    lock: Mutex<()>,
}

impl<T: Debug> Debug for OnceSlot<T> {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value.get() {
            Some(value) => formatter.debug_tuple("OnceSlot").field(value).finish(),
            None => formatter.write_str("OnceSlot(<empty>)"),
        }
    }
}

impl<T> Default for OnceSlot<T> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OnceSlot<T> {
    /// Creates an empty slot.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the value if the slot has been initialized.
    #[inline(always)]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns true if the slot has been initialized.
    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.value.get().is_some()
    }

    /// Returns the slot's value initializing it with the `init` function
    /// if needed.
    ///
    /// Only one thread runs the `init` function at a time. Concurrent callers
    /// block until it finishes, and then either observe the created value, or,
    /// if the `init` function failed, run their own `init` function.
    ///
    /// If the `init` function returns an error, the error is returned to
    /// the caller, and the slot remains empty.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let _guard = self.lock.lock().unwrap_or_else(|poison| poison.into_inner());

        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        if self.value.set(init()?).is_err() {
            system_panic!("OnceSlot initialized outside of the lock.");
        }

        match self.value.get() {
            Some(value) => Ok(value),
            None => system_panic!("OnceSlot is empty after initialization."),
        }
    }
}
