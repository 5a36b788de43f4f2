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
    ops::Deref,
    sync::OnceLock,
};

/// A static value which is initialized on the first access.
///
/// The Lazy is thread-safe and is intended for statics, such as
/// the process-wide [ProxyRegistry](crate::registry::ProxyRegistry::global).
///
/// Any dereferencing access blocks the thread if another thread is currently
/// initializing this Lazy.
///
/// ```
/// use std::ops::Deref;
/// use lazy_proxy::sync::Lazy;
///
/// static FOO: Lazy<usize> = Lazy::new(|| 10 + 20);
///
/// let a: &'static usize = FOO.deref(); // first access implies initialization
///
/// assert_eq!(*a, 30);
/// ```
///
/// Unlike the [Deferred](crate::deferred::Deferred) value, the Lazy
/// initializer is a plain function pointer, and the Lazy does not memoize
/// panics: if the initializer panics, the next access runs it again.
pub struct Lazy<T: Send + Sync + 'static, F = fn() -> T> {
    cell: OnceLock<T>,
    init: F,
}

impl<T: Send + Sync + 'static> Deref for Lazy<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.cell.get_or_init(self.init)
    }
}

impl<T: Send + Sync + Debug + 'static> Debug for Lazy<T> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(value) => Debug::fmt(value, formatter),
            None => formatter.write_str("<uninit>"),
        }
    }
}

impl<T: Send + Sync + 'static> Lazy<T> {
    /// A constructor of the object.
    ///
    /// The `init` function should not dereference not-yet-initialized self
    /// Lazy directly or indirectly. Recurrent referencing usually leads to
    /// runtime deadlocks and may panic on some platforms.
    #[inline(always)]
    pub const fn new(init: fn() -> T) -> Self {
        Self {
            cell: OnceLock::new(),
            init,
        }
    }
}
