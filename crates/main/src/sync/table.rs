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

///////////////////////////////////////////////////////////////////////////////////////
// A part of this file's source code is an adaptation of the Joel Wejdenstål's       //
// "DashMap" work.                                                                   //
//                                                                                   //
// Joel Wejdenstål's original work available here:                                   //
// https://github.com/xacrimon/dashmap/tree/626b98dab3c124cd9cd4960d0306da5d65918dfc //
//                                                                                   //
// Joel Wejdenstål grants me with a license to his work under the following terms:   //
//                                                                                   //
//   MIT License                                                                     //
//                                                                                   //
//   Copyright (c) 2019 Acrimon                                                      //
//                                                                                   //
//   Permission is hereby granted, free of charge, to any person obtaining a copy    //
//   of this software and associated documentation files (the "Software"), to deal   //
//   in the Software without restriction, including without limitation the rights    //
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell       //
//   copies of the Software, and to permit persons to whom the Software is           //
//   furnished to do so, subject to the following conditions:                        //
//                                                                                   //
//   The above copyright notice and this permission notice shall be included in all  //
//   copies or substantial portions of the Software.                                 //
//                                                                                   //
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR      //
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,        //
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE     //
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER          //
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,   //
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE   //
//   SOFTWARE.                                                                       //
//                                                                                   //
// Kindly be advised that the terms governing the distribution of my work are        //
// distinct from those pertaining to the original work of Joel Wejdenstål.           //
///////////////////////////////////////////////////////////////////////////////////////

use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt::{Debug, Formatter},
    hash::{BuildHasher, Hash, RandomState},
    mem::size_of,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::report::lp_assert;

/// A sharded read-write lock of the HashMap.
///
/// The Table is the storage behind both levels of the
/// [ProxyRegistry](crate::registry::ProxyRegistry) cache. Its entries are
/// distributed between a fixed number of shards, each guarded by its own
/// [RwLock], so that reading and inserting **distinct** keys rarely block
/// each other.
///
/// The Table intentionally exposes a narrow API: lookups return clones of
/// the stored values (the registry stores [Arc](std::sync::Arc)s), and the
/// only mutating operation is the insert-if-absent
/// [get_or_insert_with](Self::get_or_insert_with) function. Entries are never
/// removed.
///
/// By default, the shards amount is estimated from the available parallelism,
/// but it can be specified explicitly in
/// the [with_hasher_and_shards](Self::with_hasher_and_shards) constructor.
pub struct Table<K, V, S = RandomState> {
    shift: usize,
    shards: Box<[RwLock<HashMap<K, V, S>>]>,
    hasher: S,
}

impl<K, V, S> Debug for Table<K, V, S> {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Table")
            .field("shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default + Clone> Default for Table<K, V, S> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Table<K, V, S> {
    /// A default Table constructor.
    #[inline(always)]
    pub fn new() -> Self
    where
        S: Default + Clone,
    {
        Self::with_hasher_and_shards(S::default(), shards_amount())
    }

    /// A Table constructor with the specified amount of `shards`.
    ///
    /// **Panic**
    ///
    /// Panics, if the `shards` value is zero or is not a power of two.
    #[inline(always)]
    pub fn with_shards(shards: usize) -> Self
    where
        S: Default + Clone,
    {
        Self::with_hasher_and_shards(S::default(), shards)
    }

    /// A Table constructor with the specified key `hasher` instance and
    /// the amount of `shards`.
    ///
    /// The `shards` amount must be a positive number and a power of two.
    /// One shard is a valid argument, which makes the Table
    /// similar to `RwLock<HashMap>`.
    ///
    /// **Panic**
    ///
    /// Panics, if the `shards` value is zero or is not a power of two.
    pub fn with_hasher_and_shards(hasher: S, shards: usize) -> Self
    where
        S: Clone,
    {
        if !shards.is_power_of_two() {
            panic!("Table shards amount {shards} is not a power of two.");
        }

        let shift = match shards > 1 {
            true => size_of::<usize>() * 8 - shards.trailing_zeros() as usize,
            false => 0,
        };

        let shards = (0..shards)
            .map(|_| RwLock::new(HashMap::with_hasher(hasher.clone())))
            .collect();

        Self {
            shift,
            shards,
            hasher,
        }
    }

    /// Returns true if the Table has an entry with the specified `key`.
    ///
    /// Blocks the current thread if the key's shard is locked for write.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read(key).contains_key(key)
    }

    /// Returns a clone of the value stored under the `key`.
    ///
    /// Returns None if the Table does not have an entry with the specified key.
    ///
    /// Blocks the current thread if the key's shard is locked for write.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.read(key).get(key).cloned()
    }

    /// Returns a clone of the value stored under the `key`, or inserts
    /// the value returned by the `init` function if the Table does not have
    /// such entry yet.
    ///
    /// The check and the insertion happen under the same write lock of
    /// the key's shard, therefore concurrent callers with the same key always
    /// observe the same value, and the `init` function is called at most once
    /// per key.
    ///
    /// The `init` function runs while the shard is locked, and it should be
    /// cheap.
    pub fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        if let Some(value) = self.read(&key).get(&key) {
            return value.clone();
        }

        self.write(&key).entry(key).or_insert_with(init).clone()
    }

    /// Returns the number of entries in this Table that satisfy
    /// the `predicate`.
    ///
    /// The shards are locked for read one by one, so the result is not
    /// an atomic snapshot if the Table is being modified concurrently.
    pub fn count(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                let guard = shard.read().unwrap_or_else(|poison| poison.into_inner());

                guard
                    .iter()
                    .filter(|(key, value)| predicate(key, value))
                    .count()
            })
            .sum()
    }

    /// Returns the total number of entries in this Table.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count(|_, _| true)
    }

    /// Returns true if this Table does not have any entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the amount of shards of this Table.
    #[inline(always)]
    pub fn shards(&self) -> usize {
        self.shards.len()
    }

    /// Returns an index of the shard that stores the `key`.
    ///
    /// The returning value is **guaranteed** to be within the shards array
    /// bounds.
    #[inline(always)]
    pub fn shard_index_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.shards.len() == 1 {
            return 0;
        }

        let hash = self.hasher.hash_one(key) as usize;

        let shard = (hash << 7) >> self.shift;

        lp_assert!(
            shard < self.shards.len(),
            "Table shard index {shard} out of bounds."
        );

        shard
    }

    #[inline(always)]
    fn read<Q>(&self, key: &Q) -> RwLockReadGuard<'_, HashMap<K, V, S>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shards[self.shard_index_of(key)]
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    #[inline(always)]
    fn write<Q>(&self, key: &Q) -> RwLockWriteGuard<'_, HashMap<K, V, S>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shards[self.shard_index_of(key)]
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

#[inline(always)]
fn shards_amount() -> usize {
    #[cfg(not(target_family = "wasm"))]
    {
        std::thread::available_parallelism()
            .map_or(1usize, |parallelism| 4 * usize::from(parallelism))
            .next_power_of_two()
    }

    #[cfg(target_family = "wasm")]
    {
        1
    }
}
