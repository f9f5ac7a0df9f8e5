/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Operation identifiers.
//!
//! Binary operations are identified by zero-sized marker types
//! implementing [`Operation`]. [`OpId`] is the value-level form of the
//! tag: it keys the registry and travels with sentinels for
//! diagnostics. The operation a marker stands for is never invoked by
//! this crate.

use std::any::TypeId;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

/// A marker type identifying a binary (or binary-shaped) operation.
///
/// Implementors are zero-sized tags. "Binary-shaped" covers operations
/// that are not symmetric in signature (an append that takes a
/// collection on the left and an element on the right still gets a
/// useful identity-like seed).
///
/// # Example
///
/// ```
/// use neutral::Operation;
///
/// struct Concat;
///
/// impl Operation for Concat {
///     const NAME: &'static str = "concat";
/// }
///
/// assert_eq!(Concat::op_id().name(), "concat");
/// ```
pub trait Operation: 'static {
    /// Stable human-readable name, used in diagnostics and error
    /// messages.
    const NAME: &'static str;

    /// The value-level identifier of this operation.
    fn op_id() -> OpId
    where
        Self: Sized,
    {
        OpId {
            id: TypeId::of::<Self>(),
            name: Self::NAME,
        }
    }
}

/// Value-level identifier of an operation.
///
/// Equality and hashing key on the marker type's [`TypeId`]; the name
/// is carried for display only.
#[derive(Clone, Copy, Debug)]
pub struct OpId {
    id: TypeId,
    name: &'static str,
}

impl OpId {
    /// The identifier of operation `O`.
    pub fn of<O: Operation>() -> Self {
        O::op_id()
    }

    /// The operation's display name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for OpId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpId {}

impl Hash for OpId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
