/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Combination entry points: how a sentinel seed absorbs real operands.
//!
//! A fold invokes [`combine`] (or the erased [`combine_value`]) while
//! its accumulator is still the seed; afterwards the accumulator is an
//! ordinary value and the fold proceeds with the operation's own call
//! interface. Rule resolution is fixed by registration state, so no
//! outcome ever depends on call order.

use std::any::Any;
use std::any::TypeId;

use crate::op::OpId;
use crate::registry;
use crate::sentinel::IdentityValue;

/// A type-erased right-hand operand.
///
/// The pass-through rule returns the operand's own box: no copy, no
/// coercion.
pub type Value = Box<dyn Any + Send>;

/// The type of error for sentinel combination.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CombineError {
    /// The seed is an unknown-identity sentinel: the operation has no
    /// registered rule.
    #[error("no identity defined for operation `{op}`")]
    NoIdentity {
        /// The operation the sentinel was made for.
        op: OpId,
    },

    /// The operation was registered one-sided; its sentinel has no
    /// right-identity rule.
    #[error("operation `{op}` has no right identity (not registered as a monoid)")]
    NoRightIdentity {
        /// The operation the sentinel was made for.
        op: OpId,
    },

    /// The registered projection changed the operand's type, so the
    /// typed entry point cannot return it. Use [`combine_value`].
    #[error("projection for operation `{op}` did not preserve the operand type `{expected}`")]
    ValueProjected {
        /// The operation the sentinel was made for.
        op: OpId,
        /// The operand type the caller expected back.
        expected: &'static str,
    },
}

/// Combine an identity sentinel with an operand.
///
/// This is the generic rule a fold invokes uniformly alongside the
/// operation's normal two-argument form. For a known sentinel the
/// operand comes back out, possibly through the operation's registered
/// projection; for an unknown sentinel there is no rule and a
/// descriptive error is returned, never a silently wrong value.
///
/// Rule order, fixed at registration: the monoid both-sentinel rule,
/// then any disambiguated operand type, then the generic projection.
pub fn combine_value(seed: &IdentityValue, x: Value) -> Result<Value, CombineError> {
    let known = match seed {
        IdentityValue::Known(k) => k,
        IdentityValue::Unknown(u) => return Err(CombineError::NoIdentity { op: u.op() }),
    };
    let op = known.op();
    let rhs = (*x).type_id();
    let rule = registry::resolve(op, rhs).ok_or(CombineError::NoIdentity { op })?;
    if rule.monoid {
        // Both operands are the operation's identity; either one is
        // the result.
        if let Some(v) = x.downcast_ref::<IdentityValue>() {
            if v.is_known() && v.op() == op {
                return Ok(x);
            }
        }
    }
    if rule.pinned {
        return Ok(x);
    }
    Ok(rule.projection.apply(x))
}

/// Typed convenience over [`combine_value`] for type-preserving
/// combination: `combine(&seed, x)` yields `x` back.
///
/// # Example
///
/// ```
/// use neutral::combine;
/// use neutral::make_identity;
/// use neutral::ops::Mul;
///
/// let seed = make_identity::<Mul>();
/// assert_eq!(combine(&seed, "right".to_string()).unwrap(), "right");
/// ```
pub fn combine<T: Any + Send>(seed: &IdentityValue, x: T) -> Result<T, CombineError> {
    let op = seed.op();
    let out = combine_value(seed, Box::new(x))?;
    match out.downcast::<T>() {
        Ok(v) => Ok(*v),
        Err(_) => Err(CombineError::ValueProjected {
            op,
            expected: std::any::type_name::<T>(),
        }),
    }
}

/// The right-identity rule: combining an operand with a sentinel on
/// the right yields the operand unchanged.
///
/// Defined only for operations registered via
/// [`register_monoid`](crate::register_monoid); one-sided
/// registrations have no right rule.
pub fn combine_right<T: Any + Send>(x: T, seed: &IdentityValue) -> Result<T, CombineError> {
    let known = match seed {
        IdentityValue::Known(k) => k,
        IdentityValue::Unknown(u) => return Err(CombineError::NoIdentity { op: u.op() }),
    };
    let op = known.op();
    let rule = registry::resolve(op, TypeId::of::<T>()).ok_or(CombineError::NoIdentity { op })?;
    if rule.monoid {
        Ok(x)
    } else {
        Err(CombineError::NoRightIdentity { op })
    }
}
