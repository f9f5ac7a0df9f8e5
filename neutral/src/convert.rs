/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Conversion of identity sentinels to concrete identity values.
//!
//! Converting is a per-target-type capability layered on top of
//! dispatch, not part of it: the multiplicative sentinel converts to
//! `1.0f64`, the additive one to `0i64`, and so on for every target
//! registered via [`register_conversion`](crate::register_conversion)
//! or [`declare_conversion!`](crate::declare_conversion). A sentinel
//! with no conversion for the requested target errors; it never guesses
//! a value.

use std::any::Any;
use std::any::TypeId;

use crate::op::OpId;
use crate::registry;
use crate::sentinel::IdentityValue;

/// The type of error for sentinel conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The sentinel is the unknown variant.
    #[error("no identity defined for operation `{op}`")]
    NoIdentity {
        /// The operation the sentinel was made for.
        op: OpId,
    },

    /// No conversion to the target type is registered for the
    /// operation.
    #[error("no `{target}` conversion registered for operation `{op}`")]
    NoConversion {
        /// The operation the sentinel was made for.
        op: OpId,
        /// Display name of the requested target type.
        target: &'static str,
    },

    /// The registered producer yielded a value of a different type
    /// than the one it was keyed under. This is a registration bug,
    /// surfaced rather than coerced.
    #[error("conversion for operation `{op}` to `{target}` produced a mismatched value")]
    Mismatched {
        /// The operation the sentinel was made for.
        op: OpId,
        /// Display name of the requested target type.
        target: &'static str,
    },
}

/// Convert a known-identity sentinel to the concrete identity value
/// registered for target type `T`.
///
/// # Example
///
/// ```
/// use neutral::convert;
/// use neutral::make_identity;
/// use neutral::ops::Min;
///
/// let seed = make_identity::<Min>();
/// assert_eq!(convert::<f64>(&seed).unwrap(), f64::INFINITY);
/// ```
pub fn convert<T: Any>(v: &IdentityValue) -> Result<T, ConvertError> {
    let known = match v {
        IdentityValue::Known(k) => k,
        IdentityValue::Unknown(u) => return Err(ConvertError::NoIdentity { op: u.op() }),
    };
    let op = known.op();
    let target = std::any::type_name::<T>();
    let produce = registry::conversion(op, TypeId::of::<T>())
        .ok_or(ConvertError::NoConversion { op, target })?;
    produce()
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| ConvertError::Mismatched { op, target })
}

impl IdentityValue {
    /// Convert this sentinel to the concrete identity value registered
    /// for target type `T`. See [`convert`].
    pub fn convert<T: Any>(&self) -> Result<T, ConvertError> {
        convert(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;
    use crate::make_identity;
    use crate::ops::Add;
    use crate::ops::BitAnd;
    use crate::ops::BitOr;
    use crate::ops::Max;
    use crate::ops::Min;
    use crate::ops::Mul;

    #[test]
    fn builtin_numeric_identities() {
        assert_eq!(make_identity::<Add>().convert::<i64>().unwrap(), 0);
        assert_eq!(make_identity::<Add>().convert::<f64>().unwrap(), 0.0);
        assert_eq!(make_identity::<Mul>().convert::<f64>().unwrap(), 1.0);
        assert_eq!(make_identity::<Mul>().convert::<u32>().unwrap(), 1);
    }

    #[test]
    fn builtin_logical_and_order_identities() {
        assert!(make_identity::<BitAnd>().convert::<bool>().unwrap());
        assert!(!make_identity::<BitOr>().convert::<bool>().unwrap());
        assert_eq!(make_identity::<BitAnd>().convert::<u64>().unwrap(), u64::MAX);
        assert_eq!(make_identity::<Min>().convert::<i64>().unwrap(), i64::MAX);
        assert_eq!(make_identity::<Max>().convert::<i64>().unwrap(), i64::MIN);
        assert_eq!(
            make_identity::<Max>().convert::<f64>().unwrap(),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn unknown_sentinel_does_not_convert() {
        struct Mystery;

        impl Operation for Mystery {
            const NAME: &'static str = "mystery";
        }

        let err = make_identity::<Mystery>().convert::<f64>().unwrap_err();
        assert!(matches!(err, ConvertError::NoIdentity { .. }));
    }

    #[test]
    fn unregistered_target_does_not_convert() {
        let err = make_identity::<Add>().convert::<String>().unwrap_err();
        assert!(matches!(err, ConvertError::NoConversion { .. }));
    }

    struct Lying;

    impl Operation for Lying {
        const NAME: &'static str = "lying";
    }

    crate::declare_monoid!(Lying);

    // A raw definition whose producer disagrees with its declared
    // target type; only possible by bypassing declare_conversion!.
    inventory::submit! {
        crate::ConversionDef {
            op: <Lying as Operation>::op_id,
            target: std::any::TypeId::of::<u8>,
            target_name: || "u8",
            produce: || Box::new(0i32),
        }
    }

    #[test]
    fn mismatched_producer_is_surfaced() {
        let err = make_identity::<Lying>().convert::<u8>().unwrap_err();
        assert!(matches!(err, ConvertError::Mismatched { .. }));
    }
}
