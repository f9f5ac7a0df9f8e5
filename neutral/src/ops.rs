/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Built-in operations with pre-wired identities.
//!
//! The default set covers the common arithmetic, logical, and min/max
//! binary operators. All are genuine monoids, so the symmetric rule set
//! is installed for each. Conversions to concrete identity values are
//! declared for the primitive targets where the identity is well
//! defined; converting must never produce a wrong identity, so targets
//! without one (e.g. a signed all-ones mask) are simply absent.

use crate::Operation;
use crate::declare_conversion;
use crate::declare_monoid;

/// Addition.
pub struct Add;

impl Operation for Add {
    const NAME: &'static str = "add";
}

/// Multiplication.
pub struct Mul;

impl Operation for Mul {
    const NAME: &'static str = "mul";
}

/// Bitwise (or logical) AND.
pub struct BitAnd;

impl Operation for BitAnd {
    const NAME: &'static str = "bitand";
}

/// Bitwise (or logical) OR.
pub struct BitOr;

impl Operation for BitOr {
    const NAME: &'static str = "bitor";
}

/// Minimum.
pub struct Min;

impl Operation for Min {
    const NAME: &'static str = "min";
}

/// Maximum.
pub struct Max;

impl Operation for Max {
    const NAME: &'static str = "max";
}

declare_monoid!(Add);
declare_monoid!(Mul);
declare_monoid!(BitAnd);
declare_monoid!(BitOr);
declare_monoid!(Min);
declare_monoid!(Max);

declare_conversion!(Add, i32, 0i32);
declare_conversion!(Add, i64, 0i64);
declare_conversion!(Add, u32, 0u32);
declare_conversion!(Add, u64, 0u64);
declare_conversion!(Add, f32, 0.0f32);
declare_conversion!(Add, f64, 0.0f64);

declare_conversion!(Mul, i32, 1i32);
declare_conversion!(Mul, i64, 1i64);
declare_conversion!(Mul, u32, 1u32);
declare_conversion!(Mul, u64, 1u64);
declare_conversion!(Mul, f32, 1.0f32);
declare_conversion!(Mul, f64, 1.0f64);

declare_conversion!(BitAnd, bool, true);
declare_conversion!(BitAnd, u32, u32::MAX);
declare_conversion!(BitAnd, u64, u64::MAX);

declare_conversion!(BitOr, bool, false);
declare_conversion!(BitOr, u32, 0u32);
declare_conversion!(BitOr, u64, 0u64);

declare_conversion!(Min, i64, i64::MAX);
declare_conversion!(Min, u64, u64::MAX);
declare_conversion!(Min, f64, f64::INFINITY);

declare_conversion!(Max, i64, i64::MIN);
declare_conversion!(Max, u64, u64::MIN);
declare_conversion!(Max, f64, f64::NEG_INFINITY);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::has_identity;
    use crate::is_known;
    use crate::make_identity;

    #[test]
    fn the_default_set_is_pre_wired() {
        assert!(has_identity::<Add>());
        assert!(has_identity::<Mul>());
        assert!(has_identity::<BitAnd>());
        assert!(has_identity::<BitOr>());
        assert!(has_identity::<Min>());
        assert!(has_identity::<Max>());
    }

    #[test]
    fn factory_produces_known_sentinels_for_the_set() {
        assert!(is_known(&make_identity::<Add>()));
        assert!(is_known(&make_identity::<Mul>()));
        assert!(is_known(&make_identity::<BitAnd>()));
        assert!(is_known(&make_identity::<BitOr>()));
        assert!(is_known(&make_identity::<Min>()));
        assert!(is_known(&make_identity::<Max>()));
    }
}
