/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Generic identity-element sentinels for seeding folds.
//!
//! This crate provides a universal "no seed yet" marker that generic
//! reduction code can use in place of an operation-specific zero or one.
//! A sentinel obtained for an operation acts as that operation's left
//! identity: combining it with any right-hand value yields that value
//! unchanged, whatever its type. The sentinel collapses on the first
//! real element and never survives past it.
//!
//! # Quick Start
//!
//! ```
//! use neutral::combine;
//! use neutral::make_identity;
//! use neutral::ops::Add;
//!
//! // A sentinel seed for addition: combining it with the first real
//! // element yields that element unchanged.
//! let seed = make_identity::<Add>();
//! assert!(seed.is_known());
//! assert_eq!(combine(&seed, 41i64).unwrap(), 41);
//!
//! // Seed transparency: folding from the sentinel equals folding from
//! // the first element.
//! let mut items = [1i64, 2, 3].into_iter();
//! let first = combine(&seed, items.next().unwrap()).unwrap();
//! let total = items.fold(first, |acc, x| acc + x);
//! assert_eq!(total, 6);
//! ```
//!
//! # Core Concepts
//!
//! - **[`Operation`]**: a zero-sized marker type identifying a binary
//!   (or binary-shaped) operation. The operation itself is never called
//!   by this crate; the marker is a pure dispatch tag.
//!
//! - **[`IdentityValue`]**: the sentinel. The [`make_identity`] factory
//!   returns the known variant for registered operations and the
//!   unknown variant (diagnostics only) otherwise.
//!
//! - **Registry**: per-operation combination rules, installed at setup
//!   time ([`register`], [`register_monoid`], [`disambiguate`]) or
//!   declaratively at link time ([`declare_identity!`],
//!   [`declare_monoid!`]), and read-only once the program reaches
//!   steady state. The built-in arithmetic, logical, and min/max
//!   operations in [`ops`] come pre-wired.
//!
//! - **[`combine`]**: the entry point a fold invokes while its
//!   accumulator is still the seed. For a known sentinel the operand
//!   comes back out; for an unknown sentinel there is no rule and a
//!   descriptive error is returned, never a silently wrong value.
//!
//! # Custom operations
//!
//! ```
//! use neutral::Operation;
//!
//! struct Concat;
//!
//! impl Operation for Concat {
//!     const NAME: &'static str = "concat";
//! }
//!
//! assert!(!neutral::has_identity::<Concat>());
//! neutral::register_monoid::<Concat>().unwrap();
//! assert!(neutral::has_identity::<Concat>());
//!
//! // Monoid registration installs the right-identity rule too.
//! let seed = neutral::make_identity::<Concat>();
//! let s = neutral::combine_right("hello".to_string(), &seed).unwrap();
//! assert_eq!(s, "hello");
//! ```
//!
//! # Conversions
//!
//! A known sentinel can be converted to the concrete identity value
//! registered for a target type. This is a per-target capability layered
//! on top of dispatch, not part of it:
//!
//! ```
//! use neutral::make_identity;
//! use neutral::ops::Add;
//! use neutral::ops::Mul;
//!
//! let one: f64 = make_identity::<Mul>().convert().unwrap();
//! assert_eq!(one, 1.0);
//! let zero: i64 = make_identity::<Add>().convert().unwrap();
//! assert_eq!(zero, 0);
//! ```

mod combine;
mod convert;
mod op;
pub mod ops;
mod registry;
mod sentinel;

pub use combine::CombineError;
pub use combine::Value;
pub use combine::combine;
pub use combine::combine_right;
pub use combine::combine_value;
pub use convert::ConvertError;
pub use convert::convert;
pub use op::OpId;
pub use op::Operation;
pub use registry::ConversionDef;
pub use registry::IdentityDef;
pub use registry::Projection;
pub use registry::RegistryError;
pub use registry::disambiguate;
pub use registry::has_identity;
pub use registry::has_identity_for;
pub use registry::register;
pub use registry::register_conversion;
pub use registry::register_monoid;
pub use registry::register_with;
pub use sentinel::IdentityValue;
pub use sentinel::KnownIdentity;
pub use sentinel::UnknownIdentity;
pub use sentinel::is_known;
pub use sentinel::make_identity;
pub use sentinel::make_identity_for;

// Re-export inventory::submit for the declare_*! macros
#[doc(hidden)]
pub use inventory::submit;
