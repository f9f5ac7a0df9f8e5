/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The operation registry: per-operation combination rules.
//!
//! The registry is populated in two ways, both at setup time:
//!
//! - **Declaratively**, via [`declare_identity!`](crate::declare_identity),
//!   [`declare_monoid!`](crate::declare_monoid), and
//!   [`declare_conversion!`](crate::declare_conversion), which submit
//!   [`IdentityDef`]/[`ConversionDef`] entries collected at link time.
//!   Conflicts among collected definitions abort setup.
//! - **Imperatively**, via [`register`], [`register_monoid`],
//!   [`disambiguate`], and [`register_conversion`], which return
//!   [`RegistryError`] on conflicts.
//!
//! Once a program reaches steady state the registry is read-only;
//! dispatch takes the read lock and never mutates. All rule resolution
//! is determined by registration state, never by call order.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::RwLock;

use crate::combine::Value;
use crate::op::OpId;
use crate::op::Operation;

/// The type of error for setup-time registration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The operation is already registered with a different projection.
    #[error(
        "conflicting projection for operation `{op}`: registered `{existing}`, requested `{requested}`"
    )]
    ConflictingProjection {
        /// The operation being re-registered.
        op: OpId,
        /// Name of the projection already installed.
        existing: &'static str,
        /// Name of the projection in the rejected registration.
        requested: &'static str,
    },

    /// A disambiguation rule for this operand type is already installed.
    #[error("duplicate disambiguation of operation `{op}` for type `{target}`")]
    DuplicateDisambiguation {
        /// The operation being disambiguated.
        op: OpId,
        /// Display name of the operand type.
        target: &'static str,
    },

    /// A conversion to this target type is already installed.
    #[error("conflicting conversion for operation `{op}` to type `{target}`")]
    ConflictingConversion {
        /// The operation the conversion was declared for.
        op: OpId,
        /// Display name of the target type.
        target: &'static str,
    },

    /// The operation has no identity registration.
    #[error("operation `{op}` is not registered")]
    UnknownOperation {
        /// The unregistered operation.
        op: OpId,
    },
}

/// A named combination rule: how a known-identity sentinel absorbs the
/// first real operand.
///
/// The default, [`Projection::identity`], returns the operand itself.
/// Operations whose "absorb the seed" behavior must produce a derived
/// value instead (an append whose neutral combination wraps the operand
/// into a one-element container, say) supply their own.
///
/// The name is the unit of idempotency and conflict detection: function
/// values are not reliably comparable, so re-registering an operation
/// with a projection of the same name is a no-op, while a different
/// name is a configuration error.
#[derive(Clone, Copy)]
pub struct Projection {
    name: &'static str,
    apply: fn(Value) -> Value,
}

const IDENTITY_PROJECTION: &str = "identity";

fn passthrough(x: Value) -> Value {
    x
}

impl Projection {
    /// The default projection: the operand comes back out unchanged.
    pub const fn identity() -> Self {
        Self {
            name: IDENTITY_PROJECTION,
            apply: passthrough,
        }
    }

    /// A named projection applying `apply` to the first operand.
    pub const fn named(name: &'static str, apply: fn(Value) -> Value) -> Self {
        Self { name, apply }
    }

    /// The projection's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the projection to an operand.
    pub(crate) fn apply(&self, x: Value) -> Value {
        (self.apply)(x)
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Projection").field(&self.name).finish()
    }
}

/// A declaratively registered identity rule, collected at link time.
///
/// Prefer [`declare_identity!`](crate::declare_identity) and
/// [`declare_monoid!`](crate::declare_monoid) over constructing this
/// directly.
pub struct IdentityDef {
    /// Returns the operation's identifier.
    pub op: fn() -> OpId,
    /// Whether the full monoid rule set is installed.
    pub monoid: bool,
    /// The combination rule for the first operand.
    pub projection: Projection,
}

inventory::collect!(IdentityDef);

/// A declaratively registered sentinel conversion, collected at link
/// time.
///
/// Prefer [`declare_conversion!`](crate::declare_conversion) over
/// constructing this directly; the macro keeps the target type and the
/// produced value consistent.
pub struct ConversionDef {
    /// Returns the operation's identifier.
    pub op: fn() -> OpId,
    /// Returns the target type of the conversion.
    pub target: fn() -> TypeId,
    /// Display name of the target type.
    pub target_name: fn() -> &'static str,
    /// Produces the identity value for the target type.
    pub produce: fn() -> Value,
}

inventory::collect!(ConversionDef);

/// Per-operation rule set.
struct IdentityEntry {
    /// Whether the symmetric (two-sided) rules are installed.
    monoid: bool,
    /// The rule collapsing the sentinel into the first operand.
    projection: Projection,
    /// Operand types pinned to "return the non-sentinel operand",
    /// keyed by `TypeId` with the display name kept for diagnostics.
    disambiguated: HashMap<TypeId, &'static str>,
    /// Concrete identity values by target type.
    conversions: HashMap<TypeId, ConversionRule>,
}

struct ConversionRule {
    produce: Arc<dyn Fn() -> Value + Send + Sync>,
}

/// The process-wide registry. Seeded from link-time definitions on
/// first access; imperative registrations extend it under the write
/// lock.
static REGISTRY: LazyLock<RwLock<HashMap<OpId, IdentityEntry>>> = LazyLock::new(|| {
    let mut entries: HashMap<OpId, IdentityEntry> = HashMap::new();
    for def in inventory::iter::<IdentityDef> {
        let op = (def.op)();
        if let Err(err) = insert_rule(&mut entries, op, def.monoid, def.projection) {
            panic!("invalid declarative identity registration: {err}");
        }
    }
    for def in inventory::iter::<ConversionDef> {
        let op = (def.op)();
        let produce = def.produce;
        if let Err(err) = insert_conversion(
            &mut entries,
            op,
            (def.target)(),
            (def.target_name)(),
            Arc::new(move || produce()),
        ) {
            panic!("invalid declarative conversion registration: {err}");
        }
    }
    tracing::debug!(operations = entries.len(), "identity registry initialized");
    RwLock::new(entries)
});

fn insert_rule(
    entries: &mut HashMap<OpId, IdentityEntry>,
    op: OpId,
    monoid: bool,
    projection: Projection,
) -> Result<(), RegistryError> {
    match entries.entry(op) {
        Entry::Vacant(slot) => {
            slot.insert(IdentityEntry {
                monoid,
                projection,
                disambiguated: HashMap::new(),
                conversions: HashMap::new(),
            });
            Ok(())
        }
        Entry::Occupied(mut slot) => {
            let existing = slot.get().projection.name();
            if existing != projection.name() {
                return Err(RegistryError::ConflictingProjection {
                    op,
                    existing,
                    requested: projection.name(),
                });
            }
            // Monoid registration strictly adds rules over an identical
            // plain registration; the reverse direction is a no-op.
            slot.get_mut().monoid |= monoid;
            Ok(())
        }
    }
}

fn insert_conversion(
    entries: &mut HashMap<OpId, IdentityEntry>,
    op: OpId,
    target: TypeId,
    target_name: &'static str,
    produce: Arc<dyn Fn() -> Value + Send + Sync>,
) -> Result<(), RegistryError> {
    let entry = entries
        .get_mut(&op)
        .ok_or(RegistryError::UnknownOperation { op })?;
    match entry.conversions.entry(target) {
        Entry::Vacant(slot) => {
            slot.insert(ConversionRule { produce });
            Ok(())
        }
        Entry::Occupied(_) => Err(RegistryError::ConflictingConversion {
            op,
            target: target_name,
        }),
    }
}

/// Declare that `O` has a known (left) identity, with the default
/// pass-through projection.
///
/// Repeating an identical registration is idempotent.
pub fn register<O: Operation>() -> Result<(), RegistryError> {
    register_with::<O>(Projection::identity())
}

/// Declare that `O` has a known (left) identity whose combination rule
/// applies `projection` to the first operand.
///
/// Registering a different projection for an already-registered
/// operation is a configuration error, reported rather than silently
/// overwritten.
pub fn register_with<O: Operation>(projection: Projection) -> Result<(), RegistryError> {
    let op = OpId::of::<O>();
    insert_rule(&mut REGISTRY.write().unwrap(), op, false, projection)?;
    tracing::debug!(op = %op, projection = projection.name(), "registered identity");
    Ok(())
}

/// Declare that `O` is associative with a two-sided identity,
/// installing the symmetric rule set: sentinel combined with sentinel
/// stays the sentinel, and the sentinel collapses to the other operand
/// on either side.
pub fn register_monoid<O: Operation>() -> Result<(), RegistryError> {
    let op = OpId::of::<O>();
    insert_rule(&mut REGISTRY.write().unwrap(), op, true, Projection::identity())?;
    tracing::debug!(op = %op, "registered monoid identity");
    Ok(())
}

/// Pin combination of `O`'s sentinel with operands of type `T` to
/// "return the non-sentinel operand", taking precedence over the
/// operation's generic projection.
///
/// This resolves the overlap that arises when `O` already has a
/// specialized rule for `T` that the generic wildcard rule would also
/// match. Disambiguating a type with no actual overlap is harmless;
/// doing so twice for the same type is a configuration error.
pub fn disambiguate<O: Operation, T: Any>() -> Result<(), RegistryError> {
    let op = OpId::of::<O>();
    let target = std::any::type_name::<T>();
    {
        let mut entries = REGISTRY.write().unwrap();
        let entry = entries
            .get_mut(&op)
            .ok_or(RegistryError::UnknownOperation { op })?;
        match entry.disambiguated.entry(TypeId::of::<T>()) {
            Entry::Vacant(slot) => {
                slot.insert(target);
            }
            Entry::Occupied(_) => {
                return Err(RegistryError::DuplicateDisambiguation { op, target });
            }
        }
    }
    tracing::debug!(op = %op, target, "disambiguated identity rule");
    Ok(())
}

/// Associate a concrete identity value of type `T` with `O`, making
/// the operation's sentinel convertible via
/// [`convert`](crate::convert).
///
/// The operation must already be registered. A second conversion for
/// the same target type is a configuration error.
pub fn register_conversion<O: Operation, T: Any + Send>(
    produce: fn() -> T,
) -> Result<(), RegistryError> {
    let op = OpId::of::<O>();
    let target = std::any::type_name::<T>();
    insert_conversion(
        &mut REGISTRY.write().unwrap(),
        op,
        TypeId::of::<T>(),
        target,
        Arc::new(move || Box::new(produce()) as Value),
    )?;
    tracing::debug!(op = %op, target, "registered identity conversion");
    Ok(())
}

/// True iff `O` has a registered identity.
pub fn has_identity<O: Operation>() -> bool {
    has_identity_for(OpId::of::<O>())
}

/// Value-level form of [`has_identity`]. Pure query, no side effects.
pub fn has_identity_for(op: OpId) -> bool {
    REGISTRY.read().unwrap().contains_key(&op)
}

/// The dispatch decision for combining `op`'s sentinel with an operand
/// of the given type. Fully determined by registration state.
pub(crate) struct ResolvedRule {
    pub(crate) monoid: bool,
    /// The operand type was explicitly disambiguated.
    pub(crate) pinned: bool,
    pub(crate) projection: Projection,
}

pub(crate) fn resolve(op: OpId, rhs: TypeId) -> Option<ResolvedRule> {
    let entries = REGISTRY.read().unwrap();
    let entry = entries.get(&op)?;
    Some(ResolvedRule {
        monoid: entry.monoid,
        pinned: entry.disambiguated.contains_key(&rhs),
        projection: entry.projection,
    })
}

pub(crate) fn conversion(op: OpId, target: TypeId) -> Option<Arc<dyn Fn() -> Value + Send + Sync>> {
    let entries = REGISTRY.read().unwrap();
    entries
        .get(&op)?
        .conversions
        .get(&target)
        .map(|rule| Arc::clone(&rule.produce))
}

/// Declare a (left) identity rule for an operation at link time.
///
/// `declare_identity!(Op)` installs the default pass-through rule;
/// `declare_identity!(Op, projection)` installs a custom
/// [`Projection`](crate::Projection).
#[macro_export]
macro_rules! declare_identity {
    ($op:ty) => {
        $crate::declare_identity!($op, $crate::Projection::identity());
    };
    ($op:ty, $projection:expr) => {
        $crate::submit! {
            $crate::IdentityDef {
                op: <$op as $crate::Operation>::op_id,
                monoid: false,
                projection: $projection,
            }
        }
    };
}

/// Declare the full monoid rule set for an operation at link time.
#[macro_export]
macro_rules! declare_monoid {
    ($op:ty) => {
        $crate::submit! {
            $crate::IdentityDef {
                op: <$op as $crate::Operation>::op_id,
                monoid: true,
                projection: $crate::Projection::identity(),
            }
        }
    };
}

/// Declare, at link time, the concrete identity value an operation's
/// sentinel converts to for a given target type.
#[macro_export]
macro_rules! declare_conversion {
    ($op:ty, $target:ty, $value:expr) => {
        $crate::submit! {
            $crate::ConversionDef {
                op: <$op as $crate::Operation>::op_id,
                target: ::std::any::TypeId::of::<$target>,
                target_name: ::std::any::type_name::<$target>,
                produce: || ::std::boxed::Box::new($value),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;

    #[test]
    fn register_is_idempotent() {
        struct Twice;

        impl Operation for Twice {
            const NAME: &'static str = "twice";
        }

        register::<Twice>().unwrap();
        register::<Twice>().unwrap();
        assert!(has_identity::<Twice>());
    }

    #[test]
    fn conflicting_projection_is_rejected() {
        struct Contested;

        impl Operation for Contested {
            const NAME: &'static str = "contested";
        }

        register::<Contested>().unwrap();
        let err = register_with::<Contested>(Projection::named("wrap", |x| x)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ConflictingProjection {
                existing: "identity",
                requested: "wrap",
                ..
            }
        ));
    }

    #[test]
    fn monoid_upgrade_is_permitted() {
        struct Upgraded;

        impl Operation for Upgraded {
            const NAME: &'static str = "upgraded";
        }

        register::<Upgraded>().unwrap();
        register_monoid::<Upgraded>().unwrap();
        // And the downgrade direction is a no-op, not an error.
        register::<Upgraded>().unwrap();
        let rule = resolve(
            OpId::of::<Upgraded>(),
            std::any::TypeId::of::<i64>(),
        )
        .unwrap();
        assert!(rule.monoid);
    }

    #[test]
    fn monoid_over_custom_projection_is_rejected() {
        struct Wrapping;

        impl Operation for Wrapping {
            const NAME: &'static str = "wrapping";
        }

        register_with::<Wrapping>(Projection::named("wrap", |x| x)).unwrap();
        let err = register_monoid::<Wrapping>().unwrap_err();
        assert!(matches!(err, RegistryError::ConflictingProjection { .. }));
    }

    #[test]
    fn disambiguate_requires_registration() {
        struct Absent;

        impl Operation for Absent {
            const NAME: &'static str = "absent";
        }

        let err = disambiguate::<Absent, String>().unwrap_err();
        assert!(matches!(err, RegistryError::UnknownOperation { .. }));
    }

    #[test]
    fn duplicate_disambiguation_is_rejected() {
        struct Pinned;

        impl Operation for Pinned {
            const NAME: &'static str = "pinned";
        }

        register_monoid::<Pinned>().unwrap();
        // First registration is harmless even with no real overlap.
        disambiguate::<Pinned, String>().unwrap();
        let err = disambiguate::<Pinned, String>().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateDisambiguation { .. }
        ));
        // A different operand type is a fresh registration.
        disambiguate::<Pinned, u8>().unwrap();
    }

    #[test]
    fn duplicate_conversion_is_rejected() {
        struct Converted;

        impl Operation for Converted {
            const NAME: &'static str = "converted";
        }

        register_monoid::<Converted>().unwrap();
        register_conversion::<Converted, i64>(|| 0).unwrap();
        let err = register_conversion::<Converted, i64>(|| 1).unwrap_err();
        assert!(matches!(err, RegistryError::ConflictingConversion { .. }));
    }

    #[test]
    fn conversion_requires_registration() {
        struct Bare;

        impl Operation for Bare {
            const NAME: &'static str = "bare";
        }

        let err = register_conversion::<Bare, i64>(|| 0).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownOperation { .. }));
    }

    struct Tally;

    impl Operation for Tally {
        const NAME: &'static str = "tally";
    }

    crate::declare_identity!(Tally);

    struct Gather;

    impl Operation for Gather {
        const NAME: &'static str = "gather";
    }

    fn gather_one(x: crate::Value) -> crate::Value {
        Box::new(vec![x])
    }

    crate::declare_identity!(Gather, Projection::named("gather-one", gather_one));

    #[test]
    fn declarative_identities_are_seeded() {
        assert!(has_identity::<Tally>());
        assert!(has_identity::<Gather>());
        // One-sided declarations do not install the monoid rules.
        let rule = resolve(OpId::of::<Tally>(), TypeId::of::<i64>()).unwrap();
        assert!(!rule.monoid);
        let rule = resolve(OpId::of::<Gather>(), TypeId::of::<i64>()).unwrap();
        assert_eq!(rule.projection.name(), "gather-one");
    }

    #[test]
    fn builtins_are_seeded_declaratively() {
        assert!(has_identity::<ops::Add>());
        assert!(has_identity::<ops::Mul>());
        assert!(has_identity::<ops::BitAnd>());
        assert!(has_identity::<ops::BitOr>());
        assert!(has_identity::<ops::Min>());
        assert!(has_identity::<ops::Max>());
    }

    #[test]
    fn has_identity_is_false_for_arbitrary_ops() {
        struct AdHoc;

        impl Operation for AdHoc {
            const NAME: &'static str = "ad-hoc";
        }

        assert!(!has_identity::<AdHoc>());
        assert!(!has_identity_for(OpId::of::<AdHoc>()));
    }
}
