//! Variance calculation for type parameters.
//!
//! Variance determines how assignability of two instantiations of the same
//! alias follows from assignability of their arguments:
//!
//! - **Covariant**: `Box<Dog>` <: `Box<Animal>` if `Dog` <: `Animal`
//! - **Contravariant**: `Writer<Animal>` <: `Writer<Dog>` if `Dog` <: `Animal`
//! - **Invariant**: arguments must be identical
//! - **Independent**: the parameter is unused and places no requirement
//!
//! A parameter that appears in the check or extends position of a conditional
//! type is invariant, whatever the shape of the branches:
//!
//! ```typescript
//! interface Covariant<T> { foo: T extends string ? T : number }
//! // Covariant<A> and Covariant<B> are unrelated unless A and B are identical.
//! ```
//!
//! Cycle detection uses `(TypeId, polarity)` pairs so recursive bodies
//! terminate.

use crate::db::TypeDatabase;
use crate::def::{DefId, TypeResolver};
use crate::types::*;
use bitflags::bitflags;
use condtype_common::interner::Atom;
use condtype_common::limits::MAX_VARIANCE_DEPTH;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::trace;

bitflags! {
    /// Variance of a type parameter.
    ///
    /// Empty is independent; both bits set is invariant.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Variance: u8 {
        const COVARIANT = 1 << 0;
        const CONTRAVARIANT = 1 << 1;
        const INVARIANT = Self::COVARIANT.bits() | Self::CONTRAVARIANT.bits();
    }
}

impl Variance {
    #[inline]
    pub const fn is_independent(self) -> bool {
        self.is_empty()
    }

    #[inline]
    pub fn is_invariant(self) -> bool {
        self.contains(Self::INVARIANT)
    }

    /// Covariant only.
    #[inline]
    pub fn is_covariant(self) -> bool {
        self == Self::COVARIANT
    }

    /// Contravariant only.
    #[inline]
    pub fn is_contravariant(self) -> bool {
        self == Self::CONTRAVARIANT
    }
}

/// Compute the variance of the parameter named `target_param` within `type_id`.
pub fn compute_variance(db: &dyn TypeDatabase, type_id: TypeId, target_param: Atom) -> Variance {
    let mut visitor = VarianceVisitor {
        db,
        target_param,
        result: Variance::empty(),
        visiting: FxHashSet::default(),
        depth: 0,
    };
    visitor.visit(type_id, true);
    visitor.result
}

/// Per-parameter variance of a generic definition, computed once and cached
/// in the resolver.
pub fn definition_variance<R: TypeResolver>(
    db: &dyn TypeDatabase,
    resolver: &R,
    def_id: DefId,
) -> Option<Arc<[Variance]>> {
    if let Some(cached) = resolver.get_variance(def_id) {
        return Some(cached);
    }
    let params = resolver.get_lazy_type_params(def_id)?;
    let body = resolver.resolve_lazy(def_id, db)?;
    let variance: Arc<[Variance]> = params
        .iter()
        .map(|param| compute_variance(db, body, param.name))
        .collect();
    trace!(def_id = def_id.0, ?variance, "definition_variance computed");
    resolver.store_variance(def_id, variance.clone());
    Some(variance)
}

struct VarianceVisitor<'a> {
    db: &'a dyn TypeDatabase,
    target_param: Atom,
    result: Variance,
    /// `true` polarity is covariant.
    visiting: FxHashSet<(TypeId, bool)>,
    depth: u32,
}

impl VarianceVisitor<'_> {
    fn add_occurrence(&mut self, polarity: bool) {
        if polarity {
            self.result |= Variance::COVARIANT;
        } else {
            self.result |= Variance::CONTRAVARIANT;
        }
    }

    /// Visit in both polarities: any occurrence below is invariant.
    fn visit_invariant(&mut self, type_id: TypeId) {
        self.visit(type_id, true);
        self.visit(type_id, false);
    }

    fn visit(&mut self, type_id: TypeId, polarity: bool) {
        if type_id.is_intrinsic() || self.result.is_invariant() {
            return;
        }
        if self.depth >= MAX_VARIANCE_DEPTH {
            // Unmeasurable: assume the strictest answer.
            self.result = Variance::INVARIANT;
            return;
        }
        if !self.visiting.insert((type_id, polarity)) {
            return;
        }
        let Some(key) = self.db.lookup(type_id) else {
            self.visiting.remove(&(type_id, polarity));
            return;
        };
        self.depth += 1;

        match key {
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) | TypeData::Error => {}
            TypeData::TypeParameter(info) | TypeData::Infer(info) => {
                if info.name == self.target_param {
                    self.add_occurrence(polarity);
                }
            }
            TypeData::Object(shape_id) => {
                let shape = self.db.object_shape(shape_id);
                for prop in &shape.properties {
                    self.visit(prop.type_id, polarity);
                }
            }
            TypeData::Array(element) => self.visit(element, polarity),
            TypeData::Tuple(list_id) => {
                for element in self.db.tuple_list(list_id).iter() {
                    self.visit(element.type_id, polarity);
                }
            }
            TypeData::Union(list_id) | TypeData::Intersection(list_id) => {
                for &member in self.db.type_list(list_id).iter() {
                    self.visit(member, polarity);
                }
            }
            TypeData::Function(shape_id) => {
                let shape = self.db.function_shape(shape_id);
                for param in &shape.params {
                    self.visit(param.type_id, !polarity);
                }
                self.visit(shape.return_type, polarity);
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.db.conditional_type(cond_id);
                self.visit_invariant(cond.check_type);
                self.visit_invariant(cond.extends_type);
                self.visit(cond.true_type, polarity);
                self.visit(cond.false_type, polarity);
            }
            TypeData::IndexAccess(object, index) => {
                self.visit_invariant(object);
                self.visit_invariant(index);
            }
            TypeData::KeyOf(operand) => self.visit(operand, !polarity),
            TypeData::Mapped(mapped_id) => {
                let mapped = self.db.mapped_type(mapped_id);
                self.visit_invariant(mapped.constraint);
                self.visit(mapped.template, polarity);
            }
            TypeData::Application(app_id) => {
                // Without the base definition's own variance the safe answer
                // is invariance.
                let app = self.db.type_application(app_id);
                for &arg in &app.args {
                    self.visit_invariant(arg);
                }
            }
        }

        self.depth -= 1;
        self.visiting.remove(&(type_id, polarity));
    }
}

#[cfg(test)]
#[path = "../tests/variance_tests.rs"]
mod tests;
