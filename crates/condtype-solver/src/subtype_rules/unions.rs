//! Union and intersection rules.

use crate::def::TypeResolver;
use crate::diagnostics::{FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::subtype::SubtypeChecker;
use crate::types::*;
use std::sync::Arc;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    /// Every member of the source union must be assignable.
    pub(crate) fn check_union_source<T: SubtypeTracer>(
        &mut self,
        list_id: TypeListId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        let members = self.interner().type_list(list_id);
        members
            .iter()
            .all(|&member| self.is_subtype(member, target, tracer))
    }

    /// Some member of the target union must accept the source.
    pub(crate) fn check_union_target<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        list_id: TypeListId,
        tracer: &mut T,
    ) -> bool {
        let members = self.interner().type_list(list_id);
        if members
            .iter()
            .any(|&member| self.is_subtype(source, member, &mut FastTracer))
        {
            return true;
        }
        tracer.on_mismatch(|| SubtypeFailureReason::NoUnionMemberMatches {
            source_type: source,
            target_union_members: members.to_vec(),
        })
    }

    pub(crate) fn check_intersection_target<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        list_id: TypeListId,
        tracer: &mut T,
    ) -> bool {
        let members = self.interner().type_list(list_id);
        members
            .iter()
            .all(|&member| self.is_subtype(source, member, tracer))
    }

    /// An intersection is assignable when one of its members is, or when its
    /// object members merged together are.
    pub(crate) fn check_intersection_source<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        list_id: TypeListId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();
        let members = interner.type_list(list_id);
        if members
            .iter()
            .any(|&member| self.is_subtype(member, target, &mut FastTracer))
        {
            return true;
        }

        let objects: Vec<Arc<ObjectShape>> = members
            .iter()
            .filter_map(|&member| match interner.lookup(member) {
                Some(TypeData::Object(shape_id)) => Some(interner.object_shape(shape_id)),
                _ => None,
            })
            .collect();
        if objects.len() > 1 {
            let merged = interner.merge_object_shapes(&objects);
            return self.is_subtype(merged, target, tracer);
        }
        tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
            source_type: source,
            target_type: target,
        })
    }
}
