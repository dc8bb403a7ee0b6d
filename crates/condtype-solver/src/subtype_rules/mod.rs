//! Assignability rules, one family per module. Each adds methods to
//! `SubtypeChecker` through its own `impl` block.

mod functions;
mod generics;
mod intrinsics;
mod objects;
mod tuples;
mod unions;

use crate::def::TypeResolver;
use crate::diagnostics::{SubtypeFailureReason, SubtypeTracer};
use crate::subtype::SubtypeChecker;
use crate::types::*;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    /// Rules for pairs of concrete (non-generic, non-union) shapes.
    pub(crate) fn check_structural<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        source_key: Option<&TypeData>,
        target: TypeId,
        target_key: Option<&TypeData>,
        tracer: &mut T,
    ) -> bool {
        if let Some(result) = self.check_primitive_target(source, source_key, target) {
            return result
                || tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                });
        }

        match (source_key, target_key) {
            (Some(TypeData::Object(source_shape)), Some(TypeData::Object(target_shape))) => {
                self.check_object(source, *source_shape, target, *target_shape, tracer)
            }
            (Some(TypeData::Function(source_shape)), Some(TypeData::Function(target_shape))) => {
                self.check_function(*source_shape, *target_shape, tracer)
            }
            (Some(TypeData::Array(source_element)), Some(TypeData::Array(target_element))) => {
                self.check_array(*source_element, *target_element, tracer)
            }
            (Some(TypeData::Tuple(source_list)), Some(TypeData::Array(target_element))) => {
                self.check_tuple_to_array(*source_list, *target_element, tracer)
            }
            (Some(TypeData::Tuple(source_list)), Some(TypeData::Tuple(target_list))) => {
                self.check_tuple(*source_list, *target_list, tracer)
            }
            (Some(TypeData::Array(_) | TypeData::Tuple(_)), Some(TypeData::Object(target_shape))) => {
                // Arrays only satisfy `{}` among object literal types.
                self.interner().object_shape(*target_shape).properties.is_empty()
                    || tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                        source_type: source,
                        target_type: target,
                    })
            }
            _ => tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                source_type: source,
                target_type: target,
            }),
        }
    }
}
