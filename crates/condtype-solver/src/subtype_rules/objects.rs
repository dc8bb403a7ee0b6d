//! Object width and depth subtyping.

use crate::def::TypeResolver;
use crate::diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::subtype::SubtypeChecker;
use crate::types::*;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    /// Every property of the target must be present in the source with an
    /// assignable type; extra source properties are allowed. An optional
    /// source property does not satisfy a required target property.
    pub(crate) fn check_object<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        source_shape: ObjectShapeId,
        target: TypeId,
        target_shape: ObjectShapeId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();
        let source_shape = interner.object_shape(source_shape);
        let target_shape = interner.object_shape(target_shape);

        for target_prop in &target_shape.properties {
            let Some(source_prop) = source_shape.property(target_prop.name) else {
                if target_prop.optional {
                    continue;
                }
                return tracer.on_mismatch(|| SubtypeFailureReason::MissingProperty {
                    property_name: target_prop.name,
                    source_type: source,
                    target_type: target,
                });
            };
            if source_prop.optional && !target_prop.optional {
                return tracer.on_mismatch(|| SubtypeFailureReason::OptionalPropertyRequired {
                    property_name: target_prop.name,
                });
            }
            let target_type = if target_prop.optional {
                interner.union2(target_prop.type_id, TypeId::UNDEFINED)
            } else {
                target_prop.type_id
            };
            if !self.is_subtype(source_prop.type_id, target_type, &mut FastTracer) {
                let name = target_prop.name;
                let source_property_type = source_prop.type_id;
                let target_property_type = target_prop.type_id;
                return tracer.on_mismatch(|| {
                    let mut nested = DiagnosticTracer::new();
                    self.is_subtype(source_property_type, target_type, &mut nested);
                    SubtypeFailureReason::PropertyTypeMismatch {
                        property_name: name,
                        source_property_type,
                        target_property_type,
                        nested_reason: nested.take_failure().map(Box::new),
                    }
                });
            }
        }
        true
    }
}
