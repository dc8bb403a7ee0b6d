//! Function signature subtyping.

use crate::def::TypeResolver;
use crate::diagnostics::{FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::subtype::SubtypeChecker;
use crate::types::*;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    /// Parameters are contravariant (bivariant without
    /// `strictFunctionTypes`), return types covariant. A source may take
    /// fewer parameters than the target but not require more. A `void`
    /// target return accepts any source return.
    pub(crate) fn check_function<T: SubtypeTracer>(
        &mut self,
        source_shape: FunctionShapeId,
        target_shape: FunctionShapeId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();
        let source = interner.function_shape(source_shape);
        let target = interner.function_shape(target_shape);

        let target_has_rest = target.params.iter().any(|param| param.rest);
        let source_required = source
            .params
            .iter()
            .filter(|param| !param.optional && !param.rest)
            .count();
        if !target_has_rest && source_required > target.params.len() {
            return tracer.on_mismatch(|| SubtypeFailureReason::TooManyParameters {
                source_count: source_required,
                target_count: target.params.len(),
            });
        }

        for (i, source_param) in source.params.iter().enumerate() {
            let Some(target_type) = self.param_type_at(&target.params, i) else {
                break;
            };
            let source_type = match self.param_type_at(&source.params, i) {
                Some(source_type) if source_param.rest => source_type,
                _ => source_param.type_id,
            };
            let related = self.is_subtype(target_type, source_type, &mut FastTracer)
                || (!self.strict_function_types
                    && self.is_subtype(source_type, target_type, &mut FastTracer));
            if !related {
                return tracer.on_mismatch(|| SubtypeFailureReason::ParameterTypeMismatch {
                    param_index: i,
                    source_param: source_type,
                    target_param: target_type,
                });
            }
            if source_param.rest {
                break;
            }
        }

        if target.return_type == TypeId::VOID {
            return true;
        }
        if self.is_subtype(source.return_type, target.return_type, &mut FastTracer) {
            return true;
        }
        tracer.on_mismatch(|| SubtypeFailureReason::ReturnTypeMismatch {
            source_return: source.return_type,
            target_return: target.return_type,
        })
    }

    /// Type of the argument at `index`, reading through a trailing rest
    /// parameter's array element type.
    fn param_type_at(&self, params: &[ParamInfo], index: usize) -> Option<TypeId> {
        if let Some(param) = params.get(index)
            && !param.rest
        {
            return Some(param.type_id);
        }
        let rest = params.iter().find(|param| param.rest)?;
        match self.interner().lookup(rest.type_id) {
            Some(TypeData::Array(element)) => Some(element),
            _ => Some(rest.type_id),
        }
    }
}
