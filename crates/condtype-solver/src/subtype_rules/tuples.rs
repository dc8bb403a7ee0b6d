//! Array and tuple subtyping. Both are covariant in their elements.

use crate::def::TypeResolver;
use crate::diagnostics::{FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::subtype::SubtypeChecker;
use crate::types::*;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    pub(crate) fn check_array<T: SubtypeTracer>(
        &mut self,
        source_element: TypeId,
        target_element: TypeId,
        tracer: &mut T,
    ) -> bool {
        if self.is_subtype(source_element, target_element, &mut FastTracer) {
            return true;
        }
        tracer.on_mismatch(|| SubtypeFailureReason::ArrayElementMismatch {
            source_element,
            target_element,
        })
    }

    /// `[A, B]` is assignable to `T[]` when `A` and `B` are.
    pub(crate) fn check_tuple_to_array<T: SubtypeTracer>(
        &mut self,
        source_list: TupleListId,
        target_element: TypeId,
        tracer: &mut T,
    ) -> bool {
        let elements = self.interner().tuple_list(source_list);
        for element in elements.iter() {
            let source_element = self.element_type(element);
            if !self.is_subtype(source_element, target_element, &mut FastTracer) {
                return tracer.on_mismatch(|| SubtypeFailureReason::ArrayElementMismatch {
                    source_element,
                    target_element,
                });
            }
        }
        true
    }

    /// Tuples relate position by position. The source must cover every
    /// required target element and may not exceed the target's length unless
    /// the target ends in a rest element, which absorbs the remainder.
    pub(crate) fn check_tuple<T: SubtypeTracer>(
        &mut self,
        source_list: TupleListId,
        target_list: TupleListId,
        tracer: &mut T,
    ) -> bool {
        let interner = self.interner();
        let sources = interner.tuple_list(source_list);
        let targets = interner.tuple_list(target_list);

        let target_rest = targets.iter().position(|element| element.rest);
        let fixed_targets = target_rest.unwrap_or(targets.len());
        let required_targets = targets[..fixed_targets]
            .iter()
            .filter(|element| !element.optional)
            .count();
        let source_has_rest = sources.iter().any(|element| element.rest);
        let count_mismatch = sources.len() < required_targets
            || (target_rest.is_none() && (sources.len() > targets.len() || source_has_rest));
        if count_mismatch {
            return tracer.on_mismatch(|| SubtypeFailureReason::TupleElementMismatch {
                source_count: sources.len(),
                target_count: targets.len(),
            });
        }

        for (i, source) in sources.iter().enumerate() {
            let target = if i < fixed_targets {
                &targets[i]
            } else if let Some(rest) = target_rest {
                &targets[rest]
            } else {
                break;
            };
            if source.optional && !target.optional && !target.rest {
                return tracer.on_mismatch(|| SubtypeFailureReason::TupleElementMismatch {
                    source_count: sources.len(),
                    target_count: targets.len(),
                });
            }
            let source_element = if source.rest {
                source.type_id
            } else {
                self.element_type(source)
            };
            let target_element = if target.rest && !source.rest {
                self.element_type(target)
            } else {
                target.type_id
            };
            if !self.is_subtype(source_element, target_element, &mut FastTracer) {
                return tracer.on_mismatch(|| SubtypeFailureReason::TupleElementTypeMismatch {
                    index: i,
                    source_element,
                    target_element,
                });
            }
        }
        true
    }

    /// Element type of a tuple position; a rest position holds an array.
    fn element_type(&self, element: &TupleElement) -> TypeId {
        if element.rest
            && let Some(TypeData::Array(inner)) = self.interner().lookup(element.type_id)
        {
            return inner;
        }
        element.type_id
    }
}
