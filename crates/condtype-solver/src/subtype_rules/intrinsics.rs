//! Intrinsic and primitive rules.

use crate::def::TypeResolver;
use crate::subtype::SubtypeChecker;
use crate::types::*;

impl<R: TypeResolver> SubtypeChecker<'_, '_, R> {
    /// Decide pairs involving top, bottom and error types, and pairs of two
    /// intrinsics, without looking at structure. `None` means structure
    /// decides.
    pub(crate) fn check_intrinsic_pair(&self, source: TypeId, target: TypeId) -> Option<bool> {
        if source.is_error() || target.is_error() {
            return Some(false);
        }
        if target.is_any_or_unknown() {
            return Some(true);
        }
        if source.is_any() {
            return Some(!target.is_never());
        }
        if source.is_never() {
            return Some(true);
        }
        if source.is_unknown() || target.is_never() {
            return Some(false);
        }
        if source.is_intrinsic() && target.is_intrinsic() {
            return Some(matches!(
                (source, target),
                (TypeId::BOOLEAN_TRUE | TypeId::BOOLEAN_FALSE, TypeId::BOOLEAN)
                    | (TypeId::UNDEFINED, TypeId::VOID)
                    | (TypeId::FUNCTION, TypeId::OBJECT)
            ));
        }
        None
    }

    /// Targets that are primitives or the `object`/`Function`/`{}` types.
    /// `None` when neither applies.
    pub(crate) fn check_primitive_target(
        &self,
        source: TypeId,
        source_key: Option<&TypeData>,
        target: TypeId,
    ) -> Option<bool> {
        let interner = self.interner();
        match target {
            TypeId::STRING | TypeId::NUMBER | TypeId::BIGINT | TypeId::BOOLEAN => {
                let primitive = match source_key {
                    Some(TypeData::Literal(LiteralValue::String(_))) => TypeId::STRING,
                    Some(TypeData::Literal(LiteralValue::Number(_))) => TypeId::NUMBER,
                    Some(TypeData::Literal(LiteralValue::BigInt(_))) => TypeId::BIGINT,
                    Some(TypeData::Literal(LiteralValue::Boolean(_))) => TypeId::BOOLEAN,
                    _ => return Some(false),
                };
                return Some(primitive == target);
            }
            TypeId::OBJECT => {
                return Some(matches!(
                    source_key,
                    Some(
                        TypeData::Object(_)
                            | TypeData::Array(_)
                            | TypeData::Tuple(_)
                            | TypeData::Function(_)
                            | TypeData::Mapped(_)
                    )
                ));
            }
            TypeId::FUNCTION => {
                return Some(matches!(source_key, Some(TypeData::Function(_))));
            }
            _ if target.is_intrinsic() => return Some(false),
            _ => {}
        }

        // `{}` accepts everything except `null`, `undefined` and `void`.
        if let Some(TypeData::Object(shape_id)) = interner.lookup(target)
            && interner.object_shape(shape_id).properties.is_empty()
        {
            return Some(!matches!(
                source,
                TypeId::NULL | TypeId::UNDEFINED | TypeId::VOID
            ));
        }
        if source.is_intrinsic() || matches!(source_key, Some(TypeData::Literal(_))) {
            return Some(false);
        }
        None
    }
}
