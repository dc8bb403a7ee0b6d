//! Solver diagnostics.
//!
//! Most assignability checks are tentative: the false test of a conditional
//! or one member of a union target. Their failures are thrown away, so
//! nothing is formatted while checking. A failure is kept as a
//! `PendingDiagnostic` holding `TypeId`s and atoms, and it becomes text only
//! in [`PendingDiagnostic::render`].
//!
//! Relation rules report mismatches through a [`SubtypeTracer`]. The boolean
//! path uses [`FastTracer`], which never builds a reason. The explanation path
//! uses [`DiagnosticTracer`], which keeps the first one.

use crate::format::TypeFormatter;
use crate::types::TypeId;
use crate::variance::Variance;
use condtype_common::diagnostics::{
    Diagnostic, DiagnosticCategory, format_message, get_message_template,
};
use condtype_common::interner::Atom;
use std::sync::Arc;

/// Diagnostic codes used by the solver.
pub mod codes {
    use condtype_common::diagnostics::diagnostic_codes;

    pub const TYPE_NOT_ASSIGNABLE: u32 = diagnostic_codes::TYPE_NOT_ASSIGNABLE_TO_TYPE;
    pub const PROPERTY_TYPE_MISMATCH: u32 = diagnostic_codes::TYPES_OF_PROPERTY_INCOMPATIBLE;
    pub const PROPERTY_MISSING: u32 = diagnostic_codes::PROPERTY_MISSING_IN_TYPE;
    pub const EXCESSIVELY_DEEP: u32 = diagnostic_codes::TYPE_INSTANTIATION_EXCESSIVELY_DEEP;
    pub const INFER_NOT_INFERRED: u32 = diagnostic_codes::INFER_TYPE_NOT_INFERRED;
}

// =============================================================================
// Tracers
// =============================================================================

/// Sink for relation mismatches. The reason is built only if the tracer
/// asks for it. Returning `false` stops the check.
pub trait SubtypeTracer {
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool;
}

#[derive(Clone, Copy, Debug)]
pub struct FastTracer;

impl SubtypeTracer for FastTracer {
    #[inline(always)]
    fn on_mismatch(&mut self, _: impl FnOnce() -> SubtypeFailureReason) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct DiagnosticTracer {
    first: Option<SubtypeFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_failure(&mut self) -> Option<SubtypeFailureReason> {
        self.first.take()
    }

    pub fn has_failure(&self) -> bool {
        self.first.is_some()
    }
}

impl SubtypeTracer for DiagnosticTracer {
    #[inline]
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool {
        self.first.get_or_insert_with(reason);
        false
    }
}

/// Detailed reason for a failed assignability check.
#[derive(Clone, Debug, PartialEq)]
pub enum SubtypeFailureReason {
    MissingProperty {
        property_name: Atom,
        source_type: TypeId,
        target_type: TypeId,
    },
    PropertyTypeMismatch {
        property_name: Atom,
        source_property_type: TypeId,
        target_property_type: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// Optional property cannot satisfy required property.
    OptionalPropertyRequired { property_name: Atom },
    ReturnTypeMismatch {
        source_return: TypeId,
        target_return: TypeId,
    },
    ParameterTypeMismatch {
        param_index: usize,
        source_param: TypeId,
        target_param: TypeId,
    },
    TooManyParameters {
        source_count: usize,
        target_count: usize,
    },
    TupleElementMismatch {
        source_count: usize,
        target_count: usize,
    },
    TupleElementTypeMismatch {
        index: usize,
        source_element: TypeId,
        target_element: TypeId,
    },
    ArrayElementMismatch {
        source_element: TypeId,
        target_element: TypeId,
    },
    NoUnionMemberMatches {
        source_type: TypeId,
        target_union_members: Vec<TypeId>,
    },
    /// Two instantiations of the same alias whose arguments violate the
    /// parameter's variance. Invariant parameters (those used in the check or
    /// extends position of a conditional type) require identical arguments.
    AliasArgumentMismatch {
        param_index: usize,
        source_arg: TypeId,
        target_arg: TypeId,
        variance: Variance,
    },
    TypeMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
    /// The error marker is related to nothing but itself.
    ErrorType {
        source_type: TypeId,
        target_type: TypeId,
    },
    RecursionLimitExceeded,
}

// =============================================================================
// Lazy Diagnostic Arguments
// =============================================================================

/// Argument for a diagnostic message template.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagnosticArg {
    /// A type reference (formatted via `TypeFormatter`)
    Type(TypeId),
    Atom(Atom),
    String(Arc<str>),
    Number(usize),
}

macro_rules! impl_from_diagnostic_arg {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for DiagnosticArg {
            fn from(v: $source) -> Self { Self::$variant(v) }
        })*
    };
}

impl_from_diagnostic_arg! {
    TypeId => Type,
    Atom   => Atom,
    usize  => Number,
}

impl From<&str> for DiagnosticArg {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for DiagnosticArg {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

/// A diagnostic that hasn't been rendered yet.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDiagnostic {
    pub code: u32,
    pub args: Vec<DiagnosticArg>,
    pub category: DiagnosticCategory,
    /// Elaborations rendered as indented follow-up lines.
    pub related: Vec<PendingDiagnostic>,
}

impl PendingDiagnostic {
    pub fn error(code: u32, args: Vec<DiagnosticArg>) -> Self {
        Self {
            code,
            args,
            category: DiagnosticCategory::Error,
            related: Vec::new(),
        }
    }

    pub fn warning(code: u32, args: Vec<DiagnosticArg>) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(code, args)
        }
    }

    pub fn with_related(mut self, related: PendingDiagnostic) -> Self {
        self.related.push(related);
        self
    }

    fn render_text(&self, formatter: &mut TypeFormatter<'_>, indent: usize, out: &mut String) {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| match arg {
                DiagnosticArg::Type(type_id) => formatter.format(*type_id),
                DiagnosticArg::Atom(atom) => formatter.format_atom(*atom),
                DiagnosticArg::String(s) => s.to_string(),
                DiagnosticArg::Number(n) => n.to_string(),
            })
            .collect();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let template = get_message_template(self.code).unwrap_or("{0}");
        if indent > 0 {
            out.push('\n');
            out.push_str(&"  ".repeat(indent));
        }
        out.push_str(&format_message(template, &arg_refs));
        for related in &self.related {
            related.render_text(formatter, indent + 1, out);
        }
    }

    /// Format the arguments and produce the final diagnostic.
    pub fn render(&self, formatter: &mut TypeFormatter<'_>) -> Diagnostic {
        let mut message_text = String::new();
        self.render_text(formatter, 0, &mut message_text);
        Diagnostic {
            category: self.category,
            code: self.code,
            message_text,
        }
    }
}

/// "Type '{source}' is not assignable to type '{target}'."
fn not_assignable(source: TypeId, target: TypeId) -> PendingDiagnostic {
    PendingDiagnostic::error(codes::TYPE_NOT_ASSIGNABLE, vec![source.into(), target.into()])
}

impl SubtypeFailureReason {
    /// Headline for `source -> target`, elaborated by this reason.
    pub fn to_diagnostic(&self, source: TypeId, target: TypeId) -> PendingDiagnostic {
        use SubtypeFailureReason as R;

        let headline = not_assignable(source, target);
        match self {
            R::MissingProperty {
                property_name,
                source_type,
                target_type,
            } => PendingDiagnostic::error(
                codes::PROPERTY_MISSING,
                vec![(*property_name).into(), (*source_type).into(), (*target_type).into()],
            ),
            R::PropertyTypeMismatch {
                property_name,
                source_property_type: from,
                target_property_type: to,
                nested_reason,
            } => {
                let detail = match nested_reason {
                    Some(nested) => nested.to_diagnostic(*from, *to),
                    None => not_assignable(*from, *to),
                };
                headline.with_related(
                    PendingDiagnostic::error(codes::PROPERTY_TYPE_MISMATCH, vec![(*property_name).into()])
                        .with_related(detail),
                )
            }
            R::OptionalPropertyRequired { property_name } => headline.with_related(
                PendingDiagnostic::error(
                    codes::PROPERTY_MISSING,
                    vec![(*property_name).into(), source.into(), target.into()],
                ),
            ),
            R::ReturnTypeMismatch {
                source_return: from,
                target_return: to,
            }
            | R::TupleElementTypeMismatch {
                source_element: from,
                target_element: to,
                ..
            }
            | R::ArrayElementMismatch {
                source_element: from,
                target_element: to,
            }
            | R::AliasArgumentMismatch {
                source_arg: from,
                target_arg: to,
                ..
            } => headline.with_related(not_assignable(*from, *to)),
            // Parameters compare the other way round.
            R::ParameterTypeMismatch {
                source_param,
                target_param,
                ..
            } => headline.with_related(not_assignable(*target_param, *source_param)),
            R::RecursionLimitExceeded => PendingDiagnostic::error(codes::EXCESSIVELY_DEEP, Vec::new()),
            R::TooManyParameters { .. }
            | R::TupleElementMismatch { .. }
            | R::NoUnionMemberMatches { .. }
            | R::TypeMismatch { .. }
            | R::ErrorType { .. } => headline,
        }
    }
}

// =============================================================================
// Solver diagnostics
// =============================================================================

/// The non-fatal failure classes a resolution can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolverDiagnosticKind {
    /// An assignment between two types is not provably sound.
    UnsoundAssignment,
    /// Alias or conditional recursion exceeded the configured depth; the
    /// result was replaced by the error marker.
    RecursionLimitExceeded,
    /// An `infer` variable found no structural match.
    UnresolvedInference,
}

/// A solver failure attached to a best-effort result.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverDiagnostic {
    pub kind: SolverDiagnosticKind,
    pub pending: PendingDiagnostic,
}

impl SolverDiagnostic {
    pub fn recursion_limit() -> Self {
        Self {
            kind: SolverDiagnosticKind::RecursionLimitExceeded,
            pending: PendingDiagnostic::error(codes::EXCESSIVELY_DEEP, Vec::new()),
        }
    }

    /// `name` is the `infer` variable, `resolved` what it fell back to.
    pub fn unresolved_inference(name: Atom, resolved: TypeId) -> Self {
        Self {
            kind: SolverDiagnosticKind::UnresolvedInference,
            pending: PendingDiagnostic::warning(
                codes::INFER_NOT_INFERRED,
                vec![name.into(), resolved.into()],
            ),
        }
    }

    pub fn unsound_assignment(
        source: TypeId,
        target: TypeId,
        reason: Option<&SubtypeFailureReason>,
    ) -> Self {
        let pending = match reason {
            Some(missing @ SubtypeFailureReason::MissingProperty { .. }) => {
                not_assignable(source, target).with_related(missing.to_diagnostic(source, target))
            }
            Some(reason) => reason.to_diagnostic(source, target),
            None => not_assignable(source, target),
        };
        Self {
            kind: SolverDiagnosticKind::UnsoundAssignment,
            pending,
        }
    }

    pub fn render(&self, formatter: &mut TypeFormatter<'_>) -> Diagnostic {
        self.pending.render(formatter)
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
