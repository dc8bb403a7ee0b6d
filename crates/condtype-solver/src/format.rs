//! TypeScript-style display of types.
//!
//! Union members are printed in a deterministic order that depends only on
//! their structure (string literals, number literals, boolean literals,
//! primitives, then everything else, each group sorted by text), so the same
//! type prints identically whatever order its members were interned in.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::types::*;
use condtype_common::interner::Atom;

const MAX_FORMAT_DEPTH: u32 = 16;

pub struct TypeFormatter<'a> {
    interner: &'a dyn TypeDatabase,
    resolver: Option<&'a dyn TypeResolver>,
    depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        TypeFormatter {
            interner,
            resolver: None,
            depth: 0,
        }
    }

    /// Use definition names for `Lazy` references and alias applications.
    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn format_atom(&self, atom: Atom) -> String {
        self.interner.resolve_atom(atom)
    }

    pub fn format(&mut self, type_id: TypeId) -> String {
        if self.depth > MAX_FORMAT_DEPTH {
            return "...".to_string();
        }
        self.depth += 1;
        let text = self.format_inner(type_id);
        self.depth -= 1;
        text
    }

    fn format_inner(&mut self, type_id: TypeId) -> String {
        if type_id == TypeId::ERROR {
            return "error".to_string();
        }
        let Some(key) = self.interner.lookup(type_id) else {
            return format!("<type#{}>", type_id.0);
        };
        match key {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Error => "error".to_string(),
            TypeData::Literal(literal) => self.format_literal(&literal),
            TypeData::Object(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                self.format_object(&shape)
            }
            TypeData::Array(element) => {
                let inner = self.format(element);
                if self.needs_parens(element) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeData::Tuple(list_id) => {
                let elements = self.interner.tuple_list(list_id);
                let parts: Vec<String> = elements
                    .iter()
                    .map(|element| self.format_tuple_element(element))
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            TypeData::Union(list_id) => {
                let members = self.interner.type_list(list_id);
                let mut parts: Vec<(u8, String)> = members
                    .iter()
                    .map(|&member| (self.union_rank(member), self.format_member(member)))
                    .collect();
                parts.sort();
                parts
                    .into_iter()
                    .map(|(_, text)| text)
                    .collect::<Vec<_>>()
                    .join(" | ")
            }
            TypeData::Intersection(list_id) => {
                let members = self.interner.type_list(list_id);
                members
                    .iter()
                    .map(|&member| self.format_member(member))
                    .collect::<Vec<_>>()
                    .join(" & ")
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                self.format_function(&shape)
            }
            TypeData::TypeParameter(info) => self.format_atom(info.name),
            TypeData::Infer(info) => match info.constraint {
                Some(constraint) => format!(
                    "infer {} extends {}",
                    self.format_atom(info.name),
                    self.format(constraint)
                ),
                None => format!("infer {}", self.format_atom(info.name)),
            },
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                format!(
                    "{} extends {} ? {} : {}",
                    self.format_member(cond.check_type),
                    self.format_member(cond.extends_type),
                    self.format(cond.true_type),
                    self.format(cond.false_type)
                )
            }
            TypeData::IndexAccess(object, index) => {
                format!("{}[{}]", self.format_member(object), self.format(index))
            }
            TypeData::KeyOf(operand) => format!("keyof {}", self.format_member(operand)),
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                format!(
                    "{{ [{} in {}]: {}; }}",
                    self.format_atom(mapped.type_param.name),
                    self.format(mapped.constraint),
                    self.format(mapped.template)
                )
            }
            TypeData::Lazy(def_id) => self
                .resolver
                .and_then(|resolver| resolver.get_def_name(def_id))
                .map(|name| self.format_atom(name))
                .unwrap_or_else(|| format!("<def#{}>", def_id.0)),
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                let base = self.format(app.base);
                let args: Vec<String> = app.args.iter().map(|&arg| self.format(arg)).collect();
                format!("{base}<{}>", args.join(", "))
            }
        }
    }

    fn format_literal(&self, literal: &LiteralValue) -> String {
        match literal {
            LiteralValue::String(atom) => {
                let text = self.format_atom(*atom);
                format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
            }
            LiteralValue::Number(value) => format_number(value.0),
            LiteralValue::Boolean(value) => value.to_string(),
            LiteralValue::BigInt(atom) => format!("{}n", self.format_atom(*atom)),
        }
    }

    fn format_object(&mut self, shape: &ObjectShape) -> String {
        if shape.properties.is_empty() {
            return "{}".to_string();
        }
        let mut out = String::from("{ ");
        for prop in &shape.properties {
            if prop.readonly {
                out.push_str("readonly ");
            }
            out.push_str(&self.format_atom(prop.name));
            if prop.optional {
                out.push('?');
            }
            out.push_str(": ");
            out.push_str(&self.format(prop.type_id));
            out.push_str("; ");
        }
        out.push('}');
        out
    }

    fn format_tuple_element(&mut self, element: &TupleElement) -> String {
        let mut text = String::new();
        if element.rest {
            text.push_str("...");
        }
        if let Some(name) = element.name {
            text.push_str(&self.format_atom(name));
            if element.optional {
                text.push('?');
            }
            text.push_str(": ");
            text.push_str(&self.format(element.type_id));
        } else {
            text.push_str(&self.format(element.type_id));
            if element.optional {
                text.push('?');
            }
        }
        text
    }

    fn format_function(&mut self, shape: &FunctionShape) -> String {
        let params: Vec<String> = shape
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let name = param
                    .name
                    .map(|name| self.format_atom(name))
                    .unwrap_or_else(|| format!("arg{i}"));
                let rest = if param.rest { "..." } else { "" };
                let optional = if param.optional { "?" } else { "" };
                format!("{rest}{name}{optional}: {}", self.format(param.type_id))
            })
            .collect();
        format!("({}) => {}", params.join(", "), self.format(shape.return_type))
    }

    /// Format a type that appears as an operand of `|`, `&`, `extends`,
    /// `keyof` or `[]`.
    fn format_member(&mut self, type_id: TypeId) -> String {
        let text = self.format(type_id);
        if self.needs_parens(type_id) {
            format!("({text})")
        } else {
            text
        }
    }

    fn needs_parens(&self, type_id: TypeId) -> bool {
        if type_id == TypeId::BOOLEAN {
            return false;
        }
        matches!(
            self.interner.lookup(type_id),
            Some(
                TypeData::Union(_)
                    | TypeData::Intersection(_)
                    | TypeData::Function(_)
                    | TypeData::Conditional(_)
            )
        )
    }

    fn union_rank(&self, type_id: TypeId) -> u8 {
        match self.interner.lookup(type_id) {
            Some(TypeData::Literal(LiteralValue::String(_))) => 0,
            Some(TypeData::Literal(LiteralValue::Number(_))) => 1,
            Some(TypeData::Literal(LiteralValue::BigInt(_))) => 2,
            Some(TypeData::Literal(LiteralValue::Boolean(_))) => 3,
            _ if type_id == TypeId::NULL || type_id == TypeId::UNDEFINED => 6,
            Some(TypeData::Intrinsic(_)) => 4,
            _ => 5,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
