//! Definition identifiers and storage for the solver.
//!
//! A `DefId` names a declared type alias or interface. It is the identity
//! used for alias-instantiation memoization (`ResolutionKey`) and for the
//! per-alias variance rule in assignability, so two references to the same
//! alias compare by `DefId` rather than by their expanded bodies.
//!
//! The solver never sees source text: the host hands it definitions that are
//! already lowered to `TypeId` bodies, and the engine reads them back through
//! the [`TypeResolver`] trait.

use crate::db::TypeDatabase;
use crate::types::{TypeId, TypeParamInfo};
use crate::variance::Variance;
use condtype_common::interner::Atom;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

// =============================================================================
// DefId
// =============================================================================

/// Solver-owned definition identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Kind of type definition.
///
/// | Kind | Expansion | Example |
/// |------|-----------|---------|
/// | TypeAlias | Always expand | `type Dist<T> = T extends number ? number : string` |
/// | Interface | Expand on demand | `interface Covariant<T> { foo: T extends string ? T : number }` |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    TypeAlias,
    Interface,
}

/// Complete information about a type definition.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    /// Name of the definition (for diagnostics and display)
    pub name: Atom,
    pub type_params: Vec<TypeParamInfo>,
    /// Structural body, written in terms of `type_params`.
    pub body: TypeId,
}

impl DefinitionInfo {
    pub const fn type_alias(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        Self {
            kind: DefKind::TypeAlias,
            name,
            type_params,
            body,
        }
    }

    /// An interface is stored with its object body already built.
    pub const fn interface(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        Self {
            kind: DefKind::Interface,
            name,
            type_params,
            body,
        }
    }
}

// =============================================================================
// TypeResolver
// =============================================================================

/// Read access to declared definitions during evaluation and relation checks.
pub trait TypeResolver {
    /// The body of `def_id`, if it is known.
    fn resolve_lazy(&self, def_id: DefId, interner: &dyn TypeDatabase) -> Option<TypeId>;

    /// Declared type parameters of a generic definition.
    fn get_lazy_type_params(&self, def_id: DefId) -> Option<Vec<TypeParamInfo>>;

    fn get_def_name(&self, _def_id: DefId) -> Option<Atom> {
        None
    }

    fn get_def_kind(&self, _def_id: DefId) -> Option<DefKind> {
        None
    }

    /// Previously computed per-parameter variance of a definition.
    fn get_variance(&self, _def_id: DefId) -> Option<Arc<[Variance]>> {
        None
    }

    fn store_variance(&self, _def_id: DefId, _variance: Arc<[Variance]>) {}
}

/// Resolver for closed types that reference no definitions.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn resolve_lazy(&self, _def_id: DefId, _interner: &dyn TypeDatabase) -> Option<TypeId> {
        None
    }

    fn get_lazy_type_params(&self, _def_id: DefId) -> Option<Vec<TypeParamInfo>> {
        None
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Concurrent definition table shared by every query against one program.
///
/// ```ignore
/// let store = DefinitionStore::new();
/// let dist = store.register(DefinitionInfo::type_alias(
///     interner.intern_string("Dist"),
///     vec![TypeParamInfo::unconstrained(t)],
///     body,
/// ));
/// let applied = interner.application(interner.lazy(dist), vec![TypeId::STRING]);
/// ```
pub struct DefinitionStore {
    definitions: DashMap<DefId, DefinitionInfo>,
    /// Invalidated whenever the owning body changes.
    variances: DashMap<DefId, Arc<[Variance]>>,
    next_id: AtomicU32,
}

/// Handles returned by [`DefinitionStore::register_lib_aliases`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LibAliases {
    pub extract: DefId,
    pub exclude: DefId,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
            variances: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    pub fn register(&self, info: DefinitionInfo) -> DefId {
        let id = DefId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(def_id = id.0, kind = ?info.kind, params = info.type_params.len(), "register definition");
        self.definitions.insert(id, info);
        id
    }

    /// Declares `Extract<T, U>` and `Exclude<T, U>` the way the standard
    /// library does.
    pub fn register_lib_aliases(&self, interner: &dyn TypeDatabase) -> LibAliases {
        let [t_name, u_name] = ["T", "U"].map(|name| interner.intern_string(name));
        let params = vec![
            TypeParamInfo::unconstrained(t_name),
            TypeParamInfo::unconstrained(u_name),
        ];
        let t = interner.type_param(params[0].clone());
        let u = interner.type_param(params[1].clone());
        let alias = |name: &str, body: TypeId| {
            self.register(DefinitionInfo::type_alias(
                interner.intern_string(name),
                params.clone(),
                body,
            ))
        };

        LibAliases {
            // T extends U ? T : never
            extract: alias("Extract", interner.declare_conditional(t, u, t, TypeId::NEVER)),
            // T extends U ? never : T
            exclude: alias("Exclude", interner.declare_conditional(t, u, TypeId::NEVER, t)),
        }
    }

    fn project<R>(&self, id: DefId, f: impl FnOnce(&DefinitionInfo) -> R) -> Option<R> {
        self.definitions.get(&id).map(|entry| f(entry.value()))
    }

    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.project(id, DefinitionInfo::clone)
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn get_kind(&self, id: DefId) -> Option<DefKind> {
        self.project(id, |info| info.kind)
    }

    pub fn get_type_params(&self, id: DefId) -> Option<Vec<TypeParamInfo>> {
        self.project(id, |info| info.type_params.clone())
    }

    pub fn get_body(&self, id: DefId) -> Option<TypeId> {
        self.project(id, |info| info.body)
    }

    pub fn get_name(&self, id: DefId) -> Option<Atom> {
        self.project(id, |info| info.name)
    }

    /// Self-referential aliases are registered with a placeholder body and
    /// patched here once their own `DefId` exists.
    pub fn set_body(&self, id: DefId, body: TypeId) {
        if let Some(mut info) = self.definitions.get_mut(&id) {
            info.body = body;
        }
        self.variances.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn clear(&self) {
        self.definitions.clear();
        self.variances.clear();
        self.next_id.store(DefId::FIRST_VALID, Ordering::Relaxed);
    }
}

impl TypeResolver for DefinitionStore {
    fn resolve_lazy(&self, def_id: DefId, _interner: &dyn TypeDatabase) -> Option<TypeId> {
        self.get_body(def_id)
    }

    fn get_lazy_type_params(&self, def_id: DefId) -> Option<Vec<TypeParamInfo>> {
        self.get_type_params(def_id)
    }

    fn get_def_name(&self, def_id: DefId) -> Option<Atom> {
        self.get_name(def_id)
    }

    fn get_def_kind(&self, def_id: DefId) -> Option<DefKind> {
        self.get_kind(def_id)
    }

    fn get_variance(&self, def_id: DefId) -> Option<Arc<[Variance]>> {
        self.variances.get(&def_id).map(|r| r.clone())
    }

    fn store_variance(&self, def_id: DefId, variance: Arc<[Variance]>) {
        trace!(def_id = def_id.0, ?variance, "store variance");
        self.variances.insert(def_id, variance);
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
