//! Hash-consing of `TypeData` into `TypeId` handles.
//!
//! Every structurally distinct type is stored once; two types are equal
//! exactly when their ids are. Node storage is split into 64 shards keyed by
//! the node hash, and each variable-size payload (member lists, object and
//! function shapes, conditionals, mapped types, applications) lives in its
//! own side table behind an `RwLock`, so parallel resolvers can intern
//! without a global lock.

use crate::def::DefId;
use crate::types::*;
use condtype_common::interner::{Atom, ShardedInterner};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

const SHARD_BITS: u32 = 6;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;
const MAX_LOCAL_INDEX: u32 = u32::MAX >> SHARD_BITS;

/// Most unions and intersections met during resolution are small.
type MemberBuffer = SmallVec<[TypeId; 8]>;

/// Disjointness classes for intersection reduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PrimitiveClass {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Null,
    Undefined,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LiteralDomain {
    String,
    Number,
    Boolean,
    Bigint,
}

impl LiteralDomain {
    fn of(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::String(_) => Self::String,
            LiteralValue::Number(_) => Self::Number,
            LiteralValue::Boolean(_) => Self::Boolean,
            LiteralValue::BigInt(_) => Self::Bigint,
        }
    }
}

/// The literal values a property may take, all from one domain.
#[derive(Clone, Debug)]
struct LiteralSet {
    domain: LiteralDomain,
    values: FxHashSet<LiteralValue>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Compound {
    Union,
    Intersection,
}

impl Compound {
    const fn identity(self) -> TypeId {
        match self {
            Self::Union => TypeId::NEVER,
            Self::Intersection => TypeId::UNKNOWN,
        }
    }
}

#[derive(Default)]
struct NodeShard {
    ids: FxHashMap<TypeData, u32>,
    nodes: Vec<TypeData>,
}

/// Dense table of shared payloads. Slot 0 of a list table is the empty list.
struct Table<T: ?Sized> {
    slots: Vec<Arc<T>>,
    index: FxHashMap<Arc<T>, u32>,
}

impl<T: ?Sized + Eq + Hash> Table<T> {
    fn empty() -> Self {
        Table {
            slots: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn insert(&mut self, value: Arc<T>) -> u32 {
        if let Some(&slot) = self.index.get(&value) {
            return slot;
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Arc::clone(&value));
        self.index.insert(value, slot);
        slot
    }

    fn slot(&self, slot: u32) -> Option<Arc<T>> {
        self.slots.get(slot as usize).cloned()
    }
}

impl<E: Eq + Hash> Table<[E]> {
    fn lists() -> Self {
        let mut table = Self::empty();
        table.insert(Arc::from(Vec::new()));
        table
    }

    fn insert_list(&mut self, items: Vec<E>) -> u32 {
        if items.is_empty() {
            return 0;
        }
        if let Some(&slot) = self.index.get(items.as_slice()) {
            return slot;
        }
        self.insert(Arc::from(items))
    }
}

/// A side table shared between threads.
struct SideTable<T: ?Sized>(RwLock<Table<T>>);

impl<T: ?Sized + Eq + Hash> SideTable<T> {
    fn new(table: Table<T>) -> Self {
        SideTable(RwLock::new(table))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Table<T>> {
        self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Table<T>> {
        self.0.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Eq + Hash> SideTable<T> {
    fn intern(&self, value: T) -> u32 {
        if let Some(&slot) = self.read().index.get(&value) {
            return slot;
        }
        self.write().insert(Arc::new(value))
    }

    /// A stale id yields `fallback`; ids never outlive their interner in
    /// practice, but lookups stay total.
    fn get_or(&self, slot: u32, fallback: impl FnOnce() -> T) -> Arc<T> {
        self.read().slot(slot).unwrap_or_else(|| Arc::new(fallback()))
    }
}

impl<E: Eq + Hash> SideTable<[E]> {
    fn intern_list(&self, items: Vec<E>) -> u32 {
        self.write().insert_list(items)
    }

    fn get_list(&self, slot: u32) -> Arc<[E]> {
        let table = self.read();
        table
            .slot(slot)
            .or_else(|| table.slot(0))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }
}

/// Thread-safe type interning table.
pub struct TypeInterner {
    shards: [RwLock<NodeShard>; SHARD_COUNT],
    /// Property names, type parameter names and string literal values.
    atoms: ShardedInterner,
    type_lists: SideTable<[TypeId]>,
    tuple_lists: SideTable<[TupleElement]>,
    object_shapes: SideTable<ObjectShape>,
    function_shapes: SideTable<FunctionShape>,
    conditionals: SideTable<ConditionalType>,
    mapped: SideTable<MappedType>,
    applications: SideTable<TypeApplication>,
}

impl TypeInterner {
    /// Intrinsics need no registration: their ids are reserved.
    pub fn new() -> Self {
        let atoms = ShardedInterner::new();
        atoms.intern_common();
        TypeInterner {
            shards: std::array::from_fn(|_| RwLock::new(NodeShard::default())),
            atoms,
            type_lists: SideTable::new(Table::lists()),
            tuple_lists: SideTable::new(Table::lists()),
            object_shapes: SideTable::new(Table::empty()),
            function_shapes: SideTable::new(Table::empty()),
            conditionals: SideTable::new(Table::empty()),
            mapped: SideTable::new(Table::empty()),
            applications: SideTable::new(Table::empty()),
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.atoms.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.atoms.resolve(atom).to_string()
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        self.type_lists.get_list(id.0)
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        self.tuple_lists.get_list(id.0)
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes.get_or(id.0, ObjectShape::default)
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes.get_or(id.0, || FunctionShape {
            params: Vec::new(),
            return_type: TypeId::ERROR,
        })
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType> {
        self.conditionals.get_or(id.0, || ConditionalType {
            check_type: TypeId::ERROR,
            extends_type: TypeId::ERROR,
            true_type: TypeId::ERROR,
            false_type: TypeId::ERROR,
            is_distributive: false,
        })
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        self.mapped.get_or(id.0, || MappedType {
            type_param: TypeParamInfo::unconstrained(Atom::NONE),
            constraint: TypeId::ERROR,
            template: TypeId::ERROR,
        })
    }

    pub fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication> {
        self.applications.get_or(id.0, || TypeApplication {
            base: TypeId::ERROR,
            args: Vec::new(),
        })
    }

    /// Return the id of `key`, allocating one on first sight.
    ///
    /// Exhausting a shard yields the error type instead of wrapping ids.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if let Some(id) = reserved_id(&key) {
            return id;
        }

        let shard_idx = shard_of(&key);
        let shard = &self.shards[shard_idx];
        if let Some(&local) = shard
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .ids
            .get(&key)
        {
            return compose_id(local, shard_idx);
        }

        let mut shard = shard.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&local) = shard.ids.get(&key) {
            return compose_id(local, shard_idx);
        }
        let local = shard.nodes.len() as u32;
        if local > MAX_LOCAL_INDEX {
            return TypeId::ERROR;
        }
        shard.nodes.push(key.clone());
        shard.ids.insert(key, local);
        compose_id(local, shard_idx)
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return reserved_data(id);
        }
        let raw = id.0.checked_sub(TypeId::FIRST_USER)?;
        let shard = self.shards.get((raw & SHARD_MASK) as usize)?;
        shard
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .nodes
            .get((raw >> SHARD_BITS) as usize)
            .cloned()
    }

    /// Reserved intrinsic ids count towards the total.
    pub fn len(&self) -> usize {
        self.shards.iter().fold(TypeId::FIRST_USER as usize, |total, shard| {
            total + shard.read().unwrap_or_else(|e| e.into_inner()).nodes.len()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        kind.to_type_id()
    }

    pub fn literal_string(&self, value: &str) -> TypeId {
        self.literal_string_atom(self.intern_string(value))
    }

    pub fn literal_string_atom(&self, atom: Atom) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    /// `true` and `false` have reserved ids.
    pub fn literal_boolean(&self, value: bool) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Boolean(value)))
    }

    /// `value` is the decimal digits without the `n` suffix.
    pub fn literal_bigint(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::BigInt(atom)))
    }

    /// Build a normalized union; nested unions are flattened.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        match self.flatten(members, Compound::Union) {
            Ok(flat) => self.normalize_union(flat),
            Err(single) => single,
        }
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        match self.flatten([left, right], Compound::Union) {
            Ok(flat) => self.normalize_union(flat),
            Err(single) => single,
        }
    }

    pub fn union3(&self, first: TypeId, second: TypeId, third: TypeId) -> TypeId {
        match self.flatten([first, second, third], Compound::Union) {
            Ok(flat) => self.normalize_union(flat),
            Err(single) => single,
        }
    }

    /// Collect members, splicing in the members of nested compounds of the
    /// same kind. Fewer than two members short-circuit with `Err`: the
    /// kind's identity for none, the member itself for one.
    fn flatten<I>(&self, members: I, kind: Compound) -> Result<MemberBuffer, TypeId>
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return Err(kind.identity());
        };
        let Some(second) = iter.next() else {
            return Err(first);
        };
        let mut flat = MemberBuffer::new();
        for member in [first, second].into_iter().chain(iter) {
            let nested = match (kind, self.lookup(member)) {
                (Compound::Union, Some(TypeData::Union(list)))
                | (Compound::Intersection, Some(TypeData::Intersection(list))) => Some(list),
                _ => None,
            };
            match nested {
                Some(list) => flat.extend(self.type_list(list).iter().copied()),
                None => flat.push(member),
            }
        }
        Ok(flat)
    }

    fn normalize_union(&self, mut flat: MemberBuffer) -> TypeId {
        flat.sort_by_key(|id| id.0);
        flat.dedup();

        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.is_empty() {
            return TypeId::NEVER;
        }
        if flat.len() == 1 {
            return flat[0];
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|id| *id != TypeId::NEVER);

        // true | false => boolean
        if flat.contains(&TypeId::BOOLEAN_TRUE) && flat.contains(&TypeId::BOOLEAN_FALSE) {
            flat.retain(|id| *id != TypeId::BOOLEAN_TRUE && *id != TypeId::BOOLEAN_FALSE);
            if !flat.contains(&TypeId::BOOLEAN) {
                flat.push(TypeId::BOOLEAN);
                flat.sort_by_key(|id| id.0);
            }
        }

        // "a" | string => string, 1 | number => number, true | boolean => boolean
        self.absorb_literals_into_primitives(&mut flat);

        if flat.is_empty() {
            return TypeId::NEVER;
        }
        if flat.len() == 1 {
            return flat[0];
        }

        let list_id = TypeListId(self.type_lists.intern_list(flat.into_vec()));
        self.intern(TypeData::Union(list_id))
    }

    /// Build a normalized intersection; all-object intersections merge.
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        match self.flatten(members, Compound::Intersection) {
            Ok(flat) => self.normalize_intersection(flat),
            Err(single) => single,
        }
    }

    pub fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId {
        match self.flatten([left, right], Compound::Intersection) {
            Ok(flat) => self.normalize_intersection(flat),
            Err(single) => single,
        }
    }

    fn normalize_intersection(&self, mut flat: MemberBuffer) -> TypeId {
        flat.sort_by_key(|id| id.0);
        flat.dedup();

        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.is_empty() {
            return TypeId::UNKNOWN;
        }
        if flat.len() == 1 {
            return flat[0];
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        // `unknown` is the identity element
        flat.retain(|id| *id != TypeId::UNKNOWN);
        if self.intersection_has_disjoint_primitives(&flat) {
            return TypeId::NEVER;
        }
        if self.intersection_has_disjoint_object_literals(&flat) {
            return TypeId::NEVER;
        }
        // "a" & string => "a"
        self.absorb_primitives_into_literals(&mut flat);
        if flat.is_empty() {
            return TypeId::UNKNOWN;
        }
        if flat.len() == 1 {
            return flat[0];
        }

        if let Some(merged) = self.try_merge_objects_in_intersection(&flat) {
            return merged;
        }

        let list_id = TypeListId(self.type_lists.intern_list(flat.into_vec()));
        self.intern(TypeData::Intersection(list_id))
    }

    fn try_merge_objects_in_intersection(&self, members: &[TypeId]) -> Option<TypeId> {
        let objects = members
            .iter()
            .map(|&member| match self.lookup(member) {
                Some(TypeData::Object(shape_id)) => Some(self.object_shape(shape_id)),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(self.merge_object_shapes(&objects))
    }

    /// Combine object shapes as `A & B` does. A property present in several
    /// shapes gets the intersection of its types; it is optional only if
    /// optional everywhere and readonly if readonly anywhere.
    pub fn merge_object_shapes(&self, objects: &[Arc<ObjectShape>]) -> TypeId {
        let mut by_name: FxHashMap<Atom, PropertyInfo> = FxHashMap::default();
        for prop in objects.iter().flat_map(|shape| shape.properties.iter()) {
            by_name
                .entry(prop.name)
                .and_modify(|merged| {
                    if merged.type_id != prop.type_id {
                        merged.type_id = self.intersection2(merged.type_id, prop.type_id);
                    }
                    merged.optional &= prop.optional;
                    merged.readonly |= prop.readonly;
                })
                .or_insert_with(|| prop.clone());
        }
        self.object(by_name.into_values().collect())
    }

    fn intersection_has_disjoint_primitives(&self, members: &[TypeId]) -> bool {
        let mut class: Option<PrimitiveClass> = None;
        let mut has_primitive = false;
        let mut has_non_primitive = false;
        let mut literals: SmallVec<[TypeId; 4]> = SmallVec::new();

        for &member in members {
            let Some(member_class) = self.primitive_class_for(member) else {
                has_non_primitive |= self.excludes_primitives(member);
                continue;
            };
            has_primitive = true;
            if let Some(existing) = class {
                if existing != member_class {
                    return true;
                }
            } else {
                class = Some(member_class);
            }

            if self.is_literal(member) {
                literals.push(member);
            }
        }

        // "hello" & "world" = never, 1 & 2 = never
        if literals.len() > 1 && !literals.iter().all(|&lit| lit == literals[0]) {
            return true;
        }

        has_primitive && has_non_primitive
    }

    fn is_literal(&self, type_id: TypeId) -> bool {
        matches!(self.lookup(type_id), Some(TypeData::Literal(_)))
    }

    /// Types no primitive value can inhabit. Object literal shapes are not
    /// among them: `string & { __brand: "id" }` is a branded string, and
    /// `{ length: number }` already describes every string.
    fn excludes_primitives(&self, type_id: TypeId) -> bool {
        match type_id {
            TypeId::OBJECT | TypeId::FUNCTION => return true,
            _ => {}
        }
        matches!(
            self.lookup(type_id),
            Some(TypeData::Function(_) | TypeData::Array(_) | TypeData::Tuple(_))
        )
    }

    fn intersection_has_disjoint_object_literals(&self, members: &[TypeId]) -> bool {
        let objects: Vec<Arc<ObjectShape>> = members
            .iter()
            .filter_map(|&member| match self.lookup(member) {
                Some(TypeData::Object(shape_id)) => Some(self.object_shape(shape_id)),
                _ => None,
            })
            .collect();

        objects.iter().enumerate().any(|(i, left)| {
            objects[i + 1..]
                .iter()
                .any(|right| self.object_literals_disjoint(left, right))
        })
    }

    /// Two objects are disjoint when a required property present in both is
    /// typed by literal sets with no common value, e.g. `{ f1: "a" } & { f1: "b" }`.
    fn object_literals_disjoint(&self, left: &ObjectShape, right: &ObjectShape) -> bool {
        for prop in &left.properties {
            if prop.optional {
                continue;
            }
            let Some(other) = right.property(prop.name) else {
                continue;
            };
            if other.optional {
                continue;
            }
            let (Some(left_set), Some(right_set)) = (
                self.literal_set_from_type(prop.type_id),
                self.literal_set_from_type(other.type_id),
            ) else {
                continue;
            };
            if left_set.domain != right_set.domain
                || !left_set.values.iter().any(|v| right_set.values.contains(v))
            {
                return true;
            }
        }
        false
    }

    /// The literal values of a literal or a union of same-domain literals.
    fn literal_set_from_type(&self, type_id: TypeId) -> Option<LiteralSet> {
        let members: Vec<TypeId> = match self.lookup(type_id)? {
            TypeData::Literal(_) => vec![type_id],
            TypeData::Union(list) => self.type_list(list).to_vec(),
            _ => return None,
        };
        let mut set: Option<LiteralSet> = None;
        for member in members {
            let Some(TypeData::Literal(literal)) = self.lookup(member) else {
                return None;
            };
            let domain = LiteralDomain::of(&literal);
            match &mut set {
                Some(existing) if existing.domain != domain => return None,
                Some(existing) => {
                    existing.values.insert(literal);
                }
                None => {
                    let mut values = FxHashSet::default();
                    values.insert(literal);
                    set = Some(LiteralSet { domain, values });
                }
            }
        }
        set
    }

    fn primitive_class_for(&self, type_id: TypeId) -> Option<PrimitiveClass> {
        match type_id {
            TypeId::STRING => Some(PrimitiveClass::String),
            TypeId::NUMBER => Some(PrimitiveClass::Number),
            TypeId::BOOLEAN | TypeId::BOOLEAN_TRUE | TypeId::BOOLEAN_FALSE => {
                Some(PrimitiveClass::Boolean)
            }
            TypeId::BIGINT => Some(PrimitiveClass::Bigint),
            TypeId::SYMBOL => Some(PrimitiveClass::Symbol),
            TypeId::NULL => Some(PrimitiveClass::Null),
            TypeId::UNDEFINED | TypeId::VOID => Some(PrimitiveClass::Undefined),
            _ if type_id.is_intrinsic() => None,
            _ => match self.lookup(type_id)? {
                TypeData::Literal(literal) => Some(match literal {
                    LiteralValue::String(_) => PrimitiveClass::String,
                    LiteralValue::Number(_) => PrimitiveClass::Number,
                    LiteralValue::Boolean(_) => PrimitiveClass::Boolean,
                    LiteralValue::BigInt(_) => PrimitiveClass::Bigint,
                }),
                _ => None,
            },
        }
    }

    /// `"a" | string` is `string`: drop literals whose primitive is present.
    fn absorb_literals_into_primitives(&self, flat: &mut MemberBuffer) {
        let widened: SmallVec<[PrimitiveClass; 4]> = flat
            .iter()
            .filter(|&&id| id.is_intrinsic() && !self.is_literal(id))
            .filter_map(|&id| self.primitive_class_for(id))
            .collect();
        if widened.is_empty() {
            return;
        }
        flat.retain(|id| {
            !self.is_literal(*id)
                || self
                    .primitive_class_for(*id)
                    .is_none_or(|class| !widened.contains(&class))
        });
    }

    /// Drop primitives that are already narrowed by a literal of the same class.
    fn absorb_primitives_into_literals(&self, flat: &mut MemberBuffer) {
        let literal_classes: SmallVec<[PrimitiveClass; 4]> = flat
            .iter()
            .filter(|&&id| self.is_literal(id))
            .filter_map(|&id| self.primitive_class_for(id))
            .collect();
        if literal_classes.is_empty() {
            return;
        }
        flat.retain(|id| {
            if self.is_literal(*id) {
                return true;
            }
            match self.primitive_class_for(*id) {
                Some(class) => !literal_classes.contains(&class),
                None => true,
            }
        });
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let list_id = TupleListId(self.tuple_lists.intern_list(elements));
        self.intern(TypeData::Tuple(list_id))
    }

    /// Properties are sorted by name; a repeated name keeps its first entry.
    pub fn object(&self, mut properties: Vec<PropertyInfo>) -> TypeId {
        properties.sort_by_key(|p| p.name);
        properties.dedup_by_key(|p| p.name);
        let shape_id = ObjectShapeId(self.object_shapes.intern(ObjectShape { properties }));
        self.intern(TypeData::Object(shape_id))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = FunctionShapeId(self.function_shapes.intern(shape));
        self.intern(TypeData::Function(shape_id))
    }

    pub fn conditional(&self, conditional: ConditionalType) -> TypeId {
        let cond_id = ConditionalTypeId(self.conditionals.intern(conditional));
        self.intern(TypeData::Conditional(cond_id))
    }

    /// Intern a conditional type as declared in source: it is distributive
    /// exactly when its check type is a naked type parameter.
    pub fn declare_conditional(
        &self,
        check_type: TypeId,
        extends_type: TypeId,
        true_type: TypeId,
        false_type: TypeId,
    ) -> TypeId {
        let is_distributive = matches!(self.lookup(check_type), Some(TypeData::TypeParameter(_)));
        self.conditional(ConditionalType {
            check_type,
            extends_type,
            true_type,
            false_type,
            is_distributive,
        })
    }

    /// Intern a mapped type
    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let mapped_id = MappedTypeId(self.mapped.intern(mapped));
        self.intern(TypeData::Mapped(mapped_id))
    }

    /// Intern a generic application
    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let app_id = TypeApplicationId(self.applications.intern(TypeApplication { base, args }));
        self.intern(TypeData::Application(app_id))
    }

    pub fn type_param(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::TypeParameter(info))
    }

    pub fn infer(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::Infer(info))
    }

    pub fn index_access(&self, object_type: TypeId, index_type: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object_type, index_type))
    }

    pub fn keyof(&self, operand: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(operand))
    }

    pub fn lazy(&self, def_id: DefId) -> TypeId {
        self.intern(TypeData::Lazy(def_id))
    }
}

fn shard_of(key: &TypeData) -> usize {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() as usize) & (SHARD_COUNT - 1)
}

#[inline]
fn compose_id(local: u32, shard_idx: usize) -> TypeId {
    TypeId(TypeId::FIRST_USER + ((local << SHARD_BITS) | (shard_idx as u32 & SHARD_MASK)))
}

/// Nodes whose id is fixed ahead of time.
fn reserved_id(key: &TypeData) -> Option<TypeId> {
    match key {
        TypeData::Intrinsic(kind) => Some(kind.to_type_id()),
        TypeData::Literal(LiteralValue::Boolean(value)) => Some(if *value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }),
        TypeData::Error => Some(TypeId::ERROR),
        _ => None,
    }
}

fn reserved_data(id: TypeId) -> Option<TypeData> {
    let kind = match id {
        TypeId::NONE | TypeId::ERROR => return Some(TypeData::Error),
        TypeId::BOOLEAN_TRUE => return Some(TypeData::Literal(LiteralValue::Boolean(true))),
        TypeId::BOOLEAN_FALSE => return Some(TypeData::Literal(LiteralValue::Boolean(false))),
        TypeId::NEVER => IntrinsicKind::Never,
        TypeId::UNKNOWN => IntrinsicKind::Unknown,
        TypeId::ANY => IntrinsicKind::Any,
        TypeId::VOID => IntrinsicKind::Void,
        TypeId::UNDEFINED => IntrinsicKind::Undefined,
        TypeId::NULL => IntrinsicKind::Null,
        TypeId::BOOLEAN => IntrinsicKind::Boolean,
        TypeId::NUMBER => IntrinsicKind::Number,
        TypeId::STRING => IntrinsicKind::String,
        TypeId::BIGINT => IntrinsicKind::Bigint,
        TypeId::SYMBOL => IntrinsicKind::Symbol,
        TypeId::OBJECT => IntrinsicKind::Object,
        TypeId::FUNCTION => IntrinsicKind::Function,
        _ => return None,
    };
    Some(TypeData::Intrinsic(kind))
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
