//! Type table for the typed tree
//!
//! Types are interned: structurally equal kinds map to the same `TypeId`.
//! The lowering stage only ever reads this table.

use super::{SymbolId, TypeId};
use fxhash::FxHashMap;
use std::fmt;

/// The shape of a type, as far as lowering cares about it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// void type (no value)
    Void,
    /// Boolean type (true/false)
    Bool,
    /// 32-bit signed integer
    Int,
    /// UTF-8 string
    String,
    /// Root reference type
    Object,
    /// Dynamically typed value; member and index access resolved at run time
    Dynamic,
    /// End-relative index (`^1`); a value type
    Index,
    /// Pair of end-relative indices (`2..^1`); a value type
    Range,
    /// Class (reference type) declared by `symbol_id`
    Class { symbol_id: SymbolId, name: String },
    /// Struct (value type) declared by `symbol_id`
    Struct { symbol_id: SymbolId, name: String },
    /// Array<T> type
    Array { element_type: TypeId },
}

/// A type entry in the table
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub kind: TypeKind,
}

/// Interning type table
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<Type>,
    interned: FxHashMap<TypeKind, TypeId>,
}

impl TypeTable {
    /// Create a table with all primitive and well-known types pre-registered
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            interned: FxHashMap::default(),
        };
        for kind in [
            TypeKind::Void,
            TypeKind::Bool,
            TypeKind::Int,
            TypeKind::String,
            TypeKind::Object,
            TypeKind::Dynamic,
            TypeKind::Index,
            TypeKind::Range,
        ] {
            table.intern(kind);
        }
        table
    }

    /// Intern a type kind, returning the existing id when already present
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(Type {
            id,
            kind: kind.clone(),
        });
        self.interned.insert(kind, id);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.as_raw() as usize)
    }

    pub fn kind(&self, id: TypeId) -> Option<&TypeKind> {
        self.get(id).map(|ty| &ty.kind)
    }

    fn primitive(&self, kind: &TypeKind) -> TypeId {
        // Pre-registered in `new`, so the lookup cannot miss.
        self.interned.get(kind).copied().unwrap_or_default()
    }

    pub fn void_type(&self) -> TypeId {
        self.primitive(&TypeKind::Void)
    }

    pub fn bool_type(&self) -> TypeId {
        self.primitive(&TypeKind::Bool)
    }

    pub fn int_type(&self) -> TypeId {
        self.primitive(&TypeKind::Int)
    }

    pub fn string_type(&self) -> TypeId {
        self.primitive(&TypeKind::String)
    }

    pub fn object_type(&self) -> TypeId {
        self.primitive(&TypeKind::Object)
    }

    pub fn dynamic_type(&self) -> TypeId {
        self.primitive(&TypeKind::Dynamic)
    }

    pub fn index_type(&self) -> TypeId {
        self.primitive(&TypeKind::Index)
    }

    pub fn range_type(&self) -> TypeId {
        self.primitive(&TypeKind::Range)
    }

    /// Value types are copied on assignment; a receiver of such a type must
    /// be bound by reference to observe in-place mutation.
    pub fn is_value_type(&self, id: TypeId) -> bool {
        matches!(
            self.kind(id),
            Some(
                TypeKind::Bool
                    | TypeKind::Int
                    | TypeKind::Index
                    | TypeKind::Range
                    | TypeKind::Struct { .. }
            )
        )
    }

    pub fn is_int(&self, id: TypeId) -> bool {
        matches!(self.kind(id), Some(TypeKind::Int))
    }

    pub fn is_index(&self, id: TypeId) -> bool {
        matches!(self.kind(id), Some(TypeKind::Index))
    }

    pub fn is_range(&self, id: TypeId) -> bool {
        matches!(self.kind(id), Some(TypeKind::Range))
    }

    pub fn is_dynamic(&self, id: TypeId) -> bool {
        matches!(self.kind(id), Some(TypeKind::Dynamic))
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.kind(id), Some(TypeKind::Array { .. }))
    }

    /// Element type of an array type
    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id)? {
            TypeKind::Array { element_type } => Some(*element_type),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Void => write!(f, "Void"),
            TypeKind::Bool => write!(f, "Bool"),
            TypeKind::Int => write!(f, "Int"),
            TypeKind::String => write!(f, "String"),
            TypeKind::Object => write!(f, "Object"),
            TypeKind::Dynamic => write!(f, "Dynamic"),
            TypeKind::Index => write!(f, "Index"),
            TypeKind::Range => write!(f, "Range"),
            TypeKind::Class { name, .. } | TypeKind::Struct { name, .. } => write!(f, "{}", name),
            TypeKind::Array { element_type } => write!(f, "Array<{}>", element_type),
        }
    }
}
