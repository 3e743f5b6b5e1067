//! Symbol table for the typed tree
//!
//! Holds the members the lowering stage consults: methods (getters, slice
//! methods, well-known library members), properties (indexers, length/count
//! accessors, indexed properties), fields and locals. Symbols are stored in
//! insertion order so dumps and iteration are deterministic.

use super::{SymbolId, TypeId};
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// How an argument is passed to its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

impl RefKind {
    pub fn is_by_ref(self) -> bool {
        self != RefKind::None
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::None => Ok(()),
            RefKind::Ref => write!(f, "ref "),
            RefKind::Out => write!(f, "out "),
            RefKind::In => write!(f, "in "),
        }
    }
}

/// Per-argument ref kinds; usually a handful of entries
pub type RefKinds = SmallVec<[RefKind; 4]>;

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// File ID
    pub file_id: u32,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
    /// Byte offset in file
    pub byte_offset: u32,
}

impl SourceLocation {
    pub const fn new(file_id: u32, line: u32, column: u32, byte_offset: u32) -> Self {
        Self {
            file_id,
            line,
            column,
            byte_offset,
        }
    }

    pub const fn unknown() -> Self {
        Self::new(u32::MAX, 0, 0, 0)
    }

    pub const fn is_valid(self) -> bool {
        self.file_id != u32::MAX
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}:{}", self.file_id, self.line, self.column)
        } else {
            write!(f, "<unknown>")
        }
    }
}

/// Compile-time constant used as an optional parameter default
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i64),
    Bool(bool),
    String(String),
    Null,
}

/// Formal parameter of a method or indexer
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeId,
    pub ref_kind: RefKind,
    /// Default value for an optional parameter
    pub default: Option<ConstantValue>,
    /// `params`-array parameter; always the last one
    pub is_params: bool,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind: RefKind::None,
            default: None,
            is_params: false,
        }
    }

    pub fn with_default(mut self, value: ConstantValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }

    /// Mark as a params array; `ty` must be the array type
    pub fn params_array(mut self) -> Self {
        self.is_params = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Method, accessor or constructor
#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: String,
    pub declaring_type: TypeId,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub returns_by_ref: bool,
    pub is_static: bool,
}

impl MethodSymbol {
    /// Instance method returning by value
    pub fn new(name: impl Into<String>, declaring_type: TypeId, params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            params,
            return_type,
            returns_by_ref: false,
            is_static: false,
        }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Property, indexer or indexed property
#[derive(Debug, Clone)]
pub struct PropertySymbol {
    pub name: String,
    pub declaring_type: TypeId,
    pub ty: TypeId,
    /// Indexing parameters; empty for ordinary properties
    pub params: Vec<ParamInfo>,
    pub getter: Option<SymbolId>,
    pub setter: Option<SymbolId>,
    /// The accessor returns a reference, which is itself the assignable location
    pub returns_by_ref: bool,
    /// A property exposing indexing syntax through an extra parameter list
    /// rather than a true indexer (`obj.Item[x, y]`)
    pub is_indexed_property: bool,
}

#[derive(Debug, Clone)]
pub struct FieldSymbol {
    pub name: String,
    pub declaring_type: TypeId,
    pub ty: TypeId,
}

/// Local variable or parameter
#[derive(Debug, Clone)]
pub struct LocalSymbol {
    pub name: String,
    pub ty: TypeId,
    pub is_parameter: bool,
}

/// Symbol payload
#[derive(Debug, Clone)]
pub enum Symbol {
    Method(MethodSymbol),
    Property(PropertySymbol),
    Field(FieldSymbol),
    Local(LocalSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Method(m) => &m.name,
            Symbol::Property(p) => &p.name,
            Symbol::Field(f) => &f.name,
            Symbol::Local(l) => &l.name,
        }
    }
}

/// Insertion-ordered symbol storage
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: IndexMap<SymbolId, Symbol>,
    next_id: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::from_raw(self.next_id);
        self.next_id += 1;
        self.symbols.insert(id, symbol);
        id
    }

    pub fn add_method(&mut self, method: MethodSymbol) -> SymbolId {
        self.add(Symbol::Method(method))
    }

    pub fn add_property(&mut self, property: PropertySymbol) -> SymbolId {
        self.add(Symbol::Property(property))
    }

    pub fn add_field(&mut self, field: FieldSymbol) -> SymbolId {
        self.add(Symbol::Field(field))
    }

    pub fn add_local(&mut self, name: impl Into<String>, ty: TypeId) -> SymbolId {
        self.add(Symbol::Local(LocalSymbol {
            name: name.into(),
            ty,
            is_parameter: false,
        }))
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    pub fn method(&self, id: SymbolId) -> Option<&MethodSymbol> {
        match self.get(id)? {
            Symbol::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn property(&self, id: SymbolId) -> Option<&PropertySymbol> {
        match self.get(id)? {
            Symbol::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn field(&self, id: SymbolId) -> Option<&FieldSymbol> {
        match self.get(id)? {
            Symbol::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Name of a symbol, or a placeholder for unknown ids
    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map(Symbol::name).unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().map(|(id, symbol)| (*id, symbol))
    }
}
