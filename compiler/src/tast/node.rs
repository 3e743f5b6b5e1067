//! Typed AST nodes consumed by the lowering stage
//!
//! The binder produces these fully resolved and type-checked. Indexing
//! expressions arrive as one of the four [`AccessNode`] variants; everything
//! else is the small set of expression shapes that can appear as receivers
//! and arguments.

use super::{RefKind, RefKinds, SourceLocation, SymbolId, TypeId};

/// A typed expression
#[derive(Debug, Clone)]
pub struct TypedExpression {
    /// Expression type
    pub expr_type: TypeId,

    /// Expression kind
    pub kind: TypedExpressionKind,

    /// Source location
    pub source_location: SourceLocation,
}

impl TypedExpression {
    pub fn new(kind: TypedExpressionKind, expr_type: TypeId, source_location: SourceLocation) -> Self {
        Self {
            expr_type,
            kind,
            source_location,
        }
    }

    /// Name of the indexed property this expression refers to, if it is an
    /// indexed-property reference awaiting its argument list
    pub fn indexed_property(&self) -> Option<(&TypedExpression, SymbolId)> {
        match &self.kind {
            TypedExpressionKind::IndexedPropertyReference { object, property } => {
                Some((object.as_ref(), *property))
            }
            _ => None,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Bool(bool),
    String(String),
    Null,
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum TypedExpressionKind {
    Literal {
        value: LiteralValue,
    },

    /// Local variable or parameter
    Variable {
        symbol_id: SymbolId,
    },

    This,

    FieldAccess {
        object: Box<TypedExpression>,
        field_symbol: SymbolId,
    },

    /// Zero-argument property read (`obj.Length`)
    PropertyAccess {
        object: Box<TypedExpression>,
        property: SymbolId,
    },

    /// Reference to an indexed property without its argument list
    /// (`obj.Item` in `obj.Item[x, y]`). Only valid as the receiver of an
    /// indexer access.
    IndexedPropertyReference {
        object: Box<TypedExpression>,
        property: SymbolId,
    },

    /// Method call; `receiver` is `None` for static methods. Arguments are
    /// already in parameter order.
    MethodCall {
        receiver: Option<Box<TypedExpression>>,
        method_symbol: SymbolId,
        arguments: Vec<TypedExpression>,
    },

    /// `^operand`
    FromEnd {
        operand: Box<TypedExpression>,
    },

    /// `start..end`, either bound optional
    Range {
        start: Option<Box<TypedExpression>>,
        end: Option<Box<TypedExpression>>,
    },

    /// Any indexing expression
    Access(AccessNode),
}

/// One syntactic indexing expression before lowering
#[derive(Debug, Clone)]
pub enum AccessNode {
    Indexer(IndexerAccess),
    DynamicIndexer(DynamicIndexerAccess),
    IndexPattern(IndexPatternAccess),
    RangePattern(RangePatternAccess),
}

impl AccessNode {
    pub fn result_type(&self) -> TypeId {
        match self {
            AccessNode::Indexer(node) => node.result_type,
            AccessNode::DynamicIndexer(node) => node.result_type,
            AccessNode::IndexPattern(node) => node.result_type,
            AccessNode::RangePattern(node) => node.result_type,
        }
    }

    pub fn receiver(&self) -> &TypedExpression {
        match self {
            AccessNode::Indexer(node) => &node.receiver,
            AccessNode::DynamicIndexer(node) => &node.receiver,
            AccessNode::IndexPattern(node) => &node.receiver,
            AccessNode::RangePattern(node) => &node.receiver,
        }
    }
}

/// Call-shape information shared by static and dynamic indexers
#[derive(Debug, Clone, Default)]
pub struct ArgumentShape {
    /// Names of named arguments; empty when no argument is named
    pub names: Vec<Option<String>>,
    /// Ref kinds per argument; empty when every argument is by value
    pub ref_kinds: RefKinds,
    /// Trailing arguments are packaged into the params-array parameter
    pub expanded_params: bool,
    /// Argument index to parameter index, when the binder had to reorder
    pub arg_to_param_map: Option<Vec<usize>>,
}

impl ArgumentShape {
    pub fn positional() -> Self {
        Self::default()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).and_then(|n| n.as_deref())
    }

    pub fn ref_kind(&self, index: usize) -> RefKind {
        self.ref_kinds.get(index).copied().unwrap_or_default()
    }
}

/// Resolved indexer access `receiver[arguments]`
#[derive(Debug, Clone)]
pub struct IndexerAccess {
    pub receiver: Box<TypedExpression>,
    pub arguments: Vec<TypedExpression>,
    /// The indexer property
    pub indexer: SymbolId,
    pub shape: ArgumentShape,
    pub result_type: TypeId,
}

/// Dynamically typed indexing; resolved at run time
#[derive(Debug, Clone)]
pub struct DynamicIndexerAccess {
    pub receiver: Box<TypedExpression>,
    pub arguments: Vec<TypedExpression>,
    /// Statically known applicable indexers, if any
    pub applicable_candidates: Vec<SymbolId>,
    pub names: Vec<Option<String>>,
    pub ref_kinds: RefKinds,
    pub result_type: TypeId,
}

/// `receiver[index]` where `index` has the end-relative index type
#[derive(Debug, Clone)]
pub struct IndexPatternAccess {
    pub receiver: Box<TypedExpression>,
    /// `Length` or `Count` property (or field)
    pub length_or_count: SymbolId,
    /// Indexer taking a single integer; `None` for built-in array element access
    pub int_indexer: Option<SymbolId>,
    pub argument: Box<TypedExpression>,
    pub result_type: TypeId,
}

/// `receiver[range]` where `range` has the range type
#[derive(Debug, Clone)]
pub struct RangePatternAccess {
    pub receiver: Box<TypedExpression>,
    pub length_or_count: SymbolId,
    /// `Slice(start, length)` method
    pub slice_method: SymbolId,
    pub argument: Box<TypedExpression>,
    pub result_type: TypeId,
}
