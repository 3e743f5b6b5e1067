//! High-Level Intermediate Representation (HIR) produced by access lowering
//!
//! HIR has no indexing sugar left: indexers are getter calls, dynamic
//! indexing is an explicit run-time operation, and index/range patterns are
//! length/offset arithmetic over temporaries. Temporaries only exist inside
//! the `Sequence` that declares them.

use crate::tast::{RefKinds, SourceLocation, SymbolId, TempId, TypeId};
use serde::Serialize;

/// HIR Expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HirExpr {
    pub kind: HirExprKind,
    pub ty: TypeId,
    pub source_location: SourceLocation,
}

/// HIR Expression kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HirExprKind {
    // === Literals ===
    Literal(HirLiteral),

    // === Variables ===
    Variable {
        symbol: SymbolId,
    },

    /// Read of a synthesized temporary
    Temp {
        temp: TempId,
    },

    This,

    // === Member access ===
    Field {
        object: Box<HirExpr>,
        field: SymbolId,
    },

    // === Built-in array element access ===
    Index {
        object: Box<HirExpr>,
        index: Box<HirExpr>,
    },

    // === Calls ===
    /// Method call; `receiver` is `None` for static methods.
    /// `returns_by_ref` marks a call whose result is a storage location.
    Call {
        receiver: Option<Box<HirExpr>>,
        method: SymbolId,
        args: Vec<HirExpr>,
        returns_by_ref: bool,
    },

    /// Constructor call
    New {
        constructor: SymbolId,
        args: Vec<HirExpr>,
    },

    // === Operators ===
    Binary {
        op: HirBinaryOp,
        lhs: Box<HirExpr>,
        rhs: Box<HirExpr>,
    },

    /// Synthesized params array
    Array {
        elements: Vec<HirExpr>,
    },

    // === Sequencing ===
    /// Initialize a temporary; evaluates to nothing
    Store {
        temp: TempId,
        value: Box<HirExpr>,
    },

    /// Evaluate `side_effects` in order, then yield `result`.
    /// `side_effects[i]` is the store that initializes `temps[i]`.
    Sequence {
        temps: Vec<HirTemp>,
        side_effects: Vec<HirExpr>,
        result: Box<HirExpr>,
    },

    // === Dynamic operations ===
    /// Run-time member lookup; `result_indexed` asks for a value that can be
    /// indexed further (indexed property)
    DynamicGetMember {
        receiver: Box<HirExpr>,
        name: String,
        result_indexed: bool,
    },

    /// Run-time indexed element read
    DynamicGetIndex {
        receiver: Box<HirExpr>,
        args: Vec<HirExpr>,
        arg_names: Vec<Option<String>>,
        ref_kinds: RefKinds,
    },
}

/// Literals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HirLiteral {
    Int(i64),
    Bool(bool),
    String(String),
    Null,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HirBinaryOp {
    Add,
    Sub,
}

impl HirBinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            HirBinaryOp::Add => "+",
            HirBinaryOp::Sub => "-",
        }
    }
}

/// How a temporary holds its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RefCapability {
    /// Holds a copy
    Value,
    /// Aliases the storage location of its initializer
    Ref,
}

/// A synthesized local binding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HirTemp {
    pub id: TempId,
    pub name: String,
    pub ty: TypeId,
    pub capability: RefCapability,
}

impl HirTemp {
    /// Expression reading this temporary
    pub fn reference(&self, source_location: SourceLocation) -> HirExpr {
        HirExpr::new(HirExprKind::Temp { temp: self.id }, self.ty, source_location)
    }
}

impl HirExpr {
    pub fn new(kind: HirExprKind, ty: TypeId, source_location: SourceLocation) -> Self {
        Self {
            kind,
            ty,
            source_location,
        }
    }

    pub fn literal(value: HirLiteral, ty: TypeId, source_location: SourceLocation) -> Self {
        Self::new(HirExprKind::Literal(value), ty, source_location)
    }

    pub fn call(
        receiver: Option<HirExpr>,
        method: SymbolId,
        args: Vec<HirExpr>,
        ty: TypeId,
        source_location: SourceLocation,
    ) -> Self {
        Self::new(
            HirExprKind::Call {
                receiver: receiver.map(Box::new),
                method,
                args,
                returns_by_ref: false,
            },
            ty,
            source_location,
        )
    }

    /// Reading this expression has no side effects and yields the same value
    /// no matter when it is evaluated relative to its siblings.
    pub fn is_stable(&self) -> bool {
        matches!(
            self.kind,
            HirExprKind::Literal(_) | HirExprKind::Temp { .. } | HirExprKind::This
        )
    }

    /// Reading this expression has no side effects, though the value may
    /// change if a sibling writes to the same storage.
    pub fn is_side_effect_free(&self) -> bool {
        match &self.kind {
            HirExprKind::Literal(_)
            | HirExprKind::Variable { .. }
            | HirExprKind::Temp { .. }
            | HirExprKind::This => true,
            HirExprKind::Field { object, .. } => object.is_side_effect_free(),
            _ => false,
        }
    }

    /// Mark a call as returning a reference; other expressions pass through
    pub fn with_ref_return(mut self, by_ref: bool) -> Self {
        if let HirExprKind::Call { returns_by_ref, .. } = &mut self.kind {
            *returns_by_ref = by_ref;
        }
        self
    }

    /// Denotes a storage location a by-reference temporary can alias
    pub fn is_addressable(&self) -> bool {
        match &self.kind {
            HirExprKind::Variable { .. } | HirExprKind::Temp { .. } | HirExprKind::This => true,
            HirExprKind::Field { object, .. } => object.is_addressable(),
            HirExprKind::Index { .. } => true,
            HirExprKind::Call { returns_by_ref, .. } => *returns_by_ref,
            HirExprKind::Sequence { result, .. } => result.is_addressable(),
            _ => false,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, HirExprKind::Sequence { .. })
    }
}

/// Output of lowering one access node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LoweredAccess {
    /// Read mode, or write mode through a by-reference accessor
    Value(HirExpr),
    /// Write mode: handed to assignment lowering
    Target(AccessTarget),
}

impl LoweredAccess {
    pub fn as_value(&self) -> Option<&HirExpr> {
        match self {
            LoweredAccess::Value(expr) => Some(expr),
            LoweredAccess::Target(_) => None,
        }
    }

    pub fn as_target(&self) -> Option<&AccessTarget> {
        match self {
            LoweredAccess::Target(target) => Some(target),
            LoweredAccess::Value(_) => None,
        }
    }
}

/// Assignable location for the assignment-lowering stage.
///
/// `prefix_temps`/`prefix_stores` must be evaluated, in order, before the
/// location is read or written. Receiver and arguments inside `kind` may
/// refer to those temporaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessTarget {
    pub prefix_temps: Vec<HirTemp>,
    pub prefix_stores: Vec<HirExpr>,
    pub kind: AccessTargetKind,
    pub ty: TypeId,
    pub source_location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AccessTargetKind {
    /// Indexer with its accessors; arguments are lowered but not normalized,
    /// so a compound assignment can normalize once for both accessors
    Indexer {
        receiver: Box<HirExpr>,
        indexer: SymbolId,
        getter: Option<SymbolId>,
        setter: Option<SymbolId>,
        args: Vec<HirExpr>,
        arg_names: Vec<Option<String>>,
        ref_kinds: RefKinds,
        expanded_params: bool,
        arg_to_param_map: Option<Vec<usize>>,
    },
    /// Dynamically resolved indexer
    DynamicIndex {
        receiver: Box<HirExpr>,
        args: Vec<HirExpr>,
        arg_names: Vec<Option<String>>,
        ref_kinds: RefKinds,
    },
    /// Built-in array element
    Element {
        object: Box<HirExpr>,
        index: Box<HirExpr>,
    },
}

impl AccessTarget {
    pub fn receiver(&self) -> &HirExpr {
        match &self.kind {
            AccessTargetKind::Indexer { receiver, .. } | AccessTargetKind::DynamicIndex { receiver, .. } => {
                receiver
            }
            AccessTargetKind::Element { object, .. } => object,
        }
    }
}
