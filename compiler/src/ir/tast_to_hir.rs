//! TAST to HIR access lowering
//!
//! Entry point of the stage. A [`LoweringContext`] is created per method
//! body and carries everything the access lowerings need: read-only symbol
//! and type tables, the well-known member resolver, the embedding trigger,
//! the argument builder and the temporary allocator. Sub-expressions are
//! lowered through an [`ExpressionVisitor`] supplied by the caller;
//! [`TastToHirVisitor`] covers the expression shapes of the typed tree.
//!
//! Upstream guarantees are checked here and a broken one is a compiler bug:
//! [`contract_violation`] logs and panics in every build.

use super::arguments::{ArgumentBuilder, DefaultArgumentBuilder};
use super::dump;
use super::hir::{HirExpr, HirExprKind, HirLiteral, HirTemp, LoweredAccess, RefCapability};
use super::temporaries::{self, TempAllocator};
use super::validation;
use super::well_known::{TypeEmbedder, WellKnownMember, WellKnownMemberError, WellKnownMembers};
use crate::tast::{
    AccessNode, LiteralValue, MethodSymbol, PropertySymbol, SourceLocation, Symbol, SymbolId, SymbolTable,
    TypeId, TypeTable, TypedExpression, TypedExpressionKind,
};
use log::{debug, error, trace};
use std::fmt;

static DEFAULT_ARGUMENT_BUILDER: DefaultArgumentBuilder = DefaultArgumentBuilder;

/// Whether the access produces a value or an assignable location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    /// Left-hand side of a simple or compound assignment
    Write,
}

impl AccessMode {
    pub fn is_write(self) -> bool {
        self == AccessMode::Write
    }
}

/// Options for the access lowering stage
#[derive(Debug, Clone)]
pub struct LoweringOptions {
    /// Run the sequence validator on every lowered access; a failure is a
    /// contract violation
    pub validate_output: bool,

    /// Log the pretty-printed HIR of every lowered access at trace level
    pub dump_lowered: bool,

    /// Prefix of synthesized temporary names
    pub temp_name_prefix: String,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            validate_output: cfg!(debug_assertions),
            dump_lowered: false,
            temp_name_prefix: "_tmp".to_string(),
        }
    }
}

impl LoweringOptions {
    /// Options for tests: always validate, always dump
    pub fn strict() -> Self {
        Self {
            validate_output: true,
            dump_lowered: true,
            ..Self::default()
        }
    }
}

/// A broken upstream invariant
#[derive(Debug, Clone, PartialEq)]
pub enum ContractViolation {
    /// The callee of an indexer access is not an indexer property
    NotAnIndexer { symbol: SymbolId },
    /// A read reached lowering for an indexer without a getter
    MissingGetter { indexer: SymbolId },
    /// A symbol expected to be a method is something else
    NotAMethod { symbol: SymbolId },
    /// Length/count accessor or property read target is not readable
    NotReadable { symbol: SymbolId },
    /// Pattern lowering entered with a non-pattern access node
    NotAPattern,
    /// Index/range pattern argument has the wrong static type
    PatternArgumentType { expected: &'static str, found: TypeId },
    /// Built-in element access requested for a non-array receiver
    NotAnArray { found: TypeId },
    /// A range slice cannot be assigned to
    RangeAsAssignmentTarget,
    /// Slice method does not take `(start, length)`
    BadSliceSignature { method: SymbolId },
    /// Indexed-property reference outside an indexer receiver
    StrayIndexedProperty { property: SymbolId },
    /// Standard library lacks a member the lowering needs
    UnresolvedWellKnownMember(WellKnownMemberError),
    /// Argument list does not fit the parameter list
    MalformedArguments { reason: String },
    /// A read-mode lowering produced an assignment target
    TargetInReadMode,
    /// Lowered output breaks the sequence invariant
    MalformedSequence { report: String },
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::NotAnIndexer { symbol } => write!(f, "{} is not an indexer", symbol),
            ContractViolation::MissingGetter { indexer } => {
                write!(f, "indexer {} has no getter but is read", indexer)
            }
            ContractViolation::NotAMethod { symbol } => write!(f, "{} is not a method", symbol),
            ContractViolation::NotReadable { symbol } => write!(f, "{} cannot be read", symbol),
            ContractViolation::NotAPattern => write!(f, "pattern lowering reached a non-pattern access"),
            ContractViolation::PatternArgumentType { expected, found } => {
                write!(f, "pattern argument must have type {}, found {}", expected, found)
            }
            ContractViolation::NotAnArray { found } => {
                write!(f, "element access without an indexer on non-array type {}", found)
            }
            ContractViolation::RangeAsAssignmentTarget => {
                write!(f, "range slice used as an assignment target")
            }
            ContractViolation::BadSliceSignature { method } => {
                write!(f, "slice method {} must take (start, length)", method)
            }
            ContractViolation::StrayIndexedProperty { property } => {
                write!(f, "indexed property {} used without an argument list", property)
            }
            ContractViolation::UnresolvedWellKnownMember(err) => write!(f, "{}", err),
            ContractViolation::MalformedArguments { reason } => write!(f, "malformed arguments: {}", reason),
            ContractViolation::TargetInReadMode => write!(f, "read-mode lowering produced an assignment target"),
            ContractViolation::MalformedSequence { report } => write!(f, "malformed lowered sequence: {}", report),
        }
    }
}

/// Abort lowering: an upstream invariant is broken and any output would be
/// a miscompilation.
#[track_caller]
pub fn contract_violation(violation: ContractViolation) -> ! {
    error!("access lowering contract violation: {}", violation);
    panic!("access lowering contract violation: {}", violation);
}

/// Lowers sub-expressions (receivers, arguments) before an access lowering
/// consumes them
pub trait ExpressionVisitor {
    fn visit(&mut self, cx: &mut LoweringContext<'_>, expr: &TypedExpression) -> HirExpr;
}

/// Lowering state for one method body
pub struct LoweringContext<'a> {
    /// Symbol table from TAST
    symbols: &'a SymbolTable,

    /// Type table from TAST
    types: &'a TypeTable,

    /// Standard library member lookup
    well_known: &'a dyn WellKnownMembers,

    /// Interop metadata trigger for dynamic call sites
    embedder: &'a mut dyn TypeEmbedder,

    /// Defaults and params-array construction
    arguments: &'a dyn ArgumentBuilder,

    /// Temporary ids, unique within this body
    temps: TempAllocator,

    options: LoweringOptions,
}

impl<'a> LoweringContext<'a> {
    /// Create a lowering context for one method body
    pub fn new(
        symbols: &'a SymbolTable,
        types: &'a TypeTable,
        well_known: &'a dyn WellKnownMembers,
        embedder: &'a mut dyn TypeEmbedder,
    ) -> Self {
        let options = LoweringOptions::default();
        Self {
            symbols,
            types,
            well_known,
            embedder,
            arguments: &DEFAULT_ARGUMENT_BUILDER,
            temps: TempAllocator::new(options.temp_name_prefix.clone()),
            options,
        }
    }

    /// Replace the options. Temporaries allocated so far keep their ids;
    /// later ones continue the count under the new prefix.
    pub fn with_options(mut self, options: LoweringOptions) -> Self {
        self.temps.set_prefix(options.temp_name_prefix.clone());
        self.options = options;
        self
    }

    pub fn with_argument_builder(mut self, arguments: &'a dyn ArgumentBuilder) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    pub fn types(&self) -> &'a TypeTable {
        self.types
    }

    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    pub(crate) fn argument_builder(&self) -> &'a dyn ArgumentBuilder {
        self.arguments
    }

    pub(crate) fn embedder(&mut self) -> &mut dyn TypeEmbedder {
        &mut *self.embedder
    }

    pub(crate) fn temps(&mut self) -> &mut TempAllocator {
        &mut self.temps
    }

    /// Spill `value` into a fresh temporary of this body
    pub fn bind(&mut self, value: HirExpr, capability: RefCapability) -> (HirTemp, HirExpr) {
        temporaries::bind(&mut self.temps, value, capability)
    }

    /// Resolve a well-known member; a missing member is fatal here
    pub fn well_known(&self, member: WellKnownMember) -> SymbolId {
        match self.well_known.resolve(member) {
            Ok(symbol) => symbol,
            Err(err) => contract_violation(ContractViolation::UnresolvedWellKnownMember(err)),
        }
    }

    pub(crate) fn method(&self, symbol: SymbolId) -> &'a MethodSymbol {
        match self.symbols.method(symbol) {
            Some(method) => method,
            None => contract_violation(ContractViolation::NotAMethod { symbol }),
        }
    }

    pub(crate) fn indexer(&self, symbol: SymbolId) -> &'a PropertySymbol {
        match self.symbols.property(symbol) {
            Some(property) => property,
            None => contract_violation(ContractViolation::NotAnIndexer { symbol }),
        }
    }

    /// Getter of a property that must be readable
    pub(crate) fn getter_of(&self, property_id: SymbolId) -> SymbolId {
        match self.indexer(property_id).getter {
            Some(getter) => getter,
            None => contract_violation(ContractViolation::MissingGetter { indexer: property_id }),
        }
    }

    /// Zero-argument read of a property or field on `receiver`
    pub(crate) fn read_member(&self, receiver: HirExpr, member: SymbolId, location: SourceLocation) -> HirExpr {
        match self.symbols.get(member) {
            Some(Symbol::Property(property)) => {
                let Some(getter) = property.getter else {
                    contract_violation(ContractViolation::NotReadable { symbol: member });
                };
                let by_ref = property.returns_by_ref || self.method(getter).returns_by_ref;
                HirExpr::call(Some(receiver), getter, Vec::new(), property.ty, location).with_ref_return(by_ref)
            }
            Some(Symbol::Field(field)) => HirExpr::new(
                HirExprKind::Field {
                    object: Box::new(receiver),
                    field: member,
                },
                field.ty,
                location,
            ),
            _ => contract_violation(ContractViolation::NotReadable { symbol: member }),
        }
    }

    /// Lower one access node in the given mode
    pub fn lower_access(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &AccessNode,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        tracing::debug!(?mode, %location, "lowering access node");
        let lowered = match node {
            AccessNode::Indexer(access) => self.lower_indexer_access(visitor, access, mode, location),
            AccessNode::DynamicIndexer(access) => self.lower_dynamic_indexer_access(visitor, access, mode, location),
            AccessNode::IndexPattern(_) | AccessNode::RangePattern(_) => {
                self.lower_pattern_access(visitor, node, mode, location)
            }
        };

        if self.options.validate_output {
            if let Err(errors) = validation::validate_lowered(&lowered) {
                let report = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
                contract_violation(ContractViolation::MalformedSequence { report });
            }
        }
        if self.options.dump_lowered {
            trace!("lowered {}: {}", location, dump::dump_lowered(&lowered, self.symbols));
        }
        debug!(
            "lowered access at {} ({} temporaries allocated so far)",
            location,
            self.temps.allocated()
        );
        lowered
    }

    /// Lower a read-mode access and return its value
    pub fn lower_access_value(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &AccessNode,
        location: SourceLocation,
    ) -> HirExpr {
        match self.lower_access(visitor, node, AccessMode::Read, location) {
            LoweredAccess::Value(expr) => expr,
            LoweredAccess::Target(_) => contract_violation(ContractViolation::TargetInReadMode),
        }
    }

    /// Lower any typed expression with the default visitor
    pub fn lower_expression(&mut self, expr: &TypedExpression) -> HirExpr {
        TastToHirVisitor.visit(self, expr)
    }
}

/// Default visitor for the typed tree
#[derive(Debug, Default, Clone, Copy)]
pub struct TastToHirVisitor;

impl TastToHirVisitor {
    /// Coerce a range endpoint to the index type
    fn lower_index_operand(&mut self, cx: &mut LoweringContext<'_>, operand: &TypedExpression) -> HirExpr {
        let lowered = self.visit(cx, operand);
        if cx.types().is_int(operand.expr_type) {
            let from_int = cx.well_known(WellKnownMember::IndexFromInt);
            HirExpr::call(None, from_int, vec![lowered], cx.types().index_type(), operand.source_location)
        } else {
            lowered
        }
    }
}

impl ExpressionVisitor for TastToHirVisitor {
    fn visit(&mut self, cx: &mut LoweringContext<'_>, expr: &TypedExpression) -> HirExpr {
        let location = expr.source_location;
        let kind = match &expr.kind {
            TypedExpressionKind::Literal { value } => HirExprKind::Literal(match value {
                LiteralValue::Int(v) => HirLiteral::Int(*v),
                LiteralValue::Bool(v) => HirLiteral::Bool(*v),
                LiteralValue::String(v) => HirLiteral::String(v.clone()),
                LiteralValue::Null => HirLiteral::Null,
            }),
            TypedExpressionKind::Variable { symbol_id } => HirExprKind::Variable { symbol: *symbol_id },
            TypedExpressionKind::This => HirExprKind::This,
            TypedExpressionKind::FieldAccess { object, field_symbol } => HirExprKind::Field {
                object: Box::new(self.visit(cx, object)),
                field: *field_symbol,
            },
            TypedExpressionKind::PropertyAccess { object, property } => {
                let object = self.visit(cx, object);
                return cx.read_member(object, *property, location);
            }
            TypedExpressionKind::IndexedPropertyReference { property, .. } => {
                contract_violation(ContractViolation::StrayIndexedProperty { property: *property })
            }
            TypedExpressionKind::MethodCall {
                receiver,
                method_symbol,
                arguments,
            } => {
                let receiver = receiver.as_ref().map(|r| Box::new(self.visit(cx, r)));
                let args = arguments.iter().map(|a| self.visit(cx, a)).collect();
                HirExprKind::Call {
                    receiver,
                    method: *method_symbol,
                    args,
                    returns_by_ref: cx.method(*method_symbol).returns_by_ref,
                }
            }
            TypedExpressionKind::FromEnd { operand } => {
                let constructor = cx.well_known(WellKnownMember::IndexConstructor);
                let value = self.visit(cx, operand);
                let from_end = HirExpr::literal(HirLiteral::Bool(true), cx.types().bool_type(), location);
                HirExprKind::New {
                    constructor,
                    args: vec![value, from_end],
                }
            }
            TypedExpressionKind::Range { start, end } => match (start, end) {
                (Some(start), Some(end)) => {
                    let constructor = cx.well_known(WellKnownMember::RangeConstructor);
                    let start = self.lower_index_operand(cx, start);
                    let end = self.lower_index_operand(cx, end);
                    HirExprKind::New {
                        constructor,
                        args: vec![start, end],
                    }
                }
                (Some(start), None) => HirExprKind::Call {
                    receiver: None,
                    method: cx.well_known(WellKnownMember::RangeStartAt),
                    args: vec![self.lower_index_operand(cx, start)],
                    returns_by_ref: false,
                },
                (None, Some(end)) => HirExprKind::Call {
                    receiver: None,
                    method: cx.well_known(WellKnownMember::RangeEndAt),
                    args: vec![self.lower_index_operand(cx, end)],
                    returns_by_ref: false,
                },
                (None, None) => HirExprKind::Call {
                    receiver: None,
                    method: cx.well_known(WellKnownMember::RangeAll),
                    args: Vec::new(),
                    returns_by_ref: false,
                },
            },
            TypedExpressionKind::Access(node) => return cx.lower_access_value(self, node, location),
        };
        HirExpr::new(kind, expr.expr_type, location)
    }
}
