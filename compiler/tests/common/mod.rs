//! Shared fixture for the access lowering tests: a tiny standard library
//! (index/range members, a list class, a span struct, a grid with optional
//! and params parameters), builders for typed access nodes, and a HIR
//! evaluator that records every call in evaluation order.

#![allow(dead_code)]

use sable_compiler::ir::{
    dump, AccessMode, HirExpr, HirExprKind, HirLiteral, HirBinaryOp, LoweredAccess, LoweringContext,
    LoweringOptions, NoEmbedding, TypeEmbedder, WellKnownMember, WellKnownMemberTable,
};
use sable_compiler::tast::{
    AccessNode, ArgumentShape, ConstantValue, DynamicIndexerAccess, IndexPatternAccess, IndexerAccess,
    LiteralValue, MethodSymbol, ParamInfo, PropertySymbol, RangePatternAccess, RefKind, RefKinds,
    SourceLocation, Symbol, SymbolId, SymbolTable, TempId, TypeId, TypeKind, TypeTable, TypedExpression,
    TypedExpressionKind,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub fn loc() -> SourceLocation {
    SourceLocation::new(1, 1, 1, 0)
}

pub struct Fixture {
    pub types: TypeTable,
    pub symbols: SymbolTable,
    pub well_known: WellKnownMemberTable,

    pub int: TypeId,
    pub bool_ty: TypeId,
    pub index: TypeId,
    pub range: TypeId,
    pub dynamic: TypeId,
    pub void: TypeId,
    pub list_ty: TypeId,
    pub span_ty: TypeId,
    pub grid_ty: TypeId,
    pub sheet_ty: TypeId,
    pub int_array: TypeId,
    pub array_length: SymbolId,

    // List (class)
    pub list_count: SymbolId,
    pub list_get_count: SymbolId,
    pub list_item: SymbolId,
    pub list_get_item: SymbolId,
    pub list_set_item: SymbolId,
    pub list_slice: SymbolId,

    // Span (struct)
    pub span_length: SymbolId,
    pub span_item: SymbolId,
    pub span_get_item: SymbolId,
    pub span_slice: SymbolId,

    // Grid (class)
    pub grid_item: SymbolId,
    pub grid_get_item: SymbolId,
    pub grid_cell: SymbolId,
    pub grid_get_cell: SymbolId,
    pub grid_slot: SymbolId,
    pub grid_get_slot: SymbolId,
    pub grid_write_only: SymbolId,

    // Sheet (class with an indexed property)
    pub sheet_cells: SymbolId,
    pub sheet_get_cells: SymbolId,
    pub sheet_rows: SymbolId,

    // Side-effecting helpers
    pub tick: SymbolId,
    pub make_list: SymbolId,
    pub make_span: SymbolId,
    pub make_index: SymbolId,
    pub bad_slice: SymbolId,

    // Locals
    pub list: SymbolId,
    pub span: SymbolId,
    pub grid: SymbolId,
    pub sheet: SymbolId,
    pub idx: SymbolId,
    pub rng: SymbolId,
    pub dyn_local: SymbolId,
    pub arr: SymbolId,
    pub i: SymbolId,
}

fn method(symbols: &mut SymbolTable, name: &str, declaring: TypeId, params: Vec<ParamInfo>, ret: TypeId) -> SymbolId {
    symbols.add_method(MethodSymbol::new(name, declaring, params, ret))
}

fn static_method(symbols: &mut SymbolTable, name: &str, declaring: TypeId, params: Vec<ParamInfo>, ret: TypeId) -> SymbolId {
    symbols.add_method(MethodSymbol::new(name, declaring, params, ret).into_static())
}

fn property(
    symbols: &mut SymbolTable,
    name: &str,
    declaring: TypeId,
    ty: TypeId,
    params: Vec<ParamInfo>,
    getter: Option<SymbolId>,
    setter: Option<SymbolId>,
) -> SymbolId {
    symbols.add_property(PropertySymbol {
        name: name.to_string(),
        declaring_type: declaring,
        ty,
        params,
        getter,
        setter,
        returns_by_ref: false,
        is_indexed_property: false,
    })
}

impl Fixture {
    pub fn new() -> Self {
        let mut types = TypeTable::new();
        let mut symbols = SymbolTable::new();
        let mut well_known = WellKnownMemberTable::new();

        let int = types.int_type();
        let bool_ty = types.bool_type();
        let index = types.index_type();
        let range = types.range_type();
        let dynamic = types.dynamic_type();
        let void = types.void_type();
        let list_ty = types.intern(TypeKind::Class {
            symbol_id: SymbolId::invalid(),
            name: "List".to_string(),
        });
        let span_ty = types.intern(TypeKind::Struct {
            symbol_id: SymbolId::invalid(),
            name: "Span".to_string(),
        });
        let grid_ty = types.intern(TypeKind::Class {
            symbol_id: SymbolId::invalid(),
            name: "Grid".to_string(),
        });
        let sheet_ty = types.intern(TypeKind::Class {
            symbol_id: SymbolId::invalid(),
            name: "Sheet".to_string(),
        });
        let int_array = types.intern(TypeKind::Array { element_type: int });

        // Standard library index/range members
        let index_ctor = static_method(
            &mut symbols,
            "Index",
            index,
            vec![ParamInfo::new("value", int), ParamInfo::new("fromEnd", bool_ty)],
            index,
        );
        let get_offset = method(&mut symbols, "GetOffset", index, vec![ParamInfo::new("length", int)], int);
        let from_int = static_method(&mut symbols, "FromInt", index, vec![ParamInfo::new("value", int)], index);
        let range_ctor = static_method(
            &mut symbols,
            "Range",
            range,
            vec![ParamInfo::new("start", index), ParamInfo::new("end", index)],
            range,
        );
        let get_start = method(&mut symbols, "get_Start", range, vec![], index);
        let get_end = method(&mut symbols, "get_End", range, vec![], index);
        let start_at = static_method(&mut symbols, "StartAt", range, vec![ParamInfo::new("start", index)], range);
        let end_at = static_method(&mut symbols, "EndAt", range, vec![ParamInfo::new("end", index)], range);
        let all = static_method(&mut symbols, "All", range, vec![], range);
        well_known
            .register(WellKnownMember::IndexConstructor, index_ctor)
            .register(WellKnownMember::IndexGetOffset, get_offset)
            .register(WellKnownMember::IndexFromInt, from_int)
            .register(WellKnownMember::RangeConstructor, range_ctor)
            .register(WellKnownMember::RangeGetStart, get_start)
            .register(WellKnownMember::RangeGetEnd, get_end)
            .register(WellKnownMember::RangeStartAt, start_at)
            .register(WellKnownMember::RangeEndAt, end_at)
            .register(WellKnownMember::RangeAll, all);

        let array_get_length = method(&mut symbols, "get_Length", int_array, vec![], int);
        let array_length = property(&mut symbols, "Length", int_array, int, vec![], Some(array_get_length), None);

        // List
        let list_get_count = method(&mut symbols, "get_Count", list_ty, vec![], int);
        let list_count = property(&mut symbols, "Count", list_ty, int, vec![], Some(list_get_count), None);
        let list_get_item = method(&mut symbols, "get_Item", list_ty, vec![ParamInfo::new("index", int)], int);
        let list_set_item = method(
            &mut symbols,
            "set_Item",
            list_ty,
            vec![ParamInfo::new("index", int), ParamInfo::new("value", int)],
            void,
        );
        let list_item = property(
            &mut symbols,
            "Item",
            list_ty,
            int,
            vec![ParamInfo::new("index", int)],
            Some(list_get_item),
            Some(list_set_item),
        );
        let list_slice = method(
            &mut symbols,
            "Slice",
            list_ty,
            vec![ParamInfo::new("start", int), ParamInfo::new("length", int)],
            list_ty,
        );

        // Span
        let span_get_length = method(&mut symbols, "get_Length", span_ty, vec![], int);
        let span_length = property(&mut symbols, "Length", span_ty, int, vec![], Some(span_get_length), None);
        let span_get_item = method(&mut symbols, "get_Item", span_ty, vec![ParamInfo::new("index", int)], int);
        let span_item = property(
            &mut symbols,
            "Item",
            span_ty,
            int,
            vec![ParamInfo::new("index", int)],
            Some(span_get_item),
            None,
        );
        let span_slice = method(
            &mut symbols,
            "Slice",
            span_ty,
            vec![ParamInfo::new("start", int), ParamInfo::new("length", int)],
            span_ty,
        );

        // Grid: Item[x, y = 0, params rest], Cell[ref x, y], Slot[x] returning by reference
        let grid_params = vec![
            ParamInfo::new("x", int),
            ParamInfo::new("y", int).with_default(ConstantValue::Int(0)),
            ParamInfo::new("rest", int_array).params_array(),
        ];
        let grid_get_item = method(&mut symbols, "get_Item", grid_ty, grid_params.clone(), int);
        let grid_item = property(&mut symbols, "Item", grid_ty, int, grid_params, Some(grid_get_item), None);
        let cell_params = vec![
            ParamInfo::new("x", int).with_ref_kind(RefKind::Ref),
            ParamInfo::new("y", int),
        ];
        let grid_get_cell = method(&mut symbols, "get_Cell", grid_ty, cell_params.clone(), int);
        let grid_cell = property(&mut symbols, "Cell", grid_ty, int, cell_params, Some(grid_get_cell), None);
        let mut slot_getter = MethodSymbol::new("get_Slot", grid_ty, vec![ParamInfo::new("x", int)], int);
        slot_getter.returns_by_ref = true;
        let grid_get_slot = symbols.add_method(slot_getter);
        let grid_slot = symbols.add_property(PropertySymbol {
            name: "Slot".to_string(),
            declaring_type: grid_ty,
            ty: int,
            params: vec![ParamInfo::new("x", int)],
            getter: Some(grid_get_slot),
            setter: None,
            returns_by_ref: true,
            is_indexed_property: false,
        });
        let grid_set_only = method(
            &mut symbols,
            "set_WriteOnly",
            grid_ty,
            vec![ParamInfo::new("x", int), ParamInfo::new("value", int)],
            void,
        );
        let grid_write_only = property(
            &mut symbols,
            "WriteOnly",
            grid_ty,
            int,
            vec![ParamInfo::new("x", int)],
            None,
            Some(grid_set_only),
        );

        // Sheet.Cells is an indexed property yielding a List
        let sheet_get_cells = method(&mut symbols, "get_Cells", sheet_ty, vec![], list_ty);
        let sheet_cells = symbols.add_property(PropertySymbol {
            name: "Cells".to_string(),
            declaring_type: sheet_ty,
            ty: list_ty,
            params: vec![],
            getter: Some(sheet_get_cells),
            setter: None,
            returns_by_ref: false,
            is_indexed_property: true,
        });

        let sheet_get_rows = method(&mut symbols, "get_Rows", sheet_ty, vec![], grid_ty);
        let sheet_rows = symbols.add_property(PropertySymbol {
            name: "Rows".to_string(),
            declaring_type: sheet_ty,
            ty: grid_ty,
            params: vec![],
            getter: Some(sheet_get_rows),
            setter: None,
            returns_by_ref: false,
            is_indexed_property: true,
        });

        let tick = static_method(&mut symbols, "tick", void, vec![ParamInfo::new("n", int)], int);
        let make_list = static_method(&mut symbols, "makeList", void, vec![], list_ty);
        let make_span = static_method(&mut symbols, "makeSpan", void, vec![], span_ty);
        let make_index = static_method(&mut symbols, "makeIndex", void, vec![ParamInfo::new("n", int)], index);
        let bad_slice = method(&mut symbols, "Slice3", list_ty, vec![ParamInfo::new("start", int)], list_ty);

        let list = symbols.add_local("list", list_ty);
        let span = symbols.add_local("span", span_ty);
        let grid = symbols.add_local("grid", grid_ty);
        let sheet = symbols.add_local("sheet", sheet_ty);
        let idx = symbols.add_local("idx", index);
        let rng = symbols.add_local("rng", range);
        let dyn_local = symbols.add_local("dyn", dynamic);
        let arr = symbols.add_local("arr", int_array);
        let i = symbols.add_local("i", int);

        Self {
            types,
            symbols,
            well_known,
            int,
            bool_ty,
            index,
            range,
            dynamic,
            void,
            list_ty,
            span_ty,
            grid_ty,
            sheet_ty,
            int_array,
            array_length,
            list_count,
            list_get_count,
            list_item,
            list_get_item,
            list_set_item,
            list_slice,
            span_length,
            span_item,
            span_get_item,
            span_slice,
            grid_item,
            grid_get_item,
            grid_cell,
            grid_get_cell,
            grid_slot,
            grid_get_slot,
            grid_write_only,
            sheet_cells,
            sheet_get_cells,
            sheet_rows,
            tick,
            make_list,
            make_span,
            make_index,
            bad_slice,
            list,
            span,
            grid,
            sheet,
            idx,
            rng,
            dyn_local,
            arr,
            i,
        }
    }

    // === Typed expression builders ===

    pub fn var(&self, symbol: SymbolId) -> TypedExpression {
        let ty = match self.symbols.get(symbol) {
            Some(Symbol::Local(local)) => local.ty,
            other => panic!("{:?} is not a local", other),
        };
        TypedExpression::new(TypedExpressionKind::Variable { symbol_id: symbol }, ty, loc())
    }

    pub fn int_lit(&self, value: i64) -> TypedExpression {
        TypedExpression::new(
            TypedExpressionKind::Literal {
                value: LiteralValue::Int(value),
            },
            self.int,
            loc(),
        )
    }

    /// `tick(n)`: returns `n`, recorded by the evaluator
    pub fn tick(&self, n: i64) -> TypedExpression {
        self.call(self.tick, vec![self.int_lit(n)])
    }

    pub fn call(&self, method: SymbolId, arguments: Vec<TypedExpression>) -> TypedExpression {
        let ret = self.symbols.method(method).map(|m| m.return_type).unwrap();
        TypedExpression::new(
            TypedExpressionKind::MethodCall {
                receiver: None,
                method_symbol: method,
                arguments,
            },
            ret,
            loc(),
        )
    }

    pub fn from_end(&self, operand: TypedExpression) -> TypedExpression {
        TypedExpression::new(
            TypedExpressionKind::FromEnd {
                operand: Box::new(operand),
            },
            self.index,
            loc(),
        )
    }

    pub fn range_of(&self, start: Option<TypedExpression>, end: Option<TypedExpression>) -> TypedExpression {
        TypedExpression::new(
            TypedExpressionKind::Range {
                start: start.map(Box::new),
                end: end.map(Box::new),
            },
            self.range,
            loc(),
        )
    }

    pub fn indexed_property(&self, object: TypedExpression, property: SymbolId) -> TypedExpression {
        let ty = self.symbols.property(property).map(|p| p.ty).unwrap();
        TypedExpression::new(
            TypedExpressionKind::IndexedPropertyReference {
                object: Box::new(object),
                property,
            },
            ty,
            loc(),
        )
    }

    // === Access node builders ===

    pub fn indexer(
        &self,
        receiver: TypedExpression,
        indexer: SymbolId,
        arguments: Vec<TypedExpression>,
        shape: ArgumentShape,
    ) -> AccessNode {
        let result_type = self.symbols.property(indexer).map(|p| p.ty).unwrap();
        AccessNode::Indexer(IndexerAccess {
            receiver: Box::new(receiver),
            arguments,
            indexer,
            shape,
            result_type,
        })
    }

    pub fn dynamic(
        &self,
        receiver: TypedExpression,
        arguments: Vec<TypedExpression>,
        candidates: Vec<SymbolId>,
        names: Vec<Option<String>>,
        ref_kinds: RefKinds,
    ) -> AccessNode {
        AccessNode::DynamicIndexer(DynamicIndexerAccess {
            receiver: Box::new(receiver),
            arguments,
            applicable_candidates: candidates,
            names,
            ref_kinds,
            result_type: self.dynamic,
        })
    }

    pub fn index_pattern(
        &self,
        receiver: TypedExpression,
        length: SymbolId,
        int_indexer: Option<SymbolId>,
        argument: TypedExpression,
    ) -> AccessNode {
        AccessNode::IndexPattern(IndexPatternAccess {
            receiver: Box::new(receiver),
            length_or_count: length,
            int_indexer,
            argument: Box::new(argument),
            result_type: self.int,
        })
    }

    pub fn range_pattern(
        &self,
        receiver: TypedExpression,
        length: SymbolId,
        slice: SymbolId,
        argument: TypedExpression,
    ) -> AccessNode {
        let result_type = receiver.expr_type;
        AccessNode::RangePattern(RangePatternAccess {
            receiver: Box::new(receiver),
            length_or_count: length,
            slice_method: slice,
            argument: Box::new(argument),
            result_type,
        })
    }

    /// An access node used as an expression
    pub fn access(&self, node: AccessNode) -> TypedExpression {
        let ty = node.result_type();
        TypedExpression::new(TypedExpressionKind::Access(node), ty, loc())
    }

    // === Lowering ===

    pub fn lower(&self, node: &AccessNode, mode: AccessMode) -> LoweredAccess {
        let mut embedder = NoEmbedding;
        self.lower_with(node, mode, &mut embedder)
    }

    pub fn lower_with(&self, node: &AccessNode, mode: AccessMode, embedder: &mut dyn TypeEmbedder) -> LoweredAccess {
        sable_compiler::logging::init_test();
        let mut cx = LoweringContext::new(&self.symbols, &self.types, &self.well_known, embedder)
            .with_options(LoweringOptions::strict());
        let mut visitor = sable_compiler::ir::TastToHirVisitor;
        cx.lower_access(&mut visitor, node, mode, loc())
    }

    pub fn lower_read(&self, node: &AccessNode) -> HirExpr {
        match self.lower(node, AccessMode::Read) {
            LoweredAccess::Value(expr) => expr,
            LoweredAccess::Target(target) => panic!("read produced a target: {:?}", target),
        }
    }

    pub fn lower_expr(&self, expr: &TypedExpression) -> HirExpr {
        sable_compiler::logging::init_test();
        let mut embedder = NoEmbedding;
        let mut cx = LoweringContext::new(&self.symbols, &self.types, &self.well_known, &mut embedder)
            .with_options(LoweringOptions::strict());
        cx.lower_expression(expr)
    }

    pub fn dump(&self, expr: &HirExpr) -> String {
        dump::dump_expr(expr, &self.symbols)
    }

    pub fn dump_lowered(&self, lowered: &LoweredAccess) -> String {
        dump::dump_lowered(lowered, &self.symbols)
    }
}

/// Embedder that records every request
#[derive(Debug, Default)]
pub struct RecordingEmbedder {
    pub requests: Vec<(TypeId, SymbolId)>,
}

impl TypeEmbedder for RecordingEmbedder {
    fn embed_if_needed(&mut self, declaring_type: TypeId, candidate: SymbolId, _site: SourceLocation) {
        self.requests.push((declaring_type, candidate));
    }
}

// === Evaluator ===

/// Run-time value of the evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Int(i64),
    Bool(bool),
    Str(String),
    Null,
    Index { value: i64, from_end: bool },
    Range { start: (i64, bool), end: (i64, bool) },
    List(Rc<RefCell<Vec<i64>>>),
    Array(Vec<Value>),
}

impl Value {
    pub fn list(items: &[i64]) -> Self {
        Value::List(Rc::new(RefCell::new(items.to_vec())))
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            other => panic!("expected an int, found {}", other),
        }
    }

    fn as_index(&self) -> (i64, bool) {
        match self {
            Value::Index { value, from_end } => (*value, *from_end),
            other => panic!("expected an index, found {}", other),
        }
    }

    pub fn items(&self) -> Vec<i64> {
        match self {
            Value::List(items) => items.borrow().clone(),
            Value::Array(items) => items.iter().map(Value::as_int).collect(),
            other => panic!("expected a list, found {}", other),
        }
    }
}

fn show_index(value: i64, from_end: bool) -> String {
    if from_end {
        format!("^{}", value)
    } else {
        value.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Null => write!(f, "null"),
            Value::Index { value, from_end } => write!(f, "{}", show_index(*value, *from_end)),
            Value::Range { start, end } => write!(f, "{}..{}", show_index(start.0, start.1), show_index(end.0, end.1)),
            Value::List(items) => write!(f, "{:?}", items.borrow()),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// Evaluates lowered HIR against the fixture library, logging every call,
/// constructor and dynamic operation in the order it runs
pub struct Evaluator<'a> {
    fixture: &'a Fixture,
    pub locals: HashMap<SymbolId, Value>,
    temps: HashMap<TempId, Value>,
    pub events: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(fixture: &'a Fixture) -> Self {
        let mut locals = HashMap::new();
        locals.insert(fixture.list, Value::list(&[10, 20, 30, 40, 50]));
        locals.insert(fixture.span, Value::list(&[1, 2, 3, 4, 5, 6]));
        locals.insert(fixture.grid, Value::list(&[]));
        locals.insert(fixture.sheet, Value::list(&[7, 8, 9]));
        locals.insert(fixture.idx, Value::Index { value: 2, from_end: true });
        locals.insert(fixture.rng, Value::Range { start: (1, false), end: (1, true) });
        locals.insert(fixture.dyn_local, Value::list(&[5, 6, 7]));
        locals.insert(
            fixture.arr,
            Value::Array(vec![Value::Int(100), Value::Int(200), Value::Int(300)]),
        );
        locals.insert(fixture.i, Value::Int(1));
        Self {
            fixture,
            locals,
            temps: HashMap::new(),
            events: Vec::new(),
        }
    }

    fn record(&mut self, name: &str, args: &[Value]) {
        let args: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        self.events.push(format!("{}({})", name, args.join(", ")));
    }

    pub fn eval(&mut self, expr: &HirExpr) -> Value {
        match &expr.kind {
            HirExprKind::Literal(lit) => match lit {
                HirLiteral::Int(v) => Value::Int(*v),
                HirLiteral::Bool(v) => Value::Bool(*v),
                HirLiteral::String(v) => Value::Str(v.clone()),
                HirLiteral::Null => Value::Null,
            },
            HirExprKind::Variable { symbol } => self.locals.get(symbol).cloned().unwrap_or(Value::Null),
            HirExprKind::Temp { temp } => match self.temps.get(temp) {
                Some(value) => value.clone(),
                None => panic!("{} read before its store", temp),
            },
            HirExprKind::This => Value::Null,
            HirExprKind::Field { object, .. } => {
                self.eval(object);
                Value::Null
            }
            HirExprKind::Index { object, index } => {
                let object = self.eval(object);
                let index = self.eval(index).as_int();
                self.record("elem", &[Value::Int(index)]);
                match object {
                    Value::Array(items) => items[index as usize].clone(),
                    other => Value::Int(other.items()[index as usize]),
                }
            }
            HirExprKind::Call { receiver, method, args, .. } => {
                let receiver = receiver.as_ref().map(|r| self.eval(r));
                let args: Vec<Value> = args.iter().map(|a| self.eval(a)).collect();
                self.call(*method, receiver, args)
            }
            HirExprKind::New { constructor, args } => {
                let args: Vec<Value> = args.iter().map(|a| self.eval(a)).collect();
                let name = self.fixture.symbols.name(*constructor).to_string();
                self.record(&format!("new {}", name), &args);
                match name.as_str() {
                    "Index" => {
                        let from_end = matches!(args[1], Value::Bool(true));
                        Value::Index {
                            value: args[0].as_int(),
                            from_end,
                        }
                    }
                    "Range" => Value::Range {
                        start: args[0].as_index(),
                        end: args[1].as_index(),
                    },
                    _ => Value::Null,
                }
            }
            HirExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs).as_int();
                let rhs = self.eval(rhs).as_int();
                match op {
                    HirBinaryOp::Add => Value::Int(lhs + rhs),
                    HirBinaryOp::Sub => Value::Int(lhs - rhs),
                }
            }
            HirExprKind::Array { elements } => Value::Array(elements.iter().map(|e| self.eval(e)).collect()),
            HirExprKind::Store { temp, value } => {
                let value = self.eval(value);
                self.temps.insert(*temp, value);
                Value::Unit
            }
            HirExprKind::Sequence {
                side_effects, result, ..
            } => {
                for store in side_effects {
                    self.eval(store);
                }
                self.eval(result)
            }
            HirExprKind::DynamicGetMember { receiver, name, .. } => {
                let receiver = self.eval(receiver);
                self.record(&format!("dyn_get_member {}", name), &[]);
                receiver
            }
            HirExprKind::DynamicGetIndex { receiver, args, .. } => {
                let receiver = self.eval(receiver);
                let args: Vec<Value> = args.iter().map(|a| self.eval(a)).collect();
                self.record("dyn_get_index", &args);
                Value::Int(receiver.items()[args[0].as_int() as usize])
            }
        }
    }

    fn call(&mut self, method: SymbolId, receiver: Option<Value>, args: Vec<Value>) -> Value {
        let symbol = self.fixture.symbols.method(method).unwrap();
        let name = symbol.name.as_str();
        self.record(name, &args);

        let fx = self.fixture;
        match name {
            "tick" => args[0].clone(),
            "makeList" => Value::list(&[1, 2, 3]),
            "makeSpan" => Value::list(&[9, 8, 7, 6]),
            "makeIndex" => Value::Index {
                value: args[0].as_int(),
                from_end: true,
            },
            "get_Count" | "get_Length" => Value::Int(items_of(&receiver).len() as i64),
            "get_Item" if symbol.declaring_type == fx.grid_ty => {
                let rest = match &args[2] {
                    Value::Array(items) => items.iter().map(Value::as_int).sum::<i64>(),
                    _ => 0,
                };
                Value::Int(args[0].as_int() * 10 + args[1].as_int() + rest)
            }
            "get_Item" => Value::Int(items_of(&receiver)[args[0].as_int() as usize]),
            "get_Cell" | "get_Slot" => Value::Int(args[0].as_int()),
            "get_Cells" | "get_Rows" => receiver.unwrap_or(Value::Null),
            "GetOffset" => {
                let (value, from_end) = receiver.map(|r| r.as_index()).unwrap();
                let length = args[0].as_int();
                Value::Int(if from_end { length - value } else { value })
            }
            "FromInt" => Value::Index {
                value: args[0].as_int(),
                from_end: false,
            },
            "get_Start" => match receiver {
                Some(Value::Range { start, .. }) => Value::Index {
                    value: start.0,
                    from_end: start.1,
                },
                _ => Value::Null,
            },
            "get_End" => match receiver {
                Some(Value::Range { end, .. }) => Value::Index {
                    value: end.0,
                    from_end: end.1,
                },
                _ => Value::Null,
            },
            "StartAt" => Value::Range {
                start: args[0].as_index(),
                end: (0, true),
            },
            "EndAt" => Value::Range {
                start: (0, false),
                end: args[0].as_index(),
            },
            "All" => Value::Range {
                start: (0, false),
                end: (0, true),
            },
            "Slice" => {
                let items = items_of(&receiver);
                let start = args[0].as_int() as usize;
                let length = args[1].as_int() as usize;
                Value::list(&items[start..start + length])
            }
            _ => Value::Null,
        }
    }
}

fn items_of(receiver: &Option<Value>) -> Vec<i64> {
    receiver.as_ref().map(Value::items).unwrap_or_default()
}

/// Positional shape with the given argument names
pub fn named(names: &[Option<&str>]) -> ArgumentShape {
    ArgumentShape {
        names: names.iter().map(|n| n.map(str::to_string)).collect(),
        ..ArgumentShape::default()
    }
}
