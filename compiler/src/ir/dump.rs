//! HIR Dump Utility
//!
//! Pretty-prints lowered accesses in a compact, single-line form. Used by
//! the `dump_lowered` option and by tests that compare lowered shapes.
//!
//! ```text
//! { ref _tmp0 = list; _tmp1 = _tmp0.get_Count(); _tmp2 = idx.GetOffset(_tmp1); _tmp0.get_Item(_tmp2) }
//! ```

use super::hir::{AccessTarget, AccessTargetKind, HirExpr, HirExprKind, HirLiteral, HirTemp, LoweredAccess, RefCapability};
use crate::tast::{RefKind, SymbolTable, TempId};
use fxhash::FxHashMap;

/// Dump a single expression to a string.
pub fn dump_expr(expr: &HirExpr, symbols: &SymbolTable) -> String {
    let mut printer = Printer::new(symbols);
    printer.expr(expr)
}

/// Dump the output of one access lowering to a string.
pub fn dump_lowered(lowered: &LoweredAccess, symbols: &SymbolTable) -> String {
    let mut printer = Printer::new(symbols);
    match lowered {
        LoweredAccess::Value(expr) => printer.expr(expr),
        LoweredAccess::Target(target) => printer.target(target),
    }
}

/// Serialize an expression tree to pretty JSON.
pub fn dump_json(expr: &HirExpr) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(expr)
}

struct Printer<'a> {
    symbols: &'a SymbolTable,
    /// Declared temporaries seen so far, for names and capabilities
    temps: FxHashMap<TempId, (String, RefCapability)>,
}

impl<'a> Printer<'a> {
    fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            temps: FxHashMap::default(),
        }
    }

    fn declare(&mut self, temps: &[HirTemp]) {
        for temp in temps {
            self.temps.insert(temp.id, (temp.name.clone(), temp.capability));
        }
    }

    fn temp_name(&self, temp: TempId) -> String {
        match self.temps.get(&temp) {
            Some((name, _)) => name.clone(),
            None => temp.to_string(),
        }
    }

    fn list(&mut self, exprs: &[HirExpr]) -> String {
        exprs.iter().map(|e| self.expr(e)).collect::<Vec<_>>().join(", ")
    }

    /// Arguments with their names and ref kinds, as a dynamic call site sees them
    fn annotated_list(&mut self, exprs: &[HirExpr], names: &[Option<String>], ref_kinds: &[RefKind]) -> String {
        exprs
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let mut out = String::new();
                if let Some(Some(name)) = names.get(i) {
                    out.push_str(name);
                    out.push_str(": ");
                }
                if let Some(kind) = ref_kinds.get(i) {
                    out.push_str(&kind.to_string());
                }
                out.push_str(&self.expr(arg));
                out
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn stores(&mut self, stores: &[HirExpr]) -> String {
        stores.iter().map(|s| format!("{}; ", self.expr(s))).collect()
    }

    fn expr(&mut self, expr: &HirExpr) -> String {
        match &expr.kind {
            HirExprKind::Literal(lit) => match lit {
                HirLiteral::Int(v) => v.to_string(),
                HirLiteral::Bool(v) => v.to_string(),
                HirLiteral::String(v) => format!("{:?}", v),
                HirLiteral::Null => "null".to_string(),
            },
            HirExprKind::Variable { symbol } => self.symbols.name(*symbol).to_string(),
            HirExprKind::Temp { temp } => self.temp_name(*temp),
            HirExprKind::This => "this".to_string(),
            HirExprKind::Field { object, field } => {
                format!("{}.{}", self.expr(object), self.symbols.name(*field))
            }
            HirExprKind::Index { object, index } => {
                format!("{}[{}]", self.expr(object), self.expr(index))
            }
            HirExprKind::Call { receiver, method, args, .. } => {
                let name = self.symbols.name(*method).to_string();
                let args = self.list(args);
                match receiver {
                    Some(receiver) => format!("{}.{}({})", self.expr(receiver), name, args),
                    None => format!("{}({})", name, args),
                }
            }
            HirExprKind::New { constructor, args } => {
                format!("new {}({})", self.symbols.name(*constructor), self.list(args))
            }
            HirExprKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", self.expr(lhs), op.symbol(), self.expr(rhs))
            }
            HirExprKind::Array { elements } => format!("[{}]", self.list(elements)),
            HirExprKind::Store { temp, value } => {
                let value = self.expr(value);
                let prefix = match self.temps.get(temp) {
                    Some((_, RefCapability::Ref)) => "ref ",
                    _ => "",
                };
                format!("{}{} = {}", prefix, self.temp_name(*temp), value)
            }
            HirExprKind::Sequence {
                temps,
                side_effects,
                result,
            } => {
                self.declare(temps);
                let stores = self.stores(side_effects);
                format!("{{ {}{} }}", stores, self.expr(result))
            }
            HirExprKind::DynamicGetMember {
                receiver,
                name,
                result_indexed,
            } => {
                let receiver = self.expr(receiver);
                if *result_indexed {
                    format!("dyn_get_member({}, {:?}, indexed)", receiver, name)
                } else {
                    format!("dyn_get_member({}, {:?})", receiver, name)
                }
            }
            HirExprKind::DynamicGetIndex {
                receiver,
                args,
                arg_names,
                ref_kinds,
            } => {
                let receiver = self.expr(receiver);
                let args = self.annotated_list(args, arg_names, ref_kinds);
                if args.is_empty() {
                    format!("dyn_get_index({})", receiver)
                } else {
                    format!("dyn_get_index({}, {})", receiver, args)
                }
            }
        }
    }

    fn target(&mut self, target: &AccessTarget) -> String {
        self.declare(&target.prefix_temps);
        let prefix = if target.prefix_stores.is_empty() {
            String::new()
        } else {
            format!("{{ {}}} ", self.stores(&target.prefix_stores))
        };
        let location = match &target.kind {
            AccessTargetKind::Indexer {
                receiver,
                indexer,
                args,
                arg_names,
                ref_kinds,
                ..
            } => {
                let receiver = self.expr(receiver);
                let args = self.annotated_list(args, arg_names, ref_kinds);
                format!("indexer {}.{}[{}]", receiver, self.symbols.name(*indexer), args)
            }
            AccessTargetKind::DynamicIndex {
                receiver,
                args,
                arg_names,
                ref_kinds,
            } => {
                let receiver = self.expr(receiver);
                format!("dyn_index {}[{}]", receiver, self.annotated_list(args, arg_names, ref_kinds))
            }
            AccessTargetKind::Element { object, index } => {
                format!("element {}[{}]", self.expr(object), self.expr(index))
            }
        };
        format!("{}{}", prefix, location)
    }
}
