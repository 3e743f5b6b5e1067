//! Temporary sequencer
//!
//! Every lowering that needs single evaluation goes through here: `bind`
//! spills a value into a fresh temporary and returns the store that must run
//! before any read of it; `sequence` wraps stores and a result into one
//! expression. Binding the same source expression twice is a caller bug;
//! callers keep the returned temporary and read it as often as they need.

use super::hir::{HirExpr, HirExprKind, HirTemp, RefCapability};
use crate::tast::{TempId, TypeId};
use log::trace;

/// Hands out temporary ids; one allocator per method body
#[derive(Debug)]
pub struct TempAllocator {
    next: TempId,
    prefix: String,
}

impl TempAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            next: TempId::first(),
            prefix: prefix.into(),
        }
    }

    /// Allocate a fresh, never-before-returned temporary
    pub fn fresh(&mut self, ty: TypeId, capability: RefCapability) -> HirTemp {
        let id = self.next;
        self.next = id.next();
        HirTemp {
            id,
            name: format!("{}{}", self.prefix, id.as_raw()),
            ty,
            capability,
        }
    }

    /// Name later temporaries with `prefix`; ids keep counting
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Number of temporaries allocated so far
    pub fn allocated(&self) -> u32 {
        self.next.as_raw()
    }
}

impl Default for TempAllocator {
    fn default() -> Self {
        Self::new("_tmp")
    }
}

/// Spill `value` into a fresh temporary.
///
/// Returns the temporary and its store. The store evaluates `value` exactly
/// once; it must be sequenced before every read of the temporary.
pub fn bind(temps: &mut TempAllocator, value: HirExpr, capability: RefCapability) -> (HirTemp, HirExpr) {
    let temp = temps.fresh(value.ty, capability);
    trace!("bind {} ({:?}) := {:?}", temp.name, capability, value.kind);
    let location = value.source_location;
    let store = HirExpr::new(
        HirExprKind::Store {
            temp: temp.id,
            value: Box::new(value),
        },
        temp.ty,
        location,
    );
    (temp, store)
}

/// Evaluate `stores` in order, then yield `result`.
///
/// With no temporaries the result is returned as is.
pub fn sequence(temps: Vec<HirTemp>, stores: Vec<HirExpr>, result: HirExpr) -> HirExpr {
    assert_eq!(
        temps.len(),
        stores.len(),
        "every sequenced temporary needs exactly one store"
    );
    if temps.is_empty() {
        return result;
    }
    let ty = result.ty;
    let location = result.source_location;
    HirExpr::new(
        HirExprKind::Sequence {
            temps,
            side_effects: stores,
            result: Box::new(result),
        },
        ty,
        location,
    )
}

/// Accumulates bindings in evaluation order
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    temps: Vec<HirTemp>,
    stores: Vec<HirExpr>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` and return an expression reading the new temporary
    pub fn bind(&mut self, temps: &mut TempAllocator, value: HirExpr, capability: RefCapability) -> HirExpr {
        let location = value.source_location;
        let (temp, store) = bind(temps, value, capability);
        let reference = temp.reference(location);
        self.temps.push(temp);
        self.stores.push(store);
        reference
    }

    /// Append already-created bindings after the current ones
    pub fn extend(&mut self, temps: Vec<HirTemp>, stores: Vec<HirExpr>) {
        assert_eq!(temps.len(), stores.len());
        self.temps.extend(temps);
        self.stores.extend(stores);
    }

    pub fn is_empty(&self) -> bool {
        self.temps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.temps.len()
    }

    pub fn finish(self, result: HirExpr) -> HirExpr {
        sequence(self.temps, self.stores, result)
    }

    pub fn into_parts(self) -> (Vec<HirTemp>, Vec<HirExpr>) {
        (self.temps, self.stores)
    }
}
