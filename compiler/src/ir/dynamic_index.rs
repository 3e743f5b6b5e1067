//! Dynamic indexer lowering
//!
//! `dyn[args]` on a dynamically typed receiver becomes a run-time indexed
//! get. Nothing is resolved statically; arguments keep caller order.

use super::hir::{AccessTarget, AccessTargetKind, HirExpr, HirExprKind, LoweredAccess};
use super::tast_to_hir::{AccessMode, ExpressionVisitor, LoweringContext};
use crate::tast::{DynamicIndexerAccess, RefKinds, SourceLocation, SymbolId, TypeId, TypedExpression};
use log::trace;

impl<'a> LoweringContext<'a> {
    /// Lower a dynamically typed indexer access
    pub fn lower_dynamic_indexer_access(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &DynamicIndexerAccess,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        self.embed_candidates(&node.applicable_candidates, location);

        let receiver = self.make_dynamic_index_receiver(visitor, &node.receiver);
        let arguments: Vec<HirExpr> = node.arguments.iter().map(|arg| visitor.visit(self, arg)).collect();

        if mode.is_write() {
            return LoweredAccess::Target(AccessTarget {
                prefix_temps: Vec::new(),
                prefix_stores: Vec::new(),
                kind: AccessTargetKind::DynamicIndex {
                    receiver: Box::new(receiver),
                    args: arguments,
                    arg_names: node.names.clone(),
                    ref_kinds: node.ref_kinds.clone(),
                },
                ty: node.result_type,
                source_location: location,
            });
        }

        LoweredAccess::Value(self.lower_dynamic_index(
            receiver,
            arguments,
            node.names.clone(),
            node.ref_kinds.clone(),
            node.result_type,
            location,
        ))
    }

    /// Run-time indexed get over an already-lowered receiver and arguments
    pub fn lower_dynamic_index(
        &mut self,
        receiver: HirExpr,
        arguments: Vec<HirExpr>,
        names: Vec<Option<String>>,
        ref_kinds: RefKinds,
        result_type: TypeId,
        location: SourceLocation,
    ) -> HirExpr {
        HirExpr::new(
            HirExprKind::DynamicGetIndex {
                receiver: Box::new(receiver),
                args: arguments,
                arg_names: names,
                ref_kinds,
            },
            result_type,
            location,
        )
    }

    /// Receiver of a dynamic index. An indexed property is fetched through a
    /// run-time member lookup that asks for an indexable result; anything
    /// else is used as is.
    pub fn make_dynamic_index_receiver(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        receiver: &TypedExpression,
    ) -> HirExpr {
        let Some((object, property)) = receiver.indexed_property() else {
            return visitor.visit(self, receiver);
        };
        let object = visitor.visit(self, object);
        let name = self.symbols().name(property).to_string();
        trace!("dynamic receiver through indexed property `{}`", name);
        HirExpr::new(
            HirExprKind::DynamicGetMember {
                receiver: Box::new(object),
                name,
                result_indexed: true,
            },
            self.types().dynamic_type(),
            receiver.source_location,
        )
    }

    /// Make interop metadata available for every statically known candidate
    /// before a call site naming it is emitted
    fn embed_candidates(&mut self, candidates: &[SymbolId], site: SourceLocation) {
        for &candidate in candidates {
            let declaring_type = self.indexer(candidate).declaring_type;
            self.embedder().embed_if_needed(declaring_type, candidate, site);
        }
    }
}
