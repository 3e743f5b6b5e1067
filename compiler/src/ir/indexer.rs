//! Static indexer lowering
//!
//! Read mode turns `receiver[args]` into a getter call with normalized
//! arguments. Write mode hands the lowered receiver and arguments to
//! assignment lowering, which needs both accessors and must not evaluate
//! them twice across a read-modify-write. An indexer that returns by
//! reference is its own assignable location, so write mode lowers it like a
//! read.

use super::arguments::{normalize, spills_required};
use super::hir::{AccessTarget, AccessTargetKind, HirExpr, LoweredAccess, RefCapability};
use super::tast_to_hir::{AccessMode, ExpressionVisitor, LoweringContext};
use super::temporaries::SequenceBuilder;
use crate::tast::{ArgumentShape, IndexerAccess, SourceLocation, SymbolId, TypeId, TypedExpression};
use log::debug;

impl<'a> LoweringContext<'a> {
    /// Lower a resolved indexer access
    pub fn lower_indexer_access(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &IndexerAccess,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        let receiver = self.lower_indexer_receiver(visitor, &node.receiver);
        let arguments = node.arguments.iter().map(|arg| visitor.visit(self, arg)).collect();
        self.make_indexer_access(
            receiver,
            node.indexer,
            arguments,
            &node.shape,
            node.result_type,
            mode,
            location,
        )
    }

    /// Receiver of a static indexer access. An indexed-property reference
    /// becomes a zero-argument read of that property; the indexing arguments
    /// then apply to its value.
    fn lower_indexer_receiver(&mut self, visitor: &mut dyn ExpressionVisitor, receiver: &TypedExpression) -> HirExpr {
        match receiver.indexed_property() {
            Some((object, property)) => {
                debug!("indexed property {} read before indexing", self.symbols().name(property));
                let object = visitor.visit(self, object);
                self.read_member(object, property, receiver.source_location)
            }
            None => visitor.visit(self, receiver),
        }
    }

    /// Build the access from an already-lowered receiver and arguments
    #[allow(clippy::too_many_arguments)]
    pub fn make_indexer_access(
        &mut self,
        receiver: HirExpr,
        indexer: SymbolId,
        arguments: Vec<HirExpr>,
        shape: &ArgumentShape,
        result_type: TypeId,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        let property = self.indexer(indexer);

        if mode.is_write() && !property.returns_by_ref {
            return LoweredAccess::Target(AccessTarget {
                prefix_temps: Vec::new(),
                prefix_stores: Vec::new(),
                kind: AccessTargetKind::Indexer {
                    receiver: Box::new(receiver),
                    indexer,
                    getter: property.getter,
                    setter: property.setter,
                    args: arguments,
                    arg_names: shape.names.clone(),
                    ref_kinds: shape.ref_kinds.clone(),
                    expanded_params: shape.expanded_params,
                    arg_to_param_map: shape.arg_to_param_map.clone(),
                },
                ty: result_type,
                source_location: location,
            });
        }

        let getter = self.getter_of(indexer);
        let getter_params = &self.method(getter).params;

        let mut seq = SequenceBuilder::new();
        // Spilled arguments run ahead of the call; the receiver is evaluated
        // before them.
        let receiver = if !receiver.is_stable() && spills_required(&arguments, shape, getter_params) {
            let capability = if self.types().is_value_type(receiver.ty) && receiver.is_addressable() {
                RefCapability::Ref
            } else {
                RefCapability::Value
            };
            seq.bind(self.temps(), receiver, capability)
        } else {
            receiver
        };

        let normalized = normalize(
            arguments,
            shape,
            getter_params,
            self.argument_builder(),
            self.types(),
            self.temps(),
            location,
        );
        seq.extend(normalized.temps, normalized.stores);

        let by_ref = property.returns_by_ref || self.method(getter).returns_by_ref;
        let call = HirExpr::call(Some(receiver), getter, normalized.arguments, result_type, location)
            .with_ref_return(by_ref);
        LoweredAccess::Value(seq.finish(call))
    }
}
