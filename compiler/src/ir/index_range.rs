//! Index and range pattern desugaring
//!
//! `obj[^i]` and `obj[a..b]` on types that only expose a length/count and an
//! integer indexer or a `Slice(start, length)` method:
//!
//! ```text
//! obj[idx]    =>  { ref r = obj; len = r.Length; off = idx.GetOffset(len); r[off] }
//! obj[range]  =>  { r = obj; len = r.Length; rg = range;
//!                   start = rg.Start.GetOffset(len); end = rg.End.GetOffset(len);
//!                   r.Slice(start, end - start) }
//! ```
//!
//! `end - start` is not checked: an inverted range faults inside `Slice` at
//! run time.

use super::hir::{
    AccessTarget, AccessTargetKind, HirBinaryOp, HirExpr, HirExprKind, LoweredAccess, RefCapability,
};
use super::tast_to_hir::{contract_violation, AccessMode, ContractViolation, ExpressionVisitor, LoweringContext};
use super::temporaries::SequenceBuilder;
use super::well_known::WellKnownMember;
use crate::tast::{AccessNode, ArgumentShape, IndexPatternAccess, RangePatternAccess, SourceLocation};
use log::debug;

impl<'a> LoweringContext<'a> {
    /// Lower an index or range pattern access. Which desugaring runs depends
    /// on the static type of the argument; the node variant must agree.
    pub fn lower_pattern_access(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &AccessNode,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        let (argument_type, expected) = match node {
            AccessNode::IndexPattern(access) => (access.argument.expr_type, "Index"),
            AccessNode::RangePattern(access) => (access.argument.expr_type, "Range"),
            AccessNode::Indexer(_) | AccessNode::DynamicIndexer(_) => {
                contract_violation(ContractViolation::NotAPattern)
            }
        };
        let types = self.types();

        match node {
            AccessNode::IndexPattern(access) if types.is_index(argument_type) => {
                self.lower_index_pattern(visitor, access, mode, location)
            }
            AccessNode::RangePattern(access) if types.is_range(argument_type) => {
                if mode.is_write() {
                    contract_violation(ContractViolation::RangeAsAssignmentTarget);
                }
                LoweredAccess::Value(self.lower_range_pattern(visitor, access, location))
            }
            _ => contract_violation(ContractViolation::PatternArgumentType {
                expected,
                found: argument_type,
            }),
        }
    }

    /// `receiver[^i]` through the length and an integer indexer
    pub fn lower_index_pattern(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &IndexPatternAccess,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        let mut seq = SequenceBuilder::new();

        // A value-type receiver is aliased so that writes through the
        // indexer land in the original storage.
        let receiver = visitor.visit(self, &node.receiver);
        let capability = if self.types().is_value_type(receiver.ty) && receiver.is_addressable() {
            RefCapability::Ref
        } else {
            RefCapability::Value
        };
        let receiver = seq.bind(self.temps(), receiver, capability);

        let length = self.read_member(receiver.clone(), node.length_or_count, location);
        let length = seq.bind(self.temps(), length, RefCapability::Value);

        let index = visitor.visit(self, &node.argument);
        let offset = self.get_offset(index, length, location);
        let offset = seq.bind(self.temps(), offset, RefCapability::Value);

        debug!("index pattern lowered with {} bindings", seq.len());

        let element = match node.int_indexer {
            Some(indexer) => self.make_indexer_access(
                receiver,
                indexer,
                vec![offset],
                &ArgumentShape::positional(),
                node.result_type,
                mode,
                location,
            ),
            None => self.element_access(receiver, offset, node, mode, location),
        };

        match element {
            LoweredAccess::Value(value) => LoweredAccess::Value(seq.finish(value)),
            LoweredAccess::Target(mut target) => {
                let (mut temps, mut stores) = seq.into_parts();
                temps.append(&mut target.prefix_temps);
                stores.append(&mut target.prefix_stores);
                target.prefix_temps = temps;
                target.prefix_stores = stores;
                LoweredAccess::Target(target)
            }
        }
    }

    /// Built-in element access for array receivers
    fn element_access(
        &self,
        receiver: HirExpr,
        offset: HirExpr,
        node: &IndexPatternAccess,
        mode: AccessMode,
        location: SourceLocation,
    ) -> LoweredAccess {
        if !self.types().is_array(receiver.ty) {
            contract_violation(ContractViolation::NotAnArray { found: receiver.ty });
        }
        if mode.is_write() {
            return LoweredAccess::Target(AccessTarget {
                prefix_temps: Vec::new(),
                prefix_stores: Vec::new(),
                kind: AccessTargetKind::Element {
                    object: Box::new(receiver),
                    index: Box::new(offset),
                },
                ty: node.result_type,
                source_location: location,
            });
        }
        LoweredAccess::Value(HirExpr::new(
            HirExprKind::Index {
                object: Box::new(receiver),
                index: Box::new(offset),
            },
            node.result_type,
            location,
        ))
    }

    /// `receiver[a..b]` through the length and a slice method
    pub fn lower_range_pattern(
        &mut self,
        visitor: &mut dyn ExpressionVisitor,
        node: &RangePatternAccess,
        location: SourceLocation,
    ) -> HirExpr {
        let slice = self.method(node.slice_method);
        if slice.params.len() != 2 {
            contract_violation(ContractViolation::BadSliceSignature {
                method: node.slice_method,
            });
        }

        let mut seq = SequenceBuilder::new();

        let receiver = visitor.visit(self, &node.receiver);
        let receiver = seq.bind(self.temps(), receiver, RefCapability::Value);

        let length = self.read_member(receiver.clone(), node.length_or_count, location);
        let length = seq.bind(self.temps(), length, RefCapability::Value);

        let range = visitor.visit(self, &node.argument);
        let range = seq.bind(self.temps(), range, RefCapability::Value);

        let index_type = self.types().index_type();
        let start_index = HirExpr::call(
            Some(range.clone()),
            self.well_known(WellKnownMember::RangeGetStart),
            Vec::new(),
            index_type,
            location,
        );
        let start = self.get_offset(start_index, length.clone(), location);
        let start = seq.bind(self.temps(), start, RefCapability::Value);

        let end_index = HirExpr::call(
            Some(range),
            self.well_known(WellKnownMember::RangeGetEnd),
            Vec::new(),
            index_type,
            location,
        );
        let end = self.get_offset(end_index, length, location);
        let end = seq.bind(self.temps(), end, RefCapability::Value);

        let slice_length = HirExpr::new(
            HirExprKind::Binary {
                op: HirBinaryOp::Sub,
                lhs: Box::new(end),
                rhs: Box::new(start.clone()),
            },
            self.types().int_type(),
            location,
        );
        let call = HirExpr::call(
            Some(receiver),
            node.slice_method,
            vec![start, slice_length],
            node.result_type,
            location,
        );
        debug!("range pattern lowered with {} bindings", seq.len());
        seq.finish(call)
    }

    /// `index.GetOffset(length)`
    fn get_offset(&self, index: HirExpr, length: HirExpr, location: SourceLocation) -> HirExpr {
        HirExpr::call(
            Some(index),
            self.well_known(WellKnownMember::IndexGetOffset),
            vec![length],
            self.types().int_type(),
            location,
        )
    }
}
