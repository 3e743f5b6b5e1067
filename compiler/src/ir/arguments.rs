//! Argument normalization
//!
//! Maps already-lowered caller arguments onto a callee's formal parameters:
//! named and out-of-order arguments are put back in parameter order, omitted
//! optional parameters get their defaults, and expanded `params` arguments
//! are packed into an array. When that reordering would move a side effect,
//! every argument that could observe it is spilled into a temporary first,
//! in source order, so the call still sees caller evaluation order.

use super::hir::{HirExpr, HirExprKind, HirLiteral, HirTemp, RefCapability};
use super::tast_to_hir::{contract_violation, ContractViolation};
use super::temporaries::{SequenceBuilder, TempAllocator};
use crate::tast::{ArgumentShape, ConstantValue, ParamInfo, SourceLocation, TypeTable};
use log::trace;

/// Materializes defaults and params arrays for the target platform
pub trait ArgumentBuilder {
    /// Value passed for an omitted optional parameter
    fn default_value(&self, param: &ParamInfo, types: &TypeTable, site: SourceLocation) -> HirExpr;

    /// Array packing the expanded `params` arguments, in source order
    fn params_array(&self, param: &ParamInfo, elements: Vec<HirExpr>, site: SourceLocation) -> HirExpr;
}

/// Literal defaults, plain array construction
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultArgumentBuilder;

impl ArgumentBuilder for DefaultArgumentBuilder {
    fn default_value(&self, param: &ParamInfo, types: &TypeTable, site: SourceLocation) -> HirExpr {
        let Some(value) = &param.default else {
            malformed(format!("no argument for required parameter `{}`", param.name));
        };
        let literal = match value {
            ConstantValue::Int(v) => HirLiteral::Int(*v),
            ConstantValue::Bool(v) => HirLiteral::Bool(*v),
            ConstantValue::String(v) => HirLiteral::String(v.clone()),
            ConstantValue::Null => HirLiteral::Null,
        };
        // Typed as the parameter; an implicit literal conversion is the callee's concern.
        let ty = if param.ty.is_valid() { param.ty } else { types.object_type() };
        HirExpr::literal(literal, ty, site)
    }

    fn params_array(&self, param: &ParamInfo, elements: Vec<HirExpr>, site: SourceLocation) -> HirExpr {
        HirExpr::new(HirExprKind::Array { elements }, param.ty, site)
    }
}

/// Positional arguments plus the bindings that must run before the call
#[derive(Debug, Default)]
pub struct NormalizedArguments {
    pub arguments: Vec<HirExpr>,
    pub temps: Vec<HirTemp>,
    pub stores: Vec<HirExpr>,
}

impl NormalizedArguments {
    pub fn needs_sequence(&self) -> bool {
        !self.temps.is_empty()
    }
}

fn malformed(reason: String) -> ! {
    contract_violation(ContractViolation::MalformedArguments { reason })
}

/// Parameter each argument binds to
fn parameter_map(arg_count: usize, shape: &ArgumentShape, params: &[ParamInfo]) -> Vec<usize> {
    if !shape.names.is_empty() && shape.names.len() != arg_count {
        malformed(format!("{} names for {} arguments", shape.names.len(), arg_count));
    }
    if !shape.ref_kinds.is_empty() && shape.ref_kinds.len() != arg_count {
        malformed(format!("{} ref kinds for {} arguments", shape.ref_kinds.len(), arg_count));
    }

    if let Some(map) = &shape.arg_to_param_map {
        if map.len() != arg_count {
            malformed(format!("argument map has {} entries for {} arguments", map.len(), arg_count));
        }
        if let Some(&bad) = map.iter().find(|&&p| p >= params.len()) {
            malformed(format!("argument mapped to parameter {} of {}", bad, params.len()));
        }
        return map.clone();
    }

    let params_slot = if shape.expanded_params {
        match params.last() {
            Some(last) if last.is_params => Some(params.len() - 1),
            _ => malformed("expanded form without a params parameter".to_string()),
        }
    } else {
        None
    };

    (0..arg_count)
        .map(|i| {
            if let Some(name) = shape.name(i) {
                return params
                    .iter()
                    .position(|p| p.name == name)
                    .unwrap_or_else(|| malformed(format!("no parameter named `{}`", name)));
            }
            match params_slot {
                Some(slot) if i >= slot => slot,
                _ if i < params.len() => i,
                _ => malformed(format!("{} arguments for {} parameters", arg_count, params.len())),
            }
        })
        .collect()
}

/// Some argument binds to an earlier parameter than one written before it
fn reorders(map: &[usize]) -> bool {
    map.windows(2).any(|w| w[0] > w[1])
}

/// Whether `normalize` will spill arguments into temporaries. Callers that
/// must evaluate something ahead of the arguments bind it first.
pub fn spills_required(raw: &[HirExpr], shape: &ArgumentShape, params: &[ParamInfo]) -> bool {
    let map = parameter_map(raw.len(), shape, params);
    reorders(&map) && raw.iter().any(|a| !a.is_side_effect_free())
}

/// Normalize `raw` against `params`.
///
/// `raw` must already be lowered; each element is evaluated at most once by
/// the result.
pub fn normalize(
    raw: Vec<HirExpr>,
    shape: &ArgumentShape,
    params: &[ParamInfo],
    builder: &dyn ArgumentBuilder,
    types: &TypeTable,
    temps: &mut TempAllocator,
    site: SourceLocation,
) -> NormalizedArguments {
    let map = parameter_map(raw.len(), shape, params);

    let mut slots: Vec<Vec<usize>> = vec![Vec::new(); params.len()];
    for (arg, &param) in map.iter().enumerate() {
        slots[param].push(arg);
    }
    let expanded_slot = if shape.expanded_params {
        params.len().checked_sub(1)
    } else {
        None
    };
    for (index, slot) in slots.iter().enumerate() {
        if slot.len() > 1 && Some(index) != expanded_slot {
            malformed(format!("parameter `{}` bound {} times", params[index].name, slot.len()));
        }
    }

    let reordered = reorders(&map);
    let has_side_effects = raw.iter().any(|a| !a.is_side_effect_free());

    let mut args: Vec<Option<HirExpr>> = raw.into_iter().map(Some).collect();
    let mut spills = SequenceBuilder::new();
    if reordered && has_side_effects {
        trace!("spilling {} reordered arguments", args.len());
        for (index, slot) in args.iter_mut().enumerate() {
            let Some(arg) = slot.take() else { continue };
            if arg.is_stable() {
                *slot = Some(arg);
                continue;
            }
            let capability = if shape.ref_kind(index).is_by_ref() {
                RefCapability::Ref
            } else {
                RefCapability::Value
            };
            *slot = Some(spills.bind(temps, arg, capability));
        }
    }

    let mut take = |index: usize| -> HirExpr {
        match args[index].take() {
            Some(arg) => arg,
            None => malformed(format!("argument {} consumed twice", index)),
        }
    };

    let arguments = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let slot = &slots[index];
            if Some(index) == expanded_slot {
                let elements = slot.iter().map(|&a| take(a)).collect();
                builder.params_array(param, elements, site)
            } else if let Some(&arg) = slot.first() {
                take(arg)
            } else if param.is_params {
                builder.params_array(param, Vec::new(), site)
            } else {
                builder.default_value(param, types, site)
            }
        })
        .collect();

    let (temps, stores) = spills.into_parts();
    NormalizedArguments {
        arguments,
        temps,
        stores,
    }
}
