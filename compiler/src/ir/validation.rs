//! HIR Validation
//!
//! Checks the sequencing invariants of lowered accesses: every temporary is
//! declared by exactly one `Sequence` (or target prefix), initialized by the
//! store at the same position, and only read after that store and inside
//! the declaring scope.

use super::hir::{AccessTarget, AccessTargetKind, HirExpr, HirExprKind, HirTemp, LoweredAccess, RefCapability};
use crate::tast::TempId;
use std::collections::HashSet;
use std::fmt;

/// HIR validation context
struct ValidationContext {
    /// Temporaries readable at the current point, innermost last
    in_scope: Vec<TempId>,

    /// Every temporary declared so far
    declared: HashSet<TempId>,

    /// Errors found during validation
    errors: Vec<ValidationError>,
}

/// Validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Temporary the error is about, if any
    pub temp: Option<TempId>,
}

/// Types of validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// Temporary read outside its scope or before its store
    UseBeforeDefine,

    /// Temporary declared more than once
    MultipleDefinitions,

    /// Store that does not initialize a temporary of the enclosing sequence
    StoreToUndeclared,

    /// Declared temporary without its store
    UnstoredTemp,

    /// By-reference temporary bound to something that is not a location
    InvalidRefBinding,

    /// Sequence that declares nothing
    EmptySequence,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ValidationErrorKind::UseBeforeDefine => "used before its store",
            ValidationErrorKind::MultipleDefinitions => "declared more than once",
            ValidationErrorKind::StoreToUndeclared => "stored outside its declaring sequence",
            ValidationErrorKind::UnstoredTemp => "declared without a matching store",
            ValidationErrorKind::InvalidRefBinding => "bound by reference to a non-location",
            ValidationErrorKind::EmptySequence => return write!(f, "empty sequence was not elided"),
        };
        match self.temp {
            Some(temp) => write!(f, "{} {}", temp, what),
            None => write!(f, "temporary {}", what),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationContext {
    fn new() -> Self {
        Self {
            in_scope: Vec::new(),
            declared: HashSet::new(),
            errors: Vec::new(),
        }
    }

    fn error(&mut self, kind: ValidationErrorKind, temp: Option<TempId>) {
        self.errors.push(ValidationError { kind, temp });
    }

    fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Declare `temps` one by one, checking the store at the same position.
    /// Leaves the declared temporaries in scope; the caller pops them.
    fn validate_bindings(&mut self, temps: &[HirTemp], stores: &[HirExpr]) {
        if temps.len() != stores.len() {
            for temp in temps.iter().skip(stores.len()) {
                self.error(ValidationErrorKind::UnstoredTemp, Some(temp.id));
            }
        }

        for (position, store) in stores.iter().enumerate() {
            let temp = temps.get(position);
            match (&store.kind, temp) {
                (HirExprKind::Store { temp: stored, value }, Some(temp)) if *stored == temp.id => {
                    // The initializer sees earlier temporaries, not this one.
                    self.validate_expr(value);
                    if temp.capability == RefCapability::Ref && !value.is_addressable() {
                        self.error(ValidationErrorKind::InvalidRefBinding, Some(temp.id));
                    }
                }
                (HirExprKind::Store { temp: stored, value }, _) => {
                    self.validate_expr(value);
                    self.error(ValidationErrorKind::StoreToUndeclared, Some(*stored));
                    if let Some(temp) = temp {
                        self.error(ValidationErrorKind::UnstoredTemp, Some(temp.id));
                    }
                }
                (_, temp) => {
                    self.validate_expr(store);
                    self.error(ValidationErrorKind::UnstoredTemp, temp.map(|t| t.id));
                }
            }

            if let Some(temp) = temp {
                if !self.declared.insert(temp.id) {
                    self.error(ValidationErrorKind::MultipleDefinitions, Some(temp.id));
                }
                self.in_scope.push(temp.id);
            }
        }
    }

    fn validate_expr(&mut self, expr: &HirExpr) {
        match &expr.kind {
            HirExprKind::Literal(_) | HirExprKind::Variable { .. } | HirExprKind::This => {}
            HirExprKind::Temp { temp } => {
                if !self.in_scope.contains(temp) {
                    self.error(ValidationErrorKind::UseBeforeDefine, Some(*temp));
                }
            }
            HirExprKind::Field { object, .. } => self.validate_expr(object),
            HirExprKind::Index { object, index } => {
                self.validate_expr(object);
                self.validate_expr(index);
            }
            HirExprKind::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    self.validate_expr(receiver);
                }
                self.validate_all(args);
            }
            HirExprKind::New { args, .. } => self.validate_all(args),
            HirExprKind::Binary { lhs, rhs, .. } => {
                self.validate_expr(lhs);
                self.validate_expr(rhs);
            }
            HirExprKind::Array { elements } => self.validate_all(elements),
            HirExprKind::Store { temp, value } => {
                self.validate_expr(value);
                self.error(ValidationErrorKind::StoreToUndeclared, Some(*temp));
            }
            HirExprKind::Sequence {
                temps,
                side_effects,
                result,
            } => {
                if temps.is_empty() && side_effects.is_empty() {
                    self.error(ValidationErrorKind::EmptySequence, None);
                }
                let scope_depth = self.in_scope.len();
                self.validate_bindings(temps, side_effects);
                self.validate_expr(result);
                self.in_scope.truncate(scope_depth);
            }
            HirExprKind::DynamicGetMember { receiver, .. } => self.validate_expr(receiver),
            HirExprKind::DynamicGetIndex { receiver, args, .. } => {
                self.validate_expr(receiver);
                self.validate_all(args);
            }
        }
    }

    fn validate_all(&mut self, exprs: &[HirExpr]) {
        for expr in exprs {
            self.validate_expr(expr);
        }
    }

    fn validate_target(&mut self, target: &AccessTarget) {
        self.validate_bindings(&target.prefix_temps, &target.prefix_stores);
        match &target.kind {
            AccessTargetKind::Indexer { receiver, args, .. } | AccessTargetKind::DynamicIndex { receiver, args, .. } => {
                self.validate_expr(receiver);
                self.validate_all(args);
            }
            AccessTargetKind::Element { object, index } => {
                self.validate_expr(object);
                self.validate_expr(index);
            }
        }
    }
}

/// Validate a free-standing HIR expression
pub fn validate_expr(expr: &HirExpr) -> Result<(), Vec<ValidationError>> {
    let mut ctx = ValidationContext::new();
    ctx.validate_expr(expr);
    ctx.finish()
}

/// Validate the output of one access lowering
pub fn validate_lowered(lowered: &LoweredAccess) -> Result<(), Vec<ValidationError>> {
    let mut ctx = ValidationContext::new();
    match lowered {
        LoweredAccess::Value(expr) => ctx.validate_expr(expr),
        LoweredAccess::Target(target) => ctx.validate_target(target),
    }
    ctx.finish()
}
