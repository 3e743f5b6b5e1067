//! Access lowering from the typed tree (TAST) to HIR
//!
//! The stage rewrites the four element-access forms into explicit HIR:
//! resolved indexers become getter calls, dynamic indexers become run-time
//! indexed gets, and index/range patterns become length/offset arithmetic
//! over temporaries. Receivers and arguments are evaluated exactly once, in
//! source order.

pub mod arguments;
pub mod dump;
pub mod dynamic_index;
pub mod hir;
pub mod index_range;
pub mod indexer;
pub mod tast_to_hir;
pub mod temporaries;
pub mod validation;
pub mod well_known;

pub use arguments::{normalize, spills_required, ArgumentBuilder, DefaultArgumentBuilder, NormalizedArguments};
pub use hir::*;
pub use tast_to_hir::{
    contract_violation, AccessMode, ContractViolation, ExpressionVisitor, LoweringContext, LoweringOptions,
    TastToHirVisitor,
};
pub use temporaries::{SequenceBuilder, TempAllocator};
pub use validation::{validate_expr, validate_lowered, ValidationError, ValidationErrorKind};
pub use well_known::{
    NoEmbedding, TypeEmbedder, WellKnownMember, WellKnownMemberError, WellKnownMemberTable, WellKnownMembers,
};
