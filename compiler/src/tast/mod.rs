//! Typed AST: the resolved, type-checked input of the lowering stage

pub mod core;
pub mod id_types;
pub mod node;
pub mod symbols;

pub use self::core::{Type, TypeKind, TypeTable};
pub use id_types::*;
pub use node::*;
pub use symbols::*;
