//! Sable compiler middle end
//!
//! `tast` holds the typed tree handed over by semantic analysis, `ir` lowers
//! its element accesses to HIR.

pub mod ir;
pub mod logging;
pub mod tast;
