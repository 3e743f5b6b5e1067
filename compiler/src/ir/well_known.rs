//! Well-known standard library members and type embedding
//!
//! The lowering stage never looks members up by name. It asks a
//! [`WellKnownMembers`] resolver for the handful of library members the
//! index/range desugaring calls, and notifies a [`TypeEmbedder`] before it
//! emits a dynamic call site that names a statically known indexer.

use crate::tast::{SourceLocation, SymbolId, TypeId};
use fxhash::FxHashMap;
use std::fmt;

/// Library members the lowering stage may emit calls to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownMember {
    /// `Index(int value, bool fromEnd)`
    IndexConstructor,
    /// `Index.GetOffset(int length) -> int`
    IndexGetOffset,
    /// Implicit `int -> Index` conversion
    IndexFromInt,
    /// `Range(Index start, Index end)`
    RangeConstructor,
    /// `Range.Start` getter
    RangeGetStart,
    /// `Range.End` getter
    RangeGetEnd,
    /// `Range.StartAt(Index start)`
    RangeStartAt,
    /// `Range.EndAt(Index end)`
    RangeEndAt,
    /// `Range.All` getter
    RangeAll,
}

impl WellKnownMember {
    pub const ALL: [WellKnownMember; 9] = [
        WellKnownMember::IndexConstructor,
        WellKnownMember::IndexGetOffset,
        WellKnownMember::IndexFromInt,
        WellKnownMember::RangeConstructor,
        WellKnownMember::RangeGetStart,
        WellKnownMember::RangeGetEnd,
        WellKnownMember::RangeStartAt,
        WellKnownMember::RangeEndAt,
        WellKnownMember::RangeAll,
    ];

    /// Stable qualified name, used in messages
    pub fn qualified_name(self) -> &'static str {
        match self {
            WellKnownMember::IndexConstructor => "Index..ctor",
            WellKnownMember::IndexGetOffset => "Index.GetOffset",
            WellKnownMember::IndexFromInt => "Index.op_Implicit",
            WellKnownMember::RangeConstructor => "Range..ctor",
            WellKnownMember::RangeGetStart => "Range.get_Start",
            WellKnownMember::RangeGetEnd => "Range.get_End",
            WellKnownMember::RangeStartAt => "Range.StartAt",
            WellKnownMember::RangeEndAt => "Range.EndAt",
            WellKnownMember::RangeAll => "Range.get_All",
        }
    }
}

impl fmt::Display for WellKnownMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}

/// The target library lacks a well-known member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownMemberError {
    pub member: WellKnownMember,
    pub reason: String,
}

impl fmt::Display for WellKnownMemberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "well-known member {} unavailable: {}", self.member, self.reason)
    }
}

impl std::error::Error for WellKnownMemberError {}

/// Resolves well-known members to symbols
pub trait WellKnownMembers {
    fn resolve(&self, member: WellKnownMember) -> Result<SymbolId, WellKnownMemberError>;
}

/// Registry-backed resolver, filled in by the driver after loading the
/// standard library
#[derive(Debug, Default)]
pub struct WellKnownMemberTable {
    members: FxHashMap<WellKnownMember, SymbolId>,
}

impl WellKnownMemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, member: WellKnownMember, symbol: SymbolId) -> &mut Self {
        self.members.insert(member, symbol);
        self
    }

    /// Members not registered yet
    pub fn missing(&self) -> Vec<WellKnownMember> {
        WellKnownMember::ALL
            .iter()
            .copied()
            .filter(|member| !self.members.contains_key(member))
            .collect()
    }
}

impl WellKnownMembers for WellKnownMemberTable {
    fn resolve(&self, member: WellKnownMember) -> Result<SymbolId, WellKnownMemberError> {
        self.members.get(&member).copied().ok_or_else(|| WellKnownMemberError {
            member,
            reason: "not registered by the standard library loader".to_string(),
        })
    }
}

/// Embeds interop type metadata on demand.
///
/// Called once per statically known candidate of a dynamic indexer access,
/// before the dynamic call site is emitted. Has no effect on the lowered
/// tree.
pub trait TypeEmbedder {
    fn embed_if_needed(&mut self, declaring_type: TypeId, candidate: SymbolId, site: SourceLocation);
}

/// Embedder for targets without interop metadata
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEmbedding;

impl TypeEmbedder for NoEmbedding {
    fn embed_if_needed(&mut self, _declaring_type: TypeId, _candidate: SymbolId, _site: SourceLocation) {}
}
