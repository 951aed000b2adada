// Provenance of values which could not be folded, and the only place
// where any of it is turned into user facing text.

pub mod location;
pub mod emit;
pub mod assert;


pub use location::{NodeLocations, DebugLocation, DebugScope, skip_internal_locations};
pub use emit::{Diagnostic, DiagnosticSink, NoteKind};
pub use assert::{check_static_assert, AssertOutcome};

use codespan::{FileId, Files, LineIndex, Span};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

use crate::{Error, ErrorKind, Result};

// The construct that failed to fold, as known to the evaluator
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeRef(pub u32);

// A lexical or inlined scope, as known to the evaluator
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ScopeRef(pub u32);

impl fmt::Display for NodeRef {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "node#{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SourceLoc {
    pub file: FileId,
    pub span: Span
}

impl SourceLoc {
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    pub fn line<S: AsRef<str>>(&self, files: &Files<S>) -> Result<LineIndex> {
        let location = files.location(self.file, self.span.start())
            .map_err(|_| Error::from(ErrorKind::BadLocation))?;
        Ok(location.line)
    }
}

/// Why a value could not be folded.
#[derive(IntoPrimitive, TryFromPrimitive)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum UnknownReason {
    // nothing more specific is known
    Default,
    // the evaluation budget ran out
    TooManyInstructions,
    Loop,
    Overflow,
    Trap
}

impl UnknownReason {
    pub fn from_code(code: u8) -> Result<Self> {
        Self::try_from(code)
            .map_err(|_| Error::new_const(ErrorKind::BadFormat, "unrecognized unknown reason code"))
    }

    pub fn message(&self) -> &'static str {
        use UnknownReason::*;
        match self {
            Default => "could not fold operation",
            TooManyInstructions => "expression is too large to evaluate at compile-time",
            Loop => "control flow loop found",
            Overflow => "integer overflow detected",
            Trap => "trap detected"
        }
    }
}

impl<'a> TryFrom<&'a str> for UnknownReason {
    type Error = Error;
    fn try_from(v: &'a str) -> Result<Self> {
        use UnknownReason::*;
        Ok(match v {
            "default" => Default,
            "too_many_instructions" => TooManyInstructions,
            "loop" => Loop,
            "overflow" => Overflow,
            "trap" => Trap,
            _ => return Err(Error::new(format!("Unrecognized unknown reason {}", v)))
        })
    }
}

impl Into<&'static str> for UnknownReason {
    fn into(self) -> &'static str {
        use UnknownReason::*;
        match self {
            Default => "default",
            TooManyInstructions => "too_many_instructions",
            Loop => "loop",
            Overflow => "overflow",
            Trap => "trap"
        }
    }
}

/// Payload of an unknown value: what failed, why, and the call sites
/// folding went through to get there (outermost first).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct UnknownInfo<'a> {
    node: NodeRef,
    reason: UnknownReason,
    call_stack: &'a [SourceLoc]
}

impl<'a> UnknownInfo<'a> {
    pub(crate) fn new(node: NodeRef, reason: UnknownReason, call_stack: &'a [SourceLoc]) -> Self {
        Self { node, reason, call_stack }
    }

    pub fn node(&self) -> NodeRef { self.node }
    pub fn reason(&self) -> UnknownReason { self.reason }
    pub fn call_stack(&self) -> &'a [SourceLoc] { self.call_stack }
}
