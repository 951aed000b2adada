use codespan::Files;

use super::{SourceLoc, NodeLocations, Diagnostic, DiagnosticSink, NoteKind};
use crate::store::{Value, Kind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssertOutcome {
    Holds,
    Failed,
    NotConstant
}

/// Checks the folded condition of a compile-time assertion at `loc`,
/// reporting to `sink` if it does not hold or could not be folded.
///
/// The condition must be a 1-bit integer, possibly wrapped in single
/// element aggregates; anything else is a bug in the caller.
pub fn check_static_assert<S: AsRef<str>>(condition: Value<'_>, message: &str, loc: Option<SourceLoc>,
                                          files: &Files<S>, nodes: &dyn NodeLocations,
                                          sink: &mut dyn DiagnosticSink) -> AssertOutcome {
    let condition = condition.look_through_single_element_aggregates();
    if !condition.is_constant() {
        let mut diag = Diagnostic::new(NoteKind::AssertNotConstant, loc);
        if let Some(loc) = loc {
            diag = diag.with_highlight(loc.span);
        }
        sink.diagnose(diag);
        // more specific information on what went wrong, if we have any
        if condition.kind() == Kind::Unknown {
            condition.emit_unknown_diagnostic_notes(loc, files, nodes, sink);
        }
        return AssertOutcome::NotConstant
    }

    assert_eq!(condition.kind(), Kind::Integer, "static assertion condition must be an integer");
    let value = condition.integer_value();
    assert_eq!(value.bit_width(), 1, "static assertion condition must be a single bit");
    if value.is_zero() {
        log::debug!(target: "diag", "static assertion at {:?} failed", loc);
        let text = format!("static assertion failed: {}", message);
        sink.diagnose(Diagnostic::new(NoteKind::AssertFailed, loc).with_message(text));
        return AssertOutcome::Failed
    }
    AssertOutcome::Holds
}
