use codespan::{FileId, Files, LineIndex, Span};

use super::{UnknownInfo, UnknownReason, SourceLoc, NodeLocations, skip_internal_locations};
use crate::store::Value;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NoteKind {
    // explains why the value is unknown
    UnknownReason,
    NotEvaluable,
    CalledFrom,
    AssertNotConstant,
    AssertFailed
}

impl NoteKind {
    // fixed texts, UnknownReason and AssertFailed carry their own
    fn default_message(&self) -> &'static str {
        match self {
            NoteKind::UnknownReason => "could not fold operation",
            NoteKind::NotEvaluable => "expression not evaluable as constant here",
            NoteKind::CalledFrom => "when called from here",
            NoteKind::AssertNotConstant => "static assertion condition is not constant",
            NoteKind::AssertFailed => "static assertion failed"
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Diagnostic {
    pub kind: NoteKind,
    pub loc: Option<SourceLoc>,
    pub message: String,
    pub highlight: Option<Span>
}

impl Diagnostic {
    pub fn new(kind: NoteKind, loc: Option<SourceLoc>) -> Self {
        Self { kind, loc, message: kind.default_message().to_string(), highlight: None }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }

    pub fn with_highlight(mut self, span: Span) -> Self {
        self.highlight = Some(span);
        self
    }
}

/// Whatever renders diagnostics for the user.
pub trait DiagnosticSink {
    fn diagnose(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic)
    }
}

// lines are only comparable within the same file
fn line_of<S: AsRef<str>>(loc: SourceLoc, files: &Files<S>) -> Option<(FileId, LineIndex)> {
    match loc.line(files) {
        Ok(line) => Some((loc.file, line)),
        Err(e) => {
            log::debug!(target: "diag", "could not resolve line of {:?}: {}", loc, e);
            None
        }
    }
}

impl<'a> UnknownInfo<'a> {
    /// Emits notes explaining why folding failed, given `fallback` as the
    /// location the caller's own diagnostic points at.
    ///
    /// Call-stack frames on the same line as that diagnostic, or as the
    /// reason note, are not repeated. Frames which do not resolve to a
    /// source line are dropped.
    pub fn emit_notes<S: AsRef<str>>(&self, fallback: Option<SourceLoc>, files: &Files<S>,
                                     nodes: &dyn NodeLocations, sink: &mut dyn DiagnosticSink) {
        let inst_loc = match nodes.instruction_location(self.node) {
            Some(l) => l,
            None => return
        };

        let primary = self.emit_reason_note(inst_loc, fallback, nodes, sink);
        let mut emitted_first = primary.is_some();

        let fallback = match fallback {
            Some(f) => f,
            None => {
                sink.diagnose(Diagnostic::new(NoteKind::NotEvaluable, None));
                return
            }
        };

        let mut suppressed_lines = Vec::new();
        suppressed_lines.extend(line_of(fallback, files));
        suppressed_lines.extend(primary.and_then(|p| line_of(p, files)));

        for frame in self.call_stack.iter().rev() {
            // frames we can not place in the source are of no use to the user
            let line = match line_of(*frame, files) {
                Some(line) => line,
                None => continue
            };
            if suppressed_lines.contains(&line) {
                log::debug!(target: "diag", "skipping frame {:?} on an already reported line", frame);
                continue
            }
            let kind = if emitted_first { NoteKind::CalledFrom } else { NoteKind::NotEvaluable };
            log::debug!(target: "diag", "{:?} note at {:?}", kind, frame);
            sink.diagnose(Diagnostic::new(kind, Some(*frame)));
            emitted_first = true;
        }
    }

    // Returns where the reason note went, if one was emitted
    fn emit_reason_note(&self, inst_loc: super::DebugLocation, fallback: Option<SourceLoc>,
                        nodes: &dyn NodeLocations, sink: &mut dyn DiagnosticSink) -> Option<SourceLoc> {
        let loc = match (skip_internal_locations(nodes, inst_loc).loc, fallback) {
            (Some(loc), _) => loc,
            // without a position, only bother if there is something specific to say
            (None, Some(fallback)) if self.reason != UnknownReason::Default => fallback,
            _ => return None
        };
        log::debug!(target: "diag", "{:?} reason note at {:?}", self.reason, loc);
        sink.diagnose(Diagnostic::new(NoteKind::UnknownReason, Some(loc))
                          .with_message(self.reason.message().to_string())
                          .with_highlight(loc.span));
        Some(loc)
    }
}

impl<'a> Value<'a> {
    /// Given that this is an unknown value, emits notes giving context
    /// about what the problem is.
    pub fn emit_unknown_diagnostic_notes<S: AsRef<str>>(&self, fallback: Option<SourceLoc>,
                                                        files: &Files<S>, nodes: &dyn NodeLocations,
                                                        sink: &mut dyn DiagnosticSink) {
        self.unknown_info().emit_notes(fallback, files, nodes, sink)
    }
}
