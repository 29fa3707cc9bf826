// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::resolver::{DefaultLabelResolver, LabelResolver, default_work_group_label};
use si_emulator::{Kernel, ScopeKind, TraceMask, TraceSink};
use std::string::String;
use std::vec::Vec;

/// A work-group zone that has been entered but not exited.
struct OpenZone {
    work_group: u32,
    // Tracy may read the label until the span ends.
    _label: String,
    _span: Option<tracy_client::Span>,
}

/// A `TraceSink` that opens one Tracy zone per work group via `tracy-client`.
///
/// Zones close when the emulator reports the work group's exit. An exit for a work group that was
/// entered earlier also closes every zone opened after it; an exit for an unknown work group
/// closes everything.
pub struct ProfilingTraceSink<R = DefaultLabelResolver> {
    resolver: R,
    open: Vec<OpenZone>,
    entered: u64,
}

impl ProfilingTraceSink<DefaultLabelResolver> {
    /// Create a sink with id-based labels.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(DefaultLabelResolver)
    }
}

impl<R: LabelResolver> ProfilingTraceSink<R> {
    /// Create a sink that asks `resolver` for zone labels.
    #[must_use]
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            open: Vec::new(),
            entered: 0,
        }
    }

    /// Zones currently open.
    #[must_use]
    pub fn open_scopes(&self) -> usize {
        self.open.len()
    }

    /// Work groups entered since the sink was created.
    #[must_use]
    pub fn work_groups_entered(&self) -> u64 {
        self.entered
    }

    fn enter(&mut self, kernel: &Kernel, work_group: u32) {
        let label = self
            .resolver
            .work_group_label(work_group, kernel)
            .unwrap_or_else(|| default_work_group_label(work_group));
        let span = start_span(&label);
        self.entered += 1;
        self.open.push(OpenZone {
            work_group,
            _label: label,
            _span: span,
        });
    }

    fn exit(&mut self, work_group: u32) {
        let keep = self
            .open
            .iter()
            .rposition(|zone| zone.work_group == work_group)
            .unwrap_or(0);
        // Later zones first, so nested spans end inner-to-outer.
        while self.open.len() > keep {
            self.open.pop();
        }
    }
}

fn start_span(label: &str) -> Option<tracy_client::Span> {
    tracy_client::Client::running()
        .map(|client| client.span_alloc(Some(label), "si_emulator.work_group", "si_emulator", 0, 0))
}

impl<R: LabelResolver> TraceSink for ProfilingTraceSink<R> {
    fn mask(&self) -> TraceMask {
        TraceMask::WORK_GROUP
    }

    fn scope_enter(&mut self, kernel: &Kernel, kind: ScopeKind) {
        let ScopeKind::WorkGroup { id } = kind;
        self.enter(kernel, id);
    }

    fn scope_exit(&mut self, _kernel: &Kernel, kind: ScopeKind) {
        let ScopeKind::WorkGroup { id } = kind;
        self.exit(id);
    }
}

impl<R: LabelResolver + Default> Default for ProfilingTraceSink<R> {
    fn default() -> Self {
        Self::with_resolver(R::default())
    }
}

impl<R> std::fmt::Debug for ProfilingTraceSink<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilingTraceSink")
            .field("open", &self.open.len())
            .field("entered", &self.entered)
            .finish_non_exhaustive()
    }
}
