//! Single-slot guard against duplicate in-flight create requests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::effects::{UiEffect, UiSurface};

pub struct SubmissionGate {
    engaged: AtomicBool,
    surface: Arc<dyn UiSurface>,
}

impl SubmissionGate {
    pub fn new(surface: Arc<dyn UiSurface>) -> Self {
        Self {
            engaged: AtomicBool::new(false),
            surface,
        }
    }

    /// Engages the gate, or returns `None` if a submission is already in flight.
    /// Dropping the guard releases the gate.
    pub fn try_enter(&self) -> Option<GateGuard<'_>> {
        self.engaged
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.surface.apply(UiEffect::SubmitControl { busy: true });
        Some(GateGuard { gate: self })
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }
}

pub struct GateGuard<'a> {
    gate: &'a SubmissionGate,
}

impl GateGuard<'_> {
    pub fn exit(self) {}
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.engaged.store(false, Ordering::Release);
        self.gate
            .surface
            .apply(UiEffect::SubmitControl { busy: false });
    }
}
