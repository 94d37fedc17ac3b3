//! Call Stack
//!
//! Tracks which intercepted entry points are currently executing. Observers
//! may call other wrapped entry points, so calls nest; the stack records the
//! nesting for logging and lets callers ask how deep they are.
//!
//! # Implementation
//!
//! Entering a call pushes a frame and returns a guard that pops it when
//! dropped. The frame is popped even when the call fails or an observer
//! returns an error part way through.

use std::cell::{Cell, RefCell};

#[derive(Debug, Clone)]
struct Frame {
    entry_point: String,
    seq: u64,
}

/// Stack of in-flight intercepted calls.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: RefCell<Vec<Frame>>,
    /// Total calls entered so far; doubles as the frame sequence number.
    calls: Cell<u64>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a call. The frame is popped when the guard drops.
    pub fn enter(&self, entry_point: &str) -> FrameGuard<'_> {
        let seq = self.calls.get() + 1;
        self.calls.set(seq);
        self.frames.borrow_mut().push(Frame {
            entry_point: entry_point.to_owned(),
            seq,
        });
        FrameGuard { stack: self, seq }
    }

    /// Number of calls currently executing.
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// The innermost entry point currently executing.
    pub fn current(&self) -> Option<String> {
        self.frames.borrow().last().map(|frame| frame.entry_point.clone())
    }

    /// Entry points currently executing, outermost first.
    pub fn entry_points(&self) -> Vec<String> {
        self.frames
            .borrow()
            .iter()
            .map(|frame| frame.entry_point.clone())
            .collect()
    }

    /// Total number of calls entered since construction.
    pub fn total_calls(&self) -> u64 {
        self.calls.get()
    }
}

/// Pops its frame from the call stack on drop.
pub struct FrameGuard<'a> {
    stack: &'a CallStack,
    seq: u64,
}

impl FrameGuard<'_> {
    /// Depth of this frame (1 for an outermost call).
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let popped = self.stack.frames.borrow_mut().pop();

        // Guards are dropped in reverse order of entry.
        if let Some(frame) = popped {
            debug_assert_eq!(
                frame.seq, self.seq,
                "CallStack mismatch: expected frame {}, got {} ({})",
                self.seq, frame.seq, frame.entry_point
            );
        }
    }
}
