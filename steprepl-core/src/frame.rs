//! Call frames reported by the interpreter

use std::fmt;
use std::sync::Arc;

/// Shared handle to an interpreter call frame
pub type FrameRef = Arc<dyn CallFrame>;

/// One active call in the interpreter's call chain.
///
/// Frames are owned by the interpreter and are immutable for the lifetime of
/// the call. The controller only reads them while the worker is halted.
pub trait CallFrame: Send + Sync + fmt::Debug {
    /// Depth of this call in the call chain; top-level calls are depth 0
    fn depth(&self) -> usize;

    /// The frame that made this call
    fn caller(&self) -> Option<FrameRef>;

    /// Source text of the method being run, used in halt messages
    fn describe(&self) -> String;

    /// Walk from this frame out to the top-level call
    fn ancestry(&self) -> Vec<String> {
        let mut chain = vec![self.describe()];
        let mut next = self.caller();
        while let Some(frame) = next {
            chain.push(frame.describe());
            next = frame.caller();
        }
        chain
    }
}

/// Stack level of an optional frame: the root (no frame) is level 0, a
/// frame at depth `d` is level `d + 1`.
///
/// Levels let a step target be stored as a number, so it never keeps an
/// interpreter frame alive.
pub fn level_of(frame: Option<&FrameRef>) -> usize {
    frame.map_or(0, |f| f.depth() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Frame {
        depth: usize,
        name: &'static str,
        caller: Option<FrameRef>,
    }

    impl CallFrame for Frame {
        fn depth(&self) -> usize {
            self.depth
        }

        fn caller(&self) -> Option<FrameRef> {
            self.caller.clone()
        }

        fn describe(&self) -> String {
            self.name.to_string()
        }
    }

    fn chain() -> FrameRef {
        let outer: FrameRef = Arc::new(Frame { depth: 0, name: "Outer", caller: None });
        let inner: FrameRef = Arc::new(Frame { depth: 1, name: "Inner", caller: Some(outer) });
        Arc::new(Frame { depth: 2, name: "Leaf", caller: Some(inner) })
    }

    #[test]
    fn test_ancestry_runs_innermost_first() {
        assert_eq!(chain().ancestry(), vec!["Leaf", "Inner", "Outer"]);
    }

    #[test]
    fn test_levels() {
        let leaf = chain();
        assert_eq!(level_of(None), 0);
        assert_eq!(level_of(Some(&leaf)), 3);
        assert_eq!(level_of(leaf.caller().as_ref()), 2);
    }
}
