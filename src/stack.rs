//! Stack growth for the recursive parts of the pipeline.
//!
//! The parser, the evaluator and value printing all recurse once per level
//! of nesting in the source (or in the data). Wrapping those entry points
//! in [`ensure_sufficient_stack`] moves deep inputs onto freshly allocated
//! stack segments instead of overflowing the thread's stack.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
