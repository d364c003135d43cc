//! Stack growth for the recursive parts of the interpreter.
//!
//! Parsing nested expressions and evaluating nested calls both recurse on the
//! host stack. Wrapping those recursion points in [`ensure_sufficient_stack`]
//! grows the stack on demand instead of overflowing it.

/// If less than this remains, the stack is grown before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
