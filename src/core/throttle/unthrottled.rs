use super::{Gate, Operation, Throttler};

/// Throttler whose gates always fire
///
/// Useful as a baseline and for exercising the keying side on its own. Its
/// gates return the operation's result directly, with no absence marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

/// Gate built by [`Unthrottled`]
pub struct UnthrottledGate<R> {
    op: Operation<R>,
}

impl<R> Throttler<R> for Unthrottled {
    type Gate = UnthrottledGate<R>;

    fn throttle(&self, op: Operation<R>) -> UnthrottledGate<R> {
        UnthrottledGate { op }
    }
}

impl<R> Gate for UnthrottledGate<R> {
    type Output = R;

    fn fire(&self) -> R {
        (self.op)()
    }
}
