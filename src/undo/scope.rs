use crate::foundation::error::RenderqResult;
use crate::host::RenderHost;

/// Open undo transaction. Every change made to the host between [`UndoScope::enter`] and
/// [`UndoScope::exit`] is reverted on exit, whatever the outcome of the protected block.
#[must_use = "an undo scope must be closed with `exit`"]
#[derive(Debug)]
pub struct UndoScope {
    message: String,
}

impl UndoScope {
    /// Push an undo snapshot labelled `message` and open the scope.
    pub fn enter<H: RenderHost + ?Sized>(
        host: &mut H,
        message: impl Into<String>,
    ) -> RenderqResult<Self> {
        let message = message.into();
        host.undo_push(&message)?;
        Ok(Self { message })
    }

    /// Revert to the snapshot taken on entry, then hand back `result` unchanged.
    ///
    /// If the revert itself fails, the body's error takes precedence; a successful body reports
    /// the revert error instead.
    pub fn exit<H: RenderHost + ?Sized, T>(
        self,
        host: &mut H,
        result: RenderqResult<T>,
    ) -> RenderqResult<T> {
        if let Err(err) = &result {
            tracing::warn!(scope = %self.message, error = %err, "reverting after error");
        }
        match (host.undo(), result) {
            (Ok(()), result) => result,
            (Err(undo_err), Ok(_)) => Err(undo_err),
            (Err(undo_err), Err(err)) => {
                tracing::warn!(scope = %self.message, error = %undo_err, "revert failed");
                Err(err)
            }
        }
    }
}

/// Run `f` inside an [`UndoScope`].
pub fn undo_scope<H, T, F>(host: &mut H, message: &str, f: F) -> RenderqResult<T>
where
    H: RenderHost + ?Sized,
    F: FnOnce(&mut H) -> RenderqResult<T>,
{
    let scope = UndoScope::enter(host, message)?;
    let result = f(host);
    scope.exit(host, result)
}

#[cfg(test)]
#[path = "../../tests/unit/undo/scope.rs"]
mod tests;
