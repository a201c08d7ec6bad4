//! View notification port definition.

use crate::domain::errors::ErrorKind;

/// Presentation callbacks issued by the gallery controller.
/// Calls are fire-and-forget and always made from the controller's task.
#[cfg_attr(test, mockall::automock)]
pub trait ViewNotifier: Send + Sync {
    /// The item list grew; the grid should re-render.
    fn on_items_changed(&self);

    /// A page fetch started or finished.
    fn on_loading_state_changed(&self, loading: bool);

    /// A recoverable fetch error occurred.
    fn on_error(&self, kind: ErrorKind);
}
