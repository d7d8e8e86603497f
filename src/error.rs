use thiserror::Error;

use crate::tree::WidgetId;

/// Contract violations detected by tree operations.
///
/// An operation that fails leaves the tree exactly as it was; the error has
/// already been logged when it reaches the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("widget {0:?} does not exist (deleted or never created)")]
    UnknownWidget(WidgetId),
    #[error("child slot {index} is out of range for {widget:?} ({count} slots)")]
    SlotOutOfRange {
        widget: WidgetId,
        index: usize,
        count: usize,
    },
    #[error("child slot {index} of {widget:?} is not set")]
    EmptySlot { widget: WidgetId, index: usize },
    #[error("widget {child:?} was created for parent {expected:?}, not {actual:?}")]
    ParentMismatch {
        child: WidgetId,
        expected: Option<WidgetId>,
        actual: WidgetId,
    },
    #[error("widget {0:?} is not set in any slot of its parent")]
    Detached(WidgetId),
    #[error("widget {0:?} is not a top-level widget")]
    NotTopLevel(WidgetId),
    #[error("top-level widget {0:?} is already being deleted")]
    AlreadyDeleting(WidgetId),
    #[error("widget {0:?} is a container and has no drawing surface")]
    NoSurface(WidgetId),
    #[error("altitude {altitude} is outside {lowest}..={highest}")]
    AltitudeOutOfRange {
        altitude: u32,
        lowest: u32,
        highest: u32,
    },
}

pub type Result<T> = std::result::Result<T, WidgetError>;

/// Log a contract violation and hand it back for propagation.
pub(crate) fn violation(err: WidgetError) -> WidgetError {
    log::error!("{}", err);
    err
}
