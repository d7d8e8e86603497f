//! Tooltips.
//!
//! The router reports every hover over a widget carrying tooltip text to a
//! [`TooltipSink`]. [`TooltipTracker`] is the sink hosts normally use: it
//! debounces those reports into show/hide decisions and places the tip on
//! screen; drawing it is left to the host.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::TooltipConfig;
use crate::geometry::Rect;
use crate::tree::WidgetId;

pub trait TooltipSink {
    /// The pointer hovers `caller`, whose rectangle is `area` in screen
    /// coordinates.
    fn notify(&mut self, text: &str, area: Rect, caller: WidgetId);
}

/// Visibility change reported by [`TooltipTracker::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipChange {
    Show,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Delaying,
    Shown,
}

/// Hover debouncer.
///
/// A hover over a new widget arms a delay. Hover reports that keep coming
/// after `insist_after` show the tip; a pending tip with no report for
/// `cancel_after` is dropped. A shown tip stays up while reports come, and
/// `linger` longer.
pub struct TooltipTracker {
    config: TooltipConfig,
    measure: Box<dyn Fn(&str) -> (u32, u32)>,
    screen: (u32, u32),
    caller: Option<WidgetId>,
    text: String,
    placement: Rect,
    elapsed: Duration,
    phase: Phase,
}

impl TooltipTracker {
    /// `measure` gives the pixel size of a text, without border.
    pub fn new(config: TooltipConfig, measure: impl Fn(&str) -> (u32, u32) + 'static) -> Self {
        Self {
            config,
            measure: Box::new(measure),
            screen: (u32::MAX, u32::MAX),
            caller: None,
            text: String::new(),
            placement: Rect::default(),
            elapsed: Duration::ZERO,
            phase: Phase::Idle,
        }
    }

    /// Wrap the tracker so the tree and the host can share it.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Screen size the tip is kept inside.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen = (width, height);
    }

    /// The tip to draw, if any: text and screen rectangle, border included.
    pub fn visible(&self) -> Option<(&str, Rect)> {
        (self.phase == Phase::Shown).then_some((self.text.as_str(), self.placement))
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Delaying
    }

    /// Widget the current (pending or shown) tip belongs to.
    pub fn caller(&self) -> Option<WidgetId> {
        self.caller
    }

    /// Let `frame` pass.
    pub fn advance(&mut self, frame: Duration) -> Option<TooltipChange> {
        self.elapsed += frame;
        match self.phase {
            Phase::Idle => None,
            Phase::Delaying if self.elapsed > self.config.show_delay => {
                self.phase = Phase::Shown;
                self.elapsed = Duration::ZERO;
                log::debug!("tooltip for {:?} shown", self.caller);
                Some(TooltipChange::Show)
            }
            Phase::Delaying if self.elapsed > self.config.cancel_after => {
                self.reset();
                None
            }
            Phase::Shown if self.elapsed > self.config.linger => {
                self.reset();
                Some(TooltipChange::Hide)
            }
            Phase::Delaying | Phase::Shown => None,
        }
    }

    /// Drop the tip at once.
    pub fn dismiss(&mut self) -> Option<TooltipChange> {
        let was_shown = self.phase == Phase::Shown;
        self.reset();
        was_shown.then_some(TooltipChange::Hide)
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.caller = None;
        self.elapsed = Duration::ZERO;
    }

    /// Centered under `area`, or above it when it would leave the screen at
    /// the bottom, and kept inside the screen horizontally.
    fn place(&self, text: &str, area: Rect) -> Rect {
        let (text_width, text_height) = (self.measure)(text);
        let border = self.config.border.saturating_mul(2);
        let width = text_width.saturating_add(border);
        let height = text_height.saturating_add(border);

        let centered = area.x as i64 + area.width as i64 / 2 - width as i64 / 2;
        let max_x = (self.screen.0 as i64 - width as i64).max(0);
        let x = centered.clamp(0, max_x);

        let below = area.bottom();
        let y = if below + height as i64 > self.screen.1 as i64 {
            (area.y as i64 - height as i64).max(0)
        } else {
            below
        };

        Rect::new(x as i32, y as i32, width, height)
    }
}

impl TooltipSink for TooltipTracker {
    fn notify(&mut self, text: &str, area: Rect, caller: WidgetId) {
        if self.caller != Some(caller) {
            self.placement = self.place(text, area);
            self.text = text.to_owned();
            self.caller = Some(caller);
            self.phase = Phase::Delaying;
            self.elapsed = Duration::ZERO;
            return;
        }

        match self.phase {
            Phase::Delaying if self.elapsed > self.config.insist_after => {
                self.elapsed += self.config.show_delay;
            }
            Phase::Shown => self.elapsed = Duration::ZERO,
            _ => {}
        }
    }
}

impl TooltipSink for Rc<RefCell<TooltipTracker>> {
    fn notify(&mut self, text: &str, area: Rect, caller: WidgetId) {
        self.borrow_mut().notify(text, area, caller);
    }
}
