use std::time::Duration;

use crate::geometry::Color;

/// Configuration of a widget [`Tree`](crate::tree::Tree).
///
/// ```ignore
/// GuiConfig::new()
///     .altitude_range(0, 1000)
///     .fade_in(Duration::from_millis(250))
///     .clear_color(Color::TRANSPARENT)
/// ```
#[derive(Debug, Clone)]
pub struct GuiConfig {
    /// Lowest depth a top-level widget can have.
    pub lowest_altitude: u32,
    /// Highest depth a top-level widget can have.
    pub highest_altitude: u32,
    /// Size of the buffer a top-level widget gets before it is placed.
    pub root_placeholder: (u32, u32),
    /// Duration of the fade-in requested for each new top-level widget.
    pub fade_in: Duration,
    /// Color of a freshly (re)allocated drawing surface.
    pub clear_color: Color,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            lowest_altitude: 0,
            highest_altitude: 30000,
            root_placeholder: (10, 10),
            fade_in: Duration::from_millis(500),
            clear_color: Color::BLACK,
        }
    }
}

impl GuiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn altitude_range(mut self, lowest: u32, highest: u32) -> Self {
        self.lowest_altitude = lowest.min(highest);
        self.highest_altitude = highest.max(lowest);
        self
    }

    pub fn root_placeholder(mut self, width: u32, height: u32) -> Self {
        self.root_placeholder = (width.max(1), height.max(1));
        self
    }

    pub fn fade_in(mut self, duration: Duration) -> Self {
        self.fade_in = duration;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Altitude handed to the first floating widget.
    ///
    /// Floating altitudes count down from here; their magnitude is the depth
    /// reported to the scene, a third of the way into the shared domain.
    pub fn first_floating_level(&self) -> i32 {
        let sum = self.highest_altitude as i64 + self.lowest_altitude as i64;
        -((sum / 3).min(i32::MAX as i64) as i32)
    }
}

/// Timing and spacing of the [`TooltipTracker`](crate::tooltip::TooltipTracker).
#[derive(Debug, Clone)]
pub struct TooltipConfig {
    /// Hover time before a tip appears.
    pub show_delay: Duration,
    /// A pending tip is dropped if the pointer stays quiet this long.
    pub cancel_after: Duration,
    /// How long a shown tip stays up without new hover reports.
    pub linger: Duration,
    /// Hover reports after this much waiting show the tip immediately.
    pub insist_after: Duration,
    /// Space added around the text on each side.
    pub border: u32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            show_delay: Duration::from_millis(1000),
            cancel_after: Duration::from_millis(500),
            linger: Duration::from_millis(1000),
            insist_after: Duration::from_millis(250),
            border: 4,
        }
    }
}

impl TooltipConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_delay(mut self, delay: Duration) -> Self {
        self.show_delay = delay;
        self
    }

    pub fn cancel_after(mut self, delay: Duration) -> Self {
        self.cancel_after = delay;
        self
    }

    pub fn linger(mut self, delay: Duration) -> Self {
        self.linger = delay;
        self
    }

    pub fn insist_after(mut self, delay: Duration) -> Self {
        self.insist_after = delay;
        self
    }

    pub fn border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }
}
