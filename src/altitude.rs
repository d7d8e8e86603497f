//! Depth bookkeeping for floating top-level widgets.
//!
//! Top-level widgets either have an explicit, non-negative altitude or a
//! negative "floating" one managed here. Floating altitudes are handed out
//! counting down from [`GuiConfig::first_floating_level`]; the scene paints
//! by magnitude, so the most recently opened (most negative) floating widget
//! is on top. The set stays contiguous: the widget at position `i` in
//! opening order always has altitude `first_level - i`.
//!
//! [`GuiConfig::first_floating_level`]: crate::config::GuiConfig::first_floating_level

use crate::tree::WidgetId;

/// A floating widget whose altitude changed, to be applied to the node and
/// reported to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltitudeChange {
    pub widget: WidgetId,
    pub altitude: i32,
}

impl AltitudeChange {
    /// Depth reported to the scene.
    pub fn depth(&self) -> u32 {
        self.altitude.unsigned_abs()
    }
}

#[derive(Debug)]
pub struct AltitudeAllocator {
    /// Floating widgets, oldest first.
    floating: Vec<WidgetId>,
    first_level: i32,
}

impl AltitudeAllocator {
    pub fn new(first_level: i32) -> Self {
        Self {
            floating: Vec::new(),
            first_level,
        }
    }

    /// Altitude the next floating widget will get.
    pub fn next_level(&self) -> i32 {
        self.level_at(self.floating.len())
    }

    pub fn is_floating(&self, id: WidgetId) -> bool {
        self.floating.contains(&id)
    }

    pub fn altitude_of(&self, id: WidgetId) -> Option<i32> {
        self.position(id).map(|i| self.level_at(i))
    }

    /// Floating widgets from bottom to top.
    pub fn floating(&self) -> &[WidgetId] {
        &self.floating
    }

    pub fn len(&self) -> usize {
        self.floating.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floating.is_empty()
    }

    /// Put `id` on top of the floating set and return its altitude.
    ///
    /// Asking again for a widget that already floats returns its current
    /// altitude unchanged.
    pub fn request_automatic(&mut self, id: WidgetId) -> i32 {
        if let Some(altitude) = self.altitude_of(id) {
            return altitude;
        }
        let altitude = self.next_level();
        self.floating.push(id);
        log::debug!("{:?} floats at altitude {}", id, altitude);
        altitude
    }

    /// Take `id` out of the floating set.
    ///
    /// Widgets opened after it move down one level to close the gap; the
    /// returned changes list them with their new altitude.
    pub fn release(&mut self, id: WidgetId) -> Vec<AltitudeChange> {
        let Some(index) = self.position(id) else {
            return Vec::new();
        };
        self.floating.remove(index);
        log::debug!("{:?} no longer floats", id);
        self.renumber_from(index)
    }

    /// Move `id` to the top of the floating set.
    ///
    /// Returns every widget whose altitude changed, `id` included. A widget
    /// already on top, or not floating, yields no change.
    pub fn raise(&mut self, id: WidgetId) -> Vec<AltitudeChange> {
        let Some(index) = self.position(id) else {
            return Vec::new();
        };
        if index + 1 == self.floating.len() {
            return Vec::new();
        }
        self.floating.remove(index);
        self.floating.push(id);
        self.renumber_from(index)
    }

    fn position(&self, id: WidgetId) -> Option<usize> {
        self.floating.iter().position(|&w| w == id)
    }

    fn level_at(&self, index: usize) -> i32 {
        self.first_level - index as i32
    }

    fn renumber_from(&self, index: usize) -> Vec<AltitudeChange> {
        self.floating[index..]
            .iter()
            .enumerate()
            .map(|(offset, &widget)| AltitudeChange {
                widget,
                altitude: self.level_at(index + offset),
            })
            .collect()
    }
}
