//! Pixel buffers owned by widgets.
//!
//! The tree never touches pixels itself: it allocates, resizes and copies
//! buffers through [`PixelSurface`]. A host with its own graphics layer
//! implements the trait on its buffer type; [`SoftwareSurface`] is the CPU
//! implementation used headless and in tests.

use image::{imageops, GenericImageView, Rgba, RgbaImage};

use crate::geometry::{Color, Rect};

/// What happens to existing pixels when a surface is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Content is undefined afterwards (callers clear or repaint it).
    Discard,
    /// The overlapping top-left area is kept.
    Preserve,
}

/// An owned, resizable pixel buffer.
///
/// Rectangles passed to `blit` and `copy_rect` are clipped against both
/// surfaces; out-of-range parts are silently skipped.
pub trait PixelSurface: Sized {
    /// Allocate a new surface.
    fn new(width: u32, height: u32, alpha: bool) -> Self;

    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32, mode: ResizeMode);

    fn clear(&mut self, color: Color);

    /// Draw `src_rect` of `src` at `(dst_x, dst_y)`, blending with the
    /// destination when `src` carries alpha.
    fn blit(&mut self, src: &Self, src_rect: Rect, dst_x: i32, dst_y: i32);

    /// Pixel-exact copy of `src_rect` of `src` to `(dst_x, dst_y)`.
    fn copy_rect(&mut self, src: &Self, src_rect: Rect, dst_x: i32, dst_y: i32);

    fn bounds(&self) -> Rect {
        let (width, height) = self.size();
        Rect::from_size(width, height)
    }
}

/// CPU surface backed by an [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    image: RgbaImage,
    alpha: bool,
}

impl SoftwareSurface {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some((*self.image.get_pixel(x as u32, y as u32)).into())
    }

    /// Copy `src_rect` of `src` so its origin lands on `(dst_x, dst_y)`,
    /// blending when `blend` is set. Destination clipping is left to
    /// `imageops`.
    fn transfer(&mut self, src: &SoftwareSurface, src_rect: Rect, dst_x: i32, dst_y: i32, blend: bool) {
        let area = src_rect.clip(&src.bounds());
        if area.is_empty() {
            return;
        }
        let x = dst_x as i64 + (area.x - src_rect.x) as i64;
        let y = dst_y as i64 + (area.y - src_rect.y) as i64;
        let view = src
            .image
            .view(area.x as u32, area.y as u32, area.width, area.height);

        if blend {
            imageops::overlay(&mut self.image, &*view, x, y);
        } else {
            imageops::replace(&mut self.image, &*view, x, y);
        }
    }
}

impl PixelSurface for SoftwareSurface {
    fn new(width: u32, height: u32, alpha: bool) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            alpha,
        }
    }

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32, mode: ResizeMode) {
        if self.size() == (width, height) {
            return;
        }
        let old = std::mem::replace(&mut self.image, RgbaImage::new(width, height));
        if mode == ResizeMode::Preserve {
            imageops::replace(&mut self.image, &old, 0, 0);
        }
    }

    fn clear(&mut self, color: Color) {
        let pixel: Rgba<u8> = color.into();
        for p in self.image.pixels_mut() {
            *p = pixel;
        }
    }

    fn blit(&mut self, src: &Self, src_rect: Rect, dst_x: i32, dst_y: i32) {
        self.transfer(src, src_rect, dst_x, dst_y, src.alpha);
    }

    fn copy_rect(&mut self, src: &Self, src_rect: Rect, dst_x: i32, dst_y: i32) {
        self.transfer(src, src_rect, dst_x, dst_y, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(0xFF, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 0xFF);

    #[test]
    fn test_new_surface_size() {
        let surface = SoftwareSurface::new(4, 3, true);
        assert_eq!(surface.size(), (4, 3));
        assert_eq!(surface.bounds(), Rect::new(0, 0, 4, 3));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_copy_rect_places_pixels() {
        let mut src = SoftwareSurface::new(2, 2, true);
        src.clear(RED);
        let mut dst = SoftwareSurface::new(5, 5, true);
        dst.clear(BLUE);

        dst.copy_rect(&src, src.bounds(), 2, 3);

        assert_eq!(dst.pixel(2, 3), Some(RED));
        assert_eq!(dst.pixel(3, 4), Some(RED));
        assert_eq!(dst.pixel(1, 3), Some(BLUE));
        assert_eq!(dst.pixel(2, 2), Some(BLUE));
    }

    #[test]
    fn test_copy_rect_clips_at_destination_edge() {
        let mut src = SoftwareSurface::new(3, 3, true);
        src.clear(RED);
        let mut dst = SoftwareSurface::new(4, 4, true);
        dst.clear(BLUE);

        dst.copy_rect(&src, src.bounds(), -1, 2);

        assert_eq!(dst.pixel(0, 2), Some(RED));
        assert_eq!(dst.pixel(1, 3), Some(RED));
        assert_eq!(dst.pixel(2, 2), Some(BLUE));
    }

    #[test]
    fn test_copy_rect_reads_sub_rectangle() {
        let mut src = SoftwareSurface::new(4, 4, true);
        src.clear(BLUE);
        let mut corner = SoftwareSurface::new(2, 2, true);
        corner.clear(RED);
        src.copy_rect(&corner, corner.bounds(), 2, 2);
        let mut dst = SoftwareSurface::new(2, 2, true);

        dst.copy_rect(&src, Rect::new(2, 2, 2, 2), 0, 0);

        assert_eq!(dst.pixel(0, 0), Some(RED));
        assert_eq!(dst.pixel(1, 1), Some(RED));
    }

    #[test]
    fn test_blit_blends_transparent_pixels() {
        let src = SoftwareSurface::new(2, 2, true); // fully transparent
        let mut dst = SoftwareSurface::new(2, 2, true);
        dst.clear(BLUE);

        dst.blit(&src, src.bounds(), 0, 0);

        assert_eq!(dst.pixel(0, 0), Some(BLUE));
    }

    #[test]
    fn test_blit_clips_source_and_destination() {
        let mut src = SoftwareSurface::new(3, 3, true);
        src.clear(Color::rgba(0xFF, 0, 0, 0x80));
        let mut dst = SoftwareSurface::new(4, 4, true);
        dst.clear(BLUE);

        // The source keeps its (1,1)-(2,2) corner, whose left column falls
        // off the destination.
        dst.blit(&src, Rect::new(1, 1, 4, 4), -1, 0);

        let blended = dst.pixel(0, 0).unwrap();
        assert_eq!(dst.pixel(0, 1), Some(blended));
        assert!(blended.r > 0x70 && blended.b > 0x70, "{:?}", blended);
        assert_eq!(dst.pixel(1, 0), Some(BLUE));
        assert_eq!(dst.pixel(0, 2), Some(BLUE));
    }

    #[test]
    fn test_blit_without_alpha_copies() {
        let src = SoftwareSurface::new(2, 2, false);
        let mut dst = SoftwareSurface::new(2, 2, true);
        dst.clear(BLUE);

        dst.blit(&src, src.bounds(), 0, 0);

        assert_eq!(dst.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_resize_preserve_keeps_overlap() {
        let mut surface = SoftwareSurface::new(2, 2, true);
        surface.clear(RED);

        surface.resize(3, 1, ResizeMode::Preserve);

        assert_eq!(surface.size(), (3, 1));
        assert_eq!(surface.pixel(1, 0), Some(RED));
        assert_eq!(surface.pixel(2, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_resize_discard() {
        let mut surface = SoftwareSurface::new(2, 2, true);
        surface.clear(RED);
        surface.resize(4, 4, ResizeMode::Discard);
        assert_eq!(surface.size(), (4, 4));
        assert_eq!(surface.pixel(0, 0), Some(Color::TRANSPARENT));
    }
}
