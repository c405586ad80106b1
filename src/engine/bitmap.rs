//! RGB8 pixel buffers

use crate::geometry::{Rectangle, Size};

const CHANNELS: usize = 3;

/// Paper white, the background for anything outside a rendered page
pub const WHITE: [u8; 3] = [0xff, 0xff, 0xff];

/// Rendered pixels: 3 bytes per pixel (R, G, B), rows top to bottom
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Bitmap of one solid colour
    #[must_use]
    pub fn filled(size: Size, rgb: [u8; 3]) -> Self {
        let width = size.width.max(0);
        let height = size.height.max(0);
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap raw RGB rows; `None` if the buffer does not match the size
    #[must_use]
    pub fn from_rgb(width: i32, height: i32, pixels: Vec<u8>) -> Option<Self> {
        if width < 0 || height < 0 {
            return None;
        }
        let expected = width as usize * height as usize * CHANNELS;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Pixel at (x, y); `None` outside the bitmap
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&rgb);
    }

    /// Part of the bitmap clipped to its bounds
    fn clip(&self, r: &Rectangle) -> Rectangle {
        r.normalize().intersect(&self.size().to_rect())
    }

    /// Copy `src_rect` of `src` so its corner lands at (dst_x, dst_y).
    ///
    /// Both sides are clipped; nothing outside either bitmap is touched.
    pub fn blit(&mut self, src: &Bitmap, src_rect: &Rectangle, dst_x: i32, dst_y: i32) {
        let from = src.clip(src_rect);
        if from.is_empty() {
            return;
        }
        let dx = dst_x + (from.x - src_rect.x);
        let dy = dst_y + (from.y - src_rect.y);
        let to = Rectangle::new(dx, dy, from.width, from.height).intersect(&self.size().to_rect());
        if to.is_empty() {
            return;
        }

        let sx = from.x + (to.x - dx);
        let sy = from.y + (to.y - dy);
        let row_bytes = to.width as usize * CHANNELS;
        for row in 0..to.height {
            let s = src.offset(sx, sy + row);
            let d = self.offset(to.x, to.y + row);
            self.pixels[d..d + row_bytes].copy_from_slice(&src.pixels[s..s + row_bytes]);
        }
    }

    pub fn fill(&mut self, r: &Rectangle, rgb: [u8; 3]) {
        let r = self.clip(r);
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                let i = self.offset(x, y);
                self.pixels[i..i + CHANNELS].copy_from_slice(&rgb);
            }
        }
    }

    /// Invert every channel inside `r`
    pub fn invert_rect(&mut self, r: &Rectangle) {
        let r = self.clip(r);
        for y in r.y..r.bottom() {
            let start = self.offset(r.x, y);
            let end = start + r.width as usize * CHANNELS;
            for b in &mut self.pixels[start..end] {
                *b = !*b;
            }
        }
    }

    /// Invert the whole bitmap, for dark mode
    pub fn invert(&mut self) {
        for b in &mut self.pixels {
            *b = !*b;
        }
    }
}
