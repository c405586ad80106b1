//! MuPDF-backed document engine

use std::path::Path;

use log::{debug, warn};
use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Device, Document, Matrix, Page, Pixmap, TextPageFlags};

use super::text::{self, Glyph, TextLine};
use super::{
    Bitmap, DocumentEngine, EngineError, FindFlags, LinkArea, RenderRequest, WHITE, check_page,
};
use crate::geometry::{PageSize, Rectangle, Rotation, Size, flip_y};

/// Engine for everything MuPDF opens (PDF, XPS, CBZ, ...)
#[derive(Clone, Copy, Debug, Default)]
pub struct MupdfEngine;

impl MupdfEngine {
    pub fn new() -> Self {
        Self
    }

    fn load_page(&self, doc: &Document, page: usize) -> Result<Page, EngineError> {
        check_page(page, self.page_count(doc)?)?;
        Ok(doc.load_page((page - 1) as i32)?)
    }
}

impl DocumentEngine for MupdfEngine {
    type Document = Document;

    fn open(&self, path: &Path) -> Result<Document, EngineError> {
        let doc = Document::open(path.to_string_lossy().as_ref()).map_err(|e| {
            EngineError::Open {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;
        debug!("opened {}", path.display());
        Ok(doc)
    }

    fn page_count(&self, doc: &Document) -> Result<usize, EngineError> {
        Ok(doc.page_count()?.max(0) as usize)
    }

    fn page_size(&self, doc: &Document, page: usize) -> Result<PageSize, EngineError> {
        let bounds = self.load_page(doc, page)?.bounds()?;
        Ok(PageSize::new(
            f64::from(bounds.x1 - bounds.x0),
            f64::from(bounds.y1 - bounds.y0),
        ))
    }

    fn render(&self, doc: &Document, request: &RenderRequest) -> Result<Bitmap, EngineError> {
        let page = self.load_page(doc, request.page)?;
        let crop = request.crop;
        if crop.is_empty() {
            return Ok(Bitmap::filled(
                Size::new(crop.width.max(0), crop.height.max(0)),
                WHITE,
            ));
        }

        let bounds = page.bounds()?;
        let ctm = raster_matrix(
            (bounds.x0, bounds.y0),
            (bounds.x1 - bounds.x0, bounds.y1 - bounds.y0),
            request.scale as f32,
            request.rotation,
            crop,
        );

        let mut pixmap =
            Pixmap::new_with_w_h(&Colorspace::device_rgb(), crop.width, crop.height, false)?;
        pixmap.clear_with(0xff)?;
        {
            // The device flushes into the pixmap when it is dropped.
            let device = Device::from_pixmap(&pixmap)?;
            page.run(&device, &ctm)?;
        }

        pixmap_to_bitmap(&pixmap).map_err(|detail| EngineError::Render {
            page: request.page,
            detail,
        })
    }

    fn find_text(
        &self,
        doc: &Document,
        page: usize,
        query: &str,
        flags: FindFlags,
    ) -> Result<Option<Rectangle>, EngineError> {
        let page = self.load_page(doc, page)?;
        Ok(text::find_in_lines(&text_lines(&page)?, query, flags))
    }

    fn links(&self, doc: &Document, page_num: usize) -> Result<Vec<LinkArea>, EngineError> {
        let page = self.load_page(doc, page_num)?;
        let bounds = page.bounds()?;
        let height = f64::from(bounds.y1 - bounds.y0);

        let links = page
            .links()?
            .filter_map(|link| {
                let Some(dest) = link.dest else {
                    // External URIs have no page to jump to.
                    return None;
                };
                let rect = link.bounds;
                if rect.is_empty() {
                    return None;
                }
                let x0 = rect.x0.min(rect.x1) - bounds.x0;
                let y0 = rect.y0.min(rect.y1) - bounds.y0;
                let top_left = Rectangle::new(
                    x0 as i32,
                    y0 as i32,
                    (rect.x1 - rect.x0).abs().ceil() as i32,
                    (rect.y1 - rect.y0).abs().ceil() as i32,
                );
                Some(LinkArea {
                    area: flip_y(top_left, height),
                    target: dest.loc.page_number.max(0) as usize + 1,
                })
            })
            .collect();
        Ok(links)
    }

    fn selected_text(
        &self,
        doc: &Document,
        page: usize,
        rect: Rectangle,
    ) -> Result<String, EngineError> {
        let page = self.load_page(doc, page)?;
        Ok(text::select_text(&text_lines(&page)?, rect))
    }
}

/// Page space to the pixels of `crop`: scale, rotate clockwise, shift the
/// rotated page back to the origin, then move the crop origin to (0, 0).
fn raster_matrix(
    origin: (f32, f32),
    size: (f32, f32),
    scale: f32,
    rotation: Rotation,
    crop: Rectangle,
) -> Matrix {
    let (w, h) = (size.0 * scale, size.1 * scale);
    let (dx, dy) = match rotation {
        Rotation::Deg0 => (0.0, 0.0),
        Rotation::Deg90 => (h, 0.0),
        Rotation::Deg180 => (w, h),
        Rotation::Deg270 => (0.0, w),
    };

    let mut ctm = Matrix::new_translate(-origin.0, -origin.1);
    ctm.concat(Matrix::new_scale(scale, scale));
    ctm.concat(Matrix::new_rotate(rotation.degrees() as f32));
    ctm.concat(Matrix::new_translate(
        dx - crop.x as f32,
        dy - crop.y as f32,
    ));
    ctm
}

/// Text lines of a page, relative to the page's top-left corner
fn text_lines(page: &Page) -> Result<Vec<TextLine>, EngineError> {
    let bounds = page.bounds()?;
    let text_page = page.to_text_page(TextPageFlags::empty())?;

    let mut lines = Vec::new();
    for block in text_page.blocks() {
        if block.r#type() != TextBlockType::Text {
            continue;
        }
        for line in block.lines() {
            let bbox = line.bounds();
            let glyphs: Vec<Glyph> = line
                .chars()
                .filter_map(|ch| {
                    ch.char().map(|c| Glyph {
                        c,
                        x: ch.origin().x - bounds.x0,
                    })
                })
                .collect();
            if glyphs.is_empty() {
                continue;
            }
            lines.push(TextLine {
                top: bbox.y0 - bounds.y0,
                bottom: bbox.y1 - bounds.y0,
                right: bbox.x1 - bounds.x0,
                glyphs,
            });
        }
    }
    Ok(lines)
}

fn pixmap_to_bitmap(pixmap: &Pixmap) -> Result<Bitmap, String> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(format!("unsupported pixmap format: {n} channels"));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        warn!("pixmap buffer {} too small for {width}x{height}", samples.len());
        return Err("pixmap buffer size mismatch".to_string());
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Bitmap::from_rgb(width as i32, height as i32, out)
        .ok_or_else(|| "pixmap size mismatch".to_string())
}

#[cfg(test)]
mod tests {
    use mupdf::pdf::PdfDocument;

    use super::*;

    fn blank_document(pages: usize) -> PdfDocument {
        let mut pdf = PdfDocument::new();
        for _ in 0..pages {
            pdf.new_page((600.0f32, 800.0f32)).unwrap();
        }
        pdf
    }

    fn apply(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
        (m.a * x + m.c * y + m.e, m.b * x + m.d * y + m.f)
    }

    #[test]
    fn raster_matrix_agrees_with_view_rotation() {
        let page = PageSize::new(600.0, 800.0);
        let r = Rectangle::new(100, 200, 60, 40);
        let crop = Rectangle::new(10, 20, 50, 50);

        for rotation in [
            Rotation::Deg0,
            Rotation::Deg90,
            Rotation::Deg180,
            Rotation::Deg270,
        ] {
            let m = raster_matrix((0.0, 0.0), (600.0, 800.0), 2.0, rotation, crop);
            let (x0, y0) = apply(&m, r.x as f32, r.y as f32);
            let (x1, y1) = apply(&m, r.right() as f32, r.bottom() as f32);

            let view = rotation.page_to_view(r, page);
            let expected = (
                (view.x * 2 - crop.x) as f32,
                (view.y * 2 - crop.y) as f32,
                (view.right() * 2 - crop.x) as f32,
                (view.bottom() * 2 - crop.y) as f32,
            );
            assert_eq!(
                (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)),
                expected,
                "{rotation:?}"
            );
        }
    }

    #[test]
    fn raster_matrix_moves_page_origin_to_zero() {
        let m = raster_matrix(
            (30.0, 40.0),
            (600.0, 800.0),
            1.0,
            Rotation::Deg0,
            Rectangle::new(0, 0, 10, 10),
        );
        assert_eq!(apply(&m, 30.0, 40.0), (0.0, 0.0));
    }

    #[test]
    fn render_returns_exactly_the_crop() {
        let pdf = blank_document(2);
        let engine = MupdfEngine::new();
        assert_eq!(engine.page_count(&pdf).unwrap(), 2);
        assert_eq!(engine.page_size(&pdf, 2).unwrap(), PageSize::new(600.0, 800.0));

        // A magnified corner: the whole page at this scale would be
        // 80000x60000 pixels.
        let request = RenderRequest {
            page: 2,
            scale: 100.0,
            rotation: Rotation::Deg90,
            crop: Rectangle::new(40_000, 30_000, 80, 60),
        };
        let bitmap = engine.render(&pdf, &request).unwrap();
        assert_eq!(bitmap.size(), Size::new(80, 60));
        assert_eq!(bitmap.pixel(0, 0), Some(WHITE));
        assert_eq!(bitmap.pixel(79, 59), Some(WHITE));
    }

    #[test]
    fn render_rejects_missing_page() {
        let pdf = blank_document(1);
        let request = RenderRequest {
            page: 2,
            scale: 1.0,
            rotation: Rotation::Deg0,
            crop: Rectangle::new(0, 0, 10, 10),
        };
        assert!(matches!(
            MupdfEngine::new().render(&pdf, &request),
            Err(EngineError::PageOutOfRange { page: 2, count: 1 })
        ));
    }

    #[test]
    fn blank_page_has_no_links_or_text() {
        let pdf = blank_document(1);
        let engine = MupdfEngine::new();
        assert!(engine.links(&pdf, 1).unwrap().is_empty());
        assert_eq!(
            engine.find_text(&pdf, 1, "anything", FindFlags::default()).unwrap(),
            None
        );
    }
}
