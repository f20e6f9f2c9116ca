//! PNG output for column and legend diagrams.

use super::glyphs::{self, GLYPH_GAP, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::domain::{Block, Diagram, DomainError, DomainResult, Pattern, Rgb};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Pixels per horizontal diagram unit (the column is one unit wide).
    pub column_width: u32,
    /// Pixels per meter of thickness.
    pub pixels_per_meter: f64,
    /// Distance between hatch lines, in pixels.
    pub hatch_spacing: u32,
    /// Integer magnification of the 5x7 label font.
    pub label_scale: u32,
    /// Largest image, in pixels, that will be allocated.
    pub max_pixels: u64,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            column_width: 160,
            pixels_per_meter: 40.0,
            hatch_spacing: 8,
            label_scale: 2,
            max_pixels: 64_000_000,
        }
    }
}

/// Pixel rectangle, rows counted from the top of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl PixelRect {
    fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

#[derive(Debug, Clone)]
pub struct PngRasterizer {
    settings: RasterSettings,
}

impl PngRasterizer {
    pub fn new(settings: RasterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    /// Encodes `diagram` as PNG. The image is cropped to the diagram extent.
    pub fn to_png(&self, diagram: &Diagram) -> DomainResult<Vec<u8>> {
        let image = self.rasterize(diagram)?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn rasterize(&self, diagram: &Diagram) -> DomainResult<RgbaImage> {
        let (width, height) = self.dimensions(diagram);
        if diagram.is_empty() || width == 0 || height == 0 {
            return Err(DomainError::NothingToExport);
        }
        if width as u64 * height as u64 > self.settings.max_pixels {
            return Err(DomainError::ImageTooLarge { width, height });
        }

        let mut image = RgbaImage::from_pixel(width, height, rgba(Rgb::WHITE));
        for block in &diagram.blocks {
            let rect = self.pixel_rect(block, width, height);
            if rect.is_empty() {
                continue;
            }
            self.paint_block(&mut image, block, rect);
        }
        Ok(image)
    }

    pub fn dimensions(&self, diagram: &Diagram) -> (u32, u32) {
        (
            scale(diagram.width, self.settings.column_width as f64),
            scale(diagram.height, self.settings.pixels_per_meter),
        )
    }

    fn pixel_rect(&self, block: &Block, width: u32, height: u32) -> PixelRect {
        let sx = self.settings.column_width as f64;
        let sy = self.settings.pixels_per_meter;
        let left = scale(block.x, sx).min(width);
        let right = scale(block.x + block.width, sx).min(width);
        let bottom = height - scale(block.y, sy).min(height);
        let top = height - scale(block.top(), sy).min(height);
        PixelRect { left, top, right, bottom }
    }

    fn paint_block(&self, image: &mut RgbaImage, block: &Block, rect: PixelRect) {
        let spacing = self.settings.hatch_spacing.max(1);
        let fill = rgba(block.fill);
        let ink = rgba(block.border);

        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                let on_border =
                    x == rect.left || x + 1 == rect.right || y == rect.top || y + 1 == rect.bottom;
                let hatched = block
                    .pattern
                    .is_some_and(|p| hatch(p, x - rect.left, y - rect.top, spacing));
                let colour = if on_border || hatched { ink } else { fill };
                image.put_pixel(x, y, colour);
            }
        }

        self.paint_label(image, block, rect);
    }

    fn paint_label(&self, image: &mut RgbaImage, block: &Block, rect: PixelRect) {
        let scale = self.settings.label_scale.max(1);
        let text_w = glyphs::text_width(&block.label, scale) as i64;
        let text_h = (GLYPH_HEIGHT * scale) as i64;
        let centre_x = (rect.left as i64 + rect.right as i64) / 2;
        let centre_y = (rect.top as i64 + rect.bottom as i64) / 2;
        let origin_x = centre_x - text_w / 2;
        let origin_y = centre_y - text_h / 2;
        let colour = if block.fill.luma() > 128 { Rgb::BLACK } else { Rgb::WHITE };

        for (i, c) in block.label.chars().enumerate() {
            let Some(bitmap) = glyphs::glyph(c) else {
                continue;
            };
            let glyph_x = origin_x + (i as i64) * ((GLYPH_WIDTH + GLYPH_GAP) * scale) as i64;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyphs::is_set(bitmap, col, row) {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let x = glyph_x + (col * scale + dx) as i64;
                            let y = origin_y + (row * scale + dy) as i64;
                            if x < 0 || y < 0 {
                                continue;
                            }
                            let (x, y) = (x as u32, y as u32);
                            if rect.contains(x, y) {
                                image.put_pixel(x, y, rgba(colour));
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Default for PngRasterizer {
    fn default() -> Self {
        Self::new(RasterSettings::default())
    }
}

fn scale(value: f64, factor: f64) -> u32 {
    let scaled = (value * factor).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn rgba(colour: Rgb) -> Rgba<u8> {
    Rgba([colour.r, colour.g, colour.b, 255])
}

/// Whether the block-local pixel (`x`, `y`) carries ink for `pattern`.
fn hatch(pattern: Pattern, x: u32, y: u32, spacing: u32) -> bool {
    let diagonal = (x + y) % spacing == 0;
    let back_diagonal = (x as i64 - y as i64).rem_euclid(spacing as i64) == 0;
    let mid = spacing / 2;
    match pattern {
        Pattern::Diagonal => diagonal,
        Pattern::BackDiagonal => back_diagonal,
        Pattern::Horizontal => y % spacing == mid,
        Pattern::Dots => x % spacing == mid && y % spacing == mid,
        Pattern::Cross => diagonal || back_diagonal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnRenderer, GrainSize, LayerFields, LayerStore, Lithology, legend};
    use image::GenericImageView;

    const SAND: Rgb = Rgb::new(0xd2, 0xb4, 0x8c);
    const SHALE: Rgb = Rgb::new(0x55, 0x66, 0x77);

    fn two_layer_diagram() -> Diagram {
        let mut store = LayerStore::new();
        for (lithology, color, thickness) in
            [(Lithology::Sandstone, SAND, 2.0), (Lithology::Shale, SHALE, 1.0)]
        {
            store.append(LayerFields {
                lithology,
                color,
                grain_size: GrainSize::Medium,
                thickness,
                fossils: String::new(),
                notes: String::new(),
            });
        }
        ColumnRenderer::default().render(store.layers())
    }

    #[test]
    fn test_dimensions_follow_total_thickness() {
        let rasterizer = PngRasterizer::default();
        let image = rasterizer.rasterize(&two_layer_diagram()).unwrap();
        assert_eq!(image.dimensions(), (160, 120));
    }

    #[test]
    fn test_blocks_land_in_stack_order() {
        let image = PngRasterizer::default().rasterize(&two_layer_diagram()).unwrap();

        // Shale is the newest layer, so it fills the bottom 40 rows.
        assert_eq!(*image.get_pixel(1, 81), rgba(SHALE));
        assert_eq!(*image.get_pixel(1, 2), rgba(SAND));
        // Borders.
        assert_eq!(*image.get_pixel(0, 0), rgba(Rgb::BLACK));
        assert_eq!(*image.get_pixel(1, 80), rgba(Rgb::BLACK));
        assert_eq!(*image.get_pixel(159, 119), rgba(Rgb::BLACK));
    }

    #[test]
    fn test_png_is_deterministic_and_decodable() {
        let rasterizer = PngRasterizer::default();
        let diagram = two_layer_diagram();
        let first = rasterizer.to_png(&diagram).unwrap();
        let second = rasterizer.to_png(&diagram).unwrap();
        assert_eq!(first, second);
        assert_eq!(&first[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&first).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (160, 120));
    }

    #[test]
    fn test_empty_diagram_has_nothing_to_export() {
        let empty = ColumnRenderer::default().render(&[]);
        let err = PngRasterizer::default().to_png(&empty).unwrap_err();
        assert!(matches!(err, DomainError::NothingToExport));
    }

    #[test]
    fn test_oversized_column_is_rejected_before_allocating() {
        let records = crate::infrastructure::CsvExporter::parse_csv(
            b"Lithology,Color,Grain Size,Thickness\nShale,#000000,Fine,1e9\n",
        )
        .unwrap();
        let mut store = LayerStore::new();
        store.bulk_append(records).unwrap();
        let diagram = ColumnRenderer::default().render(store.layers());

        let err = PngRasterizer::default().to_png(&diagram).unwrap_err();
        assert!(matches!(err, DomainError::ImageTooLarge { width: 160, .. }));
        assert_eq!(err.kind(), crate::domain::ErrorKind::Validation);
    }

    #[test]
    fn test_max_pixels_is_configurable() {
        let settings = RasterSettings { max_pixels: 160 * 119, ..RasterSettings::default() };
        let err = PngRasterizer::new(settings).rasterize(&two_layer_diagram()).unwrap_err();
        assert!(matches!(err, DomainError::ImageTooLarge { width: 160, height: 120 }));
    }

    #[test]
    fn test_label_is_drawn_inside_block() {
        let image = PngRasterizer::default().rasterize(&two_layer_diagram()).unwrap();
        // SHALE at scale 2 spans x 51..109 around the centre of rows 80..120.
        let label_ink = (51..109)
            .flat_map(|x| (93..107).map(move |y| (x, y)))
            .filter(|&(x, y)| *image.get_pixel(x, y) == rgba(Rgb::WHITE))
            .count();
        assert!(label_ink > 0);
    }

    #[test]
    fn test_legend_rasterizes_side_by_side() {
        let rasterizer = PngRasterizer::default();
        let image = rasterizer.rasterize(&legend(&Default::default())).unwrap();
        assert_eq!(image.dimensions(), (800, 40));
    }

    #[test]
    fn test_hatch_patterns() {
        assert!(hatch(Pattern::Diagonal, 3, 5, 8));
        assert!(!hatch(Pattern::Diagonal, 3, 4, 8));
        assert!(hatch(Pattern::BackDiagonal, 2, 10, 8));
        assert!(hatch(Pattern::Horizontal, 0, 4, 8));
        assert!(hatch(Pattern::Dots, 4, 12, 8));
        assert!(!hatch(Pattern::Dots, 4, 11, 8));
        assert!(hatch(Pattern::Cross, 8, 0, 8));
    }

    #[test]
    fn test_scale_clamps_negative_and_nan() {
        assert_eq!(scale(-1.0, 10.0), 0);
        assert_eq!(scale(f64::NAN, 10.0), 0);
        assert_eq!(scale(0.25, 10.0), 3);
    }
}
