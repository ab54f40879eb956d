//! Raster surface for one panel render.

use std::io::Cursor;

use image::{ImageFormat, ImageReader, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, Paint, Path, Pixmap, PremultipliedColorU8, Stroke, Transform,
};

use crate::error::{ComicError, RenderStage};

/// Mutable drawing surface owned by a single render pass.
#[derive(Debug)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Creates a canvas holding a copy of `image`.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, ComicError> {
        let (width, height) = image.dimensions();
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ComicError::Decode(format!("degenerate canvas size {width}x{height}"))
        })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills `path` with `fill`, then strokes its outline.
    pub fn fill_and_stroke(&mut self, path: &Path, fill: Color, outline: Color, line_width: f32) {
        let mut paint = Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color(fill);
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);

        paint.set_color(outline);
        let stroke = Stroke {
            width: line_width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    /// Composites `color` over one pixel with the given 0-255 coverage.
    /// Coordinates outside the canvas are ignored.
    pub fn blend_coverage(&mut self, x: i32, y: i32, coverage: u8, color: ColorU8) {
        if coverage == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width() || y >= self.height() {
            return;
        }
        let idx = (y * self.width() + x) as usize;
        let Some(dst) = self.pixmap.pixels_mut().get_mut(idx) else {
            return;
        };

        let alpha = u32::from(coverage) * u32::from(color.alpha()) / 255;
        let inv = 255 - alpha;
        let mix = |src: u8, dst: u8| -> u8 {
            ((u32::from(src) * alpha + u32::from(dst) * inv + 127) / 255) as u8
        };
        let a = (alpha + (u32::from(dst.alpha()) * inv + 127) / 255).min(255) as u8;
        // premultiplied channels never exceed alpha
        let r = mix(color.red(), dst.red()).min(a);
        let g = mix(color.green(), dst.green()).min(a);
        let b = mix(color.blue(), dst.blue()).min(a);
        if let Some(blended) = PremultipliedColorU8::from_rgba(r, g, b, a) {
            *dst = blended;
        }
    }

    /// Straight-alpha copy of the current pixels.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, ComicError> {
        let mut data = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(self.width(), self.height(), data).ok_or_else(|| {
            ComicError::render(RenderStage::Encode, None, "pixel buffer size mismatch")
        })
    }

    /// Straight-alpha pixels, with every pixel left unpainted copied from
    /// `base` rather than demultiplied.
    ///
    /// Premultiplying is lossy for translucent pixels, so a plain
    /// [`Canvas::to_rgba_image`] would shift them even where nothing was drawn.
    pub fn to_rgba_image_over(&self, base: &RgbaImage) -> Result<RgbaImage, ComicError> {
        if base.dimensions() != (self.width(), self.height()) {
            return Err(ComicError::render(
                RenderStage::Encode,
                None,
                "base image size differs from canvas",
            ));
        }
        let mut out = base.clone();
        for (dst, pixel) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let [r, g, b, a] = dst.0;
            if ColorU8::from_rgba(r, g, b, a).premultiply() != *pixel {
                let c = pixel.demultiply();
                dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
            }
        }
        Ok(out)
    }
}

/// Decodes any supported raster format into straight RGBA.
///
/// Zero-sized images are rejected here so nothing downstream has to cope
/// with an empty canvas.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, ComicError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| ComicError::Decode(err.to_string()))?;
    if reader.format().is_none() {
        return Err(ComicError::Decode("unrecognised image format".to_string()));
    }
    let image = reader.decode()?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(ComicError::Decode(format!(
            "degenerate image size {}x{}",
            image.width(),
            image.height()
        )));
    }
    Ok(image)
}

/// Lossless PNG encoding of an RGBA image.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ComicError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|err| ComicError::render(RenderStage::Encode, None, err.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tiny_skia::PathBuilder;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode_image(&[]), Err(ComicError::Decode(_))));
        assert!(matches!(
            decode_image(b"definitely not a png"),
            Err(ComicError::Decode(_))
        ));
        // png signature followed by nothing useful
        assert!(matches!(
            decode_image(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]),
            Err(ComicError::Decode(_))
        ));
    }

    #[test]
    fn png_survives_decode() {
        let source = solid(8, 4, [10, 200, 30, 255]);
        let bytes = encode_png(&source).expect("encode");
        let decoded = decode_image(&bytes).expect("decode");
        assert_eq!(decoded, source);
    }

    #[test]
    fn opaque_pixels_unchanged_through_canvas() {
        let source = solid(5, 5, [120, 60, 250, 255]);
        let canvas = Canvas::from_rgba(&source).expect("canvas");
        assert_eq!(canvas.to_rgba_image().expect("rgba"), source);
    }

    #[test]
    fn translucent_pixels_survive_when_untouched() {
        let source = solid(4, 4, [100, 50, 25, 10]);
        let mut canvas = Canvas::from_rgba(&source).expect("canvas");
        // the lossy path shifts them
        assert_ne!(canvas.to_rgba_image().expect("rgba"), source);

        canvas.blend_coverage(2, 2, 255, ColorU8::from_rgba(0, 0, 0, 255));
        let out = canvas.to_rgba_image_over(&source).expect("rgba");
        assert_eq!(out.get_pixel(0, 0).0, [100, 50, 25, 10]);
        assert_eq!(out.get_pixel(3, 1).0, [100, 50, 25, 10]);
        assert_eq!(out.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn restoring_needs_matching_size() {
        let canvas = Canvas::from_rgba(&solid(4, 4, [0, 0, 0, 255])).expect("canvas");
        assert!(canvas.to_rgba_image_over(&solid(3, 4, [0, 0, 0, 255])).is_err());
    }

    #[test]
    fn blend_full_coverage_replaces_pixel() {
        let mut canvas = Canvas::from_rgba(&solid(3, 3, [255, 255, 255, 255])).expect("canvas");
        canvas.blend_coverage(1, 1, 255, ColorU8::from_rgba(0, 0, 0, 255));
        canvas.blend_coverage(-1, 7, 255, ColorU8::from_rgba(0, 0, 0, 255));
        let out = canvas.to_rgba_image().expect("rgba");
        assert_eq!(out.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn fill_and_stroke_paints_inside_path() {
        let mut canvas = Canvas::from_rgba(&solid(20, 20, [0, 0, 0, 255])).expect("canvas");
        let path = PathBuilder::from_rect(
            tiny_skia::Rect::from_xywh(4.0, 4.0, 12.0, 12.0).expect("rect"),
        );
        canvas.fill_and_stroke(&path, Color::WHITE, Color::BLACK, 2.0);
        let out = canvas.to_rgba_image().expect("rgba");
        assert_eq!(out.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }
}
