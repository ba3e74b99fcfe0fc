use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use cake_cutter_core::{Layout, PieceMapping, Rect, Shape};
use image::{Rgba, RgbaImage};

/// Copy the `(sx, sy, w, h)` block of `src` into `canvas` at `(dx, dy)`.
///
/// Pixels falling outside either image are skipped.
#[allow(clippy::too_many_arguments)]
pub fn blit_rgba(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    sx: u32,
    sy: u32,
    w: u32,
    h: u32,
    dx: u32,
    dy: u32,
) {
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();
    for yy in 0..h {
        for xx in 0..w {
            let (ix, iy) = (sx + xx, sy + yy);
            let (ox, oy) = (dx + xx, dy + yy);
            if ix < sw && iy < sh && ox < cw && oy < ch {
                canvas.put_pixel(ox, oy, *src.get_pixel(ix, iy));
            }
        }
    }
}

/// Draw a 1px red outline along the inside of `r` (debug).
pub fn outline(canvas: &mut RgbaImage, r: Rect) {
    let red = Rgba([255, 0, 0, 255]);
    let (cw, ch) = canvas.dimensions();
    if r.width == 0 || r.height == 0 {
        return;
    }
    for x in r.left..r.right().min(cw) {
        for y in [r.top, r.bottom() - 1] {
            if y < ch {
                canvas.put_pixel(x, y, red);
            }
        }
    }
    for y in r.top..r.bottom().min(ch) {
        for x in [r.left, r.right() - 1] {
            if x < cw {
                canvas.put_pixel(x, y, red);
            }
        }
    }
}

/// Render one RGBA canvas per container from the decoded source images.
pub fn render_containers(
    layout: &Layout<String>,
    images: &HashMap<String, RgbaImage>,
    outlines: bool,
) -> anyhow::Result<Vec<RgbaImage>> {
    let Shape { width, height } = layout.container;
    let mut pages = Vec::with_capacity(layout.containers.len());
    for container in &layout.containers {
        let mut canvas = RgbaImage::new(width, height);
        for piece in &container.pieces {
            let src = images
                .get(piece.source_id())
                .with_context(|| format!("no image loaded for {}", piece.source_id()))?;
            let s = piece.source();
            let d = piece.destination();
            blit_rgba(src, &mut canvas, s.left, s.top, s.width, s.height, d.left, d.top);
            if outlines {
                outline(&mut canvas, d);
            }
        }
        pages.push(canvas);
    }
    Ok(pages)
}

/// Size of each source image, recovered from the extent of its mappings.
pub fn source_shapes(layout: &Layout<String>) -> BTreeMap<String, Shape> {
    let mut shapes: BTreeMap<String, Shape> = BTreeMap::new();
    for piece in layout.containers.iter().flat_map(|c| &c.pieces) {
        let s = piece.source();
        let e = shapes.entry(piece.source_id().clone()).or_default();
        e.width = e.width.max(s.right());
        e.height = e.height.max(s.bottom());
    }
    shapes
}

/// Part of a mapping kept when stitching: the padding margin is cut on every side that does
/// not touch the border of the source image. Returned as `(source, destination)`.
pub fn kept_region<I>(piece: &PieceMapping<I>, image: Shape) -> (Rect, Rect) {
    let s = piece.source();
    let d = piece.destination();
    let pad = piece.padding();
    let left = if s.left > 0 { pad.width } else { 0 };
    let top = if s.top > 0 { pad.height } else { 0 };
    let right = if s.right() < image.width { pad.width } else { 0 };
    let bottom = if s.bottom() < image.height { pad.height } else { 0 };
    let w = s.width.saturating_sub(left + right);
    let h = s.height.saturating_sub(top + bottom);
    (
        Rect::new(s.left + left, s.top + top, w, h),
        Rect::new(d.left + left, d.top + top, w, h),
    )
}

/// Rebuild every source image from rendered containers.
pub fn stitch(
    layout: &Layout<String>,
    containers: &[RgbaImage],
) -> anyhow::Result<BTreeMap<String, RgbaImage>> {
    anyhow::ensure!(
        containers.len() == layout.containers.len(),
        "layout has {} containers but {} images were given",
        layout.containers.len(),
        containers.len()
    );
    let shapes = source_shapes(layout);
    let mut out: BTreeMap<String, RgbaImage> = shapes
        .iter()
        .map(|(k, s)| (k.clone(), RgbaImage::new(s.width, s.height)))
        .collect();
    for (container, canvas) in layout.containers.iter().zip(containers) {
        for piece in &container.pieces {
            let key = piece.source_id();
            let (Some(shape), Some(target)) = (shapes.get(key), out.get_mut(key)) else {
                continue;
            };
            let (src, dst) = kept_region(piece, *shape);
            blit_rgba(canvas, target, dst.left, dst.top, dst.width, dst.height, src.left, src.top);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cake_cutter_core::{CutterConfig, arrange_layout};

    fn gradient(w: u32, h: u32, seed: u8) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 251) as u8, (y % 241) as u8, seed, 255])
        })
    }

    #[test]
    fn cut_then_stitch_restores_images() {
        let cfg = CutterConfig::builder().container(64, 48).padding(3, 5).build();
        let mut images = HashMap::new();
        images.insert("a".to_string(), gradient(150, 97, 1));
        images.insert("b".to_string(), gradient(40, 30, 2));
        images.insert("c".to_string(), gradient(65, 200, 3));
        let matrices: Vec<(String, Shape)> = images
            .iter()
            .map(|(k, v)| (k.clone(), Shape::new(v.width(), v.height())))
            .collect();
        let layout = arrange_layout(matrices, &cfg).unwrap();

        let pages = render_containers(&layout, &images, false).unwrap();
        assert!(pages.iter().all(|p| p.dimensions() == (64, 48)));

        let restored = stitch(&layout, &pages).unwrap();
        assert_eq!(restored.len(), 3);
        for (key, img) in &restored {
            assert_eq!(img, &images[key], "image {} differs", key);
        }
    }

    #[test]
    fn kept_region_trims_inner_sides_only() {
        let piece = PieceMapping::new(
            "m",
            cake_cutter_core::PieceKind::Full,
            Rect::new(0, 100, 120, 120),
            Rect::new(0, 0, 120, 120),
        )
        .unwrap()
        .with_padding(Shape::new(10, 10));
        let (src, dst) = kept_region(&piece, Shape::new(300, 220));
        assert_eq!(src, Rect::new(0, 110, 110, 110));
        assert_eq!(dst, Rect::new(0, 10, 110, 110));
    }

    #[test]
    fn stitch_rejects_wrong_container_count() {
        let cfg = CutterConfig::builder().container(32, 32).build();
        let layout =
            arrange_layout(vec![("x".to_string(), Shape::new(70, 70))], &cfg).unwrap();
        assert!(stitch(&layout, &[]).is_err());
    }
}
