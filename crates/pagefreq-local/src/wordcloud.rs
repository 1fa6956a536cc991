//! Word-cloud rasterisation.
//!
//! Layout is fully deterministic: words are placed in rank order, each at the
//! first free spot along an Archimedean spiral from the canvas centre. Font size
//! is proportional to frequency. Collision checks use word bounding boxes
//! against a summed-area table of occupied pixels.

use crate::config::WordCloudConfig;
use ab_glyph::{point, Font, FontArc, FontVec, GlyphId, PxScale, ScaleFont};
use image::{ImageFormat, Rgb, RgbImage};
use pagefreq_core::{Error, RankedTopTable, Result};
use std::io::Cursor;
use std::path::Path;

const PALETTE: [[u8; 3]; 8] = [
    [31, 119, 180],
    [214, 39, 40],
    [44, 160, 44],
    [148, 103, 189],
    [255, 127, 14],
    [140, 86, 75],
    [23, 190, 207],
    [227, 119, 194],
];

/// Factor applied to a word's font size each time it fails to fit.
const SHRINK: f32 = 0.85;
/// Spiral step in radians.
const SPIRAL_STEP: f32 = 0.1;

pub fn load_font(path: &Path, index: u32) -> Result<FontArc> {
    let data = std::fs::read(path)
        .map_err(|e| Error::Font(format!("cannot read {}: {e}", path.display())))?;
    let font = FontVec::try_from_vec_and_index(data, index)
        .map_err(|e| Error::Font(format!("cannot parse {}: {e}", path.display())))?;
    Ok(FontArc::new(font))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub frequency: u64,
    pub font_size: f32,
    /// Top-left corner of the word's box, in pixels.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: [u8; 3],
}

impl PlacedWord {
    fn overlaps(&self, other: &PlacedWord) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct WordCloudImage {
    pub image: RgbImage,
    pub words: Vec<PlacedWord>,
}

impl WordCloudImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| Error::Render(format!("png encode: {e}")))?;
        Ok(buf)
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| Error::Render(format!("write {}: {e}", path.display())))
    }
}

/// Occupied-pixel bookkeeping with O(1) rectangle queries.
struct Occupancy {
    width: u32,
    height: u32,
    cells: Vec<bool>,
    sums: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let n = (width as usize) * (height as usize);
        let mut occ = Self {
            width,
            height,
            cells: vec![false; n],
            sums: Vec::new(),
        };
        occ.rebuild();
        occ
    }

    fn rebuild(&mut self) {
        let w = self.width as usize;
        let h = self.height as usize;
        let stride = w + 1;
        self.sums = vec![0; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0u32;
            for x in 0..w {
                row += u32::from(self.cells[y * w + x]);
                self.sums[(y + 1) * stride + x + 1] = self.sums[y * stride + x + 1] + row;
            }
        }
    }

    fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let stride = self.width as usize + 1;
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let total = self.sums[y1 * stride + x1] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0];
        total == 0
    }

    fn mark(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let stride = self.width as usize;
        for yy in y..y + h {
            let row = yy as usize * stride;
            for xx in x..x + w {
                self.cells[row + xx as usize] = true;
            }
        }
        self.rebuild();
    }
}

pub struct WordCloudRenderer {
    cfg: WordCloudConfig,
    font: FontArc,
}

impl WordCloudRenderer {
    pub fn new(cfg: WordCloudConfig, font: FontArc) -> Self {
        Self { cfg, font }
    }

    /// Load the configured font and build a renderer.
    pub fn from_config(cfg: WordCloudConfig) -> Result<Self> {
        let font = load_font(&cfg.font_path, cfg.font_index)?;
        Ok(Self::new(cfg, font))
    }

    pub fn config(&self) -> &WordCloudConfig {
        &self.cfg
    }

    /// A canvas of the configured size filled with the background colour.
    pub fn blank(cfg: &WordCloudConfig) -> RgbImage {
        RgbImage::from_pixel(cfg.width, cfg.height, Rgb(cfg.background))
    }

    /// (advance width, line height) of `text` at `px`.
    fn measure(&self, text: &str, px: f32) -> (f32, f32) {
        let scaled = self.font.as_scaled(PxScale::from(px));
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        (width, scaled.ascent() - scaled.descent())
    }

    fn initial_size(&self, frequency: u64, max_frequency: u64) -> f32 {
        let ratio = frequency as f32 / max_frequency.max(1) as f32;
        (self.cfg.max_font_size * ratio).max(self.cfg.min_font_size)
    }

    /// Sizes tried for one word: `start`, then shrinking by `SHRINK` while at least `min`.
    /// `min` is clamped to one pixel so the sequence always ends.
    fn size_steps(start: f32, min: f32) -> impl Iterator<Item = f32> {
        let min = min.max(1.0);
        let start = if start.is_finite() { start.max(min) } else { min };
        std::iter::successors(Some(start), move |s| Some(s * SHRINK).filter(|n| *n >= min))
    }

    /// Walk the spiral and return the first free top-left corner for a `w` x `h` box.
    fn find_spot(&self, occ: &Occupancy, w: u32, h: u32) -> Option<(u32, u32)> {
        let (cw, ch) = (self.cfg.width, self.cfg.height);
        if w > cw || h > ch {
            return None;
        }
        let cx = (cw - w) as f32 / 2.0;
        let cy = (ch - h) as f32 / 2.0;
        let aspect = cw as f32 / ch.max(1) as f32;
        let max_r = (cw as f32).hypot(ch as f32);
        let mut t = 0.0f32;
        loop {
            let r = t;
            if r > max_r {
                return None;
            }
            let x = (cx + r * aspect.sqrt() * t.cos()).round();
            let y = (cy + r / aspect.sqrt() * t.sin()).round();
            if x >= 0.0 && y >= 0.0 && x + w as f32 <= cw as f32 && y + h as f32 <= ch as f32 {
                let (x, y) = (x as u32, y as u32);
                if occ.is_free(x, y, w, h) {
                    return Some((x, y));
                }
            }
            t += SPIRAL_STEP;
        }
    }

    /// Positions and sizes for each word, largest first. Words that cannot fit even
    /// at `min_font_size` are left out. A word is never drawn larger than the one
    /// placed before it, so sizes follow the ranking.
    pub fn layout(&self, table: &RankedTopTable) -> Vec<PlacedWord> {
        let max = table.max_frequency();
        let margin = self.cfg.margin;
        let mut occ = Occupancy::new(self.cfg.width, self.cfg.height);
        let mut placed = Vec::with_capacity(table.len());
        let mut cap = f32::INFINITY;

        for entry in table {
            let start = self.initial_size(entry.frequency, max).min(cap);
            let mut fitted = false;
            for size in Self::size_steps(start, self.cfg.min_font_size) {
                let (tw, th) = self.measure(&entry.word, size);
                let w = tw.ceil() as u32 + 2 * margin;
                let h = th.ceil() as u32 + 2 * margin;
                if let Some((x, y)) = self.find_spot(&occ, w.max(1), h.max(1)) {
                    occ.mark(x, y, w.max(1), h.max(1));
                    placed.push(PlacedWord {
                        word: entry.word.clone(),
                        frequency: entry.frequency,
                        font_size: size,
                        x: x + margin,
                        y: y + margin,
                        width: tw.ceil() as u32,
                        height: th.ceil() as u32,
                        color: PALETTE[(entry.rank.saturating_sub(1)) % PALETTE.len()],
                    });
                    cap = size;
                    fitted = true;
                    break;
                }
            }
            if !fitted {
                tracing::debug!(word = %entry.word, "word does not fit; dropped from cloud");
            }
        }
        placed
    }

    fn draw_word(&self, img: &mut RgbImage, w: &PlacedWord) {
        let scale = PxScale::from(w.font_size);
        let scaled = self.font.as_scaled(scale);
        let baseline = w.y as f32 + scaled.ascent();
        let mut caret = w.x as f32;
        let mut prev: Option<GlyphId> = None;
        let (iw, ih) = (img.width() as i64, img.height() as i64);

        for c in w.word.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= iw || py >= ih {
                    return;
                }
                let a = coverage.clamp(0.0, 1.0);
                let dst = img.get_pixel_mut(px as u32, py as u32);
                for ch in 0..3 {
                    let blended = dst.0[ch] as f32 * (1.0 - a) + w.color[ch] as f32 * a;
                    dst.0[ch] = blended.round() as u8;
                }
            });
        }
    }

    /// Render the cloud. An empty table gives a blank canvas.
    pub fn render(&self, table: &RankedTopTable) -> WordCloudImage {
        let mut image = Self::blank(&self.cfg);
        if table.is_empty() {
            return WordCloudImage {
                image,
                words: Vec::new(),
            };
        }
        let words = self.layout(table);
        for w in &words {
            self.draw_word(&mut image, w);
        }
        tracing::debug!(
            placed = words.len(),
            requested = table.len(),
            width = self.cfg.width,
            height = self.cfg.height,
            "rendered word cloud"
        );
        WordCloudImage { image, words }
    }
}

/// Any box overlap in a layout. Used by tests and by callers validating layouts.
pub fn has_overlaps(words: &[PlacedWord]) -> bool {
    words
        .iter()
        .enumerate()
        .any(|(i, a)| words[i + 1..].iter().any(|b| a.overlaps(b)))
}
