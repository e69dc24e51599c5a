//! PDF layout extraction using lopdf and pdf-extract.
//!
//! lopdf validates and decrypts the file; pdf-extract walks the page
//! content and reports every glyph and path to a [`LayoutCollector`], which
//! assembles words, text lines, and ruled tables.

use std::path::Path;

use pdf_extract::{
    ColorSpace, MediaBox, OutputDev, OutputError, Path as PdfPath, PathOp, Transform,
};
use tracing::{debug, trace};

use super::LayoutSource;
use crate::error::{PassbookError, PdfError, Result};
use crate::models::{Document, Page, PdfConfig, Table, Word};

/// PDF-backed layout source.
#[derive(Debug, Clone, Default)]
pub struct PdfLayoutSource {
    config: PdfConfig,
}

impl PdfLayoutSource {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Decode a PDF held in memory.
    pub fn load_bytes(&self, data: &[u8]) -> std::result::Result<Document, PdfError> {
        let mut doc =
            lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let bytes = if doc.is_encrypted() {
            let passwords = self
                .config
                .password
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(""));
            let mut opened = false;
            for password in passwords {
                if doc.decrypt(password).is_ok() {
                    opened = true;
                    break;
                }
            }
            if !opened {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            debug!("PDF has no pages");
            return Ok(Document::new(Vec::new()));
        }
        debug!("Loaded PDF with {} pages", page_count);

        let layout_doc = pdf_extract::Document::load_mem(&bytes)
            .map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut collector = LayoutCollector::new(&self.config);
        pdf_extract::output_doc(&layout_doc, &mut collector)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        Ok(collector.into_document())
    }
}

impl LayoutSource for PdfLayoutSource {
    fn open(&self, path: &Path) -> Result<Document> {
        let data = std::fs::read(path).map_err(|e| PassbookError::unreadable(path, e))?;
        self.load_bytes(&data)
            .map_err(|e| PassbookError::unreadable(path, e))
    }
}

/// A straight ruling segment in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Segment {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    fn is_horizontal(&self, tolerance: f32) -> bool {
        (self.y0 - self.y1).abs() <= tolerance && (self.x0 - self.x1).abs() > tolerance
    }

    fn is_vertical(&self, tolerance: f32) -> bool {
        (self.x0 - self.x1).abs() <= tolerance && (self.y0 - self.y1).abs() > tolerance
    }
}

/// Word being assembled from consecutive glyphs.
struct WordBuilder {
    text: String,
    left: f32,
    right: f32,
    baseline: f32,
    size: f32,
}

impl WordBuilder {
    fn finish(self) -> Word {
        Word::new(
            self.text,
            self.left,
            self.baseline - self.size,
            self.right,
            self.baseline,
        )
    }
}

#[derive(Default)]
struct PageLayout {
    words: Vec<Word>,
    segments: Vec<Segment>,
}

/// Receives glyphs and paths from pdf-extract.
struct LayoutCollector {
    detect_tables: bool,
    tolerance: f32,
    height: f64,
    current: Option<PageLayout>,
    word: Option<WordBuilder>,
    pages: Vec<Page>,
}

impl LayoutCollector {
    fn new(config: &PdfConfig) -> Self {
        Self {
            detect_tables: config.detect_ruled_tables,
            tolerance: config.ruling_tolerance,
            height: 0.0,
            current: None,
            word: None,
            pages: Vec::new(),
        }
    }

    fn flush_word(&mut self) {
        if let Some(word) = self.word.take() {
            if let Some(page) = self.current.as_mut() {
                page.words.push(word.finish());
            }
        }
    }

    fn add_path(&mut self, ctm: &Transform, path: &PdfPath) {
        let height = self.height;
        let to_page = |x: f64, y: f64| {
            let px = x * ctm.m11 + y * ctm.m21 + ctm.m31;
            let py = x * ctm.m12 + y * ctm.m22 + ctm.m32;
            (px as f32, (height - py) as f32)
        };

        let mut segments = Vec::new();
        let mut start: Option<(f32, f32)> = None;
        let mut last: Option<(f32, f32)> = None;
        for op in &path.ops {
            match *op {
                PathOp::MoveTo(x, y) => {
                    let p = to_page(x, y);
                    start = Some(p);
                    last = Some(p);
                }
                PathOp::LineTo(x, y) => {
                    let p = to_page(x, y);
                    if let Some(prev) = last {
                        segments.push(Segment::new(prev.0, prev.1, p.0, p.1));
                    }
                    last = Some(p);
                }
                PathOp::CurveTo(_, _, _, _, x, y) => last = Some(to_page(x, y)),
                PathOp::Rect(x, y, w, h) => {
                    let a = to_page(x, y);
                    let b = to_page(x + w, y + h);
                    segments.extend(rect_edges(a, b, self.tolerance));
                }
                PathOp::Close => {
                    if let (Some(prev), Some(first)) = (last, start) {
                        segments.push(Segment::new(prev.0, prev.1, first.0, first.1));
                    }
                    last = start;
                }
            }
        }

        if let Some(page) = self.current.as_mut() {
            page.segments.extend(segments);
        }
    }

    fn into_document(self) -> Document {
        Document::new(self.pages)
    }
}

/// Edges of a rectangle; a thin rectangle is a single ruling line.
fn rect_edges(a: (f32, f32), b: (f32, f32), tolerance: f32) -> Vec<Segment> {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
    if y1 - y0 <= tolerance {
        let y = (y0 + y1) / 2.0;
        return vec![Segment::new(x0, y, x1, y)];
    }
    if x1 - x0 <= tolerance {
        let x = (x0 + x1) / 2.0;
        return vec![Segment::new(x, y0, x, y1)];
    }
    vec![
        Segment::new(x0, y0, x1, y0),
        Segment::new(x0, y1, x1, y1),
        Segment::new(x0, y0, x0, y1),
        Segment::new(x1, y0, x1, y1),
    ]
}

impl OutputDev for LayoutCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.height = media_box.ury - media_box.lly;
        self.current = Some(PageLayout::default());
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_word();
        let layout = self.current.take().unwrap_or_default();
        let index = self.pages.len();

        let mut page = Page::from_text(index, text_lines(&layout.words));
        if self.detect_tables {
            if let Some(table) = build_ruled_table(&layout.segments, &layout.words, self.tolerance)
            {
                trace!("Page {}: ruled table {}x{}", index, table.rows.len(), table.num_cols());
                page = page.with_table(table);
            }
        }
        page = page.with_words(layout.words);

        debug!(
            "Page {}: {} words, {} tables",
            index,
            page.words.len(),
            page.tables.len()
        );
        self.pages.push(page);
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if char.trim().is_empty() {
            self.flush_word();
            return Ok(());
        }

        let scale_x = (trm.m11 * trm.m11 + trm.m12 * trm.m12).sqrt();
        let scale_y = (trm.m21 * trm.m21 + trm.m22 * trm.m22).sqrt();
        let x = trm.m31 as f32;
        let baseline = (self.height - trm.m32) as f32;
        let size = (font_size * scale_y) as f32;
        let advance = ((width * font_size + spacing) * scale_x) as f32;

        let gap = (size * 0.25).max(0.5);
        let breaks = match &self.word {
            Some(word) => (baseline - word.baseline).abs() > size * 0.5 || x > word.right + gap || x < word.left,
            None => false,
        };
        if breaks {
            self.flush_word();
        }

        match self.word.as_mut() {
            Some(word) => {
                word.text.push_str(char);
                word.right = word.right.max(x + advance);
            }
            None => {
                self.word = Some(WordBuilder {
                    text: char.to_string(),
                    left: x,
                    right: x + advance,
                    baseline,
                    size,
                });
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_word();
        Ok(())
    }

    fn stroke(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &PdfPath,
    ) -> std::result::Result<(), OutputError> {
        self.add_path(ctm, path);
        Ok(())
    }

    fn fill(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &PdfPath,
    ) -> std::result::Result<(), OutputError> {
        self.add_path(ctm, path);
        Ok(())
    }
}

/// Rebuild page text from word positions, one line per visual row.
pub fn text_lines(words: &[Word]) -> String {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| a.mid_y().total_cmp(&b.mid_y()).then(a.left().total_cmp(&b.left())));

    let mut lines: Vec<Vec<&Word>> = Vec::new();
    let mut anchor = f32::NEG_INFINITY;
    for word in sorted {
        let tolerance = (word.bottom() - word.top()).abs() / 2.0;
        match lines.last_mut() {
            Some(line) if (word.mid_y() - anchor).abs() <= tolerance => line.push(word),
            _ => {
                anchor = word.mid_y();
                lines.push(vec![word]);
            }
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.left().total_cmp(&b.left()));
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Merge nearly equal positions into their running average.
fn merge_positions(mut values: Vec<f32>, tolerance: f32) -> Vec<f32> {
    values.sort_by(f32::total_cmp);
    let mut merged: Vec<(f32, usize)> = Vec::new();
    for v in values {
        match merged.last_mut() {
            Some((mean, n)) if (v - *mean).abs() <= tolerance => {
                *mean = (*mean * *n as f32 + v) / (*n as f32 + 1.0);
                *n += 1;
            }
            _ => merged.push((v, 1)),
        }
    }
    merged.into_iter().map(|(mean, _)| mean).collect()
}

/// Build a grid table from horizontal and vertical rulings, filling each
/// cell with the words whose midpoint falls inside it.
///
/// Returns `None` unless there are at least two distinct lines each way.
pub fn build_ruled_table(segments: &[Segment], words: &[Word], tolerance: f32) -> Option<Table> {
    let xs = merge_positions(
        segments
            .iter()
            .filter(|s| s.is_vertical(tolerance))
            .map(|s| (s.x0 + s.x1) / 2.0)
            .collect(),
        tolerance,
    );
    let ys = merge_positions(
        segments
            .iter()
            .filter(|s| s.is_horizontal(tolerance))
            .map(|s| (s.y0 + s.y1) / 2.0)
            .collect(),
        tolerance,
    );
    if xs.len() < 2 || ys.len() < 2 {
        return None;
    }

    let mut cells: Vec<Vec<Vec<&Word>>> = vec![vec![Vec::new(); xs.len() - 1]; ys.len() - 1];
    for word in words {
        let (mx, my) = (word.mid_x(), word.mid_y());
        let col = xs.windows(2).position(|w| w[0] <= mx && mx < w[1]);
        let row = ys.windows(2).position(|w| w[0] <= my && my < w[1]);
        if let (Some(r), Some(c)) = (row, col) {
            cells[r][c].push(word);
        }
    }

    let rows: Vec<Vec<String>> = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|mut cell| {
                    cell.sort_by(|a, b| {
                        a.mid_y().total_cmp(&b.mid_y()).then(a.left().total_cmp(&b.left()))
                    });
                    cell.iter()
                        .map(|w| w.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect();

    if rows.iter().flatten().all(|c| c.is_empty()) {
        return None;
    }
    Some(Table::new(rows))
}
