//! A4 PDF rendering of a [`ReportDocument`].
//!
//! The layout is a simple top-down cursor: every block reserves its height
//! and moves the cursor down. Text uses the builtin Helvetica faces so no
//! font files are needed. The chart is rasterised to a temporary PNG that is
//! removed once its bytes are embedded.

use std::io::Cursor;
use std::path::Path;

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rect, Rgb,
};
use tracing::debug;

use crate::config::ReportSettings;
use crate::error::{Error, Result};
use crate::report::chart::{ChartRasterizer, PlottersRasterizer};
use crate::report::layout::{Block, ReportDocument, Table, Tile};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const CONTENT_TOP: f32 = PAGE_HEIGHT - 48.0;
const ROW_HEIGHT: f32 = 7.0;
const TILE_HEIGHT: f32 = 22.0;
const TILE_GAP: f32 = 4.0;
const MM_PER_POINT: f32 = 0.352_78;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

const ACCENT: (u8, u8, u8) = (255, 149, 0);
const INK: (u8, u8, u8) = (26, 26, 26);
const MUTED: (u8, u8, u8) = (110, 110, 110);
const PANEL: (u8, u8, u8) = (245, 245, 245);
const WHITE: (u8, u8, u8) = (255, 255, 255);

/// Turns a finished report into document bytes.
pub trait ReportRenderer {
    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>>;
}

/// printpdf-backed renderer.
#[derive(Debug, Clone)]
pub struct PdfRenderer<R = PlottersRasterizer> {
    rasterizer: R,
}

impl PdfRenderer<PlottersRasterizer> {
    /// Renderer whose chart size follows the report settings.
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            rasterizer: PlottersRasterizer {
                width: settings.chart_width,
                height: settings.chart_height,
            },
        }
    }
}

impl Default for PdfRenderer<PlottersRasterizer> {
    fn default() -> Self {
        Self {
            rasterizer: PlottersRasterizer::default(),
        }
    }
}

impl<R: ChartRasterizer> PdfRenderer<R> {
    pub fn with_rasterizer(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// Rasterise the chart through a temporary PNG and return its bytes.
    fn chart_png(&self, doc: &ReportDocument) -> Result<Vec<u8>> {
        let file = tempfile::Builder::new()
            .prefix("revcast-chart-")
            .suffix(".png")
            .tempfile()
            .map_err(Error::export)?;
        self.rasterizer.rasterize(&doc.chart, file.path())?;
        let bytes = std::fs::read(file.path()).map_err(Error::export)?;
        file.close().map_err(Error::export)?;
        Ok(bytes)
    }

    /// Render and write the PDF to `path`.
    pub fn write_pdf(&self, doc: &ReportDocument, path: &Path) -> Result<()> {
        let bytes = self.render(doc)?;
        std::fs::write(path, bytes).map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))
    }
}

impl<R: ChartRasterizer> ReportRenderer for PdfRenderer<R> {
    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>> {
        let png = self.chart_png(doc)?;
        debug!(bytes = png.len(), "chart rasterised");

        let (pdf, first_page, first_layer) =
            PdfDocument::new(&doc.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        let fonts = Fonts {
            regular: pdf
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(Error::export)?,
            bold: pdf
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(Error::export)?,
        };

        for (index, page) in doc.pages.iter().enumerate() {
            let (page_ref, layer_ref) = if index == 0 {
                (first_page, first_layer)
            } else {
                pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content")
            };
            let mut canvas = Canvas {
                layer: pdf.get_page(page_ref).get_layer(layer_ref),
                fonts: &fonts,
                y: CONTENT_TOP,
            };
            canvas.header(&doc.title, &doc.subtitle);
            for block in &page.blocks {
                canvas.block(block, &png)?;
            }
            canvas.footer(&doc.footer, index + 1, doc.pages.len());
        }

        pdf.save_to_bytes().map_err(Error::export)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// One page plus the vertical position of the next block, in mm from the
/// bottom edge.
struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    y: f32,
}

impl Canvas<'_> {
    fn header(&self, title: &str, subtitle: &str) {
        self.fill_rect(0.0, PAGE_HEIGHT - 6.0, PAGE_WIDTH, PAGE_HEIGHT, ACCENT);
        self.text(title, 26.0, MARGIN, PAGE_HEIGHT - 24.0, true, INK);
        self.text(subtitle, 12.0, MARGIN, PAGE_HEIGHT - 32.0, false, MUTED);
        self.rule(PAGE_HEIGHT - 38.0, ACCENT, 0.8);
    }

    fn footer(&self, footer: &str, page: usize, pages: usize) {
        self.rule(16.0, MUTED, 0.3);
        self.text(footer, 8.0, MARGIN, 10.0, false, MUTED);
        let marker = format!("Page {} of {}", page, pages);
        let width = text_width(&marker, 8.0);
        self.text(&marker, 8.0, PAGE_WIDTH - MARGIN - width, 10.0, false, MUTED);
    }

    fn block(&mut self, block: &Block, png: &[u8]) -> Result<()> {
        match block {
            Block::Section(title) => {
                self.y -= 6.0;
                self.text(&title.to_uppercase(), 11.0, MARGIN, self.y, true, INK);
                self.y -= 3.0;
                self.rule(self.y, PANEL, 0.4);
                self.y -= 6.0;
            }
            Block::Paragraph(text) => self.wrapped(text, 10.0, 5.0, INK),
            Block::Note(text) => self.wrapped(text, 8.5, 4.2, MUTED),
            Block::Tiles(tiles) => self.tiles(tiles),
            Block::Chart => self.chart(png)?,
            Block::Table(table) => self.table(table),
        }
        Ok(())
    }

    fn wrapped(&mut self, text: &str, size: f32, leading: f32, color: (u8, u8, u8)) {
        let chars = (CONTENT_WIDTH / (size * GLYPH_WIDTH * MM_PER_POINT)) as usize;
        for line in wrap(text, chars) {
            self.y -= leading;
            self.text(&line, size, MARGIN, self.y, false, color);
        }
        self.y -= leading;
    }

    fn tiles(&mut self, tiles: &[Tile]) {
        if tiles.is_empty() {
            return;
        }
        let count = tiles.len() as f32;
        let width = (CONTENT_WIDTH - TILE_GAP * (count - 1.0)) / count;
        let top = self.y;
        let bottom = top - TILE_HEIGHT;
        for (i, tile) in tiles.iter().enumerate() {
            let left = MARGIN + i as f32 * (width + TILE_GAP);
            self.fill_rect(left, bottom, left + width, top, PANEL);
            self.fill_rect(left, bottom, left + 1.2, top, ACCENT);
            self.text(&tile.label.to_uppercase(), 7.5, left + 4.0, top - 7.0, false, MUTED);
            self.text(&tile.value, 13.0, left + 4.0, bottom + 5.0, true, INK);
        }
        self.y = bottom - 4.0;
    }

    fn chart(&mut self, png: &[u8]) -> Result<()> {
        let decoder = PngDecoder::new(Cursor::new(png)).map_err(Error::export)?;
        let image = Image::try_from(decoder).map_err(Error::export)?;
        let px_width = image.image.width.0 as f32;
        let px_height = image.image.height.0 as f32;
        if px_width <= 0.0 {
            return Err(Error::Export("chart image has no width".into()));
        }
        let dpi = px_width * 25.4 / CONTENT_WIDTH;
        let height = px_height * 25.4 / dpi;
        let bottom = self.y - height;

        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y = bottom - 4.0;
        Ok(())
    }

    fn table(&mut self, table: &Table) {
        let columns = table.headers.len().max(1);
        let width = CONTENT_WIDTH / columns as f32;

        self.fill_rect(MARGIN, self.y - ROW_HEIGHT, MARGIN + CONTENT_WIDTH, self.y, INK);
        for (i, header) in table.headers.iter().enumerate() {
            let x = MARGIN + 3.0 + i as f32 * width;
            self.text(header, 9.0, x, self.y - 5.0, true, WHITE);
        }
        self.y -= ROW_HEIGHT;

        for (r, row) in table.rows.iter().enumerate() {
            if r % 2 == 1 {
                self.fill_rect(MARGIN, self.y - ROW_HEIGHT, MARGIN + CONTENT_WIDTH, self.y, PANEL);
            }
            for (i, cell) in row.iter().enumerate() {
                let x = MARGIN + 3.0 + i as f32 * width;
                self.text(cell, 9.0, x, self.y - 5.0, false, INK);
            }
            self.y -= ROW_HEIGHT;
        }
        self.y -= 4.0;
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool, color: (u8, u8, u8)) {
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn fill_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32, color: (u8, u8, u8)) {
        self.layer.set_fill_color(rgb(color));
        self.layer
            .add_rect(Rect::new(Mm(x0), Mm(y0), Mm(x1), Mm(y1)).with_mode(PaintMode::Fill));
    }

    fn rule(&self, y: f32, color: (u8, u8, u8), thickness: f32) {
        self.layer.set_outline_color(rgb(color));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        });
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

/// Estimated width in mm of `text` at `size` points.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH * MM_PER_POINT
}

/// Greedy word wrap to at most `width` characters per line. Words longer
/// than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Render `doc` with a renderer sized from `settings` and write it to `path`.
pub fn write_pdf(doc: &ReportDocument, settings: &ReportSettings, path: &Path) -> Result<()> {
    PdfRenderer::new(settings).write_pdf(doc, path)
}
