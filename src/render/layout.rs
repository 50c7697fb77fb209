//! Page layout
//!
//! Flows [`Block`]s top to bottom into fixed-size pages and produces
//! positioned drawing operations. Coordinates are PDF user space (origin at
//! the bottom-left corner, y grows upwards).

use super::blocks::{Block, BulletMarker};
use super::inline::{parse_inline, Emphasis, Span};
use super::styles::{Align, Color, Font, PageGeometry, StyleSheet, TextStyle};

/// Positioned drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
        line_width: f32,
    },
}

/// Drawing operations of one page, in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub ops: Vec<DrawOp>,
}

impl PageContent {
    /// Concatenated text of the page, one entry per text op
    pub fn text(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Lay out blocks into pages; always yields at least one page
pub fn layout_blocks(blocks: &[Block], styles: &StyleSheet, geometry: &PageGeometry) -> Vec<PageContent> {
    let mut layout = Layout::new(styles, geometry);
    for (index, block) in blocks.iter().enumerate() {
        layout.place(block, blocks.get(index + 1));
    }
    layout.finish()
}

// ============================================================================
// Line wrapping
// ============================================================================

/// Same-font stretch of text on one line
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub font: Font,
    pub text: String,
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<Run>,
    pub width: f32,
}

impl Line {
    fn push(&mut self, font: Font, text: &str, size: f32) {
        let width = font.text_width(text, size);
        self.width += width;
        match self.runs.last_mut() {
            Some(run) if run.font == font => {
                run.text.push_str(text);
                run.width += width;
            }
            _ => self.runs.push(Run {
                font,
                text: text.to_string(),
                width,
            }),
        }
    }

    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

fn span_font(base: Font, emphasis: Emphasis) -> Font {
    match emphasis {
        Emphasis::Regular => base,
        Emphasis::Bold => base.bold(),
        Emphasis::Italic => base.italic(),
        Emphasis::Code => Font::Courier,
    }
}

/// Greedy word wrap of styled spans into lines no wider than `max_width`
///
/// Words wider than a whole line are broken between characters.
pub fn wrap_spans(spans: &[Span], base: Font, size: f32, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();
    // Whitespace between words keeps the font of the span it came from
    let mut pending_space: Option<Font> = None;

    for span in spans {
        let font = span_font(base, span.emphasis);
        let mut rest = span.text.as_str();

        while !rest.is_empty() {
            let word_start = rest.len() - rest.trim_start().len();
            if word_start > 0 {
                pending_space = Some(font);
                rest = &rest[word_start..];
                continue;
            }

            let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let word = &rest[..word_end];
            rest = &rest[word_end..];

            let space = pending_space.take().filter(|_| !line.is_empty());
            let space_width = space.map(|f| f.text_width(" ", size)).unwrap_or(0.0);
            let needed = space_width + font.text_width(word, size);

            if !line.is_empty() && line.width + needed > max_width {
                lines.push(std::mem::take(&mut line));
            } else if let Some(space_font) = space {
                line.push(space_font, " ", size);
            }

            if font.text_width(word, size) <= max_width {
                line.push(font, word, size);
                continue;
            }

            for c in word.chars() {
                let mut buf = [0u8; 4];
                let piece = c.encode_utf8(&mut buf);
                if !line.is_empty() && line.width + font.text_width(piece, size) > max_width {
                    lines.push(std::mem::take(&mut line));
                }
                line.push(font, piece, size);
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Break a monospace line into chunks of at most `max_chars` characters
fn hard_wrap(line: &str, max_chars: usize) -> Vec<String> {
    let expanded = line.replace('\t', "    ");
    let chars: Vec<char> = expanded.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

// ============================================================================
// Layout engine
// ============================================================================

struct Layout<'a> {
    styles: &'a StyleSheet,
    geometry: &'a PageGeometry,
    pages: Vec<PageContent>,
    current: PageContent,
    /// Top of the free area on the current page
    cursor: f32,
}

impl<'a> Layout<'a> {
    fn new(styles: &'a StyleSheet, geometry: &'a PageGeometry) -> Self {
        Self {
            styles,
            geometry,
            pages: Vec::new(),
            current: PageContent::default(),
            cursor: geometry.top(),
        }
    }

    fn finish(mut self) -> Vec<PageContent> {
        self.pages.push(self.current);
        self.pages
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = self.geometry.top();
    }

    fn at_page_top(&self) -> bool {
        self.cursor >= self.geometry.top()
    }

    /// Start a new page unless `height` still fits
    ///
    /// A fresh page always accepts content, even if it overflows.
    fn ensure(&mut self, height: f32) {
        if self.cursor - height < self.geometry.bottom() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn space_before(&mut self, amount: f32) {
        if !self.at_page_top() {
            self.cursor -= amount;
        }
    }

    fn place(&mut self, block: &Block, next: Option<&Block>) {
        let styles = self.styles;
        match block {
            Block::Title(text) => self.text_block(text, &styles.title, 0.0),
            Block::Heading { level, text } => {
                // Keep a heading on the same page as the first line after it
                let keep = next.map(|_| styles.body.leading).unwrap_or(0.0);
                self.text_block(text, styles.heading(*level), keep);
            }
            Block::Paragraph(text) => self.text_block(text, &styles.body, 0.0),
            Block::Answer(text) => self.text_block(text, &styles.answer, 0.0),
            Block::Bullet { marker, depth, text } => self.bullet(*marker, *depth, text),
            Block::Code { lines, .. } => self.code_block(lines),
            Block::Table { rows } => self.table(rows),
        }
    }

    /// Draw one wrapped line whose line box starts at `top`
    fn draw_line(&mut self, line: &Line, x: f32, top: f32, style: &TextStyle) {
        let baseline = top - (style.leading + style.size) / 2.0 + style.size * 0.2;
        let mut x = x;
        for run in &line.runs {
            self.current.ops.push(DrawOp::Text {
                x,
                y: baseline,
                font: run.font,
                size: style.size,
                color: style.color,
                text: run.text.clone(),
            });
            x += run.width;
        }
    }

    fn text_block(&mut self, text: &str, style: &TextStyle, keep_with_next: f32) {
        let x = self.geometry.margin + style.indent;
        let width = self.geometry.content_width() - style.indent;
        let lines = wrap_spans(&parse_inline(text), style.font, style.size, width);
        if lines.is_empty() {
            return;
        }

        self.space_before(style.space_before);
        self.ensure(style.leading + keep_with_next);

        for line in &lines {
            self.ensure(style.leading);
            let line_x = match style.align {
                Align::Left => x,
                Align::Center => x + (width - line.width).max(0.0) / 2.0,
            };
            let top = self.cursor;
            self.draw_line(line, line_x, top, style);
            self.cursor -= style.leading;
        }

        self.cursor -= style.space_after;
    }

    fn bullet(&mut self, marker: BulletMarker, depth: u8, text: &str) {
        let style = self.styles.bullet;
        let marker_x = self.geometry.margin + style.indent + f32::from(depth) * self.styles.bullet_step;
        let (marker_text, gap) = match marker {
            BulletMarker::Dot => ("\u{2022}".to_string(), 12.0),
            BulletMarker::Number(n) => {
                let label = format!("{}.", n);
                let gap = style.font.text_width(&label, style.size) + 5.0;
                (label, gap.max(14.0))
            }
        };
        let text_x = marker_x + gap;
        let width = self.geometry.margin + self.geometry.content_width() - text_x;

        let mut lines = wrap_spans(&parse_inline(text), style.font, style.size, width);
        if lines.is_empty() {
            lines.push(Line::default());
        }

        self.space_before(style.space_before);
        for (index, line) in lines.iter().enumerate() {
            self.ensure(style.leading);
            let top = self.cursor;
            if index == 0 {
                let mut label = Line::default();
                label.push(style.font, &marker_text, style.size);
                self.draw_line(&label, marker_x, top, &style);
            }
            self.draw_line(line, text_x, top, &style);
            self.cursor -= style.leading;
        }
        self.cursor -= style.space_after;
    }

    fn code_block(&mut self, lines: &[String]) {
        let style = self.styles.code;
        let pad = self.styles.code_padding;
        let width = self.geometry.content_width();
        let char_width = Font::Courier.text_width("M", style.size);
        let max_chars = ((width - 2.0 * pad) / char_width).floor() as usize;

        let mut wrapped: Vec<String> = lines.iter().flat_map(|l| hard_wrap(l, max_chars)).collect();
        if wrapped.is_empty() {
            wrapped.push(String::new());
        }

        self.space_before(style.space_before);

        // Split across pages, each chunk with its own background box
        let mut index = 0;
        while index < wrapped.len() {
            let available = self.cursor - self.geometry.bottom() - 2.0 * pad;
            let mut fit = (available / style.leading).floor().max(0.0) as usize;
            if fit == 0 {
                if self.at_page_top() {
                    fit = 1;
                } else {
                    self.new_page();
                    continue;
                }
            }

            let end = (index + fit).min(wrapped.len());
            let height = (end - index) as f32 * style.leading + 2.0 * pad;
            self.current.ops.push(DrawOp::FillRect {
                x: self.geometry.margin,
                y: self.cursor - height,
                width,
                height,
                color: Color::CODE_BACKGROUND,
            });

            let mut top = self.cursor - pad;
            for text in &wrapped[index..end] {
                let mut line = Line::default();
                if !text.is_empty() {
                    line.push(Font::Courier, text, style.size);
                }
                self.draw_line(&line, self.geometry.margin + pad, top, &style);
                top -= style.leading;
            }

            self.cursor -= height;
            index = end;
            if index < wrapped.len() {
                self.new_page();
            }
        }

        self.cursor -= style.space_after;
    }

    fn table(&mut self, rows: &[Vec<String>]) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        let pad = self.styles.cell_padding;
        let column_width = self.geometry.content_width() / columns as f32;
        self.space_before(self.styles.table_header.space_before);

        for (row_index, row) in rows.iter().enumerate() {
            let style = if row_index == 0 {
                self.styles.table_header
            } else {
                self.styles.table_cell
            };

            let cells: Vec<Vec<Line>> = (0..columns)
                .map(|c| {
                    let text = row.get(c).map(String::as_str).unwrap_or("");
                    wrap_spans(&parse_inline(text), style.font, style.size, column_width - 2.0 * pad)
                })
                .collect();
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let height = line_count as f32 * style.leading + 2.0 * pad;

            self.ensure(height);
            let row_top = self.cursor;

            for (c, lines) in cells.iter().enumerate() {
                let x = self.geometry.margin + c as f32 * column_width;
                if row_index == 0 {
                    self.current.ops.push(DrawOp::FillRect {
                        x,
                        y: row_top - height,
                        width: column_width,
                        height,
                        color: Color::TABLE_HEADER,
                    });
                }
                self.current.ops.push(DrawOp::StrokeRect {
                    x,
                    y: row_top - height,
                    width: column_width,
                    height,
                    color: Color::GRID,
                    line_width: 0.5,
                });

                let mut top = row_top - pad;
                for line in lines {
                    let line_x = x + (column_width - line.width).max(0.0) / 2.0;
                    self.draw_line(line, line_x, top, &style);
                    top -= style.leading;
                }
            }

            self.cursor = row_top - height;
        }

        self.cursor -= self.styles.table_cell.space_after;
    }
}
