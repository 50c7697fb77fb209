//! Fonts, colors and paragraph styles
//!
//! Only the standard Type1 fonts are used, so nothing is embedded. Text
//! measurement uses the Adobe font metrics for the printable ASCII range.

/// Standard 14 fonts used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
}

impl Font {
    pub const ALL: [Font; 4] = [
        Font::Helvetica,
        Font::HelveticaBold,
        Font::HelveticaOblique,
        Font::Courier,
    ];

    /// Name in the page resource dictionary
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::HelveticaOblique => "F3",
            Font::Courier => "F4",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
            Font::Courier => "Courier",
        }
    }

    pub fn bold(self) -> Font {
        match self {
            Font::Courier => Font::Courier,
            _ => Font::HelveticaBold,
        }
    }

    /// Oblique variant; bold text stays bold
    pub fn italic(self) -> Font {
        match self {
            Font::Helvetica => Font::HelveticaOblique,
            other => other,
        }
    }

    /// Advance width of `c` in 1/1000 em
    pub fn char_width(self, c: char) -> u16 {
        if self == Font::Courier {
            return 600;
        }

        let table = match self {
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
            _ => &HELVETICA_WIDTHS,
        };

        match c {
            ' '..='~' => table[c as usize - 32],
            '\u{2022}' => 350,
            '\u{2013}' => 556,
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => 222,
            '\u{201C}' | '\u{201D}' => 333,
            '\u{2026}' => 1000,
            _ => 556,
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

// Helvetica, code points 32..=126
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

// Helvetica-Bold, code points 32..=126
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const DARK_BLUE: Color = Color::rgb(0.0, 0.0, 0.545);
    pub const DARK_GREEN: Color = Color::rgb(0.0, 0.392, 0.0);
    pub const CODE_BACKGROUND: Color = Color::rgb(0.94, 0.94, 0.94);
    pub const TABLE_HEADER: Color = Color::rgb(0.87, 0.89, 0.95);
    pub const GRID: Color = Color::rgb(0.55, 0.55, 0.55);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Paragraph style, all measurements in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
    pub color: Color,
    pub space_before: f32,
    pub space_after: f32,
    pub indent: f32,
    pub align: Align,
}

impl TextStyle {
    const fn new(font: Font, size: f32, leading: f32) -> Self {
        Self {
            font,
            size,
            leading,
            color: Color::BLACK,
            space_before: 0.0,
            space_after: 0.0,
            indent: 0.0,
            align: Align::Left,
        }
    }
}

/// Full set of styles used for study guides and quizzes
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub title: TextStyle,
    /// Heading levels 1..=3; deeper levels use level 3
    pub headings: [TextStyle; 3],
    pub body: TextStyle,
    pub bullet: TextStyle,
    /// Extra indent per list nesting level
    pub bullet_step: f32,
    pub code: TextStyle,
    pub code_padding: f32,
    pub answer: TextStyle,
    pub table_header: TextStyle,
    pub table_cell: TextStyle,
    pub cell_padding: f32,
}

impl StyleSheet {
    pub fn heading(&self, level: u8) -> &TextStyle {
        let index = usize::from(level.clamp(1, 3)) - 1;
        &self.headings[index]
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        let mut title = TextStyle::new(Font::HelveticaBold, 18.0, 22.0);
        title.align = Align::Center;
        title.space_after = 18.0;

        let mut h1 = TextStyle::new(Font::HelveticaBold, 16.0, 20.0);
        h1.color = Color::DARK_BLUE;
        h1.space_before = 10.0;
        h1.space_after = 10.0;

        let mut h2 = TextStyle::new(Font::HelveticaBold, 14.0, 18.0);
        h2.color = Color::DARK_BLUE;
        h2.space_before = 7.2;
        h2.space_after = 10.0;

        let mut h3 = TextStyle::new(Font::HelveticaBold, 12.0, 16.0);
        h3.color = Color::DARK_BLUE;
        h3.space_before = 7.2;
        h3.space_after = 6.0;

        let mut body = TextStyle::new(Font::Helvetica, 11.0, 14.0);
        body.space_after = 7.2;

        let mut bullet = TextStyle::new(Font::Helvetica, 11.0, 14.0);
        bullet.indent = 20.0;
        bullet.space_after = 2.0;

        let mut code = TextStyle::new(Font::Courier, 9.5, 12.0);
        code.space_before = 4.0;
        code.space_after = 8.0;

        let mut answer = TextStyle::new(Font::HelveticaBold, 11.0, 14.0);
        answer.color = Color::DARK_GREEN;
        answer.indent = 10.0;
        answer.space_before = 6.0;
        answer.space_after = 18.0;

        let mut table_header = TextStyle::new(Font::HelveticaBold, 10.0, 13.0);
        table_header.align = Align::Center;
        table_header.space_before = 4.0;

        let mut table_cell = TextStyle::new(Font::Helvetica, 10.0, 13.0);
        table_cell.align = Align::Center;
        table_cell.space_after = 10.0;

        Self {
            title,
            headings: [h1, h2, h3],
            body,
            bullet,
            bullet_step: 14.0,
            code,
            code_padding: 6.0,
            answer,
            table_header,
            table_cell,
            cell_padding: 4.0,
        }
    }
}

/// Page size and margins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US Letter with one-inch margins
    pub const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
        margin: 72.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn top(&self) -> f32 {
        self.height - self.margin
    }

    pub fn bottom(&self) -> f32 {
        self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::LETTER
    }
}
