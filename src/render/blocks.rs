//! Block-level document model
//!
//! Generated study guides arrive as loosely structured text. [`parse_blocks`]
//! turns them into a flat list of [`Block`]s that the layout engine places
//! on pages.
//!
//! Two input dialects are understood:
//! - [`InputFormat::Markdown`]: headings, lists, fenced code, `$$` math,
//!   pipe tables, plus the plain-text rules below for everything else
//! - [`InputFormat::PlainText`]: blank-line separated paragraphs with the
//!   short-line heading heuristic

use serde::{Deserialize, Serialize};

/// Lines shorter than this many characters are treated as headings
pub const HEADING_MAX_CHARS: usize = 50;

/// Markup dialect of generated study guide text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    PlainText,
    #[default]
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletMarker {
    Dot,
    Number(u32),
}

/// Renderable block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading {
        level: u8,
        text: String,
    },
    Paragraph(String),
    Bullet {
        marker: BulletMarker,
        depth: u8,
        text: String,
    },
    Code {
        language: Option<String>,
        lines: Vec<String>,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
    Answer(String),
}

/// Short-line heading heuristic
///
/// A non-empty line is a heading when it is fully upper-case, ends with a
/// colon, or is shorter than [`HEADING_MAX_CHARS`] characters. The last rule
/// means nearly every short line is promoted, which is the established
/// behaviour for generated guides.
pub fn is_heading_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty()
        && (is_all_upper(line) || line.ends_with(':') || line.chars().count() < HEADING_MAX_CHARS)
}

/// True when the text has at least one cased character and no lowercase ones
fn is_all_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Parse generated text into blocks
pub fn parse_blocks(input: &str, format: InputFormat) -> Vec<Block> {
    let mut parser = BlockParser::new(format);
    for line in input.lines() {
        parser.push_line(line);
    }
    parser.finish()
}

// ============================================================================
// Parser
// ============================================================================

enum Fence {
    Code {
        marker: &'static str,
        language: Option<String>,
        lines: Vec<String>,
    },
    Math {
        lines: Vec<String>,
    },
}

struct BlockParser {
    format: InputFormat,
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    table: Vec<Vec<String>>,
    fence: Option<Fence>,
}

impl BlockParser {
    fn new(format: InputFormat) -> Self {
        Self {
            format,
            blocks: Vec::new(),
            paragraph: Vec::new(),
            table: Vec::new(),
            fence: None,
        }
    }

    fn push_line(&mut self, raw: &str) {
        let line = raw.trim_end();
        let trimmed = line.trim();

        if self.fence.is_some() {
            self.push_fenced(line, trimmed);
            return;
        }

        if self.format == InputFormat::Markdown && self.push_markdown(line, trimmed) {
            return;
        }

        if trimmed.is_empty() {
            self.flush_paragraph();
        } else if is_heading_line(trimmed) {
            self.flush_paragraph();
            self.blocks.push(Block::Heading {
                level: 2,
                text: trimmed.to_string(),
            });
        } else {
            self.paragraph.push(trimmed.to_string());
        }
    }

    fn push_fenced(&mut self, line: &str, trimmed: &str) {
        let closes = match &self.fence {
            Some(Fence::Code { marker, .. }) => trimmed.starts_with(marker) && trimmed.trim_start_matches(marker).is_empty(),
            Some(Fence::Math { .. }) => trimmed == "$$",
            None => false,
        };

        if closes {
            self.close_fence();
            return;
        }

        match &mut self.fence {
            Some(Fence::Code { lines, .. }) => lines.push(line.to_string()),
            Some(Fence::Math { lines }) => lines.push(trimmed.to_string()),
            None => {}
        }
    }

    /// Markdown-only constructs; returns true when the line was consumed
    fn push_markdown(&mut self, line: &str, trimmed: &str) -> bool {
        if !trimmed.starts_with('|') {
            self.flush_table();
        }

        for marker in ["```", "~~~"] {
            if let Some(rest) = trimmed.strip_prefix(marker) {
                self.flush_paragraph();
                let language = rest.trim();
                self.fence = Some(Fence::Code {
                    marker,
                    language: (!language.is_empty()).then(|| language.to_string()),
                    lines: Vec::new(),
                });
                return true;
            }
        }

        if trimmed == "$$" {
            self.flush_paragraph();
            self.fence = Some(Fence::Math { lines: Vec::new() });
            return true;
        }

        if trimmed.len() > 4 && trimmed.starts_with("$$") && trimmed.ends_with("$$") {
            self.flush_paragraph();
            self.blocks.push(Block::Code {
                language: Some("math".to_string()),
                lines: vec![trimmed[2..trimmed.len() - 2].trim().to_string()],
            });
            return true;
        }

        if trimmed.starts_with('|') {
            self.flush_paragraph();
            self.push_table_row(trimmed);
            return true;
        }

        if let Some((level, text)) = atx_heading(trimmed) {
            self.flush_paragraph();
            self.blocks.push(Block::Heading {
                level,
                text: text.to_string(),
            });
            return true;
        }

        if is_thematic_break(trimmed) {
            self.flush_paragraph();
            return true;
        }

        if let Some((marker, text)) = list_item(trimmed) {
            self.flush_paragraph();
            let indent = line.len() - line.trim_start().len();
            self.blocks.push(Block::Bullet {
                marker,
                depth: (indent / 2).min(3) as u8,
                text: text.to_string(),
            });
            return true;
        }

        false
    }

    fn push_table_row(&mut self, trimmed: &str) {
        let inner = trimmed.trim_start_matches('|');
        let inner = inner.strip_suffix('|').unwrap_or(inner);
        let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_string()).collect();

        let is_separator = cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':' | ' ')));
        if !is_separator {
            self.table.push(cells);
        }
    }

    fn close_fence(&mut self) {
        match self.fence.take() {
            Some(Fence::Code { language, lines, .. }) => {
                self.blocks.push(Block::Code { language, lines });
            }
            Some(Fence::Math { lines }) => {
                self.blocks.push(Block::Code {
                    language: Some("math".to_string()),
                    lines,
                });
            }
            None => {}
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = self.paragraph.join(" ");
        self.paragraph.clear();
        self.blocks.push(Block::Paragraph(text));
    }

    fn flush_table(&mut self) {
        if self.table.is_empty() {
            return;
        }
        let mut rows = std::mem::take(&mut self.table);
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(columns, String::new());
        }
        self.blocks.push(Block::Table { rows });
    }

    fn finish(mut self) -> Vec<Block> {
        // An unterminated fence keeps whatever it collected
        self.close_fence();
        self.flush_table();
        self.flush_paragraph();
        self.blocks
    }
}

fn atx_heading(trimmed: &str) -> Option<(u8, &str)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    if text.is_empty() {
        return None;
    }
    Some((level as u8, text))
}

fn is_thematic_break(trimmed: &str) -> bool {
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&m| compact.chars().all(|c| c == m))
}

fn list_item(trimmed: &str) -> Option<(BulletMarker, &str)> {
    for prefix in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return Some((BulletMarker::Dot, rest.trim()));
        }
    }

    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &trimmed[digits..];
    let text = rest
        .strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))?;
    let number = trimmed[..digits].parse().ok()?;
    Some((BulletMarker::Number(number), text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_heading_heuristic() {
        assert!(is_heading_line("CELL BIOLOGY"));
        assert!(is_heading_line("Key terms and definitions for the whole chapter:"));
        assert!(is_heading_line("Short line"));
        assert!(!is_heading_line(""));
        assert!(!is_heading_line("   "));
        assert!(!is_heading_line(
            "This sentence is comfortably longer than fifty characters in total."
        ));
        // Counted in characters, not bytes
        assert!(is_heading_line(&"é".repeat(49)));
    }

    #[test]
    fn test_is_all_upper() {
        assert!(is_all_upper("DNA REPLICATION 101"));
        assert!(!is_all_upper("123 456"));
        assert!(!is_all_upper("DNA replication"));
    }

    #[test]
    fn test_plain_text_paragraphs_join_lines() {
        let long_a = "The mitochondria is the membrane-bound organelle that produces";
        let long_b = "most of the chemical energy needed to power the cell's reactions.";
        let input = format!("Overview\n{long_a}\n{long_b}\n\nSummary:");

        let blocks = parse_blocks(&input, InputFormat::PlainText);

        assert_eq!(
            blocks,
            vec![
                heading(2, "Overview"),
                Block::Paragraph(format!("{long_a} {long_b}")),
                heading(2, "Summary:"),
            ]
        );
    }

    #[test]
    fn test_plain_text_ignores_markdown() {
        let input = "# Title that is actually a long line of text in plain mode here";
        let blocks = parse_blocks(input, InputFormat::PlainText);
        assert!(matches!(&blocks[0], Block::Paragraph(t) if t.starts_with('#')));
    }

    #[test]
    fn test_markdown_headings_and_lists() {
        let input = "## Key Concepts\n\n- first point of the list\n  - nested detail item\n1. numbered entry\n2) second entry";
        let blocks = parse_blocks(input, InputFormat::Markdown);

        assert_eq!(blocks[0], heading(2, "Key Concepts"));
        assert_eq!(
            blocks[1],
            Block::Bullet {
                marker: BulletMarker::Dot,
                depth: 0,
                text: "first point of the list".into()
            }
        );
        assert!(matches!(blocks[2], Block::Bullet { depth: 1, .. }));
        assert!(matches!(blocks[3], Block::Bullet { marker: BulletMarker::Number(1), .. }));
        assert!(matches!(blocks[4], Block::Bullet { marker: BulletMarker::Number(2), .. }));
    }

    #[test]
    fn test_bold_line_is_not_a_bullet() {
        let blocks = parse_blocks("**Photosynthesis:** converts light into chemical energy within chloroplasts.", InputFormat::Markdown);
        assert!(matches!(&blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_code_fence() {
        let input = "```python\ndef f(x):\n    return x * 2\n```\nafter";
        let blocks = parse_blocks(input, InputFormat::Markdown);

        assert_eq!(
            blocks[0],
            Block::Code {
                language: Some("python".into()),
                lines: vec!["def f(x):".into(), "    return x * 2".into()],
            }
        );
        assert_eq!(blocks[1], heading(2, "after"));
    }

    #[test]
    fn test_unterminated_fence_is_kept() {
        let blocks = parse_blocks("```\nlet x = 1;", InputFormat::Markdown);
        assert_eq!(
            blocks,
            vec![Block::Code {
                language: None,
                lines: vec!["let x = 1;".into()]
            }]
        );
    }

    #[test]
    fn test_math_blocks() {
        let blocks = parse_blocks("$$\nE = mc^2\n$$\n$$a^2 + b^2 = c^2$$", InputFormat::Markdown);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::Code { language: Some(l), lines } if l == "math" && lines[0] == "E = mc^2"));
        assert!(matches!(&blocks[1], Block::Code { lines, .. } if lines[0] == "a^2 + b^2 = c^2"));
    }

    #[test]
    fn test_pipe_table() {
        let input = "| Term | Meaning |\n|------|:-------:|\n| ATP | energy |\n| DNA |";
        let blocks = parse_blocks(input, InputFormat::Markdown);

        assert_eq!(
            blocks,
            vec![Block::Table {
                rows: vec![
                    vec!["Term".into(), "Meaning".into()],
                    vec!["ATP".into(), "energy".into()],
                    vec!["DNA".into(), String::new()],
                ]
            }]
        );
    }

    #[test]
    fn test_thematic_break_is_dropped() {
        let blocks = parse_blocks("---\n* * *", InputFormat::Markdown);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_atx_heading_rules() {
        assert_eq!(atx_heading("### Cells ###"), Some((3, "Cells")));
        assert_eq!(atx_heading("#hashtag"), None);
        assert_eq!(atx_heading("#######  too deep"), None);
        assert_eq!(atx_heading("#"), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_blocks("", InputFormat::Markdown).is_empty());
        assert!(parse_blocks("\n\n  \n", InputFormat::PlainText).is_empty());
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let input = "# Guide\n\nINTRO\nSome text that goes on for quite a while here.\n\n- a\n  - b\n\n| x | y |\n|---|---|\n| 1 | 2 |\n\n```\ncode\n```\n";
        for format in [InputFormat::Markdown, InputFormat::PlainText] {
            assert_eq!(parse_blocks(input, format), parse_blocks(input, format));
        }
    }
}
