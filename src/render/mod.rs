//! Document Rendering
//!
//! Turns generated study guides and quizzes into printable PDFs:
//!
//! 1. [`blocks`] parses text into a flat block list
//! 2. [`layout`] flows blocks into letter-sized pages
//! 3. [`pdf`] serializes the pages with lopdf
//!
//! Rendering is synchronous and CPU-bound; handlers call it through
//! `spawn_blocking`.

pub mod blocks;
pub mod inline;
pub mod layout;
pub mod pdf;
pub mod styles;

pub use blocks::{is_heading_line, parse_blocks, Block, BulletMarker, InputFormat};
pub use styles::{PageGeometry, StyleSheet};

use crate::artifacts::ArtifactKind;
use crate::generation::Quiz;

/// Upper bound on output size
pub const MAX_PAGES: usize = 2_000;

/// Rendering error types
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Document too long: {0} pages")]
    TooManyPages(usize),
}

/// Finished PDF ready for download
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// PDF renderer with fixed styles and page geometry
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    styles: StyleSheet,
    geometry: PageGeometry,
}

impl DocumentRenderer {
    /// Render a generated study guide
    pub fn render_study_guide(
        &self,
        content: &str,
        format: InputFormat,
        source_name: Option<&str>,
    ) -> Result<RenderedDocument, RenderError> {
        let kind = ArtifactKind::StudyGuide;
        let mut blocks = vec![Block::Title(document_title(kind, source_name))];
        blocks.extend(parse_blocks(content, format));
        self.finish(kind, source_name, &blocks)
    }

    /// Render a validated quiz with its answers
    pub fn render_quiz(&self, quiz: &Quiz, source_name: Option<&str>) -> Result<RenderedDocument, RenderError> {
        let kind = ArtifactKind::Quiz;
        let mut blocks = vec![Block::Title(document_title(kind, source_name))];
        blocks.extend(quiz_blocks(quiz));
        self.finish(kind, source_name, &blocks)
    }

    /// Lay out and serialize blocks, returning the bytes and page count
    pub fn render_blocks(&self, blocks: &[Block]) -> Result<(Vec<u8>, usize), RenderError> {
        let title = blocks
            .iter()
            .find_map(|b| match b {
                Block::Title(t) => Some(t.as_str()),
                _ => None,
            })
            .unwrap_or("Study Buddy");

        let pages = layout::layout_blocks(blocks, &self.styles, &self.geometry);
        if pages.len() > MAX_PAGES {
            return Err(RenderError::TooManyPages(pages.len()));
        }

        let bytes = pdf::write_pdf(&pages, title, &self.geometry)?;
        Ok((bytes, pages.len()))
    }

    fn finish(&self, kind: ArtifactKind, source_name: Option<&str>, blocks: &[Block]) -> Result<RenderedDocument, RenderError> {
        let (bytes, page_count) = self.render_blocks(blocks)?;
        let file_name = download_name(kind, source_name);

        tracing::debug!(kind = %kind, file_name = %file_name, page_count, bytes = bytes.len(), "Rendered PDF");

        Ok(RenderedDocument {
            file_name,
            bytes,
            page_count,
        })
    }
}

/// Blocks for a quiz: numbered questions, options and answer lines
pub fn quiz_blocks(quiz: &Quiz) -> Vec<Block> {
    let mut blocks = Vec::new();
    for (i, question) in quiz.questions().iter().enumerate() {
        blocks.push(Block::Heading {
            level: 3,
            text: format!("Question {}: {}", i + 1, question.question),
        });
        for (j, option) in question.options.iter().enumerate() {
            blocks.push(Block::Bullet {
                marker: BulletMarker::Number(j as u32 + 1),
                depth: 0,
                text: option.clone(),
            });
        }
        blocks.push(Block::Answer(format!("Answer: {}", question.answer)));
    }
    blocks
}

/// Title line, e.g. `Study Guide for biology.pdf`
pub fn document_title(kind: ArtifactKind, source_name: Option<&str>) -> String {
    format!("{} for {}", kind.label(), source_name.unwrap_or("Uploaded PDF"))
}

/// Download name, e.g. `quiz_biology.pdf`
pub fn download_name(kind: ArtifactKind, source_name: Option<&str>) -> String {
    let stem = source_name
        .map(|name| name.rsplit_once('.').map_or(name, |(stem, _)| stem))
        .filter(|stem| !stem.is_empty())
        .unwrap_or("document");
    format!("{}_{}.pdf", kind.as_str(), stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> Quiz {
        Quiz::parse(
            r#"[
                {"question": "What is 2 + 2?", "options": ["3", "4", "5", "6"], "answer": "4"},
                {"question": "Largest planet?", "options": ["Mars", "Venus", "Jupiter", "Earth"], "answer": "Jupiter"}
            ]"#,
        )
        .unwrap()
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(ArtifactKind::StudyGuide, Some("biology.pdf")), "study_guide_biology.pdf");
        assert_eq!(download_name(ArtifactKind::Quiz, Some("notes.v2.PDF")), "quiz_notes.v2.pdf");
        assert_eq!(download_name(ArtifactKind::Quiz, Some("README")), "quiz_README.pdf");
        assert_eq!(download_name(ArtifactKind::Quiz, None), "quiz_document.pdf");
        assert_eq!(download_name(ArtifactKind::Quiz, Some("")), "quiz_document.pdf");
    }

    #[test]
    fn test_document_title() {
        assert_eq!(
            document_title(ArtifactKind::StudyGuide, Some("cells.pdf")),
            "Study Guide for cells.pdf"
        );
        assert_eq!(document_title(ArtifactKind::Quiz, None), "Quiz for Uploaded PDF");
    }

    #[test]
    fn test_quiz_blocks() {
        let blocks = quiz_blocks(&sample_quiz());

        assert_eq!(blocks.len(), 12);
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 3,
                text: "Question 1: What is 2 + 2?".into()
            }
        );
        assert!(matches!(&blocks[2], Block::Bullet { marker: BulletMarker::Number(2), text, .. } if text == "4"));
        assert_eq!(blocks[5], Block::Answer("Answer: 4".into()));
    }

    #[test]
    fn test_render_study_guide() {
        let guide = "# Cells\n\nThe cell is the basic unit of life and every organism is made of one or more.\n\n- Nucleus\n- Mitochondria\n\n| Part | Role |\n|---|---|\n| Ribosome | Protein synthesis |\n\n```\nprint('hi')\n```";
        let doc = DocumentRenderer::default()
            .render_study_guide(guide, InputFormat::Markdown, Some("cells.pdf"))
            .unwrap();

        assert_eq!(doc.file_name, "study_guide_cells.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.page_count, 1);
        assert_eq!(page_count(&doc.bytes), 1);
    }

    #[test]
    fn test_render_long_plain_guide_paginates() {
        let paragraph = "This line is deliberately long so that it is treated as paragraph text by the heuristic.";
        let guide = vec![paragraph; 300].join("\n\n");
        let doc = DocumentRenderer::default()
            .render_study_guide(&guide, InputFormat::PlainText, None)
            .unwrap();

        assert!(doc.page_count > 1);
        assert_eq!(page_count(&doc.bytes), doc.page_count);
    }

    #[test]
    fn test_render_quiz() {
        let doc = DocumentRenderer::default()
            .render_quiz(&sample_quiz(), Some("math.pdf"))
            .unwrap();

        assert_eq!(doc.file_name, "quiz_math.pdf");
        assert!(!doc.bytes.is_empty());
        assert_eq!(page_count(&doc.bytes), 1);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let input = "INTRODUCTION\nSome text that continues for a while, long enough to be a paragraph.\n\n## Next";
        assert_eq!(
            parse_blocks(input, InputFormat::Markdown),
            parse_blocks(input, InputFormat::Markdown)
        );
    }
}
