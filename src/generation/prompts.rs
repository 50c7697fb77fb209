//! Prompt templates

use crate::render::InputFormat;

pub fn study_guide_prompt(text: &str, format: InputFormat) -> String {
    let formatting = match format {
        InputFormat::Markdown => MARKDOWN_FORMATTING,
        InputFormat::PlainText => PLAIN_FORMATTING,
    };

    format!(
        "You are preparing a study reviewer for a college-level student.\n\
         \n\
         Source material:\n\
         ---\n\
         {text}\n\
         ---\n\
         \n\
         Cover the material as follows:\n\
         - Define every key term exactly as the source uses it.\n\
         - Explain the core principles and how they fit together.\n\
         - Give a short example for each important concept.\n\
         - Compare related concepts where it helps understanding.\n\
         - Include code or syntax examples when the topic is technical.\n\
         - Mention real-world applications briefly where relevant.\n\
         - Finish with a glossary of the key terms.\n\
         \n\
         {formatting}\n\
         \n\
         Keep the tone concise, friendly and academic. Start directly with the \
         reviewer content and do not add any closing remarks."
    )
}

const MARKDOWN_FORMATTING: &str = "Format the reviewer in Markdown: use #, ## and ### headings, \
    '-' bullet points for facts and definitions, pipe tables for comparisons, fenced code \
    blocks (```language) for code, and $...$ or $$...$$ only for mathematical notation.";

const PLAIN_FORMATTING: &str = "Format the reviewer as plain text without Markdown symbols. \
    Put each section heading on its own short line ending with a colon, and separate \
    paragraphs with a blank line.";

pub fn quiz_prompt(text: &str, num_questions: u32) -> String {
    format!(
        "Write a multiple-choice quiz with {num_questions} questions about the content below.\n\
         \n\
         Content:\n\
         ---\n\
         {text}\n\
         ---\n\
         \n\
         Reply with a JSON array only, in exactly this shape:\n\
         [\n  {{\n    \"question\": \"Question text\",\n    \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],\n    \"answer\": \"Option B\"\n  }}\n]\n\
         \n\
         Rules:\n\
         - Every question has exactly 4 options.\n\
         - \"answer\" repeats the correct option verbatim.\n\
         - Test the key concepts and vary the difficulty."
    )
}
