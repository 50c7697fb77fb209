//! Inline markup: `**bold**`, `*italic*`, `` `code` ``, `$math$`, `[text](url)`
//!
//! Unmatched markers are kept as literal text. Nesting is not supported.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Regular,
    Bold,
    Italic,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub emphasis: Emphasis,
}

impl Span {
    fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            emphasis,
        }
    }
}

/// Split a line of text into styled spans
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if let Some((span, consumed)) = delimited(rest) {
            if !literal.is_empty() {
                push_span(&mut spans, Span::new(std::mem::take(&mut literal), Emphasis::Regular));
            }
            push_span(&mut spans, span);
            i += consumed;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        // Backslash escapes the next character
        if c == '\\' {
            if let Some(next) = rest[1..].chars().next() {
                if next.is_ascii_punctuation() {
                    literal.push(next);
                    i += 1 + next.len_utf8();
                    continue;
                }
            }
        }

        literal.push(c);
        i += c.len_utf8();
    }

    if !literal.is_empty() {
        push_span(&mut spans, Span::new(literal, Emphasis::Regular));
    }

    spans
}

/// Try to read a marked-up span at the start of `rest`
fn delimited(rest: &str) -> Option<(Span, usize)> {
    if let Some(inner) = rest.strip_prefix("**") {
        let end = inner.find("**")?;
        let body = &inner[..end];
        return valid_body(body).then(|| (Span::new(body, Emphasis::Bold), end + 4));
    }

    if let Some(inner) = rest.strip_prefix('`') {
        let end = inner.find('`')?;
        let body = &inner[..end];
        return (!body.is_empty()).then(|| (Span::new(body, Emphasis::Code), end + 2));
    }

    if let Some(inner) = rest.strip_prefix('$') {
        let end = inner.find('$')?;
        let body = &inner[..end];
        return valid_body(body).then(|| (Span::new(body, Emphasis::Code), end + 2));
    }

    if let Some(inner) = rest.strip_prefix('*') {
        let end = inner.find('*')?;
        let body = &inner[..end];
        return valid_body(body).then(|| (Span::new(body, Emphasis::Italic), end + 2));
    }

    if let Some(inner) = rest.strip_prefix('[') {
        let close = inner.find("](")?;
        let label = &inner[..close];
        let after = &inner[close + 2..];
        let url_end = after.find(')')?;
        return (!label.is_empty())
            .then(|| (Span::new(label, Emphasis::Regular), 1 + close + 2 + url_end + 1));
    }

    None
}

/// Markers must hug their content: `* not italic *`, `$5 and $` stay literal
fn valid_body(body: &str) -> bool {
    !body.is_empty() && !body.starts_with(char::is_whitespace) && !body.ends_with(char::is_whitespace)
}

/// Append, merging with the previous span when the emphasis matches
fn push_span(spans: &mut Vec<Span>, span: Span) {
    if let Some(last) = spans.last_mut() {
        if last.emphasis == span.emphasis {
            last.text.push_str(&span.text);
            return;
        }
    }
    spans.push(span);
}
