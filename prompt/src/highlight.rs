//! Prompt syntax highlighting.
//!
//! Renders prompt text as markup whose text content is exactly the input, so
//! caret offsets map one to one onto the rendered surface. Each line is a
//! `syntax-line` span; each comma-separated word is classified by shape.

use crate::error::ErrorContext;
use crate::library::{expand_piece, is_multi, reference_body, PieceSource};
use crate::paren::paren_check;
use crate::parr::SPLIT_TOKEN;
use sdprompt_core::utils::{escape_markup, trim_span};

pub const CLASS_LINE: &str = "syntax-line";
pub const CLASS_WORD: &str = "syntax-word";
pub const CLASS_BLANK: &str = "syntax-blank";
pub const CLASS_ERROR: &str = "syntax-error";
pub const CLASS_SPLIT: &str = "syntax-split";
pub const CLASS_WEAK: &str = "syntax-weak";
pub const CLASS_STRONG: &str = "syntax-strong";
pub const CLASS_WILDCARD: &str = "syntax-wildcard";
pub const CLASS_MULTI_WILDCARD: &str = "syntax-multi-wildcard";

/// Classes a trimmed word renders with.
pub fn classify(source: Option<&dyn PieceSource>, word: &str) -> Vec<&'static str> {
    let mut classes = Vec::new();
    if word == SPLIT_TOKEN {
        classes.push(CLASS_SPLIT);
    }
    if word.len() >= 2 && word.starts_with('[') && word.ends_with(']') {
        classes.push(CLASS_WEAK);
    }
    if word.len() >= 2 && word.starts_with('{') && word.ends_with('}') {
        classes.push(CLASS_STRONG);
    }
    if reference_body(word).is_some() {
        classes.push(classify_piece(source, word));
    }
    classes
}

fn classify_piece(source: Option<&dyn PieceSource>, word: &str) -> &'static str {
    let Some(source) = source else {
        return CLASS_ERROR;
    };
    match expand_piece(source, word, &ErrorContext::default()) {
        Ok(_) if is_multi(source, word) => CLASS_MULTI_WILDCARD,
        Ok(_) => CLASS_WILDCARD,
        Err(err) => {
            tracing::warn!(error = %err, "piece reference does not resolve");
            CLASS_ERROR
        }
    }
}

fn open_span(out: &mut String, classes: &[&str]) {
    out.push_str("<span class=\"");
    out.push_str(&classes.join(" "));
    out.push_str("\">");
}

fn push_escaped(out: &mut String, chars: &[char]) {
    let text: String = chars.iter().collect();
    out.push_str(&escape_markup(&text));
}

/// Render one comma-separated word starting at char offset `offset`.
fn render_word(
    out: &mut String,
    source: Option<&dyn PieceSource>,
    word: &[char],
    offset: usize,
    error_at: Option<usize>,
) {
    let Some((left, right)) = trim_span(word) else {
        if !word.is_empty() {
            open_span(out, &[CLASS_BLANK]);
            push_escaped(out, word);
            out.push_str("</span>");
        }
        return;
    };

    if let Some(pos) = error_at.filter(|&p| p >= offset && p < offset + word.len()) {
        let at = pos - offset;
        open_span(out, &[CLASS_WORD]);
        push_escaped(out, &word[..at]);
        open_span(out, &[CLASS_ERROR]);
        push_escaped(out, &word[at..at + 1]);
        out.push_str("</span>");
        push_escaped(out, &word[at + 1..]);
        out.push_str("</span>");
        return;
    }

    let trimmed: String = word[left..right].iter().collect();
    let classes = classify(source, &trimmed);
    push_escaped(out, &word[..left]);
    if classes.is_empty() {
        out.push_str(&escape_markup(&trimmed));
    } else {
        open_span(out, &classes);
        out.push_str(&escape_markup(&trimmed));
        out.push_str("</span>");
    }
    push_escaped(out, &word[right..]);
}

/// Highlight `text`. Pure in `text` and the library contents.
pub fn highlight_prompt(source: Option<&dyn PieceSource>, text: &str) -> String {
    let error_at = paren_check(text).position();
    let mut out = String::with_capacity(text.len() * 2);
    let mut offset = 0;

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
            offset += 1;
        }
        open_span(&mut out, &[CLASS_LINE]);
        let chars: Vec<char> = line.chars().collect();
        for (i, word) in chars.split(|&c| c == ',').enumerate() {
            if i > 0 {
                out.push(',');
                offset += 1;
            }
            render_word(&mut out, source, word, offset, error_at);
            offset += word.len();
        }
        out.push_str("</span>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Library, Piece};
    use sdprompt_core::Surface;

    fn library() -> Library {
        let mut lib = Library::new();
        lib.add_piece("hair", Piece::new("long", "long hair"));
        lib.add_piece("hair", Piece::multi("color", "red hair\nblue hair"));
        lib
    }

    fn render(text: &str) -> String {
        let lib = library();
        highlight_prompt(Some(&lib), text)
    }

    #[test]
    fn test_classes_by_shape() {
        let out = render("1girl, [soft], {bold}, |, <hair.long>, <hair.color>, <hair.nope>");
        assert!(out.starts_with("<span class=\"syntax-line\">1girl,"));
        assert!(out.contains("<span class=\"syntax-weak\">[soft]</span>"));
        assert!(out.contains("<span class=\"syntax-strong\">{bold}</span>"));
        assert!(out.contains("<span class=\"syntax-split\">|</span>"));
        assert!(out.contains("<span class=\"syntax-wildcard\">&lt;hair.long&gt;</span>"));
        assert!(out.contains("<span class=\"syntax-multi-wildcard\">&lt;hair.color&gt;</span>"));
        assert!(out.contains("<span class=\"syntax-error\">&lt;hair.nope&gt;</span>"));
    }

    #[test]
    fn test_unmatched_delimiter_marked() {
        let out = render("a, {b");
        assert_eq!(
            out,
            "<span class=\"syntax-line\">a,<span class=\"syntax-word\"> \
             <span class=\"syntax-error\">{</span>b</span></span>"
        );
    }

    #[test]
    fn test_text_content_is_preserved() {
        let text = "1girl, <hair.long>,  ,\n{x & \"y\"}, a<b\n\n:)";
        let surface = Surface::from_markup(&render(text));
        assert_eq!(surface.text(), text);
        assert_eq!(surface.len(), text.chars().count());
    }

    #[test]
    fn test_blank_words_kept() {
        let out = render("a,  ,b");
        assert!(out.contains("<span class=\"syntax-blank\">  </span>"));
    }

    #[test]
    fn test_without_library_pieces_are_errors() {
        let out = highlight_prompt(None, "<hair.long>");
        assert!(out.contains("syntax-error"));
    }

    #[test]
    fn test_error_offset_on_later_line() {
        let out = render("ok\nx, y)");
        assert!(out.contains("<span class=\"syntax-error\">)</span>"));
    }
}
