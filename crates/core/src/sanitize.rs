//! Label HTML sanitization
//!
//! Text and arrow-label content arrives from a contenteditable-style
//! surface whose paste/rich-edit machinery can inject arbitrary markup.
//! Only a small allow-list survives: `<span>` carrying a `color` style, and
//! `<br>`. Scripts and styles are dropped with their contents; every other
//! element is flattened to its text. This runs on every edit path into the
//! store, not only on creation.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Sanitized label content: the allow-listed HTML plus its plain-text fallback
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanitizedLabel {
    pub html: String,
    pub text: String,
}

/// Sanitize label markup down to the allow-listed subset
pub fn sanitize_label_html(input: &str) -> SanitizedLabel {
    if input.is_empty() {
        return SanitizedLabel::default();
    }

    let dom = match parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut input.as_bytes())
    {
        Ok(dom) => dom,
        Err(_) => {
            // Unreadable input degrades to empty content, never an error.
            return SanitizedLabel::default();
        }
    };

    let mut out = SanitizedLabel::default();
    visit(&dom.document, &mut out);
    out
}

fn visit(node: &Handle, out: &mut SanitizedLabel) {
    match node.data {
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            out.text.push_str(&text);
            push_escaped(&mut out.html, &text);
        }
        NodeData::Element { ref name, ref attrs, .. } => match name.local.as_ref() {
            "script" | "style" | "head" | "title" => {
                // Dropped with their entire contents.
            }
            "br" => {
                out.html.push_str("<br>");
                out.text.push('\n');
            }
            "span" => {
                match allowed_color(attrs.borrow().as_slice()) {
                    Some(color) => {
                        out.html.push_str("<span style=\"color:");
                        push_escaped(&mut out.html, &color);
                        out.html.push_str("\">");
                        visit_children(node, out);
                        out.html.push_str("</span>");
                    }
                    // A span with no usable color contributes only its text.
                    None => visit_children(node, out),
                }
            }
            _ => visit_children(node, out),
        },
        _ => visit_children(node, out),
    }
}

fn visit_children(node: &Handle, out: &mut SanitizedLabel) {
    for child in node.children.borrow().iter() {
        visit(child, out);
    }
}

/// Extract the `color` declaration from a span's `style` attribute
///
/// All other attributes and style properties are discarded. The value is
/// accepted only if it looks like a literal color token.
fn allowed_color(attrs: &[html5ever::Attribute]) -> Option<String> {
    let style = attrs
        .iter()
        .find(|attr| attr.name.local.as_ref() == "style")
        .map(|attr| attr.value.to_string())?;

    for declaration in style.split(';') {
        let mut parts = declaration.splitn(2, ':');
        let property = parts.next()?.trim();
        let value = parts.next().map(str::trim).unwrap_or_default();

        if property.eq_ignore_ascii_case("color") && is_color_token(value) {
            return Some(value.to_ascii_lowercase());
        }
    }
    None
}

/// Literal color tokens only: hex, named colors, rgb()/rgba() tuples
fn is_color_token(value: &str) -> bool {
    if value.is_empty() || value.len() > 32 {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' '))
        && !value.to_ascii_lowercase().contains("url")
        && !value.to_ascii_lowercase().contains("expression")
}

fn push_escaped(html: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            _ => html.push(c),
        }
    }
}
