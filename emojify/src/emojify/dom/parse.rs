//! Tolerant tokenizer for well-formed HTML fragments. It understands tags,
//! quoted and bare attributes, comments, void elements, raw-text elements and
//! a handful of character references. Anything unexpected is kept as text.

use super::{Document, NodeId};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "textarea")
}

struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

pub(super) fn parse_into(doc: &mut Document, root: NodeId, input: &str) {
    let mut open: Vec<NodeId> = vec![root];
    let mut text = String::new();
    let mut i = 0;

    while i < input.len() {
        let rest = &input[i..];
        let Some(lt) = rest.find('<') else {
            text.push_str(rest);
            break;
        };
        text.push_str(&rest[..lt]);
        i += lt;
        let rest = &input[i..];

        if rest.starts_with(COMMENT_START) {
            flush_text(doc, &open, &mut text);
            let body = &rest[COMMENT_START.len()..];
            let (comment, consumed) = match body.find(COMMENT_END) {
                Some(end) => (&body[..end], COMMENT_START.len() + end + COMMENT_END.len()),
                None => (body, rest.len()),
            };
            let node = doc.create_comment(comment);
            append(doc, &open, node);
            i += consumed;
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            let name_len = tag_name_len(after);
            if name_len > 0 {
                flush_text(doc, &open, &mut text);
                let name = after[..name_len].to_ascii_lowercase();
                close(doc, &mut open, &name);
                i += 2 + after.find('>').map_or(after.len(), |gt| gt + 1);
                continue;
            }
        }

        match parse_start_tag(rest) {
            Some((tag, consumed)) => {
                flush_text(doc, &open, &mut text);
                i += consumed;
                let el = doc.create_element(&tag.name);
                for (name, value) in &tag.attributes {
                    // freshly created element
                    let _ = doc.set_attribute(el, name, value.as_str());
                }
                append(doc, &open, el);

                if tag.self_closing || is_void_element(&tag.name) {
                    continue;
                }
                if is_raw_text_element(&tag.name) {
                    let close_tag = format!("</{}", tag.name);
                    let body = &input[i..];
                    let end = find_ascii_ci(body, &close_tag).unwrap_or(body.len());
                    if end > 0 {
                        let node = doc.create_text(&body[..end]);
                        let _ = doc.append_child(el, node);
                    }
                    i += end;
                    i += input[i..].find('>').map_or(input.len() - i, |gt| gt + 1);
                    continue;
                }
                open.push(el);
            }
            None => {
                // a bare `<`, as in `<3`
                text.push('<');
                i += 1;
            }
        }
    }

    flush_text(doc, &open, &mut text);
}

fn append(doc: &mut Document, open: &[NodeId], node: NodeId) {
    if let Some(&parent) = open.last() {
        // parents on the stack are always elements
        let _ = doc.append_child(parent, node);
    }
}

fn flush_text(doc: &mut Document, open: &[NodeId], text: &mut String) {
    if text.is_empty() {
        return;
    }
    let node = doc.create_text(decode_entities(text));
    append(doc, open, node);
    text.clear();
}

/// Pop open elements up to and including the innermost `name`. Unmatched end
/// tags are ignored, and the fragment root is never popped.
fn close(doc: &Document, open: &mut Vec<NodeId>, name: &str) {
    let found = open
        .iter()
        .skip(1)
        .rposition(|&id| doc.tag_name(id) == Some(name));
    if let Some(pos) = found {
        open.truncate(pos + 1);
    }
}

fn tag_name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return 0;
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
        .count()
}

fn parse_start_tag(rest: &str) -> Option<(StartTag, usize)> {
    let after = rest.strip_prefix('<')?;
    let name_len = tag_name_len(after);
    if name_len == 0 {
        return None;
    }
    let bytes = rest.as_bytes();
    let mut k = 1 + name_len;
    let mut tag = StartTag {
        name: after[..name_len].to_ascii_lowercase(),
        attributes: vec![],
        self_closing: false,
    };

    let is_name_char = |c: u8| !c.is_ascii_whitespace() && !matches!(c, b'>' | b'/' | b'=');

    loop {
        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        match bytes.get(k) {
            None => return None,
            Some(b'>') => return Some((tag, k + 1)),
            Some(b'/') => {
                if bytes.get(k + 1) == Some(&b'>') {
                    tag.self_closing = true;
                    return Some((tag, k + 2));
                }
                k += 1;
                continue;
            }
            Some(_) => {}
        }

        let name_start = k;
        while k < bytes.len() && is_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            k += 1;
            continue;
        }
        let name = rest[name_start..k].to_ascii_lowercase();

        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if bytes.get(k) != Some(&b'=') {
            tag.attributes.push((name, String::new()));
            continue;
        }
        k += 1;
        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
            k += 1;
        }

        let value = match bytes.get(k) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = k + 1;
                let end = rest[start..].find(quote as char)? + start;
                k = end + 1;
                &rest[start..end]
            }
            _ => {
                let start = k;
                while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                &rest[start..k]
            }
        };
        tag.attributes.push((name, decode_entities(value)));
    }
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Decode the named references the serializer emits plus numeric ones.
/// Unknown references are kept verbatim.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi + 1)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
