//! `${name}` placeholders in recorded attribute values.

use std::collections::HashMap;

enum Segment<'a> {
    Literal(&'a str),
    Name(&'a str),
}

/// Splits `text` into literal runs and placeholder names.
///
/// An unterminated `${` is part of the literal text.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push(Segment::Literal(&rest[..start]));
        out.push(Segment::Name(&rest[start + 2..start + 2 + len]));
        rest = &rest[start + 3 + len..];
    }
    out.push(Segment::Literal(rest));
    out
}

/// Replaces every `${name}` with its value in a single pass. Unknown names
/// are kept verbatim and inserted values are never expanded again.
pub fn substitute_params(text: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Literal(literal) => out.push_str(literal),
            Segment::Name(name) => match values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str("${");
                    out.push_str(name);
                    out.push('}');
                }
            },
        }
    }
    if out != text {
        log::trace!("substituted '{}' -> '{}'", text, out);
    }
    out
}

/// Names referenced by `${...}` tokens, in order of appearance.
pub fn placeholder_names(text: &str) -> Vec<&str> {
    segments(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Name(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}
