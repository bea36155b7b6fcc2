//! Body and attachment extraction from a parsed message's part tree.

use mail_parser::{Message, MessagePart, MimeHeaders, PartType};

/// How [`extract_content`] assembles per-part text.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Concatenate the parts of each kind into one string.
    pub join: bool,
    /// Separator used when joining.
    pub delimiter: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            join: true,
            delimiter: String::new(),
        }
    }
}

/// Text of one kind (plain or HTML), joined or kept per part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyText {
    Joined(String),
    Parts(Vec<String>),
}

impl BodyText {
    fn assemble(parts: Vec<String>, options: &ExtractOptions) -> Self {
        if options.join {
            BodyText::Joined(parts.join(&options.delimiter))
        } else {
            BodyText::Parts(parts)
        }
    }
}

/// Plain-text and HTML portions of a message, attachments excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub plain: BodyText,
    pub html: BodyText,
}

/// One file attachment: declared filename, transfer-decoded payload, size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
    pub size: usize,
}

/// Collect the plain and HTML bodies of a message.
///
/// Multipart messages are walked in document order, picking up every
/// `text/plain` and `text/html` leaf (charset-decoded by the parser, raw
/// bytes lossily when undeclared). A non-multipart message contributes its
/// single part to plain when it is `text/plain`, to HTML otherwise.
pub fn extract_content(msg: &Message<'_>, options: &ExtractOptions) -> Content {
    let mut plain = Vec::new();
    let mut html = Vec::new();

    if is_multipart(msg) {
        walk_parts(msg, &mut |part| {
            if is_text_kind(part, "plain") {
                plain.push(part_text(part));
            } else if is_text_kind(part, "html") {
                html.push(part_text(part));
            }
        });
    } else if let Some(part) = msg.parts.first() {
        if is_text_kind(part, "plain") {
            plain.push(part_text(part));
        } else {
            html.push(part_text(part));
        }
    }

    Content {
        plain: BodyText::assemble(plain, options),
        html: BodyText::assemble(html, options),
    }
}

/// Collect every part carrying a filename attribute, regardless of its
/// content type, in document order.
pub fn extract_attachments(msg: &Message<'_>) -> Vec<Attachment> {
    let mut attachments = Vec::new();
    walk_parts(msg, &mut |part| {
        if let Some(filename) = part.attachment_name() {
            let data = part.contents().to_vec();
            attachments.push(Attachment {
                filename: filename.to_string(),
                size: data.len(),
                data,
            });
        }
    });
    attachments
}

fn is_multipart(msg: &Message<'_>) -> bool {
    matches!(
        msg.parts.first().map(|p| &p.body),
        Some(PartType::Multipart(_))
    )
}

fn is_text_kind(part: &MessagePart<'_>, subtype: &str) -> bool {
    part.content_type().map_or(false, |ct| {
        ct.ctype().eq_ignore_ascii_case("text")
            && ct.subtype().map_or(false, |s| s.eq_ignore_ascii_case(subtype))
    })
}

fn part_text(part: &MessagePart<'_>) -> String {
    match &part.body {
        PartType::Text(text) | PartType::Html(text) => text.to_string(),
        _ => String::from_utf8_lossy(part.contents()).into_owned(),
    }
}

/// Visit every part of the message in document order, recursing into
/// multipart containers and embedded messages.
fn walk_parts<'x>(msg: &'x Message<'x>, visit: &mut dyn FnMut(&'x MessagePart<'x>)) {
    walk_from(msg, 0, visit);
}

fn walk_from<'x>(
    msg: &'x Message<'x>,
    part_id: usize,
    visit: &mut dyn FnMut(&'x MessagePart<'x>),
) {
    let part = match msg.parts.get(part_id) {
        Some(part) => part,
        None => return,
    };
    visit(part);
    match &part.body {
        PartType::Multipart(children) => {
            for &child in children {
                walk_from(msg, child, visit);
            }
        }
        PartType::Message(nested) => walk_parts(nested, visit),
        _ => {}
    }
}
