//! The seam between the loader and the Markdown parser.
//!
//! The loader only cares about fenced code blocks; everything else in a
//! document is narrative for human readers. A [`MarkdownParser`] reduces a
//! document to its fenced blocks in document order, and [`CommonMark`] does so
//! with pulldown-cmark.

pub mod info;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// A fenced code block as it appears in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// The info string following the opening fence, if any.
    pub info: Option<String>,
    /// The literal text between the fences.
    pub content: String,
    /// Byte offset of the first content line within the source.
    pub content_start: usize,
}

impl FencedBlock {
    /// Returns the 1-based line number of the block's first content line.
    pub fn line(&self, source: &str) -> usize {
        line_number_at(source, self.content_start)
    }
}

/// Produces the fenced code blocks of a Markdown document.
pub trait MarkdownParser {
    /// Returns every fenced code block in `source`, in document order.
    ///
    /// Blocks nested inside containers (block quotes, list items) are
    /// included at the position they appear.
    fn fenced_blocks(&self, source: &str) -> Vec<FencedBlock>;
}

impl<P: MarkdownParser + ?Sized> MarkdownParser for &P {
    fn fenced_blocks(&self, source: &str) -> Vec<FencedBlock> {
        (**self).fenced_blocks(source)
    }
}

impl<P: MarkdownParser + ?Sized> MarkdownParser for Box<P> {
    fn fenced_blocks(&self, source: &str) -> Vec<FencedBlock> {
        (**self).fenced_blocks(source)
    }
}

/// The default parser, backed by pulldown-cmark.
#[derive(Debug, Clone, Copy)]
pub struct CommonMark {
    options: Options,
}

impl Default for CommonMark {
    fn default() -> Self {
        Self {
            options: Options::empty(),
        }
    }
}

impl CommonMark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given pulldown-cmark extensions (tables, footnotes, ...).
    ///
    /// Extensions only affect how the surrounding narrative is parsed, which
    /// can change what counts as a fenced block inside exotic containers.
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl MarkdownParser for CommonMark {
    fn fenced_blocks(&self, source: &str) -> Vec<FencedBlock> {
        let mut blocks = Vec::new();
        let mut current: Option<FencedBlock> = None;
        let mut seen_text = false;

        for (event, range) in Parser::new_ext(source, self.options).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    let info = info.trim();
                    current = Some(FencedBlock {
                        info: (!info.is_empty()).then(|| info.to_string()),
                        content: String::new(),
                        content_start: line_after(source, range.start),
                    });
                    seen_text = false;
                }
                Event::Text(text) => {
                    if let Some(block) = current.as_mut() {
                        if !seen_text {
                            block.content_start = range.start;
                            seen_text = true;
                        }
                        // pulldown-cmark leaves the `\r` of a CRLF line ending
                        // out of every text range.
                        if text.starts_with('\n') && ends_with_cr(&source[..range.start]) {
                            block.content.push('\r');
                        }
                        block.content.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    // Indented code blocks also end here, but never open one.
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                }
                _ => {}
            }
        }

        blocks
    }
}

/// Returns the 1-based line number containing the byte at `offset`.
pub fn line_number_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    1 + source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
}

fn ends_with_cr(prefix: &str) -> bool {
    prefix.as_bytes().last() == Some(&b'\r')
}

/// Returns the offset of the start of the line following the one containing
/// `offset`, or the end of the source.
fn line_after(source: &str, offset: usize) -> usize {
    match source[offset..].find('\n') {
        Some(newline) => offset + newline + 1,
        None => source.len(),
    }
}
