//! Locating directive blocks in raw template text.
//!
//! Directives live in line comments so templates stay valid in their host
//! format:
//!
//! ```text
//! // {% for port in cfg.ports %}
//! ...
//! // {% end for %}
//! # {% if cfg.replicas > 1 %}
//! ...
//! # {% end if %}
//! ```
//!
//! The comment lead may be `//`, `#` or `;`. Blocks of one kind pair up
//! positionally and may not nest.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Result, WheelhouseError};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?://|#|;)\s*\{%\s*(?:",
        r"(?P<end>end)\s*(?P<end_kind>for|if)",
        r"|for\s+(?P<var>\S+)\s+in\s+(?P<source>\S+)",
        r"|if\s+(?P<left>\S+)\s+(?P<op>\S+)\s+(?P<right>\S+)",
        r")\s*%\}"
    ))
    .unwrap()
});

/// The two block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Loop,
    Conditional,
}

impl DirectiveKind {
    /// The keyword used in the markers.
    pub fn keyword(self) -> &'static str {
        match self {
            DirectiveKind::Loop => "for",
            DirectiveKind::Conditional => "if",
        }
    }
}

/// Raw expression captured from a begin marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockHeader {
    Loop {
        var_name: String,
        source_path: String,
    },
    Conditional {
        left: String,
        operator: String,
        right: String,
    },
}

/// A matched begin/end pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBlock {
    /// Offset of the begin marker.
    pub start: usize,
    /// Offset just past the end marker.
    pub end: usize,
    /// Text between the markers.
    pub body: Range<usize>,
    /// 1-based line of the begin marker.
    pub line: usize,
    pub header: BlockHeader,
}

impl DirectiveBlock {
    /// The block body with surrounding whitespace removed.
    pub fn body_text<'a>(&self, text: &'a str) -> &'a str {
        text[self.body.clone()].trim()
    }
}

enum Marker {
    Begin(Range<usize>, BlockHeader),
    End(Range<usize>),
}

/// Find every block of `kind` in `text`, in source order.
///
/// # Errors
///
/// Returns `UnbalancedBlock` when begin and end counts differ, when an end
/// marker comes before its begin, or when two blocks overlap.
pub fn scan(text: &str, kind: DirectiveKind) -> Result<Vec<DirectiveBlock>> {
    let mut begins = Vec::new();
    let mut ends = Vec::new();

    for caps in MARKER.captures_iter(text) {
        match classify(&caps, kind) {
            Some(Marker::Begin(span, header)) => begins.push((span, header)),
            Some(Marker::End(span)) => ends.push(span),
            None => {}
        }
    }

    let unbalanced = |message: String| WheelhouseError::UnbalancedBlock {
        kind: kind.keyword().to_string(),
        message,
    };

    if begins.len() != ends.len() {
        return Err(unbalanced(format!(
            "found {} opening and {} closing markers",
            begins.len(),
            ends.len()
        )));
    }

    let mut blocks = Vec::with_capacity(begins.len());
    let mut previous_end = 0;

    for ((begin, header), end) in begins.into_iter().zip(ends) {
        let line = line_of(text, begin.start);
        if end.start < begin.end {
            return Err(unbalanced(format!(
                "closing marker on line {} comes before its opening marker on line {}",
                line_of(text, end.start),
                line
            )));
        }
        if begin.start < previous_end {
            return Err(unbalanced(format!(
                "block on line {} overlaps the previous block; nested blocks are not supported",
                line
            )));
        }
        previous_end = end.end;

        blocks.push(DirectiveBlock {
            start: begin.start,
            end: end.end,
            body: begin.end..end.start,
            line,
            header,
        });
    }

    Ok(blocks)
}

fn classify(caps: &Captures<'_>, kind: DirectiveKind) -> Option<Marker> {
    let whole = caps.get(0)?;
    let span = whole.start()..whole.end();

    if caps.name("end").is_some() {
        let end_kind = caps.name("end_kind")?.as_str();
        return (end_kind == kind.keyword()).then_some(Marker::End(span));
    }

    let header = match kind {
        DirectiveKind::Loop => BlockHeader::Loop {
            var_name: caps.name("var")?.as_str().to_string(),
            source_path: caps.name("source")?.as_str().to_string(),
        },
        DirectiveKind::Conditional => BlockHeader::Conditional {
            left: caps.name("left")?.as_str().to_string(),
            operator: caps.name("op")?.as_str().to_string(),
            right: caps.name("right")?.as_str().to_string(),
        },
    };

    Some(Marker::Begin(span, header))
}

/// 1-based line number of a byte offset.
pub fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Replace each block span with the text produced for it.
///
/// Text between blocks is copied through unchanged.
pub fn rewrite_blocks<F>(text: &str, blocks: &[DirectiveBlock], mut render: F) -> Result<String>
where
    F: FnMut(usize, &DirectiveBlock) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for (index, block) in blocks.iter().enumerate() {
        out.push_str(&text[cursor..block.start]);
        out.push_str(&render(index, block)?);
        cursor = block.end;
    }

    out.push_str(&text[cursor..]);
    Ok(out)
}
