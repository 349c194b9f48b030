//! Documentation matching and JSDoc block parsing.
//!
//! Matching is positional: a declaration owns the comment that ends closest
//! before it starts, provided that comment is a `/** */` block. Nothing is attached to AST nodes; the comment stream
//! is searched by offset.

use std::sync::OnceLock;

use modcli_common::{Documentation, ParameterTag};
use regex::Regex;

use crate::config::DocsConfig;
use crate::syntax::CommentBlock;

fn regex_tag_head() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@([A-Za-z][\w-]*)\s*(.*)$").expect("valid regex literal"))
}

/// Find the documentation block for a declaration starting at `declaration_start`.
///
/// Any `//` or `/* */` comment in between hides an earlier doc block.
/// `comments` must be sorted by offset (the syntax provider guarantees it).
pub fn match_documentation(
    comments: &[CommentBlock],
    declaration_start: u32,
) -> Option<&CommentBlock> {
    let upto = comments.partition_point(|c| c.end <= declaration_start);
    comments[..upto].last().filter(|c| c.is_doc())
}

/// Parse a block with the default tag names.
pub fn parse_documentation(text: &str) -> Documentation {
    DocParser::default().parse(text)
}

/// JSDoc block parser.
#[derive(Debug, Clone)]
pub struct DocParser {
    param_tags: Vec<String>,
}

impl Default for DocParser {
    fn default() -> Self {
        Self::new(&DocsConfig::default())
    }
}

enum Section {
    Description,
    Param(usize),
    Ignored,
}

impl DocParser {
    pub fn new(config: &DocsConfig) -> Self {
        Self {
            param_tags: config.param_tags.clone(),
        }
    }

    pub fn parse(&self, text: &str) -> Documentation {
        let mut description: Vec<String> = Vec::new();
        // Raw tag text, accumulated with continuation lines
        let mut params: Vec<String> = Vec::new();
        let mut section = Section::Description;

        for line in block_lines(text) {
            if let Some(caps) = regex_tag_head().captures(line.trim()) {
                let tag = &caps[1];
                let rest = caps[2].to_string();
                section = if self.param_tags.iter().any(|t| t == tag) {
                    params.push(rest);
                    Section::Param(params.len() - 1)
                } else if tag == "description" || tag == "desc" {
                    description.push(rest);
                    Section::Description
                } else {
                    Section::Ignored
                };
                continue;
            }
            match section {
                Section::Description => description.push(line.to_string()),
                Section::Param(idx) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        params[idx].push(' ');
                        params[idx].push_str(trimmed);
                    }
                }
                Section::Ignored => {}
            }
        }

        Documentation {
            description: description.join("\n").trim().to_string(),
            tags: params.iter().filter_map(|raw| parse_param(raw)).collect(),
        }
    }
}

/// Strip `/**`, `*/` and the leading `*` gutter of every line.
fn block_lines(text: &str) -> Vec<&str> {
    let body = text.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect()
}

/// Parse `{type} [name=default] - description`.
fn parse_param(raw: &str) -> Option<ParameterTag> {
    let mut rest = raw.trim();

    let mut type_name = String::new();
    if rest.starts_with('{') {
        let close = matching_close(rest, '{', '}')?;
        type_name = rest[1..close].trim().to_string();
        rest = rest[close + 1..].trim_start();
    }

    let mut optional = false;
    // JSDoc `{number=}` marks an optional parameter too
    if let Some(stripped) = type_name.strip_suffix('=') {
        type_name = stripped.trim_end().to_string();
        optional = true;
    }

    let (name, default) = if rest.starts_with('[') {
        let close = matching_close(rest, '[', ']')?;
        let inner = &rest[1..close];
        rest = &rest[close + 1..];
        optional = true;
        match inner.split_once('=') {
            Some((name, default)) => {
                let default = default.trim();
                (
                    name.trim().to_string(),
                    (!default.is_empty()).then(|| default.to_string()),
                )
            }
            None => (inner.trim().to_string(), None),
        }
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = rest[..end].to_string();
        rest = &rest[end..];
        (name, None)
    };

    if name.is_empty() {
        return None;
    }

    let description = rest.trim();
    let description = description
        .strip_prefix('-')
        .map(str::trim_start)
        .unwrap_or(description);

    Some(ParameterTag {
        name,
        type_name,
        optional,
        default,
        description: description.to_string(),
    })
}

/// Byte index of the delimiter closing the one at index 0.
fn matching_close(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}
