//! Option keyword table and keyword scanning.
//!
//! Every optional parameter answers to `--name`, `-name` and `-n` (its first
//! character); booleans also to `--no-name` and `-no-name`. A keyword claimed
//! by more than one parameter is dropped, leaving only the unambiguous forms.

use std::collections::{BTreeMap, BTreeSet};

use modcli_common::ParameterTag;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Keyword {
    text: String,
    option: usize,
    negated: bool,
}

/// Keyword to option lookup, longest keywords first.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeywordTable {
    keywords: Vec<Keyword>,
}

/// One keyword found in the joined token text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence<'t> {
    /// Index into the option list the table was built from.
    pub option: usize,
    pub keyword: String,
    /// Set for the `--no-` forms.
    pub negated: bool,
    /// Text up to the next keyword, trimmed.
    pub value: &'t str,
}

impl KeywordTable {
    pub(crate) fn build(options: &[&ParameterTag]) -> Self {
        let mut claims: BTreeMap<String, BTreeSet<(usize, bool)>> = BTreeMap::new();

        for (idx, tag) in options.iter().enumerate() {
            let name = tag.name.as_str();
            let mut candidates = vec![(format!("--{name}"), false), (format!("-{name}"), false)];
            if let Some(first) = name.chars().next() {
                candidates.push((format!("-{first}"), false));
            }
            if tag.is_boolean() {
                candidates.push((format!("--no-{name}"), true));
                candidates.push((format!("-no-{name}"), true));
            }
            for (text, negated) in candidates {
                claims.entry(text).or_default().insert((idx, negated));
            }
        }

        let mut keywords: Vec<Keyword> = claims
            .into_iter()
            .filter_map(|(text, owners)| {
                let distinct: BTreeSet<usize> = owners.iter().map(|(idx, _)| *idx).collect();
                if distinct.len() != 1 {
                    tracing::debug!("dropping ambiguous keyword {}", text);
                    return None;
                }
                let (option, negated) = owners.into_iter().next()?;
                Some(Keyword {
                    text,
                    option,
                    negated,
                })
            })
            .collect();
        keywords.sort_by(|a, b| b.text.len().cmp(&a.text.len()).then_with(|| a.text.cmp(&b.text)));

        Self { keywords }
    }

    /// Keywords that survived de-duplication, longest first.
    pub(crate) fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.text.as_str())
    }

    /// The first keyword `text` starts with, if any.
    pub(crate) fn prefix_of(&self, text: &str) -> Option<&str> {
        self.keywords().find(|kw| text.starts_with(kw))
    }

    /// Longest keyword that matches at the start of `rest`.
    fn match_at(&self, rest: &str) -> Option<&Keyword> {
        self.keywords
            .iter()
            .find(|kw| rest.starts_with(kw.text.as_str()))
    }

    /// Split `text` into keyword occurrences and their raw values.
    ///
    /// Keywords only match at the start of the text or after whitespace. Any
    /// non-whitespace text before the first keyword is an unknown argument.
    pub(crate) fn scan<'t>(&self, text: &'t str) -> Result<Vec<Occurrence<'t>>> {
        // (keyword start, keyword end, keyword)
        let mut hits: Vec<(usize, usize, &Keyword)> = Vec::new();
        let mut at_boundary = true;
        let mut skip_until = 0usize;

        for (idx, ch) in text.char_indices() {
            if idx >= skip_until && at_boundary && !ch.is_whitespace() {
                if let Some(kw) = self.match_at(&text[idx..]) {
                    hits.push((idx, idx + kw.text.len(), kw));
                    skip_until = idx + kw.text.len();
                }
            }
            at_boundary = ch.is_whitespace();
        }

        let leading_end = hits.first().map(|(start, _, _)| *start).unwrap_or(text.len());
        let leading = text[..leading_end].trim();
        if !leading.is_empty() {
            return Err(Error::UnknownArgument(leading.to_string()));
        }

        let occurrences = hits
            .iter()
            .enumerate()
            .map(|(i, (_, end, kw))| {
                let next = hits.get(i + 1).map(|(start, _, _)| *start).unwrap_or(text.len());
                let raw = &text[*end..next];
                let raw = raw.strip_prefix('=').unwrap_or(raw);
                Occurrence {
                    option: kw.option,
                    keyword: kw.text.clone(),
                    negated: kw.negated,
                    value: raw.trim(),
                }
            })
            .collect();
        Ok(occurrences)
    }
}
