//! Argument binding: raw command-line tokens to typed call arguments.
//!
//! # Module Structure
//!
//! - `coerce`: text to value conversion per documented type
//! - `keywords`: option keyword table and keyword scanning
//!
//! Binding runs in four steps:
//! 1. Select the target export (the only one, or the one named by the first token)
//! 2. Bind required parameters positionally
//! 3. Scan the remaining text for option keywords
//! 4. Assemble required values, then option values, in documentation order

mod coerce;
mod keywords;

use std::collections::{BTreeMap, HashSet, VecDeque};

use modcli_common::{Documentation, ParameterTag};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{BoundInvocation, CliDescriptor, ExportBinding};

pub use coerce::get_value;

use coerce::{ValueType, coerce, to_boolean};
use keywords::{KeywordTable, Occurrence};

/// Bind `tokens` against the descriptor's exports.
pub fn bind(descriptor: &CliDescriptor, tokens: &[String]) -> Result<BoundInvocation> {
    let mut tokens: VecDeque<String> = tokens.iter().cloned().collect();
    let target = select_target(descriptor, &mut tokens)?;

    let empty = Documentation::default();
    let doc = target.documentation.as_ref().unwrap_or(&empty);
    let plan = ParameterPlan::new(&doc.tags);
    let table = KeywordTable::build(&plan.options);

    let required = bind_required(&plan.required, &mut tokens)?;
    for (tag, value) in plan.required.iter().zip(&required) {
        let Some(value) = value else { continue };
        let repr = display(value);
        if table.prefix_of(&repr).is_some() {
            return Err(Error::AmbiguousArguments {
                parameter: tag.name.clone(),
                value: repr,
            });
        }
    }

    let rest = Vec::from(tokens).join(" ");
    let occurrences = table.scan(&rest)?;
    let mut slots = plan.collect_options(&occurrences)?;

    let mut values = required;
    for slot in &plan.slots {
        values.push(slots.remove(slot));
    }
    while matches!(values.last(), Some(None)) {
        values.pop();
    }

    // An undefined required value is allowed while later values keep the list long enough
    if values.len() < plan.required.len() {
        let missing = plan
            .required
            .iter()
            .enumerate()
            .filter(|(idx, _)| !matches!(values.get(*idx), Some(Some(_))))
            .map(|(_, tag)| tag.name.clone())
            .collect();
        return Err(Error::MissingArguments(missing));
    }

    tracing::debug!("bound {} value(s) for `{}`", values.len(), target.name);
    Ok(BoundInvocation {
        command: target.name.clone(),
        values,
    })
}

fn select_target<'d>(
    descriptor: &'d CliDescriptor,
    tokens: &mut VecDeque<String>,
) -> Result<&'d ExportBinding> {
    if let [only] = descriptor.exports.as_slice() {
        return Ok(only);
    }
    let command = tokens.front().cloned().unwrap_or_default();
    let target = descriptor
        .get(&command)
        .ok_or_else(|| Error::UnknownCommand {
            command: command.clone(),
            available: descriptor.command_names(),
        })?;
    tokens.pop_front();
    Ok(target)
}

/// Bind required parameters from the front of `tokens`.
///
/// A single required parameter absorbs every token up to the first one that
/// starts with `-`, joined by spaces. Several required parameters take one
/// token each.
fn bind_required(
    required: &[&ParameterTag],
    tokens: &mut VecDeque<String>,
) -> Result<Vec<Option<Value>>> {
    if let [only] = required {
        let mut words = Vec::new();
        while tokens.front().is_some_and(|t| !t.starts_with('-')) {
            if let Some(word) = tokens.pop_front() {
                words.push(word);
            }
        }
        if words.is_empty() {
            return Ok(vec![None]);
        }
        return get_value(&words.join(" "), &only.type_name).map(|v| vec![Some(v)]);
    }

    required
        .iter()
        .map(|tag| {
            tokens
                .pop_front()
                .map(|token| get_value(&token, &tag.type_name))
                .transpose()
        })
        .collect()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How a documented parameter list maps onto positions and keywords.
struct ParameterPlan<'d> {
    /// Bound positionally, in documentation order.
    required: Vec<&'d ParameterTag>,
    /// Bound by keyword; indices match the keyword table.
    options: Vec<&'d ParameterTag>,
    /// Top-level option names, in the order they take after the required values.
    slots: Vec<String>,
}

impl<'d> ParameterPlan<'d> {
    fn new(tags: &'d [ParameterTag]) -> Self {
        // `opts` with documented `opts.x` children is filled from the children
        let containers: HashSet<&str> = tags
            .iter()
            .filter(|t| t.is_dotted())
            .map(|t| t.top_level_name())
            .collect();

        let mut required = Vec::new();
        let mut options = Vec::new();
        let mut slots: Vec<String> = Vec::new();

        for tag in tags {
            if !tag.optional && !tag.is_dotted() && !containers.contains(tag.name.as_str()) {
                required.push(tag);
                continue;
            }
            options.push(tag);
            let slot = tag.top_level_name();
            if !slots.iter().any(|s| s == slot) {
                slots.push(slot.to_string());
            }
        }

        Self {
            required,
            options,
            slots,
        }
    }

    /// Coerce every occurrence and fold it into its top-level slot.
    fn collect_options(&self, occurrences: &[Occurrence<'_>]) -> Result<BTreeMap<String, Value>> {
        let mut slots: BTreeMap<String, Value> = BTreeMap::new();

        for occurrence in occurrences {
            let tag = self.options[occurrence.option];
            tracing::trace!("`{}` sets `{}`", occurrence.keyword, tag.name);
            let value_type = ValueType::of(&tag.type_name);
            let value = if tag.is_boolean() {
                let flag = if occurrence.value.is_empty() {
                    true
                } else {
                    to_boolean(occurrence.value)?
                };
                Value::Bool(flag != occurrence.negated)
            } else {
                coerce(occurrence.value, &value_type)?
            };

            if tag.is_dotted() {
                let slot = slots
                    .entry(tag.top_level_name().to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                insert_path(slot, &tag.nested_path(), value, value_type.is_array());
            } else {
                merge_value(
                    slots.entry(tag.name.clone()).or_insert(Value::Null),
                    value,
                    value_type.is_array(),
                );
            }
        }

        Ok(slots)
    }
}

/// Write `value` at `path` inside `target`, creating objects along the way.
fn insert_path(target: &mut Value, path: &[&str], value: Value, accumulate: bool) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else { return };
    match path {
        [] => {}
        [leaf] => merge_value(
            map.entry(leaf.to_string()).or_insert(Value::Null),
            value,
            accumulate,
        ),
        [head, tail @ ..] => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            insert_path(child, tail, value, accumulate);
        }
    }
}

/// Arrays accumulate across repeated occurrences; everything else is replaced.
fn merge_value(slot: &mut Value, value: Value, accumulate: bool) {
    match (slot, value) {
        (Value::Array(existing), Value::Array(items)) if accumulate => existing.extend(items),
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn tag(name: &str, type_name: &str, optional: bool) -> ParameterTag {
        ParameterTag {
            name: name.to_string(),
            type_name: type_name.to_string(),
            optional,
            ..Default::default()
        }
    }

    fn export(name: &str, tags: Vec<ParameterTag>) -> ExportBinding {
        let mut binding = ExportBinding::new(name, "index.js", Some(0));
        binding.documentation = Some(Documentation {
            description: String::new(),
            tags,
        });
        binding
    }

    fn descriptor(exports: Vec<ExportBinding>) -> CliDescriptor {
        CliDescriptor::new(Path::new("index.js"), exports)
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_required_absorbs_every_word() {
        let d = descriptor(vec![export("say", vec![tag("text", "string", false)])]);
        let bound = bind(&d, &tokens(&["a", "b", "c"])).unwrap();
        assert_eq!(bound.command, "say");
        assert_eq!(bound.values, vec![Some(json!("a b c"))]);
    }

    #[test]
    fn single_export_ignores_command_name() {
        let d = descriptor(vec![export("say", vec![tag("text", "string", false)])]);
        let bound = bind(&d, &tokens(&["say", "hi"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!("say hi"))]);
    }

    #[test]
    fn first_token_selects_command() {
        let d = descriptor(vec![
            export("add", vec![tag("a", "number", false), tag("b", "number", false)]),
            export("neg", vec![tag("n", "number", false)]),
        ]);
        let bound = bind(&d, &tokens(&["add", "2", "3"])).unwrap();
        assert_eq!(bound.command, "add");
        assert_eq!(bound.values, vec![Some(json!(2)), Some(json!(3))]);

        let err = bind(&d, &tokens(&["mul", "2"])).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { command, .. } if command == "mul"));
    }

    #[test]
    fn boolean_option_forms() {
        let d = descriptor(vec![export(
            "run",
            vec![tag("target", "string", false), tag("verbose", "boolean", true)],
        )]);

        let bound = bind(&d, &tokens(&["x", "--no-verbose"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!("x")), Some(json!(false))]);

        let bound = bind(&d, &tokens(&["x", "--verbose"])).unwrap();
        assert_eq!(bound.values[1], Some(json!(true)));

        let bound = bind(&d, &tokens(&["x", "-v"])).unwrap();
        assert_eq!(bound.values[1], Some(json!(true)));

        let bound = bind(&d, &tokens(&["x"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!("x"))]);

        let bound = bind(&d, &tokens(&["x", "--verbose", "false"])).unwrap();
        assert_eq!(bound.values[1], Some(json!(false)));
    }

    #[test]
    fn array_options() {
        let d = descriptor(vec![export("tag", vec![tag("tags", "string[]", true)])]);
        let bound = bind(&d, &tokens(&["--tags", "a,b,c"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!(["a", "b", "c"]))]);

        let bound = bind(&d, &tokens(&["--tags", "a", "--tags", "b,c"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!(["a", "b", "c"]))]);

        let d = descriptor(vec![export("sum", vec![tag("tags", "number[]", true)])]);
        let bound = bind(&d, &tokens(&["--tags", "[1,2]"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!([1, 2]))]);
    }

    #[test]
    fn missing_required_arguments_are_named() {
        let d = descriptor(vec![export(
            "copy",
            vec![tag("src", "string", false), tag("dest", "string", false)],
        )]);
        let err = bind(&d, &[]).unwrap_err();
        match err {
            Error::MissingArguments(names) => assert_eq!(names, vec!["src", "dest"]),
            other => panic!("unexpected {:?}", other),
        }

        let err = bind(&d, &tokens(&["a.txt"])).unwrap_err();
        assert!(matches!(err, Error::MissingArguments(names) if names == vec!["dest"]));
    }

    #[test]
    fn undefined_required_value_before_options_is_kept() {
        let d = descriptor(vec![export(
            "say",
            vec![tag("text", "string", false), tag("loud", "boolean", true)],
        )]);
        let bound = bind(&d, &tokens(&["--loud"])).unwrap();
        assert_eq!(bound.values, vec![None, Some(json!(true))]);

        let bound = bind(&d, &tokens(&["--no-loud"])).unwrap();
        assert_eq!(bound.values, vec![None, Some(json!(false))]);

        let err = bind(&d, &[]).unwrap_err();
        assert!(matches!(err, Error::MissingArguments(names) if names == vec!["text"]));
    }

    #[test]
    fn unknown_leading_text() {
        let d = descriptor(vec![export("f", vec![tag("flag", "number", true)])]);
        let err = bind(&d, &tokens(&["bogus", "--flag", "1"])).unwrap_err();
        assert!(matches!(err, Error::UnknownArgument(text) if text == "bogus"));
    }

    #[test]
    fn flag_consumed_as_positional_is_ambiguous() {
        let d = descriptor(vec![export(
            "copy",
            vec![
                tag("src", "string", false),
                tag("dest", "string", false),
                tag("force", "boolean", true),
            ],
        )]);
        let err = bind(&d, &tokens(&["a.txt", "--force"])).unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousArguments { parameter, value } if parameter == "dest" && value == "--force"
        ));
    }

    #[test]
    fn dotted_options_build_nested_objects() {
        let d = descriptor(vec![export(
            "fetch",
            vec![
                tag("url", "string", false),
                tag("opts", "object", true),
                tag("opts.retries", "number", true),
                tag("opts.headers.accept", "string", true),
                tag("verbose", "boolean", true),
            ],
        )]);
        let bound = bind(
            &d,
            &tokens(&[
                "http://x",
                "--opts.retries",
                "3",
                "--opts.headers.accept",
                "json",
                "--verbose",
            ]),
        )
        .unwrap();
        assert_eq!(
            bound.values,
            vec![
                Some(json!("http://x")),
                Some(json!({"retries": 3, "headers": {"accept": "json"}})),
                Some(json!(true)),
            ]
        );
    }

    #[test]
    fn container_literal_merges_with_children() {
        let d = descriptor(vec![export(
            "f",
            vec![tag("opts", "object", true), tag("opts.retries", "number", true)],
        )]);
        let bound = bind(&d, &tokens(&["--opts", "{\"a\": 1}", "--opts.retries", "3"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!({"a": 1, "retries": 3}))]);
    }

    #[test]
    fn repeated_object_option_is_replaced() {
        let d = descriptor(vec![export("f", vec![tag("opts", "object", true)])]);
        let bound = bind(&d, &tokens(&["--opts", "{\"a\": 1}", "--opts", "{\"b\": 2}"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!({"b": 2}))]);
    }

    #[test]
    fn undocumented_parent_gets_a_slot() {
        let d = descriptor(vec![export(
            "f",
            vec![tag("cfg.depth", "number", true), tag("quiet", "boolean", true)],
        )]);
        let bound = bind(&d, &tokens(&["--cfg.depth", "2", "--quiet"])).unwrap();
        assert_eq!(
            bound.values,
            vec![Some(json!({"depth": 2})), Some(json!(true))]
        );
    }

    #[test]
    fn trailing_undefined_values_are_trimmed() {
        let d = descriptor(vec![export(
            "f",
            vec![
                tag("a", "number", true),
                tag("b", "number", true),
                tag("c", "number", true),
            ],
        )]);
        let bound = bind(&d, &tokens(&["--b", "2"])).unwrap();
        assert_eq!(bound.values, vec![None, Some(json!(2))]);

        let bound = bind(&d, &[]).unwrap();
        assert!(bound.values.is_empty());
    }

    #[test]
    fn documentation_order_wins_over_keyword_order() {
        let d = descriptor(vec![export(
            "f",
            vec![tag("first", "string", true), tag("second", "string", true)],
        )]);
        let bound = bind(&d, &tokens(&["--second", "2", "--first", "1"])).unwrap();
        assert_eq!(bound.values, vec![Some(json!("1")), Some(json!("2"))]);
    }

    #[test]
    fn coercion_errors_propagate() {
        let d = descriptor(vec![export("f", vec![tag("n", "number", false)])]);
        let err = bind(&d, &tokens(&["ten"])).unwrap_err();
        assert!(matches!(err, Error::InvalidNumber(text) if text == "ten"));
    }
}
