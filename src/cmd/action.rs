/*!
Action selection.

The CLI exposes a flat set of action flags (`--list`, `--view`, ...). They
are folded into exactly one `Action`; zero or several flags is a usage
error rather than a silent pick. Required arguments are checked here too,
so no request is ever sent for an incomplete invocation.
*/

use clap::Args;
use serde_json::Value;
use std::fmt;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_INSPECT_LIMIT: usize = 10;

/// Errors caused by how the tool was invoked (exit code 2).
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("no action specified (use one of --list, --view, --inspect, --delete-all, --delete-chunk)")]
    NoAction,

    #[error("conflicting actions {}: choose exactly one", .0.join(", "))]
    ConflictingActions(Vec<&'static str>),

    #[error("Please specify --collection")]
    MissingCollection,

    #[error("Must specify {0} for targeted delete")]
    MissingChunkFilter(&'static str),

    #[error("--value '{value}' is not a valid {kind}")]
    InvalidValue { value: String, kind: ValueType },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// JSON type the `--value` match is sent as.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueType {
    String,
    Int,
    Bool,
}

impl ValueType {
    pub fn parse(self, raw: &str) -> Result<Value, UsageError> {
        let invalid = || UsageError::InvalidValue {
            value: raw.to_string(),
            kind: self,
        };
        match self {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid()),
            ValueType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
        })
    }
}

/// Action flags and their parameters, as parsed by clap.
#[derive(Args, Debug, Clone)]
pub struct ActionFlags {
    /// List all collections
    #[arg(long, help_heading = "Actions")]
    pub list: bool,

    /// Preview a collection grouped by document
    #[arg(long, help_heading = "Actions")]
    pub view: bool,

    /// Inspect full payload details
    #[arg(long, help_heading = "Actions")]
    pub inspect: bool,

    /// Delete ALL vectors in a collection
    #[arg(long = "delete-all", help_heading = "Actions")]
    pub delete_all: bool,

    /// Delete specific vectors by field/value
    #[arg(long = "delete-chunk", help_heading = "Actions")]
    pub delete_chunk: bool,

    /// Collection name
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Payload field to filter by (e.g. doc_id)
    #[arg(long = "chunk-field", value_name = "FIELD")]
    pub chunk_field: Option<String>,

    /// Value to match for deletion
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub value: Option<String>,

    /// JSON type of --value
    #[arg(long = "value-type", value_enum, default_value_t = ValueType::String)]
    pub value_type: ValueType,

    /// Scroll page size for --view
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Number of vectors shown by --inspect
    #[arg(long, default_value_t = DEFAULT_INSPECT_LIMIT)]
    pub limit: usize,

    /// Skip confirmation prompts
    #[arg(long)]
    pub yes: bool,
}

/// Exactly one thing to do per invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    List,
    View {
        collection: String,
        batch_size: usize,
    },
    Inspect {
        collection: String,
        limit: usize,
    },
    DeleteAll {
        collection: String,
        skip_confirm: bool,
    },
    DeleteChunk {
        collection: String,
        field: String,
        value: Value,
        skip_confirm: bool,
    },
}

impl ActionFlags {
    /// Flag names of every action that was requested.
    pub fn selected(&self) -> Vec<&'static str> {
        [
            (self.list, "--list"),
            (self.view, "--view"),
            (self.inspect, "--inspect"),
            (self.delete_all, "--delete-all"),
            (self.delete_chunk, "--delete-chunk"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }

    pub fn into_action(self) -> Result<Action, UsageError> {
        let selected = self.selected();
        match selected.as_slice() {
            [] => return Err(UsageError::NoAction),
            [_] => {}
            _ => return Err(UsageError::ConflictingActions(selected)),
        }

        if self.list {
            return Ok(Action::List);
        }

        let collection = non_empty(self.collection).ok_or(UsageError::MissingCollection)?;

        if self.view {
            Ok(Action::View {
                collection,
                batch_size: self.batch_size,
            })
        } else if self.inspect {
            Ok(Action::Inspect {
                collection,
                limit: self.limit,
            })
        } else if self.delete_all {
            Ok(Action::DeleteAll {
                collection,
                skip_confirm: self.yes,
            })
        } else {
            let (field, raw) = match (non_empty(self.chunk_field), non_empty(self.value)) {
                (Some(field), Some(raw)) => (field, raw),
                (None, Some(_)) => return Err(UsageError::MissingChunkFilter("--chunk-field")),
                (Some(_), None) => return Err(UsageError::MissingChunkFilter("--value")),
                (None, None) => {
                    return Err(UsageError::MissingChunkFilter(
                        "both --chunk-field and --value",
                    ));
                }
            };
            Ok(Action::DeleteChunk {
                collection,
                field,
                value: self.value_type.parse(&raw)?,
                skip_confirm: self.yes,
            })
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        actions: ActionFlags,
    }

    fn parse(args: &[&str]) -> Result<Action, UsageError> {
        let argv = std::iter::once("t").chain(args.iter().copied());
        TestCli::try_parse_from(argv).unwrap().actions.into_action()
    }

    #[test]
    fn defaults_apply() {
        assert_eq!(
            parse(&["--view", "--collection", "docs"]).unwrap(),
            Action::View {
                collection: "docs".into(),
                batch_size: 100
            }
        );
        assert_eq!(
            parse(&["--inspect", "--collection", "docs"]).unwrap(),
            Action::Inspect {
                collection: "docs".into(),
                limit: 10
            }
        );
    }

    #[test]
    fn no_action_is_rejected() {
        assert!(matches!(parse(&[]), Err(UsageError::NoAction)));
        assert!(matches!(
            parse(&["--collection", "docs"]),
            Err(UsageError::NoAction)
        ));
    }

    #[test]
    fn multiple_actions_are_rejected() {
        match parse(&["--list", "--delete-all", "--collection", "docs"]) {
            Err(UsageError::ConflictingActions(names)) => {
                assert_eq!(names, ["--list", "--delete-all"]);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn list_needs_no_collection() {
        assert_eq!(parse(&["--list"]).unwrap(), Action::List);
    }

    #[test]
    fn collection_required_for_other_actions() {
        for flag in ["--view", "--inspect", "--delete-all", "--delete-chunk"] {
            assert!(
                matches!(parse(&[flag]), Err(UsageError::MissingCollection)),
                "{flag} without --collection"
            );
        }
        assert!(matches!(
            parse(&["--view", "--collection", ""]),
            Err(UsageError::MissingCollection)
        ));
    }

    #[test]
    fn delete_chunk_needs_field_and_value() {
        let err = parse(&["--delete-chunk", "--collection", "c", "--chunk-field", "doc_id"])
            .unwrap_err();
        assert!(matches!(err, UsageError::MissingChunkFilter("--value")));
        assert_eq!(err.to_string(), "Must specify --value for targeted delete");

        let err = parse(&["--delete-chunk", "--collection", "c", "--value", "x"]).unwrap_err();
        assert_eq!(err.to_string(), "Must specify --chunk-field for targeted delete");

        let err = parse(&["--delete-chunk", "--collection", "c"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Must specify both --chunk-field and --value for targeted delete"
        );
    }

    #[test]
    fn delete_chunk_value_typing() {
        let action = parse(&[
            "--delete-chunk",
            "--collection",
            "c",
            "--chunk-field",
            "page",
            "--value",
            "3",
            "--value-type",
            "int",
            "--yes",
        ])
        .unwrap();
        assert_eq!(
            action,
            Action::DeleteChunk {
                collection: "c".into(),
                field: "page".into(),
                value: json!(3),
                skip_confirm: true,
            }
        );

        assert!(matches!(
            parse(&[
                "--delete-chunk",
                "--collection",
                "c",
                "--chunk-field",
                "page",
                "--value",
                "three",
                "--value-type",
                "int",
            ]),
            Err(UsageError::InvalidValue { .. })
        ));
    }

    #[test]
    fn value_type_parsing() {
        assert_eq!(ValueType::String.parse("42").unwrap(), json!("42"));
        assert_eq!(ValueType::Int.parse("-7").unwrap(), json!(-7));
        assert_eq!(ValueType::Bool.parse("TRUE").unwrap(), json!(true));
        assert!(ValueType::Bool.parse("yes").is_err());
    }
}
