// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Line-oriented command shell over a [`SessionController`].
//!
//! Each input line is one user event: a click, a form submission or a navigation request.
//! Values containing whitespace can be wrapped in double quotes.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::client::{NextDirection, SearchDirection, SearchKind};
use crate::command::FormValues;
use crate::controller::SessionController;
use crate::model::{ClickTarget, GraphElementRef, IdError, Variable};
use crate::render::Renderer;

pub const HELP: &str = "\
commands:
  info | version | help | quit
  read <num> | next | prev | first | last
  click node <var> | click edge <from> <to> <label> | click literal <id> <edge> <text>
  click <element-id> | click canvas | cancel
  do <action> [field=value ...]
  undo | redo | save
  find <text|id|amr|comment> <next|prec> <regex>
  prefer <file> | comment <text>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Info,
    Version,
    Help,
    Quit,
    Read(u32),
    Next(NextDirection),
    /// Click by rendered element id; `None` is the empty canvas.
    Click(Option<String>),
    ClickNode(Variable),
    ClickElement(GraphElementRef),
    Cancel,
    Submit { action: String, values: FormValues },
    Undo,
    Redo,
    Save,
    Find {
        kind: SearchKind,
        direction: SearchDirection,
        regex: String,
    },
    Prefer(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("`{command}` does not accept `{value}`")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
    #[error("unknown form field `{0}`")]
    UnknownField(String),
    #[error("invalid variable: {0}")]
    InvalidVariable(#[from] IdError),
    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Splits a line on whitespace, keeping double-quoted runs together. `\"` inside quotes is a
/// literal quote.
fn split_args(line: &str) -> Result<Vec<String>, ShellError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if quoted => match chars.next() {
                Some('n') => current.push('\n'),
                Some(next) => current.push(next),
                None => return Err(ShellError::UnterminatedQuote),
            },
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(ShellError::UnterminatedQuote);
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

/// Text after the first word, untouched.
fn rest_of_line(line: &str) -> &str {
    line.trim_start()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("")
}

pub fn parse_command(line: &str) -> Result<ShellCommand, ShellError> {
    let args = split_args(line)?;
    let Some((command, rest)) = args.split_first() else {
        return Err(ShellError::UnknownCommand(String::new()));
    };

    let command = match command.as_str() {
        "info" => ShellCommand::Info,
        "version" => ShellCommand::Version,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "read" => {
            let raw = rest.first().ok_or(ShellError::MissingArgument {
                command: "read",
                argument: "a number",
            })?;
            let num = raw.parse().map_err(|_| ShellError::InvalidArgument {
                command: "read",
                value: raw.clone(),
            })?;
            ShellCommand::Read(num)
        }
        "next" => ShellCommand::Next(NextDirection::Next),
        "prev" => ShellCommand::Next(NextDirection::Preceding),
        "first" => ShellCommand::Next(NextDirection::First),
        "last" => ShellCommand::Next(NextDirection::Last),
        "click" => parse_click(rest)?,
        "cancel" => ShellCommand::Cancel,
        "do" => {
            let (action, fields) = rest.split_first().ok_or(ShellError::MissingArgument {
                command: "do",
                argument: "an action",
            })?;
            let mut values = FormValues::default();
            for field in fields {
                let (key, value) = field.split_once('=').unwrap_or((field.as_str(), ""));
                if !values.set(key, value) {
                    return Err(ShellError::UnknownField(key.to_owned()));
                }
            }
            ShellCommand::Submit {
                action: action.clone(),
                values,
            }
        }
        "undo" => ShellCommand::Undo,
        "redo" => ShellCommand::Redo,
        "save" => ShellCommand::Save,
        "find" => parse_find(rest)?,
        "prefer" => {
            let file = rest.first().ok_or(ShellError::MissingArgument {
                command: "prefer",
                argument: "a file",
            })?;
            ShellCommand::Prefer(file.clone())
        }
        "comment" => ShellCommand::Comment(rest_of_line(line).to_owned()),
        other => return Err(ShellError::UnknownCommand(other.to_owned())),
    };
    Ok(command)
}

fn parse_click(args: &[String]) -> Result<ShellCommand, ShellError> {
    let missing = |argument| ShellError::MissingArgument {
        command: "click",
        argument,
    };
    match args {
        [] => Err(missing("a target")),
        [canvas] if canvas == "canvas" => Ok(ShellCommand::Click(None)),
        [kind, variable] if kind == "node" => {
            Ok(ShellCommand::ClickNode(Variable::new(variable.as_str())?))
        }
        [kind, from, to, label] if kind == "edge" => Ok(ShellCommand::ClickElement(
            GraphElementRef::edge(Variable::new(from.as_str())?, to.as_str(), label.as_str()),
        )),
        [kind, id, edge, text @ ..] if kind == "literal" && !text.is_empty() => {
            let id = Variable::new(id.as_str())?;
            let element = GraphElementRef::literal(id, edge.as_str(), text.join(" "));
            Ok(ShellCommand::ClickElement(element))
        }
        [kind, ..] if matches!(kind.as_str(), "node" | "edge" | "literal") => {
            Err(missing("all fields of the element"))
        }
        [element_id] if element_id.contains('#') => {
            Ok(ShellCommand::Click(Some(element_id.clone())))
        }
        [other, ..] => Err(ShellError::InvalidArgument {
            command: "click",
            value: other.clone(),
        }),
    }
}

fn parse_find(args: &[String]) -> Result<ShellCommand, ShellError> {
    let [kind, direction, regex @ ..] = args else {
        let argument = "a kind and direction";
        return Err(ShellError::MissingArgument {
            command: "find",
            argument,
        });
    };
    let kind = SearchKind::parse(kind).ok_or_else(|| ShellError::InvalidArgument {
        command: "find",
        value: kind.clone(),
    })?;
    let direction = match direction.as_str() {
        "next" => SearchDirection::Next,
        "prec" | "prev" => SearchDirection::Preceding,
        other => {
            return Err(ShellError::InvalidArgument {
                command: "find",
                value: other.to_owned(),
            });
        }
    };
    if regex.is_empty() {
        return Err(ShellError::MissingArgument {
            command: "find",
            argument: "a pattern",
        });
    }
    Ok(ShellCommand::Find {
        kind,
        direction,
        regex: regex.join(" "),
    })
}

/// Runs one command. Returns `false` when the shell should stop.
pub async fn execute<R: Renderer>(
    controller: &mut SessionController<R>,
    command: ShellCommand,
) -> bool {
    match command {
        ShellCommand::Quit => return false,
        ShellCommand::Info => controller.show_info(),
        ShellCommand::Version => controller.version().await,
        ShellCommand::Help => controller.renderer_mut().notify(HELP),
        ShellCommand::Read(num) => controller.read(num).await,
        ShellCommand::Next(direction) => controller.next(direction).await,
        ShellCommand::Click(element_id) => controller.click(element_id.as_deref()).await,
        ShellCommand::ClickNode(variable) => {
            let element = match controller.graph().concept_of(variable.as_str()) {
                Some(concept) => GraphElementRef::node_with_concept(variable, concept),
                None => GraphElementRef::node(variable),
            };
            controller.click_target(ClickTarget::Element(element)).await;
        }
        ShellCommand::ClickElement(element) => {
            controller.click_target(ClickTarget::Element(element)).await
        }
        ShellCommand::Cancel => controller.cancel(),
        ShellCommand::Submit { action, values } => controller.submit(&action, values).await,
        ShellCommand::Undo => controller.undo().await,
        ShellCommand::Redo => controller.redo().await,
        ShellCommand::Save => controller.save().await,
        ShellCommand::Find { kind, direction, regex } => {
            controller.search(kind, direction, &regex).await
        }
        ShellCommand::Prefer(file) => controller.set_preferred(&file).await,
        ShellCommand::Comment(text) => controller.modify_comment(&text).await,
    }
    true
}

/// Reads commands line by line until end of input or `quit`.
pub async fn run<R, I>(controller: &mut SessionController<R>, input: I) -> std::io::Result<()>
where
    R: Renderer,
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        debug!(line, "shell command");
        match parse_command(line) {
            Ok(command) => {
                if !execute(controller, command).await {
                    break;
                }
            }
            Err(err) => controller.renderer_mut().show_error(&err.to_string()),
        }
    }
    Ok(())
}
