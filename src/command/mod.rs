// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edit commands for the remote annotation session.
//!
//! A command is assembled from an action identifier, the values typed into the edit forms,
//! the pending click selection and the current session state. Building is pure: the same inputs
//! always produce the same command, and nothing is sent from here.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{IdError, SessionState, Variable};
use crate::selection::{EditForm, Gesture, PendingSelection};

/// Edge label used for edges drawn by clicking two nodes; the server replaces it with a
/// predicted relation.
pub const PLACEHOLDER_EDGE_LABEL: &str = "todo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    AddConcept { concept: String },
    AddName { name: String, name_of: Variable },
    AddEdge {
        start: Variable,
        label: String,
        end: Variable,
    },
    AddLiteral {
        literal_of: Variable,
        relation: String,
        value: String,
    },
    SetTop { variable: Variable },
    RenameVariable { old: Variable, new: Variable },
    DeleteInstance { variable: Variable },
    DeleteLiteral {
        id: Variable,
        edge: String,
        value: String,
    },
    ModifyConcept {
        variable: Variable,
        new_concept: String,
    },
    ModifyLiteral {
        id: Variable,
        edge: String,
        new_value: String,
    },
    DeleteEdge {
        start: Variable,
        end: String,
        label: String,
    },
    ModifyEdge {
        start: Variable,
        end: String,
        new_label: String,
    },
    MoveEdge {
        start: Variable,
        end: String,
        new_start: Variable,
        label: String,
    },
    ModifyPenman { text: String },
    ModifyComment { text: String },
    Reify { relation: String },
    Dereify { concept: String },
    AddSubgraph {
        graph: String,
        mappings: Vec<(String, String)>,
    },
}

impl EditOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddConcept { .. } => "add_concept",
            Self::AddName { .. } => "add_name",
            Self::AddEdge { .. } => "add_edge",
            Self::AddLiteral { .. } => "add_literal",
            Self::SetTop { .. } => "set_top",
            Self::RenameVariable { .. } => "rename_variable",
            Self::DeleteInstance { .. } => "delete_instance",
            Self::DeleteLiteral { .. } => "delete_literal",
            Self::ModifyConcept { .. } => "modify_concept",
            Self::ModifyLiteral { .. } => "modify_literal",
            Self::DeleteEdge { .. } => "delete_edge",
            Self::ModifyEdge { .. } => "modify_edge",
            Self::MoveEdge { .. } => "move_edge",
            Self::ModifyPenman { .. } => "modify_penman",
            Self::ModifyComment { .. } => "modify_comment",
            Self::Reify { .. } => "reify",
            Self::Dereify { .. } => "dereify",
            Self::AddSubgraph { .. } => "add_subgraph",
        }
    }

    fn push_params(&self, params: &mut Vec<(&'static str, String)>) {
        let mut push = |key: &'static str, value: &str| params.push((key, value.to_owned()));
        match self {
            Self::AddConcept { concept } => push("addconcept", concept),
            Self::AddName { name, name_of } => {
                push("addname", name);
                push("nameof", name_of.as_str());
            }
            Self::AddEdge { start, label, end } => {
                push("start", start.as_str());
                push("label", label);
                push("end", end.as_str());
            }
            Self::AddLiteral { literal_of, relation, value } => {
                push("literalof", literal_of.as_str());
                push("relationforliteral", relation);
                push("newliteral", value);
            }
            Self::SetTop { variable } => push("newtop", variable.as_str()),
            Self::RenameVariable { old, new } => {
                push("oldvarname", old.as_str());
                push("newvarname", new.as_str());
            }
            Self::DeleteInstance { variable } => push("delinstance", variable.as_str()),
            Self::DeleteLiteral { id, edge, value } => {
                push("delliteral", value);
                push("literalid", id.as_str());
                push("literaledge", edge);
            }
            Self::ModifyConcept { variable, new_concept } => {
                push("modconcept", variable.as_str());
                push("newconcept", new_concept);
            }
            Self::ModifyLiteral { id, edge, new_value } => {
                push("literalid", id.as_str());
                push("literaledge", edge);
                push("newliteral", new_value);
            }
            Self::DeleteEdge { start, end, label } => {
                push("deledge_start", start.as_str());
                push("deledge_end", end);
                push("deledge", label);
            }
            Self::ModifyEdge { start, end, new_label } => {
                push("modedge_start", start.as_str());
                push("modedge_end", end);
                push("newedge", new_label);
            }
            Self::MoveEdge { start, end, new_start, label } => {
                push("modedge_start", start.as_str());
                push("modedge_end", end);
                push("modedge_newstart", new_start.as_str());
                push("newedge", label);
            }
            Self::ModifyPenman { text } => push("modpenman", text),
            Self::ModifyComment { text } => push("modcomment", text),
            Self::Reify { relation } => push("reify", relation),
            Self::Dereify { concept } => push("dereify", concept),
            Self::AddSubgraph { graph, mappings } => {
                push("addgraph", graph);
                let joined = mappings
                    .iter()
                    .map(|(added, existing)| format!("{added}/{existing}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                push("mappings", &joined);
            }
        }
    }
}

/// One edit, stamped with the sentence it targets and the token of the payload it was built
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommand {
    pub sentence_number: u32,
    pub concurrency_token: u64,
    pub op: EditOp,
}

impl EditCommand {
    /// Form fields of the `edit` request, op fields first, then `num` and `prevmod`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        self.op.push_params(&mut params);
        params.push(("num", self.sentence_number.to_string()));
        params.push(("prevmod", self.concurrency_token.to_string()));
        params
    }
}

/// Identifier of an edit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    AddConcept,
    AddName,
    AddNameToSelected,
    AddEdge,
    AddLiteral,
    AddLiteralToSelected,
    SetTop,
    SetSelectedTop,
    RenameVariable,
    DeleteInstance,
    DeleteLiteral,
    ModifyConcept,
    ModifyLiteral,
    DeleteEdge,
    ModifyEdge,
    MoveEdge,
    ModifyPenman,
    ModifyComment,
    Reify,
    Dereify,
    AddSubgraph,
}

impl ActionId {
    pub const ALL: [ActionId; 21] = [
        Self::AddConcept,
        Self::AddName,
        Self::AddNameToSelected,
        Self::AddEdge,
        Self::AddLiteral,
        Self::AddLiteralToSelected,
        Self::SetTop,
        Self::SetSelectedTop,
        Self::RenameVariable,
        Self::DeleteInstance,
        Self::DeleteLiteral,
        Self::ModifyConcept,
        Self::ModifyLiteral,
        Self::DeleteEdge,
        Self::ModifyEdge,
        Self::MoveEdge,
        Self::ModifyPenman,
        Self::ModifyComment,
        Self::Reify,
        Self::Dereify,
        Self::AddSubgraph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddConcept => "addconcept",
            Self::AddName => "addname",
            Self::AddNameToSelected => "addname2",
            Self::AddEdge => "addedge",
            Self::AddLiteral => "addliteral",
            Self::AddLiteralToSelected => "addliteral2",
            Self::SetTop => "settop",
            Self::SetSelectedTop => "setinstancetop",
            Self::RenameVariable => "renamevar",
            Self::DeleteInstance => "delinstance",
            Self::DeleteLiteral => "delliteral",
            Self::ModifyConcept => "modifyconcept",
            Self::ModifyLiteral => "modifyliteral",
            Self::DeleteEdge => "deledge",
            Self::ModifyEdge => "modifyedge",
            Self::MoveEdge => "moveedge",
            Self::ModifyPenman => "modifypenman",
            Self::ModifyComment => "modifycomment",
            Self::Reify => "reifygraph",
            Self::Dereify => "dereifygraph",
            Self::AddSubgraph => "modifyaddgraph",
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct ParseActionError(pub String);

impl FromStr for ActionId {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_owned()))
    }
}

/// Values typed into the edit forms. Unset fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub concept: Option<String>,
    pub name: Option<String>,
    pub name_of: Option<String>,
    pub start: Option<String>,
    pub label: Option<String>,
    pub end: Option<String>,
    pub literal_of: Option<String>,
    pub relation: Option<String>,
    pub literal_value: Option<String>,
    pub top: Option<String>,
    pub old_variable: Option<String>,
    pub new_variable: Option<String>,
    pub literal_id: Option<String>,
    pub literal_edge: Option<String>,
    pub new_concept: Option<String>,
    pub new_edge_label: Option<String>,
    pub new_source: Option<String>,
    pub penman: Option<String>,
    pub comment: Option<String>,
    pub reification: Option<String>,
    pub graph: Option<String>,
    pub mappings: Option<String>,
}

impl FormValues {
    pub const FIELDS: [&'static str; 22] = [
        "concept",
        "name",
        "name_of",
        "start",
        "label",
        "end",
        "literal_of",
        "relation",
        "literal_value",
        "top",
        "old_variable",
        "new_variable",
        "literal_id",
        "literal_edge",
        "new_concept",
        "new_edge_label",
        "new_source",
        "penman",
        "comment",
        "reification",
        "graph",
        "mappings",
    ];

    /// Sets a field by name. Returns `false` for unknown names.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "concept" => &mut self.concept,
            "name" => &mut self.name,
            "name_of" => &mut self.name_of,
            "start" => &mut self.start,
            "label" => &mut self.label,
            "end" => &mut self.end,
            "literal_of" => &mut self.literal_of,
            "relation" => &mut self.relation,
            "literal_value" => &mut self.literal_value,
            "top" => &mut self.top,
            "old_variable" => &mut self.old_variable,
            "new_variable" => &mut self.new_variable,
            "literal_id" => &mut self.literal_id,
            "literal_edge" => &mut self.literal_edge,
            "new_concept" => &mut self.new_concept,
            "new_edge_label" => &mut self.new_edge_label,
            "new_source" => &mut self.new_source,
            "penman" => &mut self.penman,
            "comment" => &mut self.comment,
            "reification" => &mut self.reification,
            "graph" => &mut self.graph,
            "mappings" => &mut self.mappings,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// Fills the hidden fields carried by an open literal form. Explicit values win.
    pub fn with_form_context(mut self, form: Option<&EditForm>) -> Self {
        if let Some(EditForm::Literal {
            id,
            edge_label,
            text,
        }) = form
        {
            self.literal_id.get_or_insert_with(|| id.as_str().to_owned());
            self.literal_edge.get_or_insert_with(|| edge_label.clone());
            self.literal_value.get_or_insert_with(|| text.clone());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("`{action}` needs a value for `{field}`")]
    MissingField {
        action: ActionId,
        field: &'static str,
    },
    #[error("`{0}` needs a selected node")]
    NoArmedNode(ActionId),
    #[error("`{0}` needs a selected edge")]
    NoArmedEdge(ActionId),
    #[error("bad format for mappings, use 'a/b ...': {0}")]
    InvalidMappings(String),
    #[error("invalid variable in `{field}`: {source}")]
    InvalidVariable {
        field: &'static str,
        #[source]
        source: IdError,
    },
    #[error("no sentence loaded")]
    NoSentenceLoaded,
}

impl From<ParseActionError> for CommandError {
    fn from(err: ParseActionError) -> Self {
        Self::UnknownAction(err.0)
    }
}

pub struct CommandBuilder;

impl CommandBuilder {
    /// Builds the command for an edit button identified by its action id.
    pub fn build(
        action: &str,
        values: &FormValues,
        pending: &PendingSelection,
        state: &SessionState,
    ) -> Result<EditCommand, CommandError> {
        let action = action.trim().parse::<ActionId>()?;
        Self::build_action(action, values, pending, state)
    }

    pub fn build_action(
        action: ActionId,
        values: &FormValues,
        pending: &PendingSelection,
        state: &SessionState,
    ) -> Result<EditCommand, CommandError> {
        let op = build_op(action, values, pending)?;
        stamp(op, state)
    }

    /// Turns a completed two-click gesture into its command.
    pub fn from_gesture(
        gesture: Gesture,
        state: &SessionState,
    ) -> Result<EditCommand, CommandError> {
        let op = match gesture {
            Gesture::AddEdge { start, end } => EditOp::AddEdge {
                start,
                label: PLACEHOLDER_EDGE_LABEL.to_owned(),
                end,
            },
            Gesture::MoveEdge { start, end, new_start, label } => EditOp::MoveEdge {
                start,
                end,
                new_start,
                label,
            },
        };
        stamp(op, state)
    }
}

fn stamp(op: EditOp, state: &SessionState) -> Result<EditCommand, CommandError> {
    if !state.is_loaded() {
        return Err(CommandError::NoSentenceLoaded);
    }
    Ok(EditCommand {
        sentence_number: state.sentence_number(),
        concurrency_token: state.concurrency_token(),
        op,
    })
}

fn build_op(
    action: ActionId,
    values: &FormValues,
    pending: &PendingSelection,
) -> Result<EditOp, CommandError> {
    let fields = Fields { action, values };
    let armed_node = || pending.armed_node().cloned().ok_or(CommandError::NoArmedNode(action));
    let armed_edge = || pending.armed_edge().ok_or(CommandError::NoArmedEdge(action));

    let op = match action {
        ActionId::AddConcept => EditOp::AddConcept {
            concept: fields.text("concept")?,
        },
        ActionId::AddName => EditOp::AddName {
            name: fields.text("name")?,
            name_of: fields.variable("name_of")?,
        },
        ActionId::AddNameToSelected => EditOp::AddName {
            name: fields.text("name")?,
            name_of: armed_node()?,
        },
        ActionId::AddEdge => EditOp::AddEdge {
            start: fields.variable("start")?,
            label: fields.text("label")?,
            end: fields.variable("end")?,
        },
        ActionId::AddLiteral => EditOp::AddLiteral {
            literal_of: fields.variable("literal_of")?,
            relation: fields.text("relation")?,
            value: fields.text("literal_value")?,
        },
        ActionId::AddLiteralToSelected => EditOp::AddLiteral {
            literal_of: armed_node()?,
            relation: fields.text("relation")?,
            value: fields.text("literal_value")?,
        },
        ActionId::SetTop => EditOp::SetTop {
            variable: fields.variable("top")?,
        },
        ActionId::SetSelectedTop => EditOp::SetTop {
            variable: armed_node()?,
        },
        ActionId::RenameVariable => EditOp::RenameVariable {
            old: fields.variable("old_variable")?,
            new: fields.variable("new_variable")?,
        },
        ActionId::DeleteInstance => EditOp::DeleteInstance {
            variable: armed_node()?,
        },
        ActionId::DeleteLiteral => EditOp::DeleteLiteral {
            id: fields.variable("literal_id")?,
            edge: fields.text("literal_edge")?,
            value: fields.text("literal_value")?,
        },
        ActionId::ModifyConcept => EditOp::ModifyConcept {
            variable: armed_node()?,
            new_concept: fields.text("new_concept")?,
        },
        ActionId::ModifyLiteral => EditOp::ModifyLiteral {
            id: fields.variable("literal_id")?,
            edge: fields.text("literal_edge")?,
            new_value: fields.text("literal_value")?,
        },
        ActionId::DeleteEdge => {
            let (start, end, label) = armed_edge()?;
            EditOp::DeleteEdge {
                start: start.clone(),
                end: end.to_owned(),
                label: label.to_owned(),
            }
        }
        ActionId::ModifyEdge => {
            let (start, end, _) = armed_edge()?;
            EditOp::ModifyEdge {
                start: start.clone(),
                end: end.to_owned(),
                new_label: fields.text("new_edge_label")?,
            }
        }
        ActionId::MoveEdge => {
            let (start, end, label) = armed_edge()?;
            let label = match fields.optional_text("new_edge_label") {
                Some(new_label) => new_label,
                None => label.to_owned(),
            };
            EditOp::MoveEdge {
                start: start.clone(),
                end: end.to_owned(),
                new_start: fields.variable("new_source")?,
                label,
            }
        }
        ActionId::ModifyPenman => EditOp::ModifyPenman {
            text: fields.raw_text("penman")?,
        },
        // An empty comment clears it.
        ActionId::ModifyComment => EditOp::ModifyComment {
            text: values.comment.clone().unwrap_or_default(),
        },
        ActionId::Reify => EditOp::Reify {
            relation: fields.token("reification", 0)?,
        },
        ActionId::Dereify => EditOp::Dereify {
            concept: fields.token("reification", 2)?,
        },
        ActionId::AddSubgraph => EditOp::AddSubgraph {
            graph: fields.raw_text("graph")?,
            mappings: parse_mappings(&fields.text("mappings")?)?,
        },
    };
    Ok(op)
}

struct Fields<'a> {
    action: ActionId,
    values: &'a FormValues,
}

impl Fields<'_> {
    fn get(&self, field: &'static str) -> Option<&str> {
        let values = self.values;
        let value = match field {
            "concept" => &values.concept,
            "name" => &values.name,
            "name_of" => &values.name_of,
            "start" => &values.start,
            "label" => &values.label,
            "end" => &values.end,
            "literal_of" => &values.literal_of,
            "relation" => &values.relation,
            "literal_value" => &values.literal_value,
            "top" => &values.top,
            "old_variable" => &values.old_variable,
            "new_variable" => &values.new_variable,
            "literal_id" => &values.literal_id,
            "literal_edge" => &values.literal_edge,
            "new_concept" => &values.new_concept,
            "new_edge_label" => &values.new_edge_label,
            "new_source" => &values.new_source,
            "penman" => &values.penman,
            "comment" => &values.comment,
            "reification" => &values.reification,
            "graph" => &values.graph,
            "mappings" => &values.mappings,
            _ => &None,
        };
        value.as_deref()
    }

    fn missing(&self, field: &'static str) -> CommandError {
        CommandError::MissingField {
            action: self.action,
            field,
        }
    }

    fn optional_text(&self, field: &'static str) -> Option<String> {
        self.get(field).map(str::trim).filter(|value| !value.is_empty()).map(str::to_owned)
    }

    fn text(&self, field: &'static str) -> Result<String, CommandError> {
        self.optional_text(field).ok_or_else(|| self.missing(field))
    }

    /// Multi-line input (PENMAN text) is passed through untrimmed.
    fn raw_text(&self, field: &'static str) -> Result<String, CommandError> {
        match self.get(field) {
            Some(value) if !value.trim().is_empty() => Ok(value.to_owned()),
            _ => Err(self.missing(field)),
        }
    }

    fn variable(&self, field: &'static str) -> Result<Variable, CommandError> {
        let value = self.text(field)?;
        Variable::new(value).map_err(|source| CommandError::InvalidVariable { field, source })
    }

    fn token(&self, field: &'static str, index: usize) -> Result<String, CommandError> {
        self.get(field)
            .and_then(|value| value.split_whitespace().nth(index))
            .map(str::to_owned)
            .ok_or_else(|| self.missing(field))
    }
}

fn parse_mappings(input: &str) -> Result<Vec<(String, String)>, CommandError> {
    input
        .split_whitespace()
        .map(|pair| match pair.split('/').collect::<Vec<_>>().as_slice() {
            [added, existing] if !added.is_empty() && !existing.is_empty() => {
                Ok(((*added).to_owned(), (*existing).to_owned()))
            }
            _ => Err(CommandError::InvalidMappings(pair.to_owned())),
        })
        .collect()
}
