// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Click interpretation for the rendered sentence graph.
//!
//! A click either opens an edit form, toggles the single highlight, or completes a two-click
//! gesture (node → node adds an edge, edge → node moves the edge's source). Completed gestures
//! are handed to the command builder; this module never talks to the session.

use crate::model::{ClickTarget, GraphElementRef, Variable};

/// The gesture in progress. At most one element is armed at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingSelection {
    #[default]
    Idle,
    NodeArmed {
        variable: Variable,
    },
    EdgeArmed {
        from: Variable,
        to: String,
        label: String,
    },
}

impl PendingSelection {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn armed_node(&self) -> Option<&Variable> {
        match self {
            Self::NodeArmed { variable } => Some(variable),
            _ => None,
        }
    }

    pub fn armed_edge(&self) -> Option<(&Variable, &str, &str)> {
        match self {
            Self::EdgeArmed { from, to, label } => Some((from, to.as_str(), label.as_str())),
            _ => None,
        }
    }

    /// The rendered element backing this selection.
    pub fn element(&self) -> Option<GraphElementRef> {
        match self {
            Self::Idle => None,
            Self::NodeArmed { variable } => Some(GraphElementRef::node(variable.clone())),
            Self::EdgeArmed { from, to, label } => {
                Some(GraphElementRef::edge(from.clone(), to.clone(), label.clone()))
            }
        }
    }
}

/// Edit form opened for a clicked element, with its pre-filled values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditForm {
    Concept { variable: Variable, concept: String },
    Edge {
        from: Variable,
        to: String,
        label: String,
    },
    Literal {
        id: Variable,
        edge_label: String,
        text: String,
    },
}

/// Side effect the view has to perform after a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Highlight(GraphElementRef),
    ClearHighlight,
    OpenForm(EditForm),
    CloseForm,
}

/// A completed two-click gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    AddEdge { start: Variable, end: Variable },
    MoveEdge {
        start: Variable,
        end: String,
        new_start: Variable,
        label: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub effects: Vec<UiEffect>,
    pub gesture: Option<Gesture>,
}

impl ClickOutcome {
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty() && self.gesture.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStateMachine {
    pending: PendingSelection,
    highlighted: Option<GraphElementRef>,
    open_form: Option<EditForm>,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    pub fn highlighted(&self) -> Option<&GraphElementRef> {
        self.highlighted.as_ref()
    }

    pub fn open_form(&self) -> Option<&EditForm> {
        self.open_form.as_ref()
    }

    /// Consumes one click on the rendered graph.
    ///
    /// Read-only sessions never arm a gesture or open a form.
    pub fn handle_click(&mut self, target: &ClickTarget, read_only: bool) -> ClickOutcome {
        if read_only {
            return self.disarm();
        }

        let element = match target {
            ClickTarget::Canvas => return self.disarm(),
            ClickTarget::Element(element) => element,
        };

        match (&self.pending, element) {
            (
                PendingSelection::NodeArmed { variable: start },
                GraphElementRef::Node { variable, .. },
            ) => {
                let gesture = Gesture::AddEdge {
                    start: start.clone(),
                    end: variable.clone(),
                };
                self.complete(gesture)
            }
            (
                PendingSelection::EdgeArmed { from, to, label },
                GraphElementRef::Node { variable, .. },
            ) => {
                let gesture = Gesture::MoveEdge {
                    start: from.clone(),
                    end: to.clone(),
                    new_start: variable.clone(),
                    label: label.clone(),
                };
                self.complete(gesture)
            }
            (PendingSelection::Idle, GraphElementRef::Node { variable, concept }) => {
                let mut outcome = self.close_all();
                let form = EditForm::Concept {
                    variable: variable.clone(),
                    concept: concept.clone().unwrap_or_default(),
                };
                let pending = PendingSelection::NodeArmed {
                    variable: variable.clone(),
                };
                self.arm(pending, element, form, &mut outcome);
                outcome
            }
            (_, GraphElementRef::Edge { from, to, label }) => {
                let mut outcome = self.close_all();
                let form = EditForm::Edge {
                    from: from.clone(),
                    to: to.clone(),
                    label: label.clone(),
                };
                let pending = PendingSelection::EdgeArmed {
                    from: from.clone(),
                    to: to.clone(),
                    label: label.clone(),
                };
                self.arm(pending, element, form, &mut outcome);
                outcome
            }
            (_, GraphElementRef::Literal { id, edge_label, text }) => {
                let mut outcome = self.close_all();
                self.pending = PendingSelection::Idle;
                let form = EditForm::Literal {
                    id: id.clone(),
                    edge_label: edge_label.clone(),
                    text: text.replace('"', ""),
                };
                self.open_form = Some(form.clone());
                outcome.effects.push(UiEffect::OpenForm(form));
                outcome
            }
        }
    }

    /// Cancel button of an open form: same as clicking the empty canvas.
    pub fn cancel(&mut self) -> ClickOutcome {
        let mut outcome = self.disarm();
        if self.open_form.take().is_some() {
            outcome.effects.push(UiEffect::CloseForm);
        }
        outcome
    }

    /// Forgets the gesture, the highlight and the open form without emitting effects.
    ///
    /// Used after a fresh render, where the previous graph elements no longer exist.
    pub fn reset(&mut self) {
        self.pending = PendingSelection::Idle;
        self.highlighted = None;
        self.open_form = None;
    }

    fn arm(
        &mut self,
        pending: PendingSelection,
        element: &GraphElementRef,
        form: EditForm,
        outcome: &mut ClickOutcome,
    ) {
        self.pending = pending;
        self.highlighted = Some(element.clone());
        self.open_form = Some(form.clone());
        outcome.effects.push(UiEffect::Highlight(element.clone()));
        outcome.effects.push(UiEffect::OpenForm(form));
    }

    fn complete(&mut self, gesture: Gesture) -> ClickOutcome {
        let mut outcome = self.close_all();
        self.pending = PendingSelection::Idle;
        outcome.gesture = Some(gesture);
        outcome
    }

    /// Returns to idle. An open form only closes when it belonged to the discarded gesture.
    fn disarm(&mut self) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        if self.highlighted.take().is_some() {
            outcome.effects.push(UiEffect::ClearHighlight);
        }
        if !self.pending.is_idle() && self.open_form.take().is_some() {
            outcome.effects.push(UiEffect::CloseForm);
        }
        self.pending = PendingSelection::Idle;
        outcome
    }

    fn close_all(&mut self) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        if self.highlighted.take().is_some() {
            outcome.effects.push(UiEffect::ClearHighlight);
        }
        if self.open_form.take().is_some() {
            outcome.effects.push(UiEffect::CloseForm);
        }
        outcome
    }
}
