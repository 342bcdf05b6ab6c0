// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Binds user events to the editing core.
//!
//! The controller is the single owner of the click selection, the session client and the
//! renderer. Every remote failure ends here: it is shown inline and the editor keeps going.

use tracing::{debug, info, warn};

use crate::client::{NextDirection, SearchDirection, SearchKind, SessionClient, SessionError};
use crate::command::{CommandBuilder, EditCommand, FormValues};
use crate::history::HistoryController;
use crate::model::{ClickTarget, RenderPayload, RenderedGraph, ServerInfo, SessionState};
use crate::render::Renderer;
use crate::selection::SelectionStateMachine;

pub struct SessionController<R> {
    client: SessionClient,
    selection: SelectionStateMachine,
    renderer: R,
    graph: RenderedGraph,
    payload: Option<RenderPayload>,
    info: Option<ServerInfo>,
}

impl<R: Renderer> SessionController<R> {
    pub fn new(client: SessionClient, renderer: R) -> Self {
        Self {
            client,
            selection: SelectionStateMachine::new(),
            renderer,
            graph: RenderedGraph::default(),
            payload: None,
            info: None,
        }
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.client.state()
    }

    pub fn selection(&self) -> &SelectionStateMachine {
        &self.selection
    }

    /// Clickable elements of the sentence on display.
    pub fn graph(&self) -> &RenderedGraph {
        &self.graph
    }

    pub fn payload(&self) -> Option<&RenderPayload> {
        self.payload.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Fetches session info and displays the first sentence, or `start` when given.
    pub async fn bootstrap(&mut self, start: Option<u32>) {
        let info = match self.client.info(true).await {
            Ok(info) => info,
            Err(err) => return self.report(err),
        };
        info!(file = %info.filename, numsent = info.numsent, "session opened");
        self.renderer.show_info(&info);
        let first = self.client.state().sentence_number();
        let has_sentences = info.numsent > 0;
        self.info = Some(info);

        if has_sentences {
            self.read(start.unwrap_or(first)).await;
        }
    }

    pub fn show_info(&mut self) {
        match &self.info {
            Some(info) => self.renderer.show_info(info),
            None => self.renderer.show_error("session not bootstrapped"),
        }
    }

    pub async fn version(&mut self) {
        match self.client.version().await {
            Ok(version) => {
                let message = format!("{} {}", version.name, version.version);
                self.renderer.notify(message.trim());
            }
            Err(err) => self.report(err),
        }
    }

    /// Click on the rendered graph. `element_id` is the id of the clicked element, `None` for the
    /// empty canvas.
    pub async fn click(&mut self, element_id: Option<&str>) {
        let target = self.graph.resolve(element_id);
        self.click_target(target).await;
    }

    pub async fn click_target(&mut self, target: ClickTarget) {
        let read_only = self.client.state().read_only();
        let outcome = self.selection.handle_click(&target, read_only);
        for effect in &outcome.effects {
            self.renderer.apply(effect);
        }

        let Some(gesture) = outcome.gesture else {
            return;
        };
        match CommandBuilder::from_gesture(gesture, &self.client.state()) {
            Ok(command) => self.dispatch_edit(command).await,
            Err(err) => self.renderer.show_error(&err.to_string()),
        }
    }

    /// Cancel button of the open edit form.
    pub fn cancel(&mut self) {
        let outcome = self.selection.cancel();
        for effect in &outcome.effects {
            self.renderer.apply(effect);
        }
    }

    /// Submits an edit button. Local validation failures keep the selection so the form can be
    /// corrected.
    pub async fn submit(&mut self, action: &str, values: FormValues) {
        let state = self.client.state();
        if state.read_only() {
            self.renderer.show_error("session is read-only");
            return;
        }

        let values = values.with_form_context(self.selection.open_form());
        match CommandBuilder::build(action, &values, self.selection.pending(), &state) {
            Ok(command) => self.dispatch_edit(command).await,
            Err(err) => {
                debug!(action, error = %err, "edit rejected locally");
                self.renderer.show_error(&err.to_string());
            }
        }
    }

    pub async fn read(&mut self, num: u32) {
        let state = self.client.state();
        if state.total_sentences() > 0 && !state.contains_sentence(num) {
            let message = format!(
                "invalid sentence number: must be between 1 and {}",
                state.total_sentences()
            );
            self.renderer.show_error(&message);
            return;
        }
        let result = self.client.read(num).await;
        self.finish(result);
    }

    pub async fn next(&mut self, direction: NextDirection) {
        let num = self.client.state().sentence_number();
        let result = self.client.next(direction, num).await;
        self.finish(result);
    }

    pub async fn save(&mut self) {
        let num = self.client.state().sentence_number();
        let result = self.client.save(num).await;
        if result.is_ok() {
            info!(num, "file saved");
        }
        self.finish(result);
    }

    pub async fn search(&mut self, kind: SearchKind, direction: SearchDirection, regex: &str) {
        let num = self.client.state().sentence_number();
        let result = self.client.search(kind, direction, regex, num).await;
        self.finish(result);
    }

    pub async fn undo(&mut self) {
        if !self.editable() {
            return;
        }
        let history = HistoryController::new(&self.client);
        if !history.can_undo() {
            self.renderer.show_error("nothing to undo");
            return;
        }
        let result = history.undo().await;
        self.finish_edit(result);
    }

    pub async fn redo(&mut self) {
        if !self.editable() {
            return;
        }
        let history = HistoryController::new(&self.client);
        if !history.can_redo() {
            self.renderer.show_error("nothing to redo");
            return;
        }
        let result = history.redo().await;
        self.finish_edit(result);
    }

    /// Marks which compared file holds the preferred graph for the current sentence.
    pub async fn set_preferred(&mut self, preferred: &str) {
        let num = self.client.state().sentence_number();
        let result = self.client.set_preferred(num, preferred).await;
        self.finish(result);
    }

    pub async fn modify_comment(&mut self, comment: &str) {
        if !self.editable() {
            return;
        }
        let num = self.client.state().sentence_number();
        let result = self.client.modify_comment(num, comment).await;
        self.finish_edit(result);
    }

    fn editable(&mut self) -> bool {
        let state = self.client.state();
        if state.read_only() {
            self.renderer.show_error("session is read-only");
            return false;
        }
        if !state.is_loaded() {
            self.renderer.show_error("no sentence loaded");
            return false;
        }
        true
    }

    async fn dispatch_edit(&mut self, command: EditCommand) {
        debug!(op = command.op.name(), prevmod = command.concurrency_token, "dispatching edit");
        let result = self.client.edit(&command).await;
        self.finish_edit(result);
    }

    /// Edits leave no gesture behind, whether the server accepted them or not.
    fn finish_edit(&mut self, result: Result<RenderPayload, SessionError>) {
        let failed = result.is_err();
        self.finish(result);
        if failed {
            let outcome = self.selection.cancel();
            for effect in &outcome.effects {
                self.renderer.apply(effect);
            }
        }
    }

    fn finish(&mut self, result: Result<RenderPayload, SessionError>) {
        match result {
            Ok(payload) => self.show(payload),
            Err(err) => self.report(err),
        }
    }

    fn show(&mut self, payload: RenderPayload) {
        self.graph = RenderedGraph::from_svg(&payload.svg);
        self.selection.reset();
        debug!(num = payload.num, elements = self.graph.len(), "rendering sentence");
        self.renderer.render(&payload, &self.graph);
        self.payload = Some(payload);
    }

    fn report(&mut self, err: SessionError) {
        match err {
            SessionError::Superseded => debug!("stale response dropped"),
            SessionError::NoContent => {
                let message = err.to_string();
                self.renderer.show_error(&message);
                self.renderer.notify(&message);
            }
            err => {
                warn!(error = %err, "session request failed");
                self.renderer.show_error(&err.to_string());
            }
        }
    }
}
