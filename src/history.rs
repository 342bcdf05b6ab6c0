// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Undo/redo availability and requests.

use tracing::debug;

use crate::client::{HistoryAction, SessionClient, SessionError};
use crate::model::RenderPayload;

/// Undo and redo for the current sentence, as reported by the last applied payload.
#[derive(Debug, Clone, Copy)]
pub struct HistoryController<'a> {
    client: &'a SessionClient,
}

impl<'a> HistoryController<'a> {
    pub fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    pub fn can_undo(&self) -> bool {
        self.client.state().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.client.state().can_redo()
    }

    pub async fn undo(&self) -> Result<RenderPayload, SessionError> {
        self.step(HistoryAction::Undo).await
    }

    pub async fn redo(&self) -> Result<RenderPayload, SessionError> {
        self.step(HistoryAction::Redo).await
    }

    async fn step(&self, action: HistoryAction) -> Result<RenderPayload, SessionError> {
        let state = self.client.state();
        debug!(
            action = action.as_str(),
            undos = state.undos(),
            redos = state.redos(),
            "history step"
        );
        self.client.history(action, state.sentence_number(), state.concurrency_token()).await
    }
}
