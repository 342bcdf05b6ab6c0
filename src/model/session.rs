// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::payload::{RenderPayload, ServerInfo};

/// Client-side view of the remote annotation session.
///
/// A new value is derived from every received payload; nothing updates it speculatively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    sentence_number: u32,
    total_sentences: u32,
    read_only: bool,
    undos: u32,
    redos: u32,
    concurrency_token: u64,
    loaded: bool,
}

impl SessionState {
    /// State right after `info`, before any sentence has been displayed.
    pub fn bootstrap(info: &ServerInfo) -> Self {
        Self {
            sentence_number: if info.numsent > 0 { 1 } else { 0 },
            total_sentences: info.numsent,
            read_only: info.readonly,
            ..Self::default()
        }
    }

    pub fn from_payload(payload: &RenderPayload) -> Self {
        Self {
            sentence_number: payload.num,
            total_sentences: payload.numsent,
            read_only: payload.readonly,
            undos: payload.undos,
            redos: payload.redos,
            concurrency_token: payload.prevmod,
            loaded: true,
        }
    }

    pub fn sentence_number(&self) -> u32 {
        self.sentence_number
    }

    pub fn total_sentences(&self) -> u32 {
        self.total_sentences
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn undos(&self) -> u32 {
        self.undos
    }

    pub fn redos(&self) -> u32 {
        self.redos
    }

    pub fn concurrency_token(&self) -> u64 {
        self.concurrency_token
    }

    /// Whether a sentence has been displayed since bootstrap.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn can_undo(&self) -> bool {
        self.undos > 0
    }

    pub fn can_redo(&self) -> bool {
        self.redos > 0
    }

    pub fn contains_sentence(&self, num: u32) -> bool {
        num >= 1 && num <= self.total_sentences
    }
}
