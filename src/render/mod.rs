// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Presentation boundary.
//!
//! The editing core never draws anything itself. It hands payloads, click effects, errors and
//! notifications to a [`Renderer`]; the plain-text renderer backs the command-line shell.

use crate::model::{RenderPayload, RenderedGraph, ServerInfo};
use crate::selection::UiEffect;

mod text;

pub use text::TextRenderer;

pub trait Renderer {
    /// Redraws the sentence. `graph` indexes the clickable elements of `payload.svg`.
    fn render(&mut self, payload: &RenderPayload, graph: &RenderedGraph);

    fn apply(&mut self, effect: &UiEffect);

    /// Inline error next to the sentence; the editor stays usable.
    fn show_error(&mut self, message: &str);

    /// Blocking notification the user has to acknowledge.
    fn notify(&mut self, message: &str);

    fn show_info(&mut self, info: &ServerInfo);
}
