// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Rendered graph element references, the client-side session state and the payloads exchanged
//! with the remote annotation session.

pub mod element_ref;
pub mod ids;
pub mod payload;
pub mod session;

pub use element_ref::{
    ClickTarget, ElementKind, GraphElementRef, ParseElementRefError, RenderedGraph,
};
pub use ids::{Id, IdError, Variable};
pub use payload::{alignment_spans, RenderPayload, ServerInfo, VersionInfo};
pub use session::SessionState;
