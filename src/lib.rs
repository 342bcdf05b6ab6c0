// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Amredit: interactive graph editing client for AMR/UMR annotation sessions.
//!
//! Clicks on a rendered sentence graph go through [`selection::SelectionStateMachine`], form
//! submissions become [`command::EditCommand`]s, and [`client::SessionClient`] carries them to the
//! annotation server, optimistically locked by the server's modification token.
//! [`controller::SessionController`] ties these together behind a [`render::Renderer`].

pub mod client;
pub mod command;
pub mod controller;
pub mod history;
pub mod model;
pub mod render;
pub mod selection;
pub mod shell;
