// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod editor;
pub mod git;
pub mod llm;
pub mod prompt;
