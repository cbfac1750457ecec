// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use crate::domain::StagedDiff;

/// Fixed instructions sent ahead of every diff.
pub const INSTRUCTIONS: &str = "You are writing one git commit message based on a git diff.

The format of the message must be:
<summary line, 60 characters max>
<blank line>
<paragraph describing the changes>

Rules:
- wrap the paragraph with newlines so no line exceeds 80 characters
- describe the changes in the imperative mood
- do not mention changes to imports
- do not mention that the message was generated by AI";

const DIFF_PREFIX: &str = "here is the diff: ";

/// Second user message: the diff itself.
pub fn diff_message(diff: &StagedDiff) -> String {
    format!("{DIFF_PREFIX}{}", diff.as_str())
}

/// Human-readable rendering for `--show-prompt`.
pub fn render(diff: &StagedDiff) -> String {
    format!("{INSTRUCTIONS}\n\n{}", diff_message(diff))
}
