// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

/// Drop every line whose trimmed content starts with `#`, the way git
/// treats comment lines in a commit message. Kept lines are untouched,
/// line endings included.
pub fn strip_comment_lines(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !line.trim().starts_with('#'))
        .collect()
}

/// True when nothing but comments and whitespace is left after editing.
pub fn is_blank_message(text: &str) -> bool {
    strip_comment_lines(text).trim().is_empty()
}
