// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

/// Output of `git diff --cached` that has something in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDiff(String);

impl StagedDiff {
    /// `None` when nothing is staged (empty or whitespace-only output).
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn files_changed(&self) -> usize {
        self.0
            .lines()
            .filter(|l| l.starts_with("diff --git "))
            .count()
    }

    /// (insertions, deletions), ignoring the `+++`/`---` file headers.
    pub fn line_counts(&self) -> (usize, usize) {
        let mut additions = 0;
        let mut deletions = 0;

        for line in self.0.lines() {
            if line.starts_with('+') && !line.starts_with("+++") {
                additions += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                deletions += 1;
            }
        }

        (additions, deletions)
    }
}
