use crate::classify::{Category, PatternSuggestion};
use std::fmt::{self, Write};

const TITLE: &str = "=== Suggested Filters (based on Inbox Zero principles) ===";
const NOTHING_FOUND: &str = "No significant patterns found.";
const GUIDANCE: &str = "\
To generate a config file from these suggestions, copy the rules into your
~/.gmailctl/config.jsonnet file and adjust as needed.

Run 'gmailctl diff' to preview changes before applying.";

/// Suggestions grouped by category, each group ordered by priority.
pub struct Report {
    total: usize,
    groups: Vec<(Category, Vec<PatternSuggestion>)>,
}

impl Report {
    pub fn new(mut suggestions: Vec<PatternSuggestion>) -> Self {
        let total = suggestions.len();
        // Stable, so equal priorities keep the order of the patterns.
        suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
        let groups = Category::ALL
            .iter()
            .map(|&category| {
                let items: Vec<_> = suggestions
                    .iter()
                    .filter(|s| s.category == category)
                    .cloned()
                    .collect();
                (category, items)
            })
            .filter(|(_, items)| !items.is_empty())
            .collect();
        Report { total, groups }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn groups(&self) -> &[(Category, Vec<PatternSuggestion>)] {
        &self.groups
    }
}

fn write_suggestion(f: &mut fmt::Formatter, suggestion: &PatternSuggestion) -> fmt::Result {
    let mut actions = String::new();
    for (i, action) in suggestion.actions.iter().enumerate() {
        if i > 0 {
            actions.push_str(", ");
        }
        write!(actions, "{}", action)?;
    }
    writeln!(f, "- {}", suggestion.description)?;
    writeln!(f, "  Filter: {{ query: \"{}\" }}", suggestion.query)?;
    writeln!(f, "  Actions: {{ {} }}", actions)?;
    writeln!(f)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "{}", NOTHING_FOUND);
        }
        writeln!(f, "{}", TITLE)?;
        writeln!(f)?;
        writeln!(f, "Found {} patterns to consider:", self.total)?;
        writeln!(f)?;
        for (category, items) in self.groups() {
            writeln!(f, "## {} ({} items)", category, items.len())?;
            writeln!(f)?;
            for suggestion in items {
                write_suggestion(f, suggestion)?;
            }
        }
        writeln!(f, "{}", GUIDANCE)
    }
}
