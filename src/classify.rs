use crate::aggregate::EmailPattern;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Newsletter,
    Notification,
    Receipt,
    Bulk,
}

impl Category {
    /// The order in which categories are reported.
    pub const ALL: [Category; 4] = [
        Category::Newsletter,
        Category::Notification,
        Category::Receipt,
        Category::Bulk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Newsletter => "Newsletter",
            Category::Notification => "Notification",
            Category::Receipt => "Receipt",
            Category::Bulk => "Bulk",
        }
    }

    fn describe(self, pattern: &EmailPattern) -> String {
        let domain = &pattern.from_domain;
        let count = pattern.count;
        match self {
            Category::Newsletter => {
                format!("Auto-archive newsletters from {} (found {})", domain, count)
            }
            Category::Notification => {
                format!("Auto-label notifications from {} (found {})", domain, count)
            }
            Category::Receipt => format!("File receipts from {} (found {})", domain, count),
            Category::Bulk => format!("Bulk emails from {} (found {})", domain, count),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Archive,
    MarkRead,
    MarkImportant,
    MarkSpam,
}

impl Effect {
    fn as_str(self) -> &'static str {
        match self {
            Effect::Archive => "archive",
            Effect::MarkRead => "markRead",
            Effect::MarkImportant => "markImportant",
            Effect::MarkSpam => "markSpam",
        }
    }
}

/// A filter action, rendered as e.g. `archive: true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub effect: Effect,
    pub value: bool,
}

impl Action {
    const fn new(effect: Effect, value: bool) -> Self {
        Action { effect, value }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.effect.as_str(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSuggestion {
    pub category: Category,
    pub description: String,
    pub query: String,
    pub actions: &'static [Action],
    pub priority: usize,
}

struct Rule {
    category: Category,
    matches: fn(&EmailPattern) -> bool,
    query: fn(&EmailPattern) -> String,
    actions: &'static [Action],
}

/// Classification rules, the first matching one wins.
const RULES: &[Rule] = &[
    Rule {
        category: Category::Newsletter,
        matches: is_newsletter,
        query: newsletter_query,
        actions: &[
            Action::new(Effect::Archive, true),
            Action::new(Effect::MarkRead, true),
            Action::new(Effect::MarkImportant, false),
        ],
    },
    Rule {
        category: Category::Notification,
        matches: is_notification,
        query: domain_query,
        actions: &[
            Action::new(Effect::Archive, true),
            Action::new(Effect::MarkRead, true),
            Action::new(Effect::MarkSpam, false),
        ],
    },
    Rule {
        category: Category::Receipt,
        matches: is_receipt,
        query: domain_query,
        actions: &[Action::new(Effect::Archive, true)],
    },
    Rule {
        category: Category::Bulk,
        matches: is_bulk,
        query: domain_query,
        actions: &[Action::new(Effect::MarkImportant, false)],
    },
];

pub const DEFAULT_MIN_COUNT: usize = 5;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

fn is_newsletter(pattern: &EmailPattern) -> bool {
    !pattern.list_id.is_empty() || contains_any(&pattern.subject_example, &["newsletter"])
}

fn is_notification(pattern: &EmailPattern) -> bool {
    contains_any(&pattern.from_domain, &["notification", "noreply"])
        || contains_any(&pattern.subject_example, &["notification"])
}

fn is_receipt(pattern: &EmailPattern) -> bool {
    contains_any(
        &pattern.subject_example,
        &["receipt", "invoice", "order confirmation"],
    )
}

fn is_bulk(_: &EmailPattern) -> bool {
    true
}

fn domain_query(pattern: &EmailPattern) -> String {
    format!("from:@{}", pattern.from_domain)
}

fn newsletter_query(pattern: &EmailPattern) -> String {
    if pattern.list_id.is_empty() {
        domain_query(pattern)
    } else {
        format!("list:{}", extract_list_address(&pattern.list_id))
    }
}

/// Extracts the address from a `List-Id` header of the form `Name <address>`.
/// The value is returned unchanged if it has no such brackets.
pub fn extract_list_address(list_id: &str) -> &str {
    if let Some(start) = list_id.find('<') {
        if let Some(len) = list_id[start + 1..].find('>') {
            return &list_id[start + 1..start + 1 + len];
        }
    }
    list_id
}

/// Suggests a filter for the pattern, unless it has fewer than `min_count`
/// messages.
pub fn classify(pattern: &EmailPattern, min_count: usize) -> Option<PatternSuggestion> {
    if pattern.count < min_count {
        return None;
    }
    let rule = RULES.iter().find(|rule| (rule.matches)(pattern))?;
    Some(PatternSuggestion {
        category: rule.category,
        description: rule.category.describe(pattern),
        query: (rule.query)(pattern),
        actions: rule.actions,
        priority: pattern.count,
    })
}

pub fn suggest(patterns: &[EmailPattern], min_count: usize) -> Vec<PatternSuggestion> {
    patterns
        .iter()
        .filter_map(|pattern| classify(pattern, min_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(from_domain: &str, subject: &str, list_id: &str, count: usize) -> EmailPattern {
        EmailPattern {
            from_domain: from_domain.to_string(),
            from_email_example: format!("someone@{}", from_domain),
            subject_example: subject.to_string(),
            list_id: list_id.to_string(),
            count,
            message_ids: (0..count).map(|i| i.to_string()).collect(),
        }
    }

    fn category_of(from_domain: &str, subject: &str, list_id: &str) -> Category {
        classify(&pattern(from_domain, subject, list_id, 5), 5)
            .unwrap()
            .category
    }

    #[test]
    fn test_extract_list_address() {
        assert_eq!(
            extract_list_address("Tech News <news@lists.example.com>"),
            "news@lists.example.com"
        );
        assert_eq!(
            extract_list_address("malformed-no-brackets"),
            "malformed-no-brackets"
        );
        assert_eq!(extract_list_address("<list@newsletter.io>"), "list@newsletter.io");
        assert_eq!(extract_list_address("open <only"), "open <only");
        assert_eq!(extract_list_address("a > b <c>"), "c");
        assert_eq!(extract_list_address(""), "");
    }

    #[test]
    fn test_threshold() {
        let p = pattern("example.com", "hello", "", 4);
        assert_eq!(classify(&p, 5), None);
        let p = pattern("example.com", "hello", "", 5);
        assert!(classify(&p, 5).is_some());
        let p = pattern("example.com", "hello", "", 1);
        assert!(classify(&p, 1).is_some());
    }

    #[test]
    fn test_newsletter() {
        let s = classify(&pattern("news.io", "Hi", "News <list@news.io>", 7), 5).unwrap();
        assert_eq!(
            s,
            PatternSuggestion {
                category: Category::Newsletter,
                description: "Auto-archive newsletters from news.io (found 7)".to_string(),
                query: "list:list@news.io".to_string(),
                actions: &[
                    Action { effect: Effect::Archive, value: true },
                    Action { effect: Effect::MarkRead, value: true },
                    Action { effect: Effect::MarkImportant, value: false },
                ],
                priority: 7,
            }
        );

        let s = classify(&pattern("news.io", "Our NEWSLETTER", "", 5), 5).unwrap();
        assert_eq!(s.category, Category::Newsletter);
        assert_eq!(s.query, "from:@news.io");
    }

    #[test]
    fn test_notification() {
        let s = classify(&pattern("noreply.github.com", "Push", "", 5), 5).unwrap();
        assert_eq!(s.category, Category::Notification);
        assert_eq!(s.query, "from:@noreply.github.com");
        assert_eq!(
            s.actions
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>(),
            ["archive: true", "markRead: true", "markSpam: false"]
        );
        assert_eq!(
            category_of("Notifications.example.com", "", ""),
            Category::Notification
        );
        assert_eq!(
            category_of("example.com", "New Notification", ""),
            Category::Notification
        );
    }

    #[test]
    fn test_receipt() {
        assert_eq!(category_of("shop.com", "Your receipt", ""), Category::Receipt);
        assert_eq!(category_of("shop.com", "INVOICE #12", ""), Category::Receipt);
        assert_eq!(
            category_of("shop.com", "Order Confirmation 42", ""),
            Category::Receipt
        );
        let s = classify(&pattern("shop.com", "receipt", "", 9), 5).unwrap();
        assert_eq!(s.description, "File receipts from shop.com (found 9)");
        assert_eq!(s.actions, &[Action { effect: Effect::Archive, value: true }]);
    }

    #[test]
    fn test_bulk() {
        let s = classify(&pattern("", "Hello", "", 5), 5).unwrap();
        assert_eq!(s.category, Category::Bulk);
        assert_eq!(s.query, "from:@");
        assert_eq!(s.description, "Bulk emails from  (found 5)");
        assert_eq!(s.actions, &[Action { effect: Effect::MarkImportant, value: false }]);
    }

    #[test]
    fn test_precedence() {
        // Newsletter wins over notification.
        assert_eq!(
            category_of("noreply.com", "notification", "<l@noreply.com>"),
            Category::Newsletter
        );
        assert_eq!(
            category_of("noreply.com", "Newsletter", ""),
            Category::Newsletter
        );
        // Notification wins over receipt.
        assert_eq!(
            category_of("noreply.shop.com", "Receipt", ""),
            Category::Notification
        );
    }

    #[test]
    fn test_suggest() {
        let patterns = vec![
            pattern("newsletter.io", "", "<list@newsletter.io>", 6),
            pattern("noreply.biz", "Account notification", "", 4),
        ];
        let suggestions = suggest(&patterns, DEFAULT_MIN_COUNT);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, Category::Newsletter);
        assert_eq!(suggestions[0].query, "list:list@newsletter.io");
        assert_eq!(suggestions[0].priority, 6);
    }
}
