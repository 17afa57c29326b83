use crate::collect::{EmailMetadataRecord, FetchResult};
use std::collections::HashMap;
use tracing::warn;

/// A group of messages sharing sender domain and list identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPattern {
    pub from_domain: String,
    /// The example fields are taken from the first message of the group.
    pub from_email_example: String,
    pub subject_example: String,
    pub list_id: String,
    pub count: usize,
    pub message_ids: Vec<String>,
}

impl EmailPattern {
    fn new(record: EmailMetadataRecord, from_domain: String) -> Self {
        EmailPattern {
            from_domain,
            from_email_example: record.from,
            subject_example: record.subject,
            list_id: record.list_id,
            count: 1,
            message_ids: vec![record.message_id],
        }
    }
}

/// Extracts the domain from a `From` header, either `Name <user@domain>` or
/// a bare `user@domain`. Returns an empty string if there is no `@`.
pub fn extract_domain(from: &str) -> &str {
    let at = match from.rfind('@') {
        Some(pos) => pos,
        None => return "",
    };
    let rest = &from[at + 1..];
    match rest.find('>') {
        Some(end) => &rest[..end],
        None => rest,
    }
}

fn get_pattern_key(from_domain: &str, list_id: &str) -> String {
    format!("{}|{}", from_domain, list_id)
}

/// Groups records into patterns, most frequent first.
///
/// Patterns with equal count stay in the order they were first seen, so the
/// result is reproducible for identical input. Records which failed to be
/// fetched are skipped with a warning.
pub fn aggregate<I>(records: I) -> Vec<EmailPattern>
where
    I: IntoIterator<Item = FetchResult>,
{
    let mut patterns: Vec<EmailPattern> = vec![];
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(message_id = %e.message_id, "{}", e);
                continue;
            }
        };
        let from_domain = extract_domain(&record.from).to_string();
        let key = get_pattern_key(&from_domain, &record.list_id);
        match index.get(&key) {
            Some(&i) => {
                let pattern = &mut patterns[i];
                pattern.count += 1;
                pattern.message_ids.push(record.message_id);
            }
            None => {
                index.insert(key, patterns.len());
                patterns.push(EmailPattern::new(record, from_domain));
            }
        }
    }
    // Stable sort keeps the first-seen order among equal counts.
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    patterns
}
