mod parser;

use chrono::{DateTime, FixedOffset};
use combine::Parser;

/// Parses the value of a `Date:` header following RFC 5322 section 3.3.
///
/// This is more lenient than `DateTime::parse_from_rfc2822`, since mail in
/// the wild often does not follow the RFC strictly. In addition it accepts
/// * single digit hour / minute / second,
/// * comments, e.g. a trailing `(UTC)`, and
/// * `-0000`, treated as `+0000`.
///
/// Folding is not handled here; callers pass an already unfolded value.
pub fn parse_datetime(s: &[u8]) -> Option<DateTime<FixedOffset>> {
    match parser::date_time().parse(s) {
        Ok((dt, rest)) if rest.is_empty() => Some(dt),
        _ => None,
    }
}
