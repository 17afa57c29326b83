use crate::args::Config;
use crate::datetime::parse_datetime;
use crate::error::{Error, FetchError, Result};
use crate::utils;
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header metadata of a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMetadataRecord {
    pub message_id: String,
    pub from: String,
    pub subject: String,
    /// Empty when the message has no `List-Id` header.
    pub list_id: String,
}

pub type FetchResult = std::result::Result<EmailMetadataRecord, FetchError>;

type DatedResult = std::result::Result<(EmailMetadataRecord, DateTime<Utc>), FetchError>;

const MAILDIR_SUBDIRS: &[&str] = &["new", "cur"];

#[derive(Debug, Default, PartialEq)]
struct Headers {
    from: Option<String>,
    subject: Option<String>,
    list_id: Option<String>,
    date: Option<String>,
}

impl Headers {
    fn store(&mut self, name: &str, value: String) {
        let slot = match name.trim().to_ascii_lowercase().as_str() {
            "from" => &mut self.from,
            "subject" => &mut self.subject,
            "list-id" => &mut self.list_id,
            "date" => &mut self.date,
            _ => return,
        };
        // Only the first occurrence counts.
        if slot.is_none() {
            *slot = Some(value.trim().to_string());
        }
    }
}

/// Reads the header block, stopping at the first empty line.
fn read_headers(reader: impl BufRead) -> io::Result<Headers> {
    let mut headers = Headers::default();
    let mut current: Option<(String, String)> = None;
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            // Continuation of a folded header.
            if let Some((_, value)) = current.as_mut() {
                value.push_str(line);
            }
            continue;
        }
        if let Some((name, value)) = current.take() {
            headers.store(&name, value);
        }
        if let Some(pos) = line.find(':') {
            current = Some((line[..pos].to_string(), line[pos + 1..].to_string()));
        }
    }
    if let Some((name, value)) = current {
        headers.store(&name, value);
    }
    Ok(headers)
}

fn get_message_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_message(path: &Path) -> DatedResult {
    let message_id = get_message_id(path);
    let read = || -> io::Result<_> {
        let file = File::open(path)?;
        let headers = read_headers(BufReader::new(file))?;
        let date = match headers.date.as_ref().and_then(|d| parse_datetime(d.as_bytes())) {
            Some(dt) => dt.with_timezone(&Utc),
            // Fall back to the delivery time.
            None => DateTime::<Utc>::from(fs::metadata(path)?.modified()?),
        };
        Ok((headers, date))
    };
    match read() {
        Ok((headers, date)) => {
            let record = EmailMetadataRecord {
                message_id,
                from: headers.from.unwrap_or_default(),
                subject: headers.subject.unwrap_or_default(),
                list_id: headers.list_id.unwrap_or_default(),
            };
            Ok((record, date))
        }
        Err(source) => Err(FetchError { message_id, source }),
    }
}

fn list_files(maildir: &Path) -> Result<Vec<PathBuf>> {
    let config_error = |reason: String| Error::Configuration {
        path: maildir.to_path_buf(),
        reason,
    };
    if !maildir.is_dir() {
        return Err(config_error("not a directory".to_string()));
    }

    let mut files = vec![];
    let mut found = false;
    for subdir in MAILDIR_SUBDIRS {
        let dir = maildir.join(subdir);
        if !dir.is_dir() {
            continue;
        }
        found = true;
        let entries = fs::read_dir(&dir).map_err(|e| config_error(e.to_string()))?;
        for entry in entries {
            let path = entry?.path();
            if !get_message_id(&path).starts_with('.') {
                files.push(path);
            }
        }
    }
    if !found {
        return Err(config_error("neither new nor cur exists".to_string()));
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    Ok(files)
}

/// Applies the day window and the message cap.
///
/// Messages are ordered newest first, ties keeping their file name order.
/// Fetch errors are kept regardless so every failure gets reported.
fn select(messages: Vec<DatedResult>, now: DateTime<Utc>, config: &Config) -> Vec<FetchResult> {
    let cutoff = Duration::try_days(i64::from(config.days_window))
        .and_then(|days| now.checked_sub_signed(days));
    let mut errors = vec![];
    let mut records = vec![];
    for message in messages {
        match message {
            Ok((record, date)) => {
                if cutoff.map_or(true, |cutoff| date >= cutoff) {
                    records.push((record, date));
                }
            }
            Err(e) => errors.push(Err(e)),
        }
    }
    records.sort_by(|a, b| b.1.cmp(&a.1));
    records.truncate(config.max_messages);
    errors
        .into_iter()
        .chain(records.into_iter().map(|(record, _)| Ok(record)))
        .collect()
}

/// Reads the metadata of the messages in the maildir.
///
/// An unusable maildir is an error; a message which fails to read is
/// returned as a `FetchError` item instead.
pub fn list_emails(config: &Config) -> Result<Vec<FetchResult>> {
    let files = list_files(&config.maildir)?;

    // There is no email, just return.
    if files.is_empty() {
        return Ok(vec![]);
    }

    debug!(
        query = %config.search_query(),
        files = files.len(),
        "selecting messages"
    );
    let progress = utils::create_progress_bar(config, files.len());
    let messages = files
        .into_par_iter()
        .enumerate()
        .map(|(i, path)| {
            let message = read_message(&path);
            if i % 128 == 127 {
                progress.inc(128);
            }
            message
        })
        .collect();
    progress.finish_and_clear();

    Ok(select(messages, Utc::now(), config))
}
