use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use audec::auto_decompress;
use lazy_static::lazy_static;
use log::{debug, trace};
use nom::{character::complete::{space0, u32}, sequence::preceded};
use regex::Regex;
use thiserror::Error;

use crate::{
    event::{Event, HeaderBlock, LheEvent, LheRunInfo, Run, WeightRecord},
    parsing::{any_entry, double_entry, wgt_entry},
};

const MAX_RECORD_CHARS: usize = 200;

lazy_static! {
    static ref OPEN_TAG_RE: Regex =
        Regex::new(r"^\s*<(?P<tag>[A-Za-z_][\w.:-]*)(\s[^>]*?)?(?P<empty>/)?>").unwrap();
}

/// Reader for (potentially compressed) Les Houches Event Files
///
/// The run information is read from the file header on construction.
/// Iterating yields the events in file order.
pub struct FileReader {
    run_info: LheRunInfo,
    source: Box<dyn BufRead>,
}

impl FileReader {
    /// Open the Les Houches Event File at `path`
    pub fn try_new(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Reading Les Houches events from {path:?}");
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read Les Houches events from `reader`
    pub fn from_reader(reader: impl BufRead + 'static) -> Result<Self, Error> {
        let mut source = auto_decompress(reader);

        // everything up to the end of the init block
        let mut prefix = Vec::new();
        while !prefix.ends_with(b"</init>") {
            if source.read_until(b'>', &mut prefix)? == 0 {
                return Err(Error::MissingInit);
            }
        }
        let prefix = String::from_utf8(prefix)?;
        let headers = split_header(header_text(&prefix));
        debug!(
            "Found header blocks: {:?}",
            headers.iter().map(|h| h.tag()).collect::<Vec<_>>()
        );
        Ok(Self {
            run_info: LheRunInfo::new(headers),
            source,
        })
    }

    pub fn run_info(&self) -> &LheRunInfo {
        &self.run_info
    }

    /// Run with the given number and the run information of this file
    pub fn run(&self, number: u32) -> Run {
        Run::new(number, Some(self.run_info.clone()))
    }

    fn read_record(&mut self) -> Option<Result<String, Error>> {
        let mut record = Vec::new();
        while !record.ends_with(b"</event>") {
            match self.source.read_until(b'>', &mut record) {
                Ok(0) => {
                    if record.windows(6).any(|w| w == b"<event") {
                        let record = String::from_utf8_lossy(&record);
                        let record = take_chars(&record, MAX_RECORD_CHARS);
                        return Some(Err(Error::IncompleteRecord(record)));
                    }
                    return None;
                }
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }
        }
        let record = match String::from_utf8(record) {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        trace!("Read Les Houches Event record:\n{record}");
        Some(Ok(record))
    }
}

impl Iterator for FileReader {
    type Item = Result<Event, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record()
            .map(|r| r.and_then(|record| parse_event(&record)))
    }
}

/// Parse a single `<event>` record
///
/// Both the generator weight and the nominal LHE weight are set to
/// the XWGTUP entry of the record.
pub fn parse_event(record: &str) -> Result<Event, Error> {
    let body = record
        .find("<event")
        .and_then(|start| {
            let rest = &record[start..];
            rest.find('>').map(|end| &rest[(end + 1)..])
        })
        .ok_or_else(|| Error::NoEvent(take_chars(record, MAX_RECORD_CHARS)))?;
    let body = body.trim_start();

    // NUP IDPRUP XWGTUP SCALUP AQEDUP AQCDUP
    let (rest, _nup) = preceded(space0, u32)(body)?;
    let (rest, _idprup) = any_entry(rest)?;
    let (_, xwgtup) = double_entry(rest)?;

    let mut weights = Vec::new();
    let mut rest = body;
    while let Some(pos) = rest.find("<wgt") {
        let (remainder, (id, wgt)) = wgt_entry(&rest[pos..])?;
        weights.push(WeightRecord::new(id, wgt));
        rest = remainder;
    }
    Ok(Event::with_lhe(xwgtup, LheEvent::new(xwgtup, weights)))
}

fn header_text(prefix: &str) -> &str {
    let Some(start) = prefix.find("<header>") else {
        return "";
    };
    let header = &prefix[(start + "<header>".len())..];
    match header.find("</header>") {
        Some(end) => &header[..end],
        None => header,
    }
}

/// Split the content of the `<header>` into its top-level blocks
///
/// Each block holds the lines between its opening and closing tag.
/// Text on the same line as the tags is kept as a separate line.
pub fn split_header(header: &str) -> Vec<HeaderBlock> {
    let mut blocks = Vec::new();
    let mut lines = header.lines();
    while let Some(line) = lines.next() {
        let Some(caps) = OPEN_TAG_RE.captures(line) else {
            continue;
        };
        let tag = &caps["tag"];
        if caps.name("empty").is_some() {
            blocks.push(HeaderBlock::new(tag, Vec::new()));
            continue;
        }
        let closer = format!("</{tag}>");
        let rest = &line[caps.get(0).map_or(line.len(), |m| m.end())..];
        let mut content = Vec::new();
        if let Some(end) = rest.find(&closer) {
            push_nonblank(&mut content, &rest[..end]);
            blocks.push(HeaderBlock::new(tag, content));
            continue;
        }
        push_nonblank(&mut content, rest);
        for line in lines.by_ref() {
            if let Some(end) = line.find(&closer) {
                push_nonblank(&mut content, &line[..end]);
                break;
            }
            content.push(line.to_owned());
        }
        blocks.push(HeaderBlock::new(tag, content));
    }
    blocks
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn push_nonblank(lines: &mut Vec<String>, line: &str) {
    if !line.trim().is_empty() {
        lines.push(line.to_owned());
    }
}

/// Les Houches Event File error
#[derive(Debug, Error)]
pub enum Error {
    /// No `</init>` before the end of the input
    #[error("No `</init>` found before the end of the input")]
    MissingInit,
    /// Record without `<event>` tag
    #[error("No `<event>` tag in record {0}")]
    NoEvent(String),
    /// Input ended within an event record
    #[error("Incomplete event record {0}")]
    IncompleteRecord(String),
    /// Parse error
    #[error("Error parsing entry in event record: {0}")]
    ParseError(String),
    /// Invalid UTF-8
    #[error("Invalid UTF-8 in input")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// I/O error
    #[error("I/O error")]
    IOError(#[from] std::io::Error),
}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(source: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::ParseError(source.to_string())
    }
}
