//! Streaming parser for persisted counts files.
//!
//! The capture layer writes one file per context (send, recv). Each file is
//! a sequence of blocks:
//!
//! ```text
//! Number of ranks: <commSize>
//! Alltoallv calls <startCall>-<endCallInclusive>
//! Count: <n> calls - <call indices>[... (<k> more call(s) was/were profiled but not tracked)]
//!
//! BEGINNING DATA
//! Rank(s) <compressed-rank-list>: <counter values>
//! ...
//! END DATA
//! ```
//!
//! Parsing is strict and all-or-nothing per block: a malformed line aborts
//! the file with an error naming the file and the offending block. Archived
//! captures may put a `# Raw counters` heading before each header and a
//! `Datatype size:` line after `Number of ranks:`; both are accepted.

use super::schema::{CountRecord, CountsBlock, RankCounters};
use crate::notation;
use crate::utils::config::{DATA_SECTION_END, DATA_SECTION_START};
use crate::utils::config::{recv_counts_file_prefix, send_counts_file_prefix};
use crate::utils::error::{LookupError, ReadError};
use log::debug;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Forward-only reader over the blocks of one counts file
///
/// Implements `Iterator<Item = Result<CountsBlock, ReadError>>`. The
/// stream cannot be rewound; re-reading requires reopening the source.
pub struct CountsReader<R: BufRead> {
    reader: R,
    path: String,
}

impl CountsReader<BufReader<File>> {
    /// Open a counts file for streaming
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|e| ReadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.display().to_string(),
        })
    }
}

impl<R: BufRead> CountsReader<R> {
    /// Wrap an in-memory reader; `label` stands in for the file path in errors
    pub fn from_reader(reader: R, label: &str) -> Self {
        Self {
            reader,
            path: label.to_string(),
        }
    }

    /// Parse the next block, or `None` at a clean end of file
    pub fn next_block(&mut self) -> Result<Option<CountsBlock>, ReadError> {
        let first = match self.next_meaningful_line()? {
            Some(line) => line,
            None => return Ok(None),
        };

        let header = self.parse_header(&first)?;
        let entries = self.parse_data_section(&header)?;
        let block = CountsBlock {
            comm_size: header.comm_size,
            datatype_size: header.datatype_size,
            first_call: header.first_call,
            last_call: header.last_call,
            num_calls: header.num_calls,
            calls: header.calls,
            entries,
        };
        self.validate_partition(&block)?;

        debug!(
            "{}: parsed block for calls {}-{} ({} counters line(s))",
            self.path,
            block.first_call,
            block.last_call,
            block.entries.len()
        );
        Ok(Some(block))
    }

    /// Next line that is neither blank nor a `# ` comment heading
    fn next_meaningful_line(&mut self) -> Result<Option<String>, ReadError> {
        loop {
            match self.read_line()? {
                None => return Ok(None),
                Some(line) => {
                    let trimmed = line.trim_end();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    return Ok(Some(trimmed.to_string()));
                }
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, ReadError> {
        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| ReadError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(buf))
        }
    }

    fn header_error(&self, reason: impl Into<String>) -> ReadError {
        ReadError::MalformedHeader {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn block_error(&self, header: &BlockHeader, reason: impl Into<String>) -> ReadError {
        self.block_error_at(header.first_call, header.last_call, reason)
    }

    fn block_error_at(&self, first: u32, last: u32, reason: impl Into<String>) -> ReadError {
        ReadError::MalformedBlock {
            path: self.path.clone(),
            first,
            last,
            reason: reason.into(),
        }
    }

    /// Parse the header lines, starting from the already-read first line
    fn parse_header(&mut self, first: &str) -> Result<BlockHeader, ReadError> {
        let comm_size: usize = parse_prefixed(first, "Number of ranks: ")
            .ok_or_else(|| self.header_error(format!("expected 'Number of ranks:', got '{}'", first)))?
            .map_err(|v| self.header_error(format!("invalid rank count '{}'", v)))?;

        let mut line = self
            .next_meaningful_line()?
            .ok_or_else(|| self.header_error("unexpected end of file after 'Number of ranks:'"))?;

        // Newer captures record the element size; default to 1 when absent
        let mut datatype_size: u64 = 1;
        if let Some(parsed) = parse_prefixed(&line, "Datatype size: ") {
            datatype_size =
                parsed.map_err(|v| self.header_error(format!("invalid datatype size '{}'", v)))?;
            line = self
                .next_meaningful_line()?
                .ok_or_else(|| self.header_error("unexpected end of file after 'Datatype size:'"))?;
        }

        let range = line
            .strip_prefix("Alltoallv calls ")
            .ok_or_else(|| self.header_error(format!("expected 'Alltoallv calls', got '{}'", line)))?;
        let (first_call, last_call) = parse_call_range(range)
            .ok_or_else(|| self.header_error(format!("invalid call range '{}'", range)))?;

        let count_line = self
            .next_meaningful_line()?
            .ok_or_else(|| self.header_error("unexpected end of file before 'Count:'"))?;
        let (num_calls, calls) = self.parse_count_line(&count_line)?;

        Ok(BlockHeader {
            comm_size,
            datatype_size,
            first_call,
            last_call,
            num_calls,
            calls,
        })
    }

    /// Parse `Count: <n> calls - <indices>[... (<k> more ...)]`
    fn parse_count_line(&self, line: &str) -> Result<(usize, Vec<u32>), ReadError> {
        let rest = line
            .strip_prefix("Count: ")
            .ok_or_else(|| self.header_error(format!("expected 'Count:', got '{}'", line)))?;
        let (n_str, rest) = rest
            .split_once(" calls - ")
            .ok_or_else(|| self.header_error(format!("malformed count line '{}'", line)))?;
        let num_calls: usize = n_str
            .parse()
            .map_err(|_| self.header_error(format!("invalid call count '{}'", n_str)))?;

        // The enumeration may be capped, with the remainder summarized as
        // "... (<k> more call(s) was/were profiled but not tracked)"
        let (listed, untracked) = match rest.split_once("... (") {
            Some((listed, suffix)) => {
                let k_str = suffix
                    .split_once(" more")
                    .map(|(k, _)| k)
                    .ok_or_else(|| self.header_error(format!("malformed count suffix '{}'", suffix)))?;
                let k: usize = k_str
                    .parse()
                    .map_err(|_| self.header_error(format!("invalid untracked count '{}'", k_str)))?;
                (listed, Some(k))
            }
            None => (rest, None),
        };

        let mut calls = Vec::new();
        for token in listed.split_whitespace() {
            let call: u32 = token
                .parse()
                .map_err(|_| self.header_error(format!("invalid call index '{}'", token)))?;
            calls.push(call);
        }

        // The true count must add up, whether or not the list is capped
        let accounted = calls.len() + untracked.unwrap_or(0);
        if accounted != num_calls {
            return Err(self.header_error(format!(
                "count announces {} call(s) but {} are accounted for",
                num_calls, accounted
            )));
        }

        Ok((num_calls, calls))
    }

    /// Parse the `BEGINNING DATA` .. `END DATA` section
    fn parse_data_section(&mut self, header: &BlockHeader) -> Result<Vec<RankCounters>, ReadError> {
        let marker = self
            .next_meaningful_line()?
            .ok_or_else(|| self.truncated(header))?;
        if marker != DATA_SECTION_START {
            return Err(self.block_error(
                header,
                format!("expected '{}', got '{}'", DATA_SECTION_START, marker),
            ));
        }

        let mut entries = Vec::new();
        loop {
            let line = match self.read_line()? {
                Some(line) => line.trim_end().to_string(),
                None => return Err(self.truncated(header)),
            };
            if line.is_empty() {
                continue;
            }
            if line == DATA_SECTION_END {
                break;
            }
            // A new header before the terminator means the block was cut short
            if line.starts_with("Number of ranks:") || line.starts_with('#') {
                return Err(self.truncated(header));
            }
            entries.push(self.parse_counters_line(header, &line)?);
        }

        Ok(entries)
    }

    /// Parse one `Rank(s) <list>: <values>` line
    fn parse_counters_line(
        &self,
        header: &BlockHeader,
        line: &str,
    ) -> Result<RankCounters, ReadError> {
        let rest = line.strip_prefix("Rank(s) ").ok_or_else(|| {
            self.block_error(header, format!("expected a 'Rank(s)' line, got '{}'", line))
        })?;
        let (rank_list, values) = rest
            .split_once(": ")
            .ok_or_else(|| self.block_error(header, format!("malformed counters line '{}'", line)))?;

        let ranks = notation::decompress(rank_list)
            .map_err(|e| self.block_error(header, format!("bad rank list '{}': {}", rank_list, e)))?;

        let mut counts = Vec::with_capacity(header.comm_size);
        for token in values.split_whitespace() {
            let value: u64 = token.parse().map_err(|_| {
                self.block_error(header, format!("non-numeric counter value '{}'", token))
            })?;
            counts.push(value);
        }

        if counts.len() != header.comm_size {
            return Err(self.block_error(
                header,
                format!(
                    "counters line for rank(s) {} has {} value(s), expected {}",
                    rank_list,
                    counts.len(),
                    header.comm_size
                ),
            ));
        }

        Ok(RankCounters { ranks, counts })
    }

    /// Check that the rank sets partition `0..comm_size` exactly
    fn validate_partition(&self, block: &CountsBlock) -> Result<(), ReadError> {
        let (first, last) = (block.first_call, block.last_call);

        let mut seen = vec![false; block.comm_size];
        for entry in &block.entries {
            for &rank in &entry.ranks {
                let idx = rank as usize;
                if idx >= block.comm_size {
                    return Err(self.block_error_at(
                        first,
                        last,
                        format!(
                            "rank {} is outside the communicator of size {}",
                            rank, block.comm_size
                        ),
                    ));
                }
                if seen[idx] {
                    return Err(self.block_error_at(
                        first,
                        last,
                        format!("rank {} appears on more than one counters line", rank),
                    ));
                }
                seen[idx] = true;
            }
        }
        if let Some(missing) = seen.iter().position(|covered| !covered) {
            return Err(self.block_error_at(
                first,
                last,
                format!("no counters line covers rank {}", missing),
            ));
        }
        Ok(())
    }

    fn truncated(&self, header: &BlockHeader) -> ReadError {
        ReadError::Truncated {
            path: self.path.clone(),
            first: header.first_call,
            last: header.last_call,
        }
    }
}

impl<R: BufRead> Iterator for CountsReader<R> {
    type Item = Result<CountsBlock, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Header fields of one block, before its data section is read
struct BlockHeader {
    comm_size: usize,
    datatype_size: u64,
    first_call: u32,
    last_call: u32,
    num_calls: usize,
    calls: Vec<u32>,
}

fn parse_prefixed<T: std::str::FromStr>(line: &str, prefix: &str) -> Option<Result<T, String>> {
    let rest = line.strip_prefix(prefix)?;
    Some(rest.trim().parse::<T>().map_err(|_| rest.trim().to_string()))
}

fn parse_call_range(range: &str) -> Option<(u32, u32)> {
    let (first, last) = range.trim().split_once('-')?;
    let first = first.parse().ok()?;
    let last = last.parse().ok()?;
    if first > last {
        return None;
    }
    Some((first, last))
}

/// Lazy stream of per-call records assembled from both contexts
///
/// Pairs the send-context file with the receive-context file block by
/// block and emits one `CountRecord` per tracked call index. The two
/// files must agree on communicator size and call set for every block.
pub struct RecordStream<R: BufRead> {
    send: CountsReader<R>,
    recv: CountsReader<R>,
    queue: VecDeque<CountRecord>,
}

impl RecordStream<BufReader<File>> {
    /// Open the send/recv counts files of one job
    pub fn open(send_path: &Path, recv_path: &Path) -> Result<Self, ReadError> {
        Ok(Self::new(
            CountsReader::open(send_path)?,
            CountsReader::open(recv_path)?,
        ))
    }
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(send: CountsReader<R>, recv: CountsReader<R>) -> Self {
        Self {
            send,
            recv,
            queue: VecDeque::new(),
        }
    }

    /// Pull the next block pair; false at a clean end of both files
    fn refill(&mut self) -> Result<bool, ReadError> {
        let send_block = self.send.next_block()?;
        let recv_block = self.recv.next_block()?;

        let (send_block, recv_block) = match (send_block, recv_block) {
            (None, None) => return Ok(false),
            (Some(s), Some(r)) => (s, r),
            _ => {
                return Err(self.mismatch("the files contain different numbers of blocks"));
            }
        };

        if send_block.comm_size != recv_block.comm_size {
            return Err(self.mismatch(format!(
                "communicator sizes differ ({} vs. {})",
                send_block.comm_size, recv_block.comm_size
            )));
        }
        if send_block.calls != recv_block.calls || send_block.num_calls != recv_block.num_calls {
            return Err(self.mismatch(format!(
                "blocks for calls {}-{} cover different call sets",
                send_block.first_call, send_block.last_call
            )));
        }

        for &call_index in &send_block.calls {
            self.queue.push_back(CountRecord {
                call_index,
                comm_size: send_block.comm_size,
                send_datatype_size: send_block.datatype_size,
                recv_datatype_size: recv_block.datatype_size,
                send_counters: send_block.entries.clone(),
                recv_counters: recv_block.entries.clone(),
            });
        }
        Ok(true)
    }

    fn mismatch(&self, reason: impl Into<String>) -> ReadError {
        ReadError::ContextMismatch {
            send: self.send.path.clone(),
            recv: self.recv.path.clone(),
            reason: reason.into(),
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<CountRecord, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.queue.pop_front() {
                return Some(Ok(record));
            }
            match self.refill() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Locate the send/recv counts files of a job inside a directory
///
/// Files are matched by the `send-counters.job<id>.` / `recv-counters.job<id>.`
/// prefixes; exactly one pair per job is expected.
pub fn locate_counts_files(dir: &Path, job_id: u32) -> Result<(PathBuf, PathBuf), LookupError> {
    let send_prefix = send_counts_file_prefix(job_id);
    let recv_prefix = recv_counts_file_prefix(job_id);
    let mut send_path: Option<PathBuf> = None;
    let mut recv_path: Option<PathBuf> = None;

    let listing = std::fs::read_dir(dir).map_err(|e| {
        LookupError::Read(ReadError::Io {
            path: dir.display().to_string(),
            source: e,
        })
    })?;
    for entry in listing {
        let entry = entry.map_err(|e| {
            LookupError::Read(ReadError::Io {
                path: dir.display().to_string(),
                source: e,
            })
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&send_prefix) {
            send_path = Some(entry.path());
        } else if name.starts_with(&recv_prefix) {
            recv_path = Some(entry.path());
        }
    }

    match (send_path, recv_path) {
        (Some(send), Some(recv)) => Ok((send, recv)),
        _ => Err(LookupError::CountsFilesNotFound {
            job_id,
            dir: dir.display().to_string(),
        }),
    }
}

/// Look up the literal counter strings of one rank during one call
///
/// **Public** - entry point for the validation collaborator
///
/// Scans the job's counts files for the block covering `call`, then the
/// counters line whose rank set contains `rank`. Returns the send and recv
/// counter values exactly as the capture layer persisted them (space
/// separated), for comparison against independently captured validation
/// data.
///
/// # Errors
/// * `LookupError::CountsFilesNotFound` - no counts files for the job
/// * `LookupError::CallNotFound` - no block covers the call
/// * `LookupError::RankNotFound` - no counters line covers the rank
pub fn find_rank_call_counters(
    dir: &Path,
    job_id: u32,
    rank: u32,
    call: u32,
) -> Result<(String, String), LookupError> {
    let (send_path, recv_path) = locate_counts_files(dir, job_id)?;
    let send = find_in_file(&send_path, rank, call)?;
    let recv = find_in_file(&recv_path, rank, call)?;
    Ok((send, recv))
}

/// Scan one counts file for the counters of (rank, call)
pub fn find_in_file(path: &Path, rank: u32, call: u32) -> Result<String, LookupError> {
    let mut reader = CountsReader::open(path)?;
    while let Some(block) = reader.next_block()? {
        if !block.covers_call(call) {
            continue;
        }
        debug!(
            "{}: call {} found in block {}-{}",
            path.display(),
            call,
            block.first_call,
            block.last_call
        );
        return match block.counters_for_rank(rank) {
            Some(entry) => Ok(entry.counters_string()),
            None => Err(LookupError::RankNotFound { rank, call }),
        };
    }
    Err(LookupError::CallNotFound(call))
}

/// Total bytes sent and received by one rank during one call
pub fn call_rank_volumes(
    dir: &Path,
    job_id: u32,
    rank: u32,
    call: u32,
) -> Result<(u64, u64), LookupError> {
    let (send_path, recv_path) = locate_counts_files(dir, job_id)?;
    Ok((
        volume_in_file(&send_path, rank, call)?,
        volume_in_file(&recv_path, rank, call)?,
    ))
}

fn volume_in_file(path: &Path, rank: u32, call: u32) -> Result<u64, LookupError> {
    let mut reader = CountsReader::open(path)?;
    while let Some(block) = reader.next_block()? {
        if !block.covers_call(call) {
            continue;
        }
        return match block.counters_for_rank(rank) {
            Some(entry) => Ok(entry.total() * block.datatype_size),
            None => Err(LookupError::RankNotFound { rank, call }),
        };
    }
    Err(LookupError::CallNotFound(call))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(contents: &str) -> CountsReader<Cursor<&str>> {
        CountsReader::from_reader(Cursor::new(contents), "test-input")
    }

    const SIMPLE: &str = "Number of ranks: 4\n\
                          Alltoallv calls 0-1\n\
                          Count: 2 calls - 0 1 \n\
                          \n\
                          BEGINNING DATA\n\
                          Rank(s) 0-3: 1 1 1 1 \n\
                          END DATA\n";

    #[test]
    fn test_parse_simple_block() {
        let block = reader(SIMPLE).next_block().unwrap().unwrap();
        assert_eq!(block.comm_size, 4);
        assert_eq!(block.datatype_size, 1);
        assert_eq!(block.first_call, 0);
        assert_eq!(block.last_call, 1);
        assert_eq!(block.num_calls, 2);
        assert_eq!(block.calls, vec![0, 1]);
        assert_eq!(block.entries.len(), 1);
        assert_eq!(block.entries[0].ranks, vec![0, 1, 2, 3]);
        assert_eq!(block.entries[0].counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_parse_with_heading_and_datatype_size() {
        let input = "# Raw counters\n\n\
                     Number of ranks: 2\n\
                     Datatype size: 8\n\
                     Alltoallv calls 4-4\n\
                     Count: 1 calls - 4 \n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0: 3 0 \n\
                     Rank(s) 1: 0 3 \n\
                     END DATA\n";
        let block = reader(input).next_block().unwrap().unwrap();
        assert_eq!(block.datatype_size, 8);
        assert_eq!(block.entries.len(), 2);
        assert_eq!(block.entries[1].ranks, vec![1]);
    }

    #[test]
    fn test_truncated_call_list() {
        let input = "Number of ranks: 1\n\
                     Alltoallv calls 0-9\n\
                     Count: 10 calls - 0 1 2 ... (7 more call(s) was/were profiled but not tracked)\n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0: 5 \n\
                     END DATA\n";
        let block = reader(input).next_block().unwrap().unwrap();
        assert_eq!(block.num_calls, 10);
        assert_eq!(block.calls, vec![0, 1, 2]);
        assert!(block.covers_call(7), "untracked calls fall back to the range");
        assert!(!block.covers_call(10));
    }

    #[test]
    fn test_call_count_mismatch() {
        let input = "Number of ranks: 1\n\
                     Alltoallv calls 0-2\n\
                     Count: 3 calls - 0 1 \n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0: 5 \n\
                     END DATA\n";
        assert!(matches!(
            reader(input).next_block(),
            Err(ReadError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_missing_end_data() {
        let input = "Number of ranks: 4\n\
                     Alltoallv calls 0-1\n\
                     Count: 2 calls - 0 1 \n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0-3: 1 1 1 1 \n";
        assert!(matches!(
            reader(input).next_block(),
            Err(ReadError::Truncated { first: 0, last: 1, .. })
        ));
    }

    #[test]
    fn test_wrong_counter_count() {
        let input = "Number of ranks: 4\n\
                     Alltoallv calls 0-0\n\
                     Count: 1 calls - 0 \n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0-3: 1 1 1 \n\
                     END DATA\n";
        assert!(matches!(
            reader(input).next_block(),
            Err(ReadError::MalformedBlock { .. })
        ));
    }

    #[test]
    fn test_non_numeric_counter() {
        let input = "Number of ranks: 2\n\
                     Alltoallv calls 0-0\n\
                     Count: 1 calls - 0 \n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0-1: 1 x \n\
                     END DATA\n";
        assert!(matches!(
            reader(input).next_block(),
            Err(ReadError::MalformedBlock { .. })
        ));
    }

    #[test]
    fn test_rank_set_must_partition() {
        // Rank 1 is covered twice, rank 2 not at all
        let input = "Number of ranks: 3\n\
                     Alltoallv calls 0-0\n\
                     Count: 1 calls - 0 \n\
                     \n\
                     BEGINNING DATA\n\
                     Rank(s) 0-1: 1 1 1 \n\
                     Rank(s) 1: 2 2 2 \n\
                     END DATA\n";
        assert!(matches!(
            reader(input).next_block(),
            Err(ReadError::MalformedBlock { .. })
        ));
    }

    #[test]
    fn test_multiple_blocks_stream() {
        let input = format!("{}{}", SIMPLE, SIMPLE.replace("0-1", "2-3").replace("0 1 ", "2 3 "));
        let blocks: Result<Vec<_>, _> = reader(&input).collect();
        let blocks = blocks.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].calls, vec![2, 3]);
    }

    #[test]
    fn test_record_stream_emits_per_call_records() {
        let send = reader(SIMPLE);
        let recv = reader(SIMPLE);
        let records: Result<Vec<_>, _> = RecordStream::new(send, recv).collect();
        let records = records.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].call_index, 0);
        assert_eq!(records[1].call_index, 1);
        assert_eq!(records[0].comm_size, 4);
        assert_eq!(records[0].send_counters, records[0].recv_counters);
    }

    #[test]
    fn test_record_stream_rejects_mismatched_contexts() {
        let send = reader(SIMPLE);
        let recv_input = SIMPLE.replace("Number of ranks: 4", "Number of ranks: 2")
            .replace("Rank(s) 0-3: 1 1 1 1 ", "Rank(s) 0-1: 1 1 ");
        let recv = CountsReader::from_reader(Cursor::new(recv_input.as_str()), "recv-input");
        let mut stream = RecordStream::new(send, recv);
        // First pull triggers the block pairing
        let first = stream.next().unwrap();
        assert!(matches!(first, Err(ReadError::ContextMismatch { .. })));
    }
}
