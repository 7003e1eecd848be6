//! Result aggregation and reporting.
//!
//! Folds per-case outcomes into one theory verdict. Precedence, highest
//! first: any error, any failure, all inconclusive, otherwise succeeded.
//! `NotRunnable` never comes out of the fold; it is decided before the first
//! case and reported instead of aggregation.

use std::fmt;
use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::EngineResult;
use crate::executor::{CaseOutcome, Execution};
use crate::value::{Value, ValueTuple};

/// Composite verdict of one theory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TheoryStatus {
    NotRunnable,
    Succeeded,
    Failed,
    Inconclusive,
    Errored,
}

impl fmt::Display for TheoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheoryStatus::NotRunnable => write!(f, "not runnable"),
            TheoryStatus::Succeeded => write!(f, "succeeded"),
            TheoryStatus::Failed => write!(f, "failed"),
            TheoryStatus::Inconclusive => write!(f, "inconclusive"),
            TheoryStatus::Errored => write!(f, "errored"),
        }
    }
}

/// How enumeration ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Every tuple was executed
    Exhausted,
    /// The runner's cancel token was set between cases
    Cancelled,
    /// A case raised a run-fatal fault
    Aborted(String),
}

/// Per-outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub success: u64,
    pub failure: u64,
    pub inconclusive: u64,
    pub error: u64,
}

impl Tally {
    pub fn record(&mut self, outcome: &CaseOutcome) {
        match outcome {
            CaseOutcome::Success => self.success += 1,
            CaseOutcome::Failure(_) => self.failure += 1,
            CaseOutcome::Inconclusive(_) => self.inconclusive += 1,
            CaseOutcome::Error(_) => self.error += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.failure + self.inconclusive + self.error
    }

    /// Composite status by precedence
    ///
    /// A fold over zero outcomes (cancelled before the first case) reached no
    /// assertions, so it is inconclusive.
    pub fn status(&self) -> TheoryStatus {
        if self.error > 0 {
            TheoryStatus::Errored
        } else if self.failure > 0 {
            TheoryStatus::Failed
        } else if self.success == 0 {
            TheoryStatus::Inconclusive
        } else {
            TheoryStatus::Succeeded
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        self.success += other.success;
        self.failure += other.failure;
        self.inconclusive += other.inconclusive;
        self.error += other.error;
    }
}

/// One executed case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub index: u64,
    pub tuple: ValueTuple,
    pub outcome: CaseOutcome,
    pub elapsed: Duration,
}

/// Incremental fold over executed cases
#[derive(Clone)]
pub struct Aggregator {
    name: String,
    records: Vec<CaseRecord>,
    tally: Tally,
    hasher: Sha256,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("name", &self.name)
            .field("cases", &self.records.len())
            .field("tally", &self.tally)
            .finish()
    }
}

impl Aggregator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
            tally: Tally::default(),
            hasher: Sha256::new(),
        }
    }

    /// Fold one executed case
    pub fn push(&mut self, tuple: ValueTuple, execution: Execution) {
        let index = self.records.len() as u64;
        self.tally.record(&execution.outcome);
        self.hasher.update(encode_tuple(&tuple));
        self.records.push(CaseRecord {
            index,
            tuple,
            outcome: execution.outcome,
            elapsed: execution.elapsed,
        });
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self, completion: Completion) -> TheoryResult {
        let status = match completion {
            Completion::Aborted(_) => TheoryStatus::Errored,
            _ => self.tally.status(),
        };
        TheoryResult {
            name: self.name,
            status,
            records: self.records,
            tally: self.tally,
            completion: Some(completion),
            not_runnable: None,
            fingerprint: Some(hex::encode(self.hasher.finalize())),
        }
    }
}

/// Canonical little-endian encoding of a tuple, for fingerprinting
pub fn encode_tuple(tuple: &ValueTuple) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u32(&mut buf, tuple.len() as u32);
    for value in tuple.values() {
        encode_value(&mut buf, value);
    }
    buf
}

fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.push(0),
        Value::Bool(b) => {
            buf.push(1);
            buf.push(u8::from(*b));
        }
        Value::Int(i) => {
            buf.push(2);
            let mut word = [0u8; 8];
            LittleEndian::write_i64(&mut word, *i);
            buf.extend_from_slice(&word);
        }
        Value::Float(x) => {
            buf.push(3);
            let mut word = [0u8; 8];
            LittleEndian::write_u64(&mut word, x.to_bits());
            buf.extend_from_slice(&word);
        }
        Value::Str(s) => {
            buf.push(4);
            put_str(buf, s);
        }
        Value::Enum { type_name, member } => {
            buf.push(5);
            put_str(buf, type_name);
            put_str(buf, member);
        }
        Value::Instance { class, repr } => {
            buf.push(6);
            put_str(buf, class);
            put_str(buf, repr);
        }
    }
}

fn put_u32(buf: &mut Vec<u8>, n: u32) {
    let mut word = [0u8; 4];
    LittleEndian::write_u32(&mut word, n);
    buf.extend_from_slice(&word);
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

/// The verdict of one theory plus per-case detail
#[derive(Debug, Clone, PartialEq)]
pub struct TheoryResult {
    pub name: String,
    pub status: TheoryStatus,
    pub records: Vec<CaseRecord>,
    pub tally: Tally,
    /// `None` when the theory never started
    pub completion: Option<Completion>,
    /// Why the theory could not run
    pub not_runnable: Option<String>,
    /// SHA-256 over the executed tuple sequence
    pub fingerprint: Option<String>,
}

impl TheoryResult {
    /// Structural verdict reported instead of aggregation
    pub fn not_runnable(name: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            status: TheoryStatus::NotRunnable,
            records: Vec::new(),
            tally: Tally::default(),
            completion: None,
            not_runnable: Some(reason),
            fingerprint: None,
        }
    }

    /// Number of executed cases
    pub fn case_count(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn is_runnable(&self) -> bool {
        self.status != TheoryStatus::NotRunnable
    }

    pub fn tuples(&self) -> impl Iterator<Item = &ValueTuple> {
        self.records.iter().map(|r| &r.tuple)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.records.iter().map(|r| &r.outcome)
    }

    /// Records that did not succeed and were not inconclusive
    pub fn problems(&self) -> impl Iterator<Item = &CaseRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome.is_failure() || r.outcome.is_error())
    }

    pub fn report(&self) -> TheoryReport {
        TheoryReport {
            name: self.name.clone(),
            status: self.status,
            case_count: self.case_count(),
            tally: self.tally,
            completion: self.completion.clone(),
            not_runnable: self.not_runnable.clone(),
            fingerprint: self.fingerprint.clone(),
            cases: self
                .records
                .iter()
                .map(|r| CaseReport {
                    index: r.index,
                    arguments: r.tuple.to_string(),
                    outcome: r.outcome.clone(),
                    elapsed_micros: r.elapsed.as_micros() as u64,
                })
                .collect(),
        }
    }
}

/// Serializable summary handed to a runner or CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryReport {
    pub name: String,
    pub status: TheoryStatus,
    pub case_count: u64,
    pub tally: Tally,
    pub completion: Option<Completion>,
    pub not_runnable: Option<String>,
    pub fingerprint: Option<String>,
    pub cases: Vec<CaseReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub index: u64,
    pub arguments: String,
    pub outcome: CaseOutcome,
    pub elapsed_micros: u64,
}

impl TheoryReport {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
