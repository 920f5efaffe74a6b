//! Inspection and decoding tools for captured update-object packets.
//!
//! This crate provides the pieces behind the `snoop-tools` binary:
//!
//! - Decode a packet payload into serializable entries
//! - Summarize packets by entry kind and decode outcome
//! - Replay a directory of packets through one session
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the decoder is doing.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use codec::{
    CaptureTime, DecodedEntry, DecoderSession, Entity, NullSink, RawPacket, SessionConfig,
    SessionStats, UpdateObject, VehicleSeatAccessory,
};
use glob::Pattern;
use schema::SchemaTable;
use serde::Serialize;
use tracing::{debug, info};
use wire::UpdateObjectHeader;

/// Opcode stamped on packets read from bare payload files.
pub const DEFAULT_OPCODE: u32 = 0x1725;

/// Loads a session config from JSON. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&contents).context("parse config json")
}

/// Loads and validates a schema table from JSON.
pub fn load_schema(path: &Path) -> Result<SchemaTable> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    let table: SchemaTable = serde_json::from_str(&contents).context("parse schema json")?;
    table
        .validate()
        .map_err(|err| anyhow::anyhow!("schema validation failed: {err}"))?;
    Ok(table)
}

/// Builds a session from optional config and schema files.
///
/// Without a schema file the compiled-in table is used.
pub fn open_session(config: Option<&Path>, schema: Option<&Path>) -> Result<DecoderSession> {
    let config = config
        .map(load_config)
        .transpose()?
        .unwrap_or_default();
    let session = match schema {
        Some(path) => {
            let table = load_schema(path)?;
            info!(
                name = %table.name,
                hash = %format!("{:#018x}", schema::schema_hash(&table)),
                "loaded schema"
            );
            DecoderSession::new(config, Arc::new(table))
        }
        None => DecoderSession::with_builtin_schema(config),
    };
    Ok(session)
}

/// Serializable view of one decoded packet.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeOutput {
    pub opcode: u32,
    pub header: UpdateObjectHeader,
    pub entries: Vec<DecodedEntry>,
    pub warnings: Vec<String>,
    pub failure: Option<String>,
    pub entry_bytes: usize,
    pub trailing_bytes: usize,
    pub exhaustive: bool,
}

impl From<UpdateObject> for DecodeOutput {
    fn from(decoded: UpdateObject) -> Self {
        let exhaustive = decoded.is_exhaustive();
        Self {
            opcode: decoded.opcode,
            header: decoded.header,
            entries: decoded.entries,
            warnings: decoded.warnings.iter().map(ToString::to_string).collect(),
            failure: decoded.failure.as_ref().map(ToString::to_string),
            entry_bytes: decoded.entry_bytes,
            trailing_bytes: decoded.trailing_bytes,
            exhaustive,
        }
    }
}

/// Wraps a payload read from disk.
pub fn raw_packet(bytes: Vec<u8>, sequence: u64) -> RawPacket {
    RawPacket::new(DEFAULT_OPCODE, CaptureTime::from_millis(sequence), bytes)
}

/// Decodes one payload without touching the session's store.
pub fn decode_packet(session: &DecoderSession, bytes: Vec<u8>) -> Result<DecodeOutput> {
    let packet = raw_packet(bytes, 0);
    let decoded = session.decode(&packet).context("decode update-object header")?;
    Ok(decoded.into())
}

/// Renders a decoded packet as indented text, one traced field per line.
#[must_use]
pub fn format_decode_pretty(output: &DecodeOutput) -> String {
    let mut out = String::new();
    let header = &output.header;
    let _ = writeln!(
        out,
        "opcode: {:#06x} map: {} updates: {} data_size: {} bytes",
        output.opcode, header.map_id, header.num_updates, header.data_size
    );
    if let Some(removed) = &header.removed {
        let _ = writeln!(
            out,
            "removed: {} destroyed, {} out of range",
            removed.destroyed().len(),
            removed.out_of_range().len()
        );
    }
    for entry in &output.entries {
        let _ = writeln!(out, "[{}] {}", entry.index, entry.entry.kind());
        for event in &entry.trace {
            let depth = event.path.len().saturating_sub(1);
            let _ = writeln!(out, "{:indent$}{event}", "", indent = 2 + depth * 2);
        }
    }
    for warning in &output.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    if let Some(failure) = &output.failure {
        let _ = writeln!(out, "failure: {failure}");
    }
    if output.trailing_bytes > 0 {
        let _ = writeln!(out, "trailing: {} bytes", output.trailing_bytes);
    }
    out
}

/// Entry counts and decode outcome of one packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub bytes: usize,
    pub map_id: u16,
    pub num_updates: u32,
    pub removed: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
    pub warnings: usize,
    pub failure: Option<String>,
    pub trailing_bytes: usize,
    pub exhaustive: bool,
}

/// Summarizes a payload by entry kind.
pub fn inspect_packet(session: &DecoderSession, bytes: Vec<u8>) -> Result<InspectReport> {
    let len = bytes.len();
    let packet = raw_packet(bytes, 0);
    let decoded = session.decode(&packet).context("decode update-object header")?;

    let mut by_kind = BTreeMap::new();
    for entry in &decoded.entries {
        *by_kind.entry(entry.entry.kind()).or_insert(0) += 1;
    }

    Ok(InspectReport {
        bytes: len,
        map_id: decoded.header.map_id,
        num_updates: decoded.header.num_updates,
        removed: decoded
            .header
            .removed
            .as_ref()
            .map_or(0, |removed| removed.guids.len()),
        by_kind,
        warnings: decoded.warnings.len(),
        failure: decoded.failure.as_ref().map(ToString::to_string),
        trailing_bytes: decoded.trailing_bytes,
        exhaustive: decoded.is_exhaustive(),
    })
}

/// Store contents after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub packets: usize,
    pub failed_entries: usize,
    pub stats: SessionStats,
    pub entities: Vec<Entity>,
    pub accessories: Vec<VehicleSeatAccessory>,
}

/// Applies packet files in order to one session.
///
/// The file's position in `files` is used as its capture time.
pub fn replay(session: &DecoderSession, files: &[PacketFile]) -> Result<ReplaySummary> {
    let mut failed_entries = 0;
    for (sequence, file) in files.iter().enumerate() {
        let bytes =
            fs::read(&file.path).with_context(|| format!("read packet {}", file.path.display()))?;
        let packet = raw_packet(bytes, sequence as u64);
        let report = session
            .process(&packet, &mut NullSink)
            .with_context(|| format!("decode {}", file.path.display()))?;
        debug!(
            path = %file.path.display(),
            applied = report.applied,
            failures = report.failures.len(),
            "replayed packet"
        );
        failed_entries += report.failures.len();
    }

    Ok(ReplaySummary {
        packets: files.len(),
        failed_entries,
        stats: session.stats(),
        entities: session.store().snapshot(),
        accessories: session.accessories().snapshot(),
    })
}

/// A packet file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Lists regular files in `dir`, optionally filtered by a glob, in name order.
///
/// The glob is matched against both the full path and the file name.
pub fn collect_packet_files(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketFile>> {
    let pattern = glob
        .map(|value| Pattern::new(value).context("invalid glob pattern"))
        .transpose()?;

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        files.push(PacketFile { path, size });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Largest files first; ties broken by path.
pub fn sort_by_size(files: &mut [PacketFile]) {
    files.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
}
