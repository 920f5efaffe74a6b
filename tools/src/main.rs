use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use snoop_tools::{
    collect_packet_files, decode_packet, format_decode_pretty, inspect_packet, load_schema,
    open_session, replay, sort_by_size, InspectReport, PacketFile, ReplaySummary,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "snoop-tools",
    version,
    about = "snoop update-object inspection and decoding tools"
)]
struct Cli {
    /// Session config JSON (protocol version, limits, orphan policy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Schema JSON replacing the built-in field table.
    #[arg(long, global = true)]
    schema: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one update-object payload into structured entries.
    Decode {
        /// Path to the payload bytes.
        packet_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Summarize entry kinds and decode outcome.
    Inspect {
        /// A payload file or a directory of them.
        packet_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Apply every payload in a directory, in file-name order, to one session.
    Replay {
        /// Directory of payload files.
        dir: PathBuf,
        /// Optional glob filter.
        #[arg(long)]
        glob: Option<String>,
        /// Print the full store as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Some(path) = &cli.schema {
        let table = load_schema(path).context("load schema")?;
        println!(
            "schema: {} hash: {:#018x}",
            table.name,
            schema::schema_hash(&table)
        );
    }
    let session = open_session(cli.config.as_deref(), cli.schema.as_deref())?;

    match cli.command {
        Command::Decode {
            packet_file,
            format,
        } => {
            let bytes = fs::read(&packet_file)
                .with_context(|| format!("read packet {}", packet_file.display()))?;
            let output = decode_packet(&session, bytes)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Inspect {
            packet_path,
            glob,
            sort,
            limit,
        } => {
            if packet_path.is_dir() {
                let mut files = collect_packet_files(&packet_path, glob.as_deref())?;
                if let Some(InspectSort::Size) = sort {
                    sort_by_size(&mut files);
                }
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    files.truncate(limit);
                }
                for file in files {
                    println!("== {} ({} bytes) ==", file.path.display(), file.size);
                    inspect_file(&session, &file.path)?;
                }
            } else {
                inspect_file(&session, &packet_path)?;
            }
        }
        Command::Replay { dir, glob, json } => {
            let files: Vec<PacketFile> = collect_packet_files(&dir, glob.as_deref())?;
            let summary = replay(&session, &files)?;
            if json {
                let json = serde_json::to_string_pretty(&summary).context("serialize json")?;
                println!("{json}");
            } else {
                print_replay_summary(&summary);
            }
        }
    }
    Ok(())
}

fn inspect_file(session: &codec::DecoderSession, path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("read packet {}", path.display()))?;
    let report = inspect_packet(session, bytes)?;
    print_inspect_report(&report);
    Ok(())
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "map: {} updates: {} removed: {} ({} bytes)",
        report.map_id, report.num_updates, report.removed, report.bytes
    );
    println!("entries:");
    for (kind, count) in &report.by_kind {
        println!("  {kind}: {count}");
    }
    if report.warnings > 0 {
        println!("warnings: {}", report.warnings);
    }
    if let Some(failure) = &report.failure {
        println!("failure: {failure}");
    }
    if report.trailing_bytes > 0 {
        println!("trailing: {} bytes", report.trailing_bytes);
    }
    println!("exhaustive: {}", report.exhaustive);
}

fn print_replay_summary(summary: &ReplaySummary) {
    let stats = summary.stats;
    println!(
        "packets: {} entries: {} failed: {}",
        summary.packets, stats.entries, summary.failed_entries
    );
    println!(
        "creates: {} merges: {} updates: {} orphans: {} destroys: {} unknown: {}",
        stats.creates,
        stats.merges,
        stats.updates,
        stats.orphan_updates,
        stats.destroys,
        stats.unknown_entries
    );
    println!("entities: {}", summary.entities.len());
    for entity in &summary.entities {
        let position = entity
            .position()
            .map(|p| format!(" at {:.2} {:.2} {:.2}", p.x, p.y, p.z))
            .unwrap_or_default();
        println!(
            "  {} {}{} updates: {}{}",
            entity.guid,
            entity.object_type,
            position,
            entity.history.len(),
            if entity.moved_between_creates {
                " (moved)"
            } else {
                ""
            }
        );
    }
    if !summary.accessories.is_empty() {
        println!("vehicle accessories:");
        for accessory in &summary.accessories {
            println!(
                "  vehicle {} seat {}: {}",
                accessory.vehicle_entry, accessory.seat, accessory.accessory_entry
            );
        }
    }
}
