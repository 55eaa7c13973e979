use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use vidlink_config::VidlinkConfig;
use vidlink_engine::{ChannelDecoder, DataChannel, FrameReader};
use vidlink_protocol::{
    extract_parameter_sets, Channel, ExtractionError, FrameSplitter, Packet, ParameterSets,
};
use vidlink_telemetry::{DecodeLogger, DecodeMetrics};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/vidlink.yaml plus VIDLINK_* overrides
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode one or more back-to-back hex-encoded frames
    Decode(DecodeArgs),
    /// Decode every frame in a file of back-to-back frames
    Scan(ScanArgs),
    /// Print the configured port of each channel
    Ports,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Channel the frame was received on (data, control, manage, transfer)
    #[arg(short, long, default_value = "data")]
    pub channel: Channel,
    /// Frame bytes as hex; whitespace, ':' separators and a 0x prefix are ignored
    pub hex: String,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[arg(short, long, default_value = "data")]
    pub channel: Channel,
    /// Capture file
    pub file: PathBuf,
    /// Print Prometheus metrics after the scan
    #[arg(long)]
    pub metrics: bool,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => VidlinkConfig::load_from_path(path),
        None => VidlinkConfig::load(),
    }
    .context("loading configuration")?;
    DecodeLogger::init(&config.telemetry.log_level);

    match cli.command {
        Commands::Decode(args) => run_decode(&config, args),
        Commands::Scan(args) => run_scan(&config, args).await,
        Commands::Ports => {
            for channel in Channel::ALL {
                println!("{:<9} {}", channel, config.channels.port(channel));
            }
            Ok(())
        }
    }
}

fn run_decode(config: &VidlinkConfig, args: DecodeArgs) -> anyhow::Result<()> {
    let bytes = parse_hex(&args.hex)?;
    for line in decode_frames(config, args.channel, &bytes)? {
        println!("{line}");
    }
    Ok(())
}

/// Decodes every frame in `bytes`, one description line per packet.
fn decode_frames(
    config: &VidlinkConfig,
    channel: Channel,
    bytes: &[u8],
) -> anyhow::Result<Vec<String>> {
    let decoder = ChannelDecoder::new(channel, &config.decoder);
    let mut frames = FrameSplitter::new(channel, bytes);
    let mut lines = Vec::new();

    for (index, frame) in frames.by_ref().enumerate() {
        let frame = frame.with_context(|| format!("framing {channel} frame #{index}"))?;
        let packet = decoder
            .decode(frame)
            .with_context(|| format!("decoding {channel} frame #{index}"))?;

        lines.push(describe(&packet));
        if let Packet::Data(data) = &packet {
            if data.is_intact() {
                if let Some(sets) = found_parameter_sets(extract_parameter_sets(&data.nal_data))? {
                    lines.push(format!("  sps: {}", hex::encode(&sets.sps)));
                    lines.push(format!("  pps: {}", hex::encode(&sets.pps)));
                }
            }
        }
    }

    let rest = frames.remainder();
    if !rest.is_empty() {
        // Surfaces the precise decode error for the incomplete tail.
        decoder
            .decode(rest)
            .with_context(|| format!("decoding trailing {} byte(s)", rest.len()))?;
        bail!("{} trailing byte(s) after the last complete frame", rest.len());
    }
    Ok(lines)
}

/// Missing parameter sets are routine; any other extraction failure is an error.
fn found_parameter_sets(
    result: Result<ParameterSets, ExtractionError>,
) -> anyhow::Result<Option<ParameterSets>> {
    match result {
        Ok(sets) => Ok(Some(sets)),
        Err(ExtractionError::NotFound) => Ok(None),
        Err(failure) => Err(failure).context("extracting parameter sets"),
    }
}

#[derive(Debug, Default)]
struct ScanSummary {
    frames: usize,
    dropped: usize,
    pictures: usize,
    discards: usize,
    parameter_set_changes: usize,
}

async fn run_scan(config: &VidlinkConfig, args: ScanArgs) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("opening {}", args.file.display()))?;
    let metrics = if config.telemetry.metrics {
        Some(DecodeMetrics::new()?)
    } else {
        None
    };

    // Decoded frames never exceed the 16-bit length plus trailer.
    let mut reader = FrameReader::new(file, args.channel, u16::MAX as usize + 1);
    let mut summary = ScanSummary::default();

    if args.channel == Channel::Data {
        let mut channel = DataChannel::new(&config.decoder);
        if let Some(metrics) = &metrics {
            channel = channel.with_metrics(metrics.clone());
        }
        while let Some(frame) = reader.next_frame().await? {
            summary.frames += 1;
            match channel.ingest(&frame) {
                Ok(ingest) => {
                    if let Some(sets) = &ingest.parameter_sets {
                        summary.parameter_set_changes += 1;
                        println!(
                            "seq {:>3}: parameter sets sps={} pps={}",
                            ingest.sequence,
                            hex::encode(&sets.sps),
                            hex::encode(&sets.pps)
                        );
                    }
                    if let Some(picture) = &ingest.frame {
                        summary.pictures += 1;
                        println!(
                            "seq {:>3}: picture of {} bytes from {} fragment(s)",
                            picture.last_sequence,
                            picture.data.len(),
                            picture.fragments
                        );
                    }
                    if ingest.discarded.is_some() {
                        summary.discards += 1;
                    }
                }
                Err(_) => summary.dropped += 1,
            }
        }
    } else {
        let mut decoder = ChannelDecoder::new(args.channel, &config.decoder);
        if let Some(metrics) = &metrics {
            decoder = decoder.with_metrics(metrics.clone());
        }
        while let Some(frame) = reader.next_frame().await? {
            summary.frames += 1;
            match decoder.decode(&frame) {
                Ok(packet) => println!("{}", describe(&packet)),
                Err(_) => summary.dropped += 1,
            }
        }
    }

    info!(?summary, "Scan complete");
    println!(
        "{} frame(s), {} dropped, {} picture(s), {} discard(s), {} parameter set change(s)",
        summary.frames,
        summary.dropped,
        summary.pictures,
        summary.discards,
        summary.parameter_set_changes
    );

    if args.metrics {
        match &metrics {
            Some(metrics) => print!("{}", metrics.gather_metrics()?),
            None => println!("metrics are disabled in the configuration"),
        }
    }
    Ok(())
}

/// One-line summary of a decoded packet.
fn describe(packet: &Packet) -> String {
    match packet {
        Packet::Data(p) => format!(
            "data seq={} slice={} nal_len={} intact={}",
            p.sequence,
            p.slice_type(),
            p.nal_data.len(),
            p.is_intact()
        ),
        Packet::Control(p) => format!(
            "control seq={} type=0x{:02x} command={} ack={} oid={}",
            p.sequence,
            p.package_type,
            p.command(),
            p.ack(),
            hex::encode(&p.oid)
        ),
        Packet::Manage(p) => format!(
            "manage seq={} type=0x{:02x} command={} ack={} param={}",
            p.sequence,
            p.package_type,
            p.command(),
            p.ack(),
            hex::encode(&p.param)
        ),
        Packet::Transfer(p) => format!(
            "transfer seq={} src={} dest={} len={} end={}",
            p.sequence,
            p.src_addr,
            p.dest_addr,
            p.content.len(),
            p.is_last_fragment()
        ),
    }
}

fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = body
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if digits.is_empty() {
        bail!("no frame bytes given");
    }
    hex::decode(&digits).with_context(|| format!("invalid hex '{}'", input))
}
