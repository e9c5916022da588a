use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use vorbearing::audio::{SampleSource, WavFileSource};
use vorbearing::config::{ChannelMix, PhaseMethod, VorConfig};
use vorbearing::constants::SUBCARRIER_DEVIATION_HZ;
use vorbearing::output::{BearingReport, OutputFormat, create_formatter};
use vorbearing::vor::{BearingMeasurement, VorDecoder, check_length};
use vorbearing::wav::{interleave_stereo, save_wav};
use vorbearing::VorError;

#[derive(Parser, Debug)]
#[command(name = "vorbearing")]
#[command(about = "Decode the bearing of VOR receiver recordings", long_about = None)]
struct Args {
    /// WAV recordings to decode
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Calibration offset in degrees, added to every bearing
    #[arg(short = 'o', long, allow_hyphen_values = true)]
    offset: Option<f32>,

    /// TOML file with configuration overrides
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Phase estimation method: correlation, zero-crossing
    #[arg(short = 'm', long, value_enum)]
    method: Option<PhaseMethod>,

    /// Decode a single channel (zero-based) instead of averaging all channels
    #[arg(long)]
    channel: Option<u16>,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Compare against the bearing in each file name (`...-<deg>Deg.wav`)
    #[arg(long)]
    check: bool,

    /// Allowed error in degrees for --check
    #[arg(short = 't', long)]
    tolerance: Option<f32>,

    /// Number of files decoded in parallel
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,

    /// Write the recovered tones to <dir>/<stem>_tones.wav
    /// (stereo: left=reference, right=variable)
    #[arg(long)]
    dump_audio: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => VorConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => VorConfig::default(),
    };
    if let Some(offset) = args.offset {
        config.bearing.offset_degrees = offset;
    }
    if let Some(tolerance) = args.tolerance {
        config.bearing.tolerance_degrees = tolerance;
    }
    if let Some(method) = args.method {
        config.estimator.method = method;
    }
    if let Some(channel) = args.channel {
        config.audio.channel_mix = ChannelMix::Channel(channel);
    }

    if let Some(dir) = &args.dump_audio {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating dump directory {}", dir.display()))?;
    }

    log::info!(
        "Decoding {} file(s) with {:?} estimation, offset {:.1}°",
        args.files.len(),
        config.estimator.method,
        config.bearing.offset_degrees
    );

    let reports = decode_all(&args, &config);

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    for report in &reports {
        println!("{}", formatter.format(report));
    }

    let failed = reports.iter().filter(|r| r.is_failure()).count();

    if args.check {
        print_check_summary(&reports, config.bearing.tolerance_degrees);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed", failed, reports.len());
    }

    Ok(())
}

/// Decode every file, in input order, on `--jobs` worker threads
fn decode_all(args: &Args, config: &VorConfig) -> Vec<BearingReport> {
    let jobs = args.jobs.clamp(1, args.files.len().max(1));

    let (work_tx, work_rx) = crossbeam_channel::unbounded::<(usize, &PathBuf)>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, BearingReport)>();

    for job in args.files.iter().enumerate() {
        work_tx.send(job).ok();
    }
    drop(work_tx);

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                let mut decoders: HashMap<u32, VorDecoder> = HashMap::new();
                for (index, path) in work_rx.iter() {
                    let report = report_file(path, config, args, &mut decoders);
                    if result_tx.send((index, report)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut reports: Vec<(usize, BearingReport)> = result_rx.iter().collect();
    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

fn report_file(
    path: &Path,
    config: &VorConfig,
    args: &Args,
    decoders: &mut HashMap<u32, VorDecoder>,
) -> BearingReport {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let report = match decode_file(path, config, decoders, args.dump_audio.as_deref()) {
        Ok(measurement) => BearingReport::measured(&filename, &measurement),
        Err(e) => {
            let kind = e.downcast_ref::<VorError>().map(|v| v.kind());
            log::debug!("{}: {:?}", filename, kind);
            BearingReport::failed(&filename, format!("{:#}", e))
        }
    };

    if !args.check {
        return report;
    }
    match expected_bearing(path) {
        Some(expected) => report.check(expected, config.bearing.tolerance_degrees),
        None => {
            log::warn!("{}: no expected bearing in file name", filename);
            BearingReport::failed(&filename, "no expected bearing in file name")
        }
    }
}

fn decode_file(
    path: &Path,
    config: &VorConfig,
    decoders: &mut HashMap<u32, VorDecoder>,
    dump_dir: Option<&Path>,
) -> anyhow::Result<BearingMeasurement> {
    let buffer = WavFileSource::new(path, config.audio.channel_mix)
        .load()
        .with_context(|| format!("reading {}", path.display()))?;

    check_length(config, &buffer).with_context(|| format!("decoding {}", path.display()))?;

    let rate = buffer.sample_rate();
    let decoder = match decoders.entry(rate) {
        std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
        std::collections::hash_map::Entry::Vacant(entry) => entry.insert(
            VorDecoder::new(config, rate)
                .with_context(|| format!("configuring decoder for {} Hz", rate))?,
        ),
    };

    let (measurement, signals) = decoder
        .measure_with_signals(&buffer, config.bearing.offset_degrees)
        .with_context(|| format!("decoding {}", path.display()))?;

    if let Some(dir) = dump_dir {
        let variable: Vec<f32> = signals
            .variable
            .samples()
            .iter()
            .map(|&hz| hz / SUBCARRIER_DEVIATION_HZ)
            .collect();
        let stereo = interleave_stereo(signals.reference.samples(), &variable);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let dump_path = dir.join(format!("{}_tones.wav", stem));
        eprintln!("Dumping recovered tones to {}", dump_path.display());
        save_wav(&dump_path, &stereo, rate, 2)
            .with_context(|| format!("writing {}", dump_path.display()))?;
    }

    Ok(measurement)
}

/// Expected bearing from a `<prefix>-<deg>Deg` file stem
fn expected_bearing(path: &Path) -> Option<f32> {
    let stem = path.file_stem()?.to_str()?;
    let field = stem.rsplit('-').next()?.trim();
    field.strip_suffix("Deg")?.trim().parse().ok()
}

fn print_check_summary(reports: &[BearingReport], tolerance: f32) {
    let mut errors: Stats<f32> = Stats::new();
    for error in reports.iter().filter_map(|r| r.error_degrees) {
        errors.update(error);
    }
    let passed = reports.iter().filter(|r| r.passed == Some(true)).count();

    eprintln!();
    eprintln!(
        "{} of {} passed (tolerance {:.1}°)",
        passed,
        reports.len(),
        tolerance
    );
    if errors.count > 0 {
        eprintln!(
            "Error: mean {:.2}°, std dev {:.2}°, min {:.2}°, max {:.2}°",
            errors.mean, errors.std_dev, errors.min, errors.max
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_bearing_from_name() {
        assert_eq!(expected_bearing(Path::new("data/vor-90Deg.wav")), Some(90.0));
        assert_eq!(expected_bearing(Path::new("sim-127.5Deg.wav")), Some(127.5));
        assert_eq!(expected_bearing(Path::new("a-b-c-0Deg.wav")), Some(0.0));
    }

    #[test]
    fn test_expected_bearing_missing() {
        assert_eq!(expected_bearing(Path::new("recording.wav")), None);
        assert_eq!(expected_bearing(Path::new("vor-90.wav")), None);
        assert_eq!(expected_bearing(Path::new("vor-northDeg.wav")), None);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "vorbearing",
            "--offset",
            "-12.5",
            "--method",
            "zero-crossing",
            "--check",
            "-j",
            "4",
            "a.wav",
            "b.wav",
        ])
        .unwrap();
        assert_eq!(args.offset, Some(-12.5));
        assert_eq!(args.method, Some(PhaseMethod::ZeroCrossing));
        assert!(args.check);
        assert_eq!(args.jobs, 4);
        assert_eq!(args.files.len(), 2);
    }
}
