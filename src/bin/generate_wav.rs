use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use vorbearing::save_wav;
use vorbearing::simulation::{
    AdditiveNoiseConfig, ImpulseNoiseConfig, NoiseConfig, VorSignalParams, apply_noise,
    generate_vor_signal,
};

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate synthetic VOR composite recordings for decoder testing")]
struct Args {
    /// TOML file with [signal] and [noise] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Bearings: comma-separated (e.g., "45,90,180") or range (e.g., "0-360:15")
    #[arg(short, long, default_value = "0-345:15")]
    bearings: String,

    /// Number of trials per bearing
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Signal duration in seconds
    #[arg(short, long)]
    duration: Option<f32>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Reference tone phase at the first sample, in degrees
    #[arg(long)]
    reference_phase: Option<f32>,

    /// Output filename prefix
    #[arg(long, default_value = "synth")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f32>,

    /// Impulse noise rate in Hz (CLI override)
    #[arg(long)]
    impulse_rate: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    signal: VorSignalParams,
    noise: NoiseConfig,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    bearing: f32,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    signal: VorSignalParams,
    snr_db: Option<f32>,
    files: Vec<ManifestEntry>,
}

fn parse_bearings(s: &str) -> Result<Vec<f32>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f32 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f32 = range_parts[0].parse().context("Invalid start value")?;
        let end: f32 = range_parts[1].parse().context("Invalid end value")?;

        let count = ((end - start) / step).floor().max(-1.0) as i64 + 1;
        Ok((0..count).map(|i| start + i as f32 * step).collect())
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f32>().context("Invalid bearing value"))
            .collect()
    }
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(toml: &TomlConfig, args: &Args, seed: u64) -> NoiseConfig {
    let mut config = toml.noise.clone().with_seed(seed);

    if let Some(snr) = args.snr {
        config.additive = Some(AdditiveNoiseConfig { snr_db: snr });
    }

    if let Some(impulse_rate) = args.impulse_rate {
        config.impulse = Some(ImpulseNoiseConfig {
            rate_hz: impulse_rate,
            amplitude: 0.5,
            duration_samples: 5,
        });
    }

    config
}

/// `<prefix>-<bearing>Deg.wav`, the form `vorbearing --check` reads back
fn output_filename(prefix: &str, bearing: f32, trial: u32, trials: u32) -> String {
    if trials > 1 {
        format!("{}_t{:02}-{}Deg.wav", prefix, trial, bearing)
    } else {
        format!("{}-{}Deg.wav", prefix, bearing)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let mut template = toml_config.signal.clone();
    if let Some(duration) = args.duration {
        template.duration_secs = duration;
    }
    if let Some(rate) = args.sample_rate {
        template.sample_rate = rate;
    }
    if let Some(phase) = args.reference_phase {
        template.reference_phase_degrees = phase;
    }

    let bearings = parse_bearings(&args.bearings)?;
    let base_seed = args.seed.unwrap_or(0);

    let mut manifest_entries = Vec::new();
    let total_files = bearings.len() * args.trials as usize;
    let mut file_count = 0;

    for &bearing in &bearings {
        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + bearing as u64;
            let noise_config = build_noise_config(&toml_config, &args, seed);

            let params = VorSignalParams {
                bearing_degrees: bearing,
                ..template.clone()
            };
            let clean = generate_vor_signal(&params);
            let signal = apply_noise(clean.samples(), &noise_config, params.sample_rate as f32);

            let filename = output_filename(&args.prefix, bearing, trial, args.trials);
            let filepath = args.output_dir.join(&filename);

            save_wav(&filepath, &signal, params.sample_rate, 1)
                .with_context(|| format!("Failed to write {}", filepath.display()))?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                bearing,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let snr_db = build_noise_config(&toml_config, &args, base_seed)
            .additive
            .map(|a| a.snr_db);
        let manifest = Manifest {
            signal: template,
            snr_db,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
