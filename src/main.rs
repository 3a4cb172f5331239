mod analysis;
mod capabilities;
mod config;
mod pose;
mod video;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::analysis::{compare_swings, AnalysisResult, AnalysisStrategy};
use crate::capabilities::Capabilities;
use crate::config::Config;
use crate::video::VideoProbe;

#[derive(Parser)]
#[command(name = "swing-o-mat")]
#[command(about = "Swing metrics from racket sport videos")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a video and write the result as JSON
    Analyze {
        #[arg(long)]
        video: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Sampling interval in milliseconds
        #[arg(
            long = "sample_ms",
            visible_alias = "sample-ms",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        sample_ms: Option<u32>,
    },
    /// Detect key swing phases in two videos and align them
    Compare {
        /// The swing being coached
        #[arg(long)]
        video: PathBuf,
        /// The model swing to align against
        #[arg(long)]
        reference: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Sampling interval in milliseconds
        #[arg(
            long = "sample_ms",
            visible_alias = "sample-ms",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        sample_ms: Option<u32>,
    },
    /// Serve the HTTP analysis endpoint
    Serve {
        /// Address to bind, overrides the configuration file
        #[arg(long)]
        bind: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Analyze {
            video,
            out,
            sample_ms,
        } => {
            let sample_ms = sample_ms.unwrap_or(config.analysis.sample_ms);
            analyze(&config, &video, &out, sample_ms)
        }
        Commands::Compare {
            video,
            reference,
            out,
            sample_ms,
        } => {
            let sample_ms = sample_ms.unwrap_or(config.analysis.sample_ms);
            compare(&config, &video, &reference, &out, sample_ms)
        }
        Commands::Serve { bind } => serve(config, bind),
    }
}

fn analyze(config: &Config, video: &Path, out: &Path, sample_ms: u32) -> ExitCode {
    if !video.exists() {
        eprintln!("Error: video file not found: {}", video.display());
        return ExitCode::FAILURE;
    }

    let capabilities = Capabilities::detect(config);
    let strategy = AnalysisStrategy::select(&capabilities);
    log::info!("Using {} analysis", strategy);
    let probe = VideoProbe::new(capabilities.ffprobe.clone());

    let result = match strategy.analyze(video, sample_ms, &probe) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Error during analysis: {}", e);
            let failed = AnalysisResult::failed(&e.to_string(), sample_ms);
            if let Err(e) = write_result(out, &failed) {
                log::error!("Failed to write error result to {}: {}", out.display(), e);
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_result(out, &result) {
        eprintln!("Error writing {}: {}", out.display(), e);
        return ExitCode::FAILURE;
    }

    log::info!(
        "Analysis complete{}: {}",
        if result.is_fallback() { " (fallback)" } else { "" },
        out.display()
    );
    println!(
        "{}",
        serde_json::json!({ "status": "success", "output": out.display().to_string() })
    );
    ExitCode::SUCCESS
}

fn compare(config: &Config, video: &Path, reference: &Path, out: &Path, sample_ms: u32) -> ExitCode {
    for path in [video, reference] {
        if !path.exists() {
            eprintln!("Error: video file not found: {}", path.display());
            return ExitCode::FAILURE;
        }
    }

    let capabilities = Capabilities::detect(config);
    let strategy = AnalysisStrategy::select(&capabilities);
    log::info!("Using {} analysis", strategy);

    let sampled = strategy
        .sample_poses(video, sample_ms)
        .and_then(|user| Ok((user, strategy.sample_poses(reference, sample_ms)?)));
    let (user, model) = match sampled {
        Ok(poses) => poses,
        Err(e) => {
            eprintln!("Error during comparison: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = compare_swings(&user, &model);
    log::info!(
        "Swings offset by {:.0} ms ({} user key poses, {} reference key poses)",
        report.time_offset_ms,
        report.user_key_poses.len(),
        report.reference_key_poses.len()
    );

    if let Err(e) = write_result(out, &report) {
        eprintln!("Error writing {}: {}", out.display(), e);
        return ExitCode::FAILURE;
    }
    println!(
        "{}",
        serde_json::json!({ "status": "success", "output": out.display().to_string() })
    );
    ExitCode::SUCCESS
}

fn write_result<T: Serialize>(out: &Path, result: &T) -> io::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(result)?;
    fs::write(out, json)
}

fn serve(mut config: Config, bind: Option<String>) -> ExitCode {
    if let Some(bind) = bind {
        config.web.bind = bind;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoseConfig;
    use clap::CommandFactory;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.video.ffprobe = "/nonexistent/ffprobe".into();
        config
    }

    fn read_result(path: &Path) -> AnalysisResult {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sample_ms_flag() {
        let cli = Cli::try_parse_from([
            "swing-o-mat",
            "analyze",
            "--video",
            "a.mp4",
            "--out",
            "a.json",
            "--sample_ms",
            "50",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { sample_ms, .. } => assert_eq!(sample_ms, Some(50)),
            _ => panic!("expected analyze"),
        }

        assert!(Cli::try_parse_from([
            "swing-o-mat",
            "analyze",
            "--video",
            "a.mp4",
            "--out",
            "a.json",
            "--sample_ms",
            "0",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["swing-o-mat", "analyze", "--out", "a.json"]).is_err());
    }

    #[test]
    fn missing_video_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("result.json");
        let code = analyze(
            &offline_config(),
            &dir.path().join("missing.mp4"),
            &out,
            100,
        );
        assert_eq!(code, ExitCode::FAILURE);
        assert!(!out.exists());
    }

    #[test]
    fn fallback_analysis_writes_result() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("swing.mp4");
        fs::write(&video, b"not really a video").unwrap();
        let out = dir.path().join("nested/results/swing.json");

        let code = analyze(&offline_config(), &video, &out, 100);
        assert_eq!(code, ExitCode::SUCCESS);

        let result = read_result(&out);
        assert!(result.is_fallback());
        assert_eq!(result.metrics.tempo_series.len(), 50);
        assert_eq!(result.metrics.impact_frames, vec![800.0, 2200.0, 3600.0]);
    }

    #[test]
    fn compare_needs_a_pose_model() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("user.mp4");
        let reference = dir.path().join("pro.mp4");
        fs::write(&video, b"frames").unwrap();
        fs::write(&reference, b"frames").unwrap();
        let out = dir.path().join("sync.json");

        let code = compare(&offline_config(), &video, &reference, &out, 100);
        assert_eq!(code, ExitCode::FAILURE);
        assert!(!out.exists());
    }

    #[test]
    fn compare_writes_sync_report() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("user.mp4");
        let reference = dir.path().join("pro.mp4");
        fs::write(&video, b"frames").unwrap();
        fs::write(&reference, b"frames").unwrap();
        let out = dir.path().join("reports/sync.json");

        let frames: Vec<String> = [0.0, 0.0, 0.1, 0.5, 0.9, 0.95, 0.95]
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let mut landmarks = vec![serde_json::json!({"x": 0.5, "y": 0.5}); 17];
                landmarks[16] = serde_json::json!({"x": x, "y": 0.6});
                serde_json::json!({"type": "frame", "index": i, "landmarks": landmarks}).to_string()
            })
            .collect();
        let script = format!(
            "printf '%s\\n' '{{\"type\":\"header\",\"fps\":10}}' {}",
            frames
                .iter()
                .map(|l| format!("'{}'", l))
                .collect::<Vec<_>>()
                .join(" ")
        );
        let mut config = offline_config();
        config.pose = Some(PoseConfig {
            command: "sh".into(),
            args: vec!["-c".into(), script],
        });

        let code = compare(&config, &video, &reference, &out, 100);
        assert_eq!(code, ExitCode::SUCCESS);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["timeOffsetMs"], 0.0);
        assert_eq!(value["userKeyPoses"], value["referenceKeyPoses"]);
        assert_eq!(value["mapping"].as_array().unwrap().len(), 7);
        let contact = value["userKeyPoses"]
            .as_array()
            .unwrap()
            .iter()
            .find(|k| k["type"] == "ball_contact")
            .unwrap();
        assert_eq!(contact["frameIndex"], 3);
    }

    #[test]
    fn processing_error_writes_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("swing.mp4");
        fs::write(&video, b"frames").unwrap();
        let out = dir.path().join("swing.json");

        let mut config = offline_config();
        config.pose = Some(PoseConfig {
            command: "sh".into(),
            args: vec!["-c".into(), "echo 'not a header'".into()],
        });

        let code = analyze(&config, &video, &out, 100);
        assert_eq!(code, ExitCode::FAILURE);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value["error"].as_str().unwrap().contains("pose"));
        assert_eq!(value["metrics"]["elbowAngleMax"], 0.0);
        assert_eq!(value["meta"]["framesUsed"], 0);
    }
}
