use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use dualsub_cli::domain::rules::CompressionProfileResolver;
use dualsub_cli::output::{OutputNamingResolver, OutputSettings};
use dualsub_cli::*;

/// Test utilities for CLI runs
mod test_utils {
    use super::*;

    pub const SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nGood morning\n";

    /// Video, subtitle pair and a stand-in engine file in a fresh directory
    pub fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("movie.mp4"), b"video").unwrap();
        fs::write(dir.path().join("en.srt"), SRT).unwrap();
        fs::write(dir.path().join("vi.srt"), SRT).unwrap();
        fs::write(dir.path().join("ffmpeg"), b"").unwrap();
        dir
    }

    /// `dualsub` isolated from the caller's environment and config files
    pub fn dualsub(dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("dualsub").unwrap();
        cmd.current_dir(dir)
            .env_remove("DUALSUB_ENGINE")
            .env_remove("DUALSUB_OUTPUT_DIR")
            .env_remove("DUALSUB_LOG_LEVEL")
            .env_remove("DUALSUB_COLLISION_POLICY")
            .env_remove("DUALSUB_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn job_args(dir: &Path) -> Vec<PathBuf> {
        vec![
            "--video".into(),
            dir.join("movie.mp4"),
            "--source".into(),
            dir.join("en.srt"),
            "--target".into(),
            dir.join("vi.srt"),
        ]
    }
}

use test_utils::*;

#[test]
fn test_compression_tiers_are_ordered() {
    let profiles: Vec<EncodeProfile> = CompressionTier::ALL
        .iter()
        .map(|tier| CompressionProfileResolver::resolve(*tier))
        .collect();

    assert!(profiles[0].quality_parameter < profiles[1].quality_parameter);
    assert!(profiles[1].quality_parameter < profiles[2].quality_parameter);
    assert!(profiles[0].audio_bitrate_kbps > profiles[2].audio_bitrate_kbps);
}

#[test]
fn test_output_naming_versions_instead_of_overwriting() {
    let dir = workspace();
    fs::write(dir.path().join("movie_dual_subbed.mp4"), b"earlier run").unwrap();

    let resolver = OutputNamingResolver::new(OutputSettings::default());
    let resolved = resolver.resolve(&dir.path().join("movie.mp4")).unwrap();

    assert_eq!(resolved, dir.path().join("movie_dual_subbed_1.mp4"));
    assert_eq!(
        fs::read(dir.path().join("movie_dual_subbed.mp4")).unwrap(),
        b"earlier run"
    );
}

#[test]
fn test_plan_prints_json() {
    let dir = workspace();
    let output = dualsub(dir.path())
        .arg("plan")
        .args(job_args(dir.path()))
        .args(["--tier", "normal", "--downscale", "--json", "--engine"])
        .arg(dir.path().join("ffmpeg"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        report["output_path"].as_str().unwrap(),
        dir.path().join("movie_dual_subbed.mp4").to_string_lossy()
    );
    assert_eq!(report["tier"], "normal");
    assert_eq!(report["downscale"], true);
    assert_eq!(report["profile"]["quality_parameter"], 18);
    assert!(report["filter_graph"]
        .as_str()
        .unwrap()
        .starts_with(r"[0:v]scale=w=-2:h=2*trunc(min(720\,ih)/2)[v1];"));
    assert!(report["args"]
        .as_array()
        .unwrap()
        .iter()
        .any(|arg| arg == "-filter_complex"));
}

#[test]
fn test_plan_uses_config_file_and_env() {
    let dir = workspace();
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    fs::write(
        dir.path().join("dualsub.toml"),
        "[output]\nsuffix = \"_bilingual\"\ndir = \"/does/not/exist\"\n",
    )
    .unwrap();

    dualsub(dir.path())
        .env("DUALSUB_OUTPUT_DIR", &out_dir)
        .env("DUALSUB_ENGINE", dir.path().join("ffmpeg"))
        .arg("plan")
        .args(job_args(dir.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("movie_bilingual.mp4"))
        .stdout(predicate::str::contains(out_dir.to_string_lossy().as_ref()));
}

#[test]
fn test_invalid_subtitle_is_reported_before_engine_lookup() {
    let dir = workspace();
    fs::write(dir.path().join("vi.srt"), [0x31, 0x0a, 0xff, 0xfe]).unwrap();

    dualsub(dir.path())
        .arg("plan")
        .args(job_args(dir.path()))
        .args(["--engine", "/nonexistent/ffmpeg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not readable UTF-8"))
        .stderr(predicate::str::contains("vi.srt"));
}

#[test]
fn test_missing_video_fails() {
    let dir = workspace();
    fs::remove_file(dir.path().join("movie.mp4")).unwrap();

    dualsub(dir.path())
        .arg("embed")
        .args(job_args(dir.path()))
        .arg("--engine")
        .arg(dir.path().join("ffmpeg"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Video file not found"));
}

#[test]
fn test_unknown_tier_is_rejected_by_parser() {
    let dir = workspace();
    dualsub(dir.path())
        .arg("plan")
        .args(job_args(dir.path()))
        .args(["--tier", "tiny"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid compression tier"));
}

#[test]
fn test_check_without_engine_fails() {
    let dir = workspace();
    dualsub(dir.path())
        .args(["check", "--engine", "/nonexistent/ffmpeg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("engine"));
}

#[cfg(unix)]
mod scripted_engine {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn install_engine(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-ffmpeg");
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_embed_writes_output() {
        let dir = workspace();
        let engine = install_engine(
            dir.path(),
            "#!/bin/sh\nfor last; do :; done\nprintf 'out_time_us=1000000\\nprogress=end\\n'\nprintf 'mp4' > \"$last\"\n",
        );

        dualsub(dir.path())
            .arg("embed")
            .args(job_args(dir.path()))
            .arg("--engine")
            .arg(&engine)
            .assert()
            .success()
            .stdout(predicate::str::contains("movie_dual_subbed.mp4"));

        assert_eq!(
            fs::read(dir.path().join("movie_dual_subbed.mp4")).unwrap(),
            b"mp4"
        );
    }

    #[test]
    fn test_embed_failure_shows_engine_diagnostics() {
        let dir = workspace();
        let engine = install_engine(
            dir.path(),
            "#!/bin/sh\necho 'Unknown encoder libx264' >&2\nexit 1\n",
        );

        dualsub(dir.path())
            .arg("embed")
            .args(job_args(dir.path()))
            .arg("--engine")
            .arg(&engine)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Unknown encoder libx264"));

        assert!(!dir.path().join("movie_dual_subbed.mp4").exists());
    }

    #[test]
    fn test_check_reports_version() {
        let dir = workspace();
        let engine = install_engine(
            dir.path(),
            "#!/bin/sh\necho 'ffmpeg version 7.0 Copyright (c) 2000-2024'\n",
        );

        dualsub(dir.path())
            .arg("check")
            .arg("--engine")
            .arg(&engine)
            .assert()
            .success()
            .stdout(predicate::str::contains("ffmpeg version 7.0"));
    }
}
