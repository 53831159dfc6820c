use std::path::PathBuf;

use vaportext::{VaporSource, VaporizeConfig};

fn bin_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_vaportext")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "vaportext.exe"
            } else {
                "vaportext"
            });
            p
        })
}

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let config_path = dir.join("config.json");
    let out_path = dir.join("frame.png");
    let _ = std::fs::remove_file(&out_path);

    let config = VaporizeConfig {
        source: VaporSource::Path {
            svg_path_d: "M0 0 L16 0 L16 6 L0 6 Z".to_string(),
        },
        duration_secs: 0.5,
        seed: 1,
        ..VaporizeConfig::default()
    };
    let f = std::fs::File::create(&config_path).unwrap();
    serde_json::to_writer_pretty(f, &config).unwrap();

    let config_arg = config_path.to_string_lossy().to_string();
    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(bin_exe())
        .args([
            "frame",
            "--in",
            config_arg.as_str(),
            "--at-secs",
            "0.1",
            "--width",
            "64",
            "--height",
            "32",
            "--dpr",
            "3",
            "--out",
        ])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_wave_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let out_path = dir.join("wave.png");
    let _ = std::fs::remove_file(&out_path);

    let out_arg = out_path.to_string_lossy().to_string();
    let status = std::process::Command::new(bin_exe())
        .args([
            "wave",
            "--width",
            "48",
            "--height",
            "24",
            "--at-secs",
            "0.5",
            "--out",
        ])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}
