//! `phiface setup` downloads the ONNX face-mesh model, and
//! `phiface models` reports the manifest state on disk.

use anyhow::{bail, Context, Result};
use phiface_models::{sha256_file_hex, verify_file_sha256, ModelFile, MODELS};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Run the setup command: download and verify the models in the manifest.
pub fn run(model_dir: Option<String>) -> Result<()> {
    let dir = crate::resolve_model_dir(model_dir);

    println!("Model directory: {}", dir.display());

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let mut downloaded = 0;
    let mut skipped = 0;

    for model in MODELS {
        let dest = dir.join(model.name);
        if dest.exists() {
            match sha256_file_hex(&dest) {
                Ok(digest) if digest == model.sha256 => {
                    println!("  {} already present (checksum ok)", model.name);
                    skipped += 1;
                    continue;
                }
                Ok(_) => {
                    println!(
                        "  {} exists but checksum differs, re-downloading",
                        model.name
                    );
                }
                Err(_) => {
                    println!("  {} exists but unreadable, re-downloading", model.name);
                }
            }
        }

        download_model(model, &dest)?;
        downloaded += 1;
    }

    println!();
    if downloaded > 0 {
        println!("Setup complete: {downloaded} model(s) downloaded, {skipped} already present.");
    } else {
        println!("All models already present. Nothing to download.");
    }

    Ok(())
}

/// Run the models command: report each manifest entry's state on disk.
pub fn run_status(model_dir: Option<String>) -> Result<()> {
    let dir = crate::resolve_model_dir(model_dir);

    println!("Model directory: {}", dir.display());

    for model in MODELS {
        let path = dir.join(model.name);
        if !path.exists() {
            println!("  {:<20} missing ({})", model.name, model.size_display);
            continue;
        }
        match verify_file_sha256(model.name, &path, model.sha256) {
            Ok(()) => println!("  {:<20} present, checksum ok", model.name),
            Err(e) => println!("  {:<20} present but invalid: {e}", model.name),
        }
    }

    Ok(())
}

/// Download a single model file with progress output, verify its checksum,
/// then move it into place atomically.
fn download_model(model: &ModelFile, dest: &Path) -> Result<()> {
    let tmp_path = dest.with_extension("onnx.part");

    println!("  downloading {} ({})...", model.name, model.size_display);

    let resp = ureq::get(model.url)
        .call()
        .with_context(|| format!("failed to download {}", model.url))?;

    let content_length = resp
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let mut reader = resp.into_body().into_reader();
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;

    let mut buf = [0u8; 65536];
    let mut total: u64 = 0;
    let mut last_pct: u64 = 0;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        total += n as u64;

        // Print progress every 10%
        if let Some(len) = content_length {
            let pct = (total * 100) / len;
            if pct / 10 > last_pct / 10 {
                print!("  {pct}%\r");
                io::stdout().flush().ok();
                last_pct = pct;
            }
        }
    }

    file.flush()?;
    drop(file);

    print!("  verifying checksum... ");
    io::stdout().flush().ok();
    let digest = sha256_file_hex(&tmp_path)?;
    if digest != model.sha256 {
        fs::remove_file(&tmp_path).ok();
        bail!(
            "checksum mismatch for {}:\n  expected: {}\n  got:      {}",
            model.name,
            model.sha256,
            digest
        );
    }
    println!("ok");

    fs::rename(&tmp_path, dest).with_context(|| {
        format!(
            "failed to rename {} -> {}",
            tmp_path.display(),
            dest.display()
        )
    })?;

    Ok(())
}
