//! Build script for the playlist bridge.
//!
//! Copies `.env.example` into the local data directory so the configuration
//! template sits next to the `.env` the server reads at startup:
//!
//! - Linux: `~/.local/share/playlist-bridge/.env.example`
//! - macOS: `~/Library/Application Support/playlist-bridge/.env.example`
//! - Windows: `%LOCALAPPDATA%/playlist-bridge/.env.example`
//!
//! A missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let Some(mut out_dir) = dirs::data_local_dir() else {
        println!("cargo:warning=no local data directory, skipping .env.example");
        return Ok(());
    };
    out_dir.push("playlist-bridge");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    // Read-only build sandboxes must not fail the build.
    if let Err(e) = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&template, out_dir.join(".env.example")).map(|_| ()))
    {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
