//! Full pipeline demo: upload, fingerprint, metadata, ELA, scoring.
//!
//! Run with: cargo run --example analyze_upload -- <image_path> [storage_dir]

use std::env;
use std::fs;

use image_authenticity::error::Result;
use image_authenticity::{AuthenticityEngine, HashExpectation};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: {} <image_path> [storage_dir]", args[0]);
        println!();
        println!("Arguments:");
        println!("  image_path   - Path to the image to analyze");
        println!("  storage_dir  - Optional storage directory (default: ./uploads)");
        return Ok(());
    }

    let image_path = &args[1];
    let storage_dir = args.get(2).map(|s| s.as_str()).unwrap_or("./uploads");

    let file_name = std::path::Path::new(image_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let bytes = fs::read(image_path)?;

    let engine = AuthenticityEngine::new(storage_dir)?;

    println!("Analyzing {image_path}...");
    let outcome = engine.analyze_upload(&file_name, &bytes, &HashExpectation::default())?;

    println!();
    println!("SHA-256: {}", outcome.fingerprint.sha256);
    println!("MD5:     {}", outcome.fingerprint.md5);
    println!("Stored as: {}", outcome.stored_name);
    println!("ELA visualization: {}", outcome.ela_filename);
    println!();
    println!("Metadata:");
    for (field, value) in outcome.metadata.iter() {
        println!("  {:<14} {}", format!("{field}:"), value.display());
    }
    for flag in outcome.metadata.flags() {
        println!("  {flag}");
    }

    let verification = engine.verify_authenticity(&outcome.stored_name)?;
    println!();
    println!(
        "Authenticity score: {} / 100 ({:?} risk)",
        verification.report.authenticity_score, verification.report.risk_level
    );
    for flag in &verification.report.flags {
        println!("  - {flag}");
    }
    println!("{}", verification.report.recommendation);

    let evidence = engine.ai_analyze(&outcome.metadata.to_field_map());
    println!();
    println!(
        "Forgery analysis: {} / 100 ({:?})",
        evidence.confidence_score, evidence.verdict
    );
    for item in &evidence.evidence {
        println!("  - {item}");
    }

    Ok(())
}
