use std::env;
use std::path::PathBuf;

use odsgen_core::Dataset;
use odsgen_generate::{GenerateOptions, GenerationEngine, TargetSize};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut dataset = Dataset::Employees;
    let mut out: Option<PathBuf> = None;
    let mut kilobytes = 512_u64;
    let mut options = GenerateOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => dataset = args.next().ok_or("missing --dataset value")?.parse()?,
            "--out" => out = args.next().map(PathBuf::from),
            "--kb" => kilobytes = args.next().ok_or("missing --kb value")?.parse()?,
            "--seed" => options.seed = Some(args.next().ok_or("missing --seed value")?.parse()?),
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let out = out.unwrap_or_else(|| PathBuf::from(format!("{}_sample.csv", dataset.file_prefix())));
    let engine = GenerationEngine::new(options);
    let result = engine.run(&dataset.schema(), &out, TargetSize::bytes(kilobytes * 1024))?;

    println!("{}", serde_json::to_string_pretty(&result.report)?);
    Ok(())
}
