use clap::Parser;
use image_grab::{BatchResult, ImageGrab};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    ::log::info!("Starting image grab for URL: {}", args.url);

    let mut grab = ImageGrab::new(args.url.as_str(), args.destination.clone());

    if let Some(path) = &args.config {
        grab = match grab.with_config_file(path) {
            Ok(grab) => grab,
            Err(e) => {
                ::log::error!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        };
    }
    if let Some(concurrency) = args.concurrency {
        grab = grab.with_max_concurrency(concurrency);
    }
    if let Some(timeout) = args.timeout {
        grab = grab.with_request_timeout(timeout);
    }
    for pattern in &args.include {
        grab = grab.with_include_pattern(pattern.as_str());
    }
    for pattern in &args.exclude {
        grab = grab.with_exclude_pattern(pattern.as_str());
    }

    let start_time = std::time::Instant::now();
    let batch = match grab.run().await {
        Ok(batch) => batch,
        Err(e) => {
            ::log::error!("Image grab failed: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!(
        "Processed {} images in {:.2} seconds",
        batch.len(),
        start_time.elapsed().as_secs_f64()
    );

    if args.json {
        match serde_json::to_string_pretty(&batch) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                ::log::error!("Failed to serialize result: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&batch);
    }
}

fn print_summary(batch: &BatchResult) {
    for outcome in batch {
        match (outcome.local_path(), outcome.failure_reason()) {
            (Some(path), _) => println!(
                "ok    {} -> {} ({} bytes)",
                outcome.source_url,
                path.display(),
                outcome.byte_size().unwrap_or_default()
            ),
            (None, reason) => println!(
                "fail  {}: {}",
                outcome.source_url,
                reason.unwrap_or_default()
            ),
        }
    }
    println!(
        "{} downloaded, {} failed",
        batch.succeeded().count(),
        batch.failed().count()
    );
}
