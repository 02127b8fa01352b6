use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use proxy_sweep::{
    console,
    proxy::{ProxyChecker, ProxyFetcher, ProxyParser},
};
use std::time::Instant;

/// File the working proxies are written to
const OUTPUT_FILE: &str = "proxies.txt";

/// Fetches public proxy lists and concurrently checks which proxies work
#[derive(Parser)]
#[command(name = "proxy-sweep", version)]
#[command(about = "Fetches public proxy lists and concurrently checks which proxies work")]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Cli::parse();

    let start = Instant::now();
    console::display_banner();

    println!("Fetching proxies...");
    let fetcher = ProxyFetcher::new()?;
    let proxies = fetcher.fetch_proxies().await?;
    let total = proxies.len();
    println!("Retrieved {total} proxies. Testing now...\n");

    let multi = MultiProgress::new();
    let testing_style = ProgressStyle::with_template("{msg:<40!} {pos}/{len} [{wide_bar:.red}]")?;
    let working_style = ProgressStyle::with_template("{msg:<40!} {pos}/{len} [{wide_bar:.green}]")?;
    let testing_bar = multi.add(ProgressBar::new(total as u64).with_style(testing_style));
    let working_bar = multi.add(ProgressBar::new(total as u64).with_style(working_style));
    testing_bar.set_message("Testing");
    working_bar.set_message("Working");

    let checker = ProxyChecker::new();
    let mut working = Vec::new();
    let mut tested = 0usize;

    let mut completions = checker.check_stream(proxies);
    while let Some((proxy, passed)) = completions.next().await {
        tested += 1;
        testing_bar.set_message(format!("Testing {proxy}"));
        testing_bar.inc(1);

        if passed {
            working_bar.inc(1);
            working.push(proxy);
        }

        console::set_console_title(&format!(
            "Testing {tested}/{total} | Working {}/{total}",
            working.len()
        ));
    }

    testing_bar.finish();
    working_bar.finish();

    ProxyParser::save_to_file(&working, OUTPUT_FILE)
        .with_context(|| format!("Failed to write {OUTPUT_FILE}"))?;

    println!("\n{}/{} proxies working.", working.len(), total);
    println!("Saved to {OUTPUT_FILE}");
    println!("\nFinished in {:.1}s", start.elapsed().as_secs_f64());

    console::pause_for_exit();
    Ok(())
}
