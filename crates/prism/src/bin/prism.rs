// ABOUTME: CLI binary for Prism: extracts URLs, video links, raw text, or local HTML files.
// ABOUTME: Prints canonical paragraphs as text or JSON; exits 1 if any input failed.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use prism_extract::{CanonicalDocument, ExtractError, Extractor};

/// Longest input prefix shown in per-input error lines.
const MAX_LABEL_CHARS: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(about = "Extract clean, paragraph-structured text from articles, videos, or raw text")]
struct Args {
    /// URLs or raw text to extract; `-` reads one input from stdin
    #[arg()]
    inputs: Vec<String>,

    /// Read an input from a file (repeatable)
    #[arg(long = "file")]
    files: Vec<PathBuf>,

    /// HTML file to normalize without fetching (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for --html
    #[arg(long = "url")]
    url: Option<String>,

    /// Output documents as JSON instead of plain text
    #[arg(long = "json")]
    json_output: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "PRISM_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Maximum redirect hops per fetch
    #[arg(long, env = "PRISM_MAX_REDIRECTS", default_value_t = 5)]
    max_redirects: usize,

    /// Drop HTML paragraphs shorter than this many characters
    #[arg(long, env = "PRISM_MIN_PARAGRAPH_CHARS", default_value_t = 20)]
    min_paragraph_chars: usize,

    /// Preferred caption language for video transcripts
    #[arg(long, env = "PRISM_LANG", default_value = "en")]
    lang: String,

    /// Only accept article and video URLs; reject raw text
    #[arg(long, env = "PRISM_STRICT")]
    strict: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks", env = "PRISM_ALLOW_PRIVATE_NETWORKS")]
    allow_private_networks: bool,

    /// Truncate each document to about this many characters
    #[arg(long, env = "PRISM_MAX_CHARS")]
    max_chars: Option<usize>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

/// Initialize tracing on stderr from RUST_LOG (default `warn`), as JSON when
/// PRISM_LOG_FORMAT=json.
fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    match std::env::var("PRISM_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
        }
        _ => {
            let _ = builder.with(fmt_layer.compact()).try_init();
        }
    }
}

fn label(input: &str) -> String {
    let first_line = input.trim().lines().next().unwrap_or_default();
    let mut chars = first_line.chars();
    let shown: String = chars.by_ref().take(MAX_LABEL_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", shown)
    } else {
        shown
    }
}

fn report(input: &str, err: &ExtractError) {
    tracing::debug!(error = %err, "input failed");
    eprintln!("error: {}: {}", label(input), err.user_message());
}

/// Collect every input: positional arguments (with `-` as stdin), then files.
fn gather_inputs(args: &Args) -> anyhow::Result<Vec<String>> {
    let mut inputs = Vec::new();
    for input in &args.inputs {
        if input == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            inputs.push(buf);
        } else {
            inputs.push(input.clone());
        }
    }
    for path in &args.files {
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        inputs.push(text);
    }
    Ok(inputs)
}

fn format_output(docs: &[CanonicalDocument], json_output: bool) -> anyhow::Result<String> {
    if json_output {
        let json = if docs.len() == 1 {
            serde_json::to_string_pretty(&docs[0])?
        } else {
            serde_json::to_string_pretty(docs)?
        };
        Ok(json)
    } else {
        Ok(docs
            .iter()
            .map(CanonicalDocument::text)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

fn build_extractor(args: &Args) -> anyhow::Result<Extractor> {
    let extractor = Extractor::builder()
        .timeout(Duration::from_secs(args.timeout))
        .max_redirects(args.max_redirects)
        .min_paragraph_chars(args.min_paragraph_chars)
        .transcript_lang(args.lang.clone())
        .accept_raw_text(!args.strict)
        .allow_private_networks(args.allow_private_networks)
        .build()?;
    Ok(extractor)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    if args.html.is_some() && args.url.is_none() {
        eprintln!("error: --url is required when using --html");
        return ExitCode::from(1);
    }
    if args.html.is_some() && (!args.inputs.is_empty() || !args.files.is_empty()) {
        eprintln!("error: cannot use --html together with other inputs");
        return ExitCode::from(1);
    }
    if args.html.is_none() && args.inputs.is_empty() && args.files.is_empty() {
        eprintln!("error: at least one input is required, or use --html with --url");
        return ExitCode::from(1);
    }

    let extractor = match build_extractor(&args) {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();
    let mut docs: Vec<CanonicalDocument> = Vec::new();
    let mut had_error = false;

    if let (Some(html_path), Some(url)) = (&args.html, &args.url) {
        match fs::read_to_string(html_path) {
            Ok(html) => match extractor.extract_html(&html, url) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    report(url, &e);
                    had_error = true;
                }
            },
            Err(e) => {
                eprintln!("error: reading file {:?}: {}", html_path, e);
                had_error = true;
            }
        }
    } else {
        let inputs = match gather_inputs(&args) {
            Ok(inputs) => inputs,
            Err(e) => {
                eprintln!("error: {:#}", e);
                return ExitCode::from(1);
            }
        };
        let outcomes = extractor.extract_many(&inputs).await;
        for (input, outcome) in inputs.iter().zip(outcomes) {
            match outcome {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    report(input, &e);
                    had_error = true;
                }
            }
        }
    }

    let elapsed = start.elapsed();

    if let Some(max_chars) = args.max_chars {
        docs = docs.iter().map(|d| d.truncate(max_chars)).collect();
    }

    if !docs.is_empty() {
        match format_output(&docs, args.json_output) {
            Ok(output) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output) {
                        eprintln!("error: writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output);
                }
            }
            Err(e) => {
                eprintln!("error: {:#}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
