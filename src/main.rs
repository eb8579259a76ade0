use anyhow::Context;
use clap::Parser;
use pixtally::{Command, DisplayEvent, Document, Preloaded, Session, SessionConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Sum the pixel area of every leaf node in a JSON document export
#[derive(Parser, Debug)]
#[command(name = "pixtally", version, about)]
struct Args {
    /// Path to the document JSON
    document: PathBuf,

    /// Read JSON commands from stdin ({"type":"refresh"} / {"type":"close"})
    #[arg(long)]
    interactive: bool,

    /// Skip the computation normally run at startup (interactive mode only)
    #[arg(long)]
    no_initial: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn print_events(mut events: mpsc::Receiver<DisplayEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = events.recv().await {
            match serde_json::to_string(&ev) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("failed to encode event: {}", e),
            }
        }
    })
}

async fn run_once(document: Arc<Document>) -> anyhow::Result<bool> {
    let config = SessionConfig {
        compute_on_start: false,
        ..Default::default()
    };
    let (session, events) = Session::spawn(document, Arc::new(Preloaded), config)?;
    let printer = print_events(events);

    let res = session.refresh().await;
    session.close().await?;
    printer.await?;

    if let Err(e) = &res {
        eprintln!("pixtally: {}", e);
    }
    Ok(res.is_ok())
}

async fn run_interactive(document: Arc<Document>, compute_on_start: bool) -> anyhow::Result<bool> {
    let config = SessionConfig {
        compute_on_start,
        ..Default::default()
    };
    let (session, events) = Session::spawn(document, Arc::new(Preloaded), config)?;
    let printer = print_events(events);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(cmd) = serde_json::from_str::<Command>(&line) else {
            log::debug!("ignoring malformed command: {}", line);
            continue;
        };
        session.dispatch(cmd)?;
        if cmd == Command::Close {
            break;
        }
    }

    // already closed when the loop ended on a close command
    let _ = session.close().await;
    printer.await?;
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str()))
        .init();

    let file = std::fs::File::open(&args.document)
        .with_context(|| format!("cannot open {}", args.document.display()))?;
    let document = Document::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("cannot read {}", args.document.display()))?;
    log::info!("loaded {} page(s)", document.pages.len());

    let document = Arc::new(document);
    let ok = if args.interactive {
        run_interactive(document, !args.no_initial).await?
    } else {
        run_once(document).await?
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
