use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsearch::app::{self, RunArgs};
use docsearch::config;
use docsearch::state::RunState;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("DOCSEARCH_BUILD_TIME"),
    ")"
);

/// Flags that also accept the single-dash spelling (`-index`, `-db`)
const LONG_FLAGS: &[&str] = &["index", "db"];

/// Index a directory of markdown notes, or search a previously built index.
///
/// With `-index <dir>` a build pass runs; otherwise the remaining arguments
/// are joined into the query text.
#[derive(Parser, Debug)]
#[command(name = "docsearch", version, long_version = LONG_VERSION)]
struct Cli {
    /// Index documents in this directory / 索引该目录下的文档
    #[arg(long = "index", value_name = "DIR")]
    index: Option<PathBuf>,

    /// Index file (default: docs-index.db) / 索引文件
    #[arg(long = "db", value_name = "PATH")]
    db: Option<String>,

    /// Query words / 查询词
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,
}

/// Rewrite Go-style `-index`/`-db` into `--index`/`--db` up to the first positional argument
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut iter = args.into_iter();
    let mut out: Vec<OsString> = iter.next().into_iter().collect();

    let mut in_flags = true;
    let mut takes_value = false;
    for arg in iter {
        if !in_flags || takes_value {
            takes_value = false;
            out.push(arg);
            continue;
        }

        let text = arg.to_string_lossy().into_owned();
        if text == "--" {
            in_flags = false;
            out.push(arg);
            continue;
        }

        let (name, rewrite) = if let Some(rest) = text.strip_prefix("--") {
            (rest, false)
        } else if let Some(rest) = text.strip_prefix('-') {
            (rest, true)
        } else {
            in_flags = false;
            out.push(arg);
            continue;
        };

        let (flag, inline_value) = match name.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (name, false),
        };
        if LONG_FLAGS.contains(&flag) {
            takes_value = !inline_value;
            if rewrite {
                out.push(format!("-{}", text).into());
                continue;
            }
        }
        out.push(arg);
    }
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsearch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    // Load configuration / 加载配置
    let mut app_config = config::load_config(&config::get_config_path())?;
    if let Some(db) = cli.db {
        app_config.database.path = db;
    }

    let state = RunState::new();
    let signal_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            signal_state.cancel();
        }
    });

    let args = RunArgs {
        index_dir: cli.index,
        database: app_config.database.path.clone(),
        query: cli.query,
    };
    let mut out = std::io::BufWriter::new(std::io::stdout());
    app::run(&app_config, args, &state, &mut out).await?;
    Ok(())
}
