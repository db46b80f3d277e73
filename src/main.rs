use anyhow::Result;
use clap::Parser;
use keychord::keybindings::EditorMode;
use keychord::{config, tui};

#[derive(Parser, Debug)]
#[command(name = "keychord")]
#[command(about = "Try out keyboard shortcuts, chords and editor modes in the terminal")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    /// Editor mode to start in (default, vim, emacs)
    #[arg(long, short)]
    mode: Option<EditorMode>,

    /// Print the active shortcuts and exit
    #[arg(long)]
    list: bool,

    /// With --list, print JSON instead of help text
    #[arg(long, requires = "list")]
    json: bool,

    /// Write a template config file
    #[arg(long)]
    init: bool,

    /// With --init, overwrite an existing config
    #[arg(long, requires = "init")]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not mix with listings
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keychord=info".parse()?),
        )
        .init();

    if args.init {
        let path = config::init(args.config.as_deref(), args.force)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;

    if args.list {
        return tui::list(&config, args.mode, args.json);
    }

    tui::run(config, args.mode).await
}
