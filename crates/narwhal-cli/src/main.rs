use clap::{ArgAction, Parser, ValueEnum};
use narwhal::tree::{Tree, TreeInput};
use narwhal::{Layout, LayoutSettings, PlacementMode};
use serde::Deserialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Tree(#[from] narwhal::tree::Error),
    #[error(transparent)]
    Layout(#[from] narwhal::Error),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Keep every edge at its scaled length.
    LengthConstrained,
    /// Put midpoints halfway to their leaves.
    Spider,
}

impl From<Mode> for PlacementMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::LengthConstrained => PlacementMode::LengthConstrained,
            Mode::Spider => PlacementMode::Spider,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "narwhal",
    version,
    about = "Lay out a weighted call tree on three sides of a canvas",
    after_help = "Input is a JSON tree `{name, between, within, children}` or an array of them.\n\
                  Flags override values read from --config."
)]
struct Cli {
    /// Tree JSON file; omit or pass '-' to read stdin.
    input: Option<PathBuf>,
    /// Layout settings JSON (camelCase keys, missing keys take defaults).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    distance_from_edge: Option<f64>,
    /// Keep the canvas at its configured height.
    #[arg(long)]
    no_stretch: bool,
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Lay out only these node ids (repeatable).
    #[arg(long = "subset", value_name = "ID")]
    subset: Vec<String>,
    /// Write the result here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputDoc {
    Forest(Vec<TreeInput>),
    Single(TreeInput),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "narwhal=debug",
        _ => "narwhal=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn display_path(path: Option<&PathBuf>, stdio: &str) -> String {
    match path {
        Some(p) if p.as_os_str() != "-" => p.display().to_string(),
        _ => stdio.to_string(),
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    let io_err = |source| CliError::Io {
        path: display_path(path, "<stdin>"),
        source,
    };
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p).map_err(io_err),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
            Ok(buf)
        }
    }
}

fn load_settings(cli: &Cli) -> Result<LayoutSettings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => {
            let text = read_input(Some(path))?;
            serde_json::from_str(&text).map_err(|source| CliError::Json {
                path: path.display().to_string(),
                source,
            })?
        }
        None => LayoutSettings::default(),
    };
    if let Some(width) = cli.width {
        settings.svg_width = width;
    }
    if let Some(height) = cli.height {
        settings.svg_height = height;
    }
    if let Some(edge) = cli.distance_from_edge {
        settings.svg_distance_from_edge = edge;
    }
    if cli.no_stretch {
        settings.allow_stretch = false;
    }
    if let Some(mode) = cli.mode {
        settings.placement_mode = mode.into();
    }
    Ok(settings)
}

fn load_tree(cli: &Cli) -> Result<Tree, CliError> {
    let text = read_input(cli.input.as_ref())?;
    let doc: InputDoc = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: display_path(cli.input.as_ref(), "<stdin>"),
        source,
    })?;
    let tree = match doc {
        InputDoc::Forest(inputs) => Tree::from_inputs(&inputs)?,
        InputDoc::Single(input) => Tree::from_input(&input)?,
    };
    Ok(tree)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = load_settings(cli)?;
    let tree = load_tree(cli)?;
    tracing::debug!(nodes = tree.len(), roots = tree.roots().len(), "loaded tree");

    let mut layout = if cli.subset.is_empty() {
        Layout::new(&tree, settings)?
    } else {
        Layout::with_subset(&tree, cli.subset.iter().map(String::as_str), settings)?
    };
    let result = layout.generate()?;

    let out_path = display_path(cli.out.as_ref(), "<stdout>");
    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .map_err(|source| CliError::Json {
        path: out_path.clone(),
        source,
    })?;

    let io_err = |source| CliError::Io {
        path: out_path.clone(),
        source,
    };
    match cli.out.as_ref().filter(|p| p.as_os_str() != "-") {
        Some(path) => std::fs::write(path, format!("{json}\n")).map_err(io_err)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").map_err(io_err)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
