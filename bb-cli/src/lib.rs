use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bb::{Command, Config, Direction, Host, MarkItem, RegionSet, Rendered, Session, Span};
use clap::{Parser, Subcommand};
use stdx::path::PathExt;

#[derive(Debug, Parser)]
#[clap(name = "bb", version, about = "Layered bookmarks for text regions")]
pub struct Opts {
    /// Settings file, a JSON object of bookmark settings.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Where marks are cached (defaults to the user's cache directory).
    #[clap(long, global = true)]
    pub cache_dir: Option<PathBuf>,
    #[clap(long, global = true)]
    pub log: Option<PathBuf>,
    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Toggle marks on byte ranges given as `start:end` (or a single offset).
    Mark {
        path: PathBuf,
        #[clap(required = true, value_parser = parse_span)]
        spans: Vec<Span>,
        /// Mark on this layer instead of the default one.
        #[clap(long)]
        layer: Option<String>,
    },
    /// List the marks of a layer with the text they cover.
    Show {
        path: PathBuf,
        #[clap(long)]
        layer: Option<String>,
    },
    /// Remove the marks of a layer, or of every layer with `--all`.
    Clear {
        path: PathBuf,
        #[clap(long, conflicts_with = "all")]
        layer: Option<String>,
        #[clap(long)]
        all: bool,
    },
    /// Print the cache key and cache file of a document.
    Key { path: PathBuf },
    /// Run bookmark commands given as JSON objects, e.g. `{"subcommand": "layer_swap", "direction": "next"}`.
    Run {
        path: PathBuf,
        #[clap(required = true)]
        commands: Vec<String>,
    },
}

pub fn parse_span(s: &str) -> Result<Span, String> {
    let offset = |s: &str| s.trim().parse::<usize>().map_err(|err| format!("invalid offset `{s}`: {err}"));
    match s.split_once(':') {
        Some((start, end)) => Ok(Span::new(offset(start)?, offset(end)?)),
        None => offset(s).map(Span::point),
    }
}

/// A host for one document read from disk. There is nothing to draw on, so marks are only
/// reported when the user asks to see them.
#[derive(Debug, Default)]
pub struct CliHost {
    text: String,
    output: String,
    errors: Vec<String>,
    status: Option<String>,
}

impl CliHost {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Default::default() }
    }

    /// What should be printed to stdout.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn emit(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn emit_marks(&mut self, items: &[MarkItem]) {
        for item in items {
            let line = format!("{} {}", item.span, item.text.escape_debug());
            self.emit(&line);
        }
    }

    fn items(&self, regions: &RegionSet) -> Vec<MarkItem> {
        regions
            .iter()
            .map(|span| {
                let text = self.text(span);
                let text = if text.is_empty() { format!("empty region {span}") } else { text };
                MarkItem { span, text }
            })
            .collect()
    }
}

impl Host for CliHost {
    fn selections(&self) -> Vec<Span> {
        vec![]
    }

    fn lines(&self, span: Span) -> Vec<Span> {
        let mut lines = vec![];
        let mut start = 0;
        for line in self.text.split_inclusive('\n') {
            let end = start + line.trim_end_matches(['\r', '\n']).len();
            if end >= span.begin() && start <= span.end() {
                lines.push(Span::new(start, end));
            }
            start += line.len();
        }
        lines
    }

    fn text(&self, span: Span) -> String {
        self.text.get(span.range()).unwrap_or_default().to_string()
    }

    fn render(&mut self, rendered: Rendered<'_>) {
        tracing::debug!(layer = %rendered.layer.name(), marks = rendered.regions.len(), "render");
    }

    fn navigate(&mut self, direction: Direction, marks: &RegionSet) {
        let target = match direction {
            Direction::Next => marks.as_slice().first(),
            Direction::Prev => marks.as_slice().last(),
        };
        if let Some(span) = target {
            self.emit(&format!("{direction} {span}"));
        }
    }

    fn show_marks(&mut self, items: &[MarkItem]) {
        self.emit_marks(items);
    }

    fn error_message(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn status_message(&mut self, message: &str) {
        self.emit(message);
    }

    fn set_status(&mut self, _key: &str, text: Option<&str>) {
        self.status = text.map(ToString::to_string);
    }

    fn show_popup(&mut self, text: &str) {
        self.emit(text);
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else { return Ok(Config::default()) };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings `{}`", path.display()))?;
    Config::from_json(&json).with_context(|| format!("failed to load settings `{}`", path.display()))
}

pub fn session(opts: &Opts) -> anyhow::Result<Session> {
    let config = load_config(opts.config.as_deref())?;
    let session = match &opts.cache_dir {
        Some(dir) => Session::new(config, dir)?,
        None => Session::with_default_cache(config)?,
    };
    Ok(session)
}

/// Run one invocation: activate the document (loading its cached marks), run the commands on it,
/// then cache its marks and close it.
pub fn run(opts: &Opts, host: &mut CliHost) -> anyhow::Result<()> {
    let mut session = session(opts)?;

    let (path, commands) = match &opts.cmd {
        Cmd::Key { path } => {
            let path = path.absolutize()?;
            let cache = session.cache();
            host.emit(&format!("{} {}", cache.key_for(&path), cache.path_for(&path).display()));
            return Ok(());
        }
        Cmd::Mark { path, spans, layer } => (
            path,
            vec![Command::MarkLine { line: Some(spans.clone()), layer: layer.as_deref().map(Into::into) }],
        ),
        Cmd::Show { path, layer: None } => (path, vec![Command::ShowMarks]),
        Cmd::Show { path, layer: Some(_) } => (path, vec![]),
        Cmd::Clear { path, all: true, .. } => (path, vec![Command::ClearAll]),
        Cmd::Clear { path, layer, .. } => {
            (path, vec![Command::ClearMarks { layer: layer.as_deref().map(Into::into) }])
        }
        Cmd::Run { path, commands } => (
            path,
            commands.iter().map(|json| Command::from_json(json)).collect::<Result<Vec<_>, _>>()?,
        ),
    };

    match fs::read_to_string(path) {
        Ok(text) => host.text = text,
        Err(err) => tracing::debug!(path = %path.display(), %err, "document is unreadable, marks show no text"),
    }

    session.on_activated(host, path)?;
    for command in commands {
        session.execute(host, path, command)?;
    }

    if let Cmd::Show { layer: Some(layer), .. } = &opts.cmd {
        let engine = session.open(path)?;
        if !engine.ring().contains(layer) {
            return Err(bb::ConfigError::UnknownLayer(layer.as_str().into()).into());
        }
        let items = host.items(engine.regions(layer));
        host.emit_marks(&items);
    }

    session.execute(host, path, Command::OnSave)?;
    session.on_closed(host, Some(path.as_path()))?;
    Ok(())
}
