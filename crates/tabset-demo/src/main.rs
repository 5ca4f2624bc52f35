//! tabset demo - Main Entry Point
//!
//! Loads a static page into the simulated host, mounts every container on
//! it and plays a command script against it, logging each notification.
//!
//! ```text
//! tabset-demo page.html [script] [--width 600] [--verbose]
//! ```
//!
//! Without a script the page is mounted, run to idle and dumped.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tabset::sim::SimHost;
use tabset::{Dom, Input, InstanceId, Manager, NodeId, markers};
use tabset_html::{HtmlLoader, HtmlSerializer};
use tracing_subscriber::EnvFilter;

use script::Command;

/// Drive tabset widgets on a static page
#[derive(Parser)]
#[command(name = "tabset-demo", version, about)]
struct Cli {
    /// HTML page to load
    page: PathBuf,
    /// Command script; without one the page is run to idle and dumped
    script: Option<PathBuf>,
    /// Viewport width in px
    #[arg(long, default_value_t = 1024)]
    width: u32,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

struct Demo {
    manager: Manager<SimHost>,
}

impl Demo {
    fn new(page: &Path, width: u32) -> Result<Self> {
        let tree = HtmlLoader::new()
            .load_file(page)
            .with_context(|| format!("failed to load {}", page.display()))?;
        let mut host = SimHost::new(tree);
        host.set_viewport_width(width);
        let mut manager = Manager::new(host);
        let root = manager.host().tree().root();
        let mounted = manager.discover(root);
        tracing::info!("mounted {} instance(s) from {}", mounted.len(), page.display());

        let mut demo = Self { manager };
        demo.report();
        Ok(demo)
    }

    fn instance(&self, n: u64) -> Result<InstanceId> {
        self.manager
            .instances()
            .map(|i| i.id())
            .find(|id| id.value() == n)
            .with_context(|| format!("no instance tabs#{n}"))
    }

    fn trigger(&self, id: &str) -> Result<NodeId> {
        let tree = self.manager.host().tree();
        tree.find_by_attribute(tree.root(), markers::TRIGGER)
            .into_iter()
            .find(|&n| tree.get_attribute(n, markers::TRIGGER) == Some(id))
            .with_context(|| format!("no trigger `{id}`"))
    }

    fn input(&mut self, id: &str, input: Input) -> Result<()> {
        let node = self.trigger(id)?;
        if !self.manager.input(node, input) {
            tracing::warn!("{input:?} on `{id}` was ignored");
        }
        Ok(())
    }

    fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Click(id) => self.input(&id, Input::Click)?,
            Command::Hover(id) => self.input(&id, Input::Hover)?,
            Command::Key(id, key) => self.input(&id, Input::Key(key))?,
            Command::Show(n, target) => {
                let id = self.instance(n)?;
                self.manager.show(id, target)?;
            }
            Command::Next(n) => {
                let id = self.instance(n)?;
                self.manager.next(id)?;
            }
            Command::Prev(n) => {
                let id = self.instance(n)?;
                self.manager.prev(id)?;
            }
            Command::Accordion(n, on) => {
                let id = self.instance(n)?;
                self.manager.set_accordion(id, on)?;
            }
            Command::Enable(n) => {
                let id = self.instance(n)?;
                self.manager.enable(id)?;
            }
            Command::Disable(n) => {
                let id = self.instance(n)?;
                self.manager.disable(id)?;
            }
            Command::Refresh(n) => {
                let id = self.instance(n)?;
                self.manager.refresh(id)?;
            }
            Command::Destroy(n) => {
                let id = self.instance(n)?;
                self.manager.destroy(id)?;
            }
            Command::Advance(ms) => self.manager.advance(ms),
            Command::Idle => self.manager.run_until_idle(),
            Command::Viewport(px) => {
                self.manager.host_mut().set_viewport_width(px);
                self.manager.viewport_changed();
            }
            Command::ReducedMotion(on) => self.manager.host_mut().set_reduced_motion(on),
            Command::State => self.state(),
            Command::Dump => self.dump(),
        }
        self.report();
        Ok(())
    }

    /// Print queued notifications
    fn report(&mut self) {
        let now = self.manager.host().now();
        for event in self.manager.drain_events() {
            match event.id() {
                Some(id) => println!("[{now:>6} ms] {} {} {}", event.instance(), event.name(), id),
                None => println!("[{now:>6} ms] {} {}", event.instance(), event.name()),
            }
        }
    }

    fn state(&self) {
        for instance in self.manager.instances() {
            let mut line = format!("{} {:?}", instance.id(), instance.state());
            if let Some(active) = instance.active_id() {
                line.push_str(&format!(" active={active}"));
            }
            if instance.is_accordion() {
                line.push_str(&format!(" expanded=[{}]", instance.expanded_ids().join(",")));
            }
            if instance.is_autoplaying() {
                line.push_str(" autoplay");
            }
            println!("{line}");
        }
    }

    fn dump(&self) {
        let host = self.manager.host();
        let tree = host.tree();
        println!("{}", HtmlSerializer::pretty().serialize_inner(tree, tree.root()));
        let hidden = tree
            .find_by_attribute(tree.root(), markers::PANEL)
            .into_iter()
            .filter(|&panel| !host.is_rendered(panel))
            .count();
        tracing::debug!("{hidden} panel(s) hidden");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut demo = Demo::new(&cli.page, cli.width)?;

    let Some(path) = cli.script else {
        demo.manager.run_until_idle();
        demo.report();
        demo.state();
        demo.dump();
        return Ok(());
    };

    let name = path.display().to_string();
    let text = std::fs::read_to_string(&path).with_context(|| format!("failed to read {name}"))?;
    for (line, command) in script::parse(&text).with_context(|| format!("in {name}"))? {
        tracing::debug!("{name}:{line} {command:?}");
        demo.run(command).with_context(|| format!("{name}:{line}"))?;
    }
    Ok(())
}
