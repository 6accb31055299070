use crate::app_config::AppConfig;
use crate::pipeline::{LookupReport, Pipeline};
use crate::presentation::render;
use crate::search_form::{PLACEHOLDER, SearchQuery, ValidationError};
use crate::store::{Store, ViewState};
use std::future::Future;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::watch::Receiver;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, instrument, warn};

/// An in-flight lookup, aborted when dropped so a stale lookup can no longer touch the store.
#[derive(Debug)]
pub struct LookupTask {
    handle: JoinHandle<LookupReport>,
}

impl LookupTask {
    pub fn spawn<F>(lookup: F) -> Self
    where
        F: Future<Output = LookupReport> + Send + 'static,
    {
        LookupTask {
            handle: tokio::spawn(lookup),
        }
    }

    pub async fn finished(&mut self) -> Result<LookupReport, JoinError> {
        (&mut self.handle).await
    }
}

impl Drop for LookupTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("🛑 Aborting in-flight lookup");
            self.handle.abort();
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("could not read input: {0}")]
    Input(#[from] std::io::Error),
    #[error("lookup task failed: {0}")]
    Lookup(#[from] JoinError),
}

pub struct App {
    config: Arc<AppConfig>,
    pipeline: Pipeline,
    store: Store,
    lookup: Option<LookupTask>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, pipeline: Pipeline) -> Self {
        App {
            config,
            pipeline,
            store: Store::new(),
            lookup: None,
        }
    }

    /// Starts the lookup of the caller's own location, or of `query` when one is given.
    pub fn start(&mut self, query: Option<SearchQuery>) {
        match query {
            Some(query) => self.search(query),
            None => {
                let (pipeline, store) = (self.pipeline.clone(), self.store.clone());
                self.replace_lookup(LookupTask::spawn(async move { pipeline.run_initial(&store).await }));
            }
        }
    }

    /// Validates the search input and looks it up, replacing any lookup still in flight.
    pub fn submit(&mut self, input: &str) -> Result<(), ValidationError> {
        let query = SearchQuery::parse(input)?;
        self.search(query);
        Ok(())
    }

    fn search(&mut self, query: SearchQuery) {
        let (pipeline, store) = (self.pipeline.clone(), self.store.clone());
        self.replace_lookup(LookupTask::spawn(async move { pipeline.run_search(&store, &query).await }));
    }

    fn replace_lookup(&mut self, task: LookupTask) {
        // Dropping the previous task aborts it
        self.lookup = Some(task);
    }

    pub async fn wait_for_lookup(&mut self) -> Result<Option<LookupReport>, JoinError> {
        match self.lookup.as_mut() {
            Some(task) => task.finished().await.map(Some),
            None => Ok(None),
        }
    }

    /// Renders the outcome of a single lookup and returns.
    #[instrument(skip_all)]
    pub async fn run_once(mut self, query: Option<SearchQuery>) -> Result<(), AppError> {
        self.start(query);
        if let Some(report) = self.wait_for_lookup().await? {
            debug!(
                duration = ?report.duration,
                ip_resolved = ?report.ip.as_ref().map(Result::is_ok),
                geolocation_resolved = report.geolocation.is_ok(),
                "Lookup finished"
            );
        }

        print!("{}", self.view());
        Ok(())
    }

    fn view(&self) -> String {
        render(&self.store.snapshot(), self.config.map())
    }

    /// Renders every change and reads searches from stdin until EOF or Ctrl-C.
    #[instrument(skip_all)]
    pub async fn run_interactive(mut self, query: Option<SearchQuery>) -> Result<(), AppError> {
        let renderer = tokio::spawn(render_changes(self.store.subscribe(), self.config.clone()));
        self.start(query);

        let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()))?;
        let result = loop {
            tokio::select! {
                line = lines.recv() => match line {
                    Some(Ok(input)) => {
                        if let Err(e) = self.submit(&input) {
                            debug!(field = e.field, "Rejected search input");
                            println!("  ! {}", e);
                            print_prompt();
                        }
                    }
                    Some(Err(e)) => break Err(AppError::Input(e)),
                    None => break Ok(()),
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("👋 Interrupted");
                    break Ok(());
                }
            }
        };

        self.lookup.take();
        renderer.abort();
        result
    }
}

/// Reads lines on a dedicated thread, a read blocked there does not hold up runtime shutdown.
fn spawn_line_reader<R>(reader: R) -> std::io::Result<mpsc::Receiver<std::io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(8);
    thread::Builder::new().name("input".to_string()).spawn(move || {
        for line in reader.lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    })?;
    Ok(rx)
}

async fn render_changes(mut rx: Receiver<ViewState>, config: Arc<AppConfig>) {
    let mut last_view = String::new();
    loop {
        let view = render(&rx.borrow_and_update(), config.map());
        if view != last_view {
            println!("\n{}", view);
            print_prompt();
            last_view = view;
        }

        if rx.changed().await.is_err() {
            break;
        }
    }
}

fn print_prompt() {
    print!("{} › ", PLACEHOLDER);
    if let Err(e) = std::io::stdout().flush() {
        warn!("⚠️ Could not flush stdout: {}", e);
    }
}
