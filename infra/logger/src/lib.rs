//! # Logger
//!
//! Installs the tracing subscriber for a process that runs deploy resolutions.
//!
//! A resolution prints its configuration tree on **stdout**, so every log record goes to
//! stderr or to rolling files. Resolver and channel records carry target names, hosts and
//! env key names only; secret values are never logged, so file output needs no scrubbing.
//!
//! Keep the returned [`Logger`] alive until the process exits. It owns the background
//! writer of the file layer, and dropping it flushes pending records.
//!
//! `RUST_LOG` overrides the default level unless [`LoggerBuilder::env_filter`] is set.
//!
//! ## Example
//!
//! ```rust
//! # use dpack_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("dpack")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("dpack_resolver=debug,dpack_channel=info")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// One week of daily resolution logs.
const RETAINED_FILES: usize = 7;
const FILE_SUFFIX: &str = "log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug)]
struct Settings {
    console: bool,
    level: LevelFilter,
    directives: Option<String>,
    files: Option<FileSettings>,
}

#[derive(Debug)]
struct FileSettings {
    dir: PathBuf,
    rotation: Rotation,
    retained: usize,
    json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, directives: None, files: None }
    }
}

/// Builder state: no name yet.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state: named; the name also prefixes rolling files.
#[derive(Debug)]
pub struct Named(String);
/// Builder state: stderr only.
#[derive(Debug)]
pub struct ConsoleOnly;
/// Builder state: a log directory is set and file options are available.
#[derive(Debug)]
pub struct Rolling;

mod private {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}
impl Sealed for ConsoleOnly {}
impl Sealed for Rolling {}

/// Builder for the global subscriber. File options only exist after [`LoggerBuilder::path`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = Unnamed, F: Sealed = ConsoleOnly> {
    settings: Settings,
    name: N,
    output: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<Unnamed, F> {
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()), output: PhantomData }
    }
}

impl<F: Sealed> LoggerBuilder<Named, F> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Level from a settings file (`trace`..`error`, `off`).
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
    pub fn level_name(self, level: &str) -> Result<Self, LoggerError> {
        let parsed = LevelFilter::from_str(level).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid level '{level}': {e}").into(),
            context: None,
        })?;
        Ok(self.level(parsed))
    }

    /// Per-crate directives, e.g. `dpack_resolver=debug` to trace section building while
    /// keeping the channel quiet. Checked by [`LoggerBuilder::init`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Also writes records to rolling files under `dir`.
    pub fn path(self, dir: impl Into<PathBuf>) -> LoggerBuilder<Named, Rolling> {
        let mut settings = self.settings;
        settings.files = Some(FileSettings {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            retained: RETAINED_FILES,
            json: false,
        });
        LoggerBuilder { settings, name: self.name, output: PhantomData }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for a blank name, bad directives, zero retained
    /// files or no output at all; [`LoggerError::Internal`] or [`LoggerError::Appender`] when
    /// the log directory cannot be used; [`LoggerError::Subscriber`] when the process already
    /// has a subscriber.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Named(name) = self.name;
        let settings = self.settings;
        if name.trim().is_empty() {
            return Err(invalid("Logger name cannot be empty"));
        }

        let filter = env_filter(settings.level, settings.directives.as_deref())?;

        let mut layers: Vec<BoxedLayer<_>> = Vec::new();
        if settings.console {
            layers.push(console_layer());
        }
        let guard = match &settings.files {
            Some(files) => {
                let (layer, guard) = file_layer(&name, files)?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };
        if layers.is_empty() {
            return Err(invalid("Console output is off and no log directory is set"));
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        Ok(Logger { guard })
    }
}

impl LoggerBuilder<Named, Rolling> {
    /// Number of rolled files kept in the log directory.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn max_files(mut self, retained: usize) -> Self {
        if let Some(files) = self.settings.files.as_mut() {
            files.retained = retained;
        }
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(files) = self.settings.files.as_mut() {
            files.rotation = rotation;
        }
        self
    }

    /// One JSON object per record, for log shippers. The console stays human readable.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn json(mut self) -> Self {
        if let Some(files) = self.settings.files.as_mut() {
            files.json = true;
        }
        self
    }
}

/// Installed logging system.
#[must_use = "Dropping this handle stops background file logging."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: Unnamed, output: PhantomData }
    }

    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing resolution log files");
        }
    }
}

fn invalid(message: &'static str) -> LoggerError {
    LoggerError::InvalidConfiguration { message: message.into(), context: None }
}

fn env_filter(level: LevelFilter, directives: Option<&str>) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(level.into());
    match directives {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid env filter '{directives}': {e}").into(),
            context: None,
        }),
    }
}

fn console_layer<S>() -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer().compact().with_writer(std::io::stderr).with_ansi(true).boxed()
}

fn file_layer<S>(name: &str, files: &FileSettings) -> Result<(BoxedLayer<S>, WorkerGuard), LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if files.retained == 0 {
        return Err(invalid("max_files must be greater than zero"));
    }
    create_dir(&files.dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(files.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(files.retained)
        .build(&files.dir)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let layer = if files.json { layer.json().boxed() } else { layer.boxed() };
    Ok((layer, guard))
}

fn create_dir(dir: &Path) -> Result<(), LoggerError> {
    std::fs::create_dir_all(dir).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Failed to create log directory: {}", dir.display()).into()),
    })
}
