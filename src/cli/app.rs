//! Dispatch and process entry point
//!
//! The dispatcher drives one resolved plugin over the input paths. The
//! entry point wraps it with logging, SIGINT handling, the error
//! inspection hook, and the exit code policy: 0 for success (including
//! plugin listings and interrupted runs), 1 for everything fatal.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use signal_hook::consts::SIGINT;
use tracing::{debug, error};

use super::resolve::{resolve, Outcome, ResolveError};
use crate::args::ResolvedArgs;
use crate::config::Config;
use crate::logging;
use crate::plugin::PluginRegistry;
use crate::profile::Profiler;
use crate::walk::Walker;

/// Inspection hook run on uncaught errors when `--pdb` is set.
pub type ErrorHook = Box<dyn Fn(&anyhow::Error)>;

/// Drives the resolved plugin over every input path.
pub struct Dispatcher {
    interrupt: Arc<AtomicBool>,
    profiler: Option<Profiler>,
}

impl Dispatcher {
    pub fn new(interrupt: Arc<AtomicBool>) -> Self {
        Self {
            interrupt,
            profiler: None,
        }
    }

    /// Attaches a profiler; every per-file callback gets timed.
    pub fn with_profiler(mut self) -> Self {
        self.profiler = Some(Profiler::new());
        self
    }

    /// Runs the plugin lifecycle: `start`, one `handle_file` per visited
    /// file, then `handle_done`. An interrupted run stops between files,
    /// skips `handle_done`, and still counts as success.
    pub fn run(&mut self, args: &mut ResolvedArgs, config: Option<&Config>) -> Result<i32> {
        let Self {
            interrupt,
            profiler,
        } = self;
        let ResolvedArgs {
            options, plugin, ..
        } = args;

        plugin.start(options, config)?;

        if let Some(profiler) = profiler.as_mut() {
            profiler.begin();
        }

        let walker = Walker::new(&options.excludes, options.fs_encoding)?;
        let mut on_file = |path: &Path| match profiler.as_mut() {
            Some(profiler) => profiler.time(path, || plugin.handle_file(path)),
            None => plugin.handle_file(path),
        };

        for path in &options.paths {
            if interrupt.load(Ordering::Relaxed) {
                debug!("interrupted, skipping remaining paths");
                break;
            }
            walker.walk(path, interrupt, &mut on_file)?;
        }

        if !interrupt.load(Ordering::Relaxed) {
            plugin.handle_done()?;
        }

        Ok(0)
    }

    /// Report from the attached profiler, if any.
    pub fn profile_report(&self) -> Option<String> {
        self.profiler.as_ref().map(|p| p.report())
    }
}

/// Wires resolution, dispatch, signals, and error reporting together.
pub struct EntryPoint {
    registry: PluginRegistry,
    interrupt: Arc<AtomicBool>,
    error_hook: Option<ErrorHook>,
}

impl EntryPoint {
    pub fn new() -> Self {
        Self {
            registry: PluginRegistry::builtin(),
            interrupt: Arc::new(AtomicBool::new(false)),
            error_hook: None,
        }
    }

    /// Installs the hook run on uncaught errors under `--pdb`.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    /// Flag polled between files; a SIGINT handler sets it.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Resolves and dispatches one command line, returning the exit code.
    pub fn run(&mut self, raw: Vec<String>) -> i32 {
        match resolve(&mut self.registry, raw) {
            Ok(Outcome::Run { mut args, config }) => self.dispatch(&mut args, config.as_ref()),
            Ok(Outcome::Exit(code)) => code,
            Err(ResolveError::Usage(err)) => {
                // clap routes this to stderr with usage attached.
                let _ = err.print();
                1
            }
            Err(err) => {
                eprintln!("error: {err}");
                1
            }
        }
    }

    fn dispatch(&mut self, args: &mut ResolvedArgs, config: Option<&Config>) -> i32 {
        let mut dispatcher = Dispatcher::new(Arc::clone(&self.interrupt));
        if args.options.profile {
            dispatcher = dispatcher.with_profiler();
        }

        let result = dispatcher.run(args, config);

        if let Some(report) = dispatcher.profile_report() {
            eprint!("{report}");
        }

        match result {
            Ok(code) => code,
            Err(err) => {
                self.report_error(&err, args.options.pdb);
                1
            }
        }
    }

    /// Plain one-line form for I/O errors; full context chain, a log
    /// record, and the optional inspection hook for everything else.
    fn report_error(&self, err: &anyhow::Error, pdb: bool) {
        if err.downcast_ref::<std::io::Error>().is_some() {
            eprintln!("error: {err:#}");
            return;
        }

        error!("uncaught error: {err:#}");
        eprintln!("error: {err:#}");

        if pdb {
            if let Some(hook) = &self.error_hook {
                hook(err);
            }
        }
    }
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self::new()
    }
}

/// Process front door: capture the argument vector, run one dispatch,
/// hand the exit code back to `main`.
pub fn run() -> i32 {
    logging::init();

    let raw: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let mut entry = EntryPoint::new().with_error_hook(Box::new(|err| {
        eprintln!("{err:?}");
    }));

    if let Err(err) = signal_hook::flag::register(SIGINT, entry.interrupt_flag()) {
        debug!("cannot register SIGINT handler: {err}");
    }

    entry.run(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Options;
    use crate::cli::Grammar;
    use crate::plugin::Plugin;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct RecordingPlugin {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Plugin for RecordingPlugin {
        fn start(&mut self, _options: &Options, _config: Option<&Config>) -> Result<()> {
            self.log.borrow_mut().push("start".to_string());
            Ok(())
        }

        fn handle_file(&mut self, path: &Path) -> Result<()> {
            self.log
                .borrow_mut()
                .push(path.file_name().unwrap().to_string_lossy().into_owned());
            Ok(())
        }

        fn handle_done(&mut self) -> Result<()> {
            self.log.borrow_mut().push("done".to_string());
            Ok(())
        }
    }

    fn resolved_over(paths: &[&str]) -> (ResolvedArgs, Rc<RefCell<Vec<String>>>) {
        let tokens: Vec<String> = paths.iter().map(|s| s.to_string()).collect();
        let matches = Grammar::base().parse(&tokens).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let args = ResolvedArgs {
            options: Options::from_matches(matches),
            plugin_name: "recording".to_string(),
            plugin: Box::new(RecordingPlugin {
                log: Rc::clone(&log),
            }),
        };
        (args, log)
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        dir
    }

    #[test]
    fn dispatch_runs_the_full_lifecycle_in_order() {
        let dir = sample_tree();
        let (mut args, log) = resolved_over(&[&dir.path().to_string_lossy()]);

        let mut dispatcher = Dispatcher::new(Arc::new(AtomicBool::new(false)));
        let code = dispatcher.run(&mut args, None).unwrap();

        assert_eq!(code, 0);
        assert_eq!(*log.borrow(), vec!["start", "a.txt", "b.txt", "done"]);
    }

    #[test]
    fn interrupt_skips_paths_and_handle_done() {
        let dir = sample_tree();
        let (mut args, log) = resolved_over(&[&dir.path().to_string_lossy()]);

        let mut dispatcher = Dispatcher::new(Arc::new(AtomicBool::new(true)));
        let code = dispatcher.run(&mut args, None).unwrap();

        // Interrupted is still success; only start ever ran.
        assert_eq!(code, 0);
        assert_eq!(*log.borrow(), vec!["start"]);
    }

    #[test]
    fn profiler_times_each_file() {
        let dir = sample_tree();
        let (mut args, _log) = resolved_over(&[&dir.path().to_string_lossy()]);

        let mut dispatcher = Dispatcher::new(Arc::new(AtomicBool::new(false))).with_profiler();
        dispatcher.run(&mut args, None).unwrap();

        let report = dispatcher.profile_report().unwrap();
        assert!(report.contains("2 files"));
    }

    #[test]
    fn missing_path_fails_dispatch() {
        let (mut args, _log) = resolved_over(&["/nonexistent/rove-app"]);

        let mut dispatcher = Dispatcher::new(Arc::new(AtomicBool::new(false)));
        assert!(dispatcher.run(&mut args, None).is_err());
    }

    #[test]
    fn entry_point_maps_outcomes_to_exit_codes() {
        let dir = sample_tree();
        let cfg = dir.path().join("config.toml");
        fs::write(&cfg, "").unwrap();
        let cfg = cfg.to_string_lossy().into_owned();

        let mut entry = EntryPoint::new();
        assert_eq!(
            entry.run(vec!["-C".into(), cfg.clone(), "-L".into()]),
            0
        );
        assert_eq!(
            entry.run(vec!["-C".into(), cfg.clone(), "-P".into(), "bogus".into()]),
            1
        );
        assert_eq!(entry.run(vec!["-C".into(), cfg, "--bogus".into()]), 1);
        assert_eq!(entry.run(vec!["-C".into(), "/nonexistent/cfg.toml".into()]), 1);
    }

    #[test]
    fn error_hook_runs_only_for_pdb_and_non_io_errors() {
        let called = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&called);
        let entry = EntryPoint::new().with_error_hook(Box::new(move |_| {
            *seen.borrow_mut() += 1;
        }));

        let plain = anyhow::anyhow!("plugin exploded");
        entry.report_error(&plain, false);
        assert_eq!(*called.borrow(), 0);

        entry.report_error(&plain, true);
        assert_eq!(*called.borrow(), 1);

        // I/O errors take the quiet path even under --pdb.
        let io = anyhow::Error::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        entry.report_error(&io, true);
        assert_eq!(*called.borrow(), 1);
    }
}
