//! CLI command handler: score by default; --visualize renders charts instead.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::PipelineOpts;
use crate::ctg::{CtgTrace, DictReader, FisherClassifier, render_trace};
use crate::engine::arg_parser::{Cli, RunArgs};
use crate::engine::compare::{compare_results, load_expected};
use crate::pipeline::{run_rendering, run_scoring};
use crate::utils::{PackagePaths, apply_file_to_opts, load_settings_toml, setup_logging};

/// Defaults, then `.ctgpipe.toml` from the working directory, then CLI flags.
fn setup_opts(cli: &Cli) -> (RunArgs, PipelineOpts) {
    let mut args = RunArgs::default();
    let mut opts = PipelineOpts::default();
    if let Some(file) = load_settings_toml(Path::new("."), PackagePaths::get().settings_filename())
    {
        apply_file_to_opts(&file, &mut args, &mut opts);
    }

    if let Some(ref d) = cli.dir {
        args.dir = d.clone();
    }
    args.visualize = cli.visualize;
    if cli.expected.is_some() {
        args.expected = cli.expected.clone();
    }
    if let Some(ref c) = cli.comparison {
        args.comparison = c.clone();
    }
    if let Some(n) = cli.threads {
        opts.num_threads = n;
    }
    if cli.reader_threads.is_some() {
        opts.reader_threads = cli.reader_threads;
    }
    if let Some(ref g) = cli.graphs_dir {
        opts.output_dir = g.clone();
    }
    if let Some(ms) = cli.poll_timeout_ms {
        opts.poll_timeout = Duration::from_millis(ms);
    }
    if let Some(strict) = cli.strict {
        opts.strict = strict;
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }

    setup_logging(opts.verbose);
    (args, opts)
}

/// Run scoring (default) or rendering when --visualize.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let (args, mut opts) = setup_opts(cli);
    debug!("{} CONFIG: {:#?} {:#?}", PackagePaths::get().pkg_name().to_uppercase(), args, opts);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Release);
    })
    .context("set Ctrl+C handler")?;
    opts.cancel = Some(cancel_requested);

    if args.visualize {
        run_rendering(&args.dir, DictReader::new, render_trace, &opts)?;
        return Ok(());
    }

    let classifier = FisherClassifier::new();
    let results = run_scoring(
        &args.dir,
        DictReader::new,
        move |trace: &CtgTrace| classifier.classify(trace),
        &opts,
    )?;

    match &args.expected {
        Some(path) => {
            let expected = load_expected(path)?;
            compare_results(&expected, &results, &args.comparison)?;
        }
        None => info!(
            "No expected results given; scored {} files without comparison",
            results.len()
        ),
    }
    Ok(())
}
