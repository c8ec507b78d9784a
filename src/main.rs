// main.rs

//! The `fswatch` binary: watch paths, run a command on change.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use log::debug;
use structopt::StructOpt;

use fswatch::command::CommandTemplate;
use fswatch::config::Config;
use fswatch::console;

#[cfg(target_os = "linux")]
use fswatch::watcher::FileWatcher;

#[cfg(not(target_os = "linux"))]
compile_error!("fswatch is only available on Linux due to its dependency on `inotify`");

/// Watch files and directories, and run a command when they change.
#[derive(Debug, StructOpt)]
#[structopt(name = "fswatch")]
struct Args {
    /// Print a diagnostic line for each filesystem event.
    #[structopt(short, long)]
    verbose: bool,

    /// Clear the terminal before each command run.
    #[structopt(long)]
    clear: bool,

    /// File or directory to watch. May be given multiple times; directories
    /// are watched recursively.
    #[structopt(short = "w", long = "watch", number_of_values = 1)]
    watch: Vec<PathBuf>,

    /// Load settings from a JSON config file. Command-line flags override
    /// its values; watch paths accumulate from both sources, and a command
    /// given on the command line replaces the configured one.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings to the given JSON file and exit.
    #[structopt(long)]
    save_config: Option<PathBuf>,

    /// Command to run on each change; every `{}` is replaced with the path
    /// of the changed entry.
    #[structopt(last = true)]
    command: Vec<String>,
}

fn main() {
    env_logger::init();

    if let Err(error) = run(&Args::from_args()) {
        console::fail(&error);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let settings = assemble_settings(args)?;

    if let Some(path) = &args.save_config {
        settings.save(path)?;
        console::ok(format!("wrote settings to {}", path.display()));
        return Ok(());
    }

    if settings.watch_files.is_empty() {
        return Err("no watch paths given (use --watch or a config file)".into());
    }
    if settings.command.is_empty() {
        return Err("no command given (pass it after `--`)".into());
    }

    let template = CommandTemplate::new(settings.command.clone());
    let clear_console = settings.is_clear_console;

    let mut watcher = FileWatcher::new()?;
    watcher
        .set_verbose(settings.is_verbose)
        .add_filepaths(&settings.watch_files, true)?;

    watcher.run(|event| {
        if clear_console {
            console::clear();
        }
        debug!("dispatching {}", event);

        let rendered = template.render(&event.filepath);
        let status = template.run(&event.filepath)?;
        if status.success() {
            console::ok(format!("`{}` succeeded", rendered));
        } else {
            console::fail(format!("`{}` exited with {}", rendered, status));
        }
        Ok(())
    })?;

    Ok(())
}

/// Merge the config file (when given) with the command line. Flags are
/// or-ed, watch paths accumulate, and a command on the command line replaces
/// the configured one.
fn assemble_settings(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    settings.is_verbose |= args.verbose;
    settings.is_clear_console |= args.clear;
    settings
        .watch_files
        .extend(args.watch.iter().map(|path| path.display().to_string()));
    if !args.command.is_empty() {
        settings.command = args.command.clone();
    }

    Ok(settings)
}
