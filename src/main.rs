use anyhow::Context;
use proctl::cli::{Cli, Command};
use proctl::error::{ProctlError, ReturnCode};
use proctl::process::{spawn_in_new_group, GroupChild};
use proctl::signal::{setup_signal_handlers, SignalFlags};
use proctl::{find_binary, kill_port_holder, StopConfig};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// How often the supervision loop checks for exit, signals and the deadline
const SUPERVISE_TICK: Duration = Duration::from_millis(100);

/// Exit code reported when `--deadline` stopped the command
const DEADLINE_EXIT_CODE: i32 = 124;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = Cli::parse_args();
    init_tracing(args.log_level());

    if let Err(e) = args.validate() {
        eprintln!("proctl: {}", e);
        eprintln!("Use \"proctl --help\" to get help");
        return e.exit_code();
    }

    match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("proctl: {:#}", e);
            e.downcast_ref::<ProctlError>()
                .map(ProctlError::exit_code)
                .unwrap_or(ReturnCode::RuntimeError.as_exit_code())
        }
    }
}

/// Install a stderr subscriber; RUST_LOG overrides the -v derived level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(args: &Cli) -> anyhow::Result<i32> {
    match &args.command {
        Command::BinPath {
            target_dir,
            profile,
            name,
        } => {
            let target_dir = Command::resolve_target_dir(target_dir.as_ref());
            println!("{}", find_binary(&target_dir, profile, name).display());
            Ok(ReturnCode::NoError.as_exit_code())
        }
        Command::Run {
            timeout,
            deadline,
            command,
        } => {
            let flags = setup_signal_handlers().context("installing signal handlers")?;
            let mut cmd = std::process::Command::new(&command[0]);
            cmd.args(&command[1..]);
            let child = spawn_in_new_group(&mut cmd)?;
            info!(pid = child.id(), "started {}", child.program());

            let stop = StopConfig::new(Duration::from_secs(*timeout));
            let deadline = deadline.map(|secs| Instant::now() + Duration::from_secs(secs));
            Ok(supervise(child, &flags, stop, deadline)?)
        }
        Command::KillPort { ports } => {
            ports.iter().copied().for_each(kill_port_holder);
            Ok(ReturnCode::NoError.as_exit_code())
        }
    }
}

/// Wait for the child, stopping its group on a termination request or when
/// the deadline passes
fn supervise(
    mut child: GroupChild,
    flags: &SignalFlags,
    stop: StopConfig,
    deadline: Option<Instant>,
) -> proctl::Result<i32> {
    loop {
        if let Some(code) = child.wait_timeout(SUPERVISE_TICK)? {
            debug!(pid = child.id(), code, "child exited");
            return Ok(code);
        }

        if let Some(request) = flags.term_request() {
            info!(?request, "termination requested, stopping process group");
            let outcome = stop.stop(&mut child);
            debug!(?outcome, "process group stopped");
            return Ok(child
                .try_wait()?
                .unwrap_or(ReturnCode::RuntimeError.as_exit_code()));
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(pid = child.id(), "deadline reached, stopping process group");
            let outcome = stop.stop(&mut child);
            debug!(?outcome, "process group stopped");
            return Ok(DEADLINE_EXIT_CODE);
        }
    }
}
