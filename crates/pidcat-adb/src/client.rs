//! adb client for pidcat

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

use pidcat_types::{Connection, ProcessInfo};

use crate::error::AdbError;
use crate::ps::{find_pid, parse_processes};

/// Timeout for short one-shot commands (version, pm, dumpsys, logcat -c)
const SHORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for `shell ps`, which can be slow on busy devices
const PS_TIMEOUT: Duration = Duration::from_secs(10);

static INSTALLED_AS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Installed as (\S+)").expect("version pattern is valid")
});

static RECENT_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Recent #0: \S+\{\S+ \S+ \S+ \S+:([^\s}]+)").expect("recents pattern is valid")
});

/// Resolves a package name to the id of its running process
///
/// `Ok(None)` means the package is not running right now; `Err` means the
/// device or the tool could not be queried.
pub trait PidResolver: Send + Sync + 'static {
    fn resolve_pid(
        &self,
        package: &str,
    ) -> impl Future<Output = Result<Option<String>, AdbError>> + Send;
}

/// adb wrapper bound to one device connection
#[derive(Clone, Debug)]
pub struct AdbClient {
    adb_path: PathBuf,
    /// `<adb> <connection args>`
    base_cmd: Vec<String>,
}

impl AdbClient {
    /// Locate adb and bind it to `connection`
    ///
    /// With no explicit path, `adb` is looked up on `PATH`. The binary is
    /// asked for its version to confirm it really is adb and to learn its
    /// absolute location.
    pub async fn new(bin_path: Option<&str>, connection: &Connection) -> Result<Self, AdbError> {
        let bin = match bin_path {
            Some(path) => {
                let expanded = expand_home(path);
                if !expanded.exists() {
                    return Err(AdbError::BinaryNotFound(expanded));
                }
                expanded
            }
            None => PathBuf::from("adb"),
        };

        let probe = vec![bin.to_string_lossy().into_owned()];
        let out = run_command(&probe, SHORT_TIMEOUT, &["version"]).await?;
        let adb_path = parse_installed_path(&out)
            .map(PathBuf::from)
            .ok_or_else(|| AdbError::UnparsableVersion(out.trim().to_string()))?;

        info!("Using adb at {}", adb_path.display());

        let mut base_cmd = vec![adb_path.to_string_lossy().into_owned()];
        base_cmd.extend(connection.args());

        Ok(Self { adb_path, base_cmd })
    }

    /// Absolute path of the adb binary
    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }

    /// Run `adb <connection> <args>` and return its combined output
    pub async fn run(&self, timeout: Duration, args: &[&str]) -> Result<String, AdbError> {
        run_command(&self.base_cmd, timeout, args).await
    }

    /// Snapshot of the device's process table
    pub async fn processes(&self) -> Result<Vec<ProcessInfo>, AdbError> {
        let out = self.run(PS_TIMEOUT, &["shell", "ps"]).await?;
        Ok(parse_processes(&out))
    }

    /// Current pid of `package`, if it is running
    pub async fn pid_of(&self, package: &str) -> Result<Option<String>, AdbError> {
        let processes = self.processes().await?;
        Ok(find_pid(&processes, package).map(str::to_string))
    }

    /// Installed packages, sorted; only third-party ones when asked
    pub async fn list_packages(&self, third_party_only: bool) -> Result<Vec<String>, AdbError> {
        let mut args = vec!["shell", "pm", "list", "packages"];
        if third_party_only {
            args.push("-3");
        }
        let out = self.run(SHORT_TIMEOUT, &args).await?;
        Ok(parse_packages(&out))
    }

    /// Package of the app currently in the foreground
    pub async fn current_app(&self) -> Result<String, AdbError> {
        let out = self
            .run(SHORT_TIMEOUT, &["shell", "dumpsys", "activity", "recents"])
            .await?;
        parse_foreground_app(&out).ok_or(AdbError::NoForegroundApp)
    }

    /// Drop everything already in the device's log buffers
    pub async fn clear_log(&self) -> Result<(), AdbError> {
        self.run(SHORT_TIMEOUT, &["logcat", "-c"]).await?;
        Ok(())
    }

    /// Full argv for a streaming `logcat` in the brief format
    pub fn logcat_command(&self) -> Vec<String> {
        let mut cmd = self.base_cmd.clone();
        cmd.extend(["logcat", "-v", "brief"].map(String::from));
        cmd
    }
}

impl PidResolver for AdbClient {
    async fn resolve_pid(&self, package: &str) -> Result<Option<String>, AdbError> {
        self.pid_of(package).await
    }
}

async fn run_command(
    base: &[String],
    timeout: Duration,
    args: &[&str],
) -> Result<String, AdbError> {
    let command = base
        .iter()
        .map(String::as_str)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let Some((program, base_args)) = base.split_first() else {
        return Err(AdbError::failed(command, "empty command"));
    };

    debug!("Running {}", command);

    let output = Command::new(program)
        .args(base_args)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, output)
        .await
        .map_err(|_| AdbError::Timeout {
            command: command.clone(),
        })?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdbError::BinaryNotFound(PathBuf::from(program))
            } else {
                AdbError::failed(command.clone(), e)
            }
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        let reason = match combined.trim() {
            "" => output.status.to_string(),
            text => format!("{}: {}", output.status, text),
        };
        return Err(AdbError::failed(command, reason));
    }

    Ok(combined)
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}

fn parse_installed_path(version_output: &str) -> Option<String> {
    INSTALLED_AS
        .captures(version_output)
        .map(|caps| caps[1].to_string())
        .filter(|path| !path.is_empty())
}

fn parse_packages(output: &str) -> Vec<String> {
    let mut packages: Vec<String> = output
        .lines()
        .filter_map(|line| line.strip_prefix("package:"))
        .map(|name| name.trim().to_string())
        .collect();
    packages.sort();
    packages
}

fn parse_foreground_app(output: &str) -> Option<String> {
    RECENT_TASK
        .captures(output)
        .map(|caps| caps[1].to_string())
        .filter(|package| !package.is_empty())
}
