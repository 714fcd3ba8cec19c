use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::PipelineError;
use crate::filter::EntryFilter;
use crate::output::EntryOutput;
use crate::parser::LogcatParser;
use crate::pids::PidWatchdog;
use pidcat_adb::PidResolver;

/// Lines buffered between the stdout reader and the render stage
pub const LINE_QUEUE_CAPACITY: usize = 1024;

/// Runs `adb logcat` and drives its output through parse, filter and render
pub struct LogcatPipeline {
    /// Full argv of the logcat command
    command: Vec<String>,

    filter: EntryFilter,

    /// Cancelled on interrupt, on subprocess exit and on any fatal error
    cancel: CancellationToken,
}

impl LogcatPipeline {
    pub fn new(command: Vec<String>, filter: EntryFilter) -> Self {
        Self {
            command,
            filter,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the pipeline when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until logcat exits or the pipeline is cancelled
    ///
    /// Lines already read from logcat are still rendered after shutdown
    /// starts; this returns once the reader and render stages have drained.
    pub async fn run<R, O>(
        self,
        watchdog: Option<PidWatchdog<R>>,
        output: O,
    ) -> Result<(), PipelineError>
    where
        R: PidResolver,
        O: EntryOutput + Send + 'static,
    {
        let mut child = self.spawn()?;
        let stdout = child.stdout.take().ok_or(PipelineError::MissingStdout)?;

        let (line_tx, line_rx) = mpsc::channel(LINE_QUEUE_CAPACITY);
        let reader = tokio::spawn(read_lines(stdout, line_tx, self.cancel.clone()));
        let renderer = tokio::spawn(render_lines(
            line_rx,
            self.filter.clone(),
            output,
            self.cancel.clone(),
        ));
        let watchdog = watchdog.map(|w| tokio::spawn(w.run(self.cancel.child_token())));

        let outcome = self.supervise(&mut child, watchdog).await;

        self.cancel.cancel();
        if let Err(e) = child.kill().await {
            debug!("Killing logcat: {}", e);
        }

        let read = reader.await;
        let rendered = renderer.await;

        outcome?;
        let lines = read??;
        let emitted = rendered??;
        info!(lines, emitted, "Pipeline drained");
        Ok(())
    }

    fn spawn(&self) -> Result<Child, PipelineError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(PipelineError::EmptyCommand)?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PipelineError::Spawn {
                command: self.command.join(" "),
                source,
            })?;

        info!("Started {} (pid {:?})", self.command.join(" "), child.id());
        Ok(child)
    }

    /// Wait for the first of: logcat exiting, cancellation, watchdog failure
    async fn supervise(
        &self,
        child: &mut Child,
        watchdog: Option<JoinHandle<Result<(), PipelineError>>>,
    ) -> Result<(), PipelineError> {
        let watchdog = async move {
            match watchdog {
                Some(handle) => handle.await.unwrap_or_else(|e| Err(PipelineError::Join(e))),
                None => std::future::pending::<Result<(), PipelineError>>().await,
            }
        };

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(PipelineError::Wait)?;
                if status.success() {
                    info!("logcat exited");
                } else {
                    warn!("logcat exited with {}", status);
                }
                Ok(())
            }

            _ = self.cancel.cancelled() => {
                info!("Shutdown requested");
                Ok(())
            }

            result = watchdog => result,
        }
    }
}

/// Forward each line of `source` into the queue until end of stream
///
/// Bytes that aren't valid UTF-8 are replaced rather than treated as an error.
pub(crate) async fn read_lines<S>(
    source: S,
    line_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) -> Result<u64, PipelineError>
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    let mut count = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                debug!("logcat output ended");
                break;
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                count += 1;

                if line_tx.send(line).await.is_err() {
                    debug!("Line queue closed");
                    break;
                }
            }
            Err(e) => {
                cancel.cancel();
                return Err(PipelineError::Read(e));
            }
        }
    }

    Ok(count)
}

/// Parse, filter and emit queued lines until the queue is closed and empty
pub(crate) async fn render_lines<O>(
    mut line_rx: mpsc::Receiver<String>,
    filter: EntryFilter,
    mut output: O,
    cancel: CancellationToken,
) -> Result<u64, PipelineError>
where
    O: EntryOutput,
{
    let mut emitted = 0;

    while let Some(line) = line_rx.recv().await {
        let Ok(entry) = LogcatParser::parse(&line) else {
            trace!("Skipping unparsable line: {:?}", line);
            continue;
        };

        if let Err(reason) = filter.check(&entry) {
            trace!(?reason, pid = %entry.pid, tag = %entry.tag, "Dropped entry");
            continue;
        }

        if let Err(e) = output.emit(&entry) {
            cancel.cancel();
            return Err(PipelineError::Output(e));
        }
        emitted += 1;
    }

    output.flush().map_err(PipelineError::Output)?;
    debug!(emitted, "Render stage drained");
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pidcat_adb::AdbError;
    use pidcat_types::{LogEntry, Severity};

    use crate::pids::WatchedPids;

    const STREAM: &str = "\
--------- beginning of main
I/MyTag( 1234): Hello world
D/Debugger(5678): noisy detail
W/MyTag( 1234): careful

E/Other( 9999): elsewhere
\tat com.example.Foo.bar(Foo.java:42)
F/MyTag( 1234): boom
";

    /// Output that keeps entries reachable after being moved into a task
    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<LogEntry>>>);

    impl EntryOutput for Shared {
        fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
            self.0.lock().push(entry.clone());
            Ok(())
        }
    }

    struct Failing;

    impl EntryOutput for Failing {
        fn emit(&mut self, _entry: &LogEntry) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    struct NoResolver;

    impl PidResolver for NoResolver {
        async fn resolve_pid(&self, _package: &str) -> Result<Option<String>, AdbError> {
            Ok(None)
        }
    }

    async fn run_stages(stream: &'static str, filter: EntryFilter) -> Vec<LogEntry> {
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let mut collected = Vec::new();

        let reader = tokio::spawn(read_lines(stream.as_bytes(), tx, cancel.clone()));
        render_lines(rx, filter, &mut collected, cancel).await.unwrap();
        reader.await.unwrap().unwrap();

        collected
    }

    fn tags_and_levels(entries: &[LogEntry]) -> Vec<(char, &str)> {
        entries.iter().map(|e| (e.level, e.tag.as_str())).collect()
    }

    #[tokio::test]
    async fn test_stages_preserve_order_and_skip_noise() {
        let entries = run_stages(STREAM, EntryFilter::new(WatchedPids::new())).await;
        assert_eq!(
            tags_and_levels(&entries),
            vec![
                ('I', "MyTag"),
                ('D', "Debugger"),
                ('W', "MyTag"),
                ('E', "Other"),
                ('F', "MyTag"),
            ]
        );
    }

    #[tokio::test]
    async fn test_stages_apply_pid_and_level_filters() {
        let pids = WatchedPids::new();
        pids.insert("1234");
        let filter = EntryFilter::new(pids).with_min_level(Severity::Warning);

        let entries = run_stages(STREAM, filter).await;
        assert_eq!(tags_and_levels(&entries), vec![('W', "MyTag"), ('F', "MyTag")]);
    }

    #[tokio::test]
    async fn test_stages_apply_tag_filters() {
        let filter = EntryFilter::new(WatchedPids::new())
            .with_ignored_tags(["Debugger"])
            .with_tags(["MyTag", "Debugger"]);

        let entries = run_stages(STREAM, filter).await;
        assert!(entries.iter().all(|e| e.tag == "MyTag"));
        assert_eq!(entries.len(), 3);
    }

    #[tokio::test]
    async fn test_banner_line_produces_nothing() {
        let entries = run_stages(
            "--------- beginning of system\n",
            EntryFilter::new(WatchedPids::new()),
        )
        .await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_reader_handles_crlf_and_invalid_utf8() {
        let (tx, mut rx) = mpsc::channel(4);
        let source: &[u8] = b"I/A(1): one\r\nI/B(2): t\xffo";
        let count = read_lines(source, tx, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(rx.recv().await.as_deref(), Some("I/A(1): one"));
        assert_eq!(rx.recv().await.as_deref(), Some("I/B(2): t\u{fffd}o"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_output_failure_cancels_pipeline() {
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        tx.send("I/MyTag(1): hi".to_string()).await.unwrap();
        drop(tx);

        let err = render_lines(rx, EntryFilter::new(WatchedPids::new()), Failing, cancel.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Output(_)));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let pipeline = LogcatPipeline::new(Vec::new(), EntryFilter::new(WatchedPids::new()));
        let err = pipeline
            .run::<NoResolver, _>(None, Shared::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let pipeline = LogcatPipeline::new(
            vec!["/definitely/not/here/adb".into(), "logcat".into()],
            EntryFilter::new(WatchedPids::new()),
        );
        let err = pipeline
            .run::<NoResolver, _>(None, Shared::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_subprocess_exit_drains_all_lines() {
        // The stream goes in as an argument; a format string starting with
        // "---" is read as an option by some printf builtins
        let pipeline = LogcatPipeline::new(
            vec![
                "sh".into(),
                "-c".into(),
                r#"printf '%s' "$1""#.into(),
                "sh".into(),
                STREAM.replace('\t', "    "),
            ],
            EntryFilter::new(WatchedPids::new()).with_min_level(Severity::Info),
        );
        let output = Shared::default();

        pipeline
            .run::<NoResolver, _>(None, output.clone())
            .await
            .unwrap();

        let entries = output.0.lock();
        assert_eq!(
            tags_and_levels(&entries),
            vec![('I', "MyTag"), ('W', "MyTag"), ('E', "Other"), ('F', "MyTag")]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_stops_long_running_logcat() {
        let pipeline = LogcatPipeline::new(
            vec![
                "sh".into(),
                "-c".into(),
                "echo 'I/T(1): before'; exec sleep 30".into(),
            ],
            EntryFilter::new(WatchedPids::new()),
        );
        let cancel = pipeline.cancel_token();
        let output = Shared::default();

        let run = tokio::spawn(pipeline.run::<NoResolver, _>(None, output.clone()));
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        cancel.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(5), run)
            .await
            .expect("pipeline stops after cancel")
            .unwrap()
            .unwrap();
        assert_eq!(output.0.lock().len(), 1);
    }
}
