// file: src/pipeline/supervisor.rs
// description: launches one scan stage, tees its merged output to the verbose log, and drives progress
// reference: tokio::process with reader tasks joined before the stage returns

use crate::error::{PipelineError, Result};
use crate::models::StageProfile;
use crate::pipeline::orchestrator::StageRunner;
use crate::pipeline::progress::{Completion, ProgressDisplay, ProgressEstimator};
use crate::utils::OperationTimer;
use futures::future::join_all;
use std::future::Future;
use std::process::Stdio;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Supervisor {
    echo_output: bool,
    show_progress: bool,
}

impl Supervisor {
    pub fn new(echo_output: bool) -> Self {
        Self {
            echo_output,
            show_progress: true,
        }
    }

    /// Runs stages without drawing a spinner.
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Blocks until the stage's process exits. All background work for the
    /// stage has finished and the log is closed by the time this returns,
    /// whether the stage succeeded or not.
    pub async fn supervise(&self, profile: &StageProfile) -> Result<()> {
        let stage = profile.kind().name();
        let timer = OperationTimer::new(stage);

        let log_path = profile.verbose_log();
        let log_file = File::create(log_path)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: log_path.clone(),
                source,
            })?;

        debug!("Running {}: {}", stage, profile.command_line());
        let mut child = match Command::new(profile.program())
            .args(profile.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                timer.fail("process could not be started");
                return Err(PipelineError::ToolLaunch {
                    stage: stage.to_string(),
                    source,
                });
            }
        };

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, line_tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, line_tx.clone())));
        }
        drop(line_tx);

        let (estimator, estimates) = ProgressEstimator::new();
        let (completion_tx, completion_rx) = watch::channel(Completion::Running);
        let display = if self.show_progress {
            ProgressDisplay::new(profile.message())
        } else {
            ProgressDisplay::hidden(profile.message())
        };

        let display_task = tokio::spawn(display.clone().run(estimates, completion_rx));
        let consumer = tokio::spawn(consume_lines(
            line_rx,
            BufWriter::new(log_file),
            estimator,
            display,
            self.echo_output,
        ));

        let status = child.wait().await;

        for reader in join_all(readers).await {
            match reader {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("{} output stream closed with error: {}", stage, e),
                Err(e) => warn!("{} output reader task failed: {}", stage, e),
            }
        }

        let logged = consumer.await.map_err(|e| PipelineError::ExternalTool {
            stage: stage.to_string(),
            message: format!("output consumer task failed: {}", e),
        });

        let succeeded = matches!(&status, Ok(status) if status.success());
        completion_tx.send_replace(if succeeded {
            Completion::Succeeded
        } else {
            Completion::Failed
        });
        if let Err(e) = display_task.await {
            warn!("{} progress display task failed: {}", stage, e);
        }

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                timer.fail("lost track of the process");
                return Err(PipelineError::ExternalTool {
                    stage: stage.to_string(),
                    message: format!("failed waiting for process: {}", e),
                });
            }
        };

        if !status.success() {
            timer.fail(&status.to_string());
            return Err(PipelineError::ExternalTool {
                stage: stage.to_string(),
                message: format!("{} (output kept in {})", status, log_path.display()),
            });
        }

        let lines = logged?.map_err(|source| PipelineError::FileOperation {
            path: log_path.clone(),
            source,
        })?;

        debug!("{} produced {} output lines", stage, lines);
        timer.finish();
        Ok(())
    }
}

impl StageRunner for Supervisor {
    fn run(&self, profile: &StageProfile) -> impl Future<Output = Result<()>> + Send {
        self.supervise(profile)
    }
}

/// Splits a process stream into lines. Invalid UTF-8 is replaced rather
/// than ending the stream.
async fn forward_lines<R>(stream: R, lines: mpsc::UnboundedSender<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buffer)
            .trim_end_matches(['\r', '\n'])
            .to_string();

        if lines.send(line).is_err() {
            return Ok(());
        }
    }
}

/// Writes every line to the log and offers it to the estimator. Keeps
/// draining after a write error so the child never stalls on a full pipe;
/// the first error is reported once the stream ends.
async fn consume_lines(
    mut lines: mpsc::UnboundedReceiver<String>,
    mut log: BufWriter<File>,
    estimator: ProgressEstimator,
    display: ProgressDisplay,
    echo_output: bool,
) -> std::io::Result<usize> {
    let mut count = 0;
    let mut write_error = None;

    while let Some(line) = lines.recv().await {
        count += 1;

        if write_error.is_none() {
            let written = async {
                log.write_all(line.as_bytes()).await?;
                log.write_all(b"\n").await
            }
            .await;
            if let Err(e) = written {
                write_error = Some(e);
            }
        }

        if echo_output {
            display.println(&format!("DEBUG: {}", line));
        }

        if let Some(estimate) = estimator.observe(&line)
            && echo_output
        {
            display.println(&format!("DEBUG: Matched estimated time remaining: {}", estimate));
        }
    }

    if let Some(e) = write_error {
        return Err(e);
    }

    log.flush().await?;
    log.into_inner().sync_all().await?;
    Ok(count)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::StageKind;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn shell_profile(dir: &Path, script: &str) -> StageProfile {
        StageProfile::new(
            StageKind::Discovery,
            "sh",
            vec!["-c".to_string(), script.to_string()],
            dir.join("nmap_discovery_scan_results"),
            dir.join("verbose_nmap_discovery_output.txt"),
        )
    }

    fn supervisor() -> Supervisor {
        Supervisor::new(false).without_progress()
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let temp = TempDir::new().unwrap();
        let profile = shell_profile(
            temp.path(),
            "echo 'Starting Nmap'; echo 'warning on stderr' >&2; echo 'Nmap done: 1 IP address (1 host up)'",
        );

        assert_ok!(supervisor().supervise(&profile).await);

        let log = std::fs::read_to_string(profile.verbose_log()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"Starting Nmap"));
        assert!(lines.contains(&"warning on stderr"));
        assert!(lines.contains(&"Nmap done: 1 IP address (1 host up)"));
    }

    #[tokio::test]
    async fn test_log_is_truncated_per_stage() {
        let temp = TempDir::new().unwrap();
        let profile = shell_profile(temp.path(), "echo fresh");
        std::fs::write(profile.verbose_log(), "stale line\nanother\n").unwrap();

        assert_ok!(supervisor().supervise(&profile).await);

        assert_eq!(
            std::fs::read_to_string(profile.verbose_log()).unwrap(),
            "fresh\n"
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_names_stage_and_keeps_log() {
        let temp = TempDir::new().unwrap();
        let profile = shell_profile(temp.path(), "echo 'partial output'; exit 3");

        let err = supervisor().supervise(&profile).await.unwrap_err();

        match &err {
            PipelineError::ExternalTool { stage, message } => {
                assert_eq!(stage, "Nmap Discovery Scan");
                assert!(message.contains('3'), "unexpected message: {}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            std::fs::read_to_string(profile.verbose_log()).unwrap(),
            "partial output\n"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let temp = TempDir::new().unwrap();
        let profile = StageProfile::new(
            StageKind::TcpPortDiscovery,
            "/nonexistent/bin/nmap",
            vec![],
            temp.path().join("nmap_tcp_port_discovery_results"),
            temp.path().join("verbose_nmap_tcp_port_discovery_output.txt"),
        );

        let err = supervisor().supervise(&profile).await.unwrap_err();

        assert!(matches!(err, PipelineError::ToolLaunch { .. }));
        assert_eq!(err.stage(), Some("TCP port discovery scan"));
    }

    #[tokio::test]
    async fn test_progress_lines_do_not_stall_large_output() {
        let temp = TempDir::new().unwrap();
        let script = "i=0; while [ $i -lt 2000 ]; do \
                      echo \"Connect Scan Timing: About $i.00% done; ETC: 10:00 (0:00:$i remaining)\"; \
                      echo \"noise $i\" >&2; i=$((i+1)); done";
        let profile = shell_profile(temp.path(), script);

        assert_ok!(supervisor().supervise(&profile).await);

        let log = std::fs::read_to_string(profile.verbose_log()).unwrap();
        assert_eq!(log.lines().count(), 4000);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_logged_lossily() {
        let temp = TempDir::new().unwrap();
        let profile = shell_profile(temp.path(), "printf 'host \\377name\\n'");

        assert_ok!(supervisor().supervise(&profile).await);

        let log = std::fs::read_to_string(profile.verbose_log()).unwrap();
        assert!(log.starts_with("host "));
        assert!(log.ends_with("name\n"));
    }

    #[tokio::test]
    async fn test_echo_mode_still_logs_every_line() {
        let temp = TempDir::new().unwrap();
        let profile = shell_profile(
            temp.path(),
            "echo 'Connect Scan Timing: About 12.00% done; ETC: 10:00 (0:04:10 remaining)'; \
             echo 'Discovered open port 22/tcp on 10.0.0.1' >&2",
        );

        let echoing = Supervisor::new(true).without_progress();
        assert_ok!(echoing.supervise(&profile).await);

        let log = std::fs::read_to_string(profile.verbose_log()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|line| line.contains("0:04:10 remaining")));
        assert!(lines.contains(&"Discovered open port 22/tcp on 10.0.0.1"));
        assert!(!log.contains("DEBUG:"));
    }

    #[tokio::test]
    async fn test_consume_lines_with_echo_publishes_estimate() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("verbose.txt");
        let log = BufWriter::new(File::create(&log_path).await.unwrap());
        let (estimator, estimates) = ProgressEstimator::new();
        let display = ProgressDisplay::hidden("Nmap Discovery Scan in progress...");
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send("Initiating Connect Scan".to_string()).unwrap();
        tx.send("Connect Scan Timing: About 50.00% done; ETC: 10:00 (0:01:30 remaining)".to_string())
            .unwrap();
        drop(tx);

        let count = consume_lines(rx, log, estimator, display, true).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(estimates.borrow().as_deref(), Some("0:01:30"));
        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap().lines().count(),
            2
        );
    }
}
