//! Pod log collection: one buffered read of the log stream, then display or persistence.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::error::{ProviderError, ReportError};

pub type LogStream = Pin<Box<dyn AsyncRead + Send>>;

#[async_trait]
pub trait LogSource: Send + Sync {
    async fn open_log_stream(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
    ) -> Result<LogStream, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    pub namespace: String,
    pub pod: String,
    pub container: Option<String>,
}

/// Header line plus the raw log bytes, fully buffered in memory.
#[derive(Debug, Clone)]
pub struct CollectedLogs {
    pub pod: String,
    pub timestamp: String,
    pub buffer: Vec<u8>,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn log_header(request: &LogRequest, timestamp: &str) -> String {
    format!(
        "POD: {}, CONTAINER: {}, NAMESPACE: {}, DATE: {}\n",
        request.pod,
        request.container.as_deref().unwrap_or(""),
        request.namespace,
        timestamp
    )
}

pub async fn collect_pod_logs<S>(
    source: &S,
    request: &LogRequest,
    at: DateTime<Utc>,
) -> Result<CollectedLogs, ReportError>
where
    S: LogSource + ?Sized,
{
    let mut stream = source
        .open_log_stream(&request.namespace, &request.pod, request.container.as_deref())
        .await
        .map_err(|source| ReportError::LogStream {
            pod: format!("{}/{}", request.namespace, request.pod),
            source,
        })?;

    let timestamp = format_timestamp(at);
    let mut buffer = log_header(request, &timestamp).into_bytes();
    let read = stream
        .read_to_end(&mut buffer)
        .await
        .map_err(ReportError::LogRead)?;
    debug!(pod = %request.pod, bytes = read, "log stream drained");

    Ok(CollectedLogs {
        pod: request.pod.clone(),
        timestamp,
        buffer,
    })
}

impl CollectedLogs {
    pub fn file_name(&self) -> String {
        format!("{}_{}.log", self.pod, self.timestamp)
    }

    /// Writes the buffer verbatim to `<dir>/<pod>_<timestamp>.log`, creating `dir` if needed.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ReportError::LogPersist { path: dir.to_path_buf(), source })?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, &self.buffer)
            .await
            .map_err(|source| ReportError::LogPersist { path: path.clone(), source })?;
        info!("Logs saved to {}", path.display());
        Ok(path)
    }

    /// Buffer split on newlines; a trailing newline does not yield an empty last line.
    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> {
        let body = self.buffer.strip_suffix(b"\n").unwrap_or(&self.buffer[..]);
        body.split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line)))
    }

    pub fn display(&self) {
        for line in self.lines() {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StaticLogs(&'static [u8]);

    #[async_trait]
    impl LogSource for StaticLogs {
        async fn open_log_stream(
            &self,
            _namespace: &str,
            _pod: &str,
            _container: Option<&str>,
        ) -> Result<LogStream, ProviderError> {
            Ok(Box::pin(futures::io::Cursor::new(self.0)))
        }
    }

    struct Closed;

    #[async_trait]
    impl LogSource for Closed {
        async fn open_log_stream(
            &self,
            _namespace: &str,
            pod: &str,
            _container: Option<&str>,
        ) -> Result<LogStream, ProviderError> {
            Err(ProviderError::NotFound { kind: "pod", name: pod.to_string() })
        }
    }

    fn request(container: Option<&str>) -> LogRequest {
        LogRequest {
            namespace: "n".to_string(),
            pod: "p".to_string(),
            container: container.map(str::to_string),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_header_then_raw_bytes() {
        let raw: &'static [u8] = b"first line\n\xffbinary\r\nlast";
        let logs = collect_pod_logs(&StaticLogs(raw), &request(Some("c")), at())
            .await
            .unwrap();

        let header = b"POD: p, CONTAINER: c, NAMESPACE: n, DATE: 2024-05-01T10:30:00Z\n";
        assert!(logs.buffer.starts_with(header));
        assert_eq!(&logs.buffer[header.len()..], raw);
        assert_eq!(logs.file_name(), "p_2024-05-01T10:30:00Z.log");
    }

    #[tokio::test]
    async fn test_missing_container_leaves_field_empty() {
        let logs = collect_pod_logs(&StaticLogs(b""), &request(None), at())
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(logs.buffer).unwrap(),
            "POD: p, CONTAINER: , NAMESPACE: n, DATE: 2024-05-01T10:30:00Z\n"
        );
    }

    #[tokio::test]
    async fn test_stream_open_failure_is_reported() {
        let err = collect_pod_logs(&Closed, &request(None), at()).await.unwrap_err();
        assert!(matches!(err, ReportError::LogStream { ref pod, .. } if pod == "n/p"));
    }

    #[tokio::test]
    async fn test_lines() {
        let logs = collect_pod_logs(&StaticLogs(b"a\r\nb\n\nc\n"), &request(None), at())
            .await
            .unwrap();
        let lines: Vec<_> = logs.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("POD: p"));
        assert_eq!(lines[1..], ["a", "b", "", "c"]);
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("komlogs");
        let logs = collect_pod_logs(&StaticLogs(b"hello\n"), &request(Some("c")), at())
            .await
            .unwrap();

        let path = logs.save(&target).await.unwrap();
        assert_eq!(path, target.join("p_2024-05-01T10:30:00Z.log"));
        assert_eq!(std::fs::read(&path).unwrap(), logs.buffer);
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let logs = collect_pod_logs(&StaticLogs(b""), &request(None), at())
            .await
            .unwrap();

        let err = logs.save(&blocker).await.unwrap_err();
        assert!(matches!(err, ReportError::LogPersist { .. }));
    }
}
