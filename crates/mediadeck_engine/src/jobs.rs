use mediadeck_core::{Descriptor, JobKind, JobPayload, ProgressSnapshot};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::collection::json_kind;
use crate::{ApiClient, FailureKind, TransportError};

/// Backend routes of one job kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRoutes {
    pub submit: &'static str,
    /// Prefix of the polled progress route; the task id is appended.
    pub progress: &'static str,
    /// Server-push route taking the task id as a `task_id` query parameter.
    pub push: Option<&'static str>,
}

impl JobRoutes {
    pub fn for_job(kind: JobKind) -> Self {
        match kind {
            JobKind::Ingest => Self {
                submit: "upload-m3u",
                progress: "upload-m3u/progress/",
                push: None,
            },
            JobKind::Load => Self {
                submit: "load-m3u",
                progress: "load-m3u/progress/",
                push: None,
            },
            JobKind::Delete => Self {
                submit: "delete-providers",
                progress: "delete-providers/progress/",
                push: Some("delete-progress"),
            },
        }
    }
}

/// Submission and polled progress of long-running jobs.
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    /// Starts a job and returns the server's task id.
    async fn submit(&self, kind: JobKind, payload: &JobPayload) -> Result<String, TransportError>;

    async fn progress(&self, kind: JobKind, task_id: &str)
        -> Result<ProgressSnapshot, TransportError>;
}

/// Playlist rows are posted back under the playlist naming.
#[derive(Serialize)]
struct PlaylistRef<'a> {
    #[serde(rename = "fileName")]
    file_name: &'a str,
    #[serde(rename = "filePath")]
    file_path: &'a str,
}

#[async_trait::async_trait]
impl JobBackend for ApiClient {
    async fn submit(&self, kind: JobKind, payload: &JobPayload) -> Result<String, TransportError> {
        let url = self.endpoint(JobRoutes::for_job(kind).submit)?;
        let reply = match (kind, payload) {
            (_, JobPayload::Files(files)) => {
                let mut form = Form::new();
                for file in files {
                    let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
                    form = form.part("files", part);
                }
                self.post_multipart(url, form).await?
            }
            (JobKind::Load, JobPayload::Descriptors(rows)) => {
                let body: Vec<PlaylistRef<'_>> = rows.iter().map(playlist_ref).collect();
                self.post_json(url, &body).await?
            }
            (_, JobPayload::Descriptors(rows)) => self.post_json(url, rows).await?,
        };
        task_id(&reply)
    }

    async fn progress(
        &self,
        kind: JobKind,
        task_id: &str,
    ) -> Result<ProgressSnapshot, TransportError> {
        let url = progress_url(self, kind, task_id)?;
        let body = self.get_json(url).await?;
        ProgressSnapshot::from_json(&body)
            .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))
    }
}

fn playlist_ref(row: &Descriptor) -> PlaylistRef<'_> {
    PlaylistRef {
        file_name: &row.name,
        file_path: &row.path,
    }
}

fn progress_url(client: &ApiClient, kind: JobKind, task_id: &str) -> Result<Url, TransportError> {
    let mut url = client.endpoint(JobRoutes::for_job(kind).progress)?;
    url.path_segments_mut()
        .map_err(|()| TransportError::new(FailureKind::InvalidUrl, "base url cannot hold a path"))?
        .pop_if_empty()
        .push(task_id);
    Ok(url)
}

pub(crate) fn push_url(client: &ApiClient, kind: JobKind, task_id: &str) -> Result<Url, TransportError> {
    let route = JobRoutes::for_job(kind).push.ok_or_else(|| {
        TransportError::new(
            FailureKind::InvalidUrl,
            format!("{kind} jobs have no push progress route"),
        )
    })?;
    let mut url = client.endpoint(route)?;
    url.query_pairs_mut().append_pair("task_id", task_id);
    Ok(url)
}

/// Accepts `{"task_id": "..."}` with a string or numeric id.
fn task_id(reply: &Value) -> Result<String, TransportError> {
    match reply.get("task_id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(TransportError::new(
            FailureKind::Decode,
            format!("submission reply carried no task id ({})", json_kind(reply)),
        )),
    }
}
