use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::TaskRegistry;
use crate::config::AppConfig;
use crate::error::Error;
use crate::model::{RemoteTask, TaskStatus};

const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Transmission RPC client (JSON over HTTP).
///
/// The daemon issues a session id via a 409 response to the first request;
/// the client stores it and retries that request once.
pub struct RpcClient {
    endpoint: String,
    http: Client,
    session_id: Mutex<Option<String>>,
}

impl RpcClient {
    pub fn new(host: &str, port: u16) -> Result<Self, Error> {
        let http = Client::builder().timeout(RPC_TIMEOUT).build()?;
        Ok(Self {
            endpoint: format!("http://{host}:{port}/transmission/rpc"),
            http,
            session_id: Mutex::new(None),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.host, config.port)
    }

    fn post(&self, body: &serde_json::Value) -> Result<Response, Error> {
        let mut request = self.http.post(&self.endpoint).json(body);
        if let Some(session_id) = self.session_id.lock().unwrap().as_ref() {
            request = request.header(SESSION_ID_HEADER, session_id);
        }
        Ok(request.send()?)
    }

    fn call(&self, body: serde_json::Value) -> Result<serde_json::Value, Error> {
        let mut response = self.post(&body)?;

        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
                .ok_or_else(|| Error::Daemon("409 without a session id header".into()))?;
            debug!("daemon issued a new session id");
            *self.session_id.lock().unwrap() = Some(session_id);
            response = self.post(&body)?;
        }

        if !response.status().is_success() {
            return Err(Error::Daemon(format!("HTTP status {}", response.status())));
        }

        let envelope: RpcEnvelope = response.json()?;
        if envelope.result != "success" {
            return Err(Error::Daemon(envelope.result));
        }
        Ok(envelope.arguments.unwrap_or_else(|| json!({})))
    }
}

impl TaskRegistry for RpcClient {
    fn fetch_tasks(&self) -> Result<Vec<RemoteTask>, Error> {
        let arguments = self.call(json!({
            "method": "torrent-get",
            "arguments": {
                "fields": [
                    "id",
                    "name",
                    "hashString",
                    "torrentFile",
                    "status",
                    "isFinished",
                    "doneDate",
                ],
            },
        }))?;

        let parsed: TorrentGetArguments = serde_json::from_value(arguments)
            .map_err(|err| Error::Daemon(format!("unexpected torrent-get response: {err}")))?;
        Ok(parsed.torrents.into_iter().map(normalize).collect())
    }

    fn remove_tasks(&self, ids: &[i64], delete_data: bool) -> Result<(), Error> {
        self.call(json!({
            "method": "torrent-remove",
            "arguments": {
                "ids": ids,
                "delete-local-data": delete_data,
            },
        }))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: String,
    arguments: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TorrentGetArguments {
    #[serde(default)]
    torrents: Vec<TorrentRecord>,
}

/// Wire record as reported by the daemon.
#[derive(Debug, Deserialize)]
struct TorrentRecord {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(rename = "hashString", default)]
    hash_string: String,
    #[serde(rename = "torrentFile", default)]
    torrent_file: Option<String>,
    #[serde(default)]
    status: i64,
    #[serde(rename = "isFinished", default)]
    is_finished: bool,
    #[serde(rename = "doneDate", default)]
    done_date: i64,
}

/// Normalize a wire record into the shared identity space: lowercase hash,
/// descriptor basename.
fn normalize(record: TorrentRecord) -> RemoteTask {
    RemoteTask {
        id: record.id,
        identity: record.hash_string.to_ascii_lowercase(),
        display_name: record.name,
        source_descriptor_name: record.torrent_file.as_deref().and_then(descriptor_basename),
        status: TaskStatus::from_code(record.status),
        is_finished: record.is_finished,
        done_date: record.done_date,
    }
}

fn descriptor_basename(torrent_file: &str) -> Option<String> {
    if torrent_file.is_empty() {
        return None;
    }
    Path::new(torrent_file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TorrentRecord {
        TorrentRecord {
            id: 7,
            name: "ubuntu-24.04.iso".to_string(),
            hash_string: "5F13493968157BA1C01999CB8C21F23DE8A99C50".to_string(),
            torrent_file: Some("/var/lib/transmission/torrents/ubuntu.torrent".to_string()),
            status: 4,
            is_finished: false,
            done_date: 0,
        }
    }

    #[test]
    fn test_normalize_lowercases_identity() {
        let task = normalize(record());
        assert_eq!(task.identity, "5f13493968157ba1c01999cb8c21f23de8a99c50");
    }

    #[test]
    fn test_normalize_extracts_descriptor_basename() {
        let task = normalize(record());
        assert_eq!(task.source_descriptor_name.as_deref(), Some("ubuntu.torrent"));
    }

    #[test]
    fn test_normalize_maps_status_codes() {
        let task = normalize(record());
        assert_eq!(task.status, TaskStatus::Downloading);

        let mut stopped = record();
        stopped.status = 0;
        assert!(normalize(stopped).status.is_stopped());
    }

    #[test]
    fn test_empty_torrent_file_has_no_source_name() {
        let mut magnet_only = record();
        magnet_only.torrent_file = Some(String::new());
        assert!(normalize(magnet_only).source_descriptor_name.is_none());
    }
}
