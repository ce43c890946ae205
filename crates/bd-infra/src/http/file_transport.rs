use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder};

use bd_core::ids::ResourceKey;
use bd_core::ports::{
    CredentialsPort, FetchedResource, FileTransferError, FileTransferPort, LocalFile,
    ProgressSender,
};

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Authenticated file transport against the bizdesk REST backend.
///
/// The bearer token is read from the credentials capability on every
/// request, so a token refresh is picked up by the next call.
pub struct HttpFileTransport {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialsPort>,
}

impl HttpFileTransport {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialsPort>,
    ) -> Result<Self, FileTransferError> {
        let client = Client::builder()
            .build()
            .map_err(|e| FileTransferError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        // No token → request goes out unauthenticated and the backend
        // answers 401; this layer does not special-case it.
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl FileTransferPort for HttpFileTransport {
    async fn fetch_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<FetchedResource, FileTransferError> {
        let url = format!("{}/file/resource/{}", self.base_url, key);
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| FileTransferError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FileTransferError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FileTransferError::Network(e.to_string()))?;

        Ok(FetchedResource {
            bytes,
            content_type,
        })
    }

    async fn upload_file(
        &self,
        file: LocalFile,
        progress: ProgressSender,
    ) -> Result<ResourceKey, FileTransferError> {
        let bytes = tokio::fs::read(&file.uri)
            .await
            .map_err(|e| FileTransferError::LocalFile(e.to_string()))?;

        let (body, total) = progress_body(bytes, progress);
        let part = Part::stream_with_length(body, total)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| FileTransferError::LocalFile(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = format!("{}/en/upload/file", self.base_url);
        info!("POST {} ({}, {} bytes)", url, file.file_name, total);

        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| FileTransferError::Network(e.to_string()))?;

        let status = response.status();
        // The backend answers 200/201 (and 204 in some flows)
        // interchangeably, so any 2xx passes here. An upload still needs a
        // body carrying the id, so a bodyless 204 surfaces as an invalid
        // response rather than a silent success.
        if !status.is_success() {
            return Err(FileTransferError::Status(status.as_u16()));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FileTransferError::InvalidResponse(e.to_string()))?;
        let id = extract_id(&value).ok_or_else(|| {
            FileTransferError::InvalidResponse("missing id field".to_string())
        })?;

        Ok(ResourceKey::from(id))
    }
}

/// Wraps the payload into a chunked body that reports cumulative progress
/// as a percentage through `progress`. Sends are fire-and-forget.
fn progress_body(bytes: Vec<u8>, progress: ProgressSender) -> (Body, u64) {
    let total = bytes.len() as u64;
    let chunks: Vec<Bytes> = bytes
        .chunks(UPLOAD_CHUNK_SIZE)
        .map(Bytes::copy_from_slice)
        .collect();

    let mut sent: u64 = 0;
    let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        let percent = if total == 0 {
            100
        } else {
            ((sent * 100) / total) as u8
        };
        let _ = progress.send(percent);
        Ok::<Bytes, std::io::Error>(chunk)
    }));

    (Body::wrap_stream(stream), total)
}

/// The id comes back either at the top level or nested under `data`,
/// as a string or a number.
fn extract_id(value: &serde_json::Value) -> Option<String> {
    let candidate = value
        .get("id")
        .or_else(|| value.get("data").and_then(|d| d.get("id")))?;
    match candidate {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::io::Write;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct StaticCreds(Mutex<Option<String>>);

    impl StaticCreds {
        fn new(token: &str) -> Arc<Self> {
            Arc::new(Self(Mutex::new(Some(token.to_string()))))
        }

        fn set(&self, token: &str) {
            *self.0.lock().unwrap() = Some(token.to_string());
        }
    }

    impl CredentialsPort for StaticCreds {
        fn bearer_token(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn transport(server: &Server, creds: Arc<StaticCreds>) -> HttpFileTransport {
        HttpFileTransport::new(server.url(), creds).unwrap()
    }

    fn temp_upload_file(contents: &[u8]) -> (tempfile::TempDir, LocalFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents)
            .unwrap();
        let file = LocalFile {
            uri: path.to_string_lossy().into_owned(),
            file_name: "photo.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        };
        (dir, file)
    }

    #[tokio::test]
    async fn fetch_sends_bearer_token_and_returns_bytes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/file/resource/img123.jpg")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(b"jpegbytes")
            .create_async()
            .await;

        let transport = transport(&server, StaticCreds::new("tok-1"));
        let fetched = transport
            .fetch_resource(&ResourceKey::from("img123.jpg"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(&fetched.bytes[..], b"jpegbytes");
        assert_eq!(fetched.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn fetch_maps_non_2xx_to_status_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/file/resource/denied.jpg")
            .with_status(403)
            .create_async()
            .await;

        let transport = transport(&server, StaticCreds::new("tok"));
        let err = transport
            .fetch_resource(&ResourceKey::from("denied.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, FileTransferError::Status(403)));
    }

    #[tokio::test]
    async fn token_refresh_is_observed_by_the_next_call() {
        let mut server = Server::new_async().await;
        let old = server
            .mock("GET", "/file/resource/a.jpg")
            .match_header("authorization", "Bearer old")
            .with_status(200)
            .with_body(b"x")
            .create_async()
            .await;
        let new = server
            .mock("GET", "/file/resource/b.jpg")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .with_body(b"y")
            .create_async()
            .await;

        let creds = StaticCreds::new("old");
        let transport = transport(&server, creds.clone());

        transport
            .fetch_resource(&ResourceKey::from("a.jpg"))
            .await
            .unwrap();
        creds.set("new");
        transport
            .fetch_resource(&ResourceKey::from("b.jpg"))
            .await
            .unwrap();

        old.assert_async().await;
        new.assert_async().await;
    }

    #[tokio::test]
    async fn upload_parses_top_level_id_and_reports_full_progress() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/en/upload/file")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "stored-1.jpg"}"#)
            .create_async()
            .await;

        let (_dir, file) = temp_upload_file(&vec![7u8; 200_000]);
        let transport = transport(&server, StaticCreds::new("tok"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let key = transport.upload_file(file, tx).await.unwrap();

        mock.assert_async().await;
        assert_eq!(key.as_str(), "stored-1.jpg");

        let mut events = Vec::new();
        while let Ok(p) = rx.try_recv() {
            events.push(p);
        }
        assert!(!events.is_empty());
        assert_eq!(*events.last().unwrap(), 100);
        assert!(events.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn upload_parses_id_nested_under_data() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/en/upload/file")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"id": 42}}"#)
            .create_async()
            .await;

        let (_dir, file) = temp_upload_file(b"tiny");
        let transport = transport(&server, StaticCreds::new("tok"));
        let (tx, _rx) = mpsc::unbounded_channel();

        let key = transport.upload_file(file, tx).await.unwrap();
        assert_eq!(key.as_str(), "42");
    }

    #[tokio::test]
    async fn upload_with_missing_id_is_an_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/en/upload/file")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let (_dir, file) = temp_upload_file(b"tiny");
        let transport = transport(&server, StaticCreds::new("tok"));
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = transport.upload_file(file, tx).await.unwrap_err();
        assert!(matches!(err, FileTransferError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn bodyless_204_upload_is_not_a_silent_success() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/en/upload/file")
            .with_status(204)
            .create_async()
            .await;

        let (_dir, file) = temp_upload_file(b"tiny");
        let transport = transport(&server, StaticCreds::new("tok"));
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = transport.upload_file(file, tx).await.unwrap_err();
        assert!(matches!(err, FileTransferError::InvalidResponse(_)));
    }

    #[test]
    fn extract_id_accepts_string_and_number_shapes() {
        assert_eq!(
            extract_id(&serde_json::json!({"id": "abc"})).as_deref(),
            Some("abc")
        );
        assert_eq!(
            extract_id(&serde_json::json!({"data": {"id": 7}})).as_deref(),
            Some("7")
        );
        assert_eq!(extract_id(&serde_json::json!({"id": ""})), None);
        assert_eq!(extract_id(&serde_json::json!({"other": 1})), None);
    }
}
