use axum::body::Body;
use axum::http::{header, HeaderMap};
use compose_blob::{BlobPut, ByteStream};
use compose_core::ComposeError;
use futures::TryStreamExt;

use crate::ComposeAxumError;

/// One file field pulled out of a multipart body, still streaming.
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub stream: ByteStream,
}

impl FilePart {
    pub fn blob_put(&self) -> BlobPut {
        let put = BlobPut::new(self.filename.clone());
        match &self.content_type {
            Some(ct) => put.with_content_type(ct.clone()),
            None => put,
        }
    }
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Find the multipart field called `field` and return it without buffering.
///
/// Fields before it are skipped. Malformed bodies surface from the stream
/// as `InvalidData` I/O errors.
pub async fn file_part(
    headers: &HeaderMap,
    body: Body,
    field: &str,
) -> Result<FilePart, ComposeAxumError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ComposeError::bad_request("Expected a multipart/form-data body"))?;
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ComposeError::bad_request(format!("Invalid multipart body: {e}")))?;

    let mut multipart = multer::Multipart::new(body.into_data_stream(), boundary);
    loop {
        let next = multipart
            .next_field()
            .await
            .map_err(|e| ComposeError::bad_request(format!("Invalid multipart body: {e}")))?;
        let Some(part) = next else {
            return Err(ComposeError::bad_request(format!("Missing multipart field '{field}'")).into());
        };
        if part.name() != Some(field) {
            continue;
        }

        let filename = part
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ComposeError::bad_request(format!("Field '{field}' has no filename")))?;
        let content_type = part.content_type().map(|m| m.essence_str().to_string());
        let stream = part.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e));

        return Ok(FilePart {
            filename,
            content_type,
            stream: Box::pin(stream),
        });
    }
}
