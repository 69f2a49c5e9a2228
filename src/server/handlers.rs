use super::{AppError, AppResult, AppState, ServerConfig};
use crate::XmpPacket;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Multipart field carrying the PDF.
const UPLOAD_FIELD: &str = "pdf";

/// A PDF received into scoped temporary storage. Dropping it deletes the file.
#[derive(Debug)]
struct Upload {
    file: NamedTempFile,
    original_name: String,
    size: u64,
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub(super) async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let mut multipart = multipart.map_err(|_| AppError::bad_request("No file uploaded"))?;

    let upload = receive_pdf(&state.config, &mut multipart)
        .await?
        .ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    debug!(
        name = %upload.original_name,
        size = upload.size,
        path = %upload.file.path().display(),
        "upload stored"
    );

    let out_name = output_file_name(&upload.original_name);
    let extractor = state.extractor.clone();

    // The temp file moves into the blocking task and is removed when it ends.
    let packet = tokio::task::spawn_blocking(move || -> crate::Result<Option<XmpPacket>> {
        let data = std::fs::read(upload.file.path())?;
        Ok(extractor.extract(&data))
    })
    .await
    .map_err(AppError::internal)??
    .ok_or_else(AppError::no_xmp)?;

    info!(file = %out_name, strategy = %packet.strategy(), "XMP packet extracted");

    Ok((
        [
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{out_name}\""),
            ),
            (
                header::CONTENT_TYPE,
                "application/xml; charset=utf-8".to_string(),
            ),
        ],
        packet.to_text().into_owned(),
    )
        .into_response())
}

/// Stream the `pdf` field into a temporary file, enforcing the size ceiling.
///
/// Returns `None` when the form has no `pdf` field.
async fn receive_pdf(
    config: &ServerConfig,
    multipart: &mut Multipart,
) -> AppResult<Option<Upload>> {
    let limit = config.max_upload_bytes;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload.pdf").to_owned();
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(&config.upload_dir)?;

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            size += chunk.len() as u64;
            if size > limit {
                return Err(AppError::payload_too_large(limit));
            }
            file.write_all(&chunk)?;
        }
        file.flush()?;

        return Ok(Some(Upload {
            file,
            original_name,
            size,
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(limit)
    } else {
        AppError::from(err)
    }
}

/// Download name for the packet: the upload's base name without its
/// extension, plus `_xmp.xml`.
///
/// Directory parts from either separator are dropped. Characters that cannot
/// appear inside a quoted `Content-Disposition` filename become `_`.
pub fn output_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let stem: String = stem
        .chars()
        .map(|c| {
            if c == '"' || c.is_control() || !c.is_ascii() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if stem.is_empty() {
        "metadata_xmp.xml".to_string()
    } else {
        format!("{stem}_xmp.xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_file_name("report.pdf"), "report_xmp.xml");
        assert_eq!(output_file_name("archive.v2.PDF"), "archive.v2_xmp.xml");
        assert_eq!(output_file_name("noext"), "noext_xmp.xml");
    }

    #[test]
    fn output_name_drops_directories() {
        assert_eq!(output_file_name("/tmp/a/b.pdf"), "b_xmp.xml");
        assert_eq!(output_file_name(r"C:\Users\me\scan.pdf"), "scan_xmp.xml");
    }

    #[test]
    fn output_name_is_header_safe() {
        assert_eq!(output_file_name("we\"ird\n.pdf"), "we_ird__xmp.xml");
        assert_eq!(output_file_name("Bericht-\u{e4}.pdf"), "Bericht-__xmp.xml");
        assert_eq!(output_file_name(".pdf"), ".pdf_xmp.xml");
        assert_eq!(output_file_name(""), "metadata_xmp.xml");
    }
}
