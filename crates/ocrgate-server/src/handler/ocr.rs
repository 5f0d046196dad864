//! OCR handlers.
//!
//! `POST /ocr_img_url` hands a remote document straight to the engine.
//! `POST /ocr` stages an upload in a fresh workspace, runs the engine on it
//! and returns the recognized text together with the annotated pages.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use bytes::Bytes;

use crate::extract::{Json, Multipart, RequestContext};
use crate::handler::request::OcrImageUrl;
use crate::handler::response::{OcrText, OcrUpload};
use crate::handler::{ErrorKind, Result};
use crate::service::{
    Assembled, ArtifactKind, OcrEngineHandle, OcrSource, ResultAssembler, ScratchSpace,
    ServiceState, Workspace,
};

/// Tracing target for OCR handlers.
const TRACING_TARGET: &str = "ocrgate_server::handler::ocr";

/// Name of the multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Recognizes a document the engine downloads itself.
#[tracing::instrument(skip_all, fields(request_id = %context.request_id()))]
async fn ocr_image_url(
    State(engine): State<OcrEngineHandle>,
    context: RequestContext,
    Json(request): Json<OcrImageUrl>,
) -> Result<Json<OcrText>> {
    let Some(url) = request.url() else {
        tracing::warn!(target: TRACING_TARGET, "request without image url");
        return Err(ErrorKind::MissingInput.with_message("no image url provided"));
    };

    tracing::info!(target: TRACING_TARGET, url = %url, "recognizing remote document");

    let pages = engine
        .recognize(&OcrSource::Url(url.to_owned()))
        .await
        .map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                elapsed_secs = context.elapsed().as_secs_f64(),
                "remote recognition failed"
            );
            ErrorKind::OcrFailure.with_message(format!("recognition failed: {}", error.message()))
        })?;

    let text = pages
        .iter()
        .flat_map(|page| page.recognized_texts().iter().cloned())
        .collect::<Vec<_>>();

    tracing::info!(
        target: TRACING_TARGET,
        pages = pages.len(),
        lines = text.len(),
        elapsed_secs = context.elapsed().as_secs_f64(),
        "remote recognition completed"
    );

    Ok(Json(OcrText { text }))
}

/// Recognizes an uploaded image or PDF.
#[tracing::instrument(skip_all, fields(request_id = %context.request_id()))]
async fn ocr_upload(
    State(engine): State<OcrEngineHandle>,
    State(scratch): State<ScratchSpace>,
    State(assembler): State<ResultAssembler>,
    mut context: RequestContext,
    Multipart(mut multipart): Multipart,
) -> Result<Json<OcrUpload>> {
    let (content_type, bytes) = read_file_field(&mut multipart).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        content_type = content_type.as_deref(),
        size = bytes.len(),
        started_at = %context.started_at(),
        "upload received"
    );

    let mut workspace = scratch.acquire()?;
    let outcome = recognize_upload(
        &engine,
        &assembler,
        &mut context,
        &mut workspace,
        content_type.as_deref(),
        &bytes,
    )
    .await;
    workspace.close().await;

    let Assembled { texts, images } = outcome.inspect_err(|error| {
        tracing::warn!(
            target: TRACING_TARGET,
            kind = ?context.kind(),
            error = %error,
            elapsed_secs = context.elapsed().as_secs_f64(),
            "upload recognition failed"
        );
    })?;

    let detail_time = context.elapsed().as_secs_f64();
    tracing::info!(
        target: TRACING_TARGET,
        kind = ?context.kind(),
        lines = texts.len(),
        images = images.len(),
        elapsed_secs = detail_time,
        "upload recognition completed"
    );

    Ok(Json(OcrUpload {
        result: texts,
        detail_time,
        image_list: images,
    }))
}

/// Reads the `file` field fully into memory, skipping any other fields.
async fn read_file_field(
    multipart: &mut axum::extract::Multipart,
) -> Result<(Option<String>, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;
        return Ok((content_type, bytes));
    }

    Err(ErrorKind::MissingInput.with_message("no file provided"))
}

/// Classifies, stages and recognizes the upload inside `workspace`.
async fn recognize_upload(
    engine: &OcrEngineHandle,
    assembler: &ResultAssembler,
    context: &mut RequestContext,
    workspace: &mut Workspace,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<Assembled> {
    let kind = ArtifactKind::classify(content_type).map_err(|rejected| {
        ErrorKind::UnsupportedType
            .with_message("unsupported file type")
            .with_context(rejected.to_string())
    })?;
    context.set_kind(kind);

    let path = workspace.stage(kind, bytes).await?;

    let ocr_failure = |error: crate::Error| {
        ErrorKind::OcrFailure.with_message(format!("ocr recognition failed: {}", error.message()))
    };

    let pages = engine
        .recognize(&OcrSource::File { path, kind })
        .await
        .map_err(ocr_failure)?;

    assembler
        .assemble(&pages, workspace)
        .await
        .map_err(ocr_failure)
}

/// Returns a [`Router`] with the OCR routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/ocr_img_url", post(ocr_image_url))
        .route("/ocr", post(ocr_upload))
}
