use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{Html, IntoResponse, Json, Response},
};
use base64::{engine::general_purpose, Engine as _};
use tracing::info;

use crate::error::AppError;
use crate::feature::{
    Feature, FeatureRequest, PromptTemplate, PROMPT_FIELD, PROMPT_TEMPLATES, REFERENCE_FIELD, SOURCE_FIELD,
    TARGET_FIELD,
};
use crate::quality::{analyze_image_quality, QualityReport};
use crate::upload::{resolve_mime_type, validate_image_file, UploadedFile};
use crate::AppState;

const QUALITY_FIELD: &str = "image";

/// Multipart fields keyed by name. The first occurrence of a name wins.
struct UploadForm {
    fields: HashMap<String, UploadedFile>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?;

            fields
                .entry(name)
                .or_insert_with(|| UploadedFile::new(file_name, content_type, bytes));
        }

        Ok(Self { fields })
    }

    fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.fields.remove(name)
    }

    /// Text value of a field, `None` when absent, empty or not UTF-8.
    fn take_text(&mut self, name: &str) -> Option<String> {
        let field = self.fields.remove(name)?;
        std::str::from_utf8(&field.bytes)
            .ok()
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    }
}

pub async fn face_swap(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let (Some(source), Some(target)) = (form.take_file(SOURCE_FIELD), form.take_file(TARGET_FIELD)) else {
        return Err(AppError::MissingInput("Both source and target images are required"));
    };

    run_feature(&state, FeatureRequest::FaceSwap { source, target }).await
}

pub async fn prompt_generation(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let (Some(reference), Some(prompt)) = (form.take_file(REFERENCE_FIELD), form.take_text(PROMPT_FIELD)) else {
        return Err(AppError::MissingInput("Reference image and prompt are required"));
    };

    run_feature(&state, FeatureRequest::PromptGeneration { reference, prompt }).await
}

/// Validates every upload before the model is called, then echoes the
/// feature's result image with the analysis attached as a header.
async fn run_feature(state: &AppState, request: FeatureRequest) -> Result<Response, AppError> {
    let feature = request.feature();

    for (field, file) in request.images() {
        validate_image_file(file).map_err(|rejection| AppError::InvalidUpload { field, rejection })?;
    }

    let model_request = request.model_request(&state.models);
    let analysis = state
        .model
        .generate(&model_request)
        .await
        .map_err(|source| AppError::Downstream { feature, source })?;

    info!(
        feature = feature.slug(),
        model = %model_request.model,
        analysis_chars = analysis.chars().count(),
        "Analysis complete"
    );

    Ok(echo_response(feature, request.into_echo(), &analysis))
}

fn echo_response(feature: Feature, echo: UploadedFile, analysis: &str) -> Response {
    let mut headers = HeaderMap::new();

    let content_type = HeaderValue::from_str(&resolve_mime_type(&echo))
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(feature.content_disposition()),
    );

    let encoded = general_purpose::STANDARD.encode(feature.analysis_excerpt(analysis));
    if let Ok(value) = HeaderValue::from_str(&encoded) {
        headers.insert(HeaderName::from_static(feature.analysis_header()), value);
    }

    (headers, echo.bytes).into_response()
}

pub async fn image_quality(multipart: Multipart) -> Result<Json<QualityReport>, AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let image = form
        .take_file(QUALITY_FIELD)
        .ok_or(AppError::MissingInput("An image is required"))?;
    validate_image_file(&image).map_err(|rejection| AppError::InvalidUpload {
        field: QUALITY_FIELD,
        rejection,
    })?;

    Ok(Json(analyze_image_quality(&image)?))
}

pub async fn prompt_templates() -> Json<&'static [PromptTemplate]> {
    Json(PROMPT_TEMPLATES)
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
