use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor that reports failures in the API's error format
///
/// Accepts `application/json` and any `+json` media type. A missing
/// Content-Type is tolerated.
pub struct CatalogJson<T>(pub T);

impl<T, S> FromRequest<S> for CatalogJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CatalogJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
            let media_type = content_type
                .to_str()
                .map_err(|_| CatalogJsonRejection::InvalidContentType)?
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_lowercase();

            if media_type != "application/json" && !media_type.ends_with("+json") {
                return Err(CatalogJsonRejection::InvalidContentType);
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(CatalogJson(value)),
            Err(rejection) => Err(CatalogJsonRejection::JsonRejection(rejection)),
        }
    }
}

pub enum CatalogJsonRejection {
    InvalidContentType,
    JsonRejection(JsonRejection),
}

impl IntoResponse for CatalogJsonRejection {
    fn into_response(self) -> Response {
        let error = match self {
            CatalogJsonRejection::InvalidContentType => {
                AppError::BadRequest("Content-Type must be application/json".to_string())
            }
            CatalogJsonRejection::JsonRejection(rejection) => {
                AppError::BadRequest(format!("Invalid JSON: {}", rejection.body_text()))
            }
        };
        error.into_response()
    }
}
