//! Mapping of SDK failures onto s3ops-core error kinds

use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use s3ops_core::Error;

/// Classify an SDK error for `resource` (a bucket or `bucket/key`)
pub(crate) fn map_sdk_error<E>(err: SdkError<E>, resource: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match &err {
        SdkError::ServiceError(service) => {
            let status = service.raw().status().as_u16();
            let code = service.err().code().unwrap_or("Unknown").to_string();
            let message = service
                .err()
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| code.clone());
            classify_service_error(status, code, message, resource)
        }
        SdkError::TimeoutError(_) => Error::Network(format!("Request timeout: {resource}")),
        SdkError::DispatchFailure(failure) => {
            Error::Network(format!("Network dispatch error: {failure:?}"))
        }
        SdkError::ResponseError(failure) => {
            Error::Network(format!("Response error: {failure:?}"))
        }
        SdkError::ConstructionFailure(failure) => {
            Error::General(format!("Request construction failed: {failure:?}"))
        }
        _ => Error::General(err.to_string()),
    }
}

/// Classify a reply the service sent with a non-success status
pub(crate) fn classify_service_error(
    status: u16,
    code: String,
    message: String,
    resource: &str,
) -> Error {
    match (status, code.as_str()) {
        (_, "NoSuchBucket" | "NoSuchKey" | "NoSuchVersion" | "NotFound") | (404, _) => {
            Error::NotFound(resource.to_string())
        }
        (_, "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken")
        | (401 | 403, _) => Error::Auth(format!("{resource}: {message}")),
        (_, "BucketAlreadyExists" | "BucketAlreadyOwnedByYou" | "BucketNotEmpty")
        | (409, _) => Error::Conflict(format!("{resource}: {code}")),
        _ => Error::Service {
            status,
            code,
            message,
        },
    }
}
