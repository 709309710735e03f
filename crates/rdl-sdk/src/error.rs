use thiserror::Error;

/// Errors surfaced by the high-level API.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("markup error: {0}")]
    Markup(#[from] rdl_markup::MarkupError),

    #[error("blob store error: {0}")]
    Blob(#[from] rdl_blob::BlobError),

    #[error("diff protocol error: {0}")]
    Diff(#[from] rdl_diff::DiffError),
}

pub type SdkResult<T> = Result<T, SdkError>;
