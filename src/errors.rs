use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised while decoding a nutrition payload or driving the chart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// No raw payload was supplied where one is required
    #[error("nutrition payload is missing")]
    MissingPayload,

    /// Payload is not valid structured data or carries an unparseable date
    #[error("malformed nutrition payload: {0}")]
    MalformedPayload(String),

    /// Update notification arrived without a payload
    #[error("update notification carries no detail")]
    MissingDetail,

    /// Update references a date outside the chart's x-domain
    #[error("no chart point for {0}")]
    UnmatchedDate(NaiveDate),

    /// A chart cannot be built from zero observations
    #[error("cannot build a chart from an empty series")]
    EmptySeries,

    /// Backend was asked to draw a series type nobody registered
    #[error("series type {0} is not registered")]
    UnregisteredSeries(String),

    /// Rendering target has no identifier
    #[error("rendering surface is missing")]
    MissingSurface,

    /// Plotted window length is zero or reaches past the calendar's range
    #[error("chart window of {0} days is out of range")]
    WindowOutOfRange(u32),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        let status = match err {
            ChartError::MissingPayload | ChartError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ChartError::MissingDetail => StatusCode::UNPROCESSABLE_ENTITY,
            ChartError::UnmatchedDate(_) => StatusCode::NOT_FOUND,
            ChartError::EmptySeries
            | ChartError::UnregisteredSeries(_)
            | ChartError::MissingSurface
            | ChartError::WindowOutOfRange(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
