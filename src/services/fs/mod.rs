pub mod content;
pub mod export;
pub mod listing;
pub mod tree;

use std::time::SystemTime;

use time::macros::format_description;
use time::OffsetDateTime;

use crate::core::errors::{Error, Result};

/// UTC timestamp with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`.
pub fn iso_timestamp(at: SystemTime) -> String {
    let format =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
    OffsetDateTime::from(at)
        .format(&format)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000Z"))
}

/// Runs blocking filesystem work off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("blocking task failed: {e}")))?
}
