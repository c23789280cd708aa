use std::future::Future;
use std::time::Duration;

use crate::error::{RagError, Result};

/// Ejecuta una llamada externa con un límite de tiempo opcional. Si vence, el
/// error se construye con `on_timeout` para conservar el tipo del proveedor.
pub(crate) async fn within<T, F>(
    limit: Option<Duration>,
    call: F,
    on_timeout: impl FnOnce(String) -> RagError,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        None => call.await,
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(format!(
                "Sin respuesta tras {} ms",
                limit.as_millis()
            ))),
        },
    }
}
