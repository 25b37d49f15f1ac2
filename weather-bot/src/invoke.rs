use tracing::warn;
use weather_core::{Acknowledgment, Dispatcher, Update};

/// One serverless-style invocation: decode, dispatch, acknowledge.
pub async fn invoke(dispatcher: &Dispatcher, payload: &str) -> Acknowledgment {
    if !dispatcher.is_enabled() {
        return Acknowledgment::OK;
    }

    match Update::from_invocation(payload) {
        Ok(update) => dispatcher.handle(update).await,
        Err(err) => {
            warn!(error = %err, "Discarding undecodable invocation");
            Acknowledgment::OK
        }
    }
}
