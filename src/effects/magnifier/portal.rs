//! xdg-desktop-portal Screenshot calls used to sample the screen.

use super::sampler::SampleError;
use futures::StreamExt;
use std::collections::HashMap;
use zbus::zvariant::{OwnedValue, Value};
use zbus::{Connection, proxy};

#[proxy(
    interface = "org.freedesktop.portal.Screenshot",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait Screenshot {
    /// Returns the object path of a Request that later emits `Response`.
    async fn screenshot(
        &self,
        parent_window: &str,
        options: HashMap<String, Value<'_>>,
    ) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
}

#[proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    /// Response code: 0 success, 1 cancelled or denied, 2 other error.
    #[zbus(signal)]
    fn response(&self, response: u32, results: HashMap<String, OwnedValue>) -> zbus::Result<()>;
}

/// Asks the portal for a silent full-desktop screenshot and returns its file URI.
pub async fn screenshot_uri(connection: &Connection) -> Result<String, SampleError> {
    let proxy = ScreenshotProxy::new(connection)
        .await
        .map_err(classify_dbus_error)?;

    let request_path = proxy
        .screenshot("", sample_options())
        .await
        .map_err(classify_dbus_error)?;

    log::debug!("Screenshot request created: {:?}", request_path);

    let request_proxy = RequestProxy::builder(connection)
        .path(request_path)?
        .build()
        .await?;

    let mut responses = request_proxy.receive_response().await?;
    let signal = responses
        .next()
        .await
        .ok_or_else(|| SampleError::InvalidResponse("No Response signal received".to_string()))?;

    let args = signal
        .args()
        .map_err(|e| SampleError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    match args.response {
        0 => {
            let uri = args.results.get("uri").ok_or_else(|| {
                SampleError::InvalidResponse("No 'uri' field in response".to_string())
            })?;
            let uri: &str = uri
                .downcast_ref()
                .map_err(|e| SampleError::InvalidResponse(format!("URI is not a string: {}", e)))?;
            Ok(uri.to_string())
        }
        1 => Err(SampleError::PermissionDenied),
        code => Err(SampleError::InvalidResponse(format!(
            "Portal returned error code {}",
            code
        ))),
    }
}

fn sample_options() -> HashMap<String, Value<'static>> {
    let mut options = HashMap::new();
    options.insert("modal".to_string(), false.into());
    options.insert("interactive".to_string(), false.into());
    options
}

/// Maps "no such service/interface" failures to `PortalUnavailable`.
fn classify_dbus_error(err: zbus::Error) -> SampleError {
    let message = err.to_string();
    if message.contains("ServiceUnknown")
        || message.contains("UnknownInterface")
        || message.contains("UnknownMethod")
    {
        SampleError::PortalUnavailable
    } else if message.contains("Cancelled") || message.contains("denied") {
        SampleError::PermissionDenied
    } else {
        SampleError::DBus(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_never_interactive() {
        let options = sample_options();
        assert_eq!(options.get("interactive"), Some(&Value::from(false)));
        assert_eq!(options.get("modal"), Some(&Value::from(false)));
    }

    #[test]
    fn missing_portal_is_classified() {
        let err = zbus::Error::Failure(
            "org.freedesktop.DBus.Error.ServiceUnknown: no portal".to_string(),
        );
        assert!(matches!(
            classify_dbus_error(err),
            SampleError::PortalUnavailable
        ));

        let other = zbus::Error::Failure("timeout".to_string());
        assert!(matches!(classify_dbus_error(other), SampleError::DBus(_)));
    }
}
