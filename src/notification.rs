//! Desktop notifications over the freedesktop D-Bus interface.

use std::collections::HashMap;
use zbus::{Connection, proxy};

const APP_NAME: &str = "annotateit";
const DEFAULT_ICON: &str = "applications-graphics";
const EXPIRE_TIMEOUT_MS: i32 = 3000;

#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Returns the id of the shown notification.
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Shows a notification; `icon` defaults to a generic graphics icon.
pub async fn send_notification(
    summary: &str,
    body: &str,
    icon: Option<&str>,
) -> Result<(), String> {
    let connection = Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session bus: {}", e))?;

    let proxy = NotificationsProxy::new(&connection)
        .await
        .map_err(|e| format!("Failed to create notifications proxy: {}", e))?;

    proxy
        .notify(
            APP_NAME,
            0,
            icon.unwrap_or(DEFAULT_ICON),
            summary,
            body,
            vec![],
            HashMap::new(),
            EXPIRE_TIMEOUT_MS,
        )
        .await
        .map_err(|e| format!("Failed to send notification: {}", e))?;

    Ok(())
}

/// Fire-and-forget variant for the event loop thread. Failures are logged.
pub fn send_notification_async(
    runtime_handle: &tokio::runtime::Handle,
    summary: String,
    body: String,
    icon: Option<String>,
) {
    runtime_handle.spawn(async move {
        if let Err(e) = send_notification(&summary, &body, icon.as_deref()).await {
            log::warn!("Failed to send notification: {}", e);
        }
    });
}
