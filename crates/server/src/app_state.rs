use std::sync::Arc;

use server_api::{
    AdminGate, ApiContext, BroadcastNotifier, ChangeNotifier, DenyAll, PollNotifier,
    SharedSecretGate,
};
use storage::{AppendPolicy, Storage};
use tracing::warn;

use crate::config::{NotifyMode, Settings};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) admin_panel_path: String,
}

impl AppState {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        let notifier: Arc<dyn ChangeNotifier> = match settings.notify_mode {
            NotifyMode::Push => Arc::new(BroadcastNotifier::new(settings.event_buffer)),
            NotifyMode::Poll => Arc::new(PollNotifier),
        };

        let admin: Arc<dyn AdminGate> = match settings.admin_key.as_deref() {
            Some(secret) if !secret.is_empty() => Arc::new(SharedSecretGate::new(secret)),
            _ => {
                warn!("no admin key configured; administrative operations are disabled");
                Arc::new(DenyAll)
            }
        };

        let append_policy = if settings.reject_unknown_elements {
            AppendPolicy::RequireElement
        } else {
            AppendPolicy::Permissive
        };

        Self {
            api: ApiContext::new(Storage::new(), notifier, admin).with_append_policy(append_policy),
            admin_panel_path: settings.admin_panel_path.clone(),
        }
    }
}
