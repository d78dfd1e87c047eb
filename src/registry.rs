use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use crate::api::MockServerClient;
use crate::error::{ConsoleError, NetworkError};
use crate::form::FormStore;
use crate::model::EndpointConfig;
use crate::notification::{NotificationKind, Notifier};
use crate::submission::RegistrationPayload;
use crate::ui::{Loader, UiEffects};

/// Local mirror of the backend's endpoints and the operations that change them.
/// The mirror is only ever replaced wholesale by a successful `/list`.
#[derive(Clone)]
pub struct EndpointRegistry {
    api: MockServerClient,
    endpoints: Arc<watch::Sender<Vec<EndpointConfig>>>,
    loader: Loader,
    notifier: Notifier,
    form: FormStore,
    effects: Arc<dyn UiEffects>,
}

impl EndpointRegistry {
    pub fn new(
        api: MockServerClient,
        loader: Loader,
        notifier: Notifier,
        form: FormStore,
        effects: Arc<dyn UiEffects>,
    ) -> Self {
        let (endpoints, _) = watch::channel(Vec::new());
        EndpointRegistry {
            api,
            endpoints: Arc::new(endpoints),
            loader,
            notifier,
            form,
            effects,
        }
    }

    pub fn endpoints(&self) -> Vec<EndpointConfig> {
        self.endpoints.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<EndpointConfig>> {
        self.endpoints.subscribe()
    }

    pub async fn load_endpoints(&self) -> Result<(), NetworkError> {
        let _loader = self.loader.show();

        match self.api.list().await {
            Ok(endpoints) => {
                debug!("Loaded {} endpoints", endpoints.len());
                self.endpoints.send_replace(endpoints);
                Ok(())
            }
            Err(err) => {
                self.notifier.show_notification(err.to_string(), NotificationKind::Error);
                Err(err)
            }
        }
    }

    /// On success the form is reset and the mirror refreshed. A failed refresh is
    /// reported on its own and doesn't undo the registration.
    pub async fn register_endpoint(&self, payload: RegistrationPayload) -> Result<(), NetworkError> {
        let _loader = self.loader.show();
        let path = payload.path.clone();

        if let Err(err) = self.api.register(payload).await {
            self.notifier.show_notification(err.to_string(), NotificationKind::Error);
            return Err(err);
        }

        info!("Registered endpoint {}", path);
        self.notifier
            .show_notification("Endpoint registered successfully!", NotificationKind::Success);
        self.form.reset_form();
        if let Err(err) = self.load_endpoints().await {
            debug!("Refresh after registering {} failed: {}", path, err);
        }

        Ok(())
    }

    pub async fn delete_endpoint(&self, path: &str) -> Result<(), ConsoleError> {
        let prompt = format!("Are you sure you want to delete the endpoint \"{}\"?", path);
        if !self.effects.confirm(&prompt) {
            debug!("Deletion of {} declined", path);
            return Err(ConsoleError::ConfirmationDeclined);
        }

        let _loader = self.loader.show();
        if let Err(err) = self.api.delete(path).await {
            self.notifier.show_notification(err.to_string(), NotificationKind::Error);
            return Err(err.into());
        }

        info!("Deleted endpoint {}", path);
        self.notifier
            .show_notification("Endpoint deleted successfully!", NotificationKind::Success);
        if let Err(err) = self.load_endpoints().await {
            debug!("Refresh after deleting {} failed: {}", path, err);
        }

        Ok(())
    }
}
