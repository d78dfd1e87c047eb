use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use crate::api::MockServerClient;
use crate::config::ConsoleConfig;
use crate::error::NetworkError;
use crate::form::FormStore;
use crate::notification::{NotificationKind, Notifier};
use crate::registry::EndpointRegistry;
use crate::submission::{SubmissionOutcome, SubmissionState, SubmitEvent, build_payload};
use crate::ui::{Loader, UiEffects};

/// Application state for one console session.
pub struct AdminConsole {
    form: FormStore,
    registry: EndpointRegistry,
    notifier: Notifier,
    loader: Loader,
    submission: watch::Sender<SubmissionState>,
}

impl AdminConsole {
    pub fn new(config: &ConsoleConfig, effects: Arc<dyn UiEffects>) -> Result<Self, NetworkError> {
        let api = MockServerClient::new(&config.server_url)?;
        let loader = Loader::new(effects.clone());
        let notifier = Notifier::new(effects.clone(), config.notification_ttl());
        let form = FormStore::new(effects.clone());
        let registry = EndpointRegistry::new(
            api,
            loader.clone(),
            notifier.clone(),
            form.clone(),
            effects,
        );
        let (submission, _) = watch::channel(SubmissionState::Idle);

        Ok(AdminConsole {
            form,
            registry,
            notifier,
            loader,
            submission,
        })
    }

    pub fn form(&self) -> &FormStore {
        &self.form
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn submission_state(&self) -> SubmissionState {
        *self.submission.borrow()
    }

    pub fn subscribe_submission(&self) -> watch::Receiver<SubmissionState> {
        self.submission.subscribe()
    }

    fn transition(&self, state: SubmissionState) {
        debug!("Submission state -> {:?}", state);
        self.submission.send_replace(state);
    }

    /// Validates the current draft and registers it.
    pub async fn handle_submit(&self, event: &mut SubmitEvent) -> SubmissionOutcome {
        event.prevent_default();

        self.transition(SubmissionState::Validating);
        let payload = match build_payload(&self.form.snapshot()) {
            Ok(payload) => payload,
            Err(err) => {
                self.notifier.show_notification(err.to_string(), NotificationKind::Error);
                self.transition(SubmissionState::Idle);
                return SubmissionOutcome::Aborted(err);
            }
        };

        self.transition(SubmissionState::Submitting);
        let outcome = match self.registry.register_endpoint(payload).await {
            Ok(()) => SubmissionOutcome::Succeeded,
            Err(err) => SubmissionOutcome::Failed(err),
        };
        self.transition(SubmissionState::Idle);

        outcome
    }
}
