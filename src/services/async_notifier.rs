use tracing::{info, warn};

use crate::config::AsyncServiceConfig;

/// Hands submitted applications to the external checker.
///
/// Delivery is fire-and-forget: the request runs on its own task and
/// failures only reach the log.
#[derive(Clone)]
pub struct AsyncNotifier {
    http: reqwest::Client,
    config: AsyncServiceConfig,
}

impl AsyncNotifier {
    pub fn new(http: reqwest::Client, config: AsyncServiceConfig) -> Self {
        Self { http, config }
    }

    pub fn form(application_id: i32, checked: bool) -> [(&'static str, String); 2] {
        [("Id", application_id.to_string()), ("Check", checked.to_string())]
    }

    pub fn notify_submitted(&self, application_id: i32, checked: bool) {
        if !self.config.enabled {
            return;
        }

        let http = self.http.clone();
        let url = self.config.url.clone();
        tokio::spawn(async move {
            let result = http
                .post(&url)
                .form(&Self::form(application_id, checked))
                .send()
                .await
                .and_then(|resp| resp.error_for_status());

            match result {
                Ok(_) => info!("Application {} sent to async service", application_id),
                Err(e) => warn!("Failed to notify async service about application {}: {}", application_id, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_matches_callback_fields() {
        let form = AsyncNotifier::form(12, false);
        assert_eq!(form[0], ("Id", "12".to_string()));
        assert_eq!(form[1], ("Check", "false".to_string()));
    }

    #[tokio::test]
    async fn disabled_notifier_does_nothing() {
        let config = AsyncServiceConfig {
            enabled: false,
            url: "http://127.0.0.1:1/".to_string(),
            key: "secret".to_string(),
        };
        AsyncNotifier::new(reqwest::Client::new(), config).notify_submitted(1, false);
    }
}
