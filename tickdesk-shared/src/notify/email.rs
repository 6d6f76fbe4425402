/// HTTP transactional-mail client
///
/// Delivers mail through a Postmark-style JSON API: a single `POST /email`
/// with the sender, recipient, subject and body, authenticated by a server
/// token header. The concrete provider is configured by base URL, so tests
/// point it at a local mock server.

use reqwest::{Client, Url};
use serde::Serialize;

use super::{NotificationDispatcher, NotifyError};

const AUTH_HEADER: &str = "X-Server-Token";
const MESSAGE_STREAM: &str = "outbound";

/// Mail dispatcher backed by an HTTP transactional-mail provider
pub struct HttpEmailDispatcher {
    http_client: Client,
    base_url: String,
    sender: String,
    server_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}

impl HttpEmailDispatcher {
    /// Creates a dispatcher for the given provider endpoint and sender
    pub fn new(base_url: String, sender: String, server_token: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
            sender,
            server_token,
        }
    }

    /// Creates a dispatcher reusing an existing HTTP client
    pub fn with_client(
        base_url: String,
        sender: String,
        server_token: String,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            server_token,
        }
    }
}

#[async_trait::async_trait]
impl NotificationDispatcher for HttpEmailDispatcher {
    #[tracing::instrument(name = "send_email", skip_all, fields(to = %to))]
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| NotifyError::Configuration(format!("Bad mail endpoint: {}", e)))?;
        let url = base
            .join("/email")
            .map_err(|e| NotifyError::Configuration(format!("Bad mail endpoint: {}", e)))?;

        let request_body = SendEmailRequest {
            from: &self.sender,
            to,
            subject,
            html_body: body,
            text_body: body,
            message_stream: MESSAGE_STREAM,
        };

        let response = self
            .http_client
            .post(url)
            .header(AUTH_HEADER, &self.server_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(format!("Mail request failed: {}", e)))?;

        response
            .error_for_status()
            .map_err(|e| NotifyError::Delivery(format!("Mail provider rejected message: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher_for(server: &MockServer) -> HttpEmailDispatcher {
        HttpEmailDispatcher::new(
            server.uri(),
            "noreply@tickdesk.example".to_string(),
            "test-server-token".to_string(),
        )
    }

    #[tokio::test]
    async fn test_send_posts_to_provider() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email"))
            .and(header(AUTH_HEADER, "test-server-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = dispatcher_for(&server);
        dispatcher
            .send("alice@example.org", "Verification code", "123456")
            .await
            .expect("send should succeed");
    }

    #[tokio::test]
    async fn test_provider_error_is_delivery_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dispatcher = dispatcher_for(&server);
        let result = dispatcher.send("alice@example.org", "s", "b").await;

        assert!(matches!(result, Err(NotifyError::Delivery(_))));
    }

    #[tokio::test]
    async fn test_bad_endpoint_is_configuration_error() {
        let dispatcher = HttpEmailDispatcher::new(
            "not a url".to_string(),
            "noreply@tickdesk.example".to_string(),
            "token".to_string(),
        );

        let result = dispatcher.send("alice@example.org", "s", "b").await;
        assert!(matches!(result, Err(NotifyError::Configuration(_))));
    }
}
