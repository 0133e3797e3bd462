use checkout_service::config::{Config, RazorpayConfig, ServerConfig};
use checkout_service::Application;
use hmac::{Hmac, Mac};
use secrecy::Secret;
use sha2::Sha256;
use wiremock::MockServer;

pub const TEST_KEY_ID: &str = "rzp_test_key";
pub const TEST_KEY_SECRET: &str = "rzp_test_secret";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub razorpay_server: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let razorpay_server = MockServer::start().await;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            razorpay: RazorpayConfig {
                key_id: TEST_KEY_ID.to_string(),
                key_secret: Secret::new(TEST_KEY_SECRET.to_string()),
                api_base_url: razorpay_server.uri(),
            },
            service_name: "checkout-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            razorpay_server,
        }
    }

    /// Signature Razorpay would produce for this order/payment pair.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(TEST_KEY_SECRET.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
