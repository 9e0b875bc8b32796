pub mod webhook_secret;

pub use webhook_secret::WebhookSecret;
