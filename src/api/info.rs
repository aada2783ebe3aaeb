//! Plain-text service description served at `/` and `/mailer`

const ROUTES: &[(&str, &str)] = &[
    ("POST /contact", "send a contact message (API key required)"),
    ("POST /mailer/send", "same as /contact"),
    ("GET  /health", "service health"),
    ("GET  /ready", "readiness including storage backends"),
    ("POST /admin/api-keys", "issue an API key (admin token)"),
    ("GET  /admin/api-keys/owner/{owner_id}", "list an owner's keys"),
    ("DELETE /admin/api-keys/{id}", "revoke a key"),
    ("GET  /admin/abuse/{identity}", "failure and blacklist status"),
    ("POST /admin/blacklist", "blacklist a client"),
    ("DELETE /admin/blacklist/{identity}", "lift a blacklist entry"),
];

pub async fn service_info() -> String {
    let mut text = format!(
        "{} {}\n\nRoutes:\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    for (route, description) in ROUTES {
        text.push_str(&format!("  {:<40} {}\n", route, description));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_info_lists_routes() {
        let text = service_info().await;

        assert!(text.starts_with("contact-mailer "));
        assert!(text.contains("POST /contact"));
        assert!(text.contains("/admin/blacklist"));
    }
}
