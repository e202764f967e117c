#[cfg(test)]
mod tests {

    use std::path::Path;

    use serial_test::serial;

    use crate::config::loader::file_to_config;
    use crate::config::settings::LogFormat;

    #[tokio::test]
    #[serial]
    async fn sample_config_is_valid() {
        std::env::set_var("GIGACHAT_AUTH_KEY", "c2FtcGxlOmtleQ==");
        std::env::remove_var("GIGACHAT_SCOPE");

        let path = Path::new("gigachat.yaml");
        let config = file_to_config(path)
            .await
            .expect("gigachat.yaml must exist in repo root for tests");
        std::env::remove_var("GIGACHAT_AUTH_KEY");

        assert_eq!(config.auth.resolve_auth_key().unwrap(), "c2FtcGxlOmtleQ==");
        assert_eq!(config.auth.scope, "GIGACHAT_API_PERS");
        assert_eq!(config.api.default_model, "GigaChat");
        assert_eq!(config.logging.unwrap().format, LogFormat::Compact);
    }

    #[tokio::test]
    #[serial]
    async fn sample_config_without_credentials_is_rejected() {
        std::env::remove_var("GIGACHAT_AUTH_KEY");
        std::env::remove_var("GIGACHAT_CLIENT_ID");
        std::env::remove_var("GIGACHAT_CLIENT_SECRET");

        let err = file_to_config(Path::new("gigachat.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
