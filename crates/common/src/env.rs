//! Environment/runtime helpers
//!
//! Sanity checks run once at startup before the router is built.

use tracing::warn;

/// Warn when the front-end bundle is missing; the API still serves without it.
pub async fn ensure_env(frontend_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(frontend_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{frontend_dir} exists but is not a directory")),
        Err(_) => {
            warn!(%frontend_dir, "frontend assets directory not found; static assets will 404");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_frontend_is_only_a_warning() {
        assert!(ensure_env("/definitely/not/here").await.is_ok());
    }

    #[tokio::test]
    async fn frontend_path_must_be_a_directory() {
        let file = std::env::temp_dir().join(format!("sleep-tracker-env-{}", std::process::id()));
        tokio::fs::write(&file, b"x").await.unwrap();
        let res = ensure_env(file.to_str().unwrap()).await;
        let _ = tokio::fs::remove_file(&file).await;
        assert!(res.is_err());
    }
}
