use std::io::BufRead;

use shield_server::auth::hash_password;
use shield_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `shield-server hash-password` reads a password from stdin and prints
    // its Argon2 hash for ADMIN_PASSWORD_HASH
    if std::env::args().nth(1).as_deref() == Some("hash-password") {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        let password = line.trim_end_matches(['\r', '\n']);
        if password.is_empty() {
            anyhow::bail!("no password given on stdin");
        }
        let hash = hash_password(password).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
        println!("{hash}");
        return Ok(());
    }

    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;
    init_logger_with_file(
        Some(config.log_level.as_str()),
        config.log_json,
        config.log_dir.as_deref(),
    );

    tracing::info!("Shield server starting (env: {})", config.environment);

    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
