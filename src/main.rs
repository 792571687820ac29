use rmcp::{ServiceExt, transport::stdio};

use bash_skill::config::Config;
use bash_skill::platform;
use bash_skill::server::BashSkillServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Load .env from the binary's directory (MCP servers may start with any CWD),
    // falling back to dotenvy's default CWD search.
    let exe_env = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
        .filter(|path| path.exists());
    match exe_env {
        Some(path) => {
            dotenvy::from_path(&path).ok();
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    tracing::info!("bash-skill starting");

    let config = Config::load()?;
    let platform = platform::resolve(config.shell);
    tracing::info!(
        platform = %platform.context.platform,
        shell = %platform.context.shell,
        shell_available = platform.shell_available,
        "platform detected"
    );

    let server = BashSkillServer::new(config, platform)?;

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {e:?}"))?;

    service.waiting().await?;

    tracing::info!("bash-skill shutting down");
    Ok(())
}
