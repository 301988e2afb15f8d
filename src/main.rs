use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use questline::{
    db::Db, google::GoogleTokenInfo, models::Curriculum, services::auth::AuthService,
    services::tokens::TokenIssuer, AppState,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL, e.g. `sqlite://questline.db`.
    #[clap(env)]
    database_url: String,

    /// Secret used to sign access and refresh tokens.
    #[clap(env)]
    jwt_secret: String,

    /// OAuth client id that Google ID tokens must be issued for.
    #[clap(env)]
    google_client_id: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,

    /// Curriculum JSON file to import before serving.
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,sqlx=warn,questline=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;

    if let Some(path) = args.seed {
        let raw = tokio::fs::read_to_string(&path)
            .await
            .wrap_err_with(|| format!("could not read {}", path.display()))?;
        let curriculum: Curriculum =
            serde_json::from_str(&raw).wrap_err("curriculum file is not valid JSON")?;
        db.load_curriculum(curriculum).await?;
    }

    let auth = AuthService::new(
        db.clone(),
        GoogleTokenInfo::new(args.google_client_id),
        TokenIssuer::new(&args.jwt_secret),
    );
    let app = questline::router(AppState { db, auth });

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on {address}");
    axum::serve(listener, app).await?;

    Ok(())
}
