#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use clap::Parser;
use http::{Method, Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;

use wayrouter::config::RouterConfig;
use wayrouter::params::Params;
use wayrouter::service::{Handler, HandlerRouter, HttpRouter};
use wayrouter::Router;

#[derive(Parser)]
#[command(name = "wayrouter", about = "Demo server for the wayrouter HTTP request router")]
struct Cli {
    /// Path to a router config file (TOML or JSON).
    #[arg(short, long, default_value = "wayrouter.toml")]
    config: PathBuf,

    /// Overrides the config file's listen address when set.
    #[arg(short, long)]
    listen: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = RouterConfig::load(&cli.config)?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    let router = build_demo_router(&config);
    let service = HttpRouter::new(router);

    let listener = TcpListener::bind(&config.listen).await?;
    tracing::info!(addr = %config.listen, "wayrouter demo server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let service = service.clone();

        tokio::spawn(async move {
            if let Err(err) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(io, service)
                .await
            {
                tracing::warn!(%peer, error = %err, "connection error");
            }
        });
    }
}

fn build_demo_router(config: &RouterConfig) -> HandlerRouter {
    let mut router: HandlerRouter = Router::new();
    router.redirect_trailing_slash = config.redirect_trailing_slash;
    router.redirect_fixed_path = config.redirect_fixed_path;
    router.handle_options = config.handle_options;
    router.handle_method_not_allowed = config.handle_method_not_allowed;

    router.get("/", text_handler("wayrouter demo\n"));
    router.get("/users/:id", echo_param_handler("id"));
    router.handle(Method::POST, "/users/:id", echo_param_handler("id"));

    router
}

fn text_handler(body: &'static str) -> Arc<dyn Handler> {
    Arc::new(move |_req: Request<Incoming>, _params: Params| async move {
        Response::new(Full::new(Bytes::from_static(body.as_bytes())))
    })
}

fn echo_param_handler(name: &'static str) -> Arc<dyn Handler> {
    Arc::new(move |_req: Request<Incoming>, params: Params| {
        let value = params.get(name).unwrap_or("").to_string();
        async move { Response::new(Full::new(Bytes::from(value))) }
    })
}
