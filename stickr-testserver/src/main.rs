use std::net::SocketAddr;

use tokio::net::TcpListener;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut bind_addr: SocketAddr = "127.0.0.1:0".parse()?;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bind" => {
                let addr = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--bind requires an address, e.g. 127.0.0.1:8080")
                })?;
                bind_addr = addr.parse()?;
            }
            "-h" | "--help" => {
                eprintln!(
                    "stickr-testserver\n\nUSAGE:\n  stickr-testserver [--bind 127.0.0.1:0]\n\nROUTES:\n  {}  {}  {}  {}  {}\n\nOUTPUT:\n  Prints HTTP_URL=<url> to stdout once ready.",
                    stickr_testserver::PATH_HELLO,
                    stickr_testserver::PATH_STICKY,
                    stickr_testserver::PATH_UNSTICKY,
                    stickr_testserver::PATH_STATUS,
                    stickr_testserver::PATH_SLOW,
                );
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("unknown argument: {other}"));
            }
        }
    }

    let listener = TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    let stats = stickr_testserver::TestServerStats::default();
    let app = stickr_testserver::router(stats.clone());
    let listener = stats.listener(listener);

    println!("HTTP_URL=http://{addr}");

    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
    });

    serve.await?;

    eprintln!(
        "served {} requests over {} connections ({} with a session, {} sessions issued)",
        stats.requests_total(),
        stats.connections_accepted(),
        stats.requests_with_session(),
        stats.sessions_issued()
    );
    Ok(())
}
