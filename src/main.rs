use std::sync::Arc;

use tenderdesk_backend::provider::Http;
use tenderdesk_backend::{config, router, Global};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let provider = Http::new(&config::INSTANCE.service);
    let app = router(Global::new(Arc::new(provider)));

    // socket in 127.0.0.1:8080
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 8080));

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
