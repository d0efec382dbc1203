use std::net::SocketAddr;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};

/// A running `release-redirect` process, killed on drop.
pub struct Server {
    child: Child,
    pub base_url: String,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

pub fn base_cmd(data_dir: &Path, port: u16) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_release-redirect"));
    cmd.env("DOTENV_PATH", data_dir.join("missing.env"))
        .env_remove("PORT")
        .env_remove("DB_PATH")
        .env_remove("BIND_ADDRESS")
        .env("RUST_LOG", "warn")
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg(port.to_string())
        .arg("--db-path")
        .arg(data_dir.join("redirect.sqlite"))
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

/// Starts the binary and waits until `/health` answers.
pub async fn start_server(data_dir: &Path) -> Server {
    let port = free_port();
    let child = base_cmd(data_dir, port).spawn().expect("spawn release-redirect");
    let server = Server {
        child,
        base_url: format!("http://127.0.0.1:{}", port),
    };

    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/health", server.base_url)).send().await {
            if resp.status() == StatusCode::OK {
                return server;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("release-redirect did not become healthy");
}

/// Serves a fake release feed on an ephemeral port.
pub async fn spawn_feed_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/releases",
            get(|| async {
                r#"[
                    {"tag_name":"v2","assets":[
                        {"name":"foo-win.zip","browser_download_url":"https://dl.example.com/U1"},
                        {"name":"foo-linux.tar.gz","browser_download_url":"https://dl.example.com/U2"}
                    ]},
                    {"tag_name":"v1","assets":[
                        {"name":"foo-linux.tar.gz","browser_download_url":"https://dl.example.com/U3"}
                    ]}
                ]"#
            }),
        )
        .route("/empty", get(|| async { "[]" }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind feed server");
    let addr = listener.local_addr().expect("feed addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("feed server");
    });
    addr
}
