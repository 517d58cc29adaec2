// One-shot test server bootstrap shared by the integration tests.

use std::sync::OnceLock;
use std::time::Duration;

static BASE_URL: OnceLock<String> = OnceLock::new();

/// Starts the server once on an ephemeral port and returns its base URL.
pub fn ensure_server() -> &'static str {
    BASE_URL
        .get_or_init(|| {
            let (addr_tx, addr_rx) = std::sync::mpsc::channel();
            // A dedicated OS thread keeps the server alive across the
            // per-test tokio runtimes.
            std::thread::spawn(move || {
                let runtime = tokio::runtime::Runtime::new().expect("test runtime");
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                        .await
                        .expect("bind ephemeral test port");
                    let addr = listener.local_addr().expect("local addr");
                    addr_tx.send(addr).expect("publish server addr");
                    broadside_server::run(listener).await.expect("server failed");
                });
            });

            let addr = addr_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("server did not report its address");
            wait_until_accepting(addr);
            format!("http://{addr}")
        })
        .as_str()
}

fn wait_until_accepting(addr: std::net::SocketAddr) {
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}
