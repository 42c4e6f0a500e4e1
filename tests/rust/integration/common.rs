use std::path::Path;
use std::sync::OnceLock;

use frameserver::client::{ClientConfig, Session};
use frameserver::config::ServerConfig;
use frameserver::frame_catalog::{DataType, FrameSchema};
use frameserver::server::{self, AppState};

pub const CLASSIFICATION_CSV: &str = "classification-compute.csv";
pub const CLASSIFICATION_ROWS: usize = 20;

pub struct SharedServer {
    pub port: u16,
    pub datasets: tempfile::TempDir,
}

impl SharedServer {
    pub fn datasets_dir(&self) -> &Path {
        self.datasets.path()
    }

    /// Write an extra source file into the server's datasets directory
    pub fn write_dataset(&self, file_name: &str, contents: &str) {
        std::fs::write(self.datasets_dir().join(file_name), contents).unwrap();
    }
}

static SHARED_SERVER: OnceLock<SharedServer> = OnceLock::new();

/// Start the shared server on first use. It runs on its own runtime so it
/// outlives the per-test runtimes of `#[tokio::test]`.
pub fn shared_server() -> &'static SharedServer {
    SHARED_SERVER.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();

        let datasets = tempfile::tempdir().unwrap();
        std::fs::write(datasets.path().join(CLASSIFICATION_CSV), classification_csv()).unwrap();

        let config = ServerConfig {
            http_host: "127.0.0.1".to_string(),
            datasets_dir: Some(datasets.path().to_path_buf()),
            max_take_rows: 5,
            ..Default::default()
        };

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                server::serve(listener, AppState::new(config)).await.unwrap();
            });
        });

        SharedServer { port, datasets }
    })
}

pub fn client_config() -> ClientConfig {
    ClientConfig::default()
        .with_host("127.0.0.1")
        .with_port(shared_server().port)
        .with_api_logging(true)
}

pub async fn connect() -> Session {
    Session::connect(client_config().with_show_details(true))
        .await
        .expect("shared server should accept connections")
}

pub fn classification_schema() -> FrameSchema {
    FrameSchema::from_pairs([
        ("a", DataType::Str),
        ("b", DataType::Int32),
        ("labels", DataType::Int32),
        ("predictions", DataType::Int32),
    ])
}

fn classification_csv() -> String {
    let mut csv = String::from("a,b,labels,predictions\n");
    for i in 0..CLASSIFICATION_ROWS {
        csv.push_str(&format!("{},{},{},{}\n", i % 3, i, i % 2, (i / 2) % 2));
    }
    csv
}
