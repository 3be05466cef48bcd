//! Scripted IRC server.
//!
//! Accepts connections, optionally greets with a numeric reply, records
//! every line received, and closes the stream once the client QUITs so the
//! client's quit drain observes EOF.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use notifirc::{ChannelDestination, ServerTarget};

/// Behavior knobs for a spawned server.
#[derive(Debug, Clone)]
pub struct FakeServerOptions {
    /// Send a `001` numeric as soon as a client connects.
    pub greet: bool,
    /// Send `PING <arg>` right after the greeting.
    pub ping_on_connect: Option<String>,
    /// Reset the connection after reading this many lines, so subsequent
    /// client writes fail.
    pub close_after_lines: Option<usize>,
}

impl Default for FakeServerOptions {
    fn default() -> Self {
        Self {
            greet: true,
            ping_on_connect: None,
            close_after_lines: None,
        }
    }
}

/// A fake IRC server instance.
pub struct FakeServer {
    addr: SocketAddr,
    connections: Arc<Mutex<Vec<Vec<String>>>>,
    accept_task: JoinHandle<()>,
}

impl FakeServer {
    /// Spawn a server that greets clients with a numeric reply.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(FakeServerOptions::default()).await
    }

    /// Spawn a server with custom behavior.
    pub async fn spawn_with(opts: FakeServerOptions) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let connections: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&connections);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let index = {
                    let mut conns = recorded.lock().await;
                    conns.push(Vec::new());
                    conns.len() - 1
                };
                let recorded = Arc::clone(&recorded);
                let opts = opts.clone();
                tokio::spawn(async move {
                    let _ = serve_one(stream, recorded, index, opts).await;
                });
            }
        });

        Ok(Self {
            addr,
            connections,
            accept_task,
        })
    }

    /// Snapshot of all lines received, one vector per accepted connection,
    /// in acceptance order.
    pub async fn connections(&self) -> Vec<Vec<String>> {
        self.connections.lock().await.clone()
    }

    /// A plaintext target pointing at this server.
    pub fn target(&self) -> ServerTarget {
        ServerTarget {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            secure: false,
            password: None,
        }
    }

    /// A destination for one channel on this server.
    pub fn dest(&self, channel: &str) -> ChannelDestination {
        ChannelDestination {
            target: self.target(),
            channel: channel.into(),
            key: None,
        }
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve_one(
    stream: TcpStream,
    recorded: Arc<Mutex<Vec<Vec<String>>>>,
    index: usize,
    opts: FakeServerOptions,
) -> anyhow::Result<()> {
    // Linger 0 turns the eventual close into an RST, so the client's
    // next write errors instead of draining into a dead socket.
    if opts.close_after_lines.is_some() {
        stream.set_linger(Some(std::time::Duration::ZERO))?;
    }

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    if opts.greet {
        write_half
            .write_all(b":fake.test 001 bot :Welcome to FakeNet\r\n")
            .await?;
    }
    if let Some(arg) = &opts.ping_on_connect {
        write_half
            .write_all(format!("PING {arg}\r\n").as_bytes())
            .await?;
    }

    let mut seen = 0usize;
    while let Some(line) = lines.next_line().await? {
        let done = line == "QUIT";
        recorded.lock().await[index].push(line);
        seen += 1;
        if done || opts.close_after_lines.is_some_and(|n| seen >= n) {
            break;
        }
    }
    // Dropping both halves closes the socket; the client's quit drain
    // observes EOF and finishes.
    Ok(())
}
