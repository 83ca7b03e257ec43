//! Terminal client for playing against a running server.
//!
//! Lines typed on stdin are sent as protocol lines; every line the server
//! sends is printed as it arrives.

use clap::Parser;
use log::{info, warn};
use shared::{frame, Feed, LineBuffer, LineError, DEFAULT_PORT, MAX_BUF};
use tokio::io::{self, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let stream = TcpStream::connect(&args.server).await?;
    info!("Connected to {}", args.server);

    let (reader, mut writer) = stream.into_split();
    let mut printer = tokio::spawn(print_server_lines(reader));
    let mut stdin = BufReader::new(io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                match line? {
                    Some(line) => writer.write_all(frame(line.trim_end()).as_bytes()).await?,
                    None => break,
                }
            }
            _ = &mut printer => {
                println!("Server closed the connection");
                return Ok(());
            }
        }
    }

    writer.shutdown().await?;
    printer.await?;
    Ok(())
}

/// Prints each complete line the server sends until it hangs up
async fn print_server_lines(mut reader: OwnedReadHalf) {
    let mut lines = LineBuffer::new(MAX_BUF * 16);
    let mut buffer = [0u8; MAX_BUF];

    loop {
        let len = match reader.read(&mut buffer).await {
            Ok(len) => len,
            Err(e) => {
                warn!("Read failed: {}", e);
                return;
            }
        };

        match complete_lines(&mut lines, &buffer[..len]) {
            Ok(Some(complete)) => {
                for line in complete {
                    println!("{}", line);
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        }
    }
}

/// Feeds one read and collects every line it completes
///
/// Returns `None` once the server closed the connection.
fn complete_lines(
    lines: &mut LineBuffer,
    bytes: &[u8],
) -> Result<Option<Vec<String>>, LineError> {
    let mut complete = Vec::new();

    match lines.feed(bytes)? {
        Feed::ConnectionClosed => return Ok(None),
        Feed::NoCompleteLine => return Ok(Some(complete)),
        Feed::CompleteLine(line) => complete.push(line),
    }

    while let Some(line) = lines.next_line()? {
        complete.push(line);
    }
    Ok(Some(complete))
}
