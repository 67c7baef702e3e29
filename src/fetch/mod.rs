pub mod history;
pub mod realtime;

pub use history::{DailyBar, DateRange, HistoricalSeriesFetcher};
pub use realtime::{split_code_list, QuoteRow, RealtimeQuoteFetcher};

#[cfg(test)]
pub(crate) mod testing {
    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Bind a local listener that answers `requests` canned HTTP exchanges,
    /// letting fetcher tests exercise the transport path without a live
    /// upstream. `respond` maps the raw request text to a status and body.
    pub async fn spawn_stub_feed<F>(requests: usize, respond: F) -> SocketAddr
    where
        F: Fn(&str) -> (u16, String) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for _ in 0..requests {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buffer = vec![0u8; 4096];
                let read = socket.read(&mut buffer).await.unwrap();
                let request = String::from_utf8_lossy(&buffer[..read]).to_string();

                let (status, body) = respond(&request);
                let reason = if status < 400 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
            }
        });

        addr
    }
}
