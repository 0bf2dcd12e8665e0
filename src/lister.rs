use crate::archive::Protocol;
use crate::error::ProberError;
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const HTTPS_TIMEOUT: Duration = Duration::from_secs(20);
pub const FTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a single directory-listing attempt. `NotFound` is the only
/// failure the remote has positively confirmed; everything else is
/// transient and eligible for a retry on the next cache miss.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("directory not found")]
    NotFound,

    #[error("listing timed out after {0:?}")]
    Timeout(Duration),

    #[error("listing failed: {0}")]
    Transfer(String),
}

impl ListingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListingError::NotFound)
    }
}

/// One non-recursive directory listing per call. Implementations must bound
/// the whole operation with a timeout so no caller can block indefinitely.
#[async_trait]
pub trait RemoteLister: Send + Sync {
    async fn list(&self, url: &str) -> Result<Vec<String>, ListingError>;
}

pub fn build_lister(protocol: Protocol) -> Result<Arc<dyn RemoteLister>, ProberError> {
    match protocol {
        Protocol::Https => Ok(Arc::new(HttpLister::new()?)),
        Protocol::Ftp => Ok(Arc::new(FtpLister::new())),
    }
}

/// One filename per non-empty line: the last whitespace-delimited token for
/// multi-column (`LIST`-style) lines, the whole trimmed line otherwise.
/// `.` and `..` are discarded.
pub fn parse_listing(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| line.split_whitespace().next_back())
        .filter(|name| *name != "." && *name != "..")
        .map(str::to_string)
        .collect()
}

pub struct HttpLister {
    client: reqwest::Client,
}

impl HttpLister {
    pub fn new() -> Result<Self, ProberError> {
        let client = reqwest::Client::builder().timeout(HTTPS_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteLister for HttpLister {
    async fn list(&self, url: &str) -> Result<Vec<String>, ListingError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ListingError::Timeout(HTTPS_TIMEOUT)
            } else {
                ListingError::Transfer(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            Err(ListingError::NotFound)
        } else if status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(|e| ListingError::Transfer(e.to_string()))?;
            Ok(parse_listing(&body))
        } else {
            Err(ListingError::Transfer(format!(
                "HTTP error: {} for URL: {}",
                status, url
            )))
        }
    }
}

/// Anonymous FTP listing client. Speaks just enough RFC 959 for one
/// passive-mode LIST: greeting, USER/PASS, CWD, PASV, LIST, QUIT.
pub struct FtpLister;

impl FtpLister {
    pub fn new() -> Self {
        Self
    }

    async fn list_inner(&self, url: &str) -> Result<Vec<String>, ListingError> {
        let (addr, path) = parse_ftp_url(url)?;
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| ListingError::Transfer(format!("connect {addr}: {e}")))?;
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let (code, text) = read_reply(&mut reader).await?;
        if code != 220 {
            return Err(ListingError::Transfer(format!("unexpected greeting: {text}")));
        }

        let (mut code, mut text) = command(&mut writer, &mut reader, "USER anonymous").await?;
        if code == 331 {
            (code, text) = command(&mut writer, &mut reader, "PASS anonymous@").await?;
        }
        if code != 230 {
            return Err(ListingError::Transfer(format!("anonymous login rejected: {text}")));
        }

        if !path.is_empty() {
            let (code, text) = command(&mut writer, &mut reader, &format!("CWD /{path}")).await?;
            if code == 550 {
                return Err(ListingError::NotFound);
            }
            if code != 250 {
                return Err(ListingError::Transfer(format!("CWD failed: {text}")));
            }
        }

        let (code, text) = command(&mut writer, &mut reader, "PASV").await?;
        if code != 227 {
            return Err(ListingError::Transfer(format!("PASV rejected: {text}")));
        }
        let data_addr = parse_pasv(&text)?;

        let mut data = TcpStream::connect(&data_addr)
            .await
            .map_err(|e| ListingError::Transfer(format!("data connect {data_addr}: {e}")))?;

        let (code, text) = command(&mut writer, &mut reader, "LIST").await?;
        if code != 150 && code != 125 {
            return Err(ListingError::Transfer(format!("LIST rejected: {text}")));
        }

        let mut raw = Vec::new();
        data.read_to_end(&mut raw)
            .await
            .map_err(|e| ListingError::Transfer(format!("data transfer: {e}")))?;
        drop(data);

        let (code, text) = read_reply(&mut reader).await?;
        if code != 226 && code != 250 {
            return Err(ListingError::Transfer(format!("LIST did not complete: {text}")));
        }

        let _ = command(&mut writer, &mut reader, "QUIT").await;

        Ok(parse_listing(&String::from_utf8_lossy(&raw)))
    }
}

#[async_trait]
impl RemoteLister for FtpLister {
    async fn list(&self, url: &str) -> Result<Vec<String>, ListingError> {
        debug!("LIST {}", url);
        match timeout(FTP_TIMEOUT, self.list_inner(url)).await {
            Ok(result) => result,
            Err(_) => Err(ListingError::Timeout(FTP_TIMEOUT)),
        }
    }
}

fn parse_ftp_url(url: &str) -> Result<(String, String), ListingError> {
    let rest = url
        .strip_prefix("ftp://")
        .ok_or_else(|| ListingError::Transfer(format!("not an ftp URL: {url}")))?;
    let (authority, path) = match rest.split_once('/') {
        Some((authority, path)) => (authority, path),
        None => (rest, ""),
    };
    if authority.is_empty() {
        return Err(ListingError::Transfer(format!("missing host in URL: {url}")));
    }
    let addr = if authority.contains(':') {
        authority.to_string()
    } else {
        format!("{authority}:21")
    };
    Ok((addr, path.trim_matches('/').to_string()))
}

/// Reads one FTP reply, following multi-line replies ("NNN-") to their
/// terminating "NNN " line.
async fn read_reply<R>(reader: &mut R) -> Result<(u16, String), ListingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut first = String::new();
    if reader
        .read_line(&mut first)
        .await
        .map_err(|e| ListingError::Transfer(e.to_string()))?
        == 0
    {
        return Err(ListingError::Transfer("control connection closed".to_string()));
    }
    let code: u16 = first
        .get(..3)
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| ListingError::Transfer(format!("malformed FTP reply: {}", first.trim())))?;

    let mut text = first.clone();
    if first.as_bytes().get(3) == Some(&b'-') {
        loop {
            let mut line = String::new();
            if reader
                .read_line(&mut line)
                .await
                .map_err(|e| ListingError::Transfer(e.to_string()))?
                == 0
            {
                return Err(ListingError::Transfer(
                    "control connection closed mid-reply".to_string(),
                ));
            }
            let done = line.starts_with(&first[..3]) && line.as_bytes().get(3) == Some(&b' ');
            text.push_str(&line);
            if done {
                break;
            }
        }
    }
    Ok((code, text.trim().to_string()))
}

async fn command<W, R>(writer: &mut W, reader: &mut R, cmd: &str) -> Result<(u16, String), ListingError>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    writer
        .write_all(format!("{cmd}\r\n").as_bytes())
        .await
        .map_err(|e| ListingError::Transfer(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| ListingError::Transfer(e.to_string()))?;
    read_reply(reader).await
}

/// Extracts the data-channel address from a 227 reply:
/// `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
fn parse_pasv(text: &str) -> Result<String, ListingError> {
    let malformed = || ListingError::Transfer(format!("malformed PASV reply: {text}"));
    let start = text.find('(').ok_or_else(malformed)?;
    let end = text[start..].find(')').ok_or_else(malformed)? + start;
    let fields: Vec<u16> = text[start + 1..end]
        .split(',')
        .map(|field| field.trim().parse().ok())
        .collect::<Option<_>>()
        .ok_or_else(malformed)?;
    if fields.len() != 6 || fields.iter().any(|f| *f > 255) {
        return Err(malformed());
    }
    Ok(format!(
        "{}.{}.{}.{}:{}",
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        fields[4] * 256 + fields[5]
    ))
}
