//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Orquesta lectura → parse → router → build → escritura para una sola
//! conexión.
//!
//! La lectura no depende de un único `read` de tamaño fijo: se lee hasta
//! encontrar `\r\n\r\n` y después exactamente `Content-Length` bytes más,
//! siempre acotado por `max_request_bytes`.

use crate::config::Config;
use crate::http::request::{find_subslice, HEAD_TERMINATOR};
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const READ_CHUNK_SIZE: usize = 1024;

/// Errores al leer un request del socket
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("socket read failed: {0}")]
    Io(#[from] io::Error),

    /// El request supera el límite configurado
    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
}

/// Errores que terminan una conexión (nunca el proceso)
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to configure socket: {0}")]
    Socket(#[source] io::Error),

    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

/// Parámetros por conexión, copiados desde `Config`
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub max_request_bytes: usize,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl From<&Config> for ConnectionSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_request_bytes: config.max_request_bytes,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

/// Atiende una conexión TCP completa y la cierra al terminar
pub fn handle_connection(
    mut stream: TcpStream,
    router: &Router,
    settings: ConnectionSettings,
) -> Result<(), ConnectionError> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    stream
        .set_read_timeout(Some(settings.read_timeout))
        .map_err(ConnectionError::Socket)?;
    stream
        .set_write_timeout(Some(settings.write_timeout))
        .map_err(ConnectionError::Socket)?;

    let start = Instant::now();
    let status = serve(&mut stream, router, settings.max_request_bytes)?;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match status {
        Some(status) if status.is_success() => {
            info!(peer = %peer, status = status.as_u16(), elapsed_ms, "response sent");
        }
        Some(status) => {
            warn!(peer = %peer, status = status.as_u16(), elapsed_ms, "response sent");
        }
        None => debug!(peer = %peer, "connection closed without data"),
    }

    Ok(())
}

/// Lee un request de `stream`, lo despacha y escribe la respuesta
///
/// Retorna el status enviado, o `None` si el peer cerró sin mandar nada.
pub fn serve<S: Read + Write>(
    stream: &mut S,
    router: &Router,
    max_request_bytes: usize,
) -> Result<Option<StatusCode>, ConnectionError> {
    let response = match read_request(stream, max_request_bytes) {
        Ok(raw) if raw.is_empty() => return Ok(None),
        Ok(raw) => respond(&raw, router),
        Err(ReadError::Io(e)) => return Err(ConnectionError::Read(e)),
        Err(e @ ReadError::TooLarge { .. }) => {
            warn!(error = %e, "rejecting request");
            Response::error(StatusCode::PayloadTooLarge, &e.to_string())
        }
        Err(e @ ReadError::InvalidContentLength(_)) => {
            warn!(error = %e, "rejecting request");
            Response::error(StatusCode::BadRequest, &e.to_string())
        }
    };

    stream
        .write_all(&response.to_bytes())
        .and_then(|()| stream.flush())
        .map_err(ConnectionError::Write)?;

    Ok(Some(response.status()))
}

/// Parsea y enruta un request ya leído
fn respond(raw: &[u8], router: &Router) -> Response {
    debug!(bytes = raw.len(), raw = %String::from_utf8_lossy(raw), "request received");

    match Request::parse(raw) {
        Ok(request) => {
            info!(method = %request.method(), target = request.target(), "request");
            router.route(&request)
        }
        Err(e) => {
            warn!(error = %e, "parse error");
            Response::error(StatusCode::BadRequest, &e.to_string())
        }
    }
}

/// Lee cabecera + body de `reader`
///
/// - Sin terminador antes del EOF: se retorna lo leído y decide el parser.
/// - Con terminador y `Content-Length`: se completa el body hasta ese
///   largo; lo que sobre se descarta.
/// - Con terminador sin `Content-Length`: el body es lo que ya llegó junto
///   con la cabecera, sin lecturas extra.
pub fn read_request<R: Read>(reader: &mut R, max_bytes: usize) -> Result<Vec<u8>, ReadError> {
    let mut buffer = Vec::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut scanned = 0;

    let head_end = loop {
        if let Some(pos) = find_subslice(&buffer[scanned..], HEAD_TERMINATOR) {
            break scanned + pos + HEAD_TERMINATOR.len();
        }
        // El terminador puede quedar partido entre dos lecturas
        scanned = buffer.len().saturating_sub(HEAD_TERMINATOR.len() - 1);

        let n = read_some(reader, &mut chunk)?;
        if n == 0 {
            return Ok(buffer);
        }
        if buffer.len() + n > max_bytes {
            return Err(ReadError::TooLarge { limit: max_bytes });
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let Some(content_length) = content_length(&buffer[..head_end])? else {
        return Ok(buffer);
    };
    let total = head_end
        .checked_add(content_length)
        .filter(|total| *total <= max_bytes)
        .ok_or(ReadError::TooLarge { limit: max_bytes })?;

    while buffer.len() < total {
        let n = read_some(reader, &mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    buffer.truncate(total);

    Ok(buffer)
}

fn read_some<R: Read>(reader: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(chunk) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Busca `Content-Length` en la cabecera cruda
///
/// Mismas reglas que `Request::header`: nombre exacto, separador `": "`
/// y, si se repite, gana el último.
fn content_length(head: &[u8]) -> Result<Option<usize>, ReadError> {
    let head = String::from_utf8_lossy(head);

    let value = head
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(": "))
        .filter(|(name, _)| *name == "Content-Length")
        .map(|(_, value)| value)
        .last();

    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ReadError::InvalidContentLength(value.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileStore;
    use std::io::Cursor;

    /// Lector que entrega los datos en pedazos de tamaño fijo
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Stream en memoria: lee de `input`, escribe en `output`
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn router() -> Router {
        Router::with_default_routes(FileStore::default())
    }

    #[test]
    fn test_read_head_only() {
        let raw = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        let read = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap();
        assert_eq!(read, raw);
    }

    #[test]
    fn test_read_body_by_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloEXTRA";
        let read = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap();
        assert!(read.ends_with(b"\r\n\r\nhello"));
    }

    #[test]
    fn test_read_body_without_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nHost: x\r\n\r\nhello";
        let read = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap();
        assert_eq!(read, raw);

        let request = Request::parse(&read).unwrap();
        assert_eq!(request.body(), b"hello");
    }

    #[test]
    fn test_content_length_last_wins() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 4\r\n\r\nabcdef";
        let read = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap();
        assert!(read.ends_with(b"\r\n\r\nabcd"));
    }

    #[test]
    fn test_content_length_name_is_case_sensitive() {
        let raw = b"POST /files/a HTTP/1.1\r\ncontent-length: abc\r\n\r\nxyz";
        let read = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap();
        assert!(read.ends_with(b"\r\n\r\nxyz"));
    }

    #[test]
    fn test_read_across_many_chunks() {
        let body = vec![b'x'; 5000];
        let mut raw = format!("POST /files/big HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len())
            .into_bytes();
        raw.extend_from_slice(&body);

        let mut reader = Trickle { data: &raw, step: 7 };
        let read = read_request(&mut reader, 1 << 20).unwrap();
        assert_eq!(read, raw);
    }

    #[test]
    fn test_terminator_split_between_reads() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let mut reader = Trickle { data: raw, step: 1 };
        let read = read_request(&mut reader, 1024).unwrap();
        assert_eq!(read, raw);
    }

    #[test]
    fn test_read_eof_before_terminator() {
        let raw = b"GET / HTTP/1.1\r\nHost";
        let read = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap();
        assert_eq!(read, raw);
    }

    #[test]
    fn test_read_too_large_head() {
        let raw = vec![b'a'; 4096];
        let err = read_request(&mut Cursor::new(raw), 1024).unwrap_err();
        assert!(matches!(err, ReadError::TooLarge { limit: 1024 }));
    }

    #[test]
    fn test_read_too_large_body() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 999999\r\n\r\nabc";
        let err = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap_err();
        assert!(matches!(err, ReadError::TooLarge { .. }));
    }

    #[test]
    fn test_read_invalid_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: abc\r\n\r\n";
        let err = read_request(&mut Cursor::new(raw.to_vec()), 1024).unwrap_err();
        assert!(matches!(err, ReadError::InvalidContentLength(v) if v == "abc"));
    }

    #[test]
    fn test_serve_echo() {
        let mut stream = MockStream::new(b"GET /echo/abc HTTP/1.1\r\n\r\n");
        let status = serve(&mut stream, &router(), 1024).unwrap();

        assert_eq!(status, Some(StatusCode::Ok));
        let text = String::from_utf8(stream.output).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nabc"));
    }

    #[test]
    fn test_serve_empty_connection() {
        let mut stream = MockStream::new(b"");
        assert_eq!(serve(&mut stream, &router(), 1024).unwrap(), None);
        assert!(stream.output.is_empty());
    }

    #[test]
    fn test_serve_malformed_request() {
        let mut stream = MockStream::new(b"GARBAGE\r\n\r\n");
        let status = serve(&mut stream, &router(), 1024).unwrap();

        assert_eq!(status, Some(StatusCode::BadRequest));
        let text = String::from_utf8(stream.output).unwrap();
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Malformed request line"));
    }

    #[test]
    fn test_serve_too_large() {
        let mut stream = MockStream::new(&[b'a'; 2048]);
        let status = serve(&mut stream, &router(), 1024).unwrap();
        assert_eq!(status, Some(StatusCode::PayloadTooLarge));
    }

    #[test]
    fn test_serve_write_error() {
        struct BrokenPipe(Cursor<Vec<u8>>);

        impl Read for BrokenPipe {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                self.0.read(buf)
            }
        }

        impl Write for BrokenPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut stream = BrokenPipe(Cursor::new(b"GET / HTTP/1.1\r\n\r\n".to_vec()));
        let err = serve(&mut stream, &router(), 1024).unwrap_err();
        assert!(matches!(err, ConnectionError::Write(_)));
    }
}
