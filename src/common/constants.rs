pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONCURRENCY_HINT: u32 = 2;

pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB
pub const DEFAULT_MAX_HEADER_SIZE: usize = 8192; // 8KB

pub const CRLF: &str = "\r\n";
pub const CRLF_BYTES: &[u8] = b"\r\n";
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

pub const SERVER_NAME: &str = concat!("switchyard/", env!("CARGO_PKG_VERSION"));
