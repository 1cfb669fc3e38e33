//! Server Tests
//!
//! Drive the listener over raw sockets to check:
//! - Framing on the wire
//! - Pipelined requests on one connection
//! - Connection lifecycle (disconnects, partial lines)
//! - The admission limit
//! - Behavior once the storage engine has stopped

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use rendezkv::config::Config;
use rendezkv::engine::{Engine, EngineGuard};
use rendezkv::network::Server;
use rendezkv::KvError;

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server(max_connections: usize) -> (SocketAddr, EngineGuard) {
    let config = Config::builder()
        .address("127.0.0.1:0")
        .max_connections(max_connections)
        .build();

    let (engine, guard) = Engine::start(&config).unwrap();
    let server = Server::bind(&config, engine).unwrap();
    let addr = server.local_addr().unwrap();

    thread::spawn(move || server.run());

    (addr, guard)
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream
}

fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).unwrap();

    let mut payload = vec![0u8; u32::from_le_bytes(header) as usize];
    stream.read_exact(&mut payload).unwrap();
    payload
}

fn request(stream: &mut TcpStream, line: &str) -> String {
    stream.write_all(line.as_bytes()).unwrap();
    String::from_utf8(read_frame(stream)).unwrap()
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_response_frame_on_the_wire() {
    let (addr, _guard) = start_server(0);
    let mut stream = connect(addr);

    stream.write_all(b"set a 1\n").unwrap();

    let mut raw = [0u8; 6];
    stream.read_exact(&mut raw).unwrap();
    assert_eq!(raw, [2, 0, 0, 0, b'o', b'k']);
}

#[test]
fn test_pipelined_requests() {
    let (addr, _guard) = start_server(0);
    let mut stream = connect(addr);

    stream
        .write_all(b"set a 1\nget a\ndel a\nget a\nfrobnicate x\n")
        .unwrap();

    assert_eq!(read_frame(&mut stream), b"ok");
    assert_eq!(read_frame(&mut stream), b"found: 1");
    assert_eq!(read_frame(&mut stream), b"ok");
    assert_eq!(read_frame(&mut stream), b"not found");
    assert_eq!(read_frame(&mut stream), b"unknown command 'frobnicate'");
}

#[test]
fn test_crlf_line_endings() {
    let (addr, _guard) = start_server(0);
    let mut stream = connect(addr);

    assert_eq!(request(&mut stream, "set k v\r\n"), "ok");
    assert_eq!(request(&mut stream, "get k\r\n"), "found: v");
}

#[test]
fn test_large_value() {
    let (addr, _guard) = start_server(0);
    let mut stream = connect(addr);

    let value = "x".repeat(256 * 1024);
    assert_eq!(request(&mut stream, &format!("set big {}\n", value)), "ok");
    assert_eq!(
        request(&mut stream, "get big\n"),
        format!("found: {}", value)
    );
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[test]
fn test_partial_line_is_discarded_on_disconnect() {
    let (addr, _guard) = start_server(0);

    {
        let mut stream = connect(addr);
        stream.write_all(b"set partial value").unwrap();
        // Dropped without a newline
    }

    let mut stream = connect(addr);
    assert_eq!(request(&mut stream, "get partial\n"), "not found");
    assert_eq!(request(&mut stream, "set complete value\n"), "ok");
    assert_eq!(request(&mut stream, "get complete\n"), "found: value");
}

#[test]
fn test_disconnect_does_not_affect_others() {
    let (addr, _guard) = start_server(0);

    let mut survivor = connect(addr);
    assert_eq!(request(&mut survivor, "set k v\n"), "ok");

    for _ in 0..10 {
        let mut stream = connect(addr);
        assert_eq!(request(&mut stream, "get k\n"), "found: v");
    }

    assert_eq!(request(&mut survivor, "get k\n"), "found: v");
}

#[test]
fn test_invalid_utf8_closes_only_that_connection() {
    let (addr, _guard) = start_server(0);

    let mut bad = connect(addr);
    bad.write_all(&[0xff, 0xfe, b'\n']).unwrap();
    let mut buf = [0u8; 4];
    // The server hangs up instead of answering
    assert!(matches!(bad.read(&mut buf), Ok(0) | Err(_)));

    let mut good = connect(addr);
    assert_eq!(request(&mut good, "set a 1\n"), "ok");
}

// =============================================================================
// Admission Limit Tests
// =============================================================================

#[test]
fn test_connection_limit_queues_extra_clients() {
    let (addr, _guard) = start_server(1);

    let mut first = connect(addr);
    assert_eq!(request(&mut first, "set a 1\n"), "ok");

    // Accepted by the kernel backlog but not served while the slot is held
    let mut second = connect(addr);
    second
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    second.write_all(b"get a\n").unwrap();
    let mut header = [0u8; 4];
    assert!(second.read_exact(&mut header).is_err());

    drop(first);

    second.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    assert_eq!(String::from_utf8(read_frame(&mut second)).unwrap(), "found: 1");
}

// =============================================================================
// Engine Shutdown Tests
// =============================================================================

#[test]
fn test_handler_closes_connection_after_engine_stops() {
    let (addr, guard) = start_server(0);

    let mut stream = connect(addr);
    assert_eq!(request(&mut stream, "set a 1\n"), "ok");

    guard.shutdown().unwrap();

    // Parse errors never reach the engine and are still answered
    assert_eq!(
        request(&mut stream, "set onlykey\n"),
        "parse error: missing value for key 'onlykey'"
    );

    // Anything that needs the engine ends the connection instead of hanging
    stream.write_all(b"get a\n").unwrap();
    let mut buf = [0u8; 4];
    assert!(matches!(stream.read(&mut buf), Ok(0) | Err(_)));
}

#[test]
fn test_bind_failure_is_reported() {
    let config = Config::builder().address("127.0.0.1:0").build();
    let (engine, _guard) = Engine::start(&config).unwrap();
    let first = Server::bind(&config, engine.clone()).unwrap();

    let taken = Config::builder()
        .address(first.local_addr().unwrap().to_string())
        .build();

    match Server::bind(&taken, engine) {
        Err(KvError::Bind { addr, .. }) => assert_eq!(addr, taken.address),
        Err(e) => panic!("Expected bind error, got {}", e),
        Ok(_) => panic!("Expected bind error"),
    }
}
