#![allow(non_snake_case)]

use super::*;

#[test]
fn Listener___bind_port_zero___reports_actual_port() {
    let addr: Address = "127.0.0.1:0".parse().unwrap();

    let listener = Listener::bind(&addr).unwrap();

    match listener.local_addr().unwrap() {
        Address::Tcp(bound) => assert_ne!(bound.port(), 0),
        other => panic!("unexpected address {other}"),
    }
}

#[test]
fn Listener___accept_without_peer___would_block() {
    let listener = Listener::bind(&"127.0.0.1:0".parse().unwrap()).unwrap();

    let err = listener.accept().unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
}

#[test]
fn BlockingStream___connect_to_listener___exchanges_bytes() {
    let listener = Listener::bind(&"127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut client = BlockingStream::connect(&addr).unwrap();
    client.write_all(b"ping\n").unwrap();

    let mut accepted = None;
    for _ in 0..200 {
        match listener.accept() {
            Ok((stream, _)) => {
                accepted = Some(stream);
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    }
    let mut server_side = accepted.expect("connection accepted");

    let mut buf = [0u8; 16];
    let mut got = Vec::new();
    for _ in 0..200 {
        match server_side.read(&mut buf) {
            Ok(n) => {
                got.extend_from_slice(&buf[..n]);
                if got.ends_with(b"\n") {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(e) => panic!("read failed: {e}"),
        }
    }
    assert_eq!(got, b"ping\n");
}

#[cfg(unix)]
#[test]
fn Listener___bind_unix___reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jrpc.sock");
    let addr = Address::Unix(path.clone());

    let listener = Listener::bind(&addr).unwrap();

    assert_eq!(listener.local_addr().unwrap(), Address::Unix(path));
}

#[cfg(unix)]
#[test]
fn Listener___drop_unix___removes_socket_file_and_allows_rebind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jrpc.sock");
    let addr = Address::Unix(path.clone());

    let listener = Listener::bind(&addr).unwrap();
    assert!(path.exists());
    drop(listener);

    assert!(!path.exists());
    let rebound = Listener::bind(&addr).unwrap();
    assert_eq!(rebound.local_addr().unwrap(), addr);
}

#[test]
fn BlockingStream___connect_refused___is_error() {
    let listener = Listener::bind(&"127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(BlockingStream::connect(&addr).is_err());
}
