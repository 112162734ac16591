#![allow(non_snake_case)]

use super::*;
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// Peer that follows a script instead of evaluating requests
fn fake_server<F>(script: F) -> (Address, JoinHandle<()>)
where
    F: FnOnce(&mut BufReader<TcpStream>, &mut TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = Address::Tcp(listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        script(&mut reader, &mut writer);
    });
    (address, handle)
}

fn read_request(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line
}

fn config() -> ClientConfig {
    ClientConfig::new().with_read_timeout_ms(5_000)
}

#[test]
fn Client___sequential_calls___use_ids_zero_then_one() {
    let (address, server) = fake_server(|reader, writer| {
        for expected in 0..2 {
            let request = read_request(reader);
            assert!(request.contains(&format!("\"id\":{expected}")), "{request}");
            writeln!(writer, "{{\"result\":{expected},\"id\":{expected}}}").unwrap();
        }
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let first = client.call(&mut doc, "ping", None).unwrap();
    let second = client.call(&mut doc, "ping", None).unwrap();

    assert_eq!(doc.as_i32(first), Some(0));
    assert_eq!(doc.as_i32(second), Some(1));
    assert_eq!(client.next_id(), 2);
    server.join().unwrap();
}

#[test]
fn Client___request___carries_method_params_and_id() {
    let (address, server) = fake_server(|reader, writer| {
        let request = read_request(reader);
        assert_eq!(
            request,
            "{\"method\":\"add\",\"params\":{\"A\":3,\"B\":10},\"id\":0}\n"
        );
        writeln!(writer, "{{\"result\":13,\"id\":0}}").unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();
    let params = doc.parse_str(r#"{"A":3,"B":10}"#).unwrap();

    let result = client.call(&mut doc, "add", Some(params)).unwrap();

    assert_eq!(doc.as_i32(result), Some(13));
    doc.delete(result);
    assert_eq!(doc.live_nodes(), 0);
    server.join().unwrap();
}

#[test]
fn Client___mismatched_id___fatal_protocol_error() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(writer, "{{\"result\":1,\"id\":41}}").unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::Protocol(_)), "{err:?}");
    assert!(client.is_broken());
    assert_eq!(client.next_id(), 0);
    assert!(matches!(
        client.call(&mut doc, "ping", None),
        Err(RpcError::ConnectionClosed)
    ));
    assert_eq!(doc.live_nodes(), 0);
    server.join().unwrap();
}

#[test]
fn Client___string_id___compared_as_integer() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(writer, "{{\"result\":\"ok\",\"id\":\"0\"}}").unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let result = client.call(&mut doc, "ping", None).unwrap();

    assert_eq!(doc.as_str(result), Some("ok"));
    server.join().unwrap();
}

#[test]
fn Client___error_envelope___remote_error_and_id_advances() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(
            writer,
            "{{\"error\":{{\"code\":-32601,\"message\":\"Method not found.\"}},\"id\":0}}"
        )
        .unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "bar", None).unwrap_err();

    match err {
        RpcError::Remote { code, message } => {
            assert_eq!(code, -32601);
            assert_eq!(message, "Method not found.");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!client.is_broken());
    assert_eq!(client.next_id(), 1);
    server.join().unwrap();
}

#[test]
fn Client___error_with_null_id___remote_error() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(
            writer,
            "{{\"error\":{{\"code\":-32600,\"message\":\"The JSON sent is not a valid Request object.\"}},\"id\":null}}"
        )
        .unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::Remote { code: -32600, .. }), "{err:?}");
    server.join().unwrap();
}

#[test]
fn Client___missing_result___protocol_error() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(writer, "{{\"id\":0}}").unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::Protocol(_)), "{err:?}");
    assert_eq!(doc.live_nodes(), 0);
    server.join().unwrap();
}

#[test]
fn Client___non_object_response___protocol_error() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(writer, "[0]").unwrap();
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::Protocol(_)), "{err:?}");
    server.join().unwrap();
}

#[test]
fn Client___corrupt_response___parse_error_and_notifies_peer() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writeln!(writer, "{{\"result\":]").unwrap();
        let notice = read_request(reader);
        assert!(notice.contains("-32700"), "{notice}");
        assert!(notice.contains("\"id\":null"), "{notice}");
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::Parse { .. }), "{err:?}");
    assert!(client.is_broken());
    server.join().unwrap();
}

#[test]
fn Client___server_hangs_up___connection_closed() {
    let (address, server) = fake_server(|_reader, _writer| {});
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();
    server.join().unwrap();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::ConnectionClosed | RpcError::Transport(_)), "{err:?}");
}

#[test]
fn Client___two_responses_in_one_write___second_kept_for_next_call() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        writer
            .write_all(b"{\"result\":\"a\",\"id\":0}\n{\"result\":\"b\",\"id\":1}\n")
            .unwrap();
        read_request(reader);
    });
    let mut client = Client::connect(&address, config()).unwrap();
    let mut doc = Document::new();

    let first = client.call(&mut doc, "ping", None).unwrap();
    let second = client.call(&mut doc, "ping", None).unwrap();

    assert_eq!(doc.as_str(first), Some("a"));
    assert_eq!(doc.as_str(second), Some("b"));
    server.join().unwrap();
}

#[test]
fn Client___response_split_across_writes___reassembled() {
    let (address, server) = fake_server(|reader, writer| {
        read_request(reader);
        let response = b"{\"result\":[1,2,3],\"id\":0}\n";
        for chunk in response.chunks(4) {
            writer.write_all(chunk).unwrap();
            writer.flush().unwrap();
            thread::sleep(Duration::from_millis(2));
        }
    });
    let config = ClientConfig {
        initial_buffer_size: 4,
        ..config()
    };
    let mut client = Client::connect(&address, config).unwrap();
    let mut doc = Document::new();

    let result = client.call(&mut doc, "ping", None).unwrap();

    assert_eq!(doc.render(result, Format::Compact).unwrap(), "[1,2,3]");
    server.join().unwrap();
}

#[test]
fn Client___silent_server___read_timeout_is_transport_error() {
    let (address, server) = fake_server(|reader, _writer| {
        read_request(reader);
        thread::sleep(Duration::from_millis(300));
    });
    let config = ClientConfig::new().with_read_timeout_ms(50);
    let mut client = Client::connect(&address, config).unwrap();
    let mut doc = Document::new();

    let err = client.call(&mut doc, "ping", None).unwrap_err();

    assert!(matches!(err, RpcError::Transport(_)), "{err:?}");
    server.join().unwrap();
}

#[test]
fn Client___close___shuts_connection_down() {
    let (address, server) = fake_server(|reader, _writer| {
        let mut rest = String::new();
        reader.read_line(&mut rest).unwrap();
        assert!(rest.is_empty());
    });
    let client = Client::connect(&address, config()).unwrap();

    client.close().unwrap();

    server.join().unwrap();
}
