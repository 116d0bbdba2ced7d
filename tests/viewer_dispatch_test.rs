//! The viewer's apply-and-reply path, driven over a real socket.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use led_matrix::adapter::{Adapter, ServerConfig};
use led_matrix::core::{MatrixSession, SessionState};
use led_matrix::types::{Color, FrameLengthPolicy, Geometry};

const WAIT: Duration = Duration::from_secs(2);

struct Driver {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Driver {
    fn connect(adapter: &Adapter) -> Self {
        let writer = TcpStream::connect(adapter.local_addr()).expect("connect failed");
        writer.set_read_timeout(Some(WAIT)).unwrap();
        let reader = BufReader::new(writer.try_clone().unwrap());
        Self { reader, writer }
    }

    fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).unwrap();
        self.writer.write_all(b"\n").unwrap();
        self.writer.flush().unwrap();
    }

    fn reply(&mut self) -> serde_json::Value {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).expect("no reply in time");
        assert!(n > 0, "connection closed");
        serde_json::from_str(&line).unwrap()
    }
}

fn start(policy: FrameLengthPolicy) -> (Adapter, MatrixSession) {
    let adapter = Adapter::start(ServerConfig {
        port: 0,
        frame_policy: policy,
        ..ServerConfig::default()
    })
    .unwrap();
    (adapter, MatrixSession::new(policy))
}

/// Run the viewer's apply step until `count` messages have been handled.
fn pump(adapter: &mut Adapter, session: &mut MatrixSession, count: usize) -> bool {
    let deadline = Instant::now() + WAIT;
    let mut handled = 0;
    let mut redraw = false;
    while handled < count {
        assert!(Instant::now() < deadline, "only {handled} of {count} messages arrived");
        let report = adapter.apply_pending(session);
        handled += report.handled;
        redraw |= report.redraw;
        thread::sleep(Duration::from_millis(2));
    }
    redraw
}

#[test]
fn init_matrix_is_acked_with_its_seq_after_apply() {
    let (mut adapter, mut session) = start(FrameLengthPolicy::Lenient);
    let mut driver = Driver::connect(&adapter);

    driver.send(r#"{"type":"init_matrix","seq":41,"width":2,"height":2,"pitch":10,"diameter":8}"#);
    assert!(pump(&mut adapter, &mut session, 1));

    assert_eq!(session.state(), SessionState::Built);
    assert_eq!(session.geometry(), Some(&Geometry::new(2, 2, 10.0, 8.0)));

    let ack = driver.reply();
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 41);
    assert_eq!(ack["status"], "ok");
}

#[test]
fn frames_update_cells_without_reply() {
    let (mut adapter, mut session) = start(FrameLengthPolicy::Lenient);
    let mut driver = Driver::connect(&adapter);

    driver.send(r#"{"type":"init_matrix","seq":1,"width":1,"height":1,"pitch":5,"diameter":5}"#);
    driver.send(r#"{"type":"set_pixels","seq":2,"data":[[10,20,30]]}"#);
    driver.send(r#"{"type":"init_matrix","seq":3,"width":1,"height":1,"pitch":5,"diameter":5}"#);
    pump(&mut adapter, &mut session, 3);

    assert_eq!(
        session.host().cells().next().unwrap().color(),
        Some(Color::new(10, 20, 30))
    );
    assert_eq!(driver.reply()["seq"], 1);
    // The frame in between produced nothing.
    assert_eq!(driver.reply()["seq"], 3);
}

#[test]
fn frame_before_init_gets_no_reply() {
    let (mut adapter, mut session) = start(FrameLengthPolicy::Strict);
    let mut driver = Driver::connect(&adapter);

    driver.send(r#"{"type":"set_pixels","seq":1,"data":[[1,2,3]]}"#);
    driver.send(r#"{"type":"init_matrix","seq":2,"width":2,"height":1,"pitch":10,"diameter":8}"#);
    pump(&mut adapter, &mut session, 2);

    let first = driver.reply();
    assert_eq!(first["type"], "ack");
    assert_eq!(first["seq"], 2);
    assert_eq!(session.frames_rendered(), 0);
}

#[test]
fn strict_mismatch_is_rejected_with_its_code() {
    let (mut adapter, mut session) = start(FrameLengthPolicy::Strict);
    let mut driver = Driver::connect(&adapter);

    driver.send(r#"{"type":"init_matrix","seq":1,"width":2,"height":1,"pitch":10,"diameter":8}"#);
    driver.send(r#"{"type":"set_pixels","seq":2,"data":[[1,2,3]]}"#);
    pump(&mut adapter, &mut session, 2);

    assert_eq!(driver.reply()["type"], "ack");
    let err = driver.reply();
    assert_eq!(err["type"], "error");
    assert_eq!(err["seq"], 2);
    assert_eq!(err["code"], "frame_length_mismatch");
    assert!(session.host().cells().all(|c| c.color().is_none()));
}

#[test]
fn lenient_mismatch_is_applied_silently() {
    let (mut adapter, mut session) = start(FrameLengthPolicy::Lenient);
    let mut driver = Driver::connect(&adapter);

    driver.send(r#"{"type":"init_matrix","seq":1,"width":2,"height":1,"pitch":10,"diameter":8}"#);
    driver.send(r#"{"type":"set_pixels","seq":2,"data":[[1,2,3]]}"#);
    driver.send(r#"{"type":"init_matrix","seq":3,"width":1,"height":1,"pitch":10,"diameter":8}"#);
    pump(&mut adapter, &mut session, 3);

    assert_eq!(driver.reply()["seq"], 1);
    assert_eq!(driver.reply()["seq"], 3);
    assert_eq!(session.frames_rendered(), 1);
}
