//! Integration tests for the GET response as seen by a client.

use crate::mock_hw::{BOOT_TIME, Rig};
use tempmon::app::ports::{ConfigPort, EventLogPort};
use tempmon::app::service::TickOutcome;
use tempmon::config::Thresholds;
use tempmon::protocol::PendingMethod;
use tempmon::telemetry::EventKind;

const GET: &[u8] = b"GET /device HTTP/1.1\r\n\r\n";

fn split_response(raw: &[u8]) -> (String, String) {
    let text = String::from_utf8(raw.to_vec()).expect("response is UTF-8");
    let (head, body) = text.split_once("\r\n\r\n").expect("header terminator");
    (head.to_owned(), body.to_owned())
}

#[test]
fn get_response_headers() {
    let mut rig = Rig::new();
    rig.send(GET);
    let (head, body) = split_response(rig.chan.output());
    assert_eq!(
        head,
        "HTTP/1.1 200 OK\r\nContent-Type: application/vnd.api+json\r\nConnection: close"
    );
    assert!(body.ends_with("}\r\n"));
}

#[test]
fn get_body_has_contract_field_order() {
    let mut rig = Rig::new();
    rig.hw.poll_due = true;
    rig.hw.temperature = 68;
    assert_eq!(rig.send(GET), TickOutcome::Serviced(PendingMethod::Get));

    let (_, body) = split_response(rig.chan.output());
    let expected = concat!(
        r#"{"vpd":{"model":"TM-100","manufacturer":"TempMon","serial_number":"TM0000001","#,
        r#""manufacture_date":"12/06/2019 00:00:00","mac_address":"DE:AD:BE:EF:CA:FE","#,
        r#""country_code":"USA"},"#,
        r#""tcrit_hi":100,"twarn_hi":90,"tcrit_lo":40,"twarn_lo":50,"#,
        r#""temperature":68,"state":"NORMAL","log":["#,
        r#"{"timestamp":"12/06/2019 14:03:09","event":1},"#,
        r#"{"timestamp":"12/06/2019 14:03:09","event":2},"#,
        r#"{"timestamp":"12/06/2019 14:03:09","event":3}]}"#,
        "\r\n",
    );
    assert_eq!(body, expected);
}

#[test]
fn body_parses_as_json_with_expected_types() {
    let mut rig = Rig::new();
    rig.send(GET);
    let (_, body) = split_response(rig.chan.output());
    let v: serde_json::Value = serde_json::from_str(body.trim_end()).unwrap();
    assert!(v["tcrit_hi"].is_i64());
    assert!(v["temperature"].is_i64());
    assert!(v["vpd"]["manufacture_date"].is_string());
    assert_eq!(v["log"].as_array().map(Vec::len), Some(3));
    assert!(v["log"][0]["event"].is_u64());
}

#[test]
fn thresholds_and_alarms_show_up_in_the_report() {
    let mut rig = Rig::new();
    rig.store
        .set_thresholds(Thresholds {
            hi_alarm: 95,
            hi_warn: 85,
            lo_warn: 45,
            lo_alarm: 35,
        })
        .unwrap();
    rig.store.clock().advance(60);
    rig.store.append(EventKind::HiWarn);

    rig.send(GET);
    let (_, body) = split_response(rig.chan.output());
    assert!(body.contains(r#""tcrit_hi":95,"twarn_hi":85,"tcrit_lo":35,"twarn_lo":45,"#));
    assert!(body.contains(r#"{"timestamp":"12/06/2019 14:04:09","event":5}]}"#));
}

#[test]
fn repeated_gets_are_byte_identical() {
    let mut rig = Rig::new();
    rig.send(GET);
    let first = rig.chan.take_output();

    rig.reconnect();
    rig.send(GET);
    let second = rig.chan.take_output();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn write_methods_produce_no_bytes() {
    let mut rig = Rig::new();
    rig.send(b"PUT /config HTTP/1.1\r\n\r\n");
    assert!(rig.chan.output().is_empty());

    rig.reconnect();
    rig.send(b"DELETE /log HTTP/1.1\r\n\r\n");
    assert!(rig.chan.output().is_empty());
    // The log is untouched by DELETE.
    assert_eq!(rig.store.len(), 3);
    assert_eq!(rig.store.record(0).map(|r| r.timestamp), Some(BOOT_TIME));
}

#[test]
fn get_before_first_poll_reports_seed_reading() {
    let mut rig = Rig::new();
    rig.send(GET);
    let (_, body) = split_response(rig.chan.output());
    assert!(body.contains(r#""temperature":75,"#), "{body}");
}
