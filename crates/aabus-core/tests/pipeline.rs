use std::path::PathBuf;

use aabus_core::{
    CommandKind, DecodeEvent, DecodedRegister, FanSpeed, Mode, OriginDest, PcapOptions,
    SensorType, StreamDecoder, Switch, analyze_pcap_file, analyze_raw_file,
};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
        .join("bridge_session")
}

const SESSION: &[u8] = b"\
<U>getCAN 0103031200501010205010100</U=4c>\
<U>Ping</U=00>\
<U>setCAN 1 0101aabbc0aaabbcc0000</U=2f>\
<U>getCAN 010303120030185022b150500 0103 0103031200841413831000000</U=3a>";

fn decode_all(chunks: &[&[u8]]) -> Vec<DecodeEvent> {
    let mut decoder = StreamDecoder::new();
    chunks
        .iter()
        .flat_map(|chunk| decoder.feed_events(chunk))
        .collect()
}

#[test]
fn session_decodes_every_record() {
    let events = decode_all(&[SESSION]);
    let records: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            DecodeEvent::Record(record) => Some(record),
            DecodeEvent::Rejected(_) => None,
        })
        .collect();
    assert_eq!(records.len(), 4);

    match &records[0].decoded {
        DecodedRegister::SystemStatus(status) => {
            assert_eq!(status.power, Switch::On);
            assert_eq!(status.mode, Mode::Cool);
            assert_eq!(status.fan, FanSpeed::Medium);
            assert_eq!(status.set_temperature, 2.5);
        }
        other => panic!("unexpected decode: {other:?}"),
    }

    assert_eq!(records[1].command, CommandKind::SetCan);
    assert_eq!(records[1].origin, OriginDest::Tablet);

    match &records[2].decoded {
        DecodedRegister::ZoneState(zone) => {
            assert_eq!(zone.zone, 1);
            assert!(zone.open);
            assert_eq!(zone.percent, 5);
            assert_eq!(zone.sensor, SensorType::Wired);
            assert_eq!(zone.set_temperature, 21.5);
            assert_eq!(zone.measured_temperature, "21.5°C");
        }
        other => panic!("unexpected decode: {other:?}"),
    }

    assert_eq!(records[3].description, "AC Error");
    match &records[3].decoded {
        DecodedRegister::AirconError(error) => {
            assert_eq!(error.code, "AA81");
            assert!(error.known);
            assert_eq!(error.reserved, "0000");
        }
        other => panic!("unexpected decode: {other:?}"),
    }
    let rejected = events
        .iter()
        .filter(|event| matches!(event, DecodeEvent::Rejected(_)))
        .count();
    assert_eq!(rejected, 1);
}

#[test]
fn decoding_is_chunk_invariant() {
    let whole = decode_all(&[SESSION]);
    for size in [1, 2, 3, 7, 16, 64] {
        let chunks: Vec<&[u8]> = SESSION.chunks(size).collect();
        assert_eq!(decode_all(&chunks), whole, "chunk size {size}");
    }
}

#[test]
fn repeated_start_marker_keeps_sibling_records() {
    let mut decoder = StreamDecoder::new();
    let mut events = decoder.feed_events(b"\x00\xffgarbage</U=zz><U>getCAN 0103<U>getCAN ");
    events.extend(decoder.feed_events(b"0103031200501010205010100</U=4c>trailing"));

    let records: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            DecodeEvent::Record(record) => Some(record),
            DecodeEvent::Rejected(_) => None,
        })
        .collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].unit_id, "03120");
    assert_eq!(decoder.stats().rejections, 1);
    assert_eq!(decoder.discarded(), 16);
    assert_eq!(decoder.retained(), b"trailing");
}

#[test]
fn start_marker_inside_frame_does_not_drop_records() {
    let mut decoder = StreamDecoder::new();
    let records = decoder.feed(
        b"<U>getCAN 0103031200501010205010100 <U>setCAN 0101aabbc0aaabbcc0000</U=2f>",
    );
    let registers: Vec<String> = records
        .iter()
        .map(|record| record.register_id.to_string())
        .collect();
    assert_eq!(registers, vec!["05", "0a"]);
    assert_eq!(decoder.stats().rejections, 1);
    assert_eq!(decoder.discarded(), 0);
}

#[test]
fn fixture_capture_report() {
    let report = analyze_pcap_file(
        &fixture_dir().join("input.pcapng"),
        PcapOptions::default(),
    )
    .unwrap();

    assert_eq!(report.report_version, aabus_core::REPORT_VERSION);
    assert_eq!(report.generated_at, "2023-11-14T22:13:24Z");
    assert_eq!(report.summary.chunks, 4);
    assert_eq!(report.summary.frames, 5);
    assert_eq!(report.summary.keepalives, 1);
    assert_eq!(report.summary.records, 3);
    assert_eq!(report.summary.rejections, 1);
    assert_eq!(report.summary.retained_bytes, 0);

    assert_eq!(report.streams.len(), 2);
    assert_eq!(report.streams[0].stream, "192.168.1.2:10002 -> 192.168.1.50:40000");
    assert_eq!(report.streams[0].bytes, 119);
    assert_eq!(report.streams[1].records, 1);

    let ids: Vec<String> = report
        .registers
        .iter()
        .map(|entry| entry.register_id.to_string())
        .collect();
    assert_eq!(ids, vec!["03", "05", "0a"]);

    assert_eq!(report.rejections.len(), 1);
    assert_eq!(report.rejections[0].kind, "incomplete-record");
    assert_eq!(
        report.records[1].ts.as_deref(),
        Some("2023-11-14T22:13:21Z")
    );
    assert_eq!(report.records[1].record.description, "Zone State");
}

#[test]
fn raw_dump_matches_capture_direction() {
    let report = analyze_raw_file(&fixture_dir().join("input.raw")).unwrap();
    assert_eq!(report.input.bytes, 119);
    assert_eq!(report.streams.len(), 1);
    assert_eq!(report.summary.records, 2);
    assert_eq!(report.summary.rejections, 1);
    assert_eq!(report.generated_at, aabus_core::DEFAULT_GENERATED_AT);
    assert!(report.records.iter().all(|entry| entry.ts.is_none()));
}
