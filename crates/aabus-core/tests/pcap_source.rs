use std::fs;
use std::path::PathBuf;

use aabus_core::{ChunkSource, PcapFileSource, PcapOptions, SourceError, analyze_pcap_file};
use etherparse::PacketBuilder;
use tempfile::TempDir;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture() -> PathBuf {
    repo_root()
        .join("tests")
        .join("fixtures")
        .join("bridge_session")
        .join("input.pcapng")
}

fn tcp_frame(src: ([u8; 4], u16), dst: ([u8; 4], u16), seq: u32, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4(src.0, dst.0, 64)
        .tcp(src.1, dst.1, seq, 65535);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, payload).unwrap();
    packet
}

fn udp_frame(payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([192, 168, 1, 2], [192, 168, 1, 255], 64)
        .udp(10002, 10002);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, payload).unwrap();
    packet
}

const MICROSECOND_MAGIC: u32 = 0xa1b2_c3d4;
const NANOSECOND_MAGIC: u32 = 0xa1b2_3c4d;

/// Little-endian legacy PCAP with Ethernet linktype and microsecond stamps.
fn write_legacy_pcap(path: &std::path::Path, packets: &[(u32, Vec<u8>)]) {
    let packets = packets.iter().map(|(sec, data)| (*sec, 0, data));
    write_legacy_pcap_with(path, MICROSECOND_MAGIC, packets);
}

fn write_legacy_pcap_with<'a>(
    path: &std::path::Path,
    magic: u32,
    packets: impl Iterator<Item = (u32, u32, &'a Vec<u8>)>,
) {
    let mut out = Vec::new();
    out.extend_from_slice(&magic.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (ts_sec, ts_fraction, data) in packets {
        out.extend_from_slice(&ts_sec.to_le_bytes());
        out.extend_from_slice(&ts_fraction.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
    }
    fs::write(path, out).unwrap();
}

const BRIDGE: ([u8; 4], u16) = ([192, 168, 1, 2], 10002);
const TABLET: ([u8; 4], u16) = ([192, 168, 1, 50], 40000);
const OTHER: ([u8; 4], u16) = ([10, 0, 0, 1], 8080);

#[test]
fn pcap_source_reads_fixture_streams() {
    let mut source = PcapFileSource::open(&fixture()).unwrap();

    let mut chunks = Vec::new();
    while let Some(chunk) = source.next_chunk().unwrap() {
        chunks.push(chunk);
    }

    const BRIDGE_TO_TABLET: &str = "192.168.1.2:10002 -> 192.168.1.50:40000";
    const TABLET_TO_BRIDGE: &str = "192.168.1.50:40000 -> 192.168.1.2:10002";

    assert_eq!(chunks.len(), 4, "retransmitted segment must be dropped");
    let streams: Vec<&str> = chunks.iter().map(|chunk| chunk.stream.as_str()).collect();
    assert_eq!(
        streams,
        vec![BRIDGE_TO_TABLET, BRIDGE_TO_TABLET, TABLET_TO_BRIDGE, BRIDGE_TO_TABLET]
    );
    assert_eq!(chunks[1].data, b"85022b150500</U=1a>".to_vec());
    assert_eq!(
        chunks[2].data,
        b"<U>setCAN 1 0101aabbc0aaabbcc0000</U=2f>".to_vec()
    );
    assert_eq!(chunks[3].data, b"<U>Ping</U=00><U>getCAN 0103</U=00>".to_vec());
    assert!(chunks.iter().all(|chunk| chunk.ts.is_some()));
    assert!(chunks[1].ts < chunks[2].ts);
}

#[test]
fn legacy_pcap_with_port_filter_and_overlap() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.pcap");
    write_legacy_pcap(
        &path,
        &[
            (1, tcp_frame(BRIDGE, TABLET, 100, b"<U>getCAN 01030312005")),
            (2, udp_frame(b"<U>Ping</U=00>")),
            (3, tcp_frame(OTHER, OTHER, 1, b"<U>getCAN 0103031200501010205010100</U=4c>")),
            (4, tcp_frame(BRIDGE, TABLET, 110, b"010303120050101020501")),
            (5, tcp_frame(BRIDGE, TABLET, 131, b"0100</U=4c>")),
        ],
    );

    let mut source = PcapFileSource::open_with(&path, PcapOptions { port: Some(10002) }).unwrap();
    let mut data = Vec::new();
    while let Some(chunk) = source.next_chunk().unwrap() {
        assert_eq!(chunk.stream, "192.168.1.2:10002 -> 192.168.1.50:40000");
        data.extend_from_slice(&chunk.data);
    }
    assert_eq!(
        data,
        b"<U>getCAN 0103031200501010205010100</U=4c>".to_vec()
    );

    let report = analyze_pcap_file(&path, PcapOptions { port: Some(10002) }).unwrap();
    assert_eq!(report.summary.records, 1);
    assert_eq!(report.generated_at, "1970-01-01T00:00:05Z");

    let unfiltered = analyze_pcap_file(&path, PcapOptions::default()).unwrap();
    assert_eq!(unfiltered.summary.records, 2);
    assert_eq!(unfiltered.streams.len(), 2);
}

#[test]
fn legacy_pcap_nanosecond_stamps() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nanos.pcap");
    let packet = tcp_frame(BRIDGE, TABLET, 1, b"<U>Ping</U=00>");
    write_legacy_pcap_with(&path, NANOSECOND_MAGIC, [(7, 500_000_000, &packet)].into_iter());

    let mut source = PcapFileSource::open(&path).unwrap();
    let chunk = source.next_chunk().unwrap().expect("one chunk");
    assert_eq!(chunk.ts, Some(7.5));
    assert!(source.next_chunk().unwrap().is_none());
}

#[test]
fn pcap_source_rejects_truncated_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("truncated.pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();

    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn pcap_source_rejects_garbage() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("garbage.pcap");
    fs::write(&path, b"this is not a capture file at all").unwrap();

    let result = PcapFileSource::open(&path).and_then(|mut source| source.next_chunk());
    assert!(matches!(result, Err(SourceError::Pcap(_))));
}
