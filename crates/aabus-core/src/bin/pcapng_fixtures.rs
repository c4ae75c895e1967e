use std::fs;
use std::path::{Path, PathBuf};

const ETHERTYPE_IPV4: u16 = 0x0800;
const TCP_PROTO: u8 = 6;
const IPV4_HEADER_LEN: usize = 20;
const TCP_HEADER_LEN: usize = 20;
const TCP_FLAGS_PSH_ACK: u8 = 0x18;
const TCP_WINDOW: u16 = 65535;

const BRIDGE: Endpoint = Endpoint {
    ip: [192, 168, 1, 2],
    port: 10002,
};
const TABLET: Endpoint = Endpoint {
    ip: [192, 168, 1, 50],
    port: 40000,
};
const BRIDGE_SEQ: u32 = 1000;
const TABLET_SEQ: u32 = 5000;
const BASE_TS_US: u64 = 1_700_000_000 * 1_000_000;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/fixtures");
    write_bridge_session(&root.join("bridge_session"))?;
    Ok(())
}

#[derive(Clone, Copy)]
struct Endpoint {
    ip: [u8; 4],
    port: u16,
}

struct Segment {
    src: Endpoint,
    dst: Endpoint,
    seq: u32,
    payload: &'static [u8],
}

/// A short bridge conversation: a status record, a zone state record split
/// across two segments (the second one retransmitted), a tablet UID write,
/// then a keepalive and a truncated record.
fn bridge_session() -> Vec<Segment> {
    let first: &[u8] = b"<U>getCAN 0103031200501010205010100</U=4c><U>getCAN 0103031200301";
    let second: &[u8] = b"85022b150500</U=1a>";
    let second_seq = BRIDGE_SEQ + first.len() as u32;
    let third: &[u8] = b"<U>Ping</U=00><U>getCAN 0103</U=00>";
    vec![
        Segment {
            src: BRIDGE,
            dst: TABLET,
            seq: BRIDGE_SEQ,
            payload: first,
        },
        Segment {
            src: BRIDGE,
            dst: TABLET,
            seq: second_seq,
            payload: second,
        },
        Segment {
            src: BRIDGE,
            dst: TABLET,
            seq: second_seq,
            payload: second,
        },
        Segment {
            src: TABLET,
            dst: BRIDGE,
            seq: TABLET_SEQ,
            payload: b"<U>setCAN 1 0101aabbc0aaabbcc0000</U=2f>",
        },
        Segment {
            src: BRIDGE,
            dst: TABLET,
            seq: second_seq + second.len() as u32,
            payload: third,
        },
    ]
}

fn write_bridge_session(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;

    let segments = bridge_session();
    let packets: Vec<(u64, Vec<u8>)> = segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| {
            let ts_us = BASE_TS_US + (idx as u64) * 1_000_000;
            (ts_us, build_ipv4_tcp_packet(segment))
        })
        .collect();
    write_pcapng(&dir.join("input.pcapng"), &packets)?;

    let raw: Vec<u8> = segments
        .iter()
        .enumerate()
        .filter(|(idx, segment)| segment.src.port == BRIDGE.port && *idx != 2)
        .flat_map(|(_, segment)| segment.payload.iter().copied())
        .collect();
    let raw_path = dir.join("input.raw");
    fs::write(&raw_path, raw)
        .map_err(|err| format!("failed to write {}: {}", raw_path.display(), err))?;
    Ok(())
}

fn build_ipv4_tcp_packet(segment: &Segment) -> Vec<u8> {
    let mut packet = Vec::new();
    packet.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    packet.extend_from_slice(&[0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f]);
    packet.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());

    let tcp_len = TCP_HEADER_LEN + segment.payload.len();
    let total_len = (IPV4_HEADER_LEN + tcp_len) as u16;
    let mut ip_header = [0u8; IPV4_HEADER_LEN];
    ip_header[0] = 0x45;
    ip_header[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip_header[8] = 64;
    ip_header[9] = TCP_PROTO;
    ip_header[12..16].copy_from_slice(&segment.src.ip);
    ip_header[16..20].copy_from_slice(&segment.dst.ip);
    let checksum = internet_checksum(&ip_header);
    ip_header[10..12].copy_from_slice(&checksum.to_be_bytes());
    packet.extend_from_slice(&ip_header);

    let mut tcp = vec![0u8; TCP_HEADER_LEN];
    tcp[0..2].copy_from_slice(&segment.src.port.to_be_bytes());
    tcp[2..4].copy_from_slice(&segment.dst.port.to_be_bytes());
    tcp[4..8].copy_from_slice(&segment.seq.to_be_bytes());
    tcp[8..12].copy_from_slice(&1u32.to_be_bytes());
    tcp[12] = ((TCP_HEADER_LEN / 4) as u8) << 4;
    tcp[13] = TCP_FLAGS_PSH_ACK;
    tcp[14..16].copy_from_slice(&TCP_WINDOW.to_be_bytes());
    tcp.extend_from_slice(segment.payload);

    let mut pseudo = Vec::with_capacity(12 + tcp.len());
    pseudo.extend_from_slice(&segment.src.ip);
    pseudo.extend_from_slice(&segment.dst.ip);
    pseudo.push(0);
    pseudo.push(TCP_PROTO);
    pseudo.extend_from_slice(&(tcp_len as u16).to_be_bytes());
    pseudo.extend_from_slice(&tcp);
    let checksum = internet_checksum(&pseudo);
    tcp[16..18].copy_from_slice(&checksum.to_be_bytes());

    packet.extend_from_slice(&tcp);
    packet
}

fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum = 0u32;
    for chunk in data.chunks(2) {
        let hi = chunk[0];
        let lo = chunk.get(1).copied().unwrap_or(0);
        sum = sum.wrapping_add(u16::from_be_bytes([hi, lo]) as u32);
    }
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

fn write_pcapng(path: &Path, packets: &[(u64, Vec<u8>)]) -> Result<(), String> {
    let mut output = Vec::new();
    output.extend_from_slice(&pcapng_block(0x0A0D0D0A, &section_header_body()));
    output.extend_from_slice(&pcapng_block(1, &interface_desc_body()));

    for (ts_us, data) in packets {
        output.extend_from_slice(&pcapng_block(6, &enhanced_packet_body(*ts_us, data)));
    }

    fs::write(path, output)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    Ok(())
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&65535u32.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let ts_high = ((ts_us >> 32) & 0xFFFF_FFFF) as u32;
    let ts_low = (ts_us & 0xFFFF_FFFF) as u32;
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    let pad_len = (4 - (data.len() % 4)) % 4;
    body.extend(std::iter::repeat_n(0u8, pad_len));
    body
}
