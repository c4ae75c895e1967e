use std::net::{IpAddr, SocketAddr};

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;
use tracing::trace;

use super::error::TcpError;

/// TCP segment sliced out of a captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSegment<'a> {
    pub src: SocketAddr,
    pub dst: SocketAddr,
    pub sequence: u32,
    pub syn: bool,
    pub payload: &'a [u8],
}

impl TcpSegment<'_> {
    /// Direction identifier, `src_ip:port -> dst_ip:port`.
    pub fn stream_id(&self) -> String {
        format!("{} -> {}", self.src, self.dst)
    }

    pub fn touches_port(&self, port: u16) -> bool {
        self.src.port() == port || self.dst.port() == port
    }
}

/// Slice a link-layer frame down to its TCP segment.
///
/// Returns `Ok(None)` for unsupported linktypes and non-TCP packets.
pub fn parse_tcp_segment(linktype: Linktype, data: &[u8]) -> Result<Option<TcpSegment<'_>>, TcpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| TcpError::Slice(e.to_string()))?
        }
        Linktype::RAW => SlicedPacket::from_ip(data).map_err(|e| TcpError::Slice(e.to_string()))?,
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(TcpError::MissingNetworkLayer)?;
    let tcp = match sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => tcp,
        _ => return Ok(None),
    };

    let (src_ip, dst_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ref ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    Ok(Some(TcpSegment {
        src: SocketAddr::new(src_ip, tcp.source_port()),
        dst: SocketAddr::new(dst_ip, tcp.destination_port()),
        sequence: tcp.sequence_number(),
        syn: tcp.syn(),
        payload: tcp.payload(),
    }))
}

/// Tracks the next expected sequence number of one TCP direction.
///
/// Bytes already delivered are cut from retransmitted segments. Segments
/// after a gap are delivered as-is; nothing is reordered or buffered.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    next: Option<u32>,
}

impl SequenceTracker {
    /// The part of `segment`'s payload not delivered yet, `None` for a pure
    /// duplicate.
    pub fn accept<'a>(&mut self, segment: &TcpSegment<'a>) -> Option<&'a [u8]> {
        let payload = segment.payload;
        let first = if segment.syn {
            segment.sequence.wrapping_add(1)
        } else {
            segment.sequence
        };
        let after = first.wrapping_add(payload.len() as u32);

        let Some(expected) = self.next else {
            self.next = Some(after);
            return Some(payload);
        };

        let overlap = expected.wrapping_sub(first) as i32;
        if overlap <= 0 {
            if overlap < 0 {
                trace!(missing = -(overlap as i64), "gap in tcp stream");
            }
            self.next = Some(after);
            return Some(payload);
        }

        let overlap = overlap as usize;
        if overlap >= payload.len() {
            if !payload.is_empty() {
                trace!(bytes = payload.len(), "dropping retransmitted segment");
            }
            return None;
        }
        self.next = Some(after);
        Some(&payload[overlap..])
    }
}
