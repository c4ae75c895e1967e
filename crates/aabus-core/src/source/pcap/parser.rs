use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapNGReader, traits::PcapReaderIterator,
};
use tracing::trace;

use crate::source::{ChunkSource, SourceError, StreamChunk};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{CaptureFormat, Interface, InterfaceTable};
use super::tcp::{SequenceTracker, parse_tcp_segment};

/// Capture filtering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcapOptions {
    /// Keep only segments with this port on either side.
    pub port: Option<u16>,
}

/// TCP payload source backed by a PCAP or PCAPNG file.
pub struct PcapFileSource {
    inner: PcapReader,
    options: PcapOptions,
    directions: HashMap<String, SequenceTracker>,
}

struct CapturedPacket {
    ts: f64,
    linktype: Linktype,
    data: Vec<u8>,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        interface: Interface,
    },
    Ng {
        reader: PcapNGReader<File>,
        interfaces: InterfaceTable,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::open_with(path, PcapOptions::default())
    }

    pub fn open_with(path: &Path, options: PcapOptions) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        let inner = create_reader(file).map_err(SourceError::from)?;
        Ok(Self {
            inner,
            options,
            directions: HashMap::new(),
        })
    }
}

impl ChunkSource for PcapFileSource {
    fn next_chunk(&mut self) -> Result<Option<StreamChunk>, SourceError> {
        while let Some(packet) = next_packet(&mut self.inner)? {
            let segment = match parse_tcp_segment(packet.linktype, &packet.data) {
                Ok(Some(segment)) => segment,
                Ok(None) => continue,
                Err(err) => {
                    trace!(error = %err, "skipping packet");
                    continue;
                }
            };
            if self
                .options
                .port
                .is_some_and(|port| !segment.touches_port(port))
            {
                continue;
            }

            let stream = segment.stream_id();
            let tracker = self.directions.entry(stream.clone()).or_default();
            let Some(data) = tracker.accept(&segment) else {
                continue;
            };
            if data.is_empty() {
                continue;
            }
            return Ok(Some(StreamChunk {
                ts: Some(packet.ts),
                stream,
                data: data.to_vec(),
            }));
        }
        Ok(None)
    }
}

fn create_reader(mut file: File) -> Result<PcapReader, PcapSourceError> {
    match CaptureFormat::detect(&mut file)? {
        CaptureFormat::Pcapng => {
            let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
                PcapSourceError::Pcap {
                    context: "pcapng reader init",
                    message: e.to_string(),
                }
            })?;
            Ok(PcapReader::Ng {
                reader,
                interfaces: InterfaceTable::default(),
            })
        }
        CaptureFormat::Legacy => {
            let reader =
                LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
                    PcapSourceError::Pcap {
                        context: "pcap reader init",
                        message: e.to_string(),
                    }
                })?;
            Ok(PcapReader::Legacy {
                reader,
                interface: Interface::default(),
            })
        }
    }
}

fn next_packet(reader: &mut PcapReader) -> Result<Option<CapturedPacket>, PcapSourceError> {
    loop {
        match reader {
            PcapReader::Legacy { reader, interface } => match reader.next() {
                Ok((offset, block)) => {
                    let packet = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            *interface = Interface::from_legacy_header(&header);
                            None
                        }
                        PcapBlockOwned::Legacy(packet) => Some(CapturedPacket {
                            ts: interface.legacy_seconds(packet.ts_sec, packet.ts_usec),
                            linktype: interface.linktype,
                            data: packet.data.to_vec(),
                        }),
                        _ => None,
                    };
                    reader.consume(offset);
                    if packet.is_some() {
                        return Ok(packet);
                    }
                }
                Err(pcap_parser::PcapError::Eof) => return Ok(None),
                Err(pcap_parser::PcapError::Incomplete(_)) => {
                    reader.refill().map_err(|e| PcapSourceError::Pcap {
                        context: "pcap reader refill",
                        message: e.to_string(),
                    })?;
                }
                Err(e) => {
                    return Err(PcapSourceError::Pcap {
                        context: "pcap reader next",
                        message: e.to_string(),
                    });
                }
            },
            PcapReader::Ng { reader, interfaces } => match reader.next() {
                Ok((offset, block)) => {
                    let packet = match block {
                        PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                            interfaces.push(Interface::from_description(&idb));
                            None
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => {
                            let interface = interfaces.get(packet.if_id);
                            Some(CapturedPacket {
                                ts: interface.ng_seconds(packet.ts_high, packet.ts_low),
                                linktype: interface.linktype,
                                data: packet.data.to_vec(),
                            })
                        }
                        _ => None,
                    };
                    reader.consume(offset);
                    if packet.is_some() {
                        return Ok(packet);
                    }
                }
                Err(pcap_parser::PcapError::Eof) => return Ok(None),
                Err(pcap_parser::PcapError::Incomplete(_)) => {
                    reader.refill().map_err(|e| PcapSourceError::Pcap {
                        context: "pcapng reader refill",
                        message: e.to_string(),
                    })?;
                }
                Err(e) => {
                    return Err(PcapSourceError::Pcap {
                        context: "pcapng reader next",
                        message: e.to_string(),
                    });
                }
            },
        }
    }
}
