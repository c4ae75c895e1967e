use std::collections::BTreeMap;

use crate::protocols::common::hex::HexByte;
use crate::protocols::envelope::{EnvelopeError, ParsedRecord};
use crate::{MAX_REJECTION_EXAMPLES, RegisterSummary, RejectionSummary};

#[derive(Debug, Default)]
pub(crate) struct RegisterTally {
    counts: BTreeMap<u8, (String, u64)>,
}

impl RegisterTally {
    pub(crate) fn add(&mut self, record: &ParsedRecord) {
        let entry = self
            .counts
            .entry(record.register_id.value())
            .or_insert_with(|| (record.description.clone(), 0));
        entry.1 += 1;
    }

    pub(crate) fn summaries(self) -> Vec<RegisterSummary> {
        self.counts
            .into_iter()
            .map(|(id, (description, count))| RegisterSummary {
                register_id: HexByte(id),
                description,
                count,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct RejectionStats {
    count: u64,
    examples: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct RejectionTally {
    kinds: BTreeMap<&'static str, RejectionStats>,
}

impl RejectionTally {
    pub(crate) fn add(&mut self, err: &EnvelopeError, stream: &str, ts: Option<&str>) {
        let stats = self.kinds.entry(err.kind()).or_default();
        stats.count += 1;
        if stats.examples.len() < MAX_REJECTION_EXAMPLES {
            stats.examples.push(format_example(err, stream, ts));
        }
    }

    pub(crate) fn summaries(self) -> Vec<RejectionSummary> {
        self.kinds
            .into_iter()
            .map(|(kind, stats)| RejectionSummary {
                kind: kind.to_string(),
                count: stats.count,
                examples: stats.examples,
            })
            .collect()
    }
}

fn format_example(err: &EnvelopeError, stream: &str, ts: Option<&str>) -> String {
    match ts {
        Some(ts) => format!("{stream} @ {ts}: {err}"),
        None => format!("{stream}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterTally, RejectionTally};
    use crate::protocols::envelope::{CommandKind, EnvelopeError, parse_record};

    #[test]
    fn registers_sorted_by_id() {
        let mut tally = RegisterTally::default();
        for token in [
            "0101aabbc0aaabbcc0000",
            "0103031200501010205010100",
            "0101aabbc0aaabbcc0000",
        ] {
            tally.add(&parse_record(CommandKind::SetCan, token).unwrap());
        }
        let summaries = tally.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].register_id.value(), 0x05);
        assert_eq!(summaries[0].count, 1);
        assert_eq!(summaries[1].description, "UID");
        assert_eq!(summaries[1].count, 2);
    }

    #[test]
    fn rejection_examples_are_capped() {
        let mut tally = RejectionTally::default();
        let err = EnvelopeError::UnrecognizedCommand {
            command: "x".to_string(),
        };
        for _ in 0..5 {
            tally.add(&err, "s", Some("1970-01-01T00:00:01Z"));
        }
        tally.add(
            &EnvelopeError::MalformedHex {
                token: "zz".to_string(),
                offset: 0,
            },
            "s",
            None,
        );

        let summaries = tally.summaries();
        assert_eq!(summaries[0].kind, "malformed-hex");
        assert_eq!(summaries[0].examples, vec!["s: malformed hex in record 'zz' at offset 0"]);
        assert_eq!(summaries[1].kind, "unrecognized-command");
        assert_eq!(summaries[1].count, 5);
        assert_eq!(summaries[1].examples.len(), 3);
        assert_eq!(
            summaries[1].examples[0],
            "s @ 1970-01-01T00:00:01Z: unrecognized command 'x'"
        );
    }
}
