// Copyright 2024. The Tari Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! The peer topology a Cardano node dials on startup, and the merge of a fixed (locally curated) topology with a
//! fetched one.

mod file;

use std::{collections::HashSet, fmt};

pub use file::{read_topology_from_file, write_topology_to_file};
use serde::{Deserialize, Serialize};

/// A single peer entry of a topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    #[serde(rename = "addr", alias = "address")]
    pub address: String,
    pub port: u16,
    /// The number of addresses a DNS name may resolve to. Defaults to 1.
    #[serde(default = "default_valency")]
    pub valency: u32,
}

fn default_valency() -> u32 {
    1
}

impl Producer {
    pub fn new<A: Into<String>>(address: A, port: u16, valency: u32) -> Self {
        Self {
            address: address.into(),
            port,
            valency,
        }
    }

    /// Two producers with the same key describe the same peer.
    pub fn key(&self) -> (&str, u16) {
        (self.address.as_str(), self.port)
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (valency {})", self.address, self.port, self.valency)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "Producers", default)]
    pub producers: Vec<Producer>,
}

impl Topology {
    pub fn new(producers: Vec<Producer>) -> Self {
        Self { producers }
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Producer> {
        self.producers.iter()
    }
}

impl From<Vec<Producer>> for Topology {
    fn from(producers: Vec<Producer>) -> Self {
        Self::new(producers)
    }
}

/// Combines the fixed topology with the fetched one.
///
/// Every fixed producer is kept, followed by the fetched producers whose (address, port) does not already appear in
/// the fixed topology. Within each input only the first occurrence of a key is kept. An absent input is treated as an
/// empty one.
pub fn merge(fixed: Option<&Topology>, fetched: Option<&Topology>) -> Topology {
    let mut seen = HashSet::new();
    let producers = fixed
        .into_iter()
        .chain(fetched)
        .flat_map(|t| t.producers.iter())
        .filter(|p| seen.insert(p.key()))
        .cloned()
        .collect::<Vec<_>>();
    Topology::new(producers)
}

#[cfg(test)]
mod test {
    use super::*;

    fn topology(entries: &[(&str, u16, u32)]) -> Topology {
        entries
            .iter()
            .map(|(addr, port, valency)| Producer::new(*addr, *port, *valency))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn fixed_entries_take_precedence() {
        let fixed = topology(&[("a.example", 3001, 2)]);
        let fetched = topology(&[("b.example", 3001, 1), ("a.example", 3001, 1)]);
        let merged = merge(Some(&fixed), Some(&fetched));
        assert_eq!(merged, topology(&[("a.example", 3001, 2), ("b.example", 3001, 1)]));
    }

    #[test]
    fn same_address_on_another_port_is_a_different_peer() {
        let fixed = topology(&[("a.example", 3001, 1)]);
        let fetched = topology(&[("a.example", 6000, 1)]);
        let merged = merge(Some(&fixed), Some(&fetched));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_inputs_are_identities() {
        let t = topology(&[("a.example", 3001, 1), ("b.example", 3002, 1)]);
        assert_eq!(merge(None, Some(&t)), t);
        assert_eq!(merge(Some(&t), None), t);
        assert_eq!(merge(Some(&Topology::default()), Some(&t)), t);
        assert_eq!(merge(Some(&t), Some(&Topology::default())), t);
        assert!(merge(None, None).is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let fixed = topology(&[("a.example", 3001, 1)]);
        let fetched = topology(&[("b.example", 3001, 1), ("a.example", 3001, 3)]);
        let once = merge(Some(&fixed), Some(&fetched));
        let twice = merge(Some(&fixed), Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn first_occurrence_wins_within_one_input() {
        let fixed = topology(&[("a.example", 3001, 1), ("a.example", 3001, 5)]);
        let fetched = topology(&[("b.example", 3001, 1), ("b.example", 3001, 7)]);
        let merged = merge(Some(&fixed), Some(&fetched));
        assert_eq!(merged, topology(&[("a.example", 3001, 1), ("b.example", 3001, 1)]));
    }

    #[test]
    fn it_reads_the_node_topology_format() {
        let json = r#"{"Producers":[{"addr":"a.example","port":3001,"valency":2},{"addr":"1.2.3.4","port":6000}]}"#;
        let t: Topology = serde_json::from_str(json).unwrap();
        assert_eq!(t, topology(&[("a.example", 3001, 2), ("1.2.3.4", 6000, 1)]));

        let t: Topology = serde_json::from_str("{}").unwrap();
        assert!(t.is_empty());
    }
}
