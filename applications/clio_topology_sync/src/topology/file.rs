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

use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use super::Topology;
use crate::error::TopologyFileError;

/// Reads the topology stored at `path`.
pub fn read_topology_from_file<P: AsRef<Path>>(path: P) -> Result<Topology, TopologyFileError> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|source| TopologyFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&contents).map_err(|source| TopologyFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the topology to `path`, replacing any existing file.
///
/// The topology is first written to a hidden sibling file, which is then renamed over `path`.
pub fn write_topology_to_file<P: AsRef<Path>>(topology: &Topology, path: P) -> Result<(), TopologyFileError> {
    let path = path.as_ref();
    let size = topology.len();
    let buf = serde_json::to_vec_pretty(topology).map_err(|source| TopologyFileError::Encode { size, source })?;

    let write_err = |source| TopologyFileError::Write {
        size,
        path: path.to_path_buf(),
        source,
    };
    let tmp_path = temporary_sibling(path);
    let result = fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(&buf)?;
            file.write_all(b"\n")?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&tmp_path, path));
    if let Err(err) = result {
        let _ignore = fs::remove_file(&tmp_path);
        return Err(write_err(err));
    }
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| "topology.json".as_ref()));
    name.push(".tmp");
    path.with_file_name(name)
}
