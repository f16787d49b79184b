use std::fs;
use std::path::Path;

use regex::Regex;
use serde_bencode::value::Value;
use sha1::{Digest, Sha1};

use crate::error::Error;
use crate::model::ArtifactKind;

const BTIH_PATTERN: &str = r"urn:btih:([0-9A-Fa-f]{40})";

/// Identity of a `.torrent` descriptor.
///
/// Magnet-derived stubs carry the hash precomputed in
/// `magnet-info.info_hash`; full descriptors hash the canonical bencode
/// re-encoding of the `info` dictionary.
pub fn torrent_identity(path: &Path) -> Result<(String, ArtifactKind), Error> {
    let bytes = fs::read(path)?;
    let root: Value = serde_bencode::from_bytes(&bytes)
        .map_err(|err| malformed(path, format!("bencode decode failed: {err}")))?;
    let dict = match &root {
        Value::Dict(dict) => dict,
        _ => return Err(malformed(path, "top-level value is not a dictionary".into())),
    };

    if let Some(Value::Dict(magnet_info)) = dict.get(b"magnet-info".as_ref()) {
        return match magnet_info.get(b"info_hash".as_ref()) {
            Some(Value::Bytes(hash)) => Ok((hex::encode(hash), ArtifactKind::MagnetDescriptor)),
            _ => Err(malformed(path, "magnet-info without info_hash".into())),
        };
    }

    match dict.get(b"info".as_ref()) {
        Some(info) => {
            let canonical = serde_bencode::to_bytes(info)
                .map_err(|err| malformed(path, format!("bencode re-encode failed: {err}")))?;
            let identity = hex::encode(Sha1::digest(&canonical));
            Ok((identity, ArtifactKind::DescriptorFile))
        }
        None => Err(malformed(path, "no info dictionary".into())),
    }
}

/// Identity of a magnet-link text file: the `xt=urn:btih` parameter,
/// lowercased.
pub fn magnet_identity(path: &Path) -> Result<String, Error> {
    let text = fs::read_to_string(path)?;
    let pattern = Regex::new(BTIH_PATTERN).expect("valid pattern");
    match pattern.captures(&text) {
        Some(caps) => Ok(caps[1].to_ascii_lowercase()),
        None => Err(malformed(path, "no urn:btih parameter".into())),
    }
}

fn malformed(path: &Path, reason: String) -> Error {
    Error::MalformedDescriptor {
        path: path.to_path_buf(),
        reason,
    }
}
