// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Address form conversion
//!
//! One underlying hash160 has three interchangeable textual forms: the
//! `simpleledger:` cashaddr form, the `bitcoincash:` cashaddr form, and the
//! legacy base58check form. Backends and callers use them inconsistently, so
//! the data services normalize through this module.
//!
//! The cashaddr codec (base32 payload with a 40-bit BCH checksum) is
//! implemented here; legacy base58check goes through `bs58`.

use thiserror::Error;

const CASH_PREFIX: &str = "bitcoincash";
const SLP_PREFIX: &str = "simpleledger";

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

// Legacy base58check version bytes.
const LEGACY_P2PKH_VERSION: u8 = 0x00;
const LEGACY_P2SH_VERSION: u8 = 0x05;

/// Errors decoding or converting an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Input is not a recognizable cashaddr or legacy address
    #[error("unrecognized address format: {0}")]
    UnrecognizedFormat(String),

    /// Checksum validation failed
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// Payload bits do not pack into whole bytes, or carry set high bits
    #[error("malformed address payload")]
    InvalidPayload,

    /// Version byte names a script type or hash size this gateway does not handle
    #[error("unsupported address version: {0:#04x}")]
    UnsupportedVersion(u8),
}

/// Script type encoded in an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Pay-to-public-key-hash
    P2pkh,
    /// Pay-to-script-hash
    P2sh,
}

/// An address decoded to its script type and hash160
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    /// Script type
    pub kind: AddressKind,
    /// The 20-byte hash160 payload
    pub hash: [u8; 20],
}

/// The three textual forms of one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressForms {
    /// `simpleledger:` cashaddr form
    pub slp_address: String,
    /// `bitcoincash:` cashaddr form
    pub cash_address: String,
    /// Legacy base58check form
    pub legacy_address: String,
}

impl AddressForms {
    /// The cashaddr payload without its `bitcoincash:` prefix, as stored in
    /// backend base-chain input records.
    pub fn cash_payload(&self) -> &str {
        self.cash_address
            .strip_prefix("bitcoincash:")
            .unwrap_or(&self.cash_address)
    }
}

/// Decode any supported address form.
///
/// Accepts prefixed cashaddr (`simpleledger:` or `bitcoincash:`), bare
/// cashaddr payloads (both prefixes are tried against the checksum), and
/// legacy base58check.
pub fn decode(address: &str) -> Result<DecodedAddress, AddressError> {
    let lowered = address.to_lowercase();

    if let Some((prefix, payload)) = lowered.split_once(':') {
        return decode_cashaddr(prefix, payload);
    }

    // Bare cashaddr payloads carry no prefix; the checksum commits to it, so
    // try both known prefixes before falling back to legacy base58.
    if let Ok(decoded) = decode_cashaddr(CASH_PREFIX, &lowered) {
        return Ok(decoded);
    }
    if let Ok(decoded) = decode_cashaddr(SLP_PREFIX, &lowered) {
        return Ok(decoded);
    }

    decode_legacy(address)
        .map_err(|_| AddressError::UnrecognizedFormat(address.to_string()))
}

/// Derive all three forms from any supported input form.
pub fn address_forms(address: &str) -> Result<AddressForms, AddressError> {
    let decoded = decode(address)?;
    Ok(AddressForms {
        slp_address: encode_cashaddr(SLP_PREFIX, &decoded),
        cash_address: encode_cashaddr(CASH_PREFIX, &decoded),
        legacy_address: encode_legacy(&decoded),
    })
}

/// Convert any supported form to the `simpleledger:` form.
pub fn to_slp_address(address: &str) -> Result<String, AddressError> {
    Ok(encode_cashaddr(SLP_PREFIX, &decode(address)?))
}

/// Convert any supported form to the `bitcoincash:` form.
pub fn to_cash_address(address: &str) -> Result<String, AddressError> {
    Ok(encode_cashaddr(CASH_PREFIX, &decode(address)?))
}

/// Convert any supported form to the legacy base58check form.
pub fn to_legacy_address(address: &str) -> Result<String, AddressError> {
    Ok(encode_legacy(&decode(address)?))
}

fn decode_cashaddr(prefix: &str, payload: &str) -> Result<DecodedAddress, AddressError> {
    let mut values = Vec::with_capacity(payload.len());
    for ch in payload.bytes() {
        let value = CHARSET
            .iter()
            .position(|&c| c == ch)
            .ok_or_else(|| AddressError::UnrecognizedFormat(payload.to_string()))?;
        values.push(value as u8);
    }

    if values.len() < 9 {
        return Err(AddressError::InvalidPayload);
    }

    if polymod(&checksum_input(prefix, &values)) != 0 {
        return Err(AddressError::ChecksumMismatch);
    }

    // Strip the eight checksum symbols, repack 5-bit groups into bytes.
    let data = &values[..values.len() - 8];
    let bytes = convert_bits(data, 5, 8, false)?;

    let (&version, hash) = bytes
        .split_first()
        .ok_or(AddressError::InvalidPayload)?;
    let kind = match version {
        0x00 => AddressKind::P2pkh,
        0x08 => AddressKind::P2sh,
        other => return Err(AddressError::UnsupportedVersion(other)),
    };

    let hash: [u8; 20] = hash
        .try_into()
        .map_err(|_| AddressError::InvalidPayload)?;
    Ok(DecodedAddress { kind, hash })
}

fn encode_cashaddr(prefix: &str, decoded: &DecodedAddress) -> String {
    let version = match decoded.kind {
        AddressKind::P2pkh => 0x00,
        AddressKind::P2sh => 0x08,
    };

    let mut bytes = Vec::with_capacity(21);
    bytes.push(version);
    bytes.extend_from_slice(&decoded.hash);

    // 8-to-5 repack of a 21-byte payload is exact after padding.
    let mut values = convert_bits(&bytes, 8, 5, true).unwrap_or_default();

    let mut checksum_data = checksum_input(prefix, &values);
    checksum_data.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checksum_data);
    for i in 0..8 {
        values.push(((checksum >> (5 * (7 - i))) & 0x1f) as u8);
    }

    let mut out = String::with_capacity(prefix.len() + 1 + values.len());
    out.push_str(prefix);
    out.push(':');
    for value in values {
        out.push(char::from(CHARSET[usize::from(value)]));
    }
    out
}

fn decode_legacy(address: &str) -> Result<DecodedAddress, AddressError> {
    let bytes = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|_| AddressError::ChecksumMismatch)?;

    let (&version, hash) = bytes
        .split_first()
        .ok_or(AddressError::InvalidPayload)?;
    let kind = match version {
        LEGACY_P2PKH_VERSION => AddressKind::P2pkh,
        LEGACY_P2SH_VERSION => AddressKind::P2sh,
        other => return Err(AddressError::UnsupportedVersion(other)),
    };

    let hash: [u8; 20] = hash
        .try_into()
        .map_err(|_| AddressError::InvalidPayload)?;
    Ok(DecodedAddress { kind, hash })
}

fn encode_legacy(decoded: &DecodedAddress) -> String {
    let version = match decoded.kind {
        AddressKind::P2pkh => LEGACY_P2PKH_VERSION,
        AddressKind::P2sh => LEGACY_P2SH_VERSION,
    };
    bs58::encode(&decoded.hash)
        .with_check_version(version)
        .into_string()
}

/// Checksum preimage: prefix low bits, separator zero, payload symbols.
fn checksum_input(prefix: &str, values: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(prefix.len() + 1 + values.len());
    data.extend(prefix.bytes().map(|b| b & 0x1f));
    data.push(0);
    data.extend_from_slice(values);
    data
}

/// The cashaddr BCH checksum over 5-bit symbols.
fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x0007_ffff_ffff) << 5) ^ u64::from(d);
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, AddressError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let v = u32::from(value);
        if v >> from != 0 {
            return Err(AddressError::InvalidPayload);
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(AddressError::InvalidPayload);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // First two test vectors of the cashaddr specification.
    const P2PKH_CASH: &str = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";
    const P2PKH_LEGACY: &str = "1BpEi6DfDAUFd7GtittLSdBeYJvcoaVggu";
    const P2SH_CASH: &str = "bitcoincash:ppm2qsznhks23z7629mms6s4cwef74vcwvn0h829pq";
    const P2SH_LEGACY: &str = "3CWFddi6m4ndiGyKqzYvsFYagqDLPVMTzC";

    #[test]
    fn cash_to_legacy_vector() {
        assert_eq!(to_legacy_address(P2PKH_CASH).expect("decodes"), P2PKH_LEGACY);
        assert_eq!(to_legacy_address(P2SH_CASH).expect("decodes"), P2SH_LEGACY);
    }

    #[test]
    fn legacy_to_cash_vector() {
        assert_eq!(to_cash_address(P2PKH_LEGACY).expect("decodes"), P2PKH_CASH);
        assert_eq!(to_cash_address(P2SH_LEGACY).expect("decodes"), P2SH_CASH);
    }

    #[test]
    fn cash_reencode_round_trip() {
        assert_eq!(to_cash_address(P2PKH_CASH).expect("decodes"), P2PKH_CASH);
    }

    #[test]
    fn slp_form_round_trips() {
        let forms = address_forms(P2PKH_CASH).expect("decodes");
        assert!(forms.slp_address.starts_with("simpleledger:"));
        assert_eq!(
            to_cash_address(&forms.slp_address).expect("decodes"),
            P2PKH_CASH
        );
        assert_eq!(forms.legacy_address, P2PKH_LEGACY);
    }

    #[test]
    fn bare_payload_accepted() {
        let bare = P2PKH_CASH.split_once(':').expect("prefixed").1;
        assert_eq!(to_cash_address(bare).expect("decodes"), P2PKH_CASH);
    }

    #[test]
    fn cash_payload_strips_prefix() {
        let forms = address_forms(P2PKH_CASH).expect("decodes");
        assert_eq!(
            forms.cash_payload(),
            P2PKH_CASH.split_once(':').expect("prefixed").1
        );
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut corrupted = P2PKH_CASH.to_string();
        corrupted.pop();
        corrupted.push('q');
        assert_eq!(decode(&corrupted), Err(AddressError::ChecksumMismatch));
    }

    #[test]
    fn uppercase_cashaddr_accepted() {
        let upper = P2PKH_CASH.to_uppercase();
        assert_eq!(to_cash_address(&upper).expect("decodes"), P2PKH_CASH);
    }

    #[test]
    fn garbage_rejected() {
        assert!(decode("not-an-address").is_err());
        assert!(decode("").is_err());
    }
}
