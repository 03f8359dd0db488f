//! Linkage commitment hashing.
//!
//! A linkage hash binds a shadow record to its primary record: a BLAKE3
//! digest over a canonical byte encoding of the credential fields, the
//! recipient, and the primary record identifier. The encoding is
//! length-prefixed with a fixed field order so two components encoding the
//! same logical event always produce byte-identical input, and therefore
//! byte-identical hashes.

use cachet_core::types::LinkageHash;

use crate::error::LinkageError;

/// Domain separation prefix for linkage digests.
const LINKAGE_DOMAIN: &[u8] = b"cachet.linkage.v1";

/// Upper bound on any single encoded field.
const MAX_FIELD_LEN: usize = 1024;

/// Compute the linkage commitment for a credential issuance.
///
/// `context_id` is the primary record's ledger-native identifier; `extra`
/// carries optional bound bytes such as a document hash, and may be empty.
/// Pure function: identical inputs yield the identical hash on every call
/// and across process restarts.
pub fn compute_linkage(
    title: &str,
    issuer: &str,
    recipient: &str,
    context_id: &str,
    extra: &[u8],
) -> Result<LinkageHash, LinkageError> {
    let payload = encode(title, issuer, recipient, context_id, extra)?;
    Ok(LinkageHash::from_bytes(*blake3::hash(&payload).as_bytes()))
}

/// Recompute a linkage commitment and compare it to an expected hash.
pub fn verify_linkage(
    title: &str,
    issuer: &str,
    recipient: &str,
    context_id: &str,
    extra: &[u8],
    expected: &LinkageHash,
) -> Result<bool, LinkageError> {
    let computed = compute_linkage(title, issuer, recipient, context_id, extra)?;
    Ok(computed == *expected)
}

/// Canonical encoding: domain prefix, then each field as a u32 big-endian
/// length followed by the raw bytes, in fixed order.
fn encode(
    title: &str,
    issuer: &str,
    recipient: &str,
    context_id: &str,
    extra: &[u8],
) -> Result<Vec<u8>, LinkageError> {
    check_field("title", title.as_bytes(), true)?;
    check_field("issuer", issuer.as_bytes(), true)?;
    check_field("recipient", recipient.as_bytes(), true)?;
    check_field("context_id", context_id.as_bytes(), true)?;
    check_field("extra", extra, false)?;

    let mut payload = Vec::with_capacity(
        LINKAGE_DOMAIN.len()
            + 5 * 4
            + title.len()
            + issuer.len()
            + recipient.len()
            + context_id.len()
            + extra.len(),
    );
    payload.extend_from_slice(LINKAGE_DOMAIN);
    for field in [
        title.as_bytes(),
        issuer.as_bytes(),
        recipient.as_bytes(),
        context_id.as_bytes(),
        extra,
    ] {
        payload.extend_from_slice(&(field.len() as u32).to_be_bytes());
        payload.extend_from_slice(field);
    }
    Ok(payload)
}

fn check_field(name: &'static str, bytes: &[u8], required: bool) -> Result<(), LinkageError> {
    if required && bytes.is_empty() {
        return Err(LinkageError::EmptyField(name));
    }
    if bytes.len() > MAX_FIELD_LEN {
        return Err(LinkageError::FieldTooLong {
            field: name,
            max: MAX_FIELD_LEN,
            len: bytes.len(),
        });
    }
    Ok(())
}
