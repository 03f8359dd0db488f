use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Identifier for a ledger kind (e.g. "mainline", "zk-mirror").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerId(pub String);

impl LedgerId {
    /// Create a new ledger identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger-native identifier for a committed record (an account key, a
/// transaction hash, a numeric id rendered as text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a new record identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte commitment hash linking a shadow record to its primary record.
///
/// Serializes as lowercase hex so independently-computed hashes can be
/// compared for equality by any third party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkageHash(#[serde(with = "hex::serde")] pub [u8; 32]);

impl LinkageHash {
    /// Wrap a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidHashEncoding(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CoreError::InvalidHashEncoding(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for LinkageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An immutable credential draft handed to the issuance orchestrator.
///
/// Construct through [`CredentialDraft::builder`], which rejects drafts
/// missing required fields before they ever reach a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDraft {
    /// Credential title (e.g. "Certificate of Completion").
    pub title: String,
    /// Issuer display name.
    pub issuer: String,
    /// Recipient identifier (wallet address, DID, email hash).
    pub recipient: String,
    /// Issuance timestamp.
    pub issued_at: DateTime<Utc>,
    /// Optional content-addressed hash of a supporting document.
    pub document_hash: Option<String>,
}

impl CredentialDraft {
    /// Create a new CredentialDraftBuilder.
    pub fn builder() -> CredentialDraftBuilder {
        CredentialDraftBuilder::default()
    }

    /// Validate the draft.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::MissingField("title".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(CoreError::MissingField("issuer".into()));
        }
        if self.recipient.trim().is_empty() {
            return Err(CoreError::MissingField("recipient".into()));
        }
        Ok(())
    }
}

/// Builder for constructing CredentialDraft instances.
#[derive(Default)]
pub struct CredentialDraftBuilder {
    title: Option<String>,
    issuer: Option<String>,
    recipient: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    document_hash: Option<String>,
}

impl CredentialDraftBuilder {
    /// Set the credential title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the issuer display name.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the recipient identifier.
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Set the issuance timestamp (defaults to now).
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    /// Attach a content-addressed document hash.
    pub fn document_hash(mut self, hash: impl Into<String>) -> Self {
        self.document_hash = Some(hash.into());
        self
    }

    /// Build the CredentialDraft.
    pub fn build(self) -> Result<CredentialDraft, CoreError> {
        let draft = CredentialDraft {
            title: self
                .title
                .ok_or_else(|| CoreError::MissingField("title".into()))?,
            issuer: self
                .issuer
                .ok_or_else(|| CoreError::MissingField("issuer".into()))?,
            recipient: self
                .recipient
                .ok_or_else(|| CoreError::MissingField("recipient".into()))?,
            issued_at: self.issued_at.unwrap_or_else(Utc::now),
            document_hash: self.document_hash,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// What an adapter is asked to write.
///
/// The shadow variant carries only a recipient and a linkage commitment,
/// never the raw credential content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordPayload {
    /// Full credential content (primary path).
    Credential(CredentialDraft),
    /// Privacy-layer shadow record (linkage commitment only).
    Shadow {
        recipient: String,
        linkage: LinkageHash,
    },
    /// Revocation of a previously committed record.
    Revocation { target: RecordId },
}

impl RecordPayload {
    /// Short kind label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "credential",
            Self::Shadow { .. } => "shadow",
            Self::Revocation { .. } => "revocation",
        }
    }
}

/// Reference to one committed record on one ledger.
///
/// Produced exactly once per successful submit and never mutated; a
/// correction is a new ref, never an edit of an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecordRef {
    /// Ledger the record lives on.
    pub ledger: LedgerId,
    /// Ledger-native record identifier.
    pub record_id: RecordId,
    /// Opaque proof evidence emitted by the ledger (signature, proof blob).
    pub proof: Vec<u8>,
    /// Browsable explorer reference, when the ledger knows one.
    pub explorer_url: Option<String>,
}

/// Per-issuance policy: where the primary record goes and whether a
/// privacy-layer shadow record is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePolicy {
    /// Ledger that receives the authoritative primary record.
    pub primary: LedgerId,
    /// Whether to also write a privacy-layer shadow record.
    pub want_privacy: bool,
}

impl IssuancePolicy {
    /// Policy writing only a primary record.
    pub fn new(primary: LedgerId) -> Self {
        Self {
            primary,
            want_privacy: false,
        }
    }

    /// Request the privacy layer as well.
    pub fn with_privacy(mut self) -> Self {
        self.want_privacy = true;
        self
    }
}

/// How the issuance concluded with respect to the privacy layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusHint {
    /// Only a primary record was requested and written.
    PrimaryOnly,
    /// Primary and privacy records were both committed.
    MultiLedger,
    /// Privacy layer was requested but could not be committed.
    PrivacyDegraded,
}

impl fmt::Display for ConsensusHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryOnly => write!(f, "primary-only"),
            Self::MultiLedger => write!(f, "multi-ledger"),
            Self::PrivacyDegraded => write!(f, "privacy-degraded"),
        }
    }
}

/// The committed outcome of one issuance. A plain value object; callers
/// persist it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceResult {
    /// The authoritative primary record.
    pub primary: LedgerRecordRef,
    /// The privacy-layer shadow record, when committed.
    pub privacy: Option<LedgerRecordRef>,
    /// Linkage commitment binding the shadow record to the primary.
    pub linkage: Option<LinkageHash>,
    /// How the issuance concluded.
    pub hint: ConsensusHint,
}

/// The outcome of asking one ledger whether a record is currently valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Ledger that was queried.
    pub ledger: LedgerId,
    /// Whether the ledger confirmed validity.
    pub is_valid: bool,
    /// When the check completed.
    pub checked_at: DateTime<Utc>,
    /// Error detail when the ledger could not be asked.
    pub error: Option<String>,
}

impl VerificationOutcome {
    /// True when this outcome is a definitive confirmation: the ledger
    /// answered and said yes.
    pub fn confirmed(&self) -> bool {
        self.is_valid && self.error.is_none()
    }
}

/// Confidence classification derived from how many ledgers currently
/// confirm validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusTier {
    /// No ledger confirmed validity.
    None,
    /// Exactly one ledger confirmed validity.
    SingleChain,
    /// Two or more ledgers confirmed validity.
    MultiChain,
}

impl ConsensusTier {
    /// Map a count of confirming ledgers to a tier.
    pub fn from_valid_count(valid_count: usize) -> Self {
        match valid_count {
            0 => Self::None,
            1 => Self::SingleChain,
            _ => Self::MultiChain,
        }
    }
}

impl fmt::Display for ConsensusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::SingleChain => write!(f, "single-chain"),
            Self::MultiChain => write!(f, "multi-chain"),
        }
    }
}

/// A consensus verdict over every queried ledger. Ephemeral; recomputed
/// from live ledger state on every verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusVerdict {
    /// True when at least one ledger confirmed validity.
    pub is_valid: bool,
    /// Confidence tier.
    pub tier: ConsensusTier,
    /// One outcome per queried ledger, in query order.
    pub contributing: Vec<VerificationOutcome>,
}

impl ConsensusVerdict {
    /// Number of definitive confirmations among the outcomes.
    pub fn valid_count(&self) -> usize {
        self.contributing.iter().filter(|o| o.confirmed()).count()
    }
}
