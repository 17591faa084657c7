use thiserror::Error;

#[derive(Debug, Error)]
pub enum VotingError {
    /// Multisig members are structurally immutable and can never be the
    /// target of an add or kick vote. The message text is part of the admin
    /// API contract.
    #[error("Multisig members can't be voted on")]
    MultisigMember,

    /// The vote payload does not decode for its key (e.g. a member vote whose
    /// payload is not a canonical member serialization).
    #[error("invalid vote payload: {0}")]
    InvalidVote(String),

    /// This node already scheduled or cast an identical vote.
    #[error("vote already scheduled or cast")]
    DuplicateVote,

    /// The poll log or a snapshot store failed; fatal, the node must stop
    /// before its in-memory and on-disk images diverge.
    #[error("store error: {0}")]
    Store(#[from] rondo_store::StoreError),

    #[error("federation error: {0}")]
    Federation(#[from] rondo_federation::FederationError),

    /// Poll state and chain events disagree; indicates corruption or a
    /// protocol bug. Fatal.
    #[error("voting invariant violated: {0}")]
    InvariantViolation(String),
}
