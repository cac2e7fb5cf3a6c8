//! Decision status shared by vertices and transactions.

/// The status of a vertex or a transaction.
///
/// A status only ever moves forward: `Unknown` becomes `Processing` once the bytes are known
/// locally, and a fetched element is eventually decided as `Accepted` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Unknown,
    Processing,
    Rejected,
    Accepted,
}

impl Status {
    /// Whether the bytes of the element are available locally.
    pub fn fetched(&self) -> bool {
        *self != Status::Unknown
    }

    /// Whether consensus on the element has been reached.
    pub fn decided(&self) -> bool {
        matches!(self, Status::Accepted | Status::Rejected)
    }

    /// Whether moving from `self` to `next` respects the monotonic status order. Re-applying a
    /// decided status is allowed so that acceptance can be replayed after a crash.
    pub fn can_transition(&self, next: Status) -> bool {
        match (self, next) {
            (Status::Unknown, Status::Unknown) => false,
            (Status::Unknown, _) => true,
            (Status::Processing, Status::Accepted) | (Status::Processing, Status::Rejected) => {
                true
            }
            (Status::Accepted, Status::Accepted) | (Status::Rejected, Status::Rejected) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Status::Unknown => write!(f, "Unknown"),
            Status::Processing => write!(f, "Processing"),
            Status::Rejected => write!(f, "Rejected"),
            Status::Accepted => write!(f, "Accepted"),
        }
    }
}
