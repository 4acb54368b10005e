//! Optimistic concurrency expectations for append-only stock streams.

/// Optimistic concurrency expectation for one stock subject's transaction stream.
///
/// A stream version is the number of transactions recorded for the subject.
/// Writers that read a subject's stock before deciding what to append carry an
/// `Exact` expectation so a concurrent writer invalidates their decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (corrections, opening balances on a fresh subject).
    Any,
    /// Require the stream to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
