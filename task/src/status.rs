/// Lifecycle states of a task instance.
///
/// Readiness here is structural, not content-based: a task may need to
/// read files an upstream producer is still writing just to discover its
/// own inputs, so "can I know my inputs yet" is kept separate from
/// signature-based staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// At least one upstream task has not completed yet.
    Waiting,
    /// Upstreams are done, but the config document has not been parsed.
    NotConfigured,
    /// Configuration, inputs and signature are resolved; eligible to run.
    Ready,
    /// Nothing to do; execution is bypassed entirely. Terminal.
    Skip,
}

/// Answer returned by a status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not runnable yet; ask again after other tasks make progress.
    AskLater,
    /// Runnable now.
    Run,
    /// Does not need to run: already up to date, or nothing to do.
    Skip,
}
