/// What to do with a line that does not parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MalformedLinePolicy {
    /// Fail the whole manifest on the first bad line.
    #[default]
    Reject,
    /// Drop the line, record a [`Diagnostic`](crate::Diagnostic), keep going.
    Skip,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    pub malformed: MalformedLinePolicy,
}

impl ParseOptions {
    pub fn malformed(mut self, policy: MalformedLinePolicy) -> Self {
        self.malformed = policy;
        self
    }

    pub fn skip_malformed() -> Self { Self::default().malformed(MalformedLinePolicy::Skip) }
}
