use crate::notifier::Notifier;
use crate::source::MetadataSource;

/// Collaborators of a run, threaded through the table and relation passes.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub source: &'a dyn MetadataSource,
    pub notifier: &'a dyn Notifier,
}

impl<'a> Context<'a> {
    pub fn new(source: &'a dyn MetadataSource, notifier: &'a dyn Notifier) -> Self {
        Self { source, notifier }
    }
}
