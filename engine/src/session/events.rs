use crate::protocol::EngineCommand;

/// Everything a session observes, republished to subscribers in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A line written to the engine.
    CommandSent(String),
    /// The line that answered an in-flight command.
    CommandCompleted {
        command: EngineCommand,
        response: String,
    },
    /// Any engine line that did not answer the in-flight command.
    VerboseLine(String),
}
