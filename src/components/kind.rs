use std::fmt;

/// Category a component is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Background dependency (database connector, cache, consumer loop).
    Service,
    /// Request-facing component (HTTP listener, gRPC server).
    Controller,
    /// The single controller owning the foreground loop.
    UiController,
}

impl ComponentKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentKind::Service => "service",
            ComponentKind::Controller => "controller",
            ComponentKind::UiController => "ui_controller",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentKind::Service => "service",
            ComponentKind::Controller => "controller",
            ComponentKind::UiController => "ui-controller",
        })
    }
}
