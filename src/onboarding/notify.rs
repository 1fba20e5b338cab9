//! Toast and router collaborators.
//!
//! The wizard only decides *when* to show a toast or change route and *what*
//! it says; rendering belongs to whoever implements these traits.

use std::sync::Mutex;

use serde::Serialize;

use super::state::WizardStep;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Where the router should go next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum NavTarget {
    /// A named in-app route, e.g. `/onboarding/step3` or `/login`.
    Route(String),
    /// An absolute URL outside the app (the dashboard).
    External(String),
}

impl NavTarget {
    pub fn step(step: WizardStep) -> Self {
        Self::Route(step.route())
    }

    pub fn login() -> Self {
        Self::Route("/login".to_string())
    }
}

impl std::fmt::Display for NavTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Route(path) => write!(f, "{path}"),
            Self::External(url) => write!(f, "{url}"),
        }
    }
}

/// Notification/toast service.
pub trait Notifier: Send + Sync {
    fn show_toast(&self, kind: ToastKind, message: &str);
}

/// Router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavTarget);
}

/// Records every toast and navigation request, in order.
#[derive(Debug, Default)]
pub struct RecordingCollaborator {
    toasts: Mutex<Vec<(ToastKind, String)>>,
    navigations: Mutex<Vec<NavTarget>>,
}

impl RecordingCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn navigations(&self) -> Vec<NavTarget> {
        self.navigations.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last_toast(&self) -> Option<(ToastKind, String)> {
        self.toasts().pop()
    }
}

impl Notifier for RecordingCollaborator {
    fn show_toast(&self, kind: ToastKind, message: &str) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push((kind, message.to_string()));
        }
    }
}

impl Navigator for RecordingCollaborator {
    fn navigate(&self, target: NavTarget) {
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(target);
        }
    }
}
