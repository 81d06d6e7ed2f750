//! Enabled-action derivation
//!
//! Which controls a front end may offer is a pure function of the session,
//! the last successful analysis kind and whether an operation is running.
//! It is recomputed after every transition instead of toggled piecemeal.

use std::collections::BTreeSet;
use std::fmt;

use cta_common::{AnalysisKind, ExportFormat};

use super::session::UploadSession;

/// User-triggerable action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Upload,
    Analyze(AnalysisKind),
    Export(ExportFormat),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upload => f.write_str("upload"),
            Action::Analyze(kind) => write!(f, "analyze:{}", kind),
            Action::Export(format) => write!(f, "export:{}", format),
        }
    }
}

/// Set of currently enabled actions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }

    /// Export formats currently enabled
    pub fn exports(&self) -> Vec<ExportFormat> {
        self.iter()
            .filter_map(|action| match action {
                Action::Export(format) => Some(format),
                _ => None,
            })
            .collect()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Derive enabled actions from session state
///
/// - Nothing is enabled while an operation is in flight.
/// - Upload is always enabled otherwise.
/// - Analyses require an upload session.
/// - Exports require a session and a completed analysis; ATF follows Oracc,
///   CSV/XLSX follow the count tables.
pub fn enabled_actions(
    session: Option<&UploadSession>,
    last_kind: Option<AnalysisKind>,
    in_flight: bool,
) -> ActionSet {
    if in_flight {
        return ActionSet::default();
    }

    let mut actions = BTreeSet::new();
    actions.insert(Action::Upload);

    if session.is_some() {
        actions.extend(AnalysisKind::ALL.into_iter().map(Action::Analyze));

        if let Some(kind) = last_kind {
            actions.extend(
                ExportFormat::ALL
                    .into_iter()
                    .filter(|format| format.enabled_for(kind))
                    .map(Action::Export),
            );
        }
    }

    ActionSet(actions)
}
