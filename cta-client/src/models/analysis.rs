//! Analysis results
//!
//! One result per analysis kind. A successful analysis replaces the
//! previous result wholesale; results are never merged.

use cta_common::api::{
    Diagnostics, GlossaryCounts, LabelMap, OraccRequest, OraccResponse, SignCounts, TableResponse,
    WordCounts,
};
use cta_common::AnalysisKind;

/// ORACC layout toggles sent with every Oracc analysis
///
/// Both default to off until the user toggles them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OraccOptions {
    pub obverse_reverse: bool,
    pub columns: bool,
}

impl From<OraccOptions> for OraccRequest {
    fn from(options: OraccOptions) -> Self {
        OraccRequest {
            obverse_reverse: options.obverse_reverse,
            columns: options.columns,
        }
    }
}

/// Kind-tagged analysis payload
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Signs {
        table: LabelMap<SignCounts>,
        diagnostics: Diagnostics,
    },
    Words {
        table: LabelMap<WordCounts>,
        diagnostics: Diagnostics,
    },
    Glossary {
        table: LabelMap<GlossaryCounts>,
        diagnostics: Diagnostics,
    },
    Oracc {
        /// Pre-rendered markup, passed through untouched
        html: String,
        /// Plain ATF text, when the server includes it
        text: Option<String>,
        diagnostics: Diagnostics,
    },
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::Signs { .. } => AnalysisKind::Signs,
            AnalysisResult::Words { .. } => AnalysisKind::Words,
            AnalysisResult::Glossary { .. } => AnalysisKind::Glossary,
            AnalysisResult::Oracc { .. } => AnalysisKind::Oracc,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            AnalysisResult::Signs { diagnostics, .. }
            | AnalysisResult::Words { diagnostics, .. }
            | AnalysisResult::Glossary { diagnostics, .. }
            | AnalysisResult::Oracc { diagnostics, .. } => diagnostics,
        }
    }

    /// Number of table rows; `None` for Oracc markup
    pub fn row_count(&self) -> Option<usize> {
        match self {
            AnalysisResult::Signs { table, .. } => Some(table.len()),
            AnalysisResult::Words { table, .. } => Some(table.len()),
            AnalysisResult::Glossary { table, .. } => Some(table.len()),
            AnalysisResult::Oracc { .. } => None,
        }
    }
}

impl From<TableResponse<SignCounts>> for AnalysisResult {
    fn from(response: TableResponse<SignCounts>) -> Self {
        AnalysisResult::Signs {
            diagnostics: Diagnostics::from_value(&response.syntax_errors),
            table: response.analysis,
        }
    }
}

impl From<TableResponse<WordCounts>> for AnalysisResult {
    fn from(response: TableResponse<WordCounts>) -> Self {
        AnalysisResult::Words {
            diagnostics: Diagnostics::from_value(&response.syntax_errors),
            table: response.analysis,
        }
    }
}

impl From<TableResponse<GlossaryCounts>> for AnalysisResult {
    fn from(response: TableResponse<GlossaryCounts>) -> Self {
        AnalysisResult::Glossary {
            diagnostics: Diagnostics::from_value(&response.syntax_errors),
            table: response.analysis,
        }
    }
}

impl From<OraccResponse> for AnalysisResult {
    fn from(response: OraccResponse) -> Self {
        AnalysisResult::Oracc {
            diagnostics: Diagnostics::from_value(&response.syntax_errors),
            html: response.as_html_data,
            text: response.analysis,
        }
    }
}
