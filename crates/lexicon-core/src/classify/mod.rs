//! Placement of newly added terms.
//!
//! A [`Classifier`] proposes a parent label for a new term given the
//! taxonomy outline. [`place_term`] validates that proposal against the
//! catalog and falls back to the root whenever it cannot be used.

mod prompts;

pub use prompts::{build_placement_prompt, NO_PARENT, PLACEMENT_SYSTEM_PROMPT};

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::config::ROOT_LABEL;
use crate::llm::{LLMError, LLM};
use crate::model::normalize_label;
use crate::remote::Provenance;

/// Trait for the classification collaborator.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Proposes a parent label for `label`. `Ok(None)` means no confident
    /// choice.
    async fn classify(&self, label: &str, taxonomy: &str) -> Result<Option<String>, LLMError>;
}

/// Where a new term goes and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub parent: String,
    pub provenance: Provenance,
}

impl Placement {
    fn root(catalog: &Catalog) -> Self {
        Self {
            parent: catalog
                .root()
                .map(|t| t.label.clone())
                .unwrap_or_else(|| ROOT_LABEL.to_string()),
            provenance: Provenance::Default,
        }
    }
}

/// Classifier that never proposes a parent, so every new term lands under
/// the root. Used when no model is configured.
pub struct RootOnly;

#[async_trait]
impl Classifier for RootOnly {
    async fn classify(&self, _label: &str, _taxonomy: &str) -> Result<Option<String>, LLMError> {
        Ok(None)
    }
}

/// Classifier that asks an LLM.
pub struct LlmClassifier<L: LLM> {
    llm: L,
}

impl<L: LLM> LlmClassifier<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }
}

#[async_trait]
impl<L: LLM> Classifier for LlmClassifier<L> {
    async fn classify(&self, label: &str, taxonomy: &str) -> Result<Option<String>, LLMError> {
        let prompt = build_placement_prompt(label, taxonomy);
        tracing::debug!(model = self.llm.model(), %label, "classifying term");

        let reply = self
            .llm
            .complete_with_system(PLACEMENT_SYSTEM_PROMPT, &prompt)
            .await?;

        Ok(extract_label(&reply))
    }
}

/// Chooses the parent for `label`, never failing: any classifier error,
/// empty answer, unknown label or self-reference lands under the root.
pub async fn place_term(catalog: &Catalog, classifier: &dyn Classifier, label: &str) -> Placement {
    let label = normalize_label(label);
    let proposed = propose_parent(classifier, &label, &catalog.describe()).await;
    resolve_placement(catalog, &label, proposed.as_deref())
}

/// Asks `classifier` for a parent of `label` given the `taxonomy` outline.
///
/// Needs no catalog access, so callers can release their catalog lock for
/// the duration of the model call. Errors and empty answers become `None`.
pub async fn propose_parent(classifier: &dyn Classifier, label: &str, taxonomy: &str) -> Option<String> {
    match classifier.classify(label, taxonomy).await {
        Ok(Some(parent)) => Some(parent),
        Ok(None) => {
            tracing::info!(%label, "classifier had no answer, using root");
            None
        }
        Err(e) => {
            tracing::warn!(%label, error = %e, "classifier failed, using root");
            None
        }
    }
}

/// Checks a proposed parent against `catalog`. Unknown labels and
/// self-references fall back to the root.
pub fn resolve_placement(catalog: &Catalog, label: &str, proposed: Option<&str>) -> Placement {
    let Some(proposed) = proposed else {
        return Placement::root(catalog);
    };

    let label = normalize_label(label);
    match catalog.graph().find_by_label(proposed) {
        Some(parent) if parent.label != label => Placement {
            parent: parent.label.clone(),
            provenance: Provenance::Llm,
        },
        _ => {
            tracing::info!(%label, %proposed, "classifier proposed an unknown parent, using root");
            Placement::root(catalog)
        }
    }
}

/// Pulls a single label out of a model reply.
///
/// Strips code fences and quotes, takes the first non-empty line and
/// normalizes it. `NONE` and empty replies become `None`.
fn extract_label(reply: &str) -> Option<String> {
    let line = reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("```"))?;

    let cleaned = line
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c == '*')
        .trim_start_matches('-')
        .trim();

    let label = normalize_label(cleaned);
    if label.is_empty() || label == NO_PARENT {
        None
    } else {
        Some(label)
    }
}
