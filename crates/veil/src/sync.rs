//! Blocking wrapper around [`Masker`].
//!
//! For synchronous shells that do not run an async runtime of their own.

use tokio::runtime::{Builder, Runtime};

use crate::error::{MaskError, Result};
use crate::extract::{LanguageConfig, SyntaxParser};
use crate::masker::{MaskOutcome, Masker, MaskerBuilder};
use crate::store::{MappingEntry, SecretSource};

/// A [`Masker`] driven by its own current-thread runtime.
///
/// Do not use from inside an async context; blocking on the inner runtime
/// there panics.
#[derive(Debug)]
pub struct SyncMasker {
    runtime: Runtime,
    inner: Masker,
}

impl SyncMasker {
    /// Build a masker from `builder` on a fresh runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created or the build fails.
    pub fn build(builder: MaskerBuilder) -> Result<Self> {
        let runtime = new_runtime()?;
        let inner = runtime.block_on(builder.build())?;
        Ok(Self { runtime, inner })
    }

    /// The async masker inside.
    #[must_use]
    pub const fn inner(&self) -> &Masker {
        &self.inner
    }

    /// Where the installation secret came from.
    #[must_use]
    pub const fn secret_source(&self) -> &SecretSource {
        self.inner.secret_source()
    }

    /// Blocking [`Masker::auto_mask`].
    ///
    /// # Errors
    ///
    /// See [`Masker::auto_mask`].
    pub fn auto_mask<P>(
        &self,
        code: &str,
        parser: &P,
        language: &LanguageConfig,
        namespace: &str,
        include_properties: bool,
    ) -> Result<MaskOutcome>
    where
        P: SyntaxParser + ?Sized,
    {
        self.runtime.block_on(
            self.inner
                .auto_mask(code, parser, language, namespace, include_properties),
        )
    }

    /// Blocking [`Masker::select_mask`].
    ///
    /// # Errors
    ///
    /// See [`Masker::select_mask`].
    pub fn select_mask(
        &self,
        text: &str,
        selected: &[String],
        namespace: &str,
        language: Option<&str>,
    ) -> Result<MaskOutcome> {
        self.runtime
            .block_on(self.inner.select_mask(text, selected, namespace, language))
    }

    /// Blocking [`Masker::mask_selected_words`].
    ///
    /// # Errors
    ///
    /// See [`Masker::mask_selected_words`].
    pub fn mask_selected_words(
        &self,
        text: &str,
        words: &[String],
        namespace: &str,
        case_sensitive: bool,
    ) -> Result<MaskOutcome> {
        self.runtime.block_on(
            self.inner
                .mask_selected_words(text, words, namespace, case_sensitive),
        )
    }

    /// Blocking [`Masker::mask_detected`].
    ///
    /// # Errors
    ///
    /// See [`Masker::mask_detected`].
    pub fn mask_detected(&self, text: &str, namespace: &str) -> Result<MaskOutcome> {
        self.runtime.block_on(self.inner.mask_detected(text, namespace))
    }

    /// Blocking [`Masker::unmask_namespace`].
    #[must_use]
    pub fn unmask_namespace(&self, text: &str, namespace: &str) -> String {
        self.runtime
            .block_on(self.inner.unmask_namespace(text, namespace))
    }

    /// Blocking [`Masker::list_namespaces`].
    #[must_use]
    pub fn list_namespaces(&self) -> Vec<String> {
        self.runtime.block_on(self.inner.list_namespaces())
    }

    /// Blocking [`Masker::reverse_lookup`].
    #[must_use]
    pub fn reverse_lookup(&self, token: &str, namespace: Option<&str>) -> Option<MappingEntry> {
        self.runtime
            .block_on(self.inner.reverse_lookup(token, namespace))
    }

    /// Blocking [`Masker::wipe_namespace`].
    ///
    /// # Errors
    ///
    /// See [`Masker::wipe_namespace`].
    pub fn wipe_namespace(&self, namespace: &str) -> Result<usize> {
        self.runtime.block_on(self.inner.wipe_namespace(namespace))
    }

    /// Blocking [`Masker::wipe_all`].
    ///
    /// # Errors
    ///
    /// See [`Masker::wipe_all`].
    pub fn wipe_all(&self) -> Result<()> {
        self.runtime.block_on(self.inner.wipe_all())
    }
}

fn new_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MaskError::io_context("creating tokio runtime", e))
}

/// Run a future to completion on a throwaway current-thread runtime.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    Ok(new_runtime()?.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fast_config;

    #[test]
    fn blocking_round_trip() {
        let masker = SyncMasker::build(Masker::builder().config(fast_config()).secret(
            crate::store::Secret::from_bytes([7; 32]),
        ))
        .unwrap();

        let words = vec!["alpha".to_string()];
        let masked = masker
            .mask_selected_words("alpha beta", &words, "ns", true)
            .unwrap();
        assert!(masked.text.starts_with("MASKWORD_"));
        assert_eq!(masker.unmask_namespace(&masked.text, "ns"), "alpha beta");
        assert_eq!(masker.list_namespaces(), vec!["ns".to_string()]);
    }

    #[test]
    fn block_on_runs_future() {
        assert_eq!(block_on(async { 2 + 2 }).unwrap(), 4);
    }
}
