use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use domain_batcher::{
    CaptionValue, DomainBatchProvider, DomainHandle, DomainLocation, ImageBytes, ProviderConfig,
    ProviderError, SampleStore,
};

/// Store double that serves synthetic samples and counts handle churn.
struct CountingStore {
    samples_per_domain: usize,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

struct CountingHandle {
    samples: Vec<(ImageBytes, String)>,
    released: Arc<AtomicUsize>,
}

impl SampleStore for CountingStore {
    fn open(
        &self,
        domain: &str,
        _location: &DomainLocation,
    ) -> Result<Box<dyn DomainHandle>, ProviderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let samples = (0..self.samples_per_domain)
            .map(|index| (vec![index as u8], format!("{domain} {index}")))
            .collect();
        Ok(Box::new(CountingHandle {
            samples,
            released: self.released.clone(),
        }))
    }
}

impl DomainHandle for CountingHandle {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn image_at(&self, index: usize) -> Result<ImageBytes, ProviderError> {
        Ok(self.samples[index].0.clone())
    }

    fn caption_at(&self, index: usize) -> Result<CaptionValue, ProviderError> {
        Ok(CaptionValue::Text(self.samples[index].1.clone()))
    }
}

impl Drop for CountingHandle {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn seed_store_files(dir: &Path, names: &[&str]) {
    // Resolution only reads filenames in the directory case; the counting
    // store never touches the file contents.
    for name in names {
        fs::write(dir.join(format!("{name}.json")), "{}").expect("write store file");
    }
}

fn counting_provider(
    dir: &Path,
    batch_size: usize,
    samples_per_domain: usize,
) -> (DomainBatchProvider, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let opened = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        samples_per_domain,
        opened: opened.clone(),
        released: released.clone(),
    };
    let provider =
        DomainBatchProvider::with_store(ProviderConfig::new(dir, batch_size), Arc::new(store))
            .expect("provider");
    (provider, opened, released)
}

#[test]
fn handles_open_lazily_and_release_after_completion() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed_store_files(temp.path(), &["alpha", "beta"]);
    let (provider, opened, released) = counting_provider(temp.path(), 2, 4);

    assert_eq!(opened.load(Ordering::SeqCst), 0);

    let mut pass = provider.pass();
    assert!(pass.next().is_some());
    // Only the first domain has been referenced so far.
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(released.load(Ordering::SeqCst), 0);

    let rest: Vec<_> = pass.by_ref().collect();
    assert_eq!(rest.len(), 3);
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    // Handles stay open for the whole pass, even for exhausted domains.
    assert_eq!(released.load(Ordering::SeqCst), 0);

    drop(pass);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[test]
fn abandonment_releases_every_opened_handle() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed_store_files(temp.path(), &["alpha", "beta", "gamma"]);
    let (provider, opened, released) = counting_provider(temp.path(), 2, 6);

    {
        let mut pass = provider.pass();
        assert!(pass.next().is_some());
        assert!(pass.next().is_some());
        // Consumer walks away mid-pass.
    }
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[test]
fn fresh_pass_reopens_handles() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed_store_files(temp.path(), &["alpha"]);
    let (provider, opened, released) = counting_provider(temp.path(), 2, 3);

    assert_eq!(provider.pass().filter(Result::is_ok).count(), 2);
    assert_eq!(provider.pass().filter(Result::is_ok).count(), 2);
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[test]
fn open_failure_aborts_and_still_releases_prior_handles() {
    struct FailingSecondStore {
        inner: CountingStore,
    }

    impl SampleStore for FailingSecondStore {
        fn open(
            &self,
            domain: &str,
            location: &DomainLocation,
        ) -> Result<Box<dyn DomainHandle>, ProviderError> {
            if domain == "beta" {
                return Err(ProviderError::Store {
                    domain: domain.to_string(),
                    details: "backing file unreadable".into(),
                });
            }
            self.inner.open(domain, location)
        }
    }

    let temp = tempfile::tempdir().expect("tempdir");
    seed_store_files(temp.path(), &["alpha", "beta"]);
    let opened = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicUsize::new(0));
    let store = FailingSecondStore {
        inner: CountingStore {
            samples_per_domain: 4,
            opened: opened.clone(),
            released: released.clone(),
        },
    };
    let provider =
        DomainBatchProvider::with_store(ProviderConfig::new(temp.path(), 2), Arc::new(store))
            .expect("provider");

    let mut pass = provider.pass();
    assert!(matches!(pass.next(), Some(Ok(_))));
    assert!(matches!(pass.next(), Some(Err(ProviderError::Store { .. }))));
    // Fused after the fatal error.
    assert!(pass.next().is_none());

    drop(pass);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn caption_decode_failure_is_fatal_for_the_pass() {
    let temp = tempfile::tempdir().expect("tempdir");
    let body = json!({
        "images": [[1], [2]],
        "captions": [[0xFF, 0xFE], "fine"],
    });
    fs::write(
        temp.path().join("broken.json"),
        serde_json::to_string(&body).expect("serialize"),
    )
    .expect("write");

    let provider =
        DomainBatchProvider::new(ProviderConfig::new(temp.path(), 2)).expect("provider");
    let mut pass = provider.pass();
    assert!(matches!(
        pass.next(),
        Some(Err(ProviderError::CaptionDecode { domain, index }))
            if domain == "broken" && index == 0
    ));
    assert!(pass.next().is_none());
}
