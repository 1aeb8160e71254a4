//! Secret-masking log sink

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, BuildError, MatchKind};
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Replaces every configured secret with its mask
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    matcher: Option<AhoCorasick>,
    masks: Vec<String>,
}

impl Sanitizer {
    /// Build from `(secret, mask)` pairs. Empty secrets are dropped.
    pub fn new<I>(secrets: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (patterns, masks): (Vec<String>, Vec<String>) =
            secrets.into_iter().filter(|(secret, _)| !secret.is_empty()).unzip();

        if patterns.is_empty() {
            return Ok(Self::default());
        }

        // Longest match wins so a secret containing another is masked whole
        let matcher = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)?;

        Ok(Self {
            matcher: Some(matcher),
            masks,
        })
    }

    pub fn sanitize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match &self.matcher {
            Some(matcher) if matcher.is_match(text) => {
                Cow::Owned(matcher.replace_all(text, &self.masks))
            }
            _ => Cow::Borrowed(text),
        }
    }
}

/// Shared writer that masks secrets before anything reaches `W`
///
/// Cloning shares the underlying writer. It doubles as the `tracing`
/// writer for the run log.
pub struct SanitizingSink<W> {
    inner: Arc<Mutex<W>>,
    sanitizer: Arc<Sanitizer>,
}

impl<W> Clone for SanitizingSink<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sanitizer: Arc::clone(&self.sanitizer),
        }
    }
}

impl<W: Write> SanitizingSink<W> {
    pub fn new(inner: W, sanitizer: Sanitizer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
            sanitizer: Arc::new(sanitizer),
        }
    }

    /// Same destination, different secrets
    pub fn with_sanitizer(&self, sanitizer: Sanitizer) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sanitizer: Arc::new(sanitizer),
        }
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "log sink lock poisoned")
}

impl<W: Write> Write for SanitizingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let masked = self.sanitizer.sanitize(&text);

        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().map_err(|_| poisoned())?.flush()
    }
}

impl<'a, W: Write + Send + 'static> MakeWriter<'a> for SanitizingSink<W> {
    type Writer = SanitizingSink<W>;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
