//! Thumbnail values and the sinks that display them.

/// What a row should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    /// The default image, shown until real bytes are available.
    Placeholder,
    /// Raw image bytes read from the cached location.
    Image(Vec<u8>),
}

impl Thumbnail {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Thumbnail::Placeholder)
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Thumbnail::Image(bytes) => Some(bytes),
            Thumbnail::Placeholder => None,
        }
    }
}

/// Receives thumbnails for one resolve call.
///
/// A sink sees `Placeholder` first, then at most one `Image`.
pub trait ThumbnailSink: Send + 'static {
    fn show(&self, thumbnail: Thumbnail);
}

impl<F> ThumbnailSink for F
where
    F: Fn(Thumbnail) + Send + 'static,
{
    fn show(&self, thumbnail: Thumbnail) {
        self(thumbnail)
    }
}
