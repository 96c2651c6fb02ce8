use bytes::Bytes;

/// Coarse classification of an input file, used for intake filtering and
/// backend input selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Pdf,
    Other,
}

/// One user-selected file: name, declared media type and contents.
///
/// Contents are reference counted, so cloning a `SourceFile` into an effect
/// or a submission job does not copy the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic", "heif", "bmp", "tif", "tiff"];

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Classifies by declared media type, falling back to the file extension
    /// when the media type is missing.
    pub fn kind(&self) -> MediaKind {
        let media = self
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if media.starts_with("image/") {
            return MediaKind::Image;
        }
        if media == "application/pdf" {
            return MediaKind::Pdf;
        }
        if !media.is_empty() {
            return MediaKind::Other;
        }

        let extension = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "pdf" {
            MediaKind::Pdf
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }

    /// Intake accepts images and paginated documents only.
    pub fn is_accepted(&self) -> bool {
        matches!(self.kind(), MediaKind::Image | MediaKind::Pdf)
    }
}
