use crate::extractors::origin::RequestOrigin;

/// Builds the public URL of a stored image file.
///
/// The URL is computed whenever an image is serialized and never stored,
/// so it always reflects the host the client used.
#[derive(Debug, Clone)]
pub struct ContentUrlResolver {
    origin: String,
    public_path: String,
}

impl ContentUrlResolver {
    pub fn new(origin: &RequestOrigin, public_path: &str) -> Self {
        Self {
            origin: origin.as_str().trim_end_matches('/').to_string(),
            public_path: format!("/{}", public_path.trim_matches('/')),
        }
    }

    pub fn resolve(&self, file_name: &str) -> String {
        format!("{}{}/{}", self.origin, self.public_path, file_name)
    }
}
