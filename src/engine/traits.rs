use std::hash::BuildHasher;

use crate::types::ImageId;

/// Read-only image id -> URL capability injected into the resolver.
pub trait MediaLookup {
    /// Display URL for `image`, or `None` when the table has no entry.
    fn url_for(&self, image: &str) -> Option<&str>;
}

impl<S: BuildHasher> MediaLookup for hashbrown::HashMap<ImageId, String, S> {
    fn url_for(&self, image: &str) -> Option<&str> {
        self.get(image).map(String::as_str)
    }
}

impl<S: BuildHasher> MediaLookup for std::collections::HashMap<ImageId, String, S> {
    fn url_for(&self, image: &str) -> Option<&str> {
        self.get(image).map(String::as_str)
    }
}

impl MediaLookup for std::collections::BTreeMap<ImageId, String> {
    fn url_for(&self, image: &str) -> Option<&str> {
        self.get(image).map(String::as_str)
    }
}

impl<T: MediaLookup + ?Sized> MediaLookup for &T {
    fn url_for(&self, image: &str) -> Option<&str> {
        (**self).url_for(image)
    }
}
