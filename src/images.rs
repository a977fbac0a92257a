//! TMDB image URL composition.
use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

use crate::config::DEFAULT_IMAGE_BASE;

/// Pre-rendered resolution buckets served by the TMDB image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W92,
    W154,
    W185,
    W342,
    W500,
    W780,
    W1280,
    H632,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::H632 => "h632",
            ImageSize::Original => "original",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "w92" => Ok(ImageSize::W92),
            "w154" => Ok(ImageSize::W154),
            "w185" => Ok(ImageSize::W185),
            "w342" => Ok(ImageSize::W342),
            "w500" => Ok(ImageSize::W500),
            "w780" => Ok(ImageSize::W780),
            "w1280" => Ok(ImageSize::W1280),
            "h632" => Ok(ImageSize::H632),
            "original" => Ok(ImageSize::Original),
            other => Err(anyhow!("unknown image size token '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClass {
    Poster,
    Backdrop,
    Profile,
}

impl ImageClass {
    pub fn default_size(&self) -> ImageSize {
        match self {
            ImageClass::Poster => ImageSize::W342,
            ImageClass::Backdrop => ImageSize::W780,
            ImageClass::Profile => ImageSize::H632,
        }
    }
}

/// Builds image URLs against a configurable host.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE)
    }
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// `None` when there is no path; the caller renders a placeholder.
    pub fn build(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        Some(format!("{}/{}{}", self.base, size, path))
    }

    pub fn for_class(&self, class: ImageClass, path: Option<&str>) -> Option<String> {
        self.build(path, class.default_size())
    }

    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.for_class(ImageClass::Poster, path)
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.for_class(ImageClass::Backdrop, path)
    }

    pub fn profile(&self, path: Option<&str>) -> Option<String> {
        self.for_class(ImageClass::Profile, path)
    }
}

/// Image URL on the public TMDB host.
pub fn build_image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    ImageUrls::default().build(path, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_path_yields_no_url() {
        assert_eq!(build_image_url(None, ImageSize::W342), None);
        assert_eq!(build_image_url(Some(""), ImageSize::W342), None);
    }

    #[test]
    fn path_is_appended_after_size_token() {
        assert_eq!(
            build_image_url(Some("/abc.jpg"), ImageSize::W342).as_deref(),
            Some("https://image.tmdb.org/t/p/w342/abc.jpg")
        );
    }

    #[test]
    fn class_defaults_match_display_context() {
        let urls = ImageUrls::new("http://img/t/p/");
        assert_eq!(urls.poster(Some("/p.jpg")).as_deref(), Some("http://img/t/p/w342/p.jpg"));
        assert_eq!(urls.backdrop(Some("/b.jpg")).as_deref(), Some("http://img/t/p/w780/b.jpg"));
        assert_eq!(urls.profile(Some("/f.jpg")).as_deref(), Some("http://img/t/p/h632/f.jpg"));
    }

    #[test]
    fn size_tokens_round_trip_and_reject_unknown() {
        assert_eq!("w1280".parse::<ImageSize>().unwrap(), ImageSize::W1280);
        assert_eq!(ImageSize::Original.to_string(), "original");
        assert!("w9999".parse::<ImageSize>().is_err());
    }
}
