use std::path::PathBuf;

use image::DynamicImage;

use crate::error::OcrError;

/// One image input to an OCR batch. Ephemeral; exists only for the duration
/// of a single request.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Classifies a caller-supplied location string the way the URL-list
    /// input form does: `http(s)` prefixes fetch, everything else is a local
    /// path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            ImageSource::Url(location.to_owned())
        } else {
            ImageSource::Path(PathBuf::from(location))
        }
    }
}

/// Decodes a source into an RGB image. No caching; every call re-fetches and
/// re-decodes.
pub fn load_image(source: &ImageSource) -> Result<DynamicImage, OcrError> {
    match source {
        ImageSource::Bytes(bytes) => decode_bytes(bytes),
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|err| OcrError::NotFound {
                path: path.clone(),
                source: err,
            })?;
            decode_bytes(&bytes)
        }
        ImageSource::Url(url) => fetch_remote_image(url),
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, OcrError> {
    let image = image::load_from_memory(bytes)?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

fn fetch_remote_image(url: &str) -> Result<DynamicImage, OcrError> {
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|err| OcrError::Fetch {
            url: url.to_owned(),
            source: err,
        })?;
    let bytes = response.bytes().map_err(|err| OcrError::Fetch {
        url: url.to_owned(),
        source: err,
    })?;
    decode_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 120, 240])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn decodes_raw_bytes_to_rgb() {
        let loaded = load_image(&ImageSource::Bytes(png_bytes(4, 3))).expect("load");
        assert_eq!(loaded.width(), 4);
        assert_eq!(loaded.height(), 3);
        assert!(matches!(loaded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn invalid_bytes_are_a_decode_failure() {
        let err = load_image(&ImageSource::Bytes(b"definitely not an image".to_vec())).unwrap_err();
        assert!(matches!(err, OcrError::Decode(_)));
    }

    #[test]
    fn missing_path_is_not_found() {
        let source = ImageSource::Path(PathBuf::from("/nonexistent/got-ocr-test.png"));
        let err = load_image(&source).unwrap_err();
        assert!(matches!(err, OcrError::NotFound { .. }));
    }

    #[test]
    fn location_strings_classify_by_scheme() {
        assert!(matches!(
            ImageSource::from_location("https://example.com/a.png"),
            ImageSource::Url(_)
        ));
        assert!(matches!(
            ImageSource::from_location("http://example.com/a.png"),
            ImageSource::Url(_)
        ));
        assert!(matches!(
            ImageSource::from_location("scans/a.png"),
            ImageSource::Path(_)
        ));
    }
}
