//! Descriptor sets and per-format URL variants.
//!
//! Two descriptor styles are produced, never mixed in one set:
//!
//! - width descriptors: `"<url> 480w, <url> 960w"`
//! - density descriptors: `"<url> 1x, <url> 2x"`
//!
//! Density sets keep the requested box fixed and only vary `dpr`, asking the
//! service for a higher-resolution asset of the same logical size.

use serde::Serialize;

use crate::transform::{ImageFormat, TransformSet};

use super::UrlComposer;

/// The same image in AVIF, WebP and the service's default encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatUrls {
    pub avif: String,
    pub webp: String,
    pub original: String,
}

impl UrlComposer {
    /// Build AVIF-forced, WebP-forced and format-stripped URLs from one set.
    pub fn build_format_urls(
        &self,
        path: &str,
        transforms: &TransformSet,
        organization: Option<&str>,
    ) -> FormatUrls {
        let with_format =
            |format: Option<ImageFormat>| transforms.clone().with_format(format);

        FormatUrls {
            avif: self.build_transformed_url(
                path,
                &with_format(Some(ImageFormat::Avif)),
                organization,
            ),
            webp: self.build_transformed_url(
                path,
                &with_format(Some(ImageFormat::Webp)),
                organization,
            ),
            original: self.build_transformed_url(path, &with_format(None), organization),
        }
    }

    /// Build a width-descriptor set, one entry per width.
    ///
    /// When the base transforms carry both width and height, each entry's
    /// height is scaled with its width so the aspect ratio is preserved.
    /// Without a base width there is no ratio to keep, so `h` is dropped.
    pub fn build_srcset(
        &self,
        path: &str,
        widths: &[u32],
        transforms: &TransformSet,
        organization: Option<&str>,
    ) -> String {
        widths
            .iter()
            .map(|&width| {
                let height = scaled_height(transforms, width);
                let entry = transforms.clone().with_size(Some(width), height);
                format!(
                    "{} {}w",
                    self.build_transformed_url(path, &entry, organization),
                    width
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Build a density-descriptor set with a fixed box size.
    ///
    /// Width and height are identical across entries; only `dpr` varies.
    pub fn build_dpr_srcset(
        &self,
        path: &str,
        width: Option<u32>,
        height: Option<u32>,
        transforms: &TransformSet,
        dprs: &[f64],
        organization: Option<&str>,
    ) -> String {
        dprs.iter()
            .map(|&dpr| {
                let entry = transforms.clone().with_size(width, height).with_dpr(dpr);
                format!(
                    "{} {}x",
                    self.build_transformed_url(path, &entry, organization),
                    dpr
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn scaled_height(transforms: &TransformSet, width: u32) -> Option<u32> {
    match (transforms.width, transforms.height) {
        (Some(base_width), Some(base_height)) if base_width > 0 => {
            let ratio = width as f64 / base_width as f64;
            Some((base_height as f64 * ratio).round() as u32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> UrlComposer {
        UrlComposer::new("https://img.example.com", "image")
    }

    #[test]
    fn test_format_urls_triple() {
        let transforms = TransformSet {
            width: Some(200),
            format: Some(ImageFormat::Png),
            ..Default::default()
        };
        let urls = composer().build_format_urls("p.jpg", &transforms, Some("acme"));

        assert_eq!(urls.avif, "https://img.example.com/image/acme/p.jpg?w=200&format=avif");
        assert_eq!(urls.webp, "https://img.example.com/image/acme/p.jpg?w=200&format=webp");
        assert_eq!(urls.original, "https://img.example.com/image/acme/p.jpg?w=200");
    }

    #[test]
    fn test_width_srcset() {
        let srcset = composer().build_srcset("p.jpg", &[320, 640], &TransformSet::new(), Some("acme"));
        assert_eq!(
            srcset,
            "https://img.example.com/image/acme/p.jpg?w=320 320w, \
             https://img.example.com/image/acme/p.jpg?w=640 640w"
        );
    }

    #[test]
    fn test_width_srcset_preserves_aspect_ratio() {
        let transforms = TransformSet::new().with_size(Some(800), Some(600));
        let srcset = composer().build_srcset("p.jpg", &[400], &transforms, Some("acme"));
        assert!(srcset.contains("w=400&h=300"));
        assert!(srcset.ends_with(" 400w"));
    }

    #[test]
    fn test_width_srcset_drops_height_without_base_width() {
        let transforms = TransformSet::new().with_size(None, Some(600));
        let srcset = composer().build_srcset("p.jpg", &[400, 800], &transforms, Some("acme"));
        assert_eq!(
            srcset,
            "https://img.example.com/image/acme/p.jpg?w=400 400w, \
             https://img.example.com/image/acme/p.jpg?w=800 800w"
        );
    }

    #[test]
    fn test_srcset_entries_split_cleanly_for_awkward_paths() {
        let transforms = TransformSet::new().with_size(Some(100), None);
        let srcsets = [
            composer().build_srcset("my photo #1, final.jpg", &[320, 640], &transforms, Some("acme")),
            composer().build_dpr_srcset(
                "my photo #1, final.jpg",
                Some(100),
                None,
                &transforms,
                &[1.0, 2.0],
                Some("acme"),
            ),
        ];

        for srcset in srcsets {
            let entries: Vec<&str> = srcset.split(", ").collect();
            assert_eq!(entries.len(), 2, "{}", srcset);
            for entry in entries {
                let parts: Vec<&str> = entry.split(' ').collect();
                assert_eq!(parts.len(), 2, "{}", entry);
                assert!(parts[0].contains("/acme/my%20photo%20%231%2C%20final.jpg?"));
            }
        }
    }

    #[test]
    fn test_dpr_srcset_holds_size_fixed() {
        let srcset = composer().build_dpr_srcset(
            "a.jpg",
            Some(120),
            Some(80),
            &TransformSet::new(),
            &[1.0, 1.5, 2.0, 3.0],
            Some("acme"),
        );

        let entries: Vec<&str> = srcset.split(", ").collect();
        assert_eq!(entries.len(), 4);
        for (entry, dpr) in entries.iter().zip(["1", "1.5", "2", "3"]) {
            assert!(entry.contains(&format!("w=120&h=80&dpr={} ", dpr)), "{}", entry);
            assert!(entry.ends_with(&format!(" {}x", dpr)));
        }
    }

    #[test]
    fn test_dpr_srcset_overrides_transform_size() {
        let transforms = TransformSet::new().with_size(Some(999), Some(999));
        let srcset = composer().build_dpr_srcset(
            "a.jpg",
            Some(100),
            None,
            &transforms,
            &[2.0],
            Some("acme"),
        );
        assert_eq!(srcset, "https://img.example.com/image/acme/a.jpg?w=100&dpr=2 2x");
    }

    #[test]
    fn test_empty_width_list_gives_empty_srcset() {
        assert_eq!(
            composer().build_srcset("p.jpg", &[], &TransformSet::new(), None),
            ""
        );
    }
}
