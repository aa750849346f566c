/// Face fill classification and resolved per-face state
use std::rc::Rc;

use crate::texture::Texture;

/// File extensions that mark a fill string as an image reference
pub const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".svg", ".webp"];

/// A face's configured appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillSpec {
    Color(String),
    TextureRef(String),
}

impl FillSpec {
    /// Classify a fill string.
    ///
    /// Strings ending in a recognized image extension are texture references.
    /// Blank strings become `default_color`; anything else is taken as a color.
    /// Never fails.
    pub fn classify(fill: &str, default_color: &str) -> Self {
        let fill = fill.trim();
        if fill.is_empty() {
            return FillSpec::Color(default_color.to_string());
        }
        if is_image_reference(fill) {
            FillSpec::TextureRef(fill.to_string())
        } else {
            FillSpec::Color(fill.to_string())
        }
    }
}

pub fn is_image_reference(fill: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| fill.ends_with(ext))
}

/// Pad or trim `fills` to exactly `num_sides` entries.
///
/// Missing entries repeat the first fill, or `default_color` when the list
/// is empty.
pub fn normalize_side_fills(fills: &[String], num_sides: usize, default_color: &str) -> Vec<FillSpec> {
    let first = fills
        .first()
        .map(|f| FillSpec::classify(f, default_color))
        .unwrap_or_else(|| FillSpec::Color(default_color.to_string()));

    (0..num_sides)
        .map(|i| match fills.get(i) {
            Some(fill) => FillSpec::classify(fill, default_color),
            None => first.clone(),
        })
        .collect()
}

/// What a face draws with, after texture resolution.
///
/// Textured faces start out `Pending` and settle exactly once into `Ready`
/// or `Failed`.
#[derive(Debug)]
pub enum ResolvedFace<R> {
    Color(String),
    Pending,
    Ready(Rc<Texture<R>>),
    Failed,
}

impl<R> ResolvedFace<R> {
    pub fn is_settled(&self) -> bool {
        !matches!(self, ResolvedFace::Pending)
    }

    pub fn texture(&self) -> Option<&Rc<Texture<R>>> {
        match self {
            ResolvedFace::Ready(texture) => Some(texture),
            _ => None,
        }
    }
}

impl<R> Clone for ResolvedFace<R> {
    fn clone(&self) -> Self {
        match self {
            ResolvedFace::Color(color) => ResolvedFace::Color(color.clone()),
            ResolvedFace::Pending => ResolvedFace::Pending,
            ResolvedFace::Ready(texture) => ResolvedFace::Ready(Rc::clone(texture)),
            ResolvedFace::Failed => ResolvedFace::Failed,
        }
    }
}

impl<R> From<&FillSpec> for ResolvedFace<R> {
    fn from(spec: &FillSpec) -> Self {
        match spec {
            FillSpec::Color(color) => ResolvedFace::Color(color.clone()),
            FillSpec::TextureRef(_) => ResolvedFace::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            FillSpec::classify("assets/wood.png", "red"),
            FillSpec::TextureRef("assets/wood.png".into())
        );
        assert_eq!(
            FillSpec::classify("https://example.com/a.webp", "red"),
            FillSpec::TextureRef("https://example.com/a.webp".into())
        );
        assert_eq!(FillSpec::classify("#ff8800", "red"), FillSpec::Color("#ff8800".into()));
        assert_eq!(FillSpec::classify("   ", "red"), FillSpec::Color("red".into()));
        assert_eq!(FillSpec::classify("", "blue"), FillSpec::Color("blue".into()));
        assert_eq!(FillSpec::classify("image.gif", "red"), FillSpec::Color("image.gif".into()));
    }

    #[test]
    fn test_normalize_pads_with_first() {
        let fills = vec!["yellow".to_string(), "purple".to_string()];
        let normalized = normalize_side_fills(&fills, 5, "green");
        assert_eq!(normalized.len(), 5);
        assert_eq!(normalized[1], FillSpec::Color("purple".into()));
        for spec in &normalized[2..] {
            assert_eq!(spec, &FillSpec::Color("yellow".into()));
        }
    }

    #[test]
    fn test_normalize_empty_and_long_lists() {
        let normalized = normalize_side_fills(&[], 3, "green");
        assert_eq!(normalized, vec![FillSpec::Color("green".into()); 3]);

        let fills: Vec<String> = (0..8).map(|i| format!("c{i}")).collect();
        assert_eq!(normalize_side_fills(&fills, 4, "green").len(), 4);
    }

    #[test]
    fn test_resolved_face_from_spec() {
        let face: ResolvedFace<()> = (&FillSpec::TextureRef("a.png".into())).into();
        assert!(!face.is_settled());
        let face: ResolvedFace<()> = (&FillSpec::Color("red".into())).into();
        assert!(face.is_settled());
    }
}
