/// The three renditions pages ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Thumbnail,
    Full,
    Profile,
}

impl ImageKind {
    pub fn transformation(&self) -> &'static str {
        match self {
            ImageKind::Thumbnail => "c_fill,g_auto,w_400,h_300,f_auto,q_auto",
            ImageKind::Full => "c_limit,w_1200,h_1200,f_auto,q_auto",
            ImageKind::Profile => "c_fill,g_face,w_150,h_150,f_auto,q_auto",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ImageKind::Thumbnail => "https://placehold.co/400x300/e9ecef/34495e?text=Service",
            ImageKind::Full => "https://placehold.co/1200x900/e9ecef/34495e?text=Image",
            ImageKind::Profile => "https://placehold.co/150x150/e9ecef/34495e?text=User",
        }
    }
}

const UPLOAD_SEGMENT: &str = "/upload/";

/// Rewrite a stored image URL into the requested rendition.
///
/// Cloudinary delivery URLs get the transformation spliced in after
/// `/upload/`. Anything else (MinIO links, URLs that already carry several
/// `/upload/` segments) is served as stored.
pub fn transformed_url(url: &str, kind: ImageKind) -> String {
    let url = url.trim();
    if url.is_empty() {
        return kind.placeholder().to_string();
    }
    if !url.contains("res.cloudinary.com") || url.matches(UPLOAD_SEGMENT).count() != 1 {
        return url.to_string();
    }
    match url.split_once(UPLOAD_SEGMENT) {
        Some((head, tail)) => format!("{}{}{}/{}", head, UPLOAD_SEGMENT, kind.transformation(), tail),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = "https://res.cloudinary.com/kabale/image/upload/v1700000000/services/abc.jpg";

    #[test]
    fn inserts_transformation_after_upload() {
        assert_eq!(
            transformed_url(STORED, ImageKind::Thumbnail),
            "https://res.cloudinary.com/kabale/image/upload/c_fill,g_auto,w_400,h_300,f_auto,q_auto/v1700000000/services/abc.jpg"
        );
        assert!(transformed_url(STORED, ImageKind::Profile).contains("/upload/c_fill,g_face,w_150,h_150,f_auto,q_auto/"));
    }

    #[test]
    fn empty_url_gets_placeholder() {
        assert_eq!(transformed_url("", ImageKind::Profile), ImageKind::Profile.placeholder());
        assert_eq!(transformed_url("   ", ImageKind::Full), ImageKind::Full.placeholder());
    }

    #[test]
    fn foreign_or_ambiguous_urls_pass_through() {
        let minio = "http://localhost:9000/kabale-images/services/a.jpg";
        assert_eq!(transformed_url(minio, ImageKind::Full), minio);
        let twice = "https://res.cloudinary.com/x/image/upload/a/upload/b.jpg";
        assert_eq!(transformed_url(twice, ImageKind::Full), twice);
    }
}
