//! crates/learnhub_core/src/images.rs
//!
//! Static image-id to URL table used when composing course cards. A missing
//! id simply resolves to no image; it is never an error.

pub struct PlaceholderImage {
    pub id: &'static str,
    pub url: &'static str,
    pub hint: &'static str,
}

pub const PLACEHOLDER_IMAGES: &[PlaceholderImage] = &[
    PlaceholderImage {
        id: "web-dev-intro",
        url: "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?w=600",
        hint: "laptop showing code editor",
    },
    PlaceholderImage {
        id: "data-science",
        url: "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=600",
        hint: "charts on a dashboard",
    },
    PlaceholderImage {
        id: "mobile-dev",
        url: "https://images.unsplash.com/photo-1512941937669-90a1b58e7e9c?w=600",
        hint: "smartphone on a desk",
    },
    PlaceholderImage {
        id: "cloud-computing",
        url: "https://images.unsplash.com/photo-1544197150-b99a580bb7a8?w=600",
        hint: "server room aisles",
    },
    PlaceholderImage {
        id: "ai-ml",
        url: "https://images.unsplash.com/photo-1555255707-c07966088b7b?w=600",
        hint: "abstract neural network",
    },
    PlaceholderImage {
        id: "cybersecurity",
        url: "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?w=600",
        hint: "padlock over circuit board",
    },
];

pub fn lookup(image_id: &str) -> Option<&'static PlaceholderImage> {
    PLACEHOLDER_IMAGES.iter().find(|img| img.id == image_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_id_resolves() {
        let img = lookup("web-dev-intro").unwrap();
        assert!(img.url.starts_with("https://"));
    }

    #[test]
    fn unknown_id_is_none_not_error() {
        assert!(lookup("no-such-image").is_none());
    }
}
