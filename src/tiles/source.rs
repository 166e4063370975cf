use crate::core::geo::TileCoord;

/// Default OpenStreetMap tile endpoint.
pub const OSM_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution the OpenStreetMap tile usage policy requires.
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Expands `{s}`, `{z}`, `{x}` and `{y}` placeholders in a URL template.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplateSource {
    template: String,
    subdomains: Vec<String>,
}

impl UrlTemplateSource {
    pub fn new(template: impl Into<String>, subdomains: Vec<String>) -> Self {
        Self {
            template: template.into(),
            subdomains,
        }
    }

    pub fn openstreetmap() -> Self {
        Self::new(
            OSM_URL_TEMPLATE,
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        )
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn subdomain(&self, coord: TileCoord) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }
        let idx = ((coord.x as usize) + (coord.y as usize)) % self.subdomains.len();
        &self.subdomains[idx]
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{s}", self.subdomain(coord))
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_url_rotates_subdomains() {
        let source = UrlTemplateSource::openstreetmap();

        assert_eq!(
            source.url(TileCoord::new(0, 0, 0)),
            "https://a.tile.openstreetmap.org/0/0/0.png"
        );
        assert_eq!(
            source.url(TileCoord::new(1, 0, 1)),
            "https://b.tile.openstreetmap.org/1/1/0.png"
        );
        assert_eq!(
            source.url(TileCoord::new(1, 1, 1)),
            "https://c.tile.openstreetmap.org/1/1/1.png"
        );
    }

    #[test]
    fn test_template_without_subdomains() {
        let source = UrlTemplateSource::new("https://tiles.example/{z}/{x}/{y}.png", Vec::new());
        assert_eq!(
            source.url(TileCoord::new(3, 5, 4)),
            "https://tiles.example/4/3/5.png"
        );
    }
}
