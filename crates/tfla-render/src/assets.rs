//! Page template embedded with rust-embed

use rust_embed::RustEmbed;

/// Embed the assets directory at compile time
#[derive(RustEmbed)]
#[folder = "assets/"]
struct TemplateAssets;

pub const PAGE_TEMPLATE: &str = "template.html";

/// Embedded text asset by file name.
pub fn text_asset(name: &str) -> Option<String> {
    TemplateAssets::get(name).map(|content| String::from_utf8_lossy(&content.data).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_exists() {
        let template = text_asset(PAGE_TEMPLATE).unwrap();
        for placeholder in ["{{TITLE}}", "{{OPTIONS}}", "{{NODES}}", "{{EDGES}}", "{{CYCLES}}"] {
            assert!(template.contains(placeholder), "missing {placeholder}");
        }
    }

    #[test]
    fn test_nonexistent_asset() {
        assert!(text_asset("nonexistent.file").is_none());
    }
}
