use crate::ui::html::Html;

/// Boundary to an HTML sanitizer. Implementations must be idempotent and
/// must never fail; anything they cannot make safe is removed.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, markup: &str) -> Html;
}

/// Default sanitizer. Keeps ordinary layout markup and `class` attributes so
/// Tailwind styling survives, plus `button` elements; drops scripts, event
/// handlers, and non-web URL schemes.
pub struct AmmoniaSanitizer {
    builder: ammonia::Builder<'static>,
}

impl AmmoniaSanitizer {
    pub fn new() -> Self {
        let mut builder = ammonia::Builder::default();
        builder
            .add_tags(["button"])
            .add_tag_attributes("button", ["type", "disabled"])
            .add_generic_attributes(["class"]);
        Self { builder }
    }
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, markup: &str) -> Html {
        Html::trusted(self.builder.clean(markup).to_string())
    }
}
