use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::errors::BackendError;
use crate::review::Review;

const LAYOUT: &str = include_str!("../templates/layout.hbs");

const TEMPLATES: [(&str, &str); 4] = [
    ("reviews/list", include_str!("../templates/reviews/list.hbs")),
    ("reviews/new", include_str!("../templates/reviews/new.hbs")),
    ("reviews/detail", include_str!("../templates/reviews/detail.hbs")),
    ("reviews/edit", include_str!("../templates/reviews/edit.hbs")),
];

/// The compiled page templates. Every page is wrapped in the `layout`
/// partial.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, BackendError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        registry
            .register_partial("layout", LAYOUT)
            .map_err(|source| BackendError::InvalidTemplate { source })?;

        for (name, source) in TEMPLATES.iter() {
            registry
                .register_template_string(name, source)
                .map_err(|source| BackendError::InvalidTemplate { source })?;
        }

        Ok(Self { registry })
    }

    pub fn list(&self, reviews: &[Review]) -> Result<String, BackendError> {
        self.render("reviews/list", &json!({ "reviews": reviews }))
    }

    pub fn new_form(&self) -> Result<String, BackendError> {
        self.render("reviews/new", &json!({}))
    }

    pub fn detail(&self, review: &Review) -> Result<String, BackendError> {
        self.render("reviews/detail", &json!({ "review": review }))
    }

    pub fn edit_form(&self, review: &Review) -> Result<String, BackendError> {
        self.render("reviews/edit", &json!({ "review": review }))
    }

    fn render(&self, name: &str, data: &impl Serialize) -> Result<String, BackendError> {
        self.registry
            .render(name, data)
            .map_err(|source| BackendError::RenderFailed { source })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::review::{HostedImage, ReviewFields};

    fn sample(image: Option<HostedImage>) -> Review {
        Review::new(
            "r-1".to_owned(),
            ReviewFields::new("Peru", "Trip <3", "Great", "5"),
            image,
        )
    }

    #[test]
    fn every_template_compiles() {
        Views::new().unwrap();
    }

    #[test]
    fn list_links_each_review() {
        let views = Views::new().unwrap();

        let html = views.list(&[sample(None)]).unwrap();

        assert!(html.contains("href=\"/reviews/r-1\""));
        assert!(html.contains("Trip &lt;3"));
    }

    #[test]
    fn empty_list_says_so() {
        let views = Views::new().unwrap();

        let html = views.list(&[]).unwrap();

        assert!(html.contains("No reviews yet"));
    }

    #[test]
    fn detail_shows_image_only_when_present() {
        let views = Views::new().unwrap();

        let without = views.detail(&sample(None)).unwrap();
        let with = views
            .detail(&sample(Some(HostedImage::new("https://img/x.jpg", "travel-reviews/x"))))
            .unwrap();

        assert!(!without.contains("<img"));
        assert!(with.contains("src=\"https://img/x.jpg\""));
    }

    #[test]
    fn edit_form_posts_back_to_review() {
        let views = Views::new().unwrap();

        let html = views.edit_form(&sample(None)).unwrap();

        assert!(html.contains("action=\"/reviews/r-1\""));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("value=\"Peru\""));
    }
}
