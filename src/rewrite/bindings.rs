//! The fixed selector → handler table.

use lol_html::html_content::{ContentType, Element};
use lol_html::HandlerResult;

use crate::experiment::RenderingContext;

pub const PROFILE_URL: &str = "https://github.com/jameszhao01";
pub const PROFILE_LINK_TEXT: &str = "Check out my Github!!!";
pub const REVISIT_SENTENCE: &str = "You have visited this page before, so the same variant is shown.";

/// One rewritten element of the variant page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementBinding {
    Title,
    Heading,
    ProfileLink,
    Description,
}

impl ElementBinding {
    /// Every binding, in registration order.
    pub const ALL: [ElementBinding; 4] = [
        ElementBinding::Title,
        ElementBinding::Heading,
        ElementBinding::ProfileLink,
        ElementBinding::Description,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Heading => "h1#title",
            Self::ProfileLink => "a#url",
            Self::Description => "p#description",
        }
    }

    /// Mutate a matched element for the request described by `ctx`.
    pub fn apply(self, element: &mut Element<'_, '_>, ctx: &RenderingContext) -> HandlerResult {
        match self {
            Self::Title => element.set_inner_content(
                &format!("Special Title for Variant {}", ctx.variant_number),
                ContentType::Text,
            ),
            Self::Heading => element.set_inner_content(
                &format!("My Awesome h1 for Variant {}", ctx.variant_number),
                ContentType::Text,
            ),
            Self::ProfileLink => {
                element.set_attribute("href", PROFILE_URL)?;
                element.set_inner_content(PROFILE_LINK_TEXT, ContentType::Text);
            }
            Self::Description => element.set_inner_content(
                &description_text(ctx),
                ContentType::Text,
            ),
        }
        Ok(())
    }
}

fn description_text(ctx: &RenderingContext) -> String {
    let revisit = if ctx.was_returning_visitor {
        REVISIT_SENTENCE
    } else {
        ""
    };
    format!("My paragraph for Variant {}. {}", ctx.variant_number, revisit)
}
