//! Element locators and the admin panel's selector vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// How to find an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// Quote a string for use inside an XPath 1.0 expression.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Selectors for the admin panel's markup.
///
/// Every locator the suite uses is built here so the fake panel can match
/// exactly the same expressions.
pub mod selectors {
    use super::{xpath_literal, Locator};

    pub fn page_root() -> Locator {
        Locator::css("body")
    }

    pub fn username_input() -> Locator {
        Locator::css("input[type='text']")
    }

    pub fn password_input() -> Locator {
        Locator::css("input[type='password']")
    }

    pub fn submit_button() -> Locator {
        Locator::css("button[type='submit']")
    }

    pub fn dashboard_title() -> Locator {
        Locator::xpath("//*[contains(text(), 'E-Commerce Admin')]")
    }

    pub fn logout_button() -> Locator {
        Locator::xpath("//button[contains(., 'Logout')]")
    }

    /// The tab trigger carrying `label`
    pub fn tab(label: &str) -> Locator {
        Locator::xpath(format!(
            "//button[@role='tab'][contains(., {})]",
            xpath_literal(label)
        ))
    }

    /// A panel heading; each tab renders exactly one distinctive heading
    pub fn heading(title: &str) -> Locator {
        Locator::xpath(format!("//h3[normalize-space(.)={}]", xpath_literal(title)))
    }

    pub fn name_input() -> Locator {
        Locator::css("input[placeholder*='name' i]")
    }

    /// Free-text category field on the add form
    pub fn category_input() -> Locator {
        Locator::css("input#category")
    }

    pub fn description_input() -> Locator {
        Locator::css("textarea")
    }

    pub fn price_input() -> Locator {
        Locator::css("input#price")
    }

    pub fn quantity_input() -> Locator {
        Locator::css("input#quantity")
    }

    /// Submit control of a form whose button reads `label`
    pub fn form_submit(label: &str) -> Locator {
        Locator::xpath(format!(
            "//button[@type='submit'][contains(., {})]",
            xpath_literal(label)
        ))
    }

    pub fn combobox() -> Locator {
        Locator::xpath("//button[@role='combobox']")
    }

    pub fn options() -> Locator {
        Locator::xpath("//div[@role='option']")
    }

    /// The n-th option of the open listbox, 1-based
    pub fn nth_option(n: usize) -> Locator {
        Locator::xpath(format!("(//div[@role='option'])[{}]", n))
    }

    pub fn option_containing(text: &str) -> Locator {
        Locator::xpath(format!(
            "//div[@role='option'][contains(., {})]",
            xpath_literal(text)
        ))
    }

    /// Row-level action buttons inside the tab panel (Delete, Dispatch)
    pub fn row_action(label: &str) -> Locator {
        Locator::xpath(format!(
            "//div[@role='tabpanel']//button[not(@role='tab')][contains(., {})]",
            xpath_literal(label)
        ))
    }

    /// Row-level action button of the product named `name`
    pub fn row_action_for(label: &str, name: &str) -> Locator {
        Locator::xpath(format!(
            "//div[@role='tabpanel']//div[.//h3[contains(., {})]]/following-sibling::button[contains(., {})]",
            xpath_literal(name),
            xpath_literal(label)
        ))
    }

    pub fn dialog_confirm() -> Locator {
        Locator::xpath("//*[@role='alertdialog']//button[normalize-space(.)='Delete']")
    }

    pub fn dialog_cancel() -> Locator {
        Locator::xpath("//*[@role='alertdialog']//button[normalize-space(.)='Cancel']")
    }

    pub fn inventory_table() -> Locator {
        Locator::css("table")
    }

    pub fn inventory_rows() -> Locator {
        Locator::xpath("//table/tbody/tr")
    }

    pub fn inventory_row_named(name: &str) -> Locator {
        Locator::xpath(format!(
            "//table/tbody/tr[td[contains(., {})]]",
            xpath_literal(name)
        ))
    }

    pub fn status_badges() -> Locator {
        Locator::xpath("//table//*[contains(text(), 'Dispatched') or contains(text(), 'In Stock')]")
    }

    pub fn summary_cards() -> Locator {
        Locator::css("[class*='card']")
    }

    /// A toast or inline message containing `text`
    pub fn notice(text: &str) -> Locator {
        Locator::xpath(format!("//*[contains(text(), {})]", xpath_literal(text)))
    }

    pub fn empty_state() -> Locator {
        Locator::xpath("//p[contains(., 'No products')]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xpath_literal_quotes() {
        assert_eq!(xpath_literal("Update"), "'Update'");
        assert_eq!(xpath_literal("Men's shirt"), "\"Men's shirt\"");
        assert_eq!(
            xpath_literal(r#"a'b"c"#),
            r#"concat('a', "'", 'b"c')"#
        );
    }

    #[test]
    fn tab_locator_is_scoped_to_tab_role() {
        let loc = selectors::tab("Add Product");
        assert_eq!(
            loc.as_str(),
            "//button[@role='tab'][contains(., 'Add Product')]"
        );
        // The form submit reads the same label but is a different locator
        assert_ne!(loc, selectors::form_submit("Add Product"));
    }

    #[test]
    fn display_includes_strategy() {
        assert_eq!(selectors::submit_button().to_string(), "css:button[type='submit']");
        assert!(selectors::nth_option(1).to_string().starts_with("xpath:"));
    }
}
