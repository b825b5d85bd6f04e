//! Dashboard helpers: tab navigation and product forms
//!
//! Required steps (tabs, form fields, submit buttons) propagate their errors.
//! Steps whose target depends on data left by earlier cases (list rows,
//! select options) come back as a [`Probe`] for the caller to match on.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::{selectors, Locator};
use crate::product::{Category, CategoryChoice, ProductDraft};
use crate::session::Session;
use crate::wait::Probe;

/// Ceiling for "did the form accept it" checks where rejection is expected
pub(crate) const SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Inventory,
    AddProduct,
    Update,
    Delete,
    Dispatch,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Inventory, Tab::AddProduct, Tab::Update, Tab::Delete, Tab::Dispatch];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Inventory => "Inventory",
            Tab::AddProduct => "Add Product",
            Tab::Update => "Update",
            Tab::Delete => "Delete",
            Tab::Dispatch => "Dispatch",
        }
    }

    /// Heading rendered once the tab's content is on screen
    pub fn heading(&self) -> &'static str {
        match self {
            Tab::Inventory => "Inventory Overview",
            Tab::AddProduct => "Add New Product",
            Tab::Update => "Update Product",
            Tab::Delete => "Delete Product",
            Tab::Dispatch => "Dispatch Product",
        }
    }
}

/// Which product an operation targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    First,
    Named(String),
}

/// Switch tabs and wait for the new content instead of sleeping
pub async fn open_tab(session: &Session, tab: Tab) -> E2eResult<()> {
    debug!("Opening tab {}", tab.label());
    session.click(&selectors::tab(tab.label())).await?;
    session.wait().until_present(&selectors::heading(tab.heading())).await?;
    Ok(())
}

/// Type a draft into the add form. Absent fields are skipped.
pub async fn fill_product_form(session: &Session, draft: &ProductDraft) -> E2eResult<()> {
    session.fill(&selectors::name_input(), &draft.name).await?;

    if let Some(choice) = draft.category {
        fill_category(session, choice).await?;
    }
    if let Some(description) = &draft.description {
        session.fill(&selectors::description_input(), description).await?;
    }
    if let Some(price) = &draft.price {
        session.fill(&selectors::price_input(), price).await?;
    }
    if let Some(quantity) = &draft.quantity {
        session.fill(&selectors::quantity_input(), quantity).await?;
    }
    Ok(())
}

/// The panel takes the category as free text. Builds that render a select
/// instead get the matching option picked from the listbox.
async fn fill_category(session: &Session, choice: CategoryChoice) -> E2eResult<()> {
    let category = match choice {
        CategoryChoice::Named(category) => category,
        CategoryChoice::First => Category::ALL[0],
    };

    // The name field is already on screen, so the rest of the form is too
    if session.count(&selectors::category_input()).await? > 0 {
        session.fill(&selectors::category_input(), category.label()).await?;
        return Ok(());
    }

    debug!("No category text field, using the category select");
    session.click(&selectors::combobox()).await?;
    let option = match choice {
        CategoryChoice::Named(category) => selectors::option_containing(category.label()),
        CategoryChoice::First => selectors::nth_option(1),
    };
    session.click(&option).await?;
    session.wait().until_absent(&selectors::options()).await?;
    Ok(())
}

/// Fill and submit the add form.
///
/// Returns whether the panel acknowledged the product. A rejected form is
/// reported as `false`, not as an error.
pub async fn add_product(session: &Session, draft: &ProductDraft) -> E2eResult<bool> {
    fill_product_form(session, draft).await?;
    session.click(&selectors::form_submit("Add Product")).await?;

    let ack = selectors::notice(&format!("{} has been added", draft.name));
    let wait = if draft.is_complete() {
        session.wait()
    } else {
        session.wait().with_timeout(SETTLE.min(session.config().wait.timeout))
    };
    let accepted = wait.probe_present(&ack).await?.is_found();
    if accepted {
        info!("Added product '{}'", draft.name);
    }
    Ok(accepted)
}

/// Open the product select on the Update tab and pick an option.
///
/// Returns the picked option's label, or why no option could be picked.
pub async fn select_product(session: &Session, pick: &Pick) -> E2eResult<Probe<String>> {
    session.click(&selectors::combobox()).await?;

    let option = match pick {
        Pick::First => selectors::nth_option(1),
        Pick::Named(name) => selectors::option_containing(name),
    };
    let element = match session.wait().probe_clickable(&option).await? {
        Probe::Found(el) => el,
        Probe::NotFound(r) => {
            close_listbox(session).await;
            return Ok(Probe::NotFound(r));
        }
        Probe::TimedOut(r) => {
            close_listbox(session).await;
            return Ok(Probe::TimedOut(r));
        }
    };

    let label = session.driver().text(&element).await?;
    session.driver().click(&element).await?;
    session.wait().until_present(&selectors::price_input()).await?;
    debug!("Selected '{}'", label);
    Ok(Probe::Found(label))
}

/// Toggle the select shut so its overlay does not swallow the next click
async fn close_listbox(session: &Session) {
    let closed = async {
        session.click(&selectors::combobox()).await?;
        session.wait().until_absent(&selectors::options()).await
    };
    if let Err(e) = closed.await {
        warn!("Product select stayed open: {}", e);
    }
}

/// Product name part of a select option label ("<name> - <category>")
pub fn option_product_name(label: &str) -> &str {
    label.rsplit_once(" - ").map(|(name, _)| name).unwrap_or(label).trim()
}

/// Submit the update form and wait for the acknowledgement
pub async fn submit_update(session: &Session) -> E2eResult<()> {
    session.click(&selectors::form_submit("Update Product")).await?;
    session
        .wait()
        .until_present(&selectors::notice("Product updated successfully"))
        .await?;
    Ok(())
}

/// Current value of an input, read after waiting for presence
pub async fn input_value(session: &Session, locator: &Locator) -> E2eResult<String> {
    Ok(session.attr_of(locator, "value").await?.unwrap_or_default())
}

/// Press a row's Dispatch button on the Dispatch tab
pub async fn dispatch(session: &Session, pick: &Pick) -> E2eResult<Probe> {
    let button = match pick {
        Pick::First => selectors::row_action("Dispatch"),
        Pick::Named(name) => selectors::row_action_for("Dispatch", name),
    };
    let probe = session.try_click(&button).await?;
    if probe.is_found() {
        session
            .wait()
            .until_present(&selectors::notice("Product dispatched"))
            .await?;
    }
    Ok(probe)
}

/// Press a row's Delete button on the Delete tab, then confirm or cancel
pub async fn delete(session: &Session, pick: &Pick, confirm: bool) -> E2eResult<Probe> {
    let button = match pick {
        Pick::First => selectors::row_action("Delete"),
        Pick::Named(name) => selectors::row_action_for("Delete", name),
    };
    let probe = session.try_click(&button).await?;
    if !probe.is_found() {
        return Ok(probe);
    }

    if confirm {
        session.click(&selectors::dialog_confirm()).await?;
        session
            .wait()
            .until_present(&selectors::notice("Product deleted"))
            .await?;
    } else {
        session.click(&selectors::dialog_cancel()).await?;
        session.wait().until_absent(&selectors::dialog_cancel()).await?;
    }
    Ok(probe)
}

/// What the Inventory tab currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryView {
    pub has_table: bool,
    /// The "no products" message is shown instead of a table
    pub empty: bool,
    pub rows: usize,
    pub status_badges: usize,
    pub cards: usize,
}

/// Open the Inventory tab and read its shape
pub async fn inventory(session: &Session) -> E2eResult<InventoryView> {
    open_tab(session, Tab::Inventory).await?;
    let has_table = session.count(&selectors::inventory_table()).await? > 0;
    let rows = if has_table {
        session.count(&selectors::inventory_rows()).await?
    } else {
        0
    };
    Ok(InventoryView {
        has_table,
        empty: session.count(&selectors::empty_state()).await? > 0,
        rows,
        status_badges: session.count(&selectors::status_badges()).await?,
        cards: match session.wait().probe_all_present(&selectors::summary_cards()).await? {
            Probe::Found(cards) => cards.len(),
            _ => 0,
        },
    })
}

/// Count status badges by kind: (dispatched, in stock)
pub async fn status_tally(session: &Session) -> E2eResult<(usize, usize)> {
    open_tab(session, Tab::Inventory).await?;
    let badges = session
        .wait()
        .probe_all_present(&selectors::status_badges())
        .await?;
    let mut dispatched = 0;
    let mut in_stock = 0;
    for badge in badges.into_found().unwrap_or_default() {
        let text = session.driver().text(&badge).await?;
        if text.contains("Dispatched") {
            dispatched += 1;
        } else if text.contains("In Stock") {
            in_stock += 1;
        }
    }
    Ok((dispatched, in_stock))
}

/// Whether the inventory table lists a product with this name
pub async fn inventory_lists(session: &Session, name: &str) -> E2eResult<bool> {
    open_tab(session, Tab::Inventory).await?;
    Ok(session.count(&selectors::inventory_row_named(name)).await? > 0)
}

/// Status text of the inventory row for `name`
pub async fn inventory_status(session: &Session, name: &str) -> E2eResult<String> {
    open_tab(session, Tab::Inventory).await?;
    let row = selectors::inventory_row_named(name);
    let text = session
        .text_of(&row)
        .await
        .map_err(|e| match e {
            E2eError::Timeout { .. } => E2eError::ElementNotFound(row.to_string()),
            other => other,
        })?;
    Ok(if text.contains("Dispatched") {
        "Dispatched".to_string()
    } else {
        "In Stock".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_label_splits_on_last_separator() {
        assert_eq!(option_product_name("Test Laptop - Electronics"), "Test Laptop");
        assert_eq!(option_product_name("T-Shirt - Clothing"), "T-Shirt");
        assert_eq!(option_product_name("Mug - Set - Home"), "Mug - Set");
        assert_eq!(option_product_name("Bare"), "Bare");
    }

    #[test]
    fn every_tab_has_a_distinct_heading() {
        let mut headings: Vec<_> = Tab::ALL.iter().map(|t| t.heading()).collect();
        headings.sort();
        headings.dedup();
        assert_eq!(headings.len(), Tab::ALL.len());
    }
}
